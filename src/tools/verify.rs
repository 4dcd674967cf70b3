//! Verify flow: render the board to an image for visual inspection.

use std::sync::Arc;

use crate::error::RegistrationError;
use crate::flow::{image_result, ActionRegistrar, ActionSpec, Flow, FlowError, StepInput, StepResult};
use crate::mcp::{ParamKind, ParamSpec, ToolRegistry};
use crate::pcb::{BoardLayer, BoardRenderer};

use super::Services;

const STEP_1: ActionSpec = ActionSpec {
    name: "verify_pcb_step_1",
    description: "Renders the current board as a PNG image. Pass layer names such as \
                  'F.Cu' or 'Edge.Cuts' to restrict the view; omit them to show every layer.",
    params: &[
        ParamSpec::context("ctx"),
        ParamSpec::optional("layers", ParamKind::StringArray, "Layers to include"),
    ],
};

/// Number of progress stages reported while verifying.
const STAGES: u32 = 2;

/// The verify flow.
#[derive(Debug)]
pub struct VerifyFlow {
    flow: Arc<Flow>,
}

impl VerifyFlow {
    /// Flow name.
    pub const NAME: &'static str = "verify_pcb";

    /// Registers the flow's step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step cannot be registered.
    pub fn register(
        services: &Services,
        registry: &mut ToolRegistry,
    ) -> Result<Self, RegistrationError> {
        let flow = services.flow(Self::NAME);
        let renderer = Arc::clone(&services.renderer);
        ActionRegistrar::new(Arc::clone(&flow), registry)
            .register(&STEP_1, move |step| verify(renderer.as_ref(), &step))?;
        Ok(Self { flow })
    }

    /// Returns the underlying flow.
    #[must_use]
    pub const fn flow(&self) -> &Arc<Flow> {
        &self.flow
    }
}

/// Parses the optional layer filter. An empty list means every layer.
fn parse_layers(step: &StepInput<'_>) -> Result<Option<Vec<BoardLayer>>, FlowError> {
    let Some(value) = step.optional_arg("layers") else {
        return Ok(None);
    };
    let names = value
        .as_array()
        .ok_or_else(|| FlowError::invalid("'layers' must be an array of layer names"))?;
    if names.is_empty() {
        return Ok(None);
    }

    names
        .iter()
        .map(|name| {
            name.as_str()
                .ok_or_else(|| FlowError::invalid("'layers' must be an array of layer names"))?
                .parse::<BoardLayer>()
                .map_err(FlowError::InvalidArguments)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn verify(renderer: &dyn BoardRenderer, step: &StepInput<'_>) -> StepResult {
    let layers = parse_layers(step)?;
    let board_name = step.board.name();

    if let Some(call) = step.call {
        call.report_progress(0, Some(STAGES), Some(&format!("Rendering {board_name}")));
    }

    let image = renderer.render(step.board.as_ref(), layers.as_deref())?;

    if let Some(call) = step.call {
        call.report_progress(STAGES, Some(STAGES), Some("Render complete"));
    }
    tracing::info!(board = %board_name, bytes = image.data.len(), "Rendered board");

    Ok(image_result(image.data, &image.mime_type))
}
