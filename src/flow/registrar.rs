//! Turning step functions into published, envelope-returning tools.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use super::action::{ActionSpec, FlowContext, StepInput};
use super::envelope::{Envelope, ResponseFormatter};
use super::error::FlowError;
use super::sequence::ActionSequence;
use crate::error::RegistrationError;
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{ToolHandler, ToolOutput, ToolRegistry};
use crate::pcb::CadEngine;

/// Result of a step body.
pub type StepResult = Result<Value, FlowError>;

#[derive(Debug, Default)]
struct FlowState {
    sequence: ActionSequence,
    context: FlowContext,
}

/// One named multi-step flow: its action sequence, context and services.
pub struct Flow {
    name: &'static str,
    cad: Arc<dyn CadEngine>,
    formatter: ResponseFormatter,
    state: Mutex<FlowState>,
}

impl Flow {
    /// Creates a flow with no actions yet.
    #[must_use]
    pub fn new(name: &'static str, cad: Arc<dyn CadEngine>, formatter: ResponseFormatter) -> Arc<Self> {
        Arc::new(Self {
            name,
            cad,
            formatter,
            state: Mutex::new(FlowState::default()),
        })
    }

    /// Returns the flow's name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns a snapshot of the action sequence.
    #[must_use]
    pub fn sequence(&self) -> ActionSequence {
        self.lock().sequence.clone()
    }

    /// Returns a snapshot of the flow context.
    #[must_use]
    pub fn context(&self) -> FlowContext {
        self.lock().context.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn append(&self, action: &str) -> Result<(), RegistrationError> {
        let mut state = self.lock();
        if state.sequence.contains(action) {
            return Err(RegistrationError::DuplicateAction {
                flow: self.name.to_string(),
                action: action.to_string(),
            });
        }
        state.sequence.push(action);
        Ok(())
    }

    /// Runs one step and wraps its outcome in an envelope.
    ///
    /// The board is fetched fresh for every call. Running the flow's first
    /// action clears the context. Failures, including a missing board,
    /// become error envelopes.
    pub fn run_step<F>(
        &self,
        spec: &ActionSpec,
        step: &F,
        args: &Map<String, Value>,
        call: &ToolContext,
    ) -> Envelope
    where
        F: Fn(StepInput<'_>) -> StepResult + ?Sized,
    {
        let mut guard = self.lock();
        let FlowState { sequence, context } = &mut *guard;

        if sequence.first() == Some(spec.name) {
            context.reset();
        }

        let outcome = self
            .cad
            .get_board()
            .map_err(FlowError::from)
            .and_then(|board| {
                step(StepInput {
                    board,
                    args,
                    context,
                    call: spec.declares_context().then_some(call),
                })
            });

        match outcome {
            Ok(result) => {
                tracing::debug!(flow = self.name, action = spec.name, "Action succeeded");
                self.formatter.success(sequence, spec.name, result)
            }
            Err(e) => {
                tracing::error!(
                    flow = self.name,
                    action = spec.name,
                    error_type = e.error_type(),
                    error = %e,
                    "Action failed"
                );
                self.formatter.error(e.to_string(), e.error_type())
            }
        }
    }
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow")
            .field("name", &self.name)
            .field("formatter", &self.formatter)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

/// Registers a flow's steps into the tool table.
pub struct ActionRegistrar<'r> {
    flow: Arc<Flow>,
    registry: &'r mut ToolRegistry,
}

impl<'r> ActionRegistrar<'r> {
    /// Creates a registrar for `flow`.
    pub fn new(flow: Arc<Flow>, registry: &'r mut ToolRegistry) -> Self {
        Self { flow, registry }
    }

    /// Adds a step to the flow and publishes it as a tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration is invalid, the action is already
    /// part of the flow, or the tool name is taken.
    pub fn register<F>(&mut self, spec: &'static ActionSpec, step: F) -> Result<(), RegistrationError>
    where
        F: Fn(StepInput<'_>) -> StepResult + Send + Sync + 'static,
    {
        spec.validate()?;
        self.flow.append(spec.name)?;

        let flow = Arc::clone(&self.flow);
        let handler: ToolHandler = Box::new(move |call: &ToolContext, args: &Map<String, Value>| {
            Ok(ToolOutput::from(flow.run_step(spec, &step, args, call)))
        });

        self.registry
            .register(spec.name, spec.description, spec.params, handler)?;
        tracing::debug!(flow = self.flow.name(), action = spec.name, "Registered action");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::flow::envelope::NextActionPolicy;
    use crate::mcp::params::{ParamKind, ParamSpec};
    use crate::pcb::{Board, BoardError, BoardResult, ItemType, MemoryBoard, MemoryEngine};

    const FIRST: ActionSpec = ActionSpec {
        name: "demo_step_1",
        description: "First",
        params: &[],
    };
    const SECOND: ActionSpec = ActionSpec {
        name: "demo_step_2",
        description: "Second",
        params: &[ParamSpec::required("item_type", ParamKind::String, "")],
    };
    const FAILING: ActionSpec = ActionSpec {
        name: "demo_step_3",
        description: "",
        params: &[],
    };

    fn engine() -> Arc<dyn CadEngine> {
        Arc::new(MemoryEngine::new(MemoryBoard::new("demo")))
    }

    fn demo(policy: NextActionPolicy, registry: &mut ToolRegistry) -> Arc<Flow> {
        let flow = Flow::new("demo", engine(), ResponseFormatter::new(policy));
        let mut registrar = ActionRegistrar::new(Arc::clone(&flow), registry);
        registrar.register(&FIRST, |_| Ok(json!("one"))).unwrap();
        registrar
            .register(&SECOND, |mut step| {
                let item_type = step.item_type_arg("item_type")?;
                step.context.select_item_type(item_type);
                Ok(json!(item_type.name()))
            })
            .unwrap();
        registrar
            .register(&FAILING, |_| Err(FlowError::runtime("Failed to commit", "engine offline")))
            .unwrap();
        flow
    }

    fn call(registry: &ToolRegistry, name: &str, args: Value) -> ToolOutput {
        registry.call(name, &ToolContext::detached(), &args).unwrap()
    }

    #[test]
    fn registration_builds_sequence_and_tools() {
        let mut registry = ToolRegistry::new();
        let flow = demo(NextActionPolicy::default(), &mut registry);

        assert_eq!(flow.sequence().names(), ["demo_step_1", "demo_step_2", "demo_step_3"]);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ["demo_step_1", "demo_step_2", "demo_step_3"]);
        assert_eq!(
            registry.definitions()[1].input_schema["required"],
            json!(["item_type"])
        );
    }

    #[test]
    fn duplicate_action_rejected() {
        let mut registry = ToolRegistry::new();
        let flow = Flow::new("demo", engine(), ResponseFormatter::default());
        let mut registrar = ActionRegistrar::new(flow, &mut registry);
        registrar.register(&FIRST, |_| Ok(Value::Null)).unwrap();
        assert!(matches!(
            registrar.register(&FIRST, |_| Ok(Value::Null)),
            Err(RegistrationError::DuplicateAction { .. })
        ));
    }

    #[test]
    fn name_taken_by_other_flow_is_fatal() {
        let mut registry = ToolRegistry::new();
        let a = Flow::new("a", engine(), ResponseFormatter::default());
        ActionRegistrar::new(a, &mut registry)
            .register(&FIRST, |_| Ok(Value::Null))
            .unwrap();

        let b = Flow::new("b", engine(), ResponseFormatter::default());
        assert!(matches!(
            ActionRegistrar::new(b, &mut registry).register(&FIRST, |_| Ok(Value::Null)),
            Err(RegistrationError::DuplicateTool { .. })
        ));
    }

    #[test]
    fn success_envelope_with_executed_anchor() {
        let mut registry = ToolRegistry::new();
        demo(NextActionPolicy::Executed, &mut registry);

        let out = call(&registry, "demo_step_1", json!({}));
        assert!(!out.is_error);
        assert_eq!(out.value["status"], "success");
        assert_eq!(out.value["result"], "one");
        assert_eq!(out.value["next_action"], "demo_step_2");
        assert_eq!(out.value["next_action_info"], "Next execution: demo_step_2");
    }

    #[test]
    fn success_envelope_with_last_registered_anchor() {
        let mut registry = ToolRegistry::new();
        demo(NextActionPolicy::LastRegistered, &mut registry);

        let out = call(&registry, "demo_step_1", json!({}));
        assert_eq!(out.value["next_action"], Value::Null);
        assert_eq!(out.value["next_action_info"], "Flow complete");
    }

    #[test]
    fn step_error_becomes_envelope() {
        let mut registry = ToolRegistry::new();
        demo(NextActionPolicy::Executed, &mut registry);

        let out = call(&registry, "demo_step_3", json!({}));
        assert!(out.is_error);
        assert_eq!(out.value["status"], "error");
        assert_eq!(out.value["error_type"], "RuntimeError");
        assert_eq!(out.value["result"], "Failed to commit: engine offline");
        assert!(out.value.get("next_action").is_none());

        let out = call(&registry, "demo_step_2", json!({"item_type": "Widget"}));
        assert_eq!(out.value["error_type"], "UnknownItemType");
    }

    #[test]
    fn first_action_resets_context() {
        let mut registry = ToolRegistry::new();
        let flow = demo(NextActionPolicy::default(), &mut registry);

        call(&registry, "demo_step_2", json!({"item_type": "Via"}));
        assert_eq!(flow.context().item_type(), Some(ItemType::Via));

        call(&registry, "demo_step_1", json!({}));
        assert_eq!(flow.context().item_type(), None);
    }

    struct NoBoard;

    impl CadEngine for NoBoard {
        fn get_board(&self) -> BoardResult<Arc<dyn Board>> {
            Err(BoardError::unavailable("no project open"))
        }
    }

    #[test]
    fn missing_board_becomes_envelope() {
        let mut registry = ToolRegistry::new();
        let flow = Flow::new("demo", Arc::new(NoBoard), ResponseFormatter::default());
        ActionRegistrar::new(flow, &mut registry)
            .register(&FIRST, |_| Ok(Value::Null))
            .unwrap();

        let out = call(&registry, "demo_step_1", json!({}));
        assert!(out.is_error);
        assert_eq!(out.value["error_type"], "BoardUnavailable");
        assert!(out.value["result"].as_str().unwrap().contains("no project open"));
    }
}
