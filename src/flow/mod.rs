//! The action-flow engine.
//!
//! A flow is a short, fixed, linear sequence of tools (for example "choose
//! item type" → "describe arguments" → "commit item"). Each step is
//! registered through an [`ActionRegistrar`], which:
//!
//! 1. validates the step's static [`ActionSpec`],
//! 2. appends it to the flow's [`ActionSequence`],
//! 3. wraps it so every call fetches a fresh board handle and turns any
//!    [`FlowError`] into an error [`Envelope`],
//! 4. publishes it to the [`ToolRegistry`](crate::mcp::ToolRegistry).
//!
//! Every call returns an [`Envelope`] carrying a hint about which action
//! comes next (see [`NextActionPolicy`]).

mod action;
mod envelope;
mod error;
mod registrar;
mod sequence;

pub use action::{ActionSpec, FlowContext, StepInput};
pub use envelope::{image_result, Envelope, NextActionPolicy, ResponseFormatter, FLOW_COMPLETE};
pub use error::FlowError;
pub use registrar::{ActionRegistrar, Flow, StepResult};
pub use sequence::ActionSequence;
