// carepath-flow/src/lib.rs

//! A small asynchronous step engine.
//!
//! A [`Flow`] is an ordered list of named steps over one shared state type.
//! Each step can carry `before`, `on` and `after` handlers, a skip condition,
//! and can be turned into a branch that runs one of several sub-flows.
//! Handlers return [`FlowControl::Stop`] to end a run early.
//!
//! ```ignore
//! let mut flow = Flow::<Session, AppError>::with_steps("checkout", &["load", "settle"]);
//! flow.on("load", |ctx| async move { /* ... */ Ok::<_, AppError>(FlowControl::Continue) });
//! flow
//!   .branches_for_step("settle")
//!   .when("free", |s| s.total == 0, free_flow)
//!   .when("paid", |s| s.total > 0, paid_flow)
//!   .finalize();
//! let outcome = flow.run(FlowContext::new(session)).await?;
//! ```

pub mod branch;
pub mod context;
pub mod control;
pub mod error;
pub mod flow;
pub mod step;

pub use crate::branch::{BranchBuilder, NoMatch};
pub use crate::context::{FlowContext, Handler};
pub use crate::control::{FlowControl, FlowOutcome};
pub use crate::error::{FlowError, FlowResult};
pub use crate::flow::Flow;
pub use crate::step::{SkipCondition, StepDef};
