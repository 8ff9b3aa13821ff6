// carepath-flow/src/branch/arm.rs

//! One arm of a branching step: a condition paired with the sub-flow it runs.

use crate::context::FlowContext;
use crate::control::{FlowControl, FlowOutcome};
use crate::error::FlowError;
use crate::flow::Flow;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{event, Level};

pub(crate) type Condition<TData> = Arc<dyn Fn(&TData) -> bool + Send + Sync + 'static>;

pub(crate) struct BranchArm<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) label: String,
  pub(crate) condition: Condition<TData>,
  pub(crate) flow: Arc<Flow<TData, Err>>,
}

/// Object-safe view of an arm so a step can hold a list of them.
#[async_trait]
pub(crate) trait AnyBranchArm<TData, Err>: Send + Sync
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn label(&self) -> &str;

  fn matches(&self, ctx: &FlowContext<TData>) -> bool;

  /// Runs the sub-flow. A completed sub-flow continues the parent; a stopped
  /// one stops it.
  async fn execute(&self, ctx: FlowContext<TData>) -> Result<FlowControl, Err>;
}

#[async_trait]
impl<TData, Err> AnyBranchArm<TData, Err> for BranchArm<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn label(&self) -> &str {
    &self.label
  }

  fn matches(&self, ctx: &FlowContext<TData>) -> bool {
    (self.condition)(&ctx.read())
  }

  async fn execute(&self, ctx: FlowContext<TData>) -> Result<FlowControl, Err> {
    event!(Level::DEBUG, arm = %self.label, sub_flow = %self.flow.name(), "Running branch sub-flow.");
    match self.flow.run(ctx).await? {
      FlowOutcome::Completed => Ok(FlowControl::Continue),
      FlowOutcome::Stopped => {
        event!(Level::INFO, arm = %self.label, "Branch sub-flow stopped.");
        Ok(FlowControl::Stop)
      }
    }
  }
}
