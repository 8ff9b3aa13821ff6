// carepath-flow/src/branch/builder.rs

//! Fluent builder that turns one step of a flow into a branch over sub-flows.

use crate::branch::arm::{AnyBranchArm, BranchArm};
use crate::context::{FlowContext, Handler};
use crate::control::FlowControl;
use crate::error::FlowError;
use crate::flow::Flow;
use std::sync::Arc;
use tracing::{event, Level};

/// What a branching step does when no arm matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatch {
  Continue,
  Stop,
  /// Fail with `FlowError::NoBranchMatched`.
  Fail,
}

pub struct BranchBuilder<'flow, TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flow: &'flow mut Flow<TData, Err>,
  step_name: String,
  arms: Vec<Arc<dyn AnyBranchArm<TData, Err>>>,
  on_no_match: NoMatch,
}

impl<'flow, TData, Err> BranchBuilder<'flow, TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) fn new(flow: &'flow mut Flow<TData, Err>, step_name: String) -> Self {
    Self {
      flow,
      step_name,
      arms: Vec::new(),
      on_no_match: NoMatch::Continue,
    }
  }

  /// Adds an arm. Arms are evaluated in the order they were added.
  pub fn when(
    mut self,
    label: impl Into<String>,
    condition: impl Fn(&TData) -> bool + Send + Sync + 'static,
    sub_flow: Arc<Flow<TData, Err>>,
  ) -> Self {
    self.arms.push(Arc::new(BranchArm {
      label: label.into(),
      condition: Arc::new(condition),
      flow: sub_flow,
    }));
    self
  }

  pub fn if_no_match(mut self, behavior: NoMatch) -> Self {
    self.on_no_match = behavior;
    self
  }

  /// Installs the branch as the step's only `on` handler, replacing any
  /// handler previously registered there.
  pub fn finalize(self) {
    let arms = Arc::new(self.arms);
    let step_name = self.step_name.clone();
    let on_no_match = self.on_no_match;

    let master: Handler<TData, Err> = Box::new(move |ctx: FlowContext<TData>| {
      let arms = arms.clone();
      let step_name = step_name.clone();
      Box::pin(async move {
        let chosen = arms.iter().find(|arm| arm.matches(&ctx)).cloned();
        match chosen {
          Some(arm) => {
            event!(Level::DEBUG, step_name = %step_name, arm = %arm.label(), "Branch arm matched.");
            arm.execute(ctx).await
          }
          None => match on_no_match {
            NoMatch::Continue => Ok(FlowControl::Continue),
            NoMatch::Stop => Ok(FlowControl::Stop),
            NoMatch::Fail => {
              event!(Level::ERROR, step_name = %step_name, "No branch arm matched.");
              Err(Err::from(FlowError::NoBranchMatched { step_name }))
            }
          },
        }
      })
    });

    event!(Level::DEBUG, step_name = %self.step_name, "Branch step finalized.");
    self.flow.on.insert(self.step_name, vec![master]);
  }
}
