// carepath-flow/src/flow/definition.rs

//! The `Flow<TData, Err>` struct and its construction.

use crate::branch::BranchBuilder;
use crate::context::Handler;
use crate::error::FlowError;
use crate::step::StepDef;
use std::collections::HashMap;

/// An ordered list of named steps over a shared `TData`, with handlers
/// registered per step phase.
///
/// `Err` is the error every handler returns. It must absorb `FlowError` so
/// that engine-level failures (a required step with no handler, a branch with
/// no matching arm) surface through the same type.
pub struct Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: impl Into<String>, steps: Vec<StepDef<TData>>) -> Self {
    Self {
      name: name.into(),
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  /// Shorthand for a flow whose steps are all required and unconditional.
  pub fn with_steps(name: impl Into<String>, step_names: &[&str]) -> Self {
    Self::new(name, step_names.iter().map(|s| StepDef::required(*s)).collect())
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// # Panics
  /// If the step is not part of this flow. Registering a handler on an
  /// unknown step is a wiring mistake, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("flow '{}' setup error: step '{}' is not defined", self.name, step_name);
    }
  }

  /// Turns `step_name` into a branching step. Arms are tried in order and the
  /// first whose condition holds runs its sub-flow against the same context.
  pub fn branches_for_step(&mut self, step_name: &str) -> BranchBuilder<'_, TData, Err> {
    self.ensure_step_exists(step_name);
    BranchBuilder::new(self, step_name.to_string())
  }
}

impl<TData, Err> std::fmt::Debug for Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Flow")
      .field("name", &self.name)
      .field("steps", &self.steps)
      .finish()
  }
}
