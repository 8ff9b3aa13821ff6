// tests/branch_tests.rs
mod common;

use carepath_flow::{Flow, FlowContext, FlowOutcome, NoMatch};
use common::*;
use serial_test::serial;
use std::sync::Arc;

fn sub_flow(name: &'static str, step: &'static str, note: &'static str) -> Arc<Flow<TestContext, TestError>> {
  let mut f = Flow::<TestContext, TestError>::with_steps(name, &[step]);
  f.on(step, recording_handler(step, note));
  Arc::new(f)
}

fn settle_flow(no_match: NoMatch) -> Flow<TestContext, TestError> {
  let mut flow = Flow::<TestContext, TestError>::with_steps("settle", &["settle", "finish"]);
  flow
    .branches_for_step("settle")
    .when("free", |s: &TestContext| s.total == 0, sub_flow("free_flow", "confirm_free", "free;"))
    .when("paid", |s: &TestContext| s.total > 0 && s.total < 1000, sub_flow("paid_flow", "charge", "paid;"))
    .if_no_match(no_match)
    .finalize();
  flow.on("finish", recording_handler("finish", "done;"));
  flow
}

#[tokio::test]
#[serial]
async fn first_matching_arm_runs_against_shared_context() {
  setup_tracing();
  let flow = settle_flow(NoMatch::Fail);

  let free = FlowContext::new(TestContext::default());
  assert_eq!(flow.run(free.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(free.read().message, "free;done;");

  let paid = FlowContext::new(TestContext {
    total: 250,
    ..Default::default()
  });
  assert_eq!(flow.run(paid.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(paid.read().steps_executed, vec!["charge", "finish"]);
}

#[tokio::test]
#[serial]
async fn stopped_sub_flow_stops_the_parent() {
  setup_tracing();
  let flow = settle_flow(NoMatch::Fail);
  let ctx = FlowContext::new(TestContext {
    total: 10,
    should_stop_at: Some("charge".to_string()),
    ..Default::default()
  });

  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["charge"]);
}

#[tokio::test]
#[serial]
async fn no_match_behaviour_is_honoured() {
  setup_tracing();
  let big = || TestContext {
    total: 5000,
    ..Default::default()
  };

  let err = settle_flow(NoMatch::Fail).run(FlowContext::new(big())).await.unwrap_err();
  assert!(matches!(err, TestError::Flow(ref s) if s.contains("NoBranchMatched")));

  let ctx = FlowContext::new(big());
  assert_eq!(settle_flow(NoMatch::Stop).run(ctx.clone()).await.unwrap(), FlowOutcome::Stopped);
  assert!(ctx.read().steps_executed.is_empty());

  let ctx = FlowContext::new(big());
  assert_eq!(settle_flow(NoMatch::Continue).run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["finish"]);
}
