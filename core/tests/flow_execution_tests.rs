// tests/flow_execution_tests.rs
mod common;

use carepath_flow::{Flow, FlowContext, FlowControl, FlowOutcome, StepDef};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn runs_steps_in_declared_order() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::with_steps("ordered", &["step1", "step2", "step3"]);
  flow.on("step1", recording_handler("step1", " S1"));
  flow.on("step2", recording_handler("step2", " S2"));
  flow.on("step3", recording_handler("step3", " S3"));

  let ctx = FlowContext::new(TestContext::default());
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.message, " S1 S2 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_steps() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::with_steps("stopping", &["a", "stop_here", "c"]);
  flow.on("a", recording_handler("a", "A"));
  flow.on("stop_here", |ctx: FlowContext<TestContext>| async move {
    ctx.write().steps_executed.push("stop_here".to_string());
    Ok::<_, TestError>(FlowControl::Stop)
  });
  flow.on("c", recording_handler("c", "C"));

  let ctx = FlowContext::new(TestContext::default());
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["a", "stop_here"]);
  assert_eq!(ctx.read().message, "A");
}

#[tokio::test]
#[serial]
async fn handler_error_is_returned_and_later_steps_do_not_run() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::with_steps("failing", &["good", "bad", "never"]);
  flow.on("good", recording_handler("good", "Good"));
  flow.on("bad", failing_handler("bad", "boom"));
  flow.on("never", recording_handler("never", "Never"));

  let ctx = FlowContext::new(TestContext::default());
  let err = flow.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("boom".to_string()));
  assert_eq!(ctx.read().steps_executed, vec!["good", "bad"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_is_evaluated_against_current_state() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(
    "skipping",
    vec![
      StepDef::required("first"),
      StepDef::required("maybe").skip_if(|s: &TestContext| s.counter > 0),
      StepDef::required("last"),
    ],
  );
  flow.on("first", recording_handler("first", " 1"));
  flow.on("maybe", recording_handler("maybe", " SKIPPED"));
  flow.on("last", recording_handler("last", " 3"));

  let ctx = FlowContext::new(TestContext::default());
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(ctx.read().message, " 1 3");
}

#[tokio::test]
#[serial]
async fn before_on_after_run_in_phase_order() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::with_steps("phases", &["main"]);
  flow.after("main", recording_handler("after", "After;"));
  flow.on("main", recording_handler("on", "On;"));
  flow.before("main", recording_handler("before", "Before;"));

  let ctx = FlowContext::new(TestContext::default());
  flow.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().message, "Before;On;After;");
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut flow = Flow::<TestContext, TestError>::new(
    "optional",
    vec![StepDef::optional("nothing_here"), StepDef::required("work")],
  );
  flow.on("work", recording_handler("work", "W"));

  let ctx = FlowContext::new(TestContext::default());
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["work"]);
}

#[test]
#[should_panic(expected = "step 'ghost' is not defined")]
fn registering_on_unknown_step_panics() {
  let mut flow = Flow::<TestContext, TestError>::with_steps("wiring", &["real"]);
  flow.on("ghost", recording_handler("ghost", ""));
}
