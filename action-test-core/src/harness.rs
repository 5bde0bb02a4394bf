//! Run an action against expected mutations and dispatched actions
//!
//! - [`test_action`]: callback style; `done` fires once with the outcome
//! - [`run_action`]: synchronous actions, returns the outcome directly
//! - [`run_action_async`]: drives an async action and waits for completion
//!
//! # Example
//!
//! ```
//! use action_test_core::{action, mutation, test_action, ActionContext, TestOptions};
//! use serde_json::Value;
//!
//! fn save(ctx: ActionContext, payload: Value) {
//!     ctx.commit("SET_SAVING");
//!     ctx.dispatch_with("persist", payload);
//! }
//!
//! let options = TestOptions::new()
//!     .with_payload(Value::from("draft"))
//!     .expect_mutation(mutation!("SET_SAVING"))
//!     .expect_action(action!("persist", "draft"));
//!
//! test_action(save, options, |outcome| {
//!     assert!(outcome.is_ok());
//! });
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use crate::context::ActionContext;
use crate::error::{HarnessError, Outcome};
use crate::options::TestOptions;
use crate::recorder::Recorder;

/// Invoke `action` once with an instrumented context and report through `done`.
///
/// Each `commit`/`dispatch` is checked against the next entry of its sequence
/// when it happens. `done` is called with `Ok(())` as soon as both sequences
/// are fully matched, or with the first failure. It is never called twice.
/// If nothing is expected, `done(Ok(()))` fires right after the action returns.
///
/// If the action emits fewer events than expected, `done` is never called;
/// bound the wait with a deadline, or use [`run_action`] /
/// [`run_action_async`] which report that case.
pub fn test_action<P, S, F, D>(action: F, options: TestOptions<P, S>, done: D)
where
    F: FnOnce(ActionContext<S>, P),
    D: FnOnce(Outcome) + Send + 'static,
{
    let Prepared {
        recorder,
        context,
        payload,
        expects_nothing,
    } = prepare(options, done);

    action(context, payload);
    if expects_nothing {
        recorder.settle_ok();
    }
}

/// Run a synchronous action and return its outcome.
///
/// Fails with [`HarnessError::Incomplete`] when the action returns before
/// every expected event was seen.
pub fn run_action<P, S, F>(action: F, options: TestOptions<P, S>) -> Outcome
where
    F: FnOnce(ActionContext<S>, P),
{
    let (tx, mut rx) = oneshot::channel();
    let Prepared {
        recorder,
        context,
        payload,
        expects_nothing,
    } = prepare(options, move |outcome| {
        let _ = tx.send(outcome);
    });

    action(context, payload);
    if expects_nothing {
        recorder.settle_ok();
    }

    rx.try_recv().unwrap_or_else(|_| {
        Err(HarnessError::Incomplete {
            progress: recorder.progress(),
        })
    })
}

/// Run an async action, waiting up to `deadline` for the run to settle.
///
/// The action's future is polled alongside the wait, and events from tasks it
/// spawns with context clones count toward the same run. When nothing is
/// expected, the run settles after the future completes, so stray events
/// are still reported.
///
/// Fails with [`HarnessError::TimedOut`] if the run has not settled when the
/// deadline passes.
pub async fn run_action_async<P, S, F, Fut>(
    action: F,
    options: TestOptions<P, S>,
    deadline: Duration,
) -> Outcome
where
    F: FnOnce(ActionContext<S>, P) -> Fut,
    Fut: Future<Output = ()>,
{
    let started = Instant::now();
    let (tx, mut rx) = oneshot::channel();
    let Prepared {
        recorder,
        context,
        payload,
        expects_nothing,
    } = prepare(options, move |outcome| {
        let _ = tx.send(outcome);
    });

    let fut = action(context, payload);
    tokio::pin!(fut);

    let wait = async {
        let mut action_finished = false;
        loop {
            tokio::select! {
                received = &mut rx => {
                    // The sender only drops unsent if the recorder is gone
                    return received.unwrap_or_else(|_| Err(HarnessError::Incomplete {
                        progress: recorder.progress(),
                    }));
                }
                _ = &mut fut, if !action_finished => {
                    action_finished = true;
                    tracing::debug!(progress = %recorder.progress(), "action future completed");
                    if expects_nothing {
                        recorder.settle_ok();
                    }
                }
            }
        }
    };

    match tokio::time::timeout(deadline, wait).await {
        Ok(outcome) => outcome,
        Err(_) => Err(HarnessError::TimedOut {
            elapsed: started.elapsed(),
            progress: recorder.progress(),
        }),
    }
}

/// Everything one run needs before the action is invoked.
struct Prepared<P, S> {
    recorder: Recorder,
    context: ActionContext<S>,
    payload: P,
    expects_nothing: bool,
}

fn prepare<P, S, D>(options: TestOptions<P, S>, done: D) -> Prepared<P, S>
where
    D: FnOnce(Outcome) + Send + 'static,
{
    let expects_nothing = options.expects_nothing();
    let TestOptions {
        payload,
        state,
        expected_mutations,
        expected_actions,
    } = options;

    tracing::debug!(
        mutations = expected_mutations.len(),
        actions = expected_actions.len(),
        "starting action test"
    );

    let recorder = Recorder::new(expected_mutations, expected_actions, Box::new(done));
    let context = ActionContext::new(state, recorder.clone());
    Prepared {
        recorder,
        context,
        payload,
        expects_nothing,
    }
}
