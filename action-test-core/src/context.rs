//! The `{ commit, dispatch, state }` context handed to an action

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Channel, HarnessError, Progress};
use crate::recorder::Recorder;

/// Context passed to the action under test.
///
/// `commit` and `dispatch` are instrumented: each call is checked against the
/// next expected entry of its sequence as soon as it is made. Clone the
/// context to move it into spawned tasks; all clones report to the same run.
///
/// # Example
///
/// ```
/// use action_test_core::{mutation, run_action, ActionContext, TestOptions};
/// use serde_json::{json, Value};
///
/// fn increment(ctx: ActionContext, by: Value) {
///     ctx.commit_with("INCREMENT", by);
/// }
///
/// let options = TestOptions::new()
///     .with_payload(json!(2))
///     .expect_mutation(mutation!("INCREMENT", 2));
/// assert!(run_action(increment, options).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ActionContext<S = Map<String, Value>> {
    state: S,
    recorder: Recorder,
}

impl<S> ActionContext<S> {
    pub(crate) fn new(state: S, recorder: Recorder) -> Self {
        Self { state, recorder }
    }

    /// State snapshot from the test options.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Commit a mutation without a payload.
    pub fn commit(&self, kind: &str) {
        self.recorder.record(Channel::Mutation, kind, None);
    }

    /// Commit a mutation with a payload.
    pub fn commit_with<T: Serialize>(&self, kind: &str, payload: T) {
        self.emit(Channel::Mutation, kind, payload);
    }

    /// Dispatch an action without a payload.
    pub fn dispatch(&self, kind: &str) {
        self.recorder.record(Channel::Action, kind, None);
    }

    /// Dispatch an action with a payload.
    pub fn dispatch_with<T: Serialize>(&self, kind: &str, payload: T) {
        self.emit(Channel::Action, kind, payload);
    }

    /// How many expected entries have been matched so far.
    pub fn progress(&self) -> Progress {
        self.recorder.progress()
    }

    fn emit<T: Serialize>(&self, channel: Channel, kind: &str, payload: T) {
        match serde_json::to_value(payload) {
            Ok(value) => self.recorder.record(channel, kind, Some(value)),
            Err(source) => self.recorder.fail(HarnessError::InvalidPayload {
                channel,
                kind: kind.to_string(),
                source,
            }),
        }
    }
}
