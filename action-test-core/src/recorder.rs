//! Per-run bookkeeping behind the instrumented `commit` and `dispatch`
//!
//! A [`Recorder`] is created for each harness run. It owns both expected
//! sequences, the two counters and the completion callback. Context clones
//! share it, so events from spawned tasks land in the same run.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::error::{Channel, HarnessError, Outcome, Progress};
use crate::expect::Expected;

/// Completion callback, taken on first use.
pub(crate) type DoneFn = Box<dyn FnOnce(Outcome) + Send + 'static>;

struct RecorderState {
    expected_mutations: Vec<Expected>,
    expected_actions: Vec<Expected>,
    mutation_count: usize,
    action_count: usize,
    done: Option<DoneFn>,
}

/// Settlement taken out of the lock so `done` runs unlocked.
type Settlement = (DoneFn, Outcome);

impl RecorderState {
    fn progress(&self) -> Progress {
        Progress {
            mutations: self.mutation_count,
            expected_mutations: self.expected_mutations.len(),
            actions: self.action_count,
            expected_actions: self.expected_actions.len(),
        }
    }

    fn settle(&mut self, outcome: Outcome) -> Option<Settlement> {
        self.done.take().map(|done| (done, outcome))
    }

    fn record(
        &mut self,
        channel: Channel,
        kind: &str,
        payload: Option<Value>,
    ) -> Option<Settlement> {
        if self.done.is_none() {
            tracing::debug!(%channel, kind, "ignoring event after run settled");
            return None;
        }

        let (expected, index) = match channel {
            Channel::Mutation => (&self.expected_mutations, self.mutation_count),
            Channel::Action => (&self.expected_actions, self.action_count),
        };

        if let Err(err) = check(channel, expected, index, kind, payload) {
            tracing::warn!(error = %err, "expectation failed");
            return self.settle(Err(err));
        }

        match channel {
            Channel::Mutation => self.mutation_count += 1,
            Channel::Action => self.action_count += 1,
        }
        tracing::debug!(%channel, kind, index, "matched expectation");

        let progress = self.progress();
        if progress.is_satisfied() {
            tracing::debug!(%progress, "all expectations met");
            return self.settle(Ok(()));
        }
        None
    }
}

/// Compare one event with the entry at `index`.
fn check(
    channel: Channel,
    expected: &[Expected],
    index: usize,
    kind: &str,
    payload: Option<Value>,
) -> Result<(), HarnessError> {
    let Some(entry) = expected.get(index) else {
        return Err(HarnessError::Overrun {
            channel,
            kind: kind.to_string(),
            expected: expected.len(),
        });
    };

    if entry.kind != kind {
        return Err(HarnessError::TypeMismatch {
            channel,
            index,
            expected: entry.kind.clone(),
            actual: kind.to_string(),
        });
    }

    match payload {
        Some(actual) if is_truthy(&actual) && *entry.payload_or_null() != actual => {
            Err(HarnessError::PayloadMismatch {
                channel,
                index,
                kind: kind.to_string(),
                expected: entry.payload_or_null().clone(),
                actual,
            })
        }
        _ => Ok(()),
    }
}

/// Whether a payload counts as provided: `null`, `false`, zero and `""` do not.
fn is_truthy(payload: &Value) -> bool {
    match payload {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Shared handle to one run's counters and completion callback.
#[derive(Clone)]
pub(crate) struct Recorder {
    inner: Arc<Mutex<RecorderState>>,
}

impl Recorder {
    pub(crate) fn new(
        expected_mutations: Vec<Expected>,
        expected_actions: Vec<Expected>,
        done: DoneFn,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RecorderState {
                expected_mutations,
                expected_actions,
                mutation_count: 0,
                action_count: 0,
                done: Some(done),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        // A panicking action must not hide the outcome of the run
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check an event coming through `commit` or `dispatch`.
    pub(crate) fn record(&self, channel: Channel, kind: &str, payload: Option<Value>) {
        let settlement = self.lock().record(channel, kind, payload);
        fire(settlement);
    }

    /// Settle the run with a failure that did not come from a comparison.
    pub(crate) fn fail(&self, err: HarnessError) {
        tracing::warn!(error = %err, "run failed");
        let settlement = self.lock().settle(Err(err));
        fire(settlement);
    }

    /// Settle successfully unless the run has already settled.
    pub(crate) fn settle_ok(&self) {
        let settlement = self.lock().settle(Ok(()));
        fire(settlement);
    }

    pub(crate) fn progress(&self) -> Progress {
        self.lock().progress()
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.lock().done.is_none()
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("progress", &self.progress())
            .field("settled", &self.is_settled())
            .finish()
    }
}

fn fire(settlement: Option<Settlement>) {
    if let Some((done, outcome)) = settlement {
        done(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{action, mutation};
    use serde_json::json;
    use std::sync::mpsc;

    fn recorder(
        mutations: Vec<Expected>,
        actions: Vec<Expected>,
    ) -> (Recorder, mpsc::Receiver<Outcome>) {
        let (tx, rx) = mpsc::channel();
        let done: DoneFn = Box::new(move |outcome| {
            let _ = tx.send(outcome);
        });
        (Recorder::new(mutations, actions, done), rx)
    }

    #[test]
    fn test_settles_once_both_counters_reach_targets() {
        let (rec, rx) = recorder(vec![mutation!("A")], vec![action!("X")]);

        rec.record(Channel::Action, "X", None);
        assert!(rx.try_recv().is_err());
        assert!(!rec.is_settled());

        rec.record(Channel::Mutation, "A", None);
        assert!(matches!(rx.try_recv(), Ok(Ok(()))));
        assert!(rec.is_settled());
    }

    #[test]
    fn test_first_failure_wins() {
        let (rec, rx) = recorder(vec![mutation!("A"), mutation!("B")], vec![]);

        rec.record(Channel::Mutation, "B", None);
        rec.record(Channel::Mutation, "A", None);
        rec.record(Channel::Mutation, "B", None);

        let outcomes: Vec<_> = rx.try_iter().collect();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0],
            Err(HarnessError::TypeMismatch { index: 0, expected, actual, .. })
                if expected == "A" && actual == "B"
        ));
        assert_eq!(rec.progress().mutations, 0);
    }

    #[test]
    fn test_overrun_is_reported() {
        let (rec, rx) = recorder(vec![], vec![action!("X")]);

        rec.record(Channel::Mutation, "SURPRISE", None);

        assert!(matches!(
            rx.try_recv(),
            Ok(Err(HarnessError::Overrun { channel: Channel::Mutation, expected: 0, .. }))
        ));
    }

    #[test]
    fn test_payload_compared_only_when_provided() {
        let one = [mutation!("A", 1)];
        assert!(check(Channel::Mutation, &one, 0, "A", None).is_ok());
        assert!(check(Channel::Mutation, &one, 0, "A", Some(Value::Null)).is_ok());
        assert!(check(Channel::Mutation, &one, 0, "A", Some(json!(1))).is_ok());
        assert!(matches!(
            check(Channel::Mutation, &one, 0, "A", Some(json!(2))),
            Err(HarnessError::PayloadMismatch { .. })
        ));
        // Provided payload against an entry without one
        assert!(matches!(
            check(Channel::Action, &[action!("X")], 0, "X", Some(json!(true))),
            Err(HarnessError::PayloadMismatch { expected: Value::Null, .. })
        ));
    }

    #[test]
    fn test_falsy_payloads_are_not_compared() {
        let bare = [action!("X")];
        let five = [mutation!("SET_COUNT", 5)];
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(check(Channel::Action, &bare, 0, "X", Some(falsy.clone())).is_ok());
            assert!(check(Channel::Mutation, &five, 0, "SET_COUNT", Some(falsy)).is_ok());
        }
        for truthy in [json!(1), json!(-1), json!("0"), json!([]), json!({})] {
            assert!(check(Channel::Action, &bare, 0, "X", Some(truthy)).is_err());
        }
    }

    #[test]
    fn test_settle_ok_fires_once() {
        let (rec, rx) = recorder(vec![], vec![]);
        rec.settle_ok();
        rec.settle_ok();

        let outcomes: Vec<_> = rx.try_iter().collect();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_ok());
    }

    #[test]
    fn test_settle_ok_after_failure_is_ignored() {
        let (rec, rx) = recorder(vec![], vec![]);
        rec.record(Channel::Mutation, "SURPRISE", None);
        rec.settle_ok();

        let outcomes: Vec<_> = rx.try_iter().collect();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], Err(HarnessError::Overrun { .. })));
    }

    #[test]
    fn test_poisoned_lock_still_reports() {
        let (rec, rx) = recorder(vec![mutation!("A")], vec![]);

        let holder = rec.clone();
        let joined = std::thread::spawn(move || {
            let _guard = holder.inner.lock();
            panic!("action panicked mid-event");
        })
        .join();
        assert!(joined.is_err());
        assert!(rec.inner.is_poisoned());

        rec.record(Channel::Mutation, "A", None);
        assert!(matches!(rx.try_recv(), Ok(Ok(()))));
        assert_eq!(rec.progress().mutations, 1);
    }

    #[test]
    fn test_fail_after_settle_is_ignored() {
        let (rec, rx) = recorder(vec![mutation!("A")], vec![]);
        rec.record(Channel::Mutation, "A", None);
        rec.fail(HarnessError::Incomplete {
            progress: Progress::default(),
        });

        let outcomes: Vec<_> = rx.try_iter().collect();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_ok());
    }
}
