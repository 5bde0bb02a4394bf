//! Test options: payload, state and expected sequences

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::HarnessError;
use crate::expect::Expected;

/// Inputs for one harness run.
///
/// Every field is optional. Missing fields fall back to:
///
/// | field                | default                          |
/// |----------------------|----------------------------------|
/// | `payload`            | `P::default()` (`null`)          |
/// | `state`              | `S::default()` (empty map)       |
/// | `expected_mutations` | empty                            |
/// | `expected_actions`   | empty                            |
///
/// Options can be built in code or loaded from a JSON fixture using the
/// camelCase keys `payload`, `state`, `expectedMutations`, `expectedActions`.
///
/// # Example
///
/// ```
/// use action_test_core::{mutation, TestOptions};
/// use serde_json::json;
///
/// let options = TestOptions::new()
///     .with_payload(json!({ "id": 7 }))
///     .expect_mutation(mutation!("SET_LOADING", true))
///     .expect_mutation(mutation!("SET_USER", { "id": 7 }));
/// assert_eq!(options.expected_mutations.len(), 2);
///
/// let fixture: TestOptions = TestOptions::from_json(
///     r#"{ "expectedMutations": [{ "type": "SET_LOADING", "payload": true }] }"#,
/// ).unwrap();
/// assert_eq!(fixture.payload, json!(null));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    default,
    rename_all = "camelCase",
    bound(
        serialize = "P: Serialize, S: Serialize",
        deserialize = "P: Deserialize<'de> + Default, S: Deserialize<'de> + Default"
    )
)]
pub struct TestOptions<P = Value, S = Map<String, Value>> {
    /// Value handed to the action
    pub payload: P,
    /// State snapshot visible through the context
    pub state: S,
    /// Mutations the action must commit, in order
    pub expected_mutations: Vec<Expected>,
    /// Actions the action must dispatch, in order
    pub expected_actions: Vec<Expected>,
}

impl<P: Default, S: Default> Default for TestOptions<P, S> {
    fn default() -> Self {
        Self {
            payload: P::default(),
            state: S::default(),
            expected_mutations: Vec::new(),
            expected_actions: Vec::new(),
        }
    }
}

impl TestOptions {
    /// Options with a `null` payload, empty state and no expectations.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P, S> TestOptions<P, S>
where
    P: DeserializeOwned + Default,
    S: DeserializeOwned + Default,
{
    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, HarnessError> {
        serde_json::from_str(json).map_err(HarnessError::Options)
    }

    /// Convert options from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, HarnessError> {
        serde_json::from_value(value).map_err(HarnessError::Options)
    }
}

impl<P, S> TestOptions<P, S> {
    /// Replace the payload, possibly changing its type.
    pub fn with_payload<Q>(self, payload: Q) -> TestOptions<Q, S> {
        TestOptions {
            payload,
            state: self.state,
            expected_mutations: self.expected_mutations,
            expected_actions: self.expected_actions,
        }
    }

    /// Replace the state, possibly changing its type.
    pub fn with_state<T>(self, state: T) -> TestOptions<P, T> {
        TestOptions {
            payload: self.payload,
            state,
            expected_mutations: self.expected_mutations,
            expected_actions: self.expected_actions,
        }
    }

    /// Append one expected mutation.
    pub fn expect_mutation(mut self, expected: impl Into<Expected>) -> Self {
        self.expected_mutations.push(expected.into());
        self
    }

    /// Append several expected mutations.
    pub fn expect_mutations<I>(mut self, expected: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expected>,
    {
        self.expected_mutations
            .extend(expected.into_iter().map(Into::into));
        self
    }

    /// Append one expected dispatched action.
    pub fn expect_action(mut self, expected: impl Into<Expected>) -> Self {
        self.expected_actions.push(expected.into());
        self
    }

    /// Append several expected dispatched actions.
    pub fn expect_actions<I>(mut self, expected: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expected>,
    {
        self.expected_actions
            .extend(expected.into_iter().map(Into::into));
        self
    }

    /// True when neither sequence expects anything.
    pub fn expects_nothing(&self) -> bool {
        self.expected_mutations.is_empty() && self.expected_actions.is_empty()
    }
}
