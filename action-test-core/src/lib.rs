//! Core harness for action-test
//!
//! In a store/action/mutation architecture, actions perform side effects and
//! then `commit` mutations or `dispatch` further actions. This crate runs one
//! action with an instrumented context and checks that the mutations and
//! actions it emits match expected sequences, in order.
//!
//! # Core Concepts
//!
//! - **ActionContext**: the `{ commit, dispatch, state }` value the action receives
//! - **TestOptions**: payload, state and the expected sequences
//! - **Expected**: one `{ type, payload? }` entry of a sequence
//! - **Outcome**: `Ok(())` once everything matched, or the first failure
//!
//! # Basic Example
//!
//! ```
//! use action_test_core::prelude::*;
//! use serde_json::{json, Value};
//!
//! fn fetch_user(ctx: ActionContext, id: Value) {
//!     ctx.commit("SET_LOADING");
//!     ctx.commit_with("SET_USER", json!({ "id": id, "name": "Ada" }));
//!     ctx.dispatch("trackView");
//! }
//!
//! let options = TestOptions::new()
//!     .with_payload(json!(1))
//!     .expect_mutation(mutation!("SET_LOADING"))
//!     .expect_mutation(mutation!("SET_USER", { "id": 1, "name": "Ada" }))
//!     .expect_action(action!("trackView"));
//!
//! test_action(fetch_user, options, |outcome| {
//!     assert!(outcome.is_ok(), "{outcome:?}");
//! });
//! ```
//!
//! # Async Actions
//!
//! Actions that do async work before committing can hand context clones to
//! spawned tasks. [`run_action_async`] polls the action's future and waits for
//! the run to settle, bounded by a deadline:
//!
//! ```ignore
//! let outcome = run_action_async(
//!     |ctx: ActionContext, _payload: Value| async move {
//!         let items = api.fetch_items().await;
//!         ctx.commit_with("SET_ITEMS", items);
//!     },
//!     TestOptions::new().expect_mutation(mutation!("SET_ITEMS", [1, 2])),
//!     Duration::from_secs(1),
//! )
//! .await;
//! ```

pub mod context;
pub mod error;
pub mod expect;
pub mod harness;
pub mod options;
mod recorder;

pub use context::ActionContext;
pub use error::{Channel, HarnessError, Outcome, Progress};
pub use expect::Expected;
pub use harness::{run_action, run_action_async, test_action};
pub use options::TestOptions;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::json;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::ActionContext;
    pub use crate::error::{Channel, HarnessError, Outcome, Progress};
    pub use crate::expect::Expected;
    pub use crate::harness::{run_action, run_action_async, test_action};
    pub use crate::options::TestOptions;
    pub use crate::{action, mutation};
}
