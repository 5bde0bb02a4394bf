//! action-test: test store actions by what they commit and dispatch
//!
//! Like a Vuex/Redux action test helper. The action under test receives a
//! fake `commit`/`dispatch` pair; every call is checked against the expected
//! sequences and the run completes once both are fully matched.
//!
//! # Example
//! ```
//! use action_test::prelude::*;
//! use serde_json::Value;
//!
//! fn logout(ctx: ActionContext, _payload: Value) {
//!     ctx.commit("CLEAR_SESSION");
//!     ctx.dispatch_with("navigate", "/login");
//! }
//!
//! let options = TestOptions::new()
//!     .expect_mutation(mutation!("CLEAR_SESSION"))
//!     .expect_action(action!("navigate", "/login"));
//!
//! assert!(run_action(logout, options).is_ok());
//! ```

// Re-export everything from core
pub use action_test_core::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use action_test_core::prelude::*;
}
