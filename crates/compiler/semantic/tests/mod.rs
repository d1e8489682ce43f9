//! # Semantic Analysis Tests
//!
//! Tests are organized by the tier they exercise. Every test starts from the
//! reference ToDo program in `common` and changes one thing.
//!
//! ## Test Organization
//!
//! - `models/` - Identifiers, field types, defaults, relations
//! - `queries/` - Variant body shapes, permissions, ownership paths
//! - `components/` - Query bindings and form inputs
//! - `pages/` - Render trees, routes, permission inheritance
//! - `app/` - App declaration and auth configuration
//! - `integration/` - End-to-end scenarios and whole-program properties
//!
//! ## Test Utilities
//!
//! - `assert_semantic_ok!(declarations)` - Assert the program resolves
//! - `assert_semantic_err!(declarations, [codes])` - Assert the exact error codes

pub mod common;
pub use common::*;

/// Macro to assert that a program resolves without errors
#[macro_export]
macro_rules! assert_semantic_ok {
    ($declarations:expr) => {{
        let function_name = stdext::function_name!();
        $crate::assert_semantic_ok_impl($declarations, function_name)
    }};
}

/// Macro to assert that a program fails with exactly the given error codes
#[macro_export]
macro_rules! assert_semantic_err {
    ($declarations:expr, [$($code:expr),* $(,)?]) => {{
        let function_name = stdext::function_name!();
        $crate::assert_semantic_err_impl($declarations, &[$($code),*], function_name)
    }};
}

// Test modules organized by tier
pub mod app;
pub mod models;
