//! Runtime support for wired components.
//!
//! Generated wiring code wraps every scoped binding in a [`ScopedCell`], so the
//! binding's producer runs at most once per component, no matter how many threads
//! ask for the value.

pub mod cell;
pub mod errors;

pub use cell::ScopedCell;
pub use errors::ScopeError;
