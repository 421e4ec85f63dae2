//! Fluent request builders.
//!
//! Each builder is created from a [`DataStore`](crate::store::DataStore)
//! factory method, configured through chained setters, and consumed by one
//! terminal call that performs a single raw store call.
mod compare_and_set;
mod enumerate;
mod get;
mod increment;
mod set;
mod touch;

pub use compare_and_set::*;
pub use enumerate::*;
pub use get::*;
pub use increment::*;
pub use set::*;
pub use touch::*;
