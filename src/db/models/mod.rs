//! Row types for the two tables in the store.

pub mod customer;
pub mod user;

pub use customer::*;
pub use user::*;
