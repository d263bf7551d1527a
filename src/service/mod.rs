//! Business operations over the store.

pub mod cart;
pub mod orders;
pub mod users;
