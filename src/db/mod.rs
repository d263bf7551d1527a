//! Data access, one module per table group.
//!
//! Every function takes an `impl PgExecutor` so callers can pass either the
//! pool or an open transaction; the order conversion relies on this to keep
//! all of its writes inside a single transaction.

pub mod carts;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod sessions;
pub mod users;
