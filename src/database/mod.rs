pub mod connections;

pub use connections::{AccountConnection, ConnectionStore, PgConnectionStore};
