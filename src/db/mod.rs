pub mod connection;
pub mod models;
pub mod service;

pub use connection::{get_connection, lock, DbPool};
pub use models::*;
