pub mod cache;
pub mod sqlite;
