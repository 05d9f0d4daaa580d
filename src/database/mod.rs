//! SQLite database layer backing the local store.
//!
//! # Usage
//!
//! ```no_run
//! use px2connect::database::Database;
//!
//! let db = Database::open("local.db").expect("failed to open database");
//! let version: i32 = px2connect::database::migrations::get_schema_version(&db.connection());
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
