//! Markwise database layer.
//!
//! Provides SQLite connection management, schema migrations, and the named
//! key-value slots used by the bookmark store.
//!
//! # Usage
//!
//! ```no_run
//! use markwise::database::Database;
//!
//! let db = Database::open("markwise.db").expect("failed to open database");
//! db.write_slot("greeting", "\"hello\"").expect("write failed");
//! assert_eq!(db.read_slot("greeting").unwrap().as_deref(), Some("\"hello\""));
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
