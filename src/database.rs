//! Database initialization and table definitions
//!
//! This module handles the setup of the embedded redb database backing the
//! idea board. It defines the record tables and provides initialization
//! functions.

use redb::{Database, TableDefinition};
use std::sync::Arc;

/// Main table for idea records
///
/// Key: generated idea id
/// Value: JSON-serialized Idea
pub const TABLE_IDEAS: TableDefinition<&str, &str> = TableDefinition::new("ideas_v1");

/// Main table for comment records
///
/// Key: generated comment id
/// Value: JSON-serialized Comment
pub const TABLE_COMMENTS: TableDefinition<&str, &str> = TableDefinition::new("comments_v1");

/// Index table for querying the comments that belong to one idea
///
/// Key: composite key in format "{post_id}:{timestamp_micros}:{comment_id}"
/// Value: JSON-serialized Comment
///
/// The timestamp in the key keeps a range scan in chronological order; the
/// comment id suffix keeps keys unique when two comments land in the same
/// microsecond.
pub const TABLE_COMMENT_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("comment_index_v1");

/// Table for vote records
///
/// Key: voter IP address
/// Value: JSON-serialized Vote
///
/// Keying this table by IP is what enforces the one-vote-per-IP rule at the
/// storage layer: a second vote from the same address cannot insert a second
/// row, it can only observe the first one.
pub const TABLE_VOTES: TableDefinition<&str, &str> = TableDefinition::new("votes_v1");

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe reference to the embedded database
    pub db: Arc<Database>,
}

/// Initializes the embedded database and creates required tables
///
/// Creates or opens the database file at the specified path, opens every
/// table so the structures are persisted, and commits.
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "data.db")
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_IDEAS)?;
        write_txn.open_table(TABLE_COMMENTS)?;
        write_txn.open_table(TABLE_COMMENT_INDEX)?;
        write_txn.open_table(TABLE_VOTES)?;
    }
    write_txn.commit()?;

    Ok(db)
}
