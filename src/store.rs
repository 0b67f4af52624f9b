//! SQLite access for the token store and the persisted lemma layer
//!
//! Everything here is read-only. Absent lemma-layer tables read as empty
//! state rather than being created, so planning and dry runs never touch the
//! database file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::Serialize;

use crate::error::{LemmaError, Result};

pub const TOKEN_TABLE: &str = "Token";
pub const LEMMA_TABLE: &str = "Lemma";
pub const TOKEN_LEMMA_TABLE: &str = "TokenLemma";
pub const METADATA_TABLE: &str = "RebuildMetadata";

/// Stable token identifier from the token store
pub type TokenId = i64;

/// Immutable unit read from the token store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_id: TokenId,
    pub surface_form: String,
}

impl Token {
    pub fn new(token_id: TokenId, surface_form: impl Into<String>) -> Self {
        Self {
            token_id,
            surface_form: surface_form.into(),
        }
    }
}

/// The currently committed lemma layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingState {
    pub lemmas: BTreeSet<String>,
    pub token_lemmas: BTreeMap<TokenId, String>,
}

/// One append-only history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildMetadata {
    pub lemma_version: String,
    pub built_at: String,
    pub lemma_count: i64,
    pub signature: String,
    pub notes: Option<String>,
}

/// Open an existing database read-write with foreign keys enforced.
///
/// Never creates the file: a missing path is an input error.
pub fn open_database(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(LemmaError::DatabaseNotFound {
            path: path.to_path_buf(),
        });
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    enable_foreign_keys(&conn)?;

    tracing::debug!("Opened database {}", path.display());
    Ok(conn)
}

/// Turn on foreign-key enforcement (a no-op inside a transaction, so call on open)
pub fn enable_foreign_keys(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(())
}

/// Check whether a table exists
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Verify the token store is present with the columns the planner reads
pub fn ensure_token_store(conn: &Connection) -> Result<()> {
    if !table_exists(conn, TOKEN_TABLE)? {
        return Err(LemmaError::SchemaMissing {
            object: format!("table {}", TOKEN_TABLE),
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns: BTreeSet<String> = stmt
        .query_map([TOKEN_TABLE], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<_, _>>()?;

    for required in ["TokenId", "SurfaceForm"] {
        if !columns.contains(required) {
            return Err(LemmaError::SchemaMissing {
                object: format!("column {}.{}", TOKEN_TABLE, required),
            });
        }
    }

    Ok(())
}

/// Read every token ordered by identifier. NULL surfaces read as empty.
pub fn load_tokens(conn: &Connection) -> Result<Vec<Token>> {
    let mut stmt = conn.prepare("SELECT TokenId, SurfaceForm FROM Token ORDER BY TokenId")?;
    let tokens = stmt
        .query_map([], |row| {
            Ok(Token {
                token_id: row.get(0)?,
                surface_form: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    tracing::debug!("Loaded {} tokens", tokens.len());
    Ok(tokens)
}

/// Read the committed lemma set and token mapping (empty when never built)
pub fn load_existing_state(conn: &Connection) -> Result<ExistingState> {
    let mut state = ExistingState::default();

    if table_exists(conn, LEMMA_TABLE)? {
        let mut stmt = conn.prepare("SELECT LemmaText FROM Lemma")?;
        state.lemmas = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<_, _>>()?;
    }

    if table_exists(conn, LEMMA_TABLE)? && table_exists(conn, TOKEN_LEMMA_TABLE)? {
        let mut stmt = conn.prepare(
            "SELECT tl.TokenId, l.LemmaText
             FROM TokenLemma tl
             INNER JOIN Lemma l ON l.LemmaId = tl.LemmaId
             ORDER BY tl.TokenId, l.LemmaText",
        )?;
        state.token_lemmas = stmt
            .query_map([], |row| Ok((row.get::<_, TokenId>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<_, _>>()?;
    }

    Ok(state)
}

/// Most recent history entry, if any rebuild has ever committed
pub fn latest_metadata(conn: &Connection) -> Result<Option<RebuildMetadata>> {
    Ok(metadata_history(conn, Some(1))?.into_iter().next())
}

/// History entries, newest first
pub fn metadata_history(conn: &Connection, limit: Option<usize>) -> Result<Vec<RebuildMetadata>> {
    if !table_exists(conn, METADATA_TABLE)? {
        return Ok(Vec::new());
    }

    // LIMIT -1 means unbounded in SQLite
    let limit = limit.map(|n| n as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(
        "SELECT LemmaVersion, BuiltAt, LemmaCount, Signature, Notes
         FROM RebuildMetadata
         ORDER BY BuiltAt DESC, rowid DESC
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit], |row| {
            Ok(RebuildMetadata {
                lemma_version: row.get(0)?,
                built_at: row.get(1)?,
                lemma_count: row.get(2)?,
                signature: row.get(3)?,
                notes: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
