//! The persisted call record for Switchboard.
//!
//! A call row carries the caller details the platform reported and the name
//! of the menu the call currently sits in. [`SqliteMenuStore`] exposes that
//! one column to the menu state machine through the
//! [`switchboard_menu::MenuStore`] contract.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use switchboard_menu::{MenuStore, StoreError};
use switchboard_types::MenuName;
use thiserror::Error;

/// Errors that can occur during call operations.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("call not found: {0}")]
    NotFound(String),
}

/// A phone call driven through the IVR menus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Call {
    /// Internal database ID.
    pub id: i64,
    /// Platform identifier of the call.
    pub call_sid: String,
    /// Caller number, if reported.
    pub from_number: Option<String>,
    /// Dialled number, if reported.
    pub to_number: Option<String>,
    /// Menu the call is in; `None` until its first transition.
    pub current_menu: Option<MenuName>,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last update timestamp (ISO 8601).
    pub updated_at: String,
}

/// Parameters for creating a new call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCallParams {
    pub call_sid: String,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
}

const CALL_COLUMNS: &str =
    "id, call_sid, from_number, to_number, current_menu, created_at, updated_at";

/// Creates a new call and returns it.
pub fn create_call(conn: &Connection, params: &CreateCallParams) -> Result<Call, CallError> {
    conn.execute(
        "INSERT INTO calls (call_sid, from_number, to_number) VALUES (?1, ?2, ?3)",
        params![params.call_sid, params.from_number, params.to_number],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(call_id = id, call_sid = %params.call_sid, "call created");
    get_call(conn, id)
}

/// Retrieves a call by its internal ID.
pub fn get_call(conn: &Connection, id: i64) -> Result<Call, CallError> {
    conn.query_row(
        &format!("SELECT {CALL_COLUMNS} FROM calls WHERE id = ?1"),
        [id],
        map_row_to_call,
    )
    .optional()?
    .ok_or_else(|| CallError::NotFound(id.to_string()))
}

/// Retrieves a call by its platform identifier.
pub fn get_call_by_sid(conn: &Connection, call_sid: &str) -> Result<Call, CallError> {
    conn.query_row(
        &format!("SELECT {CALL_COLUMNS} FROM calls WHERE call_sid = ?1"),
        [call_sid],
        map_row_to_call,
    )
    .optional()?
    .ok_or_else(|| CallError::NotFound(call_sid.to_string()))
}

/// Returns the call with `params.call_sid`, creating it if it does not exist.
///
/// Platforms post the same call identifier on every request of a call, so
/// the first request creates the row and later ones find it.
pub fn find_or_create_call(conn: &Connection, params: &CreateCallParams) -> Result<Call, CallError> {
    match get_call_by_sid(conn, &params.call_sid) {
        Ok(call) => Ok(call),
        Err(CallError::NotFound(_)) => create_call(conn, params),
        Err(e) => Err(e),
    }
}

/// Sets the current menu of a call.
pub fn set_current_menu(conn: &Connection, id: i64, menu: &MenuName) -> Result<(), CallError> {
    let count = conn.execute(
        "UPDATE calls SET current_menu = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![id, menu.as_str()],
    )?;
    if count == 0 {
        return Err(CallError::NotFound(id.to_string()));
    }
    Ok(())
}

/// Lists calls currently sitting in `menu`, oldest first.
pub fn list_calls_in_menu(conn: &Connection, menu: &MenuName) -> Result<Vec<Call>, CallError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CALL_COLUMNS} FROM calls WHERE current_menu = ?1 ORDER BY id ASC"
    ))?;

    let rows = stmt.query_map([menu.as_str()], map_row_to_call)?;
    let mut calls = Vec::new();
    for row in rows {
        calls.push(row?);
    }
    Ok(calls)
}

/// Deletes a call.
pub fn delete_call(conn: &Connection, id: i64) -> Result<(), CallError> {
    let count = conn.execute("DELETE FROM calls WHERE id = ?1", [id])?;
    if count == 0 {
        return Err(CallError::NotFound(id.to_string()));
    }
    Ok(())
}

fn map_row_to_call(row: &Row) -> rusqlite::Result<Call> {
    let current_menu: Option<String> = row.get(4)?;
    Ok(Call {
        id: row.get(0)?,
        call_sid: row.get(1)?,
        from_number: row.get(2)?,
        to_number: row.get(3)?,
        current_menu: current_menu.map(MenuName::from),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// A [`MenuStore`] backed by the `current_menu` column of one call row.
#[derive(Debug, Clone, Copy)]
pub struct SqliteMenuStore<'c> {
    conn: &'c Connection,
    call_id: i64,
}

impl<'c> SqliteMenuStore<'c> {
    pub fn new(conn: &'c Connection, call_id: i64) -> Self {
        Self { conn, call_id }
    }

    pub fn call_id(&self) -> i64 {
        self.call_id
    }
}

impl MenuStore for SqliteMenuStore<'_> {
    fn load(&self) -> Result<Option<MenuName>, StoreError> {
        match get_call(self.conn, self.call_id) {
            Ok(call) => Ok(call.current_menu),
            Err(e) => Err(into_store_error(e)),
        }
    }

    fn save(&mut self, menu: &MenuName) -> Result<(), StoreError> {
        set_current_menu(self.conn, self.call_id, menu).map_err(into_store_error)
    }
}

fn into_store_error(err: CallError) -> StoreError {
    match err {
        CallError::NotFound(id) => StoreError::Missing(format!("call {id}")),
        CallError::Database(e) => StoreError::Backend(Box::new(e)),
    }
}
