use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A configured tool instance, for instance one Travis server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
}

impl Node {
    pub fn from_row(row: &rusqlite::Row) -> AppResult<Self> {
        Ok(Node {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    pub fn get_by_id(
        id: &str,
        conn: &PooledConnection<SqliteConnectionManager>,
    ) -> AppResult<Option<Self>> {
        let node = conn
            .prepare("SELECT id, name FROM node WHERE id = ?1")?
            .query_row(params![id], |row| Ok(Node::from_row(row)))
            .optional()
            .map_err(AppError::from)?
            .transpose()?;

        Ok(node)
    }

    pub fn list(conn: &PooledConnection<SqliteConnectionManager>) -> AppResult<Vec<Self>> {
        let nodes = conn
            .prepare("SELECT id, name FROM node ORDER BY id")?
            .query_and_then([], Node::from_row)?
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(nodes)
    }

    pub fn upsert(&self, conn: &PooledConnection<SqliteConnectionManager>) -> AppResult<()> {
        conn.prepare("INSERT INTO node (id, name) VALUES (?1, ?2) ON CONFLICT(id) DO UPDATE SET name = excluded.name")?
            .execute(params![self.id, self.name])?;

        Ok(())
    }
}
