use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    /// Short identifier, required prefix of the job names created for it
    pub pkey: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEgg {
    pub pkey: String,
    pub name: String,
}

impl Project {
    pub fn from_row(row: &rusqlite::Row) -> AppResult<Self> {
        Ok(Project {
            id: row.get(0)?,
            pkey: row.get(1)?,
            name: row.get(2)?,
        })
    }

    pub fn get_by_pkey(
        pkey: &str,
        conn: &PooledConnection<SqliteConnectionManager>,
    ) -> AppResult<Option<Self>> {
        let project = conn
            .prepare("SELECT id, pkey, name FROM project WHERE pkey = ?1")?
            .query_row(params![pkey], |row| Ok(Project::from_row(row)))
            .optional()
            .map_err(AppError::from)?
            .transpose()?;

        Ok(project)
    }

    pub fn list(conn: &PooledConnection<SqliteConnectionManager>) -> AppResult<Vec<Self>> {
        let projects = conn
            .prepare("SELECT id, pkey, name FROM project ORDER BY pkey")?
            .query_and_then([], Project::from_row)?
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(projects)
    }

    /// Insert the project, or rename the existing one with the same pkey.
    pub fn upsert(
        egg: &ProjectEgg,
        conn: &PooledConnection<SqliteConnectionManager>,
    ) -> AppResult<Self> {
        conn.prepare("INSERT INTO project (pkey, name) VALUES (?1, ?2) ON CONFLICT(pkey) DO UPDATE SET name = excluded.name")?
            .execute(params![egg.pkey, egg.name])?;

        Project::get_by_pkey(&egg.pkey, conn)?
            .ok_or_else(|| AppError::Internal(format!("Project {} vanished after upsert", egg.pkey)))
    }
}
