use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use crate::db::parameter_value::set_subscription_parameter;
use crate::db::Parameters;
use crate::error::{AppError, AppResult};

/// A project bound to a node, with the project it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRecord {
    pub id: i64,
    pub project_id: i64,
    pub pkey: String,
    pub node_id: String,
}

pub struct SubscriptionEgg<'a> {
    pub project_id: i64,
    pub node_id: &'a str,
    pub parameters: &'a Parameters,
}

const SELECT: &str = "SELECT s.id, s.project_id, p.pkey, s.node_id FROM subscription s JOIN project p ON s.project_id = p.id";

impl SubscriptionRecord {
    pub fn from_row(row: &rusqlite::Row) -> AppResult<Self> {
        Ok(SubscriptionRecord {
            id: row.get(0)?,
            project_id: row.get(1)?,
            pkey: row.get(2)?,
            node_id: row.get(3)?,
        })
    }

    pub fn get_by_id(
        id: i64,
        conn: &PooledConnection<SqliteConnectionManager>,
    ) -> AppResult<Option<Self>> {
        let subscription = conn
            .prepare(&format!("{} WHERE s.id = ?1", SELECT))?
            .query_row(params![id], |row| Ok(SubscriptionRecord::from_row(row)))
            .optional()
            .map_err(AppError::from)?
            .transpose()?;

        Ok(subscription)
    }

    pub fn list(conn: &PooledConnection<SqliteConnectionManager>) -> AppResult<Vec<Self>> {
        let subscriptions = conn
            .prepare(&format!("{} ORDER BY p.pkey, s.id", SELECT))?
            .query_and_then([], SubscriptionRecord::from_row)?
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(subscriptions)
    }

    /// Insert the subscription and its own parameters in one transaction.
    pub fn insert(
        egg: &SubscriptionEgg,
        conn: &PooledConnection<SqliteConnectionManager>,
    ) -> AppResult<i64> {
        let tx = conn.unchecked_transaction()?;
        tx.prepare("INSERT INTO subscription (project_id, node_id) VALUES (?1, ?2)")?
            .execute(params![egg.project_id, egg.node_id])?;
        let id = tx.last_insert_rowid();
        for (parameter, data) in egg.parameters {
            set_subscription_parameter(id, parameter, data, conn)?;
        }
        tx.commit()?;

        Ok(id)
    }
}
