use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::db::Parameters;
use crate::error::{AppError, AppResult};

fn collect(
    conn: &PooledConnection<SqliteConnectionManager>,
    sql: &str,
    key: &dyn rusqlite::ToSql,
) -> AppResult<Parameters> {
    let values = conn
        .prepare(sql)?
        .query_and_then(params![key], |row| -> AppResult<(String, String)> {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<Parameters, AppError>>()?;

    Ok(values)
}

/// Parameters configured on the node itself.
pub fn node_parameters(
    node: &str,
    conn: &PooledConnection<SqliteConnectionManager>,
) -> AppResult<Parameters> {
    collect(
        conn,
        "SELECT parameter, data FROM parameter_value WHERE node_id = ?1",
        &node,
    )
}

/// Parameters of a subscription: its node's parameters overlaid with its own.
pub fn subscription_parameters(
    subscription: i64,
    conn: &PooledConnection<SqliteConnectionManager>,
) -> AppResult<Parameters> {
    let mut parameters = collect(
        conn,
        "SELECT v.parameter, v.data FROM parameter_value v JOIN subscription s ON v.node_id = s.node_id WHERE s.id = ?1",
        &subscription,
    )?;
    parameters.extend(collect(
        conn,
        "SELECT parameter, data FROM parameter_value WHERE subscription_id = ?1",
        &subscription,
    )?);

    Ok(parameters)
}

pub fn set_node_parameter(
    node: &str,
    parameter: &str,
    data: &str,
    conn: &PooledConnection<SqliteConnectionManager>,
) -> AppResult<()> {
    conn.prepare("INSERT INTO parameter_value (parameter, data, node_id) VALUES (?1, ?2, ?3) ON CONFLICT(node_id, parameter) WHERE node_id IS NOT NULL DO UPDATE SET data = excluded.data")?
        .execute(params![parameter, data, node])?;

    Ok(())
}

pub fn set_subscription_parameter(
    subscription: i64,
    parameter: &str,
    data: &str,
    conn: &PooledConnection<SqliteConnectionManager>,
) -> AppResult<()> {
    conn.prepare("INSERT INTO parameter_value (parameter, data, subscription_id) VALUES (?1, ?2, ?3) ON CONFLICT(subscription_id, parameter) WHERE subscription_id IS NOT NULL DO UPDATE SET data = excluded.data")?
        .execute(params![parameter, data, subscription])?;

    Ok(())
}
