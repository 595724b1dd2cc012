use crate::prelude::*;
use indoc::indoc;

pub fn migrate(mut conn: PooledConnection<SqliteConnectionManager>) -> AppResult<()> {
    let migrations: Migrations = Migrations::new(vec![
        M::up(indoc! { r#"
          CREATE TABLE node (
              id TEXT PRIMARY KEY NOT NULL,
              name TEXT NOT NULL
          );

          CREATE TABLE project (
              id INTEGER PRIMARY KEY NOT NULL,
              pkey TEXT NOT NULL UNIQUE,
              name TEXT NOT NULL
          );

          CREATE TABLE subscription (
              id INTEGER PRIMARY KEY NOT NULL,
              project_id INTEGER NOT NULL,
              node_id TEXT NOT NULL,
              FOREIGN KEY(project_id) REFERENCES project(id),
              FOREIGN KEY(node_id) REFERENCES node(id)
          );

          CREATE TABLE parameter_value (
              id INTEGER PRIMARY KEY NOT NULL,
              parameter TEXT NOT NULL,
              data TEXT NOT NULL,
              node_id TEXT,
              subscription_id INTEGER,
              FOREIGN KEY(node_id) REFERENCES node(id),
              FOREIGN KEY(subscription_id) REFERENCES subscription(id)
          );
          CREATE UNIQUE INDEX IF NOT EXISTS idx_parameter_value_node ON parameter_value(node_id, parameter) WHERE node_id IS NOT NULL;
          CREATE UNIQUE INDEX IF NOT EXISTS idx_parameter_value_subscription ON parameter_value(subscription_id, parameter) WHERE subscription_id IS NOT NULL;
      "#}),
    ]);

    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
    migrations
        .to_latest(&mut conn)
        .map_err(|e| AppError::DatabaseMigration(e.to_string()))?;
    Ok(())
}
