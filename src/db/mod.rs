use std::collections::HashMap;

pub mod migrations;
pub mod node;
pub mod parameter_value;
pub mod project;
pub mod subscription;

/// Parameter key to value, as configured on a node or a subscription.
pub type Parameters = HashMap<String, String>;

#[cfg(test)]
pub mod testing {
    use r2d2::Pool;
    use r2d2_sqlite::SqliteConnectionManager;

    /// A migrated in-memory database. One connection only, so every
    /// checkout sees the same database.
    #[allow(clippy::expect_used)]
    pub fn memory_pool() -> Pool<SqliteConnectionManager> {
        let pool = Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .expect("in-memory pool");
        super::migrations::migrate(pool.get().expect("connection")).expect("migrations");
        pool
    }
}
