use async_trait::async_trait;
use tokio_postgres::Statement;
use tracing::{debug, info};

use crate::{
    batch::UpdateExecutor,
    database::postgres::client::{PgType, PostgresClient, PostgresError},
};

/// The fixed identifiers of the update statement, supplied once at startup.
/// Only the two values vary per row and those are always bound parameters.
#[derive(Debug, Clone)]
pub struct UpdateTarget {
    pub table: String,
    pub set_column: String,
    pub where_column: String,
}

impl UpdateTarget {
    pub fn update_sql(&self) -> String {
        format!("UPDATE {} SET {} = $1 WHERE {} = $2", self.table, self.set_column, self.where_column)
    }
}

pub struct PostgresUpdater {
    client: PostgresClient,
    statement: Statement,
    sql: String,
    log_query: bool,
}

impl PostgresUpdater {
    /// Prepares the statement once so every row reuses the same plan and a
    /// broken identifier surfaces before the first row is read.
    pub async fn prepare(
        client: PostgresClient,
        target: &UpdateTarget,
        log_query: bool,
    ) -> Result<Self, PostgresError> {
        let sql = target.update_sql();
        let statement = client.prepare(&sql, &[PgType::TEXT, PgType::TEXT]).await?;

        Ok(PostgresUpdater { client, statement, sql, log_query })
    }
}

#[async_trait]
impl UpdateExecutor for PostgresUpdater {
    type Error = PostgresError;

    async fn update(&self, set_value: &str, where_value: &str) -> Result<u64, PostgresError> {
        if self.log_query {
            info!("SQL:\n{}\nARGS: [{:?}, {:?}]", self.sql, set_value, where_value);
        } else {
            debug!("SQL:\n{}\nARGS: [{:?}, {:?}]", self.sql, set_value, where_value);
        }

        self.client.execute(&self.statement, &[&set_value, &where_value]).await
    }
}
