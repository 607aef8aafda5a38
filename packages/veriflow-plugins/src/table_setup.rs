use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use std::str::FromStr;
use tracing::info;
use veriflow_orchestration::{ExecutionContext, Result, SetupPlugin};

/// Provisions a single table and drops it again on rollback.
///
/// The table name is tracked in the execution context; rollback only
/// touches the database while the context still tracks it, so a second
/// rollback is a no-op.
#[derive(Debug, Clone)]
pub struct TableSetup {
    name: String,
    connection_string: String,
    table: String,
    schema: String,
}

impl TableSetup {
    /// `schema` is the column list of the CREATE TABLE statement,
    /// e.g. `"id INTEGER PRIMARY KEY, name TEXT"`.
    pub fn new(
        connection_string: impl Into<String>,
        table: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        let table = table.into();
        Self {
            name: format!("table-setup:{}", table),
            connection_string: connection_string.into(),
            table,
            schema: schema.into(),
        }
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        let options =
            SqliteConnectOptions::from_str(&self.connection_string)?.create_if_missing(true);
        Ok(SqliteConnection::connect_with(&options).await?)
    }
}

#[async_trait(?Send)]
impl SetupPlugin for TableSetup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<()> {
        let ddl = format!("CREATE TABLE IF NOT EXISTS {} ({})", self.table, self.schema);
        let mut conn = self.connect().await?;
        sqlx::raw_sql(&ddl).execute(&mut conn).await?;
        conn.close().await?;

        ctx.track_resource(&self.table);
        info!("Provisioned table '{}'", self.table);
        Ok(())
    }

    async fn rollback(&self, ctx: &mut ExecutionContext) -> Result<()> {
        if !ctx.has_resource(&self.table) {
            // already released by an earlier rollback
            return Ok(());
        }

        let mut conn = self.connect().await?;
        sqlx::raw_sql(&format!("DROP TABLE IF EXISTS {}", self.table))
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        ctx.release_resource(&self.table);
        info!("Dropped table '{}'", self.table);
        Ok(())
    }
}
