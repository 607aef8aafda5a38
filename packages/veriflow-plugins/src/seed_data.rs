use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::info;
use veriflow_orchestration::{ExecutionContext, Result, SetupPlugin};

/// Seeds fixture rows into an existing table and removes exactly those
/// rows on rollback; rows that were already in the table survive.
/// Tracks a `<table>:seed` resource so rollback stays guarded on what
/// this plugin actually did.
#[derive(Debug)]
pub struct SeedData {
    name: String,
    connection_string: String,
    table: String,
    /// SQL value tuples, e.g. `"(1, 'alpha')"`. Inserted in order.
    rows: Vec<String>,
    /// Rowids of the rows this plugin inserted, recorded by execute and
    /// consumed by rollback.
    seeded_rowids: Mutex<Vec<i64>>,
}

impl Clone for SeedData {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            connection_string: self.connection_string.clone(),
            table: self.table.clone(),
            rows: self.rows.clone(),
            // a clone has seeded nothing yet
            seeded_rowids: Mutex::new(Vec::new()),
        }
    }
}

impl SeedData {
    pub fn new(
        connection_string: impl Into<String>,
        table: impl Into<String>,
        rows: Vec<String>,
    ) -> Self {
        let table = table.into();
        Self {
            name: format!("seed-data:{}", table),
            connection_string: connection_string.into(),
            table,
            rows,
            seeded_rowids: Mutex::new(Vec::new()),
        }
    }

    fn resource(&self) -> String {
        format!("{}:seed", self.table)
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        let options =
            SqliteConnectOptions::from_str(&self.connection_string)?.create_if_missing(true);
        Ok(SqliteConnection::connect_with(&options).await?)
    }
}

#[async_trait(?Send)]
impl SetupPlugin for SeedData {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<()> {
        if self.rows.is_empty() {
            return Ok(());
        }

        let insert = format!(
            "INSERT INTO {} VALUES {} RETURNING rowid",
            self.table,
            self.rows.join(", ")
        );
        let mut conn = self.connect().await?;
        let rowids = sqlx::query_scalar::<_, i64>(&insert)
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;

        *self.seeded_rowids.lock().unwrap() = rowids;
        ctx.track_resource(self.resource());
        info!("Seeded {} rows into '{}'", self.rows.len(), self.table);
        Ok(())
    }

    async fn rollback(&self, ctx: &mut ExecutionContext) -> Result<()> {
        let resource = self.resource();
        if !ctx.has_resource(&resource) {
            return Ok(());
        }

        // Delete only the rows execute inserted; pre-existing rows in
        // the table are not this plugin's to remove
        let rowids = self.seeded_rowids.lock().unwrap().clone();
        if !rowids.is_empty() {
            let ids = rowids
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let delete = format!("DELETE FROM {} WHERE rowid IN ({})", self.table, ids);
            let mut conn = self.connect().await?;
            sqlx::raw_sql(&delete).execute(&mut conn).await?;
            conn.close().await?;
        }

        self.seeded_rowids.lock().unwrap().clear();
        ctx.release_resource(&resource);
        info!("Removed {} seed rows from '{}'", rowids.len(), self.table);
        Ok(())
    }
}
