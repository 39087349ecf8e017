//! Statement execution over a single database connection.
//!
//! All statements of a load share one transaction that is committed once. Dropping a
//! [`SqlxExecutor`] without committing rolls that transaction back.

use sqlx::any::AnyPoolOptions;
use sqlx::{Any, AnyPool, Transaction};
use tokio::runtime::Runtime;

use crate::error::{PipelineError, PipelineResult};

use super::config::DatabaseConfig;
use super::split::SqlStatement;

/// Executes statements against one open connection and commits once at the end.
///
/// [`SqlxExecutor`] is the production implementation; tests may substitute their own.
pub trait SqlExecutor {
    /// Execute a single statement, returning the number of affected rows.
    fn execute(&mut self, statement: &SqlStatement) -> PipelineResult<u64>;

    /// Commit everything executed so far.
    fn commit(&mut self) -> PipelineResult<()>;
}

/// `sqlx` executor over a single-connection pool holding one open transaction.
///
/// The driver is async; each call blocks on a private current-thread runtime.
pub struct SqlxExecutor {
    tx: Option<Transaction<'static, Any>>,
    pool: AnyPool,
    runtime: Runtime,
}

impl SqlxExecutor {
    /// Connect with the MySQL URL built from `config`.
    pub fn connect(config: &DatabaseConfig) -> PipelineResult<Self> {
        log::debug!(
            "connecting to {}:{} database={}",
            config.host,
            config.port.map(|p| p.to_string()).unwrap_or_else(|| "default".to_string()),
            config.database
        );
        Self::connect_url(&config.connection_url())
    }

    /// Connect with any URL the `sqlx` `Any` driver accepts (`mysql://`, `sqlite://`).
    pub fn connect_url(url: &str) -> PipelineResult<Self> {
        sqlx::any::install_default_drivers();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (pool, tx) = runtime
            .block_on(async {
                let pool = AnyPoolOptions::new().max_connections(1).connect(url).await?;
                let tx = pool.begin().await?;
                Ok::<_, sqlx::Error>((pool, tx))
            })
            .map_err(|e| PipelineError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self {
            tx: Some(tx),
            pool,
            runtime,
        })
    }
}

impl SqlExecutor for SqlxExecutor {
    fn execute(&mut self, statement: &SqlStatement) -> PipelineResult<u64> {
        let tx = self.tx.as_mut().ok_or_else(|| PipelineError::Connection {
            message: "transaction already committed".to_string(),
        })?;

        let done = match statement {
            SqlStatement::Raw(sql) => self
                .runtime
                .block_on(sqlx::query::<Any>(sql).execute(&mut **tx))?,
            SqlStatement::Insert(insert) => {
                let (sql, params) = insert.to_parameterized();
                let mut query = sqlx::query::<Any>(&sql);
                for value in params {
                    query = query.bind(value.clone());
                }
                self.runtime.block_on(query.execute(&mut **tx))?
            }
        };
        Ok(done.rows_affected())
    }

    fn commit(&mut self) -> PipelineResult<()> {
        if let Some(tx) = self.tx.take() {
            self.runtime
                .block_on(tx.commit())
                .map_err(|e| PipelineError::Connection {
                    message: format!("commit failed: {e}"),
                })?;
        }
        Ok(())
    }
}

impl Drop for SqlxExecutor {
    fn drop(&mut self) {
        // Connections must go back to the pool while the runtime is still alive.
        if let Some(tx) = self.tx.take() {
            if let Err(e) = self.runtime.block_on(tx.rollback()) {
                log::warn!("rollback of uncommitted work failed: {e}");
            }
        }
        self.runtime.block_on(self.pool.close());
    }
}
