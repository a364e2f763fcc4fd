//! Unit of Work
//!
//! Transactional boundaries for multi-statement database operations.
//! All statements run through one `TransactionContext` either commit
//! together or are rolled back together.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::shared::error::AppError;

/// Transaction context that wraps a SQLx transaction.
pub struct TransactionContext {
    tx: Transaction<'static, Postgres>,
}

impl TransactionContext {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Connection to run queries on inside the transaction.
    pub fn executor(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await.map_err(AppError::Database)
    }
}

/// Execute a closure within a transaction.
///
/// Commits when the closure hands the context back with `Ok`; on `Err`
/// the context is dropped and the transaction rolls back.
///
/// # Example
/// ```ignore
/// let id = with_transaction(&pool, |mut tx| async move {
///     let id: i64 = sqlx::query_scalar("INSERT INTO ... RETURNING id")
///         .fetch_one(tx.executor())
///         .await?;
///     Ok((id, tx))
/// }).await?;
/// ```
pub async fn with_transaction<F, Fut, T>(pool: &PgPool, f: F) -> Result<T, AppError>
where
    F: FnOnce(TransactionContext) -> Fut,
    Fut: std::future::Future<Output = Result<(T, TransactionContext), AppError>>,
{
    let tx = pool.begin().await.map_err(AppError::Database)?;
    let ctx = TransactionContext::new(tx);

    let (result, ctx) = f(ctx).await?;
    ctx.commit().await?;
    Ok(result)
}
