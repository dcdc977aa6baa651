use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use crate::batch::{write_in_batches, BatchWriter};
use crate::database::manager::DatabaseError;
use crate::database::models::SpotRow;
use crate::database::query_builder::{QueryBuilder, INSERT_PARAMS_PER_ROW};
use crate::types::{CreateSpotParams, Spot, SpotsQuery, UpdateSpotParams};

/// Postgres caps a statement at 65535 bind parameters.
pub const MAX_IMPORT_BATCH_SIZE: usize = u16::MAX as usize / INSERT_PARAMS_PER_ROW;

/// Persistence contract for spots.
///
/// `NotFound` and `EmptyUpdate` are the only non-infrastructure failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotStore: Send + Sync {
    async fn spot(&self, id: &str) -> Result<Spot, DatabaseError>;

    /// An empty page is a valid result.
    async fn spots(&self, query: SpotsQuery) -> Result<Vec<Spot>, DatabaseError>;

    async fn create_spot(&self, params: CreateSpotParams) -> Result<Spot, DatabaseError>;

    async fn update_spot(&self, params: UpdateSpotParams) -> Result<Spot, DatabaseError>;

    async fn delete_spot(&self, id: &str) -> Result<(), DatabaseError>;

    /// All-or-nothing bulk insert; returns the number of rows written.
    async fn create_spots(&self, entries: Vec<CreateSpotParams>) -> Result<u64, DatabaseError>;
}

pub struct PgSpotStore {
    pool: PgPool,
    batch_size: usize,
}

impl PgSpotStore {
    pub fn new(pool: PgPool, batch_size: usize) -> Self {
        Self {
            pool,
            batch_size: batch_size.clamp(1, MAX_IMPORT_BATCH_SIZE),
        }
    }
}

fn spot_not_found(id: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("spot {}", id))
}

#[async_trait]
impl SpotStore for PgSpotStore {
    async fn spot(&self, id: &str) -> Result<Spot, DatabaseError> {
        let sql = QueryBuilder::select_spot(id);
        sql.query_as::<SpotRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(Spot::from)
            .ok_or_else(|| spot_not_found(id))
    }

    async fn spots(&self, query: SpotsQuery) -> Result<Vec<Spot>, DatabaseError> {
        let sql = QueryBuilder::select_spots(&query);
        debug!("Spot search: {}", sql.query);
        let rows = sql.query_as::<SpotRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Spot::from).collect())
    }

    async fn create_spot(&self, params: CreateSpotParams) -> Result<Spot, DatabaseError> {
        let sql = QueryBuilder::insert_spot(&params);
        let row = sql.query_as::<SpotRow>().fetch_one(&self.pool).await?;
        info!("Created spot {}", row.id);
        Ok(row.into())
    }

    async fn update_spot(&self, params: UpdateSpotParams) -> Result<Spot, DatabaseError> {
        let sql = QueryBuilder::update_spot(&params)?;
        sql.query_as::<SpotRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(Spot::from)
            .ok_or_else(|| spot_not_found(&params.id))
    }

    async fn delete_spot(&self, id: &str) -> Result<(), DatabaseError> {
        let sql = QueryBuilder::delete_spot(id);
        let result = sql.query().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(spot_not_found(id));
        }
        info!("Deleted spot {}", id);
        Ok(())
    }

    async fn create_spots(&self, entries: Vec<CreateSpotParams>) -> Result<u64, DatabaseError> {
        let tx = self.pool.begin().await?;
        let written = write_in_batches(PgBatchWriter { tx }, &entries, self.batch_size).await?;
        info!("Imported {} spots in batches of {}", written, self.batch_size);
        Ok(written)
    }
}

/// One import transaction shared by every batch.
struct PgBatchWriter {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BatchWriter<CreateSpotParams> for PgBatchWriter {
    type Error = DatabaseError;

    async fn insert_batch(&mut self, items: &[CreateSpotParams]) -> Result<u64, DatabaseError> {
        let sql = QueryBuilder::insert_spots(items);
        let result = sql.query().execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
