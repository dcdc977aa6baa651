use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::{validate_spot_id, validate_spots_params};
use crate::database::{DatabaseError, SpotStore};
use crate::types::{Spot, SpotsParams};
use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum SurferError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationErrors),
    #[error("spot not found")]
    SpotNotFound,
    #[error("spot store failure: {0}")]
    Internal(#[source] DatabaseError),
}

impl From<DatabaseError> for SurferError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(_) => SurferError::SpotNotFound,
            other => SurferError::Internal(other),
        }
    }
}

/// Read-only spot access for anonymous callers.
#[derive(Clone)]
pub struct SurferService {
    store: Arc<dyn SpotStore>,
}

impl SurferService {
    pub fn new(store: Arc<dyn SpotStore>) -> Self {
        Self { store }
    }

    pub async fn spot(&self, id: &str) -> Result<Spot, SurferError> {
        let id = id.trim();
        validate_spot_id(id)?;
        Ok(self.store.spot(id).await?)
    }

    /// Search never matches spot ids for unprivileged callers.
    pub async fn spots(&self, params: SpotsParams) -> Result<Vec<Spot>, SurferError> {
        let params = params.sanitize();
        if let Err(errors) = validate_spots_params(&params) {
            debug!("Rejected spot search: {}", errors);
            return Err(errors.into());
        }
        Ok(self.store.spots(params.into_query(false)).await?)
    }
}
