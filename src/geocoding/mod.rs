//! Reverse geocoding: coordinates in, locality and country out.

pub mod nominatim;

use async_trait::async_trait;
use thiserror::Error;

use crate::geo::{Coordinates, Location};

pub use nominatim::NominatimClient;

#[derive(Debug, Error)]
pub enum LocationSourceError {
    #[error("no location found for the given coordinates")]
    NotFound,
    #[error("location provider unreachable: {0}")]
    Transport(String),
    #[error("unexpected location provider response: {0}")]
    Decode(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn location(&self, coordinates: Coordinates) -> Result<Location, LocationSourceError>;
}
