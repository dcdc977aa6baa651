use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::geo::{Coordinates, Location};
use crate::types::Spot;

#[derive(Debug, Clone, FromRow)]
pub struct SpotRow {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub locality: String,
    pub country_code: String,
    pub created_at: DateTime<Utc>,
}

impl From<SpotRow> for Spot {
    fn from(row: SpotRow) -> Self {
        Spot {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            location: Location {
                locality: row.locality,
                country_code: row.country_code,
                coordinates: Coordinates::new(row.latitude, row.longitude),
            },
        }
    }
}
