//! Application services: sanitize, validate, then delegate to a store.

pub mod management;
pub mod surfer;
pub mod user;

pub use management::{import_violations, ImportEntryError, ManagementError, ManagementService};
pub use surfer::{SurferError, SurferService};
pub use user::{SignedIn, UserError, UserService};

use crate::types::SpotsParams;
use crate::validation::{conditions, validate_one, FieldError, ValidationErrors, Validator};

pub const MAX_SEARCH_QUERY_LEN: usize = 100;

/// Spot ids are opaque; only presence is checked.
pub(crate) fn validate_spot_id(id: &str) -> Result<(), ValidationErrors> {
    validate_one(conditions::non_empty(id), FieldError::InvalidSpotId)?;
    Ok(())
}

/// Search filters of an already sanitized request. Empty filters are absent,
/// not invalid, and each bound corner is checked on its own.
pub(crate) fn validate_spots_params(params: &SpotsParams) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.register(
        conditions::max_len(&params.search_query, MAX_SEARCH_QUERY_LEN),
        FieldError::InvalidSearchQuery,
    );
    if !params.country_code.is_empty() {
        v.register(conditions::country_code(&params.country_code), FieldError::InvalidCountryCode);
    }
    if let Some(bounds) = &params.bounds {
        v.register(conditions::latitude(bounds.north_east.latitude), FieldError::InvalidNorthEastLatitude)
            .register(conditions::longitude(bounds.north_east.longitude), FieldError::InvalidNorthEastLongitude)
            .register(conditions::latitude(bounds.south_west.latitude), FieldError::InvalidSouthWestLatitude)
            .register(conditions::longitude(bounds.south_west.longitude), FieldError::InvalidSouthWestLongitude);
    }
    v.validate()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::geo::{Coordinates, Location};
    use crate::types::{CreateSpotParams, Spot};

    pub fn location() -> Location {
        Location {
            locality: "Locality 1".into(),
            country_code: "kz".into(),
            coordinates: Coordinates::new(1.23, 3.21),
        }
    }

    pub fn spot(id: &str) -> Spot {
        Spot {
            id: id.into(),
            name: "Spot 1".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            location: location(),
        }
    }

    pub fn create_params(name: &str) -> CreateSpotParams {
        CreateSpotParams {
            name: name.into(),
            location: location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Bounds, Coordinates};

    #[test]
    fn empty_filters_are_not_validated() {
        assert!(validate_spots_params(&SpotsParams::default()).is_ok());
    }

    #[test]
    fn search_query_length_is_bounded() {
        let ok = SpotsParams { search_query: "a".repeat(MAX_SEARCH_QUERY_LEN), ..Default::default() };
        assert!(validate_spots_params(&ok).is_ok());

        let too_long = SpotsParams { search_query: "a".repeat(MAX_SEARCH_QUERY_LEN + 1), ..Default::default() };
        let err = validate_spots_params(&too_long).unwrap_err();
        assert_eq!(err.errors(), &[FieldError::InvalidSearchQuery]);
    }

    #[test]
    fn every_bound_corner_is_reported() {
        let params = SpotsParams {
            bounds: Some(Bounds::new(Coordinates::new(95.0, 10.0), Coordinates::new(10.0, -200.0))),
            ..Default::default()
        };
        let err = validate_spots_params(&params).unwrap_err();
        assert_eq!(
            err.errors(),
            &[FieldError::InvalidNorthEastLatitude, FieldError::InvalidSouthWestLongitude]
        );
    }

    #[test]
    fn blank_spot_id_is_rejected() {
        assert!(validate_spot_id("abc").is_ok());
        assert_eq!(validate_spot_id("").unwrap_err().errors(), &[FieldError::InvalidSpotId]);
    }
}
