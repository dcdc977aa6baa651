use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{validate_spot_id, validate_spots_params};
use crate::database::{DatabaseError, SpotStore};
use crate::geo::{Coordinates, Location};
use crate::geocoding::{LocationSource, LocationSourceError};
use crate::types::{CreateSpotParams, Spot, SpotsParams, UpdateSpotParams};
use crate::validation::{conditions, FieldError, FieldViolation, ValidationErrors, Validator};

#[derive(Debug, Error)]
pub enum ManagementError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationErrors),
    #[error("{} import entries are invalid", .0.len())]
    InvalidImportEntries(Vec<ImportEntryError>),
    #[error("spot not found")]
    SpotNotFound,
    #[error("location not found")]
    LocationNotFound,
    #[error("update has no fields to change")]
    EmptyUpdateEntry,
    #[error("location provider failure: {0}")]
    LocationProvider(#[source] LocationSourceError),
    #[error("spot store failure: {0}")]
    Internal(#[source] DatabaseError),
}

/// Violations of one entry of a bulk import, by position in the input.
#[derive(Debug)]
pub struct ImportEntryError {
    pub index: usize,
    pub errors: ValidationErrors,
}

/// Flattens entry errors into field violations named `[index].field`.
pub fn import_violations(entries: &[ImportEntryError]) -> Vec<FieldViolation> {
    entries
        .iter()
        .flat_map(|entry| {
            entry.errors.violations().into_iter().map(move |v| FieldViolation {
                field: format!("[{}].{}", entry.index, v.field),
                message: v.message,
            })
        })
        .collect()
}

impl From<DatabaseError> for ManagementError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(_) => ManagementError::SpotNotFound,
            DatabaseError::EmptyUpdate => ManagementError::EmptyUpdateEntry,
            other => ManagementError::Internal(other),
        }
    }
}

impl From<LocationSourceError> for ManagementError {
    fn from(err: LocationSourceError) -> Self {
        match err {
            LocationSourceError::NotFound => ManagementError::LocationNotFound,
            other => ManagementError::LocationProvider(other),
        }
    }
}

/// Spot administration for authorized callers.
#[derive(Clone)]
pub struct ManagementService {
    store: Arc<dyn SpotStore>,
    locations: Arc<dyn LocationSource>,
}

impl ManagementService {
    pub fn new(store: Arc<dyn SpotStore>, locations: Arc<dyn LocationSource>) -> Self {
        Self { store, locations }
    }

    pub async fn spot(&self, id: &str) -> Result<Spot, ManagementError> {
        let id = id.trim();
        validate_spot_id(id)?;
        Ok(self.store.spot(id).await?)
    }

    /// Like the public search, but the text also matches spot ids.
    pub async fn spots(&self, params: SpotsParams) -> Result<Vec<Spot>, ManagementError> {
        let params = params.sanitize();
        validate_spots_params(&params)?;
        Ok(self.store.spots(params.into_query(true)).await?)
    }

    pub async fn create_spot(&self, params: CreateSpotParams) -> Result<Spot, ManagementError> {
        let params = params.sanitize();
        validate_create(&params)?;
        Ok(self.store.create_spot(params).await?)
    }

    pub async fn update_spot(&self, params: UpdateSpotParams) -> Result<Spot, ManagementError> {
        let params = params.sanitize();
        validate_update(&params)?;
        if params.is_empty() {
            return Err(ManagementError::EmptyUpdateEntry);
        }
        let spot = self.store.update_spot(params).await?;
        info!("Updated spot {}", spot.id);
        Ok(spot)
    }

    pub async fn delete_spot(&self, id: &str) -> Result<(), ManagementError> {
        let id = id.trim();
        validate_spot_id(id)?;
        self.store.delete_spot(id).await?;
        Ok(())
    }

    pub async fn location(&self, coordinates: Coordinates) -> Result<Location, ManagementError> {
        let mut v = Validator::new();
        v.register(conditions::latitude(coordinates.latitude), FieldError::InvalidLatitude)
            .register(conditions::longitude(coordinates.longitude), FieldError::InvalidLongitude);
        v.validate()?;

        self.locations.location(coordinates).await.map_err(|e| {
            if !matches!(e, LocationSourceError::NotFound) {
                warn!("Reverse geocoding failed: {}", e);
            }
            ManagementError::from(e)
        })
    }

    /// Validates every entry before writing any of them; the store then
    /// inserts all of them or none.
    pub async fn import_spots(&self, entries: Vec<CreateSpotParams>) -> Result<u64, ManagementError> {
        let entries: Vec<CreateSpotParams> = entries.into_iter().map(CreateSpotParams::sanitize).collect();
        let rejected: Vec<ImportEntryError> = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| validate_create(entry).err().map(|errors| ImportEntryError { index, errors }))
            .collect();
        if !rejected.is_empty() {
            debug!("Import rejected: {} of {} entries invalid", rejected.len(), entries.len());
            return Err(ManagementError::InvalidImportEntries(rejected));
        }
        if entries.is_empty() {
            return Ok(0);
        }

        let total = entries.len();
        let imported = self.store.create_spots(entries).await?;
        info!("Imported {} of {} spots", imported, total);
        Ok(imported)
    }
}

fn validate_create(params: &CreateSpotParams) -> Result<(), ValidationErrors> {
    let location = &params.location;
    let mut v = Validator::new();
    v.register(conditions::non_empty(&params.name), FieldError::InvalidSpotName)
        .register(conditions::country_code(&location.country_code), FieldError::InvalidCountryCode)
        .register(conditions::non_empty(&location.locality), FieldError::InvalidLocality)
        .register(conditions::latitude(location.coordinates.latitude), FieldError::InvalidLatitude)
        .register(conditions::longitude(location.coordinates.longitude), FieldError::InvalidLongitude);
    v.validate()
}

/// The id is always checked; every other field only when present.
fn validate_update(params: &UpdateSpotParams) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.register(conditions::non_empty(&params.id), FieldError::InvalidSpotId)
        .register_some(params.name.as_deref(), |name| !name.is_empty(), FieldError::InvalidSpotName)
        .register_some(params.latitude, conditions::is_latitude, FieldError::InvalidLatitude)
        .register_some(params.longitude, conditions::is_longitude, FieldError::InvalidLongitude)
        .register_some(params.locality.as_deref(), |locality| !locality.is_empty(), FieldError::InvalidLocality)
        .register_some(
            params.country_code.as_deref(),
            crate::validation::country::is_valid,
            FieldError::InvalidCountryCode,
        );
    v.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::spot_store::MockSpotStore;
    use crate::geocoding::MockLocationSource;
    use crate::services::fixtures;
    use crate::types::{SearchQuery, SpotsQuery};

    fn service(store: MockSpotStore) -> ManagementService {
        ManagementService::new(Arc::new(store), Arc::new(MockLocationSource::new()))
    }

    fn with_locations(locations: MockLocationSource) -> ManagementService {
        ManagementService::new(Arc::new(MockSpotStore::new()), Arc::new(locations))
    }

    fn invalid_input(err: ManagementError) -> Vec<FieldError> {
        match err {
            ManagementError::InvalidInput(errors) => errors.into_inner(),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_sanitizes_before_storing() {
        let mut store = MockSpotStore::new();
        store
            .expect_create_spot()
            .withf(|p: &CreateSpotParams| {
                p.name == "Spot 1"
                    && p.location.locality == "Locality 1"
                    && p.location.country_code == "kz"
                    && p.location.coordinates == Coordinates::new(1.23, 3.21)
            })
            .times(1)
            .returning(|_| Ok(fixtures::spot("new-id")));

        let params = CreateSpotParams {
            name: "  Spot 1  ".into(),
            location: Location {
                locality: " Locality 1 ".into(),
                country_code: " kz ".into(),
                coordinates: Coordinates::new(1.23, 3.21),
            },
        };
        let spot = service(store).create_spot(params).await.unwrap();
        assert_eq!(spot.id, "new-id");
    }

    #[tokio::test]
    async fn create_reports_every_invalid_field_in_order() {
        let mut store = MockSpotStore::new();
        store.expect_create_spot().never();

        let params = CreateSpotParams {
            name: "   ".into(),
            location: Location {
                locality: "".into(),
                country_code: "zz".into(),
                coordinates: Coordinates::new(100.0, -190.0),
            },
        };
        let err = service(store).create_spot(params).await.unwrap_err();
        assert_eq!(
            invalid_input(err),
            vec![
                FieldError::InvalidSpotName,
                FieldError::InvalidCountryCode,
                FieldError::InvalidLocality,
                FieldError::InvalidLatitude,
                FieldError::InvalidLongitude,
            ]
        );
    }

    #[tokio::test]
    async fn search_also_matches_ids() {
        let mut store = MockSpotStore::new();
        store
            .expect_spots()
            .withf(|q: &SpotsQuery| {
                q.search == Some(SearchQuery { text: "4f2a".into(), match_id: true })
            })
            .times(1)
            .returning(|_| Ok(vec![fixtures::spot("4f2a0000")]));

        let params = SpotsParams { search_query: " 4f2a ".into(), ..Default::default() };
        assert_eq!(service(store).spots(params).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_with_only_an_id_is_an_empty_update() {
        let mut store = MockSpotStore::new();
        store.expect_update_spot().never();

        let params = UpdateSpotParams { id: "abc".into(), ..Default::default() };
        let err = service(store).update_spot(params).await.unwrap_err();
        assert!(matches!(err, ManagementError::EmptyUpdateEntry));
    }

    #[tokio::test]
    async fn store_empty_update_maps_to_empty_update_entry() {
        let mut store = MockSpotStore::new();
        store.expect_update_spot().returning(|_| Err(DatabaseError::EmptyUpdate));

        let params = UpdateSpotParams { id: "abc".into(), name: Some("x".into()), ..Default::default() };
        let err = service(store).update_spot(params).await.unwrap_err();
        assert!(matches!(err, ManagementError::EmptyUpdateEntry));
    }

    #[tokio::test]
    async fn update_validates_only_present_fields() {
        let mut store = MockSpotStore::new();
        store.expect_update_spot().never();

        let params = UpdateSpotParams {
            id: " ".into(),
            name: Some("  ".into()),
            longitude: Some(200.0),
            ..Default::default()
        };
        let err = service(store).update_spot(params).await.unwrap_err();
        assert_eq!(
            invalid_input(err),
            vec![FieldError::InvalidSpotId, FieldError::InvalidSpotName, FieldError::InvalidLongitude]
        );
    }

    #[tokio::test]
    async fn update_passes_sanitized_fields_through() {
        let mut store = MockSpotStore::new();
        store
            .expect_update_spot()
            .withf(|p: &UpdateSpotParams| {
                p.id == "abc"
                    && p.name.as_deref() == Some("Supertubos")
                    && p.country_code.as_deref() == Some("pt")
                    && p.latitude.is_none()
                    && p.locality.is_none()
            })
            .times(1)
            .returning(|p| Ok(fixtures::spot(&p.id)));

        let params = UpdateSpotParams {
            id: " abc ".into(),
            name: Some(" Supertubos ".into()),
            country_code: Some("PT".into()),
            ..Default::default()
        };
        assert_eq!(service(store).update_spot(params).await.unwrap().id, "abc");
    }

    #[tokio::test]
    async fn update_of_missing_spot_is_not_found() {
        let mut store = MockSpotStore::new();
        store
            .expect_update_spot()
            .returning(|p| Err(DatabaseError::NotFound(format!("spot {}", p.id))));

        let params = UpdateSpotParams { id: "abc".into(), latitude: Some(10.0), ..Default::default() };
        let err = service(store).update_spot(params).await.unwrap_err();
        assert!(matches!(err, ManagementError::SpotNotFound));
    }

    #[tokio::test]
    async fn delete_maps_missing_rows_to_not_found() {
        let mut store = MockSpotStore::new();
        store
            .expect_delete_spot()
            .withf(|id: &str| id == "abc")
            .returning(|id| Err(DatabaseError::NotFound(format!("spot {id}"))));

        let err = service(store).delete_spot(" abc ").await.unwrap_err();
        assert!(matches!(err, ManagementError::SpotNotFound));
    }

    #[tokio::test]
    async fn delete_requires_an_id() {
        let mut store = MockSpotStore::new();
        store.expect_delete_spot().never();

        let err = service(store).delete_spot("").await.unwrap_err();
        assert_eq!(invalid_input(err), vec![FieldError::InvalidSpotId]);
    }

    #[tokio::test]
    async fn location_reports_both_coordinates() {
        let mut locations = MockLocationSource::new();
        locations.expect_location().never();

        let err = with_locations(locations)
            .location(Coordinates::new(-95.0, 190.0))
            .await
            .unwrap_err();
        assert_eq!(invalid_input(err), vec![FieldError::InvalidLatitude, FieldError::InvalidLongitude]);
    }

    #[tokio::test]
    async fn location_not_found_is_translated() {
        let mut locations = MockLocationSource::new();
        locations
            .expect_location()
            .returning(|_| Err(LocationSourceError::NotFound));

        let err = with_locations(locations)
            .location(Coordinates::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ManagementError::LocationNotFound));
    }

    #[tokio::test]
    async fn location_provider_failures_are_not_not_found() {
        let mut locations = MockLocationSource::new();
        locations
            .expect_location()
            .returning(|_| Err(LocationSourceError::Transport("timed out".into())));

        let err = with_locations(locations)
            .location(Coordinates::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ManagementError::LocationProvider(_)));
    }

    #[tokio::test]
    async fn location_returns_the_source_result() {
        let mut locations = MockLocationSource::new();
        locations
            .expect_location()
            .withf(|c: &Coordinates| *c == Coordinates::new(1.23, 3.21))
            .returning(|_| Ok(fixtures::location()));

        let location = with_locations(locations)
            .location(Coordinates::new(1.23, 3.21))
            .await
            .unwrap();
        assert_eq!(location, fixtures::location());
    }

    #[tokio::test]
    async fn import_reports_every_invalid_entry() {
        let mut store = MockSpotStore::new();
        store.expect_create_spots().never();

        let mut bad = fixtures::create_params("  ");
        bad.location.country_code = "zz".into();
        let entries = vec![fixtures::create_params("a"), bad, fixtures::create_params("")];

        let err = service(store).import_spots(entries).await.unwrap_err();
        match err {
            ManagementError::InvalidImportEntries(rejected) => {
                let indexes: Vec<usize> = rejected.iter().map(|e| e.index).collect();
                assert_eq!(indexes, vec![1, 2]);
                assert_eq!(
                    rejected[0].errors.errors(),
                    &[FieldError::InvalidSpotName, FieldError::InvalidCountryCode]
                );
                assert_eq!(rejected[1].errors.errors(), &[FieldError::InvalidSpotName]);

                let fields: Vec<String> = import_violations(&rejected).into_iter().map(|v| v.field).collect();
                assert_eq!(fields, vec!["[1].name", "[1].country_code", "[2].name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn import_sanitizes_and_delegates() {
        let mut store = MockSpotStore::new();
        store
            .expect_create_spots()
            .withf(|entries: &Vec<CreateSpotParams>| {
                entries.len() == 2 && entries.iter().all(|e| e.name == "Spot")
            })
            .times(1)
            .returning(|entries| Ok(entries.len() as u64));

        let entries = vec![fixtures::create_params(" Spot "), fixtures::create_params("Spot  ")];
        assert_eq!(service(store).import_spots(entries).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_import_skips_the_store() {
        let mut store = MockSpotStore::new();
        store.expect_create_spots().never();

        assert_eq!(service(store).import_spots(Vec::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_import_surfaces_as_internal() {
        let mut store = MockSpotStore::new();
        store
            .expect_create_spots()
            .returning(|_| Err(DatabaseError::QueryError("batch 2 failed".into())));

        let err = service(store)
            .import_spots(vec![fixtures::create_params("Spot")])
            .await
            .unwrap_err();
        assert!(matches!(err, ManagementError::Internal(_)));
    }
}
