//! Shared types used across the codebase

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{Bounds, Location};
use crate::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT};

/// A named surf location. Owned by the store; services never cache it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub location: Location,
}

/// Search request as it arrives from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotsParams {
    pub limit: i64,
    pub offset: i64,
    /// Empty means "no country filter".
    pub country_code: String,
    /// Empty means "no text filter".
    pub search_query: String,
    pub bounds: Option<Bounds>,
}

impl Default for SpotsParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            country_code: String::new(),
            search_query: String::new(),
            bounds: None,
        }
    }
}

impl SpotsParams {
    pub fn sanitize(self) -> Self {
        Self {
            limit: clamp_limit(self.limit),
            offset: clamp_offset(self.offset),
            country_code: self.country_code.trim().to_lowercase(),
            search_query: self.search_query.trim().to_string(),
            bounds: self.bounds,
        }
    }

    /// Paging window the request resolves to once clamped.
    pub fn page(&self) -> (i64, i64) {
        (clamp_limit(self.limit), clamp_offset(self.offset))
    }

    /// Store-facing query; `match_id` widens the text search to spot ids.
    pub fn into_query(self, match_id: bool) -> SpotsQuery {
        SpotsQuery {
            limit: self.limit,
            offset: self.offset,
            country_code: Some(self.country_code).filter(|c| !c.is_empty()),
            search: Some(self.search_query)
                .filter(|q| !q.is_empty())
                .map(|text| SearchQuery { text, match_id }),
            bounds: self.bounds,
        }
    }
}

/// Sanitized, validated search handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotsQuery {
    pub limit: i64,
    pub offset: i64,
    pub country_code: Option<String>,
    pub search: Option<SearchQuery>,
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub match_id: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSpotParams {
    pub name: String,
    pub location: Location,
}

impl CreateSpotParams {
    pub fn sanitize(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            location: Location {
                locality: self.location.locality.trim().to_string(),
                country_code: self.location.country_code.trim().to_lowercase(),
                coordinates: self.location.coordinates,
            },
        }
    }
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateSpotParams {
    pub id: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub locality: Option<String>,
    pub country_code: Option<String>,
}

impl UpdateSpotParams {
    pub fn sanitize(self) -> Self {
        let trim = |s: String| s.trim().to_string();
        Self {
            id: self.id.trim().to_string(),
            name: self.name.map(trim),
            latitude: self.latitude,
            longitude: self.longitude,
            locality: self.locality.map(trim),
            country_code: self.country_code.map(|c| c.trim().to_lowercase()),
        }
    }

    /// True when no field besides the id is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.locality.is_none()
            && self.country_code.is_none()
    }
}

/// Administrator account as exposed outside the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateUserParams {
    pub email: String,
    pub password: String,
    pub role: String,
}

impl CreateUserParams {
    pub fn sanitize(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            password: self.password,
            role: self.role.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignInParams {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn create_params() -> CreateSpotParams {
        CreateSpotParams {
            name: "  Spot 1  ".into(),
            location: Location {
                locality: " Locality 1 ".into(),
                country_code: " kz ".into(),
                coordinates: Coordinates::new(1.23, 3.21),
            },
        }
    }

    #[test]
    fn create_sanitize_trims_strings() {
        let p = create_params().sanitize();
        assert_eq!(p.name, "Spot 1");
        assert_eq!(p.location.locality, "Locality 1");
        assert_eq!(p.location.country_code, "kz");
        assert_eq!(p.location.coordinates, Coordinates::new(1.23, 3.21));
    }

    #[test]
    fn page_clamps_without_touching_the_request() {
        let params = SpotsParams {
            limit: 0,
            offset: -5,
            country_code: " PT ".into(),
            ..SpotsParams::default()
        };
        assert_eq!(params.page(), (10, 0));
        assert_eq!(params.limit, 0);
        assert_eq!(params.country_code, " PT ");
    }

    #[test]
    fn create_sanitize_is_idempotent() {
        let once = create_params().sanitize();
        let twice = once.clone().sanitize();
        assert_eq!(once, twice);
    }

    #[test]
    fn spots_sanitize_normalizes_filters() {
        let p = SpotsParams {
            limit: 0,
            offset: -4,
            country_code: "  PT ".into(),
            search_query: "  peniche ".into(),
            bounds: None,
        }
        .sanitize();
        assert_eq!(p.limit, DEFAULT_LIMIT);
        assert_eq!(p.offset, 0);
        assert_eq!(p.country_code, "pt");
        assert_eq!(p.search_query, "peniche");
    }

    #[test]
    fn empty_filters_become_absent_in_query() {
        let q = SpotsParams::default().sanitize().into_query(true);
        assert_eq!(q.country_code, None);
        assert_eq!(q.search, None);
    }

    #[test]
    fn query_carries_id_matching_flag() {
        let q = SpotsParams { search_query: "abc".into(), ..Default::default() }.into_query(false);
        assert_eq!(q.search, Some(SearchQuery { text: "abc".into(), match_id: false }));
    }

    #[test]
    fn update_presence_survives_sanitize() {
        let p = UpdateSpotParams {
            id: " 42 ".into(),
            name: Some("   ".into()),
            ..Default::default()
        }
        .sanitize();
        assert_eq!(p.id, "42");
        assert_eq!(p.name.as_deref(), Some(""));
        assert!(!p.is_empty());
        assert!(UpdateSpotParams { id: "42".into(), ..Default::default() }.is_empty());
    }

    #[test]
    fn user_sanitize_lowercases_email() {
        let p = CreateUserParams {
            email: "  Admin@Example.COM ".into(),
            password: " secret pass ".into(),
            role: " admin ".into(),
        }
        .sanitize();
        assert_eq!(p.email, "admin@example.com");
        assert_eq!(p.password, " secret pass ");
        assert_eq!(p.role, "admin");
    }
}
