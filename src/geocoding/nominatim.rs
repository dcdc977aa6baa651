use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{LocationSource, LocationSourceError};
use crate::config::GeocodingConfig;
use crate::geo::{Coordinates, Location};
use crate::validation::country;

/// Address detail level of a city.
const ZOOM: &str = "10";

/// Client for a Nominatim-compatible `/reverse` endpoint.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseResponse {
    error: Option<String>,
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country_code: Option<String>,
}

impl Address {
    /// Most specific named place present.
    fn locality(&self) -> Option<&str> {
        [
            &self.city,
            &self.town,
            &self.village,
            &self.municipality,
            &self.county,
            &self.state,
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
    }
}

impl NominatimClient {
    pub fn new(settings: &GeocodingConfig) -> Result<Self, LocationSourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| LocationSourceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn to_location(response: ReverseResponse, coordinates: Coordinates) -> Result<Location, LocationSourceError> {
    if let Some(error) = response.error {
        debug!("Reverse lookup returned no match: {}", error);
        return Err(LocationSourceError::NotFound);
    }
    let address = response.address.ok_or(LocationSourceError::NotFound)?;
    let locality = address.locality().ok_or(LocationSourceError::NotFound)?;
    let country_code = address
        .country_code
        .as_deref()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| country::is_valid(c))
        .ok_or(LocationSourceError::NotFound)?;

    Ok(Location {
        locality: locality.to_string(),
        country_code,
        coordinates,
    })
}

#[async_trait]
impl LocationSource for NominatimClient {
    async fn location(&self, coordinates: Coordinates) -> Result<Location, LocationSourceError> {
        let endpoint = format!("{}/reverse", self.base_url);
        let lat = coordinates.latitude.to_string();
        let lon = coordinates.longitude.to_string();

        let resp = self
            .client
            .get(&endpoint)
            .query(&[("format", "jsonv2"), ("lat", lat.as_str()), ("lon", lon.as_str()), ("zoom", ZOOM)])
            .send()
            .await
            .map_err(|e| LocationSourceError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LocationSourceError::Transport(format!(
                "{} returned {}",
                endpoint, status
            )));
        }

        let body: ReverseResponse = resp
            .json()
            .await
            .map_err(|e| LocationSourceError::Decode(e.to_string()))?;

        to_location(body, coordinates)
    }
}
