//! Coordinate to place-label resolution

use async_trait::async_trait;
use serde::Deserialize;
use crate::Result;
use crate::remote::RemoteError;

/// Default reverse-geocoding endpoint
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// The address parts a place label is built from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Place {
    pub locality: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl Place {
    /// "locality, region, country" using only the parts that are present
    pub fn label(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.locality, &self.region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Look up the place at the given coordinates; `None` when nothing is known
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<Place>>;
}

/// Plain coordinate label used when no place name is available
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("Lat: {:.4}, Lng: {:.4}", latitude, longitude)
}

/// Resolve a label for the coordinates, never failing
pub async fn resolve_place(geocoder: &dyn ReverseGeocoder, latitude: f64, longitude: f64) -> String {
    match geocoder.reverse(latitude, longitude).await {
        Ok(Some(place)) => place
            .label()
            .unwrap_or_else(|| format_coordinates(latitude, longitude)),
        Ok(None) => format_coordinates(latitude, longitude),
        Err(e) => {
            tracing::warn!("Reverse geocoding failed: {}", e);
            format_coordinates(latitude, longitude)
        }
    }
}

/// Reverse geocoder backed by an OpenStreetMap Nominatim endpoint
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimGeocoder {
    pub fn new() -> std::result::Result<Self, RemoteError> {
        Self::with_base_url(NOMINATIM_URL)
    }

    pub fn with_base_url(base_url: &str) -> std::result::Result<Self, RemoteError> {
        // Nominatim rejects requests without an identifying user agent
        let client = reqwest::Client::builder()
            .user_agent(concat!("pulse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<Place>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .send()
            .await
            .map_err(RemoteError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status: status.as_u16(), body }.into());
        }

        let text = response.text().await.map_err(RemoteError::from)?;
        let parsed: NominatimResponse = serde_json::from_str(&text).map_err(RemoteError::from)?;

        Ok(parsed.address.map(|a| Place {
            locality: a.city.or(a.town).or(a.village).or(a.hamlet),
            region: a.state,
            country: a.country,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct FailingGeocoder;

    #[async_trait]
    impl ReverseGeocoder for FailingGeocoder {
        async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Option<Place>> {
            Err(Error::InvalidValue("offline".to_string()))
        }
    }

    struct EmptyPlace;

    #[async_trait]
    impl ReverseGeocoder for EmptyPlace {
        async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Option<Place>> {
            Ok(Some(Place::default()))
        }
    }

    #[test]
    fn test_format_coordinates() {
        assert_eq!(format_coordinates(12.345678, -1.23456), "Lat: 12.3457, Lng: -1.2346");
    }

    #[test]
    fn test_place_label_skips_missing_parts() {
        let place = Place {
            locality: None,
            region: Some("Bavaria".to_string()),
            country: Some("Germany".to_string()),
        };
        assert_eq!(place.label().as_deref(), Some("Bavaria, Germany"));
        assert_eq!(Place::default().label(), None);
    }

    #[tokio::test]
    async fn test_resolve_place_falls_back() {
        assert_eq!(resolve_place(&FailingGeocoder, 1.0, 2.0).await, "Lat: 1.0000, Lng: 2.0000");
        assert_eq!(resolve_place(&EmptyPlace, 1.0, 2.0).await, "Lat: 1.0000, Lng: 2.0000");
    }
}
