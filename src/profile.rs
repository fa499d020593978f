//! User profile
//!
//! There is exactly one profile row (id 1). Every update reads the current
//! record, or the default one when none exists, changes the requested fields
//! and writes the whole record back.

use serde::{Deserialize, Serialize};
use crate::Result;
use crate::geo::{self, ReverseGeocoder};
use crate::storage::{SharedStore, SqliteStore};

/// Primary key of the singleton profile row
pub const PROFILE_ID: i64 = 1;

/// Display name used until the user picks one
pub const DEFAULT_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub image_uri: Option<String>,
    /// Free-text place label
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::named(DEFAULT_NAME)
    }
}

impl UserProfile {
    /// A profile with only a display name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_uri: None,
            location: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Coordinates, when both halves are known
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Read-modify-write operations on the profile record
#[derive(Clone)]
pub struct ProfileService {
    store: SharedStore,
}

impl ProfileService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The stored profile, if any
    pub async fn profile(&self) -> Result<Option<UserProfile>> {
        self.store.lock().await.get_profile()
    }

    /// Replace the whole record
    pub async fn save(&self, profile: &UserProfile) -> Result<()> {
        self.store.lock().await.upsert_profile(profile)
    }

    pub async fn update_name(&self, name: &str) -> Result<UserProfile> {
        let name = name.to_string();
        self.modify(move |p| p.name = name).await
    }

    pub async fn update_image(&self, image_uri: &str) -> Result<UserProfile> {
        let image_uri = image_uri.to_string();
        self.modify(move |p| p.image_uri = Some(image_uri)).await
    }

    /// Set the place label and, when known, its coordinates
    pub async fn update_location(
        &self,
        location: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<UserProfile> {
        let location = location.to_string();
        self.modify(move |p| {
            p.location = Some(location);
            p.latitude = latitude;
            p.longitude = longitude;
        })
        .await
    }

    /// Resolve coordinates to a place label and store both
    pub async fn locate(
        &self,
        latitude: f64,
        longitude: f64,
        geocoder: &dyn ReverseGeocoder,
    ) -> Result<UserProfile> {
        let label = geo::resolve_place(geocoder, latitude, longitude).await;
        self.update_location(&label, Some(latitude), Some(longitude)).await
    }

    async fn modify<F>(&self, change: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile) + Send,
    {
        // Lock spans both the read and the upsert
        let store = self.store.lock().await;
        let mut profile = current_or_default(&store)?;
        change(&mut profile);
        store.upsert_profile(&profile)?;
        tracing::debug!(name = %profile.name, "profile updated");
        Ok(profile)
    }
}

fn current_or_default(store: &SqliteStore) -> Result<UserProfile> {
    Ok(store.get_profile()?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Place;
    use crate::storage;
    use async_trait::async_trait;

    fn service() -> ProfileService {
        ProfileService::new(storage::shared(SqliteStore::open_in_memory().unwrap()))
    }

    struct FixedGeocoder(Option<Place>);

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Option<Place>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_update_without_prior_record_uses_defaults() {
        let profiles = service();
        assert!(profiles.profile().await.unwrap().is_none());

        let profile = profiles.update_image("content://avatar.png").await.unwrap();

        assert_eq!(profile.name, DEFAULT_NAME);
        assert_eq!(profile.image_uri.as_deref(), Some("content://avatar.png"));
        assert!(profile.location.is_none());
        assert!(profile.coordinates().is_none());
        assert_eq!(profiles.profile().await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn test_updates_keep_other_fields() {
        let profiles = service();
        profiles.update_name("Ada").await.unwrap();
        profiles.update_image("content://ada.png").await.unwrap();
        let profile = profiles.update_location("London", Some(51.5), Some(-0.12)).await.unwrap();

        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.image_uri.as_deref(), Some("content://ada.png"));
        assert_eq!(profile.coordinates(), Some((51.5, -0.12)));
    }

    #[tokio::test]
    async fn test_save_replaces_whole_record() {
        let profiles = service();
        profiles.update_image("content://old.png").await.unwrap();
        profiles.save(&UserProfile::named("Grace")).await.unwrap();

        let stored = profiles.profile().await.unwrap().unwrap();
        assert_eq!(stored, UserProfile::named("Grace"));
    }

    #[tokio::test]
    async fn test_locate_uses_resolved_place() {
        let profiles = service();
        let geocoder = FixedGeocoder(Some(Place {
            locality: Some("Lyon".to_string()),
            region: None,
            country: Some("France".to_string()),
        }));

        let profile = profiles.locate(45.76, 4.83, &geocoder).await.unwrap();
        assert_eq!(profile.location.as_deref(), Some("Lyon, France"));
        assert_eq!(profile.coordinates(), Some((45.76, 4.83)));
    }

    #[tokio::test]
    async fn test_locate_falls_back_to_coordinates() {
        let profiles = service();
        let profile = profiles.locate(45.76, 4.83, &FixedGeocoder(None)).await.unwrap();
        assert_eq!(profile.location.as_deref(), Some("Lat: 45.7600, Lng: 4.8300"));
    }
}
