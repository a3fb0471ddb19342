//! The shopper's profile record.

use serde::{Deserialize, Serialize};
use shop_cache::Cache;

use crate::error::CommerceError;

/// Store key holding the profile.
pub const PROFILE_KEY: &str = "userProfile";

/// Contact details kept on the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub phone: String,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Read the stored profile, falling back to the default.
    pub async fn load(cache: &Cache) -> Self {
        match cache.get::<UserProfile>(PROFILE_KEY).await {
            Ok(profile) => profile.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = PROFILE_KEY, error = %e, "profile unreadable; using default");
                Self::default()
            }
        }
    }

    /// Persist the profile.
    pub async fn save(&self, cache: &Cache) -> Result<(), CommerceError> {
        cache
            .set(PROFILE_KEY, self)
            .await
            .map_err(|e| CommerceError::write_failed(PROFILE_KEY, &e))
    }

    /// Check if a phone number has been recorded.
    pub fn is_complete(&self) -> bool {
        !self.phone.trim().is_empty()
    }
}
