//! User Profile Entity
//!
//! Public profile shown in the user directory and on profile pages.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Display name used when the identity provider has none
pub const ANONYMOUS_NAME: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in identity as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            display_name: None,
            email: None,
            photo_url: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    pub fn name_or_anonymous(&self) -> String {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_NAME)
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub email: String,
    pub photo_url: String,
    /// Unix millis
    pub created_at: i64,
}

impl UserProfile {
    /// First-time profile for a newly seen identity
    pub fn from_identity(identity: &UserIdentity, created_at: i64) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            display_name: identity.name_or_anonymous(),
            email: identity.email.clone().unwrap_or_default(),
            photo_url: identity.photo_url.clone().unwrap_or_default(),
            created_at,
        }
    }
}

impl Entity for UserProfile {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.user_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_identity_defaults() {
        let identity = UserIdentity::new("u1");
        let profile = UserProfile::from_identity(&identity, 42);
        assert_eq!(profile.display_name, ANONYMOUS_NAME);
        assert_eq!(profile.email, "");
        assert_eq!(profile.id(), UserId::new("u1"));
    }

    #[test]
    fn test_blank_name_is_anonymous() {
        let identity = UserIdentity::new("u1").with_name("   ");
        assert_eq!(identity.name_or_anonymous(), ANONYMOUS_NAME);
        assert_eq!(UserIdentity::new("u2").with_name("Mina").name_or_anonymous(), "Mina");
    }
}
