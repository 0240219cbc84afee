//! # Profile Attributes
//!
//! Attributes sent by `update_profile`. Only fields that were set are sent.
//!
//! ## Usage
//! ```rust
//! use subkit_core::profile::{Gender, ProfileAttributes};
//!
//! let attrs = ProfileAttributes::builder()
//!     .email("jane@example.com")
//!     .gender(Gender::Female)
//!     .custom_attribute("plan_hint", "annual")
//!     .build();
//!
//! assert_eq!(attrs.email.as_deref(), Some("jane@example.com"));
//! assert!(!attrs.is_empty());
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Gender as understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Other,
}

/// Optional profile attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixpanel_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amplitude_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amplitude_device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appmetrica_profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appmetrica_device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_attributes: BTreeMap<String, String>,
}

impl ProfileAttributes {
    /// Starts a builder.
    pub fn builder() -> ProfileAttributesBuilder {
        ProfileAttributesBuilder::default()
    }

    /// Returns true if nothing would be sent.
    pub fn is_empty(&self) -> bool {
        *self == ProfileAttributes::default()
    }
}

/// Builder for [`ProfileAttributes`].
#[derive(Debug, Clone, Default)]
pub struct ProfileAttributesBuilder {
    attrs: ProfileAttributes,
}

impl ProfileAttributesBuilder {
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.attrs.email = Some(email.into());
        self
    }

    pub fn phone_number(mut self, phone: impl Into<String>) -> Self {
        self.attrs.phone_number = Some(phone.into());
        self
    }

    pub fn facebook_user_id(mut self, id: impl Into<String>) -> Self {
        self.attrs.facebook_user_id = Some(id.into());
        self
    }

    pub fn mixpanel_user_id(mut self, id: impl Into<String>) -> Self {
        self.attrs.mixpanel_user_id = Some(id.into());
        self
    }

    pub fn amplitude_user_id(mut self, id: impl Into<String>) -> Self {
        self.attrs.amplitude_user_id = Some(id.into());
        self
    }

    pub fn amplitude_device_id(mut self, id: impl Into<String>) -> Self {
        self.attrs.amplitude_device_id = Some(id.into());
        self
    }

    pub fn appmetrica_profile_id(mut self, id: impl Into<String>) -> Self {
        self.attrs.appmetrica_profile_id = Some(id.into());
        self
    }

    pub fn appmetrica_device_id(mut self, id: impl Into<String>) -> Self {
        self.attrs.appmetrica_device_id = Some(id.into());
        self
    }

    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.attrs.first_name = Some(name.into());
        self
    }

    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.attrs.last_name = Some(name.into());
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.attrs.gender = Some(gender);
        self
    }

    pub fn birthday(mut self, birthday: NaiveDate) -> Self {
        self.attrs.birthday = Some(birthday);
        self
    }

    /// Adds one custom key/value pair. A repeated key overwrites.
    pub fn custom_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.custom_attributes.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> ProfileAttributes {
        self.attrs
    }
}
