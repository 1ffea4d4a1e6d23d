//! Company model — the registering organisation.
//!
//! A company is both an account (it can log in with `company_id` and a password) and the
//! owner of the installation data that its users report on.

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

/// A row of the `companies` table, in the auth service's column naming.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Company {
    /// Generated surrogate key
    pub id: i32,

    /// Stable external identifier, a hyphenated UUID string
    pub uuid: String,

    /// Business identifier used as the company login (unique)
    pub company_id: String,

    #[serde(skip_serializing)]
    pub hashed_password: String,

    /// Installation (site) name, native and English
    #[sqlx(rename = "Installation")]
    #[serde(rename = "Installation")]
    pub installation: String,
    #[sqlx(rename = "Installation_en")]
    #[serde(rename = "Installation_en")]
    pub installation_en: Option<String>,

    /// Industry classification
    pub economic_activity: Option<String>,
    pub economic_activity_en: Option<String>,

    pub representative: Option<String>,
    pub representative_en: Option<String>,

    pub email: Option<String>,
    pub telephone: Option<String>,

    // Postal address
    pub street: Option<String>,
    pub street_en: Option<String>,
    pub number: Option<String>,
    pub number_en: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub city_en: Option<String>,
    pub country: Option<String>,
    pub country_en: Option<String>,

    /// UN/LOCODE of the installation site, e.g. "KR SEL"
    pub unlocode: Option<String>,

    #[sqlx(rename = "sourcelatitude")]
    #[serde(rename = "sourcelatitude")]
    pub source_latitude: Option<f64>,
    #[sqlx(rename = "sourcelongitude")]
    #[serde(rename = "sourcelongitude")]
    pub source_longitude: Option<f64>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Company {
    /// "city, country" for display, skipping missing parts.
    pub fn locality(&self) -> String {
        [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Insert payload for a company registration.
#[derive(Debug, Clone, Default, Validate)]
pub struct NewCompany {
    pub uuid: Uuid,

    #[validate(length(min = 3, max = 100, message = "Company ID must be 3-100 characters"))]
    pub company_id: String,

    #[validate(length(min = 1, max = 255))]
    pub hashed_password: String,

    #[validate(length(min = 1, max = 200, message = "Installation name is required"))]
    pub installation: String,
    #[validate(length(max = 200))]
    pub installation_en: Option<String>,

    #[validate(length(max = 200))]
    pub economic_activity: Option<String>,
    #[validate(length(max = 200))]
    pub economic_activity_en: Option<String>,

    #[validate(length(max = 100))]
    pub representative: Option<String>,
    #[validate(length(max = 100))]
    pub representative_en: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub telephone: Option<String>,

    #[validate(length(max = 200))]
    pub street: Option<String>,
    #[validate(length(max = 200))]
    pub street_en: Option<String>,
    #[validate(length(max = 50))]
    pub number: Option<String>,
    #[validate(length(max = 50))]
    pub number_en: Option<String>,
    #[validate(length(max = 20))]
    pub postcode: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub city_en: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 100))]
    pub country_en: Option<String>,

    #[validate(length(max = 10))]
    pub unlocode: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub source_latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub source_longitude: Option<f64>,
}
