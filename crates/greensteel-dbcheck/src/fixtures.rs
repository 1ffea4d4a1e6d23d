//! Fixture records for the seed workflow.
//!
//! Two registrations are seeded. The primary pair uses fixed natural keys and is deleted
//! before every run. The registration pair simulates a fresh sign-up and is never cleaned
//! up; its keys get a per-run suffix unless isolation is turned off.

use greensteel_common::credentials::hash_password;
use greensteel_common::error::DbCheckError;
use greensteel_common::models::company::{Company, NewCompany};
use greensteel_common::models::user::{NewUser, UserRole};
use greensteel_common::permissions::UserPermissions;
use uuid::Uuid;

pub const PRIMARY_COMPANY_ID: &str = "test_company_001";
pub const PRIMARY_USERNAME: &str = "testuser";
pub const REGISTRATION_COMPANY_ID: &str = "new_company_002";
pub const REGISTRATION_USERNAME: &str = "newuser";

/// Plaintext behind every fixture hash.
pub const FIXTURE_PASSWORD: &str = "password123";

/// How the registration pair's natural keys are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationKeys {
    /// Exactly `new_company_002` / `newuser`. A second run fails with a duplicate key.
    Fixed,
    /// Keys suffixed with a per-run token, e.g. `newuser_1f2e3d4c`.
    PerRun(String),
}

impl RegistrationKeys {
    pub fn new(isolate: bool) -> Self {
        if isolate {
            let token = Uuid::new_v4().simple().to_string();
            Self::PerRun(token[..8].to_string())
        } else {
            Self::Fixed
        }
    }

    pub fn apply(&self, base: &str) -> String {
        match self {
            Self::Fixed => base.to_string(),
            Self::PerRun(token) => format!("{base}_{token}"),
        }
    }
}

/// A company and the user that registers with it.
#[derive(Debug, Clone)]
pub struct Registration {
    pub company: NewCompany,
    /// `company_id` is filled in once the company row exists.
    pub user: NewUser,
}

impl Registration {
    /// The user payload bound to the stored company.
    pub fn user_for(&self, company: &Company) -> NewUser {
        NewUser {
            company_id: company.id,
            ..self.user.clone()
        }
    }
}

/// Both fixture registrations for one run.
#[derive(Debug, Clone)]
pub struct FixtureSet {
    pub primary: Registration,
    pub registration: Registration,
    pub keys: RegistrationKeys,
}

impl FixtureSet {
    pub fn build(keys: RegistrationKeys) -> Result<Self, DbCheckError> {
        let password_hash = hash_password(FIXTURE_PASSWORD)?;
        Ok(Self {
            primary: primary(&password_hash),
            registration: registration(&password_hash, &keys),
            keys,
        })
    }
}

/// The fully populated company admin fixture.
pub fn primary(password_hash: &str) -> Registration {
    let company = NewCompany {
        uuid: Uuid::new_v4(),
        company_id: PRIMARY_COMPANY_ID.into(),
        hashed_password: password_hash.into(),
        installation: "테스트 기업 (주)".into(),
        installation_en: Some("Test Company Inc.".into()),
        economic_activity: Some("제조업".into()),
        economic_activity_en: Some("Manufacturing".into()),
        representative: Some("홍길동".into()),
        representative_en: Some("Hong Gil-dong".into()),
        email: Some("test@testcompany.com".into()),
        telephone: Some("02-1234-5678".into()),
        street: Some("테스트로".into()),
        street_en: Some("Test Street".into()),
        number: Some("123".into()),
        number_en: Some("123".into()),
        postcode: Some("12345".into()),
        city: Some("서울특별시".into()),
        city_en: Some("Seoul".into()),
        country: Some("대한민국".into()),
        country_en: Some("South Korea".into()),
        unlocode: Some("KR SEL".into()),
        source_latitude: Some(37.5665),
        source_longitude: Some(126.9780),
    };

    let user = NewUser {
        uuid: Uuid::new_v4(),
        username: PRIMARY_USERNAME.into(),
        hashed_password: password_hash.into(),
        full_name: "테스트 사용자".into(),
        company_id: 0,
        role: UserRole::Admin,
        permissions: UserPermissions::company_admin(),
        is_company_admin: true,
        is_active: true,
    };

    Registration { company, user }
}

/// A minimal sign-up: only the fields the registration form requires.
pub fn registration(password_hash: &str, keys: &RegistrationKeys) -> Registration {
    let company = NewCompany {
        uuid: Uuid::new_v4(),
        company_id: keys.apply(REGISTRATION_COMPANY_ID),
        hashed_password: password_hash.into(),
        installation: "새로운 기업 (주)".into(),
        installation_en: Some("New Company Inc.".into()),
        email: Some("info@newcompany.com".into()),
        telephone: Some("02-9876-5432".into()),
        city: Some("부산광역시".into()),
        country: Some("대한민국".into()),
        ..Default::default()
    };

    let user = NewUser {
        uuid: Uuid::new_v4(),
        username: keys.apply(REGISTRATION_USERNAME),
        hashed_password: password_hash.into(),
        full_name: "새로운 사용자".into(),
        company_id: 0,
        role: UserRole::User,
        permissions: UserPermissions::default_member(),
        is_company_admin: false,
        is_active: true,
    };

    Registration { company, user }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greensteel_common::validation::validate_record;

    #[test]
    fn test_fixed_keys_are_unchanged() {
        let keys = RegistrationKeys::new(false);
        assert_eq!(keys, RegistrationKeys::Fixed);
        assert_eq!(keys.apply(REGISTRATION_USERNAME), "newuser");
    }

    #[test]
    fn test_per_run_keys_differ_between_runs() {
        let a = RegistrationKeys::new(true);
        let b = RegistrationKeys::new(true);
        let (ua, ub) = (a.apply(REGISTRATION_USERNAME), b.apply(REGISTRATION_USERNAME));
        assert!(ua.starts_with("newuser_"));
        assert_eq!(ua.len(), "newuser_".len() + 8);
        assert_ne!(ua, ub);
    }

    #[test]
    fn test_primary_keys_never_suffixed() {
        let set = FixtureSet::build(RegistrationKeys::new(true)).unwrap();
        assert_eq!(set.primary.company.company_id, PRIMARY_COMPANY_ID);
        assert_eq!(set.primary.user.username, PRIMARY_USERNAME);
        assert_ne!(set.registration.user.username, REGISTRATION_USERNAME);
    }

    #[test]
    fn test_fixtures_pass_validation() {
        let set = FixtureSet::build(RegistrationKeys::new(true)).unwrap();
        for reg in [&set.primary, &set.registration] {
            validate_record(&reg.company).unwrap();
            validate_record(&reg.user).unwrap();
        }
    }

    #[test]
    fn test_admin_and_member_permissions() {
        let set = FixtureSet::build(RegistrationKeys::Fixed).unwrap();
        assert!(set.primary.user.is_company_admin);
        assert_eq!(set.primary.user.permissions, UserPermissions::all());
        assert!(!set
            .registration
            .user
            .permissions
            .contains(UserPermissions::MANAGE_USERS));
    }

    #[test]
    fn test_passwords_are_hashed() {
        let set = FixtureSet::build(RegistrationKeys::Fixed).unwrap();
        assert!(set.primary.company.hashed_password.starts_with("$argon2id$"));
        assert_ne!(set.primary.user.hashed_password, FIXTURE_PASSWORD);
    }
}
