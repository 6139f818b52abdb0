//! Caller identity.
//!
//! Requests carry an opaque bearer token. An [`IdentityProvider`] resolves it to a [`Profile`];
//! an unknown token resolves to nothing and the request is rejected as unauthorized.
//!
//! [`ProfileRegistry`] is the bundled provider. It is loaded once at startup from a YAML file:
//!
//! ```yaml
//! - id: 6f1c7d55-7d1f-4d51-9a0c-1f1d1d5c8c11
//!   role: doctor
//!   full_name: Dr Ada Byrne
//!   email: ada.byrne@example.org
//!   token: doctor-token
//! - id: 0b8e1f5a-3c8e-4f39-9a62-5b47a3c2e0d4
//!   role: patient
//!   full_name: Sam Patel
//!   email: sam.patel@example.org
//!   phone: "+44 7700 900123"
//!   token: patient-token
//! ```

use crate::{AssessmentError, AssessmentResult};
use api_shared::{Profile, Role};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer token to the profile it belongs to.
    fn resolve(&self, token: &str) -> Option<Profile>;

    /// Looks up a profile by user id.
    fn profile(&self, id: Uuid) -> Option<Profile>;

    /// All profiles with the given role.
    fn profiles_with_role(&self, role: Role) -> Vec<Profile>;
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    #[serde(flatten)]
    profile: Profile,
    token: String,
}

/// In-process token and profile registry.
#[derive(Debug, Default, Clone)]
pub struct ProfileRegistry {
    by_token: HashMap<String, Uuid>,
    profiles: HashMap<Uuid, Profile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile under a token.
    ///
    /// # Errors
    /// Returns `AssessmentError::Config` if the token is blank or already registered, or the
    /// profile id is already registered.
    pub fn insert(&mut self, profile: Profile, token: impl Into<String>) -> AssessmentResult<()> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(AssessmentError::Config(format!(
                "profile {} has an empty token",
                profile.id
            )));
        }
        if self.by_token.contains_key(&token) {
            return Err(AssessmentError::Config(format!(
                "profile {} reuses a token already registered",
                profile.id
            )));
        }
        if self.profiles.contains_key(&profile.id) {
            return Err(AssessmentError::Config(format!(
                "profile {} is registered twice",
                profile.id
            )));
        }

        self.by_token.insert(token, profile.id);
        self.profiles.insert(profile.id, profile);
        Ok(())
    }

    /// Parses a registry from YAML text.
    pub fn from_yaml(text: &str) -> AssessmentResult<Self> {
        let entries: Vec<RegistryEntry> =
            serde_yaml::from_str(text).map_err(AssessmentError::YamlDeserialization)?;

        let mut registry = Self::new();
        for entry in entries {
            registry.insert(entry.profile, entry.token)?;
        }
        Ok(registry)
    }

    /// Loads a registry from a YAML file.
    pub fn load(path: &Path) -> AssessmentResult<Self> {
        let text = std::fs::read_to_string(path).map_err(AssessmentError::FileRead)?;
        let registry = Self::from_yaml(&text)?;
        tracing::info!(
            profiles = registry.profiles.len(),
            "loaded profile registry from {}",
            path.display()
        );
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl IdentityProvider for ProfileRegistry {
    fn resolve(&self, token: &str) -> Option<Profile> {
        self.by_token
            .get(token)
            .and_then(|id| self.profiles.get(id))
            .cloned()
    }

    fn profile(&self, id: Uuid) -> Option<Profile> {
        self.profiles.get(&id).cloned()
    }

    fn profiles_with_role(&self, role: Role) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = self
            .profiles
            .values()
            .filter(|p| p.role == role)
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"
- id: 6f1c7d55-7d1f-4d51-9a0c-1f1d1d5c8c11
  role: doctor
  full_name: Dr Ada Byrne
  email: ada.byrne@example.org
  token: doctor-token
- id: 0b8e1f5a-3c8e-4f39-9a62-5b47a3c2e0d4
  role: patient
  full_name: Sam Patel
  email: sam.patel@example.org
  phone: "+44 7700 900123"
  token: patient-token
"#;

    #[test]
    fn resolves_known_tokens() {
        let registry = ProfileRegistry::from_yaml(REGISTRY).expect("registry should parse");
        assert_eq!(registry.len(), 2);

        let doctor = registry.resolve("doctor-token").expect("doctor should resolve");
        assert!(doctor.is_doctor());
        assert_eq!(doctor.full_name, "Dr Ada Byrne");

        let patient = registry.resolve("patient-token").expect("patient should resolve");
        assert_eq!(patient.role, Role::Patient);
        assert_eq!(patient.phone.as_deref(), Some("+44 7700 900123"));
        assert_eq!(registry.profile(patient.id), Some(patient));
    }

    #[test]
    fn unknown_token_resolves_to_none() {
        let registry = ProfileRegistry::from_yaml(REGISTRY).unwrap();
        assert!(registry.resolve("nope").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn duplicate_tokens_are_rejected() {
        let yaml = r#"
- id: 6f1c7d55-7d1f-4d51-9a0c-1f1d1d5c8c11
  role: doctor
  full_name: A
  email: a@example.org
  token: same
- id: 0b8e1f5a-3c8e-4f39-9a62-5b47a3c2e0d4
  role: patient
  full_name: B
  email: b@example.org
  token: same
"#;
        let err = ProfileRegistry::from_yaml(yaml).expect_err("duplicate token should fail");
        assert!(matches!(err, AssessmentError::Config(_)));
    }

    #[test]
    fn filters_profiles_by_role() {
        let registry = ProfileRegistry::from_yaml(REGISTRY).unwrap();
        let patients = registry.profiles_with_role(Role::Patient);
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].full_name, "Sam Patel");
    }
}
