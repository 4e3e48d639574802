//! Adapter configuration, usually loaded from `fixmate.toml`.
//!
//! ```toml
//! [firebase]
//! project_id = "fixmate-campus"
//! api_key = "${FIREBASE_API_KEY}"
//! storage_bucket = "fixmate-campus.appspot.com"
//!
//! [query]
//! empty_in = "match_nothing"
//! timeout_ms = 10000
//!
//! [environments.staging.firebase]
//! project_id = "fixmate-staging"
//!
//! [environments.staging.storage]
//! public_url_base = "http://localhost:9199"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{QueryError, QueryResult};
use crate::filter::EmptyInPolicy;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    /// Firebase project settings.
    #[serde(default)]
    pub firebase: FirebaseConfig,

    /// Query builder behavior.
    #[serde(default)]
    pub query: QueryConfig,

    /// Auth facade settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Storage facade settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// REST endpoints.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl AdapterConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            QueryError::configuration(format!("failed to read {}: {}", path.display(), e))
                .with_source(e)
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> QueryResult<Self> {
        let expanded = expand_env_vars(content);

        toml::from_str(&expanded)
            .map_err(|e| QueryError::configuration(e.to_string()).with_source(e))
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> Self {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(firebase) = overrides.firebase {
                if let Some(project_id) = firebase.project_id {
                    self.firebase.project_id = project_id;
                }
                if let Some(api_key) = firebase.api_key {
                    self.firebase.api_key = api_key;
                }
                if let Some(bucket) = firebase.storage_bucket {
                    self.firebase.storage_bucket = bucket;
                }
                if let Some(database_id) = firebase.database_id {
                    self.firebase.database_id = database_id;
                }
            }
            if let Some(query) = overrides.query {
                if let Some(empty_in) = query.empty_in {
                    self.query.empty_in = empty_in;
                }
                if let Some(allow) = query.allow_unscoped_mutations {
                    self.query.allow_unscoped_mutations = allow;
                }
                if let Some(timeout_ms) = query.timeout_ms {
                    self.query.timeout_ms = Some(timeout_ms);
                }
            }
            if let Some(auth) = overrides.auth {
                if let Some(collection) = auth.profile_collection {
                    self.auth.profile_collection = collection;
                }
                if let Some(role) = auth.default_role {
                    self.auth.default_role = role;
                }
            }
            if let Some(storage) = overrides.storage {
                if let Some(base) = storage.public_url_base {
                    self.storage.public_url_base = base;
                }
            }
            if let Some(endpoints) = overrides.endpoints {
                self.endpoints = endpoints;
            }
        }
        self
    }

    /// Backend call timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.query.timeout_ms.map(Duration::from_millis)
    }
}

/// Firebase project settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FirebaseConfig {
    /// Project identifier.
    #[serde(default)]
    pub project_id: String,

    /// Web API key (supports `${ENV_VAR}` interpolation).
    #[serde(default)]
    pub api_key: String,

    /// Default storage bucket, e.g. `fixmate.appspot.com`.
    #[serde(default)]
    pub storage_bucket: String,

    /// Firestore database.
    #[serde(default = "default_database_id")]
    pub database_id: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: String::new(),
            storage_bucket: String::new(),
            database_id: default_database_id(),
        }
    }
}

fn default_database_id() -> String {
    "(default)".to_string()
}

/// Query builder behavior.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Meaning of `in_()` with an empty list.
    #[serde(default)]
    pub empty_in: EmptyInPolicy,

    /// Allow update/delete without filters on every builder.
    #[serde(default)]
    pub allow_unscoped_mutations: bool,

    /// Per backend call timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Auth facade settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Collection holding one profile record per user id.
    #[serde(default = "default_profile_collection")]
    pub profile_collection: String,

    /// Role assigned when the profile has none.
    #[serde(default = "default_role")]
    pub default_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            profile_collection: default_profile_collection(),
            default_role: default_role(),
        }
    }
}

fn default_profile_collection() -> String {
    "users".to_string()
}

fn default_role() -> String {
    "student".to_string()
}

/// Storage facade settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Origin of public download URLs.
    #[serde(default = "default_storage_endpoint")]
    pub public_url_base: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_url_base: default_storage_endpoint(),
        }
    }
}

/// REST endpoints of the Firebase services.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointsConfig {
    /// Firestore REST API root.
    #[serde(default = "default_firestore_endpoint")]
    pub firestore: String,

    /// Identity Toolkit REST API root.
    #[serde(default = "default_identity_endpoint")]
    pub identity_toolkit: String,

    /// Firebase Storage REST API root.
    #[serde(default = "default_storage_endpoint")]
    pub storage: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            firestore: default_firestore_endpoint(),
            identity_toolkit: default_identity_endpoint(),
            storage: default_storage_endpoint(),
        }
    }
}

fn default_firestore_endpoint() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_identity_endpoint() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_storage_endpoint() -> String {
    "https://firebasestorage.googleapis.com".to_string()
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Firebase overrides.
    pub firebase: Option<FirebaseOverride>,

    /// Query overrides.
    pub query: Option<QueryOverride>,

    /// Auth overrides.
    pub auth: Option<AuthOverride>,

    /// Storage overrides.
    pub storage: Option<StorageOverride>,

    /// Endpoint overrides, e.g. for the local emulators.
    pub endpoints: Option<EndpointsConfig>,
}

/// Firebase configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FirebaseOverride {
    /// Override project_id.
    pub project_id: Option<String>,

    /// Override api_key.
    pub api_key: Option<String>,

    /// Override storage_bucket.
    pub storage_bucket: Option<String>,

    /// Override database_id.
    pub database_id: Option<String>,
}

/// Query configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryOverride {
    /// Override empty_in.
    pub empty_in: Option<EmptyInPolicy>,

    /// Override allow_unscoped_mutations.
    pub allow_unscoped_mutations: Option<bool>,

    /// Override timeout_ms.
    pub timeout_ms: Option<u64>,
}

/// Auth configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthOverride {
    /// Override profile_collection.
    pub profile_collection: Option<String>,

    /// Override default_role.
    pub default_role: Option<String>,
}

/// Storage configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageOverride {
    /// Override public_url_base.
    pub public_url_base: Option<String>,
}

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left as written.
fn expand_env_vars(content: &str) -> String {
    let re = match regex_lite::Regex::new(r"\$\{([^}]+)\}") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
