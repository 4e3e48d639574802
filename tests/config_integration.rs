//! Integration tests for configuration loading and how settings change
//! client behavior.

use fixmate::memory::MemoryBackend;
use fixmate::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn client_with(backend: &MemoryBackend, config: AdapterConfig) -> Client {
    Client::builder().backend(backend).config(config).build().unwrap()
}

#[test]
fn test_full_config() {
    let config = AdapterConfig::from_toml(
        r#"
        [firebase]
        project_id = "fixmate-campus"
        api_key = "AIza-test"
        storage_bucket = "fixmate-campus.appspot.com"

        [query]
        empty_in = "no_filter"
        allow_unscoped_mutations = true
        timeout_ms = 2500

        [auth]
        profile_collection = "profiles"
        default_role = "guest"

        [storage]
        public_url_base = "http://localhost:9199"

        [endpoints]
        firestore = "http://localhost:8080/v1"
        identity_toolkit = "http://localhost:9099/identitytoolkit.googleapis.com/v1"
        storage = "http://localhost:9199"
    "#,
    )
    .unwrap();

    assert_eq!(config.firebase.project_id, "fixmate-campus");
    assert_eq!(config.firebase.database_id, "(default)");
    assert_eq!(config.query.empty_in, EmptyInPolicy::NoFilter);
    assert!(config.query.allow_unscoped_mutations);
    assert_eq!(config.timeout(), Some(std::time::Duration::from_millis(2500)));
    assert_eq!(config.auth.profile_collection, "profiles");
    assert_eq!(config.endpoints.firestore, "http://localhost:8080/v1");
}

#[test]
fn test_unknown_section_rejected() {
    let err = AdapterConfig::from_toml("[database]\nurl = \"postgres://\"\n").unwrap_err();
    assert_eq!(err.code.code(), "FM7001");
}

#[test]
fn test_environment_overrides() {
    let config = AdapterConfig::from_toml(
        r#"
        [firebase]
        project_id = "fixmate-campus"

        [environments.staging.firebase]
        project_id = "fixmate-staging"

        [environments.staging.query]
        timeout_ms = 500
    "#,
    )
    .unwrap();

    let staging = config.clone().with_environment("staging");
    assert_eq!(staging.firebase.project_id, "fixmate-staging");
    assert_eq!(staging.query.timeout_ms, Some(500));

    let unknown = config.with_environment("production");
    assert_eq!(unknown.firebase.project_id, "fixmate-campus");
}

#[test]
fn test_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixmate.toml");
    std::fs::write(&path, "[firebase]\nproject_id = \"from-file\"\n").unwrap();

    let config = AdapterConfig::from_file(&path).unwrap();
    assert_eq!(config.firebase.project_id, "from-file");

    let missing = AdapterConfig::from_file(dir.path().join("absent.toml"));
    assert_eq!(missing.unwrap_err().code.code(), "FM7001");
}

#[tokio::test]
async fn test_empty_in_no_filter_policy() {
    let backend = MemoryBackend::new();
    backend.store().seed("complaints", "c1", json!({"status": "Open"}));
    backend.store().seed("complaints", "c2", json!({"status": "Closed"}));

    let config = AdapterConfig::from_toml("[query]\nempty_in = \"no_filter\"\n").unwrap();
    let client = client_with(&backend, config);

    let response = client
        .from("complaints")
        .select("*")
        .in_("status", Vec::<String>::new())
        .execute()
        .await;
    assert_eq!(response.data.unwrap().into_records().len(), 2);
}

#[tokio::test]
async fn test_allow_unscoped_mutations_setting() {
    let backend = MemoryBackend::new();
    backend.store().seed("notifications", "n1", json!({"read": false}));
    backend.store().seed("notifications", "n2", json!({"read": false}));

    let config = AdapterConfig::from_toml("[query]\nallow_unscoped_mutations = true\n").unwrap();
    let client = client_with(&backend, config);

    let response = client
        .from("notifications")
        .update(json!({"read": true}))
        .execute()
        .await;
    assert_eq!(response.data.unwrap().into_records().len(), 2);
}

#[tokio::test]
async fn test_auth_settings() {
    let backend = MemoryBackend::new();
    let config = AdapterConfig::from_toml(
        "[auth]\nprofile_collection = \"profiles\"\ndefault_role = \"guest\"\n",
    )
    .unwrap();
    let client = client_with(&backend, config);

    let user = client
        .auth()
        .sign_up(SignUpRequest::new("ann@campus.edu", "secret1"))
        .await
        .data
        .unwrap()
        .user;
    let profile = backend.store().document("profiles", &user.id).unwrap();
    assert_eq!(profile.get("role"), Some(&json!("guest")));
    assert!(backend.store().document("users", &user.id).is_none());
}

#[test]
fn test_public_url_settings() {
    let backend = MemoryBackend::new();
    let config = AdapterConfig::from_toml(
        r#"
        [firebase]
        storage_bucket = "demo.appspot.com"

        [storage]
        public_url_base = "http://localhost:9199/"
    "#,
    )
    .unwrap();
    let client = client_with(&backend, config);

    let url = client
        .storage()
        .from("avatars")
        .get_public_url("u1/me.png")
        .data
        .public_url;
    assert_eq!(
        url,
        "http://localhost:9199/v0/b/demo.appspot.com/o/avatars%2Fu1%2Fme.png?alt=media"
    );
}

#[tokio::test]
async fn test_environment_overrides_auth_and_storage() {
    let backend = MemoryBackend::new();
    let config = AdapterConfig::from_toml(
        r#"
        [firebase]
        storage_bucket = "demo.appspot.com"

        [environments.local.auth]
        profile_collection = "profiles"
        default_role = "guest"

        [environments.local.storage]
        public_url_base = "http://localhost:9199"
    "#,
    )
    .unwrap()
    .with_environment("local");
    let client = client_with(&backend, config);

    let user = client
        .auth()
        .sign_up(SignUpRequest::new("ann@campus.edu", "secret1"))
        .await
        .data
        .unwrap()
        .user;
    let profile = backend.store().document("profiles", &user.id).unwrap();
    assert_eq!(profile.get("role"), Some(&json!("guest")));

    let url = client
        .storage()
        .from("avatars")
        .get_public_url("me.png")
        .data
        .public_url;
    assert_eq!(
        url,
        "http://localhost:9199/v0/b/demo.appspot.com/o/avatars%2Fme.png?alt=media"
    );
}
