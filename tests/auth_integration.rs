//! Integration tests for the auth, storage and admin facades.

use std::time::Duration;

use fixmate::memory::{MemoryAuth, MemoryBackend, MemoryStorage, MemoryStore};
use fixmate::prelude::*;
use fixmate::{Record, SignUpRequest};
use pretty_assertions::assert_eq;
use serde_json::json;

fn setup() -> (MemoryBackend, Client) {
    let backend = MemoryBackend::new();
    let client = Client::builder().backend(&backend).build().unwrap();
    (backend, client)
}

fn record(value: serde_json::Value) -> Record {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_sign_in_attaches_stored_role() {
    let (backend, client) = setup();
    let uid = backend.auth().add_user("tech@campus.edu", "secret1").unwrap();
    backend.store().seed("users", &uid, json!({"role": "technician"}));

    let response = client
        .auth()
        .sign_in_with_password(Credentials::new("tech@campus.edu", "secret1"))
        .await;
    let data = response.data.unwrap();
    assert_eq!(data.user.id, uid);
    assert_eq!(data.user.role.as_deref(), Some("technician"));
    assert_eq!(data.user.user_metadata.full_name.as_deref(), Some("tech"));
    assert!(!data.session.access_token.is_empty());
}

#[tokio::test]
async fn test_sign_in_without_profile_defaults_to_student() {
    let (backend, client) = setup();
    backend.auth().add_user("ann@campus.edu", "secret1").unwrap();

    let data = client
        .auth()
        .sign_in_with_password(Credentials::new("ann@campus.edu", "secret1"))
        .await
        .data
        .unwrap();
    assert_eq!(data.user.role.as_deref(), Some("student"));
}

#[tokio::test]
async fn test_sign_in_profile_read_failure_falls_back() {
    let (backend, client) = setup();
    let uid = backend.auth().add_user("ann@campus.edu", "secret1").unwrap();
    backend.store().seed("users", &uid, json!({"role": "admin"}));
    backend.store().fail_next("unavailable", "backend down");

    let data = client
        .auth()
        .sign_in_with_password(Credentials::new("ann@campus.edu", "secret1"))
        .await
        .data
        .unwrap();
    assert_eq!(data.user.role.as_deref(), Some("student"));
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let (backend, client) = setup();
    backend.auth().add_user("ann@campus.edu", "secret1").unwrap();

    let response = client
        .auth()
        .sign_in_with_password(Credentials::new("ann@campus.edu", "wrong"))
        .await;
    assert!(response.data.is_none());
    assert_eq!(
        response.error.unwrap().code.as_deref(),
        Some("auth/wrong-password")
    );

    let session = client.auth().get_session().await.data.unwrap();
    assert!(session.session.is_none());
}

#[tokio::test]
async fn test_sign_up_writes_profile() {
    let (backend, client) = setup();

    let response = client
        .auth()
        .sign_up(
            SignUpRequest::new("bo@campus.edu", "secret1")
                .with_data(record(json!({"full_name": "Bo Chen", "department": "Physics"}))),
        )
        .await;
    let user = response.data.unwrap().user;
    assert_eq!(user.email, "bo@campus.edu");

    let profile = backend.store().document("users", &user.id).unwrap();
    assert_eq!(profile.get("email"), Some(&json!("bo@campus.edu")));
    assert_eq!(profile.get("role"), Some(&json!("student")));
    assert_eq!(profile.get("full_name"), Some(&json!("Bo Chen")));
    assert_eq!(profile.get("department"), Some(&json!("Physics")));
    assert!(profile.get("created_at").is_some());
    assert_eq!(backend.auth().display_name("bo@campus.edu").as_deref(), Some("Bo Chen"));

    let current = client.auth().get_user().await.data.unwrap().user.unwrap();
    assert_eq!(current.user_metadata.full_name.as_deref(), Some("Bo Chen"));
}

#[tokio::test]
async fn test_sign_up_duplicate_email() {
    let (backend, client) = setup();
    backend.auth().add_user("bo@campus.edu", "secret1").unwrap();

    let response = client
        .auth()
        .sign_up(SignUpRequest::new("bo@campus.edu", "secret2"))
        .await;
    assert!(response.data.is_none());
    assert_eq!(
        response.error.unwrap().code.as_deref(),
        Some("auth/email-already-in-use")
    );
}

#[tokio::test]
async fn test_sign_out_clears_session() {
    let (backend, client) = setup();
    backend.auth().add_user("ann@campus.edu", "secret1").unwrap();
    client
        .auth()
        .sign_in_with_password(Credentials::new("ann@campus.edu", "secret1"))
        .await;
    assert!(client.auth().get_session().await.data.unwrap().session.is_some());

    let response = client.auth().sign_out().await;
    assert!(response.error.is_none());
    assert!(client.auth().get_user().await.data.unwrap().user.is_none());
}

#[tokio::test]
async fn test_update_user_without_session() {
    let (_backend, client) = setup();

    let response = client
        .auth()
        .update_user(UserUpdate {
            password: Some("another1".to_string()),
            data: None,
        })
        .await;
    assert!(response.data.is_none());
    let error = response.error.unwrap();
    assert_eq!(error.code.as_deref(), Some("FM3006"));
    assert_eq!(error.message, "Not logged in");
}

#[tokio::test]
async fn test_update_user_merges_profile() {
    let (backend, client) = setup();
    let signed_up = client
        .auth()
        .sign_up(SignUpRequest::new("ann@campus.edu", "secret1"))
        .await
        .data
        .unwrap();

    let response = client
        .auth()
        .update_user(UserUpdate {
            password: Some("another1".to_string()),
            data: Some(record(json!({"full_name": "Ann Lee", "phone": "555-0100"}))),
        })
        .await;
    let user = response.data.unwrap().user.unwrap();
    assert_eq!(user.user_metadata.full_name.as_deref(), Some("Ann Lee"));

    let profile = backend.store().document("users", &signed_up.user.id).unwrap();
    assert_eq!(profile.get("role"), Some(&json!("student")));
    assert_eq!(profile.get("phone"), Some(&json!("555-0100")));

    client.auth().sign_out().await;
    let response = client
        .auth()
        .sign_in_with_password(Credentials::new("ann@campus.edu", "another1"))
        .await;
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_get_session_waits_for_restore() {
    let auth = MemoryAuth::restoring();
    let backend = MemoryBackend::from_parts(MemoryStore::new(), auth.clone(), MemoryStorage::new());
    let client = Client::builder().backend(&backend).build().unwrap();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        auth.session().sign_out();
    });

    let response = client.auth().get_session().await;
    assert!(response.error.is_none());
    assert!(response.data.unwrap().session.is_none());
}

#[tokio::test]
async fn test_admin_create_user_keeps_session() {
    let (backend, client) = setup();
    let admin = client
        .auth()
        .sign_up(SignUpRequest::new("admin@campus.edu", "secret1"))
        .await
        .data
        .unwrap();

    let response = client
        .admin()
        .create_user(
            "staff@campus.edu",
            "secret2",
            record(json!({"role": "technician", "full_name": "Sam Tech"})),
        )
        .await;
    let staff = response.data.unwrap().user;

    let profile = backend.store().document("users", &staff.id).unwrap();
    assert_eq!(profile.get("role"), Some(&json!("technician")));
    assert_eq!(profile.get("email"), Some(&json!("staff@campus.edu")));

    let current = client.auth().get_user().await.data.unwrap().user.unwrap();
    assert_eq!(current.id, admin.user.id);
}

#[tokio::test]
async fn test_upload_and_public_url() {
    let (backend, client) = setup();
    let bucket = client.storage().from("complaint-images");

    let response = bucket.upload("c1/photo 1.jpg", b"jpeg".to_vec()).await;
    assert_eq!(response.data.unwrap().path, "complaint-images/c1/photo 1.jpg");
    assert_eq!(
        backend.storage().object("complaint-images/c1/photo 1.jpg"),
        Some(b"jpeg".to_vec())
    );

    let first = bucket.get_public_url("c1/photo 1.jpg");
    let second = bucket.get_public_url("c1/photo 1.jpg");
    assert_eq!(first, second);
    assert!(first
        .data
        .public_url
        .ends_with("/o/complaint-images%2Fc1%2Fphoto%201.jpg?alt=media"));
}
