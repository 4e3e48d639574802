//! # fixmate-query
//!
//! Supabase-shaped data access over a Firebase-style document backend.
//!
//! This crate provides:
//! - A chainable query builder (`select`, `insert`, `update`, `delete`,
//!   `eq`, `in_`, `order`, `limit`, `single`) resolved by `execute()`
//! - The `{ data, error }` result envelope
//! - Auth, storage and admin facades
//! - The backend traits that document stores and auth services implement
//! - TOML configuration and logging setup
//!
//! Backends live in their own crates (`fixmate-memory`, `fixmate-firestore`).
//!
//! ## Filters
//!
//! ```rust
//! use fixmate_query::{FieldRef, Filter, FilterValue};
//!
//! // `id` addresses the document identifier, not a stored field
//! let by_id = Filter::equals("id", "c-42");
//! assert_eq!(by_id.field(), &FieldRef::DocumentId);
//!
//! let by_status = Filter::in_list("status", ["Open", "In Progress"]);
//! assert_eq!(by_status.field(), &FieldRef::Field("status".into()));
//!
//! let val: FilterValue = 42.into();
//! assert!(matches!(val, FilterValue::Int(42)));
//! ```
//!
//! ## Envelope
//!
//! ```rust
//! use fixmate_query::{Data, QueryError, Response};
//!
//! let response: Response<Data> = Response::err(QueryError::not_found("complaints"));
//! assert!(response.data.is_none());
//! assert_eq!(response.error.unwrap().code.as_deref(), Some("PGRST116"));
//! ```
//!
//! ## Storage URLs
//!
//! ```rust
//! use fixmate_query::storage::public_url;
//!
//! let url = public_url(
//!     "https://firebasestorage.googleapis.com",
//!     "fixmate.appspot.com",
//!     "complaint-images/c1/leak 1.jpg",
//! );
//! assert!(url.ends_with("/o/complaint-images%2Fc1%2Fleak%201.jpg?alt=media"));
//! ```

pub mod admin;
pub mod auth;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod logging;
pub mod operations;
pub mod query;
pub mod response;
pub mod session;
pub mod storage;
pub mod traits;
pub mod types;

pub use admin::Admin;
pub use auth::{Auth, Credentials, SignUpOptions, SignUpRequest, UserUpdate};
pub use client::{Client, ClientBuilder};
pub use config::{AdapterConfig, AuthConfig, EndpointsConfig, FirebaseConfig, QueryConfig, StorageConfig};
pub use document::{Document, Record, timestamp_now};
pub use error::{ErrorCode, ErrorContext, NOT_FOUND_SENTINEL, QueryError, QueryResult};
pub use filter::{EmptyInPolicy, FieldRef, Filter, FilterValue};
pub use query::{PendingOperation, QueryBuilder};
pub use response::{
    Data, ErrorInfo, PublicUrl, PublicUrlResponse, Response, Session, SessionData, SessionToken,
    SignInData, SignOutResponse, SignUpData, UploadData, User, UserData, UserIdentity,
    UserMetadata,
};
pub use session::{AuthState, SessionState};
pub use storage::{Bucket, Storage};
pub use traits::{
    AuthProvider, AuthUser, Backend, DocumentQuery, DocumentStore, ObjectStorage,
    UserProvisioner, Write,
};
pub use types::{OrderByField, OrderOptions, Payload, SortOrder};

// Re-export logging utilities
pub use logging::{get_log_format, get_log_level, init as init_logging, init_with_level, is_debug_enabled};

// Re-exported for backend implementations
pub use async_trait::async_trait;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::auth::{Credentials, SignUpRequest, UserUpdate};
    pub use crate::client::Client;
    pub use crate::config::AdapterConfig;
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::filter::{EmptyInPolicy, FilterValue};
    pub use crate::query::QueryBuilder;
    pub use crate::response::{Data, ErrorInfo, Response};
    pub use crate::types::{OrderOptions, SortOrder};
}
