//! # FixMate
//!
//! Supabase-shaped data access for the FixMate portal on a Firebase-style
//! document backend.
//!
//! FixMate provides:
//! - A chainable query builder (`from(..).select(..).eq(..).order(..)`)
//!   with insert, update and delete over document collections
//! - Auth facades with role lookup from user profiles
//! - Object uploads and public URL construction
//! - Admin provisioning that keeps the acting session signed in
//!
//! Every call resolves to a [`Response`] of `{ data, error }` and never
//! panics or returns `Err` to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use fixmate::prelude::*;
//! use fixmate::memory::MemoryBackend;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let backend = MemoryBackend::new();
//! let client = Client::builder().backend(&backend).build().unwrap();
//!
//! let inserted = client
//!     .from("complaints")
//!     .insert(json!({"title": "Broken tap", "status": "Open"}))
//!     .execute()
//!     .await;
//! assert!(inserted.error.is_none());
//!
//! let open = client
//!     .from("complaints")
//!     .select("*")
//!     .eq("status", "Open")
//!     .order("created_at", OrderOptions { ascending: false })
//!     .execute()
//!     .await;
//! assert!(open.error.is_none());
//! # });
//! ```
//!
//! ## Backends
//!
//! - `memory` (default): process-local store, auth and object storage
//! - `firestore`: Firestore, Identity Toolkit and Storage REST APIs

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use fixmate_query::*;

/// Process-local backend.
#[cfg(feature = "memory")]
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
pub mod memory {
    pub use fixmate_memory::*;
}

/// Firebase REST backend.
#[cfg(feature = "firestore")]
#[cfg_attr(docsrs, doc(cfg(feature = "firestore")))]
pub mod firestore {
    pub use fixmate_firestore::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use fixmate_query::prelude::*;
}
