//! Storage facade.
//!
//! A bucket is a top-level folder of the project's default storage bucket:
//! `from("complaint-images").upload("c1/photo.jpg", bytes)` stores the object
//! at `complaint-images/c1/photo.jpg`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;

use crate::client::Client;
use crate::response::{PublicUrl, PublicUrlResponse, Response, UploadData};

/// Characters `encodeURIComponent` escapes.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Storage facade, obtained from [`Client::storage`].
#[derive(Debug, Clone, Copy)]
pub struct Storage<'a> {
    client: &'a Client,
}

impl<'a> Storage<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Select a bucket.
    pub fn from(&self, bucket: impl Into<String>) -> Bucket<'a> {
        Bucket {
            client: self.client,
            bucket: bucket.into(),
        }
    }
}

/// One bucket.
#[derive(Debug, Clone)]
pub struct Bucket<'a> {
    client: &'a Client,
    bucket: String,
}

impl Bucket<'_> {
    /// The bucket name.
    pub fn name(&self) -> &str {
        &self.bucket
    }

    /// Store bytes at `path` within the bucket. An existing object at the
    /// same path is replaced.
    pub async fn upload(&self, path: &str, file: impl Into<Vec<u8>>) -> Response<UploadData> {
        let full_path = self.object_path(path);
        let bytes = file.into();
        debug!(bucket = %self.bucket, path = %full_path, size = bytes.len(), "Uploading object");

        let storage = self.client.object_storage();
        self.client
            .call("put", storage.put(&full_path, bytes))
            .await
            .map(|path| Some(UploadData { path }))
            .into()
    }

    /// Public download URL for `path`. Pure formatting; no backend call.
    pub fn get_public_url(&self, path: &str) -> PublicUrlResponse {
        let config = self.client.config();
        PublicUrlResponse {
            data: PublicUrl {
                public_url: public_url(
                    &config.storage.public_url_base,
                    &config.firebase.storage_bucket,
                    &self.object_path(path),
                ),
            },
        }
    }

    fn object_path(&self, path: &str) -> String {
        format!("{}/{}", self.bucket, path)
    }
}

/// `{base}/v0/b/{storage_bucket}/o/{encoded}?alt=media`, each segment of
/// `object_path` encoded on its own and joined with `%2F`.
pub fn public_url(base: &str, storage_bucket: &str, object_path: &str) -> String {
    format!(
        "{}/v0/b/{}/o/{}?alt=media",
        base.trim_end_matches('/'),
        storage_bucket,
        encode_object_path(object_path)
    )
}

/// Percent-encode each `/`-separated segment and join with `%2F`.
pub fn encode_object_path(object_path: &str) -> String {
    object_path
        .split('/')
        .map(|segment| utf8_percent_encode(segment, COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("%2F")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segments() {
        assert_eq!(
            encode_object_path("complaint-images/c1/my photo.jpg"),
            "complaint-images%2Fc1%2Fmy%20photo.jpg"
        );
    }

    #[test]
    fn test_encode_matches_encode_uri_component() {
        assert_eq!(encode_object_path("a(b)!~*'_-.c"), "a(b)!~*'_-.c");
        assert_eq!(encode_object_path("x&y=z?#"), "x%26y%3Dz%3F%23");
        assert_eq!(encode_object_path("café"), "caf%C3%A9");
    }

    #[test]
    fn test_public_url_format() {
        let url = public_url(
            "https://firebasestorage.googleapis.com",
            "fixmate.appspot.com",
            "avatars/u1/me.png",
        );
        assert_eq!(
            url,
            "https://firebasestorage.googleapis.com/v0/b/fixmate.appspot.com/o/avatars%2Fu1%2Fme.png?alt=media"
        );
    }

    #[test]
    fn test_public_url_is_pure() {
        let a = public_url("https://h/", "b", "x/y z");
        let b = public_url("https://h/", "b", "x/y z");
        assert_eq!(a, b);
        assert_eq!(a, "https://h/v0/b/b/o/x%2Fy%20z?alt=media");
    }
}
