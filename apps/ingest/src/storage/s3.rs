use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use super::{object_key, public_url, BlobStore, StorageError, StoredArtifact};

/// S3 / MinIO backed blob store. Objects are addressed by `public_base_url/key`.
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn store(
        &self,
        owner_id: Uuid,
        bytes: Bytes,
        file_name: &str,
        mime_type: &str,
    ) -> Result<StoredArtifact, StorageError> {
        let key = object_key(owner_id, file_name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.clone()))
            .content_type(mime_type)
            .send()
            .await
            .map_err(|e| {
                // Service errors carry a response; transport failures do not.
                if e.raw_response().is_some() {
                    StorageError::Rejected(DisplayErrorContext(&e).to_string())
                } else {
                    StorageError::Unavailable(DisplayErrorContext(&e).to_string())
                }
            })?;

        info!(
            "Uploaded resume for owner {owner_id} to s3://{}/{} ({} bytes)",
            self.bucket,
            key,
            bytes.len()
        );

        Ok(StoredArtifact {
            url: public_url(&self.public_base_url, &key),
            key,
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}
