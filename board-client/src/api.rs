//! Backend API surface consumed by the sync engine
//!
//! `BoardApi` is the seam between the engine and the hosted backend. The
//! engine only ever talks to this trait; tests substitute an in-memory
//! implementation with controllable timing.

use async_trait::async_trait;

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;
use crate::ClientConfig;
use shared::{ApiResponse, BoardImage, BoardSnapshot, ImageDescriptor, StoredObject};

/// Remote operations the sync engine depends on.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Fetch the authoritative snapshot of a board.
    async fn fetch_board(&self, board_id: &str) -> ClientResult<BoardSnapshot>;

    /// Confirm a reorder: move `image_id` to `new_position` (1-based).
    ///
    /// Fails when the remote rejects the change (stale state, permission,
    /// network).
    async fn confirm_reorder(
        &self,
        board_id: &str,
        image_id: &str,
        new_position: i64,
    ) -> ClientResult<()>;

    /// Store raw image bytes in blob storage under a fresh path scoped to
    /// the board. Returns the stored object descriptor.
    async fn store_bytes(
        &self,
        board_id: &str,
        filename: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<StoredObject>;

    /// Register stored bytes as a board image. The server assigns the final
    /// position (new images land at the top).
    async fn register_image(
        &self,
        board_id: &str,
        descriptor: &ImageDescriptor,
    ) -> ClientResult<BoardImage>;
}

/// Network implementation of [`BoardApi`] over the REST + storage endpoints.
#[derive(Debug, Clone)]
pub struct HttpBoardApi {
    http: HttpClient,
}

impl HttpBoardApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: HttpClient::new(config),
        }
    }

    pub fn from_http(http: HttpClient) -> Self {
        Self { http }
    }

    /// Build a fresh, collision-resistant storage path for a board upload.
    ///
    /// Format: `{board_id}/{uuid}.{ext}`, extension taken from the original
    /// filename (lowercased), falling back to `bin`.
    pub fn object_path(board_id: &str, filename: &str) -> String {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        format!("{}/{}.{}", board_id, uuid::Uuid::new_v4(), ext)
    }
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn fetch_board(&self, board_id: &str) -> ClientResult<BoardSnapshot> {
        self.http
            .get::<ApiResponse<BoardSnapshot>>(&format!("api/boards/{}", board_id))
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing board data".to_string()))
    }

    async fn confirm_reorder(
        &self,
        board_id: &str,
        image_id: &str,
        new_position: i64,
    ) -> ClientResult<()> {
        #[derive(serde::Serialize)]
        struct ReorderRequest {
            position: i64,
        }

        let response: ApiResponse<serde_json::Value> = self
            .http
            .patch(
                &format!("api/boards/{}/images/{}", board_id, image_id),
                &ReorderRequest {
                    position: new_position,
                },
            )
            .await?;

        if !response.is_success() {
            return Err(ClientError::InvalidResponse(response.message));
        }

        tracing::debug!(
            board_id = %board_id,
            image_id = %image_id,
            position = new_position,
            "Reorder confirmed by backend"
        );
        Ok(())
    }

    async fn store_bytes(
        &self,
        board_id: &str,
        filename: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<StoredObject> {
        let path = Self::object_path(board_id, filename);
        let size_bytes = bytes.len() as u64;

        self.http.upload_object(&path, mime_type, bytes).await?;

        tracing::debug!(
            board_id = %board_id,
            path = %path,
            size = size_bytes,
            "Object stored"
        );

        Ok(StoredObject {
            path,
            mime_type: mime_type.to_string(),
            size_bytes,
            original_filename: filename.to_string(),
        })
    }

    async fn register_image(
        &self,
        board_id: &str,
        descriptor: &ImageDescriptor,
    ) -> ClientResult<BoardImage> {
        self.http
            .post::<ApiResponse<BoardImage>, _>(
                &format!("api/boards/{}/images", board_id),
                descriptor,
            )
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing image data".to_string()))
    }
}
