//! Board and image domain types
//!
//! A board is an ordered collection of images. Positions are 1-based and
//! contiguous within a board: after any successful mutation the `position`
//! values of a board's images form exactly `1..=N`.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// One positioned image within a board.
///
/// `position` is a 1-based rank, unique within the owning board. The
/// remaining fields are descriptive attributes that travel with the image
/// unmodified through reorder operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardImage {
    /// Stable opaque identifier
    pub id: String,
    /// Owning board
    pub board_id: String,
    /// 1-based rank within the board
    pub position: i64,
    /// Object path in blob storage
    pub storage_path: String,
    /// MIME type as stored
    pub mime_type: String,
    /// Size of the stored object in bytes
    pub size_bytes: u64,
    /// Filename the user uploaded
    pub original_filename: String,
    /// Creation time (Unix millis)
    pub created_at: Timestamp,
}

/// Point-in-time representation of a board: its images in display order
/// plus board-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board_id: String,
    pub title: String,
    /// Images in display order (index 0 is shown first)
    pub images: Vec<BoardImage>,
    /// When this snapshot was produced (Unix millis)
    pub fetched_at: Timestamp,
}

impl BoardSnapshot {
    pub fn new(board_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            board_id: board_id.into(),
            title: title.into(),
            images: Vec::new(),
            fetched_at: crate::util::now_millis(),
        }
    }

    /// Rewrite `position` values to match the current vector order (1..=N).
    pub fn renumber(&mut self) {
        for (idx, image) in self.images.iter_mut().enumerate() {
            image.position = idx as i64 + 1;
        }
    }

    /// Check the position invariant: values are exactly 1..=N in vector order.
    pub fn positions_valid(&self) -> bool {
        self.images
            .iter()
            .enumerate()
            .all(|(idx, image)| image.position == idx as i64 + 1)
    }

    /// Index of an image within the display order.
    pub fn image_index(&self, image_id: &str) -> Option<usize> {
        self.images.iter().position(|i| i.id == image_id)
    }
}
