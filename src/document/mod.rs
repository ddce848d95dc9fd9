//! Document module for issue artifacts
//!
//! Turns fetched page image bytes into normalized pages and concatenates
//! them into one PDF per issue.

mod page;
mod pdf;

pub use page::{decode_page, is_truncated_jpeg, repair_truncated_jpeg, scaled_size, PageImage};
pub use pdf::render_pdf;

use thiserror::Error;

/// Errors that can occur while building an issue document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode page: {0}")]
    Encode(String),

    #[error("Failed to write PDF: {0}")]
    Pdf(String),

    #[error("No pages to write")]
    Empty,
}
