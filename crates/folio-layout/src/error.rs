//! Errors reported by the render pipeline.

use thiserror::Error;

/// Errors that can occur when starting a render.
///
/// Layout itself never fails on well-formed trees; only the configuration
/// is checked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Page height is zero, negative or not finite.
    #[error("invalid page height: {0}")]
    InvalidPageHeight(f32),

    /// Viewport width or height is zero, negative or not finite.
    #[error("invalid viewport: {width}x{height}")]
    InvalidViewport {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },

    /// Page margins are negative, not finite, or leave no usable height.
    #[error("invalid page margins: top {top}, bottom {bottom} on a {page_height}px page")]
    InvalidPageMargins {
        /// Top margin.
        top: f32,
        /// Bottom margin.
        bottom: f32,
        /// Page height the margins apply to.
        page_height: f32,
    },
}
