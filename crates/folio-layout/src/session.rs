//! Per-render state.
//!
//! Everything one render needs besides the tree itself is carried by a
//! [`RenderSession`] that the caller owns and threads through the passes.
//! Nothing here is global, so independent renders can run side by side.

use serde::Serialize;

use crate::box_model::Rect;
use crate::config::LayoutConfig;
use crate::counters::CounterContext;
use crate::error::LayoutError;
use crate::pagination::PageGeometry;

/// Counters collected while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Diagnostics {
    /// Boxes visited by block flow.
    pub boxes_laid_out: usize,
    /// Line boxes created.
    pub lines: usize,
    /// Floats accepted after the placement scan ran out of iterations.
    pub float_cap_hits: usize,
    /// Justified lines re-walked by the adjuster.
    pub justified_lines: usize,
    /// Pages produced.
    pub pages: usize,
}

/// State of one render.
#[derive(Debug, Clone)]
pub struct RenderSession {
    /// Validated configuration.
    pub config: LayoutConfig,
    /// The initial containing block.
    pub viewport: Rect,
    /// Counter scopes of the tree being rendered.
    pub counters: CounterContext,
    /// What happened so far.
    pub diagnostics: Diagnostics,
}

impl RenderSession {
    /// Start a render. Fails if the configuration is invalid.
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        let viewport = Rect::new(0.0, 0.0, config.viewport_width, config.viewport_height);
        Ok(Self {
            config,
            viewport,
            counters: CounterContext::new(),
            diagnostics: Diagnostics::default(),
        })
    }

    /// Page size and margins used for pagination.
    #[must_use]
    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry {
            page_height: self.config.page_height.unwrap_or(self.config.viewport_height),
            margin_top: self.config.page_margin_top,
            margin_bottom: self.config.page_margin_bottom,
        }
    }
}
