//! Auto-or-length values used while solving widths and margins.
//!
//! [§ 6.1 Used Values](https://www.w3.org/TR/css-cascade-4/#used)

use folio_style::{AutoLength, LengthContext, Sides};
use serde::Serialize;

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// A value that is either still 'auto' or already resolved to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum AutoOr {
    /// The value is 'auto' and must be resolved during layout.
    #[default]
    Auto,
    /// The value is a specific length in pixels.
    Length(f32),
}

impl AutoOr {
    /// Returns true if this is 'auto'.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Returns the pixel value, or `default` for 'auto'.
    #[must_use]
    pub const fn to_px_or(self, default: f32) -> f32 {
        match self {
            Self::Auto => default,
            Self::Length(px) => px,
        }
    }

    /// Resolve a computed auto-or-length against `reference` (the
    /// percentage basis). 'auto' is preserved.
    #[must_use]
    pub fn resolve(value: AutoLength, reference: f32, ctx: &LengthContext) -> Self {
        match value {
            AutoLength::Auto => Self::Auto,
            AutoLength::Length(len) => Self::Length(len.to_px(reference, ctx)),
        }
    }
}

/// Margin edges with 'auto' preserved for the width solver.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AutoEdgeSizes {
    /// Top edge.
    pub top: AutoOr,
    /// Right edge.
    pub right: AutoOr,
    /// Bottom edge.
    pub bottom: AutoOr,
    /// Left edge.
    pub left: AutoOr,
}

impl AutoEdgeSizes {
    /// Resolve all four sides against the same percentage basis.
    ///
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    ///
    /// "The percentage is calculated with respect to the width of the
    /// generated box's containing block. Note that this is true for
    /// 'margin-top' and 'margin-bottom' as well."
    #[must_use]
    pub fn resolve(sides: &Sides<AutoLength>, reference: f32, ctx: &LengthContext) -> Self {
        Self {
            top: AutoOr::resolve(sides.top, reference, ctx),
            right: AutoOr::resolve(sides.right, reference, ctx),
            bottom: AutoOr::resolve(sides.bottom, reference, ctx),
            left: AutoOr::resolve(sides.left, reference, ctx),
        }
    }
}
