//! CSS length values.
//!
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)

use serde::{Deserialize, Serialize};

/// User agent default font size.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
/// "Initial: medium" - we define medium as 16px per common browser convention.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// Everything a length needs besides its own value to become pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthContext {
    /// Computed font size of the element, for `em`.
    pub font_size: f32,
    /// Viewport width, for `vw`.
    pub viewport_width: f32,
    /// Viewport height, for `vh`.
    pub viewport_height: f32,
}

impl Default for LengthContext {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE_PX,
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }
}

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// "Lengths refer to distance measurements and are denoted by <length> in the
/// property definitions."
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f32),
    /// [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
    /// "Equal to the computed value of the font-size property of the element"
    Em(f32),
    /// [§ 5.1.2 Viewport-percentage lengths](https://www.w3.org/TR/css-values-4/#viewport-relative-lengths)
    /// "1vw = 1% of viewport width"
    Vw(f32),
    /// "1vh = 1% of viewport height"
    Vh(f32),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    ///
    /// Resolved against a property-specific reference length, usually the
    /// containing block's width.
    Percent(f32),
}

impl Default for LengthValue {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl LengthValue {
    /// True for percentages, whose pixel value depends on a reference length.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }

    /// Resolve to pixels.
    ///
    /// `reference` is the length percentages are taken of. A percentage with
    /// a non-finite reference, or any non-finite result, resolves to `0`.
    #[must_use]
    pub fn to_px(&self, reference: f32, ctx: &LengthContext) -> f32 {
        let px = match *self {
            Self::Px(px) => px,
            Self::Em(em) => em * ctx.font_size,
            Self::Vw(vw) => vw * ctx.viewport_width / 100.0,
            Self::Vh(vh) => vh * ctx.viewport_height / 100.0,
            Self::Percent(pct) => {
                if !reference.is_finite() {
                    return 0.0;
                }
                pct * reference / 100.0
            }
        };
        if px.is_finite() { px } else { 0.0 }
    }

    /// Resolve to pixels, or `None` when the value is a percentage of an
    /// indefinite reference.
    ///
    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// "If the height of the containing block is not specified explicitly
    /// (i.e., it depends on content height), and this element is not
    /// absolutely positioned, the value computes to 'auto'."
    #[must_use]
    pub fn to_px_definite(&self, reference: Option<f32>, ctx: &LengthContext) -> Option<f32> {
        match (self, reference) {
            (Self::Percent(_), None) => None,
            (Self::Percent(_), Some(r)) if !r.is_finite() => None,
            (_, r) => Some(self.to_px(r.unwrap_or(0.0), ctx)),
        }
    }
}

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// Used for `width`, `height`, margins and the inset properties.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AutoLength {
    /// The value is 'auto' and will be resolved during layout.
    #[default]
    Auto,
    /// A specific length value (px, em, %, etc.).
    Length(LengthValue),
}

impl AutoLength {
    /// Shorthand for a pixel length.
    #[must_use]
    pub const fn px(px: f32) -> Self {
        Self::Length(LengthValue::Px(px))
    }

    /// Shorthand for a percentage.
    #[must_use]
    pub const fn percent(pct: f32) -> Self {
        Self::Length(LengthValue::Percent(pct))
    }

    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// The length, if this is not 'auto'.
    #[must_use]
    pub const fn length(&self) -> Option<LengthValue> {
        match *self {
            Self::Auto => None,
            Self::Length(l) => Some(l),
        }
    }
}
