//! The computed-style record.
//!
//! [§ 6.1.2 Computed values](https://www.w3.org/TR/CSS2/cascade.html#computed-value)
//!
//! "Specified values are resolved to computed values during the cascade."
//!
//! Layout only reads these records; a box keeps a shared reference to its
//! record for the whole render.

use serde::{Deserialize, Serialize};

use crate::keywords::{
    BoxSizing, Clear, Direction, Display, Float, Isolation, Overflow, Position, TextAlign,
};
use crate::length::{AutoLength, DEFAULT_FONT_SIZE_PX, LengthContext, LengthValue};

/// Four physical sides of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sides<T> {
    /// Top side.
    pub top: T,
    /// Right side.
    pub right: T,
    /// Bottom side.
    pub bottom: T,
    /// Left side.
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on every side.
    #[must_use]
    pub const fn all(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Vertical and horizontal values, as in the two-value shorthand.
    #[must_use]
    pub const fn symmetric(vertical: T, horizontal: T) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// [§ 9.9.1 Specifying the stack level: the 'z-index' property](https://www.w3.org/TR/CSS2/visuren.html#z-index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZIndex {
    /// "The stack level of the generated box in the current stacking context
    /// is 0. The box does not establish a new stacking context unless it is
    /// the root element."
    #[default]
    Auto,
    /// "This integer is the stack level of the generated box in the current
    /// stacking context. The box also establishes a new stacking context."
    Integer(i32),
}

impl ZIndex {
    /// The numeric stack level, if any.
    #[must_use]
    pub const fn value(self) -> Option<i32> {
        match self {
            Self::Auto => None,
            Self::Integer(z) => Some(z),
        }
    }
}

/// An sRGB color with alpha, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, 255 is opaque.
    pub a: u8,
}

/// Computed style of one box.
///
/// Missing fields deserialize to their CSS initial values, so hosts can
/// describe a style with only the properties they set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedStyle {
    /// `display`
    pub display: Display,
    /// `position`
    pub position: Position,
    /// `float`
    pub float: Float,
    /// `clear`
    pub clear: Clear,
    /// `z-index`
    pub z_index: ZIndex,
    /// `overflow` (both axes)
    pub overflow: Overflow,
    /// `box-sizing`
    pub box_sizing: BoxSizing,
    /// `text-align`
    pub text_align: TextAlign,
    /// `direction`
    pub direction: Direction,
    /// `isolation`
    pub isolation: Isolation,

    /// `width`
    pub width: AutoLength,
    /// `height`
    pub height: AutoLength,
    /// `min-width`; `None` is the initial `0`/`auto`.
    pub min_width: Option<LengthValue>,
    /// `max-width`; `None` is `none`.
    pub max_width: Option<LengthValue>,
    /// `min-height`
    pub min_height: Option<LengthValue>,
    /// `max-height`
    pub max_height: Option<LengthValue>,

    /// `margin-*`
    pub margin: Sides<AutoLength>,
    /// `padding-*`
    pub padding: Sides<LengthValue>,
    /// `border-*-width`
    pub border_width: Sides<LengthValue>,
    /// `top`, `right`, `bottom`, `left`
    pub inset: Sides<AutoLength>,

    /// `font-size` in px.
    pub font_size: f32,
    /// `font-weight` (100..=900).
    pub font_weight: u16,
    /// `font-style: italic | oblique`
    pub italic: bool,
    /// `line-height` in px; `None` is `normal`.
    pub line_height: Option<f32>,

    /// `opacity`
    pub opacity: f32,
    /// A `transform` other than `none` is present.
    pub has_transform: bool,
    /// A `filter` other than `none` is present.
    pub has_filter: bool,
    /// `background-color`
    pub background_color: Option<Rgba>,
    /// `border-radius` (uniform) in px.
    pub border_radius: f32,

    /// `counter-reset`, unparsed.
    pub counter_reset: Option<String>,
    /// `counter-increment`, unparsed.
    pub counter_increment: Option<String>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::default(),
            position: Position::default(),
            float: Float::default(),
            clear: Clear::default(),
            z_index: ZIndex::default(),
            overflow: Overflow::default(),
            box_sizing: BoxSizing::default(),
            text_align: TextAlign::default(),
            direction: Direction::default(),
            isolation: Isolation::default(),
            width: AutoLength::Auto,
            height: AutoLength::Auto,
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
            margin: Sides::all(AutoLength::px(0.0)),
            padding: Sides::default(),
            border_width: Sides::default(),
            inset: Sides::all(AutoLength::Auto),
            font_size: DEFAULT_FONT_SIZE_PX,
            font_weight: 400,
            italic: false,
            line_height: None,
            opacity: 1.0,
            has_transform: false,
            has_filter: false,
            background_color: None,
            border_radius: 0.0,
            counter_reset: None,
            counter_increment: None,
        }
    }
}

impl ComputedStyle {
    /// Initial style for an inline box.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            display: Display::Inline,
            ..Self::default()
        }
    }

    /// Style a text run inherits from its parent box.
    ///
    /// [§ 6.2 Inheritance](https://www.w3.org/TR/CSS2/cascade.html#inheritance)
    ///
    /// Only inherited properties carry over; box properties reset to their
    /// initial values.
    #[must_use]
    pub fn inherit_for_text(parent: &Self) -> Self {
        Self {
            display: Display::Inline,
            text_align: parent.text_align,
            direction: parent.direction,
            font_size: parent.font_size,
            font_weight: parent.font_weight,
            italic: parent.italic,
            line_height: parent.line_height,
            ..Self::default()
        }
    }

    /// Length resolution context for this box.
    #[must_use]
    pub const fn length_context(&self, viewport_width: f32, viewport_height: f32) -> LengthContext {
        LengthContext {
            font_size: self.font_size,
            viewport_width,
            viewport_height,
        }
    }

    /// True when `float` is not `none`.
    #[must_use]
    pub const fn is_floated(&self) -> bool {
        self.float.is_floated()
    }

    /// True for `position: absolute | fixed`.
    #[must_use]
    pub const fn is_out_of_flow(&self) -> bool {
        self.position.is_out_of_flow()
    }
}
