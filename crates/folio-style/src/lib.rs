//! Computed style values for the Folio layout engine.
//!
//! The cascade runs outside this workspace. What reaches layout is one
//! [`ComputedStyle`] per box: keywords already resolved to enums, lengths
//! still carrying their unit so that percentages and font/viewport-relative
//! units can be resolved against the right reference during layout.
//!
//! - [CSS 2.1 § 6.1 Specified, computed, and actual values](https://www.w3.org/TR/CSS2/cascade.html#value-stages)

pub mod computed;
pub mod keywords;
pub mod length;

pub use computed::{ComputedStyle, Rgba, Sides, ZIndex};
pub use keywords::{
    BoxSizing, Clear, Direction, Display, Float, Isolation, Overflow, Position, TextAlign,
    parse_keyword,
};
pub use length::{AutoLength, DEFAULT_FONT_SIZE_PX, LengthContext, LengthValue};
