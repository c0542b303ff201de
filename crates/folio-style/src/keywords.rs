//! Keyword-valued properties.
//!
//! Each keyword enum parses from and prints to its CSS spelling through
//! `strum` (`"inline-block".parse::<Display>()`), so hosts that hold raw
//! keyword strings can hand them over without a parser of their own.

use std::str::FromStr;

use folio_common::warning::warn_once;
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Parse a keyword, reporting unknown values once through the warning
/// channel.
///
/// Matching is ASCII case-insensitive and ignores surrounding whitespace.
/// Returns `None` for unknown keywords so callers can fall back to the
/// property's initial value.
pub fn parse_keyword<T: FromStr>(property: &str, value: &str) -> Option<T> {
    let normalized = value.trim().to_ascii_lowercase();
    if let Ok(parsed) = normalized.parse::<T>() {
        Some(parsed)
    } else {
        let _ = warn_once("style", &format!("unsupported {property} value '{value}'"));
        None
    }
}

/// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// The subset of `display` values the layout engine distinguishes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    /// "The element generates a block-level box."
    #[default]
    Block,
    /// Inline-level box taking part in an inline formatting context.
    Inline,
    /// Inline-level block container; an atomic inline.
    InlineBlock,
    /// Block box plus a `::marker`; increments the `list-item` counter.
    ListItem,
    /// Block container that always establishes a block formatting context.
    FlowRoot,
    /// Flex container.
    Flex,
    /// Grid container.
    Grid,
    /// Table wrapper box.
    Table,
    /// No box is generated.
    None,
}

impl Display {
    /// [§ 9.2.1 Block-level elements](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    ///
    /// "Block-level elements are those elements of the source document that
    /// are formatted visually as blocks."
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(
            self,
            Self::Block | Self::ListItem | Self::FlowRoot | Self::Flex | Self::Grid | Self::Table
        )
    }

    /// Inline-level boxes participate in an inline formatting context.
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock)
    }
}

/// [§ 9.3.1 Choosing a positioning scheme](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow.
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position (and possibly size) is specified with the
    /// 'top', 'right', 'bottom', and 'left' properties."
    Absolute,
    /// Absolute positioning against the viewport.
    Fixed,
    /// Normal-flow position offset relative to the nearest scrollport.
    Sticky,
}

impl Position {
    /// "An element is said to be positioned if its 'position' property has
    /// a value other than 'static'."
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }

    /// Out-of-flow positioning schemes (`absolute`, `fixed`).
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
///
/// Includes the logical values from CSS Logical Properties.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Float {
    /// "The box is not floated."
    #[default]
    None,
    /// Floated to the left edge.
    Left,
    /// Floated to the right edge.
    Right,
    /// Floated to the line-start edge.
    InlineStart,
    /// Floated to the line-end edge.
    InlineEnd,
}

impl Float {
    /// True for every value except `none`.
    #[must_use]
    pub const fn is_floated(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Clear {
    /// "No constraint on the box's position with respect to floats."
    #[default]
    None,
    /// Below left floats.
    Left,
    /// Below right floats.
    Right,
    /// Below all floats.
    Both,
    /// Below floats on the line-start side.
    InlineStart,
    /// Below floats on the line-end side.
    InlineEnd,
}

/// [§ 4.4 box-sizing](https://www.w3.org/TR/css-box-4/#box-sizing)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    /// `width`/`height` size the content box.
    #[default]
    ContentBox,
    /// `width`/`height` size the border box.
    BorderBox,
}

/// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    /// Line-start edge (left under `ltr`).
    #[default]
    Start,
    /// Line-end edge.
    End,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Centered in the line box.
    Center,
    /// "Text is justified according to the method specified by the
    /// 'text-justify' property."
    Justify,
}

/// [§ 11.1.1 Overflow](https://www.w3.org/TR/CSS2/visufx.html#overflow)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    /// "Content is not clipped."
    #[default]
    Visible,
    /// Clipped, no scrolling UI.
    Hidden,
    /// Clipped, scrolling UI always shown.
    Scroll,
    /// Clipped, scrolling UI when needed.
    Auto,
    /// Clipped without establishing a scroll container.
    Clip,
}

/// [CSS Compositing § 3.2 isolation](https://www.w3.org/TR/compositing-1/#isolation)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Isolation {
    /// No isolated group unless another property forces one.
    #[default]
    Auto,
    /// Always creates a stacking context.
    Isolate,
}

/// [§ 9.10 Text direction](https://www.w3.org/TR/CSS2/visuren.html#direction)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Left-to-right.
    #[default]
    Ltr,
    /// Right-to-left.
    Rtl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case_round_trip_through_strum() {
        assert_eq!("inline-block".parse::<Display>(), Ok(Display::InlineBlock));
        assert_eq!(Display::ListItem.to_string(), "list-item");
        assert_eq!("inline-start".parse::<Float>(), Ok(Float::InlineStart));
        assert_eq!(BoxSizing::BorderBox.to_string(), "border-box");
    }

    #[test]
    fn test_parse_keyword_is_case_insensitive() {
        assert_eq!(parse_keyword::<Clear>("clear", " BOTH "), Some(Clear::Both));
        assert_eq!(parse_keyword::<Position>("position", "middle"), None);
    }
}
