//! Inline formatting: line breaking and run placement.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! The builder consumes the inline-level content of one block container in
//! document order and produces [`Run`]s: one per text box per line, each
//! tagged with its line index, a last-line flag and its inter-word space
//! count. Lines are shortened next to floats. `text-align: justify` lines
//! (except the last) are stretched here by giving their runs extra word
//! spacing; [`crate::justify`] later fixes up whitespace and gaps.

use folio_style::{Direction, TextAlign};
use tracing::trace;

use crate::float::FloatContext;
use crate::justify::{FontAttrs, Run};
use crate::tree::NodeId;

/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
///
/// Font loading and shaping live outside the engine; layout only asks for
/// advances and line heights through this trait.
pub trait FontMetrics {
    /// Measure the total advance width of a text string at the given font size.
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// Calculate the line height for a given font size.
    ///
    /// "The initial value of 'line-height' is 'normal'. We recommend a used
    /// value for 'normal' between 1.0 and 1.2."
    fn line_height(&self, font_size: f32) -> f32;

    /// Distance from the top of a line of `line_height` to its baseline.
    fn ascent(&self, line_height: f32) -> f32 {
        line_height * 0.8
    }
}

/// Approximate font metrics using fixed ratios.
///
/// Average Latin advance ≈ 0.6 em, `line-height: normal` = 1.2 em. Used
/// when the host has no font data, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f32;
        chars * font_size * CHAR_WIDTH_RATIO
    }

    fn line_height(&self, font_size: f32) -> f32 {
        const LINE_HEIGHT_RATIO: f32 = 1.2;
        font_size * LINE_HEIGHT_RATIO
    }
}

/// [CSS Text 3 § 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
///
/// Collapse every whitespace sequence to one space (`white-space: normal`).
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Horizontal space available to lines of one block container.
#[derive(Debug, Clone, Copy)]
pub struct LineArea<'a> {
    /// Floats of the enclosing block formatting context.
    pub floats: &'a FloatContext,
    /// Absolute origin of the float context's coordinate space.
    pub float_origin: (f32, f32),
    /// Width of the float context's root content box.
    pub float_width: f32,
    /// Absolute left edge of the container's content box.
    pub left: f32,
    /// Absolute right edge of the container's content box.
    pub right: f32,
}

impl LineArea<'_> {
    /// Absolute `(left, right)` of a line box at `y` that is `height` tall.
    #[must_use]
    pub fn bounds(&self, y: f32, height: f32) -> (f32, f32) {
        let (ox, oy) = self.float_origin;
        let offsets = self
            .floats
            .inline_offsets(y - oy, y - oy + height, self.float_width);
        let left = self.left.max(ox + offsets.start);
        let right = self.right.min(ox + offsets.end);
        (left, right.max(left))
    }

    fn next_y(&self, y: f32) -> Option<f32> {
        let oy = self.float_origin.1;
        self.floats.next_unblocked_y(y - oy).map(|b| b + oy)
    }
}

/// Inline-level content, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineItem {
    /// Text of a text box.
    Text {
        /// The text box.
        node: NodeId,
        /// Raw text; whitespace is collapsed by the builder.
        text: String,
        /// Font of the text.
        font: FontAttrs,
        /// Used line height.
        line_height: f32,
    },
    /// An atomic inline (inline-block, replaced element, form control)
    /// already laid out; sizes are of its margin box.
    Atomic {
        /// The atomic box.
        node: NodeId,
        /// Margin-box width.
        width: f32,
        /// Margin-box height.
        height: f32,
    },
    /// Start or end edge of an inline box: margin + border + padding on
    /// that side.
    Edge {
        /// Horizontal space taken by the edge.
        width: f32,
    },
}

/// Where the builder put an atomic inline (margin-box top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomicPlacement {
    /// The atomic box.
    pub node: NodeId,
    /// Absolute x of the margin box.
    pub x: f32,
    /// Absolute y of the margin box.
    pub y: f32,
}

/// Output of one inline formatting pass.
#[derive(Debug, Clone, Default)]
pub struct InlineLayout {
    /// Runs with the text box they belong to.
    pub runs: Vec<(NodeId, Run)>,
    /// Line-box tops and heights of each run, parallel to `runs`.
    pub run_lines: Vec<(f32, f32)>,
    /// Atomic inline positions.
    pub atomics: Vec<AtomicPlacement>,
    /// Y just below the last line.
    pub bottom: f32,
    /// Line index for the next line of the same container.
    pub next_line_index: usize,
}

#[derive(Debug, Clone)]
enum Piece {
    Text {
        node: NodeId,
        text: String,
        font: FontAttrs,
        x: f32,
        width: f32,
        line_height: f32,
    },
    Atomic {
        node: NodeId,
        x: f32,
        height: f32,
    },
}

impl Piece {
    fn x_mut(&mut self) -> &mut f32 {
        match self {
            Self::Text { x, .. } | Self::Atomic { x, .. } => x,
        }
    }
}

/// Greedy line builder for one block container.
pub struct LineBuilder<'a> {
    metrics: &'a dyn FontMetrics,
    area: LineArea<'a>,
    text_align: TextAlign,
    direction: Direction,
    strut: f32,
    float_cap: usize,
    y: f32,
    line_index: usize,
    line_left: f32,
    line_width: f32,
    cursor: f32,
    pieces: Vec<Piece>,
    pending_space: bool,
    space_width: f32,
    out: InlineLayout,
}

impl<'a> LineBuilder<'a> {
    /// Start a builder whose first line top is `y`.
    ///
    /// `strut` is the container's own line height (the minimum height of
    /// every line box); `first_line_index` continues the numbering of an
    /// earlier inline run in the same container.
    #[must_use]
    pub fn new(
        metrics: &'a dyn FontMetrics,
        area: LineArea<'a>,
        text_align: TextAlign,
        direction: Direction,
        strut: f32,
        y: f32,
        first_line_index: usize,
    ) -> Self {
        let (line_left, right) = area.bounds(y, strut);
        Self {
            metrics,
            area,
            text_align,
            direction,
            strut,
            float_cap: crate::float::DEFAULT_ITERATION_CAP,
            y,
            line_index: first_line_index,
            line_left,
            line_width: right - line_left,
            cursor: 0.0,
            pieces: Vec::new(),
            pending_space: false,
            space_width: metrics.text_width(" ", folio_style::DEFAULT_FONT_SIZE_PX),
            out: InlineLayout::default(),
        }
    }

    /// Bound the search for a line position that fits beside floats.
    #[must_use]
    pub const fn with_float_cap(mut self, cap: usize) -> Self {
        self.float_cap = cap;
        self
    }

    /// Lay out one inline item.
    pub fn push(&mut self, item: &InlineItem) {
        match item {
            InlineItem::Text {
                node,
                text,
                font,
                line_height,
            } => self.push_text(*node, text, *font, *line_height),
            InlineItem::Atomic {
                node,
                width,
                height,
            } => self.push_atomic(*node, *width, *height),
            InlineItem::Edge { width } => self.cursor += width,
        }
    }

    fn push_text(&mut self, node: NodeId, text: &str, font: FontAttrs, line_height: f32) {
        let collapsed = collapse_whitespace(text);
        let space_width = self.metrics.text_width(" ", font.size);
        self.space_width = space_width;
        for (i, word) in collapsed.split(' ').enumerate() {
            if i > 0 && !self.pieces.is_empty() {
                self.pending_space = true;
            }
            if word.is_empty() {
                continue;
            }
            let word_width = self.metrics.text_width(word, font.size);
            let space = if self.pending_space { space_width } else { 0.0 };
            if !self.pieces.is_empty() && self.cursor + space + word_width > self.line_width {
                self.finish_line(false);
            }
            if self.pieces.is_empty() {
                self.pending_space = false;
                self.find_room(word_width, line_height);
            }
            self.append_word(node, word, font, line_height, space_width, word_width);
        }
        if collapsed.ends_with(' ') && !self.pieces.is_empty() {
            self.pending_space = true;
        }
    }

    fn append_word(
        &mut self,
        node: NodeId,
        word: &str,
        font: FontAttrs,
        line_height: f32,
        space_width: f32,
        word_width: f32,
    ) {
        let space = self.pending_space;
        self.pending_space = false;
        let added = word_width + if space { space_width } else { 0.0 };
        if let Some(Piece::Text {
            node: last_node,
            text,
            width,
            ..
        }) = self.pieces.last_mut()
            && *last_node == node
        {
            if space {
                text.push(' ');
            }
            text.push_str(word);
            *width += added;
        } else {
            let mut text = String::new();
            if space {
                text.push(' ');
            }
            text.push_str(word);
            self.pieces.push(Piece::Text {
                node,
                text,
                font,
                x: self.cursor,
                width: added,
                line_height,
            });
        }
        self.cursor += added;
    }

    fn push_atomic(&mut self, node: NodeId, width: f32, height: f32) {
        let space = if self.pending_space {
            self.space_width
        } else {
            0.0
        };
        if !self.pieces.is_empty() && self.cursor + space + width > self.line_width {
            self.finish_line(false);
        }
        if self.pieces.is_empty() {
            self.find_room(width, height);
        } else {
            self.cursor += space;
        }
        self.pending_space = false;
        self.pieces.push(Piece::Atomic {
            node,
            x: self.cursor,
            height,
        });
        self.cursor += width;
    }

    /// Move an empty line down past floats until `width` fits or no float
    /// is left beside it.
    fn find_room(&mut self, width: f32, height: f32) {
        let height = height.max(self.strut);
        for _ in 0..self.float_cap {
            let (left, right) = self.area.bounds(self.y, height);
            self.line_left = left;
            self.line_width = right - left;
            if self.line_width >= width {
                return;
            }
            match self.area.next_y(self.y) {
                Some(next) if next > self.y => self.y = next,
                _ => return,
            }
        }
    }

    /// [§ 16.2 Alignment](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    fn finish_line(&mut self, last: bool) {
        if self.pieces.is_empty() {
            return;
        }
        let pieces = std::mem::take(&mut self.pieces);

        // STEP 1: Line box height and baseline.
        // [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
        let mut ascent = self.metrics.ascent(self.strut);
        let mut descent = self.strut - ascent;
        for piece in &pieces {
            let (a, d) = match piece {
                Piece::Text { line_height, .. } => {
                    let a = self.metrics.ascent(*line_height);
                    (a, line_height - a)
                }
                Piece::Atomic { height, .. } => (*height, 0.0),
            };
            ascent = ascent.max(a);
            descent = descent.max(d);
        }
        let line_height = ascent + descent;
        let baseline = self.y + ascent;

        // STEP 2: Horizontal alignment.
        let used = self.cursor;
        let free = (self.line_width - used).max(0.0);
        let align = match (self.text_align, self.direction) {
            (TextAlign::Justify, _) if !last => TextAlign::Justify,
            (TextAlign::Start | TextAlign::Justify, Direction::Ltr)
            | (TextAlign::End, Direction::Rtl)
            | (TextAlign::Left, _) => TextAlign::Left,
            (TextAlign::End | TextAlign::Justify, Direction::Ltr | Direction::Rtl)
            | (TextAlign::Start, Direction::Rtl)
            | (TextAlign::Right, _) => TextAlign::Right,
            (TextAlign::Center, _) => TextAlign::Center,
        };
        let shift = match align {
            TextAlign::Right => free,
            TextAlign::Center => free / 2.0,
            _ => 0.0,
        };
        let spaces: usize = pieces
            .iter()
            .map(|p| match p {
                Piece::Text { text, .. } => count_spaces(text),
                Piece::Atomic { .. } => 0,
            })
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let per_space = if align == TextAlign::Justify && spaces > 0 {
            free / spaces as f32
        } else {
            0.0
        };

        // STEP 3: Emit runs and atomic placements.
        let mut extra = 0.0;
        for mut piece in pieces {
            *piece.x_mut() += shift + extra;
            match piece {
                Piece::Text {
                    node,
                    text,
                    font,
                    x,
                    width,
                    ..
                } => {
                    let space_count = count_spaces(&text);
                    #[allow(clippy::cast_precision_loss)]
                    let widened = per_space * space_count as f32;
                    let mut run =
                        Run::new(text, font, self.line_left + x, baseline, width + widened);
                    run.line_index = Some(self.line_index);
                    run.last_line = last;
                    run.space_count = Some(space_count);
                    if per_space > 0.0 && space_count > 0 {
                        run.word_spacing = Some(per_space);
                    }
                    extra += widened;
                    self.out.runs.push((node, run));
                    self.out.run_lines.push((self.y, line_height));
                }
                Piece::Atomic { node, x, height } => {
                    self.out.atomics.push(AtomicPlacement {
                        node,
                        x: self.line_left + x,
                        y: baseline - height,
                    });
                }
            }
        }
        trace!(line = self.line_index, y = self.y, line_height, last, "finished line");

        // STEP 4: Advance to the next line.
        self.y += line_height;
        self.line_index += 1;
        self.cursor = 0.0;
        self.pending_space = false;
        let (left, right) = self.area.bounds(self.y, self.strut);
        self.line_left = left;
        self.line_width = right - left;
    }

    /// Close the last line and return everything laid out.
    #[must_use]
    pub fn finish(mut self) -> InlineLayout {
        self.finish_line(true);
        self.out.bottom = self.y;
        self.out.next_line_index = self.line_index;
        self.out
    }
}

fn count_spaces(text: &str) -> usize {
    text.chars().filter(|&c| c == ' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), " a b ");
        assert_eq!(collapse_whitespace("ab"), "ab");
    }

    #[test]
    fn test_approximate_metrics() {
        let m = ApproximateFontMetrics;
        assert!((m.text_width("abcde", 10.0) - 30.0).abs() < 0.001);
        assert!((m.line_height(10.0) - 12.0).abs() < 0.001);
        assert!((m.ascent(10.0) - 8.0).abs() < 0.001);
    }
}
