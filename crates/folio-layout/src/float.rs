//! CSS Float Layout.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side (or be prohibited from doing so by the 'clear' property)."
//!
//! A [`FloatContext`] belongs to one block formatting context and lives as
//! long as that context is being laid out. All coordinates it stores are
//! relative to the content box of the box that established the context.

use folio_style::{Clear, Direction, Float};
use serde::Serialize;
use tracing::{debug, warn};

/// Default bound on the placement scan.
pub const DEFAULT_ITERATION_CAP: usize = 1000;

/// Physical side a float is pushed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FloatSide {
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

impl FloatSide {
    /// Map a `float` value to a physical side. Logical values follow
    /// `direction`: `inline-start` is left under `ltr`.
    #[must_use]
    pub const fn from_style(float: Float, direction: Direction) -> Option<Self> {
        match (float, direction) {
            (Float::None, _) => None,
            (Float::Left, _)
            | (Float::InlineStart, Direction::Ltr)
            | (Float::InlineEnd, Direction::Rtl) => Some(Self::Left),
            (Float::Right, _)
            | (Float::InlineEnd, Direction::Ltr)
            | (Float::InlineStart, Direction::Rtl) => Some(Self::Right),
        }
    }
}

/// [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// Physical form of a `clear` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClearSide {
    /// "Requires the top border edge be below any left-floating boxes."
    Left,
    /// "Requires the top border edge be below any right-floating boxes."
    Right,
    /// "Requires the top border edge be below any floating boxes."
    Both,
}

impl ClearSide {
    /// Map a `clear` value to physical sides.
    #[must_use]
    pub const fn from_style(clear: Clear, direction: Direction) -> Option<Self> {
        match (clear, direction) {
            (Clear::None, _) => None,
            (Clear::Both, _) => Some(Self::Both),
            (Clear::Left, _)
            | (Clear::InlineStart, Direction::Ltr)
            | (Clear::InlineEnd, Direction::Rtl) => Some(Self::Left),
            (Clear::Right, _)
            | (Clear::InlineEnd, Direction::Ltr)
            | (Clear::InlineStart, Direction::Rtl) => Some(Self::Right),
        }
    }

    const fn includes(self, side: FloatSide) -> bool {
        matches!(
            (self, side),
            (Self::Both, _) | (Self::Left, FloatSide::Left) | (Self::Right, FloatSide::Right)
        )
    }
}

/// Margin box of a placed float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloatRect {
    /// Top margin edge.
    pub top: f32,
    /// Bottom margin edge.
    pub bottom: f32,
    /// Left margin edge.
    pub inline_start: f32,
    /// Right margin edge.
    pub inline_end: f32,
}

impl FloatRect {
    fn overlaps_band(&self, y_start: f32, y_end: f32) -> bool {
        if y_end > y_start {
            self.top < y_end && self.bottom > y_start
        } else {
            self.top <= y_start && self.bottom > y_start
        }
    }
}

/// Free horizontal interval between floats at some height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InlineOffsets {
    /// Right edge of the left floats (0 when there are none).
    pub start: f32,
    /// Left edge of the right floats (the container width when none).
    pub end: f32,
}

impl InlineOffsets {
    /// Width between the two offsets.
    #[must_use]
    pub fn available(&self) -> f32 {
        (self.end - self.start).max(0.0)
    }
}

/// Result of [`FloatContext::place_float`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloatPlacement {
    /// Where the margin box went.
    pub rect: FloatRect,
    /// True if the scan ran out of iterations and the last candidate was
    /// accepted.
    pub capped: bool,
}

/// Tracks placed floats within a block formatting context.
///
/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "The current and subsequent line boxes created next to the float are
/// shortened as necessary to make room for the margin box of the float."
#[derive(Debug, Clone, Serialize)]
pub struct FloatContext {
    left: Vec<FloatRect>,
    right: Vec<FloatRect>,
    iteration_cap: usize,
}

impl Default for FloatContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FloatContext {
    /// An empty context with the default iteration cap.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_iteration_cap(DEFAULT_ITERATION_CAP)
    }

    /// An empty context with a custom iteration cap (at least 1).
    #[must_use]
    pub const fn with_iteration_cap(iteration_cap: usize) -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
            iteration_cap: if iteration_cap == 0 { 1 } else { iteration_cap },
        }
    }

    /// Returns true if there are no placed floats in this context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// Floats on one side, in placement order.
    #[must_use]
    pub fn floats(&self, side: FloatSide) -> &[FloatRect] {
        match side {
            FloatSide::Left => &self.left,
            FloatSide::Right => &self.right,
        }
    }

    /// Record a float that was placed elsewhere.
    pub fn register(&mut self, side: FloatSide, rect: FloatRect) {
        match side {
            FloatSide::Left => self.left.push(rect),
            FloatSide::Right => self.right.push(rect),
        }
    }

    /// Free interval for a band `[y_start, y_end)` of a container
    /// `container_width` wide. A zero-height band tests the single line at
    /// `y_start`.
    #[must_use]
    pub fn inline_offsets(&self, y_start: f32, y_end: f32, container_width: f32) -> InlineOffsets {
        let start = self
            .left
            .iter()
            .filter(|f| f.overlaps_band(y_start, y_end))
            .map(|f| f.inline_end)
            .fold(0.0_f32, f32::max);
        let end = self
            .right
            .iter()
            .filter(|f| f.overlaps_band(y_start, y_end))
            .map(|f| f.inline_start)
            .fold(container_width, f32::min);
        InlineOffsets { start, end }
    }

    /// Lowest bottom edge of the floats on `side`.
    #[must_use]
    pub fn bottom(&self, side: FloatSide) -> Option<f32> {
        self.floats(side).iter().map(|f| f.bottom).reduce(f32::max)
    }

    /// [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    ///
    /// "If the element has any floating descendants whose bottom margin edge
    /// is below the element's bottom content edge, then the height is
    /// increased to include those edges."
    #[must_use]
    pub fn max_bottom(&self) -> Option<f32> {
        match (self.bottom(FloatSide::Left), self.bottom(FloatSide::Right)) {
            (Some(l), Some(r)) => Some(l.max(r)),
            (l, r) => l.or(r),
        }
    }

    /// The next Y below `y` at which a float ends, i.e. where more inline
    /// space may open up.
    #[must_use]
    pub fn next_unblocked_y(&self, y: f32) -> Option<f32> {
        self.left
            .iter()
            .chain(&self.right)
            .map(|f| f.bottom)
            .filter(|&b| b > y)
            .reduce(f32::min)
    }

    fn lowest_top(&self) -> Option<f32> {
        self.left.iter().chain(&self.right).map(|f| f.top).reduce(f32::max)
    }

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place a float whose margin box is `width` × `height`, no higher than
    /// `start_y`.
    ///
    /// - Rule 5: "The outer top of a floating box may not be higher than the
    ///   outer top of any block or floated box generated by an element
    ///   earlier in the source document."
    /// - Rule 8: "A floating box must be placed as high as possible."
    /// - Rule 9: "A left-floating box must be put as far to the left as
    ///   possible, a right-floating box as far to the right as possible."
    ///
    /// The scan jumps to [`Self::next_unblocked_y`] (or steps down by one
    /// pixel) until the box fits. A box wider than the container is placed
    /// at the first Y with no floats beside it. After `iteration_cap`
    /// candidates the last one is accepted.
    pub fn place_float(
        &mut self,
        side: FloatSide,
        width: f32,
        height: f32,
        start_y: f32,
        container_width: f32,
    ) -> FloatPlacement {
        self.place_float_within(side, width, height, start_y, 0.0, container_width)
    }

    /// [`Self::place_float`] for a containing block that only covers
    /// `[band_start, band_end]` of the context's width.
    pub fn place_float_within(
        &mut self,
        side: FloatSide,
        width: f32,
        height: f32,
        start_y: f32,
        band_start: f32,
        band_end: f32,
    ) -> FloatPlacement {
        // STEP 1: Start at the highest allowed position.
        let mut y = self.lowest_top().map_or(start_y, |top| start_y.max(top));
        let mut capped = false;

        // STEP 2: Scan downward until the margin box fits.
        let mut iterations = 0;
        let (start, end) = loop {
            let offsets = self.inline_offsets(y, y + height, band_end);
            let start = offsets.start.max(band_start);
            let end = offsets.end.min(band_end);
            let unobstructed = start <= band_start && end >= band_end;
            if end - start >= width || unobstructed {
                break (start, end);
            }
            iterations += 1;
            if iterations >= self.iteration_cap {
                warn!(
                    target: "folio::float",
                    iterations, y, width, "float placement hit the iteration cap"
                );
                capped = true;
                break (start, end);
            }
            y = self.next_unblocked_y(y).unwrap_or(y + 1.0);
        };

        // STEP 3: Push against the matching edge.
        let x = match side {
            FloatSide::Left => start,
            FloatSide::Right => (end - width).max(band_start),
        };
        let rect = FloatRect {
            top: y,
            bottom: y + height,
            inline_start: x,
            inline_end: x + width,
        };
        self.register(side, rect);
        debug!(target: "folio::float", ?side, x, y, width, height, "placed float");
        FloatPlacement { rect, capped }
    }

    /// [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// Y at or below `y` that clears the floats named by `clear`.
    #[must_use]
    pub fn clear_for_block(&self, clear: Clear, direction: Direction, y: f32) -> f32 {
        let Some(clear) = ClearSide::from_style(clear, direction) else {
            return y;
        };
        [FloatSide::Left, FloatSide::Right]
            .into_iter()
            .filter(|&side| clear.includes(side))
            .filter_map(|side| self.bottom(side))
            .fold(y, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_sides_follow_direction() {
        assert_eq!(
            FloatSide::from_style(Float::InlineStart, Direction::Ltr),
            Some(FloatSide::Left)
        );
        assert_eq!(
            FloatSide::from_style(Float::InlineStart, Direction::Rtl),
            Some(FloatSide::Right)
        );
        assert_eq!(
            ClearSide::from_style(Clear::InlineEnd, Direction::Ltr),
            Some(ClearSide::Right)
        );
        assert_eq!(FloatSide::from_style(Float::None, Direction::Ltr), None);
    }

    #[test]
    fn test_zero_height_band_is_a_point_test() {
        let mut ctx = FloatContext::new();
        ctx.register(
            FloatSide::Left,
            FloatRect {
                top: 0.0,
                bottom: 50.0,
                inline_start: 0.0,
                inline_end: 80.0,
            },
        );
        assert!((ctx.inline_offsets(10.0, 10.0, 300.0).start - 80.0).abs() < f32::EPSILON);
        assert!(ctx.inline_offsets(50.0, 50.0, 300.0).start.abs() < f32::EPSILON);
    }
}
