//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::float::DEFAULT_ITERATION_CAP;

/// Settings for one render.
///
/// Every field has a default, so a partial JSON object deserializes:
///
/// ```
/// use folio_layout::LayoutConfig;
///
/// let config: LayoutConfig = serde_json::from_str(r#"{"page_height": 400.0}"#).unwrap();
/// assert_eq!(config.page_height, Some(400.0));
/// assert!((config.viewport_width - 800.0).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of the initial containing block.
    pub viewport_width: f32,
    /// Height of the initial containing block.
    pub viewport_height: f32,
    /// Page height; the viewport height when unset.
    pub page_height: Option<f32>,
    /// Band at the top of each page that baselines are folded below.
    pub page_margin_top: f32,
    /// Band at the bottom of each page that baselines are folded above.
    pub page_margin_bottom: f32,
    /// Bound on the float placement scan.
    pub float_iteration_cap: usize,
    /// Run the justification adjuster after flow.
    pub justify: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            page_height: None,
            page_margin_top: 0.0,
            page_margin_bottom: 0.0,
            float_iteration_cap: DEFAULT_ITERATION_CAP,
            justify: true,
        }
    }
}

impl LayoutConfig {
    /// Check that sizes are positive and finite and that the page margins
    /// leave some usable height.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.viewport_width) || !positive(self.viewport_height) {
            return Err(LayoutError::InvalidViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        let page_height = self.page_height.unwrap_or(self.viewport_height);
        if !positive(page_height) {
            return Err(LayoutError::InvalidPageHeight(page_height));
        }
        let (top, bottom) = (self.page_margin_top, self.page_margin_bottom);
        let margin_ok = |v: f32| v.is_finite() && v >= 0.0;
        if !margin_ok(top) || !margin_ok(bottom) || top + bottom >= page_height {
            return Err(LayoutError::InvalidPageMargins {
                top,
                bottom,
                page_height,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_margins_must_leave_room() {
        let config = LayoutConfig {
            page_height: Some(100.0),
            page_margin_top: 60.0,
            page_margin_bottom: 40.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidPageMargins { .. })
        ));
    }
}
