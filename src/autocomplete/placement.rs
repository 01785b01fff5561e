//! Dropdown placement relative to the caret
//!
//! Below the caret by default, flipped above when the popup would overflow
//! the bottom of the viewport, pulled left to stay inside the right edge.

use serde::{Deserialize, Serialize};

/// Gap between caret and popup
pub const CARET_GAP: f64 = 5.0;
/// Distance kept from the right edge of the viewport
pub const EDGE_MARGIN: f64 = 10.0;
pub const MIN_WIDTH: f64 = 150.0;

/// Caret bounding box in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaretRect {
    pub left: f64,
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub min_width: f64,
}

pub fn place_dropdown(caret: CaretRect, popup: Size, viewport: Size) -> Placement {
    let width = popup.width.max(MIN_WIDTH);

    let mut left = caret.left;
    if left + width > viewport.width {
        left = viewport.width - width - EDGE_MARGIN;
    }

    let mut top = caret.bottom + CARET_GAP;
    if top + popup.height > viewport.height {
        top = caret.top - popup.height - CARET_GAP;
    }

    Placement {
        left: left.max(0.0),
        top: top.max(0.0),
        min_width: MIN_WIDTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size { width: 800.0, height: 600.0 };

    #[test]
    fn test_below_caret_by_default() {
        let placement = place_dropdown(
            CaretRect { left: 100.0, top: 80.0, bottom: 98.0 },
            Size { width: 200.0, height: 120.0 },
            VIEWPORT,
        );
        assert_eq!(placement, Placement { left: 100.0, top: 103.0, min_width: 150.0 });
    }

    #[test]
    fn test_flips_above_near_bottom() {
        let placement = place_dropdown(
            CaretRect { left: 100.0, top: 540.0, bottom: 558.0 },
            Size { width: 200.0, height: 120.0 },
            VIEWPORT,
        );
        assert_eq!(placement.top, 415.0);
    }

    #[test]
    fn test_clamped_to_right_edge() {
        let placement = place_dropdown(
            CaretRect { left: 700.0, top: 80.0, bottom: 98.0 },
            Size { width: 200.0, height: 120.0 },
            VIEWPORT,
        );
        assert_eq!(placement.left, 590.0);
    }

    #[test]
    fn test_narrow_popup_uses_min_width_and_never_negative() {
        let placement = place_dropdown(
            CaretRect { left: 60.0, top: 5.0, bottom: 20.0 },
            Size { width: 40.0, height: 300.0 },
            Size { width: 120.0, height: 200.0 },
        );
        assert_eq!(placement.left, 0.0);
        assert_eq!(placement.top, 0.0);
    }
}
