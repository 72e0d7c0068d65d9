//! Viewport geometry for deciding which scene a reader is looking at.
//!
//! Coordinates are viewport-relative pixels: `0.0` is the top edge of the
//! visible area and values grow downward, as reported by layout engines for
//! rendered blocks.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(height: f64) -> Self {
        Self { height }
    }

    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.height / 2.0
    }
}

/// Vertical extent of one rendered scene block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRegion {
    pub top: f64,
    pub bottom: f64,
}

impl SceneRegion {
    #[must_use]
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Strict containment; a line sitting exactly on an edge belongs to neither side.
    #[must_use]
    pub fn spans(&self, y: f64) -> bool {
        self.top < y && y < self.bottom
    }
}

/// Index of the first region, in document order, crossing the viewport's
/// vertical midpoint.
#[must_use]
pub fn active_scene_index(viewport: Viewport, regions: &[SceneRegion]) -> Option<usize> {
    let mid = viewport.midpoint();
    if !mid.is_finite() {
        return None;
    }
    regions.iter().position(|region| region.spans(mid))
}

/// Lay out blocks of the given heights one after another and return their
/// regions as seen after scrolling the document down by `scroll_y`.
#[must_use]
pub fn stacked_regions(heights: &[f64], scroll_y: f64) -> Vec<SceneRegion> {
    let mut top = -scroll_y;
    heights
        .iter()
        .map(|height| {
            let region = SceneRegion::new(top, top + height.max(0.0));
            top = region.bottom;
            region
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_region_under_midpoint() {
        let regions = stacked_regions(&[500.0, 500.0, 500.0], 550.0);
        assert_eq!(active_scene_index(Viewport::new(800.0), &regions), Some(1));
        let regions = stacked_regions(&[500.0, 500.0, 500.0], 700.0);
        assert_eq!(active_scene_index(Viewport::new(800.0), &regions), Some(2));
    }

    #[test]
    fn midpoint_on_a_boundary_matches_nothing() {
        // blocks meet at viewport y = 400, exactly the midpoint
        let regions = stacked_regions(&[500.0, 500.0, 500.0], 600.0);
        assert_eq!(active_scene_index(Viewport::new(800.0), &regions), None);
    }

    #[test]
    fn first_match_wins_for_overlaps() {
        let regions = [
            SceneRegion::new(0.0, 600.0),
            SceneRegion::new(100.0, 700.0),
        ];
        assert_eq!(active_scene_index(Viewport::new(800.0), &regions), Some(0));
    }

    #[test]
    fn nothing_under_midpoint() {
        let regions = stacked_regions(&[300.0, 300.0], 2_000.0);
        assert_eq!(active_scene_index(Viewport::new(800.0), &regions), None);
        assert_eq!(active_scene_index(Viewport::new(800.0), &[]), None);
    }

    #[test]
    fn stacked_regions_are_contiguous() {
        let regions = stacked_regions(&[100.0, 250.0], 40.0);
        assert_eq!(regions[0], SceneRegion::new(-40.0, 60.0));
        assert_eq!(regions[1], SceneRegion::new(60.0, 310.0));
    }
}
