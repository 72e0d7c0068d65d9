//! Scroll position → active scene state machine.
//!
//! The tracker is fed raw layout observations and reports only changes of
//! the active scene. Observations are sampled: one arriving less than
//! `sample_interval` after the last evaluated one is parked, and
//! [`ScrollPositionTracker::flush`] evaluates whatever was parked last.

use std::time::{Duration, Instant};

use katha_core::model::{ProgressError, ProgressPercent};
use katha_core::scroll::{SceneRegion, Viewport, active_scene_index};

/// The active scene changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTransition {
    pub index: usize,
    pub previous: Option<usize>,
    pub progress: ProgressPercent,
}

#[derive(Debug, Clone)]
struct Observation {
    viewport: Viewport,
    regions: Vec<SceneRegion>,
}

#[derive(Debug, Clone)]
pub struct ScrollPositionTracker {
    total_scenes: usize,
    sample_interval: Duration,
    active: Option<usize>,
    last_sample: Option<Instant>,
    pending: Option<Observation>,
}

impl ScrollPositionTracker {
    /// Starts with no active scene, so the first scene under the midpoint is
    /// reported as a transition.
    #[must_use]
    pub fn new(total_scenes: usize, sample_interval: Duration) -> Self {
        Self {
            total_scenes,
            sample_interval,
            active: None,
            last_sample: None,
            pending: None,
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Feed one layout observation taken at `at`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::SceneOutOfRange` if the midpoint lands on a
    /// region past the last scene. The active scene is left unchanged.
    pub fn observe(
        &mut self,
        viewport: Viewport,
        regions: &[SceneRegion],
        at: Instant,
    ) -> Result<Option<SceneTransition>, ProgressError> {
        let throttled = self
            .last_sample
            .is_some_and(|last| at.saturating_duration_since(last) < self.sample_interval);
        if throttled {
            self.pending = Some(Observation {
                viewport,
                regions: regions.to_vec(),
            });
            return Ok(None);
        }

        self.pending = None;
        self.last_sample = Some(at);
        self.evaluate(viewport, regions)
    }

    /// Evaluate the newest parked observation, if any.
    ///
    /// # Errors
    ///
    /// Same as [`ScrollPositionTracker::observe`].
    pub fn flush(&mut self) -> Result<Option<SceneTransition>, ProgressError> {
        match self.pending.take() {
            Some(Observation { viewport, regions }) => self.evaluate(viewport, &regions),
            None => Ok(None),
        }
    }

    /// Forget the active scene, e.g. when a different chapter is opened.
    pub fn reset(&mut self) {
        self.active = None;
        self.last_sample = None;
        self.pending = None;
    }

    fn evaluate(
        &mut self,
        viewport: Viewport,
        regions: &[SceneRegion],
    ) -> Result<Option<SceneTransition>, ProgressError> {
        // no region at the midpoint keeps the previous scene
        let Some(index) = active_scene_index(viewport, regions) else {
            return Ok(None);
        };
        if self.active == Some(index) {
            return Ok(None);
        }
        // progress is measured against the chapter, not the laid-out regions
        let progress = ProgressPercent::for_scene(index, self.total_scenes)?;
        let previous = self.active.replace(index);
        Ok(Some(SceneTransition {
            index,
            previous,
            progress,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use katha_core::scroll::stacked_regions;

    const HEIGHTS: [f64; 3] = [400.0, 400.0, 400.0];

    fn viewport() -> Viewport {
        Viewport::new(600.0)
    }

    fn scroll_to(
        tracker: &mut ScrollPositionTracker,
        offset: f64,
        at: Instant,
    ) -> Option<SceneTransition> {
        tracker
            .observe(viewport(), &stacked_regions(&HEIGHTS, offset), at)
            .unwrap()
    }

    #[test]
    fn first_scene_is_reported() {
        let mut tracker = ScrollPositionTracker::new(3, Duration::from_millis(100));
        let t = scroll_to(&mut tracker, 0.0, Instant::now()).unwrap();
        assert_eq!(t.index, 0);
        assert_eq!(t.previous, None);
        assert_eq!(t.progress.value(), 33);
    }

    #[test]
    fn reports_only_changes() {
        let mut tracker = ScrollPositionTracker::new(3, Duration::ZERO);
        let start = Instant::now();

        assert!(scroll_to(&mut tracker, 0.0, start).is_some());
        assert!(scroll_to(&mut tracker, 50.0, start).is_none());

        let t = scroll_to(&mut tracker, 300.0, start).unwrap();
        assert_eq!((t.index, t.previous), (1, Some(0)));
        assert_eq!(t.progress.value(), 67);

        let t = scroll_to(&mut tracker, 700.0, start).unwrap();
        assert_eq!((t.index, t.previous), (2, Some(1)));
        assert_eq!(t.progress, ProgressPercent::COMPLETE);
    }

    #[test]
    fn progress_counts_every_scene_not_only_laid_out_ones() {
        // four scenes, only the first two rendered so far
        let mut tracker = ScrollPositionTracker::new(4, Duration::ZERO);
        let regions = stacked_regions(&[400.0, 400.0], 300.0);

        let t = tracker
            .observe(viewport(), &regions, Instant::now())
            .unwrap()
            .unwrap();
        assert_eq!(t.index, 1);
        assert_eq!(t.progress.value(), 50);
    }

    #[test]
    fn region_past_last_scene_is_rejected_every_time() {
        let mut tracker = ScrollPositionTracker::new(2, Duration::ZERO);
        let start = Instant::now();
        scroll_to(&mut tracker, 0.0, start);

        for _ in 0..2 {
            assert_eq!(
                tracker.observe(viewport(), &stacked_regions(&HEIGHTS, 700.0), start),
                Err(ProgressError::SceneOutOfRange { index: 2, total: 2 })
            );
            assert_eq!(tracker.active(), Some(0));
        }
    }

    #[test]
    fn gap_at_midpoint_keeps_previous_scene() {
        let mut tracker = ScrollPositionTracker::new(3, Duration::ZERO);
        let start = Instant::now();
        scroll_to(&mut tracker, 0.0, start);

        // midpoint sits exactly on the boundary between scenes 0 and 1
        assert!(scroll_to(&mut tracker, 100.0, start).is_none());
        // scrolled past every scene
        assert!(scroll_to(&mut tracker, 5000.0, start).is_none());
        assert_eq!(tracker.active(), Some(0));
    }

    #[test]
    fn observations_inside_interval_are_deferred() {
        let mut tracker = ScrollPositionTracker::new(3, Duration::from_millis(100));
        let start = Instant::now();

        assert!(scroll_to(&mut tracker, 0.0, start).is_some());
        assert!(scroll_to(&mut tracker, 300.0, start + Duration::from_millis(30)).is_none());
        assert!(scroll_to(&mut tracker, 700.0, start + Duration::from_millis(60)).is_none());
        assert!(tracker.has_pending());
        assert_eq!(tracker.active(), Some(0));

        // the latest parked observation wins
        let t = tracker.flush().unwrap().unwrap();
        assert_eq!((t.index, t.previous), (2, Some(0)));
        assert!(!tracker.has_pending());
        assert_eq!(tracker.flush(), Ok(None));
    }

    #[test]
    fn sample_after_interval_is_evaluated_and_drops_pending() {
        let mut tracker = ScrollPositionTracker::new(3, Duration::from_millis(100));
        let start = Instant::now();
        scroll_to(&mut tracker, 0.0, start);
        scroll_to(&mut tracker, 700.0, start + Duration::from_millis(10));

        let t = scroll_to(&mut tracker, 300.0, start + Duration::from_millis(150)).unwrap();
        assert_eq!(t.index, 1);
        assert_eq!(tracker.flush(), Ok(None));
    }

    #[test]
    fn reset_reports_first_scene_again() {
        let mut tracker = ScrollPositionTracker::new(3, Duration::ZERO);
        let start = Instant::now();
        scroll_to(&mut tracker, 0.0, start);
        tracker.reset();
        assert_eq!(tracker.active(), None);
        assert!(scroll_to(&mut tracker, 0.0, start).is_some());
    }
}
