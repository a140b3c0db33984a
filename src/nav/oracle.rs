use std::time::{Duration, Instant};

use rand::RngCore;

use crate::foundation::core::{Point3, SceneBounds};

/// Queries over a scene's navigable surface.
///
/// One implementation exists per host engine or runtime. Random queries take the caller's RNG so
/// that a seeded generation call stays reproducible against a deterministic oracle; adapters backed
/// by an engine's own sampler may ignore it.
pub trait NavigationOracle {
    /// Random navigable point within `radius` of `origin`.
    fn random_navigable_point(
        &self,
        origin: Point3,
        radius: f64,
        rng: &mut dyn RngCore,
    ) -> Option<Point3>;

    /// Random point within `radius` of `origin` that is path-reachable from it.
    fn random_reachable_point(
        &self,
        origin: Point3,
        radius: f64,
        rng: &mut dyn RngCore,
    ) -> Option<Point3>;

    /// Snap `point` onto the surface. Best effort: unsupported adapters return the input.
    fn project_to_surface(&self, point: Point3) -> Point3 {
        point
    }

    /// Polyline from `start` to `end` along the surface; empty when no path exists.
    fn find_path(&self, start: Point3, end: Point3) -> Vec<Point3>;

    /// First obstruction on the segment `start..end`, if any.
    fn raycast(&self, start: Point3, end: Point3) -> Option<Point3>;

    /// Whether surface data is still being (re)built.
    fn is_build_in_progress(&self) -> bool {
        false
    }

    /// Bounds of the navigable volume, if known.
    fn scene_bounds(&self) -> Option<SceneBounds>;
}

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Block until the oracle reports no build in progress, or `timeout` elapses.
///
/// Returns `true` when the surface is ready. A zero timeout skips polling entirely. Timing out is
/// not an error: the caller proceeds with whatever surface data exists.
pub fn wait_for_navigation_ready(oracle: &dyn NavigationOracle, timeout: Duration) -> bool {
    if timeout.is_zero() {
        return !oracle.is_build_in_progress();
    }

    let started = Instant::now();
    let mut announced = false;
    loop {
        if !oracle.is_build_in_progress() {
            if announced {
                tracing::info!(
                    elapsed_s = started.elapsed().as_secs_f64(),
                    "navigation data ready"
                );
            }
            return true;
        }
        if !announced {
            tracing::info!(timeout_s = timeout.as_secs_f64(), "waiting for navigation build");
            announced = true;
        }
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            tracing::warn!(
                elapsed_s = elapsed.as_secs_f64(),
                "navigation still building after timeout, continuing with partial data"
            );
            return false;
        }
        std::thread::sleep(READY_POLL_INTERVAL.min(timeout - elapsed));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nav/oracle.rs"]
mod tests;
