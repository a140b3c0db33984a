use rand::{Rng as _, RngCore, SeedableRng as _, rngs::StdRng};

use crate::{
    connectivity::analyzer::NavRegion,
    foundation::core::{Point3, SceneBounds},
    foundation::error::{NavTrackError, NavTrackResult},
    nav::oracle::NavigationOracle,
};

const FALLBACK_TEST_RADIUS: f64 = 8000.0;
const FALLBACK_INNER_FRACTION: f64 = 0.8;
const PROBE_ORIGINS: [Point3; 3] = [
    Point3::new(0.0, 0.0, 0.0),
    Point3::new(0.0, 0.0, 500.0),
    Point3::new(1000.0, 1000.0, 500.0),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How a spawn point is picked from a region.
pub enum SpawnStrategy {
    /// Uniformly random region point.
    #[default]
    Random,
    /// Region point nearest the region's mean.
    Centroid,
}

/// Pick a spawn point from `region`.
///
/// `Random` is reproducible when `seed` is given.
pub fn select(
    region: &NavRegion,
    strategy: SpawnStrategy,
    seed: Option<u64>,
) -> NavTrackResult<Point3> {
    let points = &region.points;
    if points.is_empty() {
        return Err(NavTrackError::EmptyRegion);
    }
    let picked = match strategy {
        SpawnStrategy::Random => {
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            points[rng.gen_range(0..points.len())]
        }
        SpawnStrategy::Centroid => {
            let Some(mean) = region.centroid() else {
                return Err(NavTrackError::EmptyRegion);
            };
            let mut best = points[0];
            for p in &points[1..] {
                if p.distance(mean) < best.distance(mean) {
                    best = *p;
                }
            }
            best
        }
    };
    tracing::debug!(?strategy, spawn = %picked, "spawn selected");
    Ok(picked)
}

/// Find some point with reachable surroundings without a region.
///
/// Candidates come from the inner part of `bounds`, or from a few probe origins near the world
/// origin when bounds are unknown. The first candidate from which a reachable point can be
/// sampled wins.
pub fn fallback_connected_point(
    oracle: &dyn NavigationOracle,
    bounds: Option<SceneBounds>,
    rng: &mut dyn RngCore,
    attempts: u32,
) -> Option<Point3> {
    for attempt in 1..=attempts {
        let Some(candidate) = fallback_candidate(oracle, bounds, rng, attempt) else {
            continue;
        };
        let candidate = oracle.project_to_surface(candidate);
        if oracle
            .random_reachable_point(candidate, FALLBACK_TEST_RADIUS, rng)
            .is_some()
        {
            tracing::info!(attempt, spawn = %candidate, "fallback spawn found");
            return Some(candidate);
        }
    }
    tracing::warn!(attempts, "no fallback spawn found");
    None
}

fn fallback_candidate(
    oracle: &dyn NavigationOracle,
    bounds: Option<SceneBounds>,
    rng: &mut dyn RngCore,
    attempt: u32,
) -> Option<Point3> {
    match bounds {
        Some(b) => {
            let hx = b.extent.x * FALLBACK_INNER_FRACTION;
            let hy = b.extent.y * FALLBACK_INNER_FRACTION;
            let x = b.center.x + if hx > 0.0 { rng.gen_range(-hx..=hx) } else { 0.0 };
            let y = b.center.y + if hy > 0.0 { rng.gen_range(-hy..=hy) } else { 0.0 };
            Some(Point3::new(x, y, b.center.z))
        }
        None => {
            let probe = PROBE_ORIGINS[(attempt as usize - 1) % PROBE_ORIGINS.len()];
            oracle.random_navigable_point(probe, FALLBACK_TEST_RADIUS, rng)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/connectivity/spawn.rs"]
mod tests;
