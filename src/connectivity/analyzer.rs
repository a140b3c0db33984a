//! Largest-reachable-region discovery from sparse oracle queries.
//!
//! A handful of well-separated seeds are path-tested against their nearest neighbours; every
//! seed also gets a cloud of points sampled as reachable from it. Cloud points inherit their
//! seed's connectivity, so the path-query cost is quadratic in seeds rather than in points.

use std::collections::{HashSet, VecDeque};

use rand::RngCore;

use crate::{
    config::AnalyzerConfig,
    foundation::core::{Point3, SceneBounds},
    foundation::error::{NavTrackError, NavTrackResult},
    nav::oracle::NavigationOracle,
};

/// Version tag stored with cached reports; bump when the sampling scheme changes.
pub const ALGORITHM_VERSION: &str = "seed-graph-v1";

const MIN_SEEDS: usize = 6;
const MAX_SEEDS: usize = 20;
const MIN_TARGET: usize = 30;
const MAX_TARGET: usize = 200;
const TARGET_WITHOUT_BOUNDS: usize = 50;

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Points known to be mutually path-reachable.
pub struct NavRegion {
    /// Region samples.
    pub points: Vec<Point3>,
}

impl NavRegion {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the region holds no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Arithmetic mean of the samples.
    pub fn centroid(&self) -> Option<Point3> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(Point3::ZERO, |acc, p| acc + *p);
        Some(sum * (1.0 / self.points.len() as f64))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Sampling radii used by one analysis.
pub struct RegionRadii {
    /// Seed sampling radius around the bounds center.
    pub global: f64,
    /// Cloud radius around each seed.
    pub reachable: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Persisted analysis result.
pub struct RegionReport {
    /// Scene identity.
    pub map_name: String,
    /// RFC 3339 timestamp of the analysis.
    pub analysis_date: String,
    /// Algorithm version that produced the report.
    pub algorithm_version: String,
    /// Region size aimed for.
    pub target_sample_count: usize,
    /// Seeds actually sampled.
    pub num_seeds: usize,
    /// Cloud size aimed for per seed.
    pub points_per_seed: usize,
    /// Sampling radii.
    pub radii: RegionRadii,
    /// Connected components in the seed graph.
    pub num_components: usize,
    /// Points in the returned region.
    pub largest_region_size: usize,
    /// The region itself.
    pub largest_region: Vec<Point3>,
    /// Cloud-point score of every component, in discovery order.
    pub all_component_scores: Vec<usize>,
}

impl RegionReport {
    /// Region carried by the report.
    pub fn region(&self) -> NavRegion {
        NavRegion {
            points: self.largest_region.clone(),
        }
    }
}

#[derive(Clone, Debug)]
/// Report plus the region it describes.
pub struct RegionAnalysis {
    /// Persistable summary.
    pub report: RegionReport,
    /// Winning region.
    pub region: NavRegion,
}

/// Region size to aim for: the explicit value, else `clamp(area_m2 * density, 30, 200)`, else 50.
pub fn target_sample_count(bounds: Option<SceneBounds>, config: &AnalyzerConfig) -> usize {
    if let Some(explicit) = config.target_sample_count {
        return explicit;
    }
    match bounds {
        Some(b) => {
            let raw = (b.area_m2() * config.sample_density).floor();
            (raw.max(0.0) as usize).clamp(MIN_TARGET, MAX_TARGET)
        }
        None => TARGET_WITHOUT_BOUNDS,
    }
}

/// `clamp(round(sqrt(target)), 6, 20)`.
pub fn seed_count(target: usize) -> usize {
    ((target as f64).sqrt().round() as usize).clamp(MIN_SEEDS, MAX_SEEDS)
}

/// Seed-graph connectivity analysis.
pub struct ConnectivityAnalyzer<'a> {
    config: &'a AnalyzerConfig,
}

impl<'a> ConnectivityAnalyzer<'a> {
    /// Analyzer using `config`.
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Sampling radii derived from the bounds.
    pub fn radii(&self, bounds: Option<SceneBounds>) -> RegionRadii {
        let c = self.config;
        let extent = bounds.map_or(c.min_global_radius, |b| b.horizontal_radius());
        let global = extent.clamp(c.min_global_radius, c.max_global_radius);
        let reachable = (global * c.reachable_radius_factor)
            .clamp(c.min_reachable_radius, c.max_reachable_radius);
        RegionRadii { global, reachable }
    }

    /// Find the best-connected region of the oracle's surface.
    #[tracing::instrument(skip(self, oracle, rng))]
    pub fn analyze(
        &self,
        oracle: &dyn NavigationOracle,
        scene_id: &str,
        bounds: Option<SceneBounds>,
        rng: &mut dyn RngCore,
    ) -> NavTrackResult<RegionAnalysis> {
        if bounds.is_none() {
            tracing::warn!("scene bounds unknown, sampling around the world origin");
        }
        let center = bounds.map_or(Point3::ZERO, |b| b.center);
        let target = target_sample_count(bounds, self.config);
        let radii = self.radii(bounds);
        let num_seeds = seed_count(target);
        let points_per_seed = target.div_ceil(num_seeds);
        tracing::info!(
            target,
            num_seeds,
            points_per_seed,
            global_radius = radii.global,
            reachable_radius = radii.reachable,
            "connectivity analysis started"
        );

        let seeds = self.sample_seeds(oracle, center, radii, num_seeds, rng);
        if seeds.len() < 2 {
            return Err(NavTrackError::InsufficientSeeds {
                found: seeds.len(),
                required: 2,
            });
        }

        let clouds: Vec<Vec<Point3>> = seeds
            .iter()
            .map(|seed| sample_cloud(oracle, *seed, radii.reachable, points_per_seed, rng))
            .collect();

        let adjacency = self.seed_graph(oracle, &seeds);
        let components = connected_components(&adjacency);
        let scores: Vec<usize> = components
            .iter()
            .map(|comp| comp.iter().map(|&i| clouds[i].len()).sum())
            .collect();

        let mut winner = 0;
        for (i, score) in scores.iter().enumerate() {
            if *score > scores[winner] {
                winner = i;
            }
        }

        let mut points: Vec<Point3> = components[winner]
            .iter()
            .flat_map(|&i| clouds[i].iter().copied())
            .collect();
        points.truncate(target);

        if components.len() > 1 {
            tracing::warn!(
                components = components.len(),
                scores = ?scores,
                "surface has disconnected regions"
            );
        }
        tracing::info!(
            components = components.len(),
            winner_score = scores[winner],
            region_size = points.len(),
            "connectivity analysis finished"
        );

        let report = RegionReport {
            map_name: scene_id.to_string(),
            analysis_date: chrono::Utc::now().to_rfc3339(),
            algorithm_version: ALGORITHM_VERSION.to_string(),
            target_sample_count: target,
            num_seeds: seeds.len(),
            points_per_seed,
            radii,
            num_components: components.len(),
            largest_region_size: points.len(),
            largest_region: points.clone(),
            all_component_scores: scores,
        };
        Ok(RegionAnalysis {
            report,
            region: NavRegion { points },
        })
    }

    fn sample_seeds(
        &self,
        oracle: &dyn NavigationOracle,
        center: Point3,
        radii: RegionRadii,
        num_seeds: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<Point3> {
        let min_separation = radii.reachable * self.config.min_seed_separation_factor;
        let max_attempts = num_seeds * 10;
        let mut seeds: Vec<Point3> = Vec::with_capacity(num_seeds);
        let mut attempts = 0;
        while seeds.len() < num_seeds && attempts < max_attempts {
            attempts += 1;
            let Some(p) = oracle.random_navigable_point(center, radii.global, rng) else {
                continue;
            };
            if seeds.iter().any(|s| s.distance(p) < min_separation) {
                continue;
            }
            seeds.push(p);
        }
        tracing::debug!(seeds = seeds.len(), attempts, "seed sampling done");
        seeds
    }

    /// Symmetric adjacency from path tests against each seed's nearest neighbours.
    fn seed_graph(&self, oracle: &dyn NavigationOracle, seeds: &[Point3]) -> Vec<Vec<usize>> {
        let n = seeds.len();
        let mut adjacency = vec![Vec::new(); n];
        let mut tested: HashSet<(usize, usize)> = HashSet::new();
        let mut path_tests = 0;
        let mut edges = 0;

        for i in 0..n {
            let mut by_distance: Vec<(f64, usize)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (seeds[i].distance(seeds[j]), j))
                .collect();
            by_distance.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            for &(_, j) in by_distance.iter().take(self.config.k_nearest) {
                if !tested.insert((i.min(j), i.max(j))) {
                    continue;
                }
                path_tests += 1;
                if !oracle.find_path(seeds[i], seeds[j]).is_empty() {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                    edges += 1;
                }
            }
        }
        tracing::debug!(path_tests, edges, "seed graph built");
        adjacency
    }
}

/// The seed itself plus up to `points_per_seed - 1` reachable samples.
fn sample_cloud(
    oracle: &dyn NavigationOracle,
    seed: Point3,
    radius: f64,
    points_per_seed: usize,
    rng: &mut dyn RngCore,
) -> Vec<Point3> {
    let mut cloud = vec![seed];
    let max_attempts = points_per_seed * 2;
    let mut attempts = 0;
    while cloud.len() < points_per_seed && attempts < max_attempts {
        attempts += 1;
        if let Some(p) = oracle.random_reachable_point(seed, radius, rng) {
            cloud.push(p);
        }
    }
    cloud
}

/// Breadth-first components, each listed in visit order; components in discovery order.
fn connected_components(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; adjacency.len()];
    let mut components = Vec::new();
    for start in 0..adjacency.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut component = Vec::new();
        while let Some(node) = queue.pop_front() {
            component.push(node);
            for &next in &adjacency[node] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        components.push(component);
    }
    components
}

#[cfg(test)]
#[path = "../../tests/unit/connectivity/analyzer.rs"]
mod tests;
