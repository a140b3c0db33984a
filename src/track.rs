//! Pipeline entry points: region discovery, single-track and batch generation.

use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

use crate::{
    behavior::executor::{BehaviorExecutor, StopReason},
    behavior::kind::BehaviorKind,
    config::TrackConfig,
    connectivity::analyzer::{ALGORITHM_VERSION, ConnectivityAnalyzer, NavRegion},
    connectivity::cache::{RegionCache, cache_key_for_scene},
    connectivity::spawn::{fallback_connected_point, select},
    foundation::core::{Fps, Point3},
    foundation::error::{NavTrackError, NavTrackResult},
    foundation::math::Fnv1a64,
    nav::oracle::{NavigationOracle, wait_for_navigation_ready},
    timeline::assembler::SegmentSpan,
    timeline::resample::{Keyframe, resample},
    timeline::sanitize::sanitize,
};

const DRAWN_SEED_LIMIT: u64 = 1_000_000;
const FALLBACK_SPAWN_ATTEMPTS: u32 = 10;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A generated camera track.
pub struct MotionTrack {
    /// Seed that reproduces this track.
    pub seed: u64,
    /// Keyframe rate.
    pub fps: Fps,
    /// Starting position.
    pub spawn: Point3,
    /// Sanitized keyframes.
    pub keyframes: Vec<Keyframe>,
    /// Behavior spans on the frame axis.
    pub spans: Vec<SegmentSpan>,
    /// Behaviors accepted.
    pub behavior_count: usize,
    /// Behaviors that failed along the way.
    pub failure_count: usize,
    /// Why behavior execution ended.
    pub stop: StopReason,
    /// Hash of seed and keyframes.
    pub fingerprint: u64,
}

impl MotionTrack {
    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.time_seconds)
    }

    /// True when execution stopped before filling the requested duration.
    pub fn is_partial(&self) -> bool {
        self.stop == StopReason::FailureBudgetExhausted
    }
}

/// Largest reachable region of a scene, from `cache` when a current entry exists.
///
/// A fresh analysis is written back; failing to store it only logs a warning.
#[tracing::instrument(skip(oracle, cache, config))]
pub fn generate_connectivity_region(
    oracle: &dyn NavigationOracle,
    scene_id: &str,
    cache: &mut dyn RegionCache,
    config: &TrackConfig,
) -> NavTrackResult<NavRegion> {
    config.analyzer.validate()?;
    let key = cache_key_for_scene(scene_id);
    if let Some(report) = cache.get(key, ALGORITHM_VERSION)? {
        tracing::info!(key, points = report.largest_region_size, "using cached region");
        return Ok(report.region());
    }

    wait_for_navigation_ready(oracle, config.nav_ready_timeout());
    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let analysis = ConnectivityAnalyzer::new(&config.analyzer).analyze(
        oracle,
        scene_id,
        oracle.scene_bounds(),
        &mut rng,
    )?;
    if let Err(err) = cache.put(key, ALGORITHM_VERSION, &analysis.report) {
        tracing::warn!(key, error = %err, "could not cache region");
    }
    Ok(analysis.region)
}

/// Generate one motion track over `region`.
///
/// The spawn point is `spawn` when given, else picked from the region, else found by probing the
/// oracle when the region is empty.
#[tracing::instrument(skip(oracle, region, config), fields(region_points = region.len()))]
pub fn generate_motion_track(
    oracle: &dyn NavigationOracle,
    region: &NavRegion,
    spawn: Option<Point3>,
    config: &TrackConfig,
) -> NavTrackResult<MotionTrack> {
    config.validate()?;
    if !wait_for_navigation_ready(oracle, config.nav_ready_timeout()) {
        tracing::warn!("navigation not ready, generating against partial data");
    }

    let seed = config
        .seed
        .unwrap_or_else(|| rand::thread_rng().gen_range(0..DRAWN_SEED_LIMIT));
    let mut rng = StdRng::seed_from_u64(seed);

    let spawn = match spawn {
        Some(p) => p,
        None if !region.is_empty() => select(region, config.spawn_strategy, Some(seed))?,
        None => {
            tracing::warn!("empty region, probing for a fallback spawn");
            fallback_connected_point(
                oracle,
                oracle.scene_bounds(),
                &mut rng,
                FALLBACK_SPAWN_ATTEMPTS,
            )
            .ok_or(NavTrackError::EmptyRegion)?
        }
    };
    tracing::info!(seed, spawn = %spawn, "generating motion track");

    let executor = BehaviorExecutor::new(
        oracle,
        &config.behavior,
        config.camera.pitch_range,
        config.fps,
    );
    let outcome = executor.run(spawn, config.initial_yaw, config.total_frames(), &mut rng);
    outcome.timeline.validate()?;

    let timeline = &outcome.timeline;
    let mut keyframes = resample(timeline, config.fps, timeline.total_frames(), &config.camera);
    let keep_pitch = config.camera.pitch_from_slope
        || timeline.contains_kind(BehaviorKind::RotatePitch);
    sanitize(&mut keyframes, &config.camera, keep_pitch);

    let fingerprint = fingerprint_keyframes(seed, &keyframes);
    tracing::info!(
        keyframes = keyframes.len(),
        behaviors = outcome.behavior_count,
        fingerprint = %format!("{fingerprint:016x}"),
        "motion track ready"
    );
    Ok(MotionTrack {
        seed,
        fps: config.fps,
        spawn,
        keyframes,
        spans: outcome.timeline.spans.clone(),
        behavior_count: outcome.behavior_count,
        failure_count: outcome.failure_count,
        stop: outcome.stop,
        fingerprint,
    })
}

/// Generate `count` tracks sharing one region; track `i` uses seed `base + i`.
///
/// Region analysis failure degrades to fallback spawns. A failed track is logged and skipped;
/// the call errors only when every track fails.
#[tracing::instrument(skip(oracle, cache, config))]
pub fn generate_batch(
    oracle: &dyn NavigationOracle,
    scene_id: &str,
    cache: &mut dyn RegionCache,
    config: &TrackConfig,
    count: usize,
) -> NavTrackResult<Vec<MotionTrack>> {
    config.validate()?;
    let region = match generate_connectivity_region(oracle, scene_id, cache, config) {
        Ok(region) => region,
        Err(err) => {
            tracing::warn!(error = %err, "region analysis failed, using fallback spawns");
            NavRegion::default()
        }
    };

    let base = config
        .seed
        .unwrap_or_else(|| rand::thread_rng().gen_range(0..DRAWN_SEED_LIMIT));
    let mut tracks = Vec::with_capacity(count);
    let mut last_err = None;
    for i in 0..count {
        let track_cfg = TrackConfig {
            seed: Some(base.wrapping_add(i as u64)),
            ..config.clone()
        };
        match generate_motion_track(oracle, &region, None, &track_cfg) {
            Ok(track) => tracks.push(track),
            Err(err) => {
                tracing::warn!(index = i, error = %err, "track generation failed");
                last_err = Some(err);
            }
        }
    }

    match last_err {
        Some(err) if tracks.is_empty() => Err(err),
        _ => Ok(tracks),
    }
}

fn fingerprint_keyframes(seed: u64, keyframes: &[Keyframe]) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    h.write_u64(keyframes.len() as u64);
    for k in keyframes {
        h.write_f64(k.time_seconds);
        h.write_f64(k.position.x);
        h.write_f64(k.position.y);
        h.write_f64(k.position.z);
        h.write_f64(k.rotation.yaw);
        h.write_f64(k.rotation.pitch);
        h.write_f64(k.rotation.roll);
    }
    h.finish()
}

#[cfg(test)]
#[path = "../tests/unit/track.rs"]
mod tests;
