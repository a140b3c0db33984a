use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::Context as _;

use crate::{
    behavior::kind::BehaviorWeights,
    connectivity::spawn::SpawnStrategy,
    foundation::core::Fps,
    foundation::error::{NavTrackError, NavTrackResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Settings for one motion track generation call.
///
/// Every field has a default, so a JSON file only needs the values it overrides:
///
/// ```json
/// { "duration_secs": 20, "seed": 7, "behavior": { "speed": 200 } }
/// ```
pub struct TrackConfig {
    /// Output frame rate.
    pub fps: Fps,
    /// Target track length in seconds.
    pub duration_secs: f64,
    /// RNG seed; a random seed is drawn (and recorded on the track) when absent.
    pub seed: Option<u64>,
    /// How the spawn point is picked from the region when the caller gives none.
    pub spawn_strategy: SpawnStrategy,
    /// Camera yaw at spawn, in degrees.
    pub initial_yaw: f64,
    /// Seconds to wait for the oracle to finish building before sampling.
    pub nav_ready_timeout_secs: f64,
    /// Movement primitive settings.
    pub behavior: BehaviorConfig,
    /// Keyframe sampling and rotation limits.
    pub camera: CameraConfig,
    /// Region analysis settings.
    pub analyzer: AnalyzerConfig,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            duration_secs: 60.0,
            seed: None,
            spawn_strategy: SpawnStrategy::Random,
            initial_yaw: 0.0,
            nav_ready_timeout_secs: 10.0,
            behavior: BehaviorConfig::default(),
            camera: CameraConfig::default(),
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl TrackConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> NavTrackResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every nested section.
    pub fn validate(&self) -> NavTrackResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(NavTrackError::validation("fps must have num>0 and den>0"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(NavTrackError::validation(
                "duration_secs must be finite and >= 0",
            ));
        }
        if !self.initial_yaw.is_finite() {
            return Err(NavTrackError::validation("initial_yaw must be finite"));
        }
        if !self.nav_ready_timeout_secs.is_finite() || self.nav_ready_timeout_secs < 0.0 {
            return Err(NavTrackError::validation(
                "nav_ready_timeout_secs must be finite and >= 0",
            ));
        }
        self.behavior.validate()?;
        self.camera.validate()?;
        self.analyzer.validate()
    }

    /// Frame budget for the configured duration.
    pub fn total_frames(&self) -> u64 {
        self.fps.secs_to_frames_round(self.duration_secs)
    }

    /// Navigation-ready wait as a [`Duration`].
    pub fn nav_ready_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.nav_ready_timeout_secs.max(0.0))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Movement primitive settings. Distances are in scene units, angles in degrees.
pub struct BehaviorConfig {
    /// Relative draw weights per behavior kind.
    pub weights: BehaviorWeights,
    /// Travel speed for roam and translate, units per second.
    pub speed: f64,
    /// Search radius for roam destinations.
    pub roam_radius: f64,
    /// Roam destinations closer than this are rejected.
    pub min_leg_distance: f64,
    /// Destination draws per roam attempt.
    pub max_random_point_tries: u32,
    /// Snap roam destinations onto the surface before path queries.
    pub project_roam_targets: bool,
    /// Raycast reach for translations.
    pub max_translate_distance: f64,
    /// Translations shorter than this fail as "obstacle too close".
    pub min_translate_distance: f64,
    /// Distance kept from an obstacle hit.
    pub translate_safety_margin: f64,
    /// Shortest idle, seconds.
    pub min_idle_secs: f64,
    /// Longest idle, seconds.
    pub max_idle_secs: f64,
    /// Frames between stored idle samples.
    pub idle_key_interval: u32,
    /// In-place rotation speed, degrees per second.
    pub rotate_speed: f64,
    /// Yaw rotation angle range.
    pub yaw_rotate_range: [f64; 2],
    /// Pitch rotation angle range.
    pub pitch_rotate_range: [f64; 2],
    /// Frames between stored rotation samples.
    pub rotate_key_interval: u32,
    /// Consecutive failed behaviors before generation stops.
    pub max_consecutive_failures: u32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            weights: BehaviorWeights::default(),
            speed: 150.0,
            roam_radius: 1000.0,
            min_leg_distance: 300.0,
            max_random_point_tries: 20,
            project_roam_targets: true,
            max_translate_distance: 500.0,
            min_translate_distance: 50.0,
            translate_safety_margin: 20.0,
            min_idle_secs: 1.0,
            max_idle_secs: 3.0,
            idle_key_interval: 30,
            rotate_speed: 30.0,
            yaw_rotate_range: [-90.0, 90.0],
            pitch_rotate_range: [-30.0, 30.0],
            rotate_key_interval: 15,
            max_consecutive_failures: 5,
        }
    }
}

impl BehaviorConfig {
    /// Validate ranges and positivity constraints.
    pub fn validate(&self) -> NavTrackResult<()> {
        self.weights.validate()?;
        for (name, v) in [
            ("speed", self.speed),
            ("roam_radius", self.roam_radius),
            ("max_translate_distance", self.max_translate_distance),
            ("rotate_speed", self.rotate_speed),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(NavTrackError::validation(format!(
                    "behavior.{name} must be finite and > 0"
                )));
            }
        }
        for (name, v) in [
            ("min_leg_distance", self.min_leg_distance),
            ("min_translate_distance", self.min_translate_distance),
            ("translate_safety_margin", self.translate_safety_margin),
            ("min_idle_secs", self.min_idle_secs),
            ("max_idle_secs", self.max_idle_secs),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(NavTrackError::validation(format!(
                    "behavior.{name} must be finite and >= 0"
                )));
            }
        }
        if self.min_idle_secs > self.max_idle_secs {
            return Err(NavTrackError::validation(
                "behavior.min_idle_secs must be <= max_idle_secs",
            ));
        }
        validate_range("behavior.yaw_rotate_range", self.yaw_rotate_range)?;
        validate_range("behavior.pitch_rotate_range", self.pitch_rotate_range)?;
        if self.idle_key_interval == 0 || self.rotate_key_interval == 0 {
            return Err(NavTrackError::validation(
                "behavior key intervals must be > 0",
            ));
        }
        if self.max_random_point_tries == 0 || self.max_consecutive_failures == 0 {
            return Err(NavTrackError::validation(
                "behavior retry budgets must be > 0",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Keyframe sampling and orientation post-processing.
pub struct CameraConfig {
    /// Frames between emitted keyframes.
    pub key_interval_frames: u32,
    /// Constant height added to every keyframe position.
    pub z_offset: f64,
    /// Derive roam pitch from the local path slope.
    pub pitch_from_slope: bool,
    /// Absolute pitch limits in degrees.
    pub pitch_range: [f64; 2],
    /// Yaw rate limit in degrees per second; unlimited when absent.
    pub max_yaw_rate: Option<f64>,
    /// Pitch rate limit in degrees per second, applied when pitch is kept.
    pub max_pitch_rate: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            key_interval_frames: 1,
            z_offset: 0.0,
            pitch_from_slope: false,
            pitch_range: [-20.0, 20.0],
            max_yaw_rate: None,
            max_pitch_rate: 20.0,
        }
    }
}

impl CameraConfig {
    /// Validate sampling interval and limits.
    pub fn validate(&self) -> NavTrackResult<()> {
        if self.key_interval_frames == 0 {
            return Err(NavTrackError::validation(
                "camera.key_interval_frames must be > 0",
            ));
        }
        if !self.z_offset.is_finite() {
            return Err(NavTrackError::validation("camera.z_offset must be finite"));
        }
        validate_range("camera.pitch_range", self.pitch_range)?;
        if let Some(rate) = self.max_yaw_rate
            && (!rate.is_finite() || rate <= 0.0)
        {
            return Err(NavTrackError::validation(
                "camera.max_yaw_rate must be finite and > 0",
            ));
        }
        if !self.max_pitch_rate.is_finite() || self.max_pitch_rate <= 0.0 {
            return Err(NavTrackError::validation(
                "camera.max_pitch_rate must be finite and > 0",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Connectivity analysis settings.
pub struct AnalyzerConfig {
    /// Region size to aim for; derived from the scene area when absent.
    pub target_sample_count: Option<usize>,
    /// Points per square metre used when deriving the target.
    pub sample_density: f64,
    /// Nearest seeds path-tested per seed.
    pub k_nearest: usize,
    /// Lower clamp for the seed sampling radius.
    pub min_global_radius: f64,
    /// Upper clamp for the seed sampling radius.
    pub max_global_radius: f64,
    /// Reachable-cloud radius as a fraction of the global radius.
    pub reachable_radius_factor: f64,
    /// Lower clamp for the cloud radius.
    pub min_reachable_radius: f64,
    /// Upper clamp for the cloud radius.
    pub max_reachable_radius: f64,
    /// Minimum seed spacing as a fraction of the cloud radius.
    pub min_seed_separation_factor: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            target_sample_count: None,
            sample_density: 1.0,
            k_nearest: 8,
            min_global_radius: 1000.0,
            max_global_radius: 10_000.0,
            reachable_radius_factor: 0.35,
            min_reachable_radius: 300.0,
            max_reachable_radius: 3000.0,
            min_seed_separation_factor: 0.5,
        }
    }
}

impl AnalyzerConfig {
    /// Validate radii and sampling parameters.
    pub fn validate(&self) -> NavTrackResult<()> {
        if self.target_sample_count == Some(0) {
            return Err(NavTrackError::validation(
                "analyzer.target_sample_count must be > 0",
            ));
        }
        if self.k_nearest == 0 {
            return Err(NavTrackError::validation("analyzer.k_nearest must be > 0"));
        }
        for (name, v) in [
            ("sample_density", self.sample_density),
            ("min_global_radius", self.min_global_radius),
            ("max_global_radius", self.max_global_radius),
            ("reachable_radius_factor", self.reachable_radius_factor),
            ("min_reachable_radius", self.min_reachable_radius),
            ("max_reachable_radius", self.max_reachable_radius),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(NavTrackError::validation(format!(
                    "analyzer.{name} must be finite and > 0"
                )));
            }
        }
        if !self.min_seed_separation_factor.is_finite() || self.min_seed_separation_factor < 0.0 {
            return Err(NavTrackError::validation(
                "analyzer.min_seed_separation_factor must be finite and >= 0",
            ));
        }
        if self.min_global_radius > self.max_global_radius
            || self.min_reachable_radius > self.max_reachable_radius
        {
            return Err(NavTrackError::validation(
                "analyzer radius clamps must have min <= max",
            ));
        }
        Ok(())
    }
}

fn validate_range(name: &str, [lo, hi]: [f64; 2]) -> NavTrackResult<()> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(NavTrackError::validation(format!(
            "{name} must be finite with min <= max"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
