//! Movement primitives. Each one turns the current pose into a single [`BehaviorSegment`]
//! starting at the context's frame, or reports why it could not.

use std::collections::BTreeMap;

use rand::{Rng as _, RngCore};

use crate::{
    behavior::kind::BehaviorKind,
    behavior::segment::BehaviorSegment,
    config::BehaviorConfig,
    foundation::core::{Fps, Point3},
    foundation::error::BehaviorFailure,
    foundation::math::{lerp, normalize_angle, path_length, resample_by_count, yaw_between},
    nav::oracle::NavigationOracle,
};

#[derive(Clone, Copy, Debug, PartialEq)]
/// State carried from one behavior to the next.
pub struct BehaviorContext {
    /// Current camera position.
    pub position: Point3,
    /// Current yaw, normalized to (-180, 180].
    pub yaw: f64,
    /// Current pitch.
    pub pitch: f64,
    /// Frames consumed so far; the next segment starts here.
    pub frame: u64,
}

impl BehaviorContext {
    /// Move the context to the end of an accepted segment.
    pub fn advance(&mut self, segment: &BehaviorSegment) {
        if let Some(pose) = segment.last_pose() {
            self.position = pose.position;
            self.yaw = normalize_angle(pose.yaw);
            self.pitch = pose.pitch;
        }
        self.frame = segment.end_frame;
    }
}

/// Follow a navigation path to a random reachable destination.
pub fn roam(
    oracle: &dyn NavigationOracle,
    ctx: &BehaviorContext,
    cfg: &BehaviorConfig,
    fps: Fps,
    rng: &mut dyn RngCore,
) -> Result<BehaviorSegment, BehaviorFailure> {
    let tries = cfg.max_random_point_tries;
    let mut path_misses = 0u32;
    let mut zero_length = false;

    for attempt in 1..=tries {
        let Some(candidate) = oracle.random_reachable_point(ctx.position, cfg.roam_radius, rng)
        else {
            continue;
        };
        if ctx.position.distance(candidate) < cfg.min_leg_distance {
            continue;
        }
        let target = if cfg.project_roam_targets {
            oracle.project_to_surface(candidate)
        } else {
            candidate
        };

        let path = oracle.find_path(ctx.position, target);
        if path.len() < 2 {
            path_misses += 1;
            tracing::debug!(attempt, target = %target, "roam: no path");
            continue;
        }

        let length = path_length(&path);
        let frames = fps.secs_to_frames_round(length / cfg.speed);
        if frames == 0 {
            zero_length = true;
            continue;
        }

        let points = resample_by_count(&path, frames as usize + 1);
        let yaws = tangent_yaws(&points, ctx.yaw);
        let n = points.len();
        return Ok(BehaviorSegment {
            kind: BehaviorKind::Roam,
            points,
            yaws,
            pitches: vec![ctx.pitch; n],
            start_frame: ctx.frame,
            end_frame: ctx.frame + frames,
            metadata: BTreeMap::from([
                ("distance".to_string(), length),
                ("attempts".to_string(), f64::from(attempt)),
            ]),
        });
    }

    Err(if path_misses > 0 {
        BehaviorFailure::PathNotFound { tries }
    } else if zero_length {
        BehaviorFailure::ZeroDuration
    } else {
        BehaviorFailure::NoCandidate { tries }
    })
}

/// Per-sample heading from the local tangent; degenerate steps hold the previous heading and the
/// last sample repeats the one before it.
fn tangent_yaws(points: &[Point3], initial: f64) -> Vec<f64> {
    let mut yaws = Vec::with_capacity(points.len());
    let mut prev = initial;
    for w in points.windows(2) {
        if let Some(y) = yaw_between(w[0], w[1]) {
            prev = normalize_angle(y);
        }
        yaws.push(prev);
    }
    if !points.is_empty() {
        yaws.push(prev);
    }
    yaws
}

/// Straight move relative to the current heading, stopped short of the first obstacle.
pub fn translate(
    oracle: &dyn NavigationOracle,
    ctx: &BehaviorContext,
    kind: BehaviorKind,
    cfg: &BehaviorConfig,
    fps: Fps,
) -> Result<BehaviorSegment, BehaviorFailure> {
    let offset = kind.translate_heading_offset().ok_or_else(|| {
        BehaviorFailure::InvalidSegment(format!("{kind} is not a translation"))
    })?;
    let heading = (ctx.yaw + offset).to_radians();
    let dir = Point3::new(heading.cos(), heading.sin(), 0.0);
    let start = ctx.position;
    let far = start + dir * cfg.max_translate_distance;

    let clear = match oracle.raycast(start, far) {
        Some(hit) => start.distance_xy(hit) - cfg.translate_safety_margin,
        None => cfg.max_translate_distance,
    };
    if clear < cfg.min_translate_distance {
        return Err(BehaviorFailure::ObstacleTooClose {
            clear,
            min: cfg.min_translate_distance,
        });
    }

    let end = oracle.project_to_surface(start + dir * clear);
    let frames = fps.secs_to_frames_round(clear / cfg.speed);
    if frames == 0 {
        return Err(BehaviorFailure::ZeroDuration);
    }

    let points: Vec<Point3> = (0..=frames)
        .map(|i| start.lerp(end, i as f64 / frames as f64))
        .collect();
    let n = points.len();
    Ok(BehaviorSegment {
        kind,
        points,
        yaws: vec![ctx.yaw; n],
        pitches: vec![ctx.pitch; n],
        start_frame: ctx.frame,
        end_frame: ctx.frame + frames,
        metadata: BTreeMap::from([("distance".to_string(), start.distance(end))]),
    })
}

/// Hold the current pose for `max(min_idle, min(remaining, max_idle))` seconds.
pub fn idle(
    ctx: &BehaviorContext,
    cfg: &BehaviorConfig,
    fps: Fps,
    remaining_frames: u64,
) -> Result<BehaviorSegment, BehaviorFailure> {
    let remaining_secs = fps.frames_to_secs(remaining_frames);
    let secs = remaining_secs.min(cfg.max_idle_secs).max(cfg.min_idle_secs);
    let frames = fps.secs_to_frames_round(secs);
    if frames == 0 {
        return Err(BehaviorFailure::ZeroDuration);
    }

    let n = keyed_sample_count(frames, cfg.idle_key_interval);
    Ok(BehaviorSegment {
        kind: BehaviorKind::Idle,
        points: vec![ctx.position; n],
        yaws: vec![ctx.yaw; n],
        pitches: vec![ctx.pitch; n],
        start_frame: ctx.frame,
        end_frame: ctx.frame + frames,
        metadata: BTreeMap::from([("seconds".to_string(), secs)]),
    })
}

/// Turn in place by a random angle. Pitch targets are kept inside `pitch_limits`.
pub fn rotate(
    ctx: &BehaviorContext,
    kind: BehaviorKind,
    cfg: &BehaviorConfig,
    pitch_limits: [f64; 2],
    fps: Fps,
    rng: &mut dyn RngCore,
) -> Result<BehaviorSegment, BehaviorFailure> {
    let (range, from) = match kind {
        BehaviorKind::RotateYaw => (cfg.yaw_rotate_range, ctx.yaw),
        BehaviorKind::RotatePitch => (cfg.pitch_rotate_range, ctx.pitch),
        other => {
            return Err(BehaviorFailure::InvalidSegment(format!(
                "{other} is not a rotation"
            )));
        }
    };
    let drawn = rng.gen_range(range[0]..=range[1]);
    let to = match kind {
        BehaviorKind::RotatePitch => (from + drawn).clamp(pitch_limits[0], pitch_limits[1]),
        _ => from + drawn,
    };
    let angle = to - from;

    let frames = fps.secs_to_frames_round(angle.abs() / cfg.rotate_speed);
    if frames == 0 {
        return Err(BehaviorFailure::ZeroDuration);
    }

    let n = keyed_sample_count(frames, cfg.rotate_key_interval);
    let ramp: Vec<f64> = (0..n)
        .map(|k| lerp(from, to, k as f64 / (n - 1) as f64))
        .collect();
    let (yaws, pitches) = match kind {
        BehaviorKind::RotatePitch => (vec![ctx.yaw; n], ramp),
        _ => (ramp, vec![ctx.pitch; n]),
    };
    Ok(BehaviorSegment {
        kind,
        points: vec![ctx.position; n],
        yaws,
        pitches,
        start_frame: ctx.frame,
        end_frame: ctx.frame + frames,
        metadata: BTreeMap::from([("angle".to_string(), angle)]),
    })
}

/// One key every `interval` frames plus the closing key; at least two.
fn keyed_sample_count(frames: u64, interval: u32) -> usize {
    let keys = frames / u64::from(interval.max(1)) + 1;
    keys.clamp(2, frames + 1) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/behavior/primitives.rs"]
mod tests;
