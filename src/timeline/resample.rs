use crate::{
    behavior::kind::BehaviorKind,
    config::CameraConfig,
    foundation::core::{Fps, Orientation, Point3},
    foundation::math::{cumulative_lengths, lerp, lerp_angle, locate_on_arc, pitch_from_slope},
    timeline::assembler::{SegmentSpan, Timeline},
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One timestamped camera pose of the output track.
pub struct Keyframe {
    /// Seconds from track start.
    pub time_seconds: f64,
    /// Camera position.
    pub position: Point3,
    /// Camera rotation.
    pub rotation: Orientation,
}

/// Sample `timeline` every `camera.key_interval_frames` frames over `[0, total_frames]`.
///
/// Pure: the same inputs always give the same keyframes.
pub fn resample(
    timeline: &Timeline,
    fps: Fps,
    total_frames: u64,
    camera: &CameraConfig,
) -> Vec<Keyframe> {
    let interval = u64::from(camera.key_interval_frames.max(1));
    let key_count = total_frames / interval + 1;

    (0..key_count)
        .map(|i| {
            let frame = (i * interval).min(total_frames);
            let (position, yaw, pitch) = match timeline.covering_span(frame) {
                Some(span) => sample_span(timeline, span, frame, camera),
                None => nearest_sample(timeline, frame),
            };
            Keyframe {
                time_seconds: fps.frames_to_secs(frame),
                position: position.raised(camera.z_offset),
                rotation: Orientation::new(yaw, pitch),
            }
        })
        .collect()
}

fn sample_span(
    tl: &Timeline,
    span: &SegmentSpan,
    frame: u64,
    camera: &CameraConfig,
) -> (Point3, f64, f64) {
    let (s, e) = (span.start_idx, span.end_idx);
    let t = span.fraction(frame);

    match span.kind {
        BehaviorKind::Idle => (tl.points[s], tl.yaws[s], tl.pitches[s]),
        BehaviorKind::RotateYaw | BehaviorKind::RotatePitch => (
            tl.points[s],
            lerp(tl.yaws[s], tl.yaws[e], t),
            lerp(tl.pitches[s], tl.pitches[e], t),
        ),
        BehaviorKind::TranslateForward
        | BehaviorKind::TranslateBackward
        | BehaviorKind::TranslateLeft
        | BehaviorKind::TranslateRight => {
            (tl.points[s].lerp(tl.points[e], t), tl.yaws[s], tl.pitches[s])
        }
        BehaviorKind::Roam => {
            let pts = &tl.points[s..=e];
            if pts.len() < 2 {
                return (tl.points[s], tl.yaws[s], tl.pitches[s]);
            }
            let cumulative = cumulative_lengths(pts);
            let total = cumulative[cumulative.len() - 1];
            let (i, u) = locate_on_arc(&cumulative, t * total);
            let (a, b) = (pts[i], pts[i + 1]);
            let yaw = lerp_angle(tl.yaws[s + i], tl.yaws[s + i + 1], u);
            let pitch = if camera.pitch_from_slope {
                let [lo, hi] = camera.pitch_range;
                pitch_from_slope(a, b, lo, hi).unwrap_or(tl.pitches[s])
            } else {
                tl.pitches[s]
            };
            (a.lerp(b, u), yaw, pitch)
        }
    }
}

/// Fallback for frames no span covers.
fn nearest_sample(tl: &Timeline, frame: u64) -> (Point3, f64, f64) {
    if tl.points.is_empty() {
        return (tl.origin.position, tl.origin.yaw, tl.origin.pitch);
    }
    let i = usize::try_from(frame)
        .unwrap_or(usize::MAX)
        .min(tl.points.len() - 1);
    (tl.points[i], tl.yaws[i], tl.pitches[i])
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resample.rs"]
mod tests;
