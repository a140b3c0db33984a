use crate::{
    config::CameraConfig, foundation::math::unwrap_angles, timeline::resample::Keyframe,
};

const MIN_DT_SECS: f64 = 1e-3;

/// Post-process keyframe rotations in place.
///
/// Yaw is unwrapped into a continuous series and optionally rate-limited. With `keep_pitch`,
/// pitch is rate-limited and clamped to `camera.pitch_range`; otherwise it is zeroed. Roll is
/// always zeroed.
pub fn sanitize(keyframes: &mut [Keyframe], camera: &CameraConfig, keep_pitch: bool) {
    if keyframes.is_empty() {
        return;
    }
    let times: Vec<f64> = keyframes.iter().map(|k| k.time_seconds).collect();

    let raw_yaws: Vec<f64> = keyframes.iter().map(|k| k.rotation.yaw).collect();
    let mut yaws = unwrap_angles(&raw_yaws);
    if let Some(rate) = camera.max_yaw_rate {
        rate_limit(&mut yaws, &times, rate);
    }

    let pitches = if keep_pitch {
        let mut p: Vec<f64> = keyframes.iter().map(|k| k.rotation.pitch).collect();
        rate_limit(&mut p, &times, camera.max_pitch_rate);
        let [lo, hi] = camera.pitch_range;
        p.iter_mut().for_each(|v| *v = v.clamp(lo, hi));
        p
    } else {
        vec![0.0; keyframes.len()]
    };

    for ((key, yaw), pitch) in keyframes.iter_mut().zip(yaws).zip(pitches) {
        key.rotation.yaw = yaw;
        key.rotation.pitch = pitch;
        key.rotation.roll = 0.0;
    }

    tracing::debug!(
        keys = keyframes.len(),
        max_yaw_rate = ?camera.max_yaw_rate,
        keep_pitch,
        "rotations sanitized"
    );
}

/// Clamp each step to `rate * dt`, walking forward from the first value.
fn rate_limit(values: &mut [f64], times: &[f64], rate: f64) {
    for i in 1..values.len() {
        let dt = (times[i] - times[i - 1]).max(MIN_DT_SECS);
        let max_delta = rate * dt;
        let delta = (values[i] - values[i - 1]).clamp(-max_delta, max_delta);
        values[i] = values[i - 1] + delta;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/sanitize.rs"]
mod tests;
