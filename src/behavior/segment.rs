use std::collections::BTreeMap;

use crate::{
    behavior::kind::BehaviorKind,
    foundation::core::{Point3, Pose},
    foundation::error::BehaviorFailure,
    foundation::math::lerp,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Output of one behavior: parallel sample arrays over the frame span `[start_frame, end_frame]`.
///
/// Dense kinds (roam, translate) hold one sample per frame including both ends. Keyed kinds
/// (idle, rotate) hold at least two samples spread evenly over the span; values between them are
/// linear.
pub struct BehaviorSegment {
    /// Producing behavior.
    pub kind: BehaviorKind,
    /// Sample positions.
    pub points: Vec<Point3>,
    /// Sample yaws, degrees. Continuous within the segment.
    pub yaws: Vec<f64>,
    /// Sample pitches, degrees.
    pub pitches: Vec<f64>,
    /// First frame covered.
    pub start_frame: u64,
    /// Last frame covered; also the next segment's first frame.
    pub end_frame: u64,
    /// Free-form numeric diagnostics (distance, attempts, angle).
    #[serde(default)]
    pub metadata: BTreeMap<String, f64>,
}

impl BehaviorSegment {
    /// Frames spanned.
    pub fn frames(&self) -> u64 {
        self.end_frame.saturating_sub(self.start_frame)
    }

    /// Check array alignment, sample counts and finiteness.
    pub fn validate(&self) -> Result<(), BehaviorFailure> {
        let n = self.points.len();
        if self.yaws.len() != n || self.pitches.len() != n {
            return Err(BehaviorFailure::InvalidSegment(format!(
                "{} arrays disagree: {} points, {} yaws, {} pitches",
                self.kind,
                n,
                self.yaws.len(),
                self.pitches.len()
            )));
        }
        if self.end_frame <= self.start_frame {
            return Err(BehaviorFailure::InvalidSegment(format!(
                "{} spans no frames ({}..{})",
                self.kind, self.start_frame, self.end_frame
            )));
        }
        let span_samples = self.frames() + 1;
        let count_ok = if self.kind.is_dense() {
            n as u64 == span_samples
        } else {
            n >= 2 && n as u64 <= span_samples
        };
        if !count_ok {
            return Err(BehaviorFailure::InvalidSegment(format!(
                "{} has {n} samples for {} frames",
                self.kind,
                self.frames()
            )));
        }
        let finite = self.points.iter().all(|p| p.is_finite())
            && self.yaws.iter().all(|v| v.is_finite())
            && self.pitches.iter().all(|v| v.is_finite());
        if !finite {
            return Err(BehaviorFailure::InvalidSegment(format!(
                "{} has non-finite samples",
                self.kind
            )));
        }
        Ok(())
    }

    /// Pose at the last sample.
    pub fn last_pose(&self) -> Option<Pose> {
        Some(Pose {
            position: *self.points.last()?,
            yaw: *self.yaws.last()?,
            pitch: *self.pitches.last()?,
        })
    }

    /// Shorten the segment to `max_frames` frames. No-op when it already fits, when
    /// `max_frames` is zero, or on a segment with fewer than two samples.
    pub fn truncate(&mut self, max_frames: u64) {
        let frames = self.frames();
        if max_frames == 0 || frames <= max_frames || self.points.len() < 2 {
            return;
        }

        if self.kind.is_dense() {
            let keep = (max_frames + 1) as usize;
            self.points.truncate(keep);
            self.yaws.truncate(keep);
            self.pitches.truncate(keep);
        } else {
            let old_gaps = (self.points.len() - 1) as f64;
            let frac = max_frames as f64 / frames as f64;
            let count = ((old_gaps * frac).ceil() as usize + 1).clamp(2, max_frames as usize + 1);
            let mut points = Vec::with_capacity(count);
            let mut yaws = Vec::with_capacity(count);
            let mut pitches = Vec::with_capacity(count);
            for k in 0..count {
                let (p, y, pi) = self.sample_at(frac * k as f64 / (count - 1) as f64);
                points.push(p);
                yaws.push(y);
                pitches.push(pi);
            }
            self.points = points;
            self.yaws = yaws;
            self.pitches = pitches;
        }
        self.end_frame = self.start_frame + max_frames;
        self.metadata.insert("truncated_from_frames".to_string(), frames as f64);
    }

    /// Linear sample at fraction `t` of the span, treating samples as evenly spaced.
    fn sample_at(&self, t: f64) -> (Point3, f64, f64) {
        let last = self.points.len() - 1;
        let x = t.clamp(0.0, 1.0) * last as f64;
        let i = (x.floor() as usize).min(last - 1);
        let u = x - i as f64;
        (
            self.points[i].lerp(self.points[i + 1], u),
            lerp(self.yaws[i], self.yaws[i + 1], u),
            lerp(self.pitches[i], self.pitches[i + 1], u),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/behavior/segment.rs"]
mod tests;
