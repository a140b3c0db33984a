use crate::{
    behavior::kind::BehaviorKind,
    behavior::segment::BehaviorSegment,
    foundation::core::{Point3, Pose},
    foundation::error::{NavTrackError, NavTrackResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Where one behavior's samples sit in the flattened arrays and on the frame axis.
pub struct SegmentSpan {
    /// Producing behavior.
    pub kind: BehaviorKind,
    /// Index of the first sample.
    pub start_idx: usize,
    /// Index of the last sample (inclusive).
    pub end_idx: usize,
    /// First frame covered.
    pub start_frame: u64,
    /// Last frame covered; equals the next span's `start_frame`.
    pub end_frame: u64,
}

impl SegmentSpan {
    /// Frames spanned.
    pub fn frames(&self) -> u64 {
        self.end_frame - self.start_frame
    }

    /// Position of `frame` within the span in `[0, 1]`.
    pub fn fraction(&self, frame: u64) -> f64 {
        let frames = self.frames();
        if frames == 0 {
            return 0.0;
        }
        (frame.saturating_sub(self.start_frame) as f64 / frames as f64).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Accepted segments flattened into parallel arrays, plus their spans.
pub struct Timeline {
    /// Pose before the first segment; used when the timeline is empty.
    pub origin: Pose,
    /// All sample positions.
    pub points: Vec<Point3>,
    /// All sample yaws.
    pub yaws: Vec<f64>,
    /// All sample pitches.
    pub pitches: Vec<f64>,
    /// One span per accepted segment, in order.
    pub spans: Vec<SegmentSpan>,
}

impl Timeline {
    /// Frames covered by the spans.
    pub fn total_frames(&self) -> u64 {
        self.spans.last().map(|s| s.end_frame).unwrap_or(0)
    }

    /// True when no segment was accepted.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Whether any span was produced by `kind`.
    pub fn contains_kind(&self, kind: BehaviorKind) -> bool {
        self.spans.iter().any(|s| s.kind == kind)
    }

    /// Last span with `start_frame <= frame <= end_frame`.
    pub fn covering_span(&self, frame: u64) -> Option<&SegmentSpan> {
        let after = self.spans.partition_point(|s| s.start_frame <= frame);
        let span = self.spans.get(after.checked_sub(1)?)?;
        (frame <= span.end_frame).then_some(span)
    }

    /// Check that spans start at frame 0 and chain end-to-start.
    pub fn validate(&self) -> NavTrackResult<()> {
        let n = self.points.len();
        if self.yaws.len() != n || self.pitches.len() != n {
            return Err(NavTrackError::validation("timeline arrays disagree in length"));
        }
        let mut expected = 0;
        for (i, span) in self.spans.iter().enumerate() {
            if span.start_frame != expected {
                return Err(NavTrackError::validation(format!(
                    "span {i} starts at frame {}, expected {expected}",
                    span.start_frame
                )));
            }
            if span.end_idx >= n || span.start_idx > span.end_idx {
                return Err(NavTrackError::validation(format!(
                    "span {i} indexes {}..={} outside {n} samples",
                    span.start_idx, span.end_idx
                )));
            }
            expected = span.end_frame;
        }
        Ok(())
    }
}

#[derive(Debug)]
/// Appends segments to a [`Timeline`], enforcing contiguity.
pub struct TimelineAssembler {
    timeline: Timeline,
}

impl TimelineAssembler {
    /// Start an empty timeline at `origin`.
    pub fn new(origin: Pose) -> Self {
        Self {
            timeline: Timeline {
                origin,
                ..Timeline::default()
            },
        }
    }

    /// Frame the next segment must start at.
    pub fn next_frame(&self) -> u64 {
        self.timeline.total_frames()
    }

    /// Append `segment`. It must be valid and start where the timeline currently ends.
    pub fn push(&mut self, segment: BehaviorSegment) -> NavTrackResult<&SegmentSpan> {
        segment
            .validate()
            .map_err(|e| NavTrackError::validation(e.to_string()))?;
        let expected = self.next_frame();
        if segment.start_frame != expected {
            return Err(NavTrackError::validation(format!(
                "{} segment starts at frame {}, timeline ends at {expected}",
                segment.kind, segment.start_frame
            )));
        }

        let tl = &mut self.timeline;
        let start_idx = tl.points.len();
        let end_idx = start_idx + segment.points.len() - 1;
        tl.points.extend(segment.points);
        tl.yaws.extend(segment.yaws);
        tl.pitches.extend(segment.pitches);
        tl.spans.push(SegmentSpan {
            kind: segment.kind,
            start_idx,
            end_idx,
            start_frame: segment.start_frame,
            end_frame: segment.end_frame,
        });
        Ok(&tl.spans[tl.spans.len() - 1])
    }

    /// Finish and hand out the timeline.
    pub fn finish(self) -> Timeline {
        self.timeline
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/assembler.rs"]
mod tests;
