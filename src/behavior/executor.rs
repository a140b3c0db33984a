use rand::RngCore;

use crate::{
    behavior::kind::BehaviorKind,
    behavior::primitives::{self, BehaviorContext},
    behavior::segment::BehaviorSegment,
    config::BehaviorConfig,
    foundation::core::{Fps, Point3, Pose},
    foundation::error::BehaviorFailure,
    foundation::math::normalize_angle,
    nav::oracle::NavigationOracle,
    timeline::assembler::{Timeline, TimelineAssembler},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Why behavior execution ended.
pub enum StopReason {
    /// The frame budget was filled.
    Completed,
    /// Too many behaviors failed in a row; the timeline is partial.
    FailureBudgetExhausted,
}

#[derive(Clone, Debug)]
/// Result of one executor run.
pub struct ExecutionOutcome {
    /// Assembled segments.
    pub timeline: Timeline,
    /// Segments accepted.
    pub behavior_count: usize,
    /// Failed behavior attempts, across the whole run.
    pub failure_count: usize,
    /// Termination cause.
    pub stop: StopReason,
}

/// Runs randomly drawn behaviors until a frame budget is filled.
pub struct BehaviorExecutor<'a> {
    oracle: &'a dyn NavigationOracle,
    config: &'a BehaviorConfig,
    pitch_limits: [f64; 2],
    fps: Fps,
}

impl<'a> BehaviorExecutor<'a> {
    /// Executor over `oracle`. Rotations keep pitch inside `pitch_limits`.
    pub fn new(
        oracle: &'a dyn NavigationOracle,
        config: &'a BehaviorConfig,
        pitch_limits: [f64; 2],
        fps: Fps,
    ) -> Self {
        Self {
            oracle,
            config,
            pitch_limits,
            fps,
        }
    }

    /// Fill `target_frames` starting idle at `spawn` facing `initial_yaw`.
    ///
    /// Never fails: a run that exhausts its failure budget returns the segments accepted so far.
    #[tracing::instrument(skip(self, rng))]
    pub fn run(
        &self,
        spawn: Point3,
        initial_yaw: f64,
        target_frames: u64,
        rng: &mut dyn RngCore,
    ) -> ExecutionOutcome {
        let mut ctx = BehaviorContext {
            position: spawn,
            yaw: normalize_angle(initial_yaw),
            pitch: 0.0,
            frame: 0,
        };
        let mut assembler = TimelineAssembler::new(Pose {
            position: ctx.position,
            yaw: ctx.yaw,
            pitch: ctx.pitch,
        });

        let mut behavior_count = 0;
        let mut failure_count = 0;
        let mut consecutive = 0;
        let mut stop = StopReason::Completed;

        while ctx.frame < target_frames {
            let kind = self.config.weights.choose(rng);
            let remaining = target_frames - ctx.frame;

            let failure = match self.execute(kind, &ctx, remaining, rng) {
                Ok(mut segment) => {
                    let overshoot = segment.frames() > remaining;
                    if overshoot {
                        segment.truncate(remaining);
                    }
                    let mut next = ctx;
                    next.advance(&segment);
                    match assembler.push(segment) {
                        Ok(span) => {
                            tracing::debug!(
                                kind = %span.kind,
                                start_frame = span.start_frame,
                                end_frame = span.end_frame,
                                "behavior accepted"
                            );
                            ctx = next;
                            behavior_count += 1;
                            consecutive = 0;
                            if overshoot {
                                tracing::debug!(kind = %kind, "truncated to fill frame budget");
                                break;
                            }
                            continue;
                        }
                        Err(err) => BehaviorFailure::InvalidSegment(err.to_string()),
                    }
                }
                Err(failure) => failure,
            };

            failure_count += 1;
            consecutive += 1;
            tracing::warn!(
                kind = %kind,
                reason = %failure,
                consecutive,
                limit = self.config.max_consecutive_failures,
                "behavior failed"
            );
            if consecutive >= self.config.max_consecutive_failures {
                tracing::error!(
                    frame = ctx.frame,
                    target_frames,
                    "too many consecutive behavior failures, stopping with a partial timeline"
                );
                stop = StopReason::FailureBudgetExhausted;
                break;
            }
        }

        tracing::info!(
            behavior_count,
            failure_count,
            frames = ctx.frame,
            target_frames,
            ?stop,
            "behavior execution finished"
        );
        ExecutionOutcome {
            timeline: assembler.finish(),
            behavior_count,
            failure_count,
            stop,
        }
    }

    fn execute(
        &self,
        kind: BehaviorKind,
        ctx: &BehaviorContext,
        remaining_frames: u64,
        rng: &mut dyn RngCore,
    ) -> Result<BehaviorSegment, BehaviorFailure> {
        let segment = match kind {
            BehaviorKind::Roam => {
                primitives::roam(self.oracle, ctx, self.config, self.fps, rng)?
            }
            BehaviorKind::TranslateForward
            | BehaviorKind::TranslateBackward
            | BehaviorKind::TranslateLeft
            | BehaviorKind::TranslateRight => {
                primitives::translate(self.oracle, ctx, kind, self.config, self.fps)?
            }
            BehaviorKind::Idle => primitives::idle(ctx, self.config, self.fps, remaining_frames)?,
            BehaviorKind::RotateYaw | BehaviorKind::RotatePitch => primitives::rotate(
                ctx,
                kind,
                self.config,
                self.pitch_limits,
                self.fps,
                rng,
            )?,
        };
        segment.validate()?;
        Ok(segment)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/behavior/executor.rs"]
mod tests;
