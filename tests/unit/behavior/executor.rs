use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

use super::*;
use crate::{behavior::kind::BehaviorWeights, foundation::core::SceneBounds};

/// Unbounded flat floor; `blocked` turns every query into a miss.
struct Floor {
    blocked: bool,
}

impl NavigationOracle for Floor {
    fn random_navigable_point(
        &self,
        origin: Point3,
        radius: f64,
        rng: &mut dyn RngCore,
    ) -> Option<Point3> {
        self.random_reachable_point(origin, radius, rng)
    }

    fn random_reachable_point(
        &self,
        origin: Point3,
        radius: f64,
        rng: &mut dyn RngCore,
    ) -> Option<Point3> {
        if self.blocked {
            return None;
        }
        let dx = rng.gen_range(-radius..=radius);
        let dy = rng.gen_range(-radius..=radius);
        Some(Point3::new(origin.x + dx, origin.y + dy, origin.z))
    }

    fn find_path(&self, start: Point3, end: Point3) -> Vec<Point3> {
        if self.blocked {
            Vec::new()
        } else {
            vec![start, end]
        }
    }

    fn raycast(&self, start: Point3, _end: Point3) -> Option<Point3> {
        self.blocked.then_some(start)
    }

    fn scene_bounds(&self) -> Option<SceneBounds> {
        None
    }
}

fn fps() -> Fps {
    Fps::new(30, 1).unwrap()
}

fn moving_only() -> BehaviorConfig {
    BehaviorConfig {
        weights: BehaviorWeights {
            idle: 0.0,
            rotate_yaw: 0.0,
            rotate_pitch: 0.0,
            ..BehaviorWeights::default()
        },
        ..BehaviorConfig::default()
    }
}

#[test]
fn fills_the_frame_budget_exactly() {
    let floor = Floor { blocked: false };
    let cfg = BehaviorConfig::default();
    let exec = BehaviorExecutor::new(&floor, &cfg, [-20.0, 20.0], fps());
    let mut rng = StdRng::seed_from_u64(21);
    let out = exec.run(Point3::ZERO, 0.0, 600, &mut rng);

    assert_eq!(out.stop, StopReason::Completed);
    assert_eq!(out.timeline.total_frames(), 600);
    assert_eq!(out.behavior_count, out.timeline.spans.len());
    out.timeline.validate().unwrap();
    assert_eq!(out.timeline.spans[0].start_frame, 0);
    for w in out.timeline.spans.windows(2) {
        assert_eq!(w[0].end_frame, w[1].start_frame);
    }
    assert_eq!(out.timeline.points[0], Point3::ZERO);
}

#[test]
fn blocked_surface_exhausts_failure_budget() {
    let floor = Floor { blocked: true };
    let cfg = moving_only();
    let exec = BehaviorExecutor::new(&floor, &cfg, [-20.0, 20.0], fps());
    let mut rng = StdRng::seed_from_u64(1);
    let out = exec.run(Point3::ZERO, 0.0, 300, &mut rng);

    assert_eq!(out.stop, StopReason::FailureBudgetExhausted);
    assert_eq!(out.failure_count, 5);
    assert!(out.timeline.is_empty());
}

#[test]
fn zero_budget_runs_nothing() {
    let floor = Floor { blocked: false };
    let cfg = BehaviorConfig::default();
    let exec = BehaviorExecutor::new(&floor, &cfg, [-20.0, 20.0], fps());
    let mut rng = StdRng::seed_from_u64(1);
    let out = exec.run(Point3::new(1.0, 2.0, 3.0), 200.0, 0, &mut rng);

    assert_eq!(out.stop, StopReason::Completed);
    assert!(out.timeline.is_empty());
    assert_eq!(out.timeline.origin.position, Point3::new(1.0, 2.0, 3.0));
    assert!((out.timeline.origin.yaw - (-160.0)).abs() < 1e-9);
}

#[test]
fn equal_seeds_give_equal_timelines() {
    let floor = Floor { blocked: false };
    let cfg = BehaviorConfig::default();
    let exec = BehaviorExecutor::new(&floor, &cfg, [-20.0, 20.0], fps());
    let a = exec.run(Point3::ZERO, 0.0, 450, &mut StdRng::seed_from_u64(99));
    let b = exec.run(Point3::ZERO, 0.0, 450, &mut StdRng::seed_from_u64(99));
    assert_eq!(a.timeline, b.timeline);
    assert_eq!(a.behavior_count, b.behavior_count);
}

#[test]
fn last_segment_is_truncated_to_budget() {
    let floor = Floor { blocked: false };
    let cfg = BehaviorConfig {
        weights: BehaviorWeights {
            roam: 0.0,
            translate_forward: 1.0,
            translate_backward: 0.0,
            translate_left: 0.0,
            translate_right: 0.0,
            idle: 0.0,
            rotate_yaw: 0.0,
            rotate_pitch: 0.0,
        },
        ..BehaviorConfig::default()
    };
    let exec = BehaviorExecutor::new(&floor, &cfg, [-20.0, 20.0], fps());
    let out = exec.run(Point3::ZERO, 0.0, 250, &mut StdRng::seed_from_u64(3));

    // Each forward move is 100 frames: 100 + 100 + 50.
    let frames: Vec<u64> = out.timeline.spans.iter().map(|s| s.frames()).collect();
    assert_eq!(frames, vec![100, 100, 50]);
    let end = *out.timeline.points.last().unwrap();
    assert!((end.x - 1250.0).abs() < 1e-6);
}
