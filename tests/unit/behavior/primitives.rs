use rand::{SeedableRng as _, rngs::StdRng};

use super::*;
use crate::foundation::core::SceneBounds;

/// Flat unbounded floor with an optional wall along `x = wall_x`.
struct Floor {
    wall_x: Option<f64>,
    reach: f64,
    paths: bool,
}

impl Floor {
    fn open() -> Self {
        Self {
            wall_x: None,
            reach: f64::INFINITY,
            paths: true,
        }
    }
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
        let r = radius.min(self.reach) * rng.gen_range(0.0f64..=1.0).sqrt();
        let a = rng.gen_range(0.0..std::f64::consts::TAU);
        Some(Point3::new(origin.x + r * a.cos(), origin.y + r * a.sin(), origin.z))
    }

    fn find_path(&self, start: Point3, end: Point3) -> Vec<Point3> {
        if self.paths { vec![start, end] } else { Vec::new() }
    }

    fn raycast(&self, start: Point3, end: Point3) -> Option<Point3> {
        let wall = self.wall_x?;
        if (start.x - wall) * (end.x - wall) > 0.0 || end.x == start.x {
            return None;
        }
        let t = (wall - start.x) / (end.x - start.x);
        Some(start.lerp(end, t))
    }

    fn scene_bounds(&self) -> Option<SceneBounds> {
        None
    }
}

fn ctx() -> BehaviorContext {
    BehaviorContext {
        position: Point3::ZERO,
        yaw: 0.0,
        pitch: 0.0,
        frame: 40,
    }
}

fn fps() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn translate_fails_when_obstacle_is_too_close() {
    let floor = Floor {
        wall_x: Some(30.0),
        ..Floor::open()
    };
    let cfg = BehaviorConfig::default();
    let err = translate(&floor, &ctx(), BehaviorKind::TranslateForward, &cfg, fps()).unwrap_err();
    match err {
        BehaviorFailure::ObstacleTooClose { clear, min } => {
            assert!((clear - 10.0).abs() < 1e-9);
            assert_eq!(min, 50.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn translate_stops_short_of_wall() {
    let floor = Floor {
        wall_x: Some(300.0),
        ..Floor::open()
    };
    let cfg = BehaviorConfig::default();
    let seg = translate(&floor, &ctx(), BehaviorKind::TranslateForward, &cfg, fps()).unwrap();
    seg.validate().unwrap();
    let end = *seg.points.last().unwrap();
    assert!((end.x - 280.0).abs() < 1e-9);
    assert_eq!(seg.frames(), 56);
}

#[test]
fn translate_uses_full_reach_when_clear() {
    let cfg = BehaviorConfig::default();
    let seg = translate(&Floor::open(), &ctx(), BehaviorKind::TranslateForward, &cfg, fps()).unwrap();
    seg.validate().unwrap();
    assert_eq!(seg.start_frame, 40);
    assert_eq!(seg.frames(), 100);
    assert_eq!(seg.points.len(), 101);
    assert!((seg.points[100].x - 500.0).abs() < 1e-9);
    assert!(seg.yaws.iter().all(|y| *y == 0.0));
}

#[test]
fn translate_directions_follow_heading() {
    let cfg = BehaviorConfig::default();
    let floor = Floor::open();
    let left = translate(&floor, &ctx(), BehaviorKind::TranslateLeft, &cfg, fps()).unwrap();
    let end = *left.points.last().unwrap();
    assert!(end.x.abs() < 1e-6 && (end.y - 500.0).abs() < 1e-6);

    let back = translate(&floor, &ctx(), BehaviorKind::TranslateBackward, &cfg, fps()).unwrap();
    assert!((back.points.last().unwrap().x + 500.0).abs() < 1e-6);

    let right = translate(&floor, &ctx(), BehaviorKind::TranslateRight, &cfg, fps()).unwrap();
    assert!((right.points.last().unwrap().y + 500.0).abs() < 1e-6);
}

#[test]
fn translate_rejects_non_translate_kind() {
    let cfg = BehaviorConfig::default();
    assert!(matches!(
        translate(&Floor::open(), &ctx(), BehaviorKind::Idle, &cfg, fps()),
        Err(BehaviorFailure::InvalidSegment(_))
    ));
}

#[test]
fn roam_emits_one_sample_per_frame() {
    let cfg = BehaviorConfig::default();
    let mut rng = StdRng::seed_from_u64(4);
    let seg = roam(&Floor::open(), &ctx(), &cfg, fps(), &mut rng).unwrap();
    seg.validate().unwrap();
    assert_eq!(seg.points[0], Point3::ZERO);
    let dist = seg.metadata["distance"];
    assert!(dist >= cfg.min_leg_distance);
    assert_eq!(seg.frames(), (dist / cfg.speed * 30.0).round() as u64);

    let end = *seg.points.last().unwrap();
    let heading = end.y.atan2(end.x).to_degrees();
    assert!(seg.yaws.iter().all(|y| (y - heading).abs() < 1e-6));
}

#[test]
fn roam_without_paths_reports_path_not_found() {
    let floor = Floor {
        paths: false,
        ..Floor::open()
    };
    let cfg = BehaviorConfig::default();
    let mut rng = StdRng::seed_from_u64(4);
    assert_eq!(
        roam(&floor, &ctx(), &cfg, fps(), &mut rng).unwrap_err(),
        BehaviorFailure::PathNotFound { tries: 20 }
    );
}

#[test]
fn roam_with_only_near_points_reports_no_candidate() {
    let floor = Floor {
        reach: 100.0,
        ..Floor::open()
    };
    let cfg = BehaviorConfig::default();
    let mut rng = StdRng::seed_from_u64(4);
    assert_eq!(
        roam(&floor, &ctx(), &cfg, fps(), &mut rng).unwrap_err(),
        BehaviorFailure::NoCandidate { tries: 20 }
    );
}

#[test]
fn idle_duration_is_bounded() {
    let cfg = BehaviorConfig::default();
    let long = idle(&ctx(), &cfg, fps(), 3000).unwrap();
    long.validate().unwrap();
    assert_eq!(long.frames(), 90);
    assert_eq!(long.points.len(), 4);

    let short = idle(&ctx(), &cfg, fps(), 10).unwrap();
    assert_eq!(short.frames(), 30);
    assert_eq!(short.points.len(), 2);
}

#[test]
fn rotate_yaw_ramps_from_current_heading() {
    let cfg = BehaviorConfig {
        yaw_rotate_range: [45.0, 45.0],
        ..BehaviorConfig::default()
    };
    let start = BehaviorContext {
        yaw: 170.0,
        ..ctx()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let seg = rotate(&start, BehaviorKind::RotateYaw, &cfg, [-20.0, 20.0], fps(), &mut rng).unwrap();
    seg.validate().unwrap();
    assert_eq!(seg.frames(), 45);
    assert_eq!(seg.points.len(), 4);
    assert_eq!(seg.yaws[0], 170.0);
    assert!((seg.yaws[3] - 215.0).abs() < 1e-9);
    assert!(seg.pitches.iter().all(|p| *p == 0.0));
}

#[test]
fn rotate_pitch_target_is_clamped() {
    let cfg = BehaviorConfig {
        pitch_rotate_range: [30.0, 30.0],
        ..BehaviorConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let seg = rotate(&ctx(), BehaviorKind::RotatePitch, &cfg, [-20.0, 20.0], fps(), &mut rng).unwrap();
    seg.validate().unwrap();
    assert_eq!(*seg.pitches.last().unwrap(), 20.0);
    assert_eq!(seg.frames(), 20);
    assert!(seg.yaws.iter().all(|y| *y == 0.0));
}

#[test]
fn zero_angle_rotation_is_a_failure() {
    let cfg = BehaviorConfig {
        yaw_rotate_range: [0.0, 0.0],
        ..BehaviorConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        rotate(&ctx(), BehaviorKind::RotateYaw, &cfg, [-20.0, 20.0], fps(), &mut rng).unwrap_err(),
        BehaviorFailure::ZeroDuration
    );
}

#[test]
fn advance_normalizes_yaw_and_moves_frame() {
    let cfg = BehaviorConfig {
        yaw_rotate_range: [90.0, 90.0],
        ..BehaviorConfig::default()
    };
    let mut c = BehaviorContext {
        yaw: 135.0,
        ..ctx()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let seg = rotate(&c, BehaviorKind::RotateYaw, &cfg, [-20.0, 20.0], fps(), &mut rng).unwrap();
    c.advance(&seg);
    assert!((c.yaw - (-135.0)).abs() < 1e-9);
    assert_eq!(c.frame, seg.end_frame);
}
