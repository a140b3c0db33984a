use std::collections::BTreeMap;

use super::*;
use crate::{
    behavior::segment::BehaviorSegment, foundation::core::Pose,
    timeline::assembler::TimelineAssembler,
};

fn seg(kind: BehaviorKind, start: u64, frames: u64, points: Vec<Point3>, yaws: Vec<f64>) -> BehaviorSegment {
    let n = points.len();
    BehaviorSegment {
        kind,
        points,
        yaws,
        pitches: vec![0.0; n],
        start_frame: start,
        end_frame: start + frames,
        metadata: BTreeMap::new(),
    }
}

fn dense_line(kind: BehaviorKind, start: u64, frames: u64, from: Point3, to: Point3) -> BehaviorSegment {
    let points: Vec<Point3> = (0..=frames)
        .map(|i| from.lerp(to, i as f64 / frames as f64))
        .collect();
    let n = points.len();
    seg(kind, start, frames, points, vec![0.0; n])
}

/// idle [0,30] at origin, translate [30,40] to x=100, rotate [40,70] yaw 0->90, roam [70,80] to y=100.
fn sample_timeline() -> Timeline {
    let p0 = Point3::ZERO;
    let p1 = Point3::new(100.0, 0.0, 0.0);
    let p2 = Point3::new(100.0, 100.0, 0.0);
    let mut asm = TimelineAssembler::new(Pose::default());
    asm.push(seg(BehaviorKind::Idle, 0, 30, vec![p0; 2], vec![0.0; 2]))
        .unwrap();
    asm.push(dense_line(BehaviorKind::TranslateForward, 30, 10, p0, p1))
        .unwrap();
    asm.push(seg(
        BehaviorKind::RotateYaw,
        40,
        30,
        vec![p1; 3],
        vec![0.0, 45.0, 90.0],
    ))
    .unwrap();
    let mut roam = dense_line(BehaviorKind::Roam, 70, 10, p1, p2);
    roam.yaws = vec![90.0; 11];
    asm.push(roam).unwrap();
    asm.finish()
}

fn fps() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn key_count_follows_interval() {
    let tl = sample_timeline();
    let every = resample(&tl, fps(), 80, &CameraConfig::default());
    assert_eq!(every.len(), 81);
    assert_eq!(every[30].time_seconds, 1.0);

    let sparse = resample(
        &tl,
        fps(),
        80,
        &CameraConfig {
            key_interval_frames: 30,
            ..CameraConfig::default()
        },
    );
    let times: Vec<f64> = sparse.iter().map(|k| k.time_seconds).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0]);
}

#[test]
fn per_kind_policies() {
    let keys = resample(&sample_timeline(), fps(), 80, &CameraConfig::default());

    assert_eq!(keys[10].position, Point3::ZERO);

    assert!((keys[35].position.x - 50.0).abs() < 1e-9);
    assert_eq!(keys[35].rotation.yaw, 0.0);

    assert_eq!(keys[55].position, Point3::new(100.0, 0.0, 0.0));
    assert!((keys[55].rotation.yaw - 45.0).abs() < 1e-9);

    assert!((keys[75].position.y - 50.0).abs() < 1e-9);
    assert!((keys[75].rotation.yaw - 90.0).abs() < 1e-9);
    assert_eq!(keys[80].position, Point3::new(100.0, 100.0, 0.0));
    assert!(keys.iter().all(|k| k.rotation.roll == 0.0));
}

#[test]
fn resampling_is_idempotent() {
    let tl = sample_timeline();
    let cam = CameraConfig::default();
    assert_eq!(resample(&tl, fps(), 80, &cam), resample(&tl, fps(), 80, &cam));
}

#[test]
fn empty_timeline_yields_origin_pose() {
    let tl = TimelineAssembler::new(Pose {
        position: Point3::new(5.0, 6.0, 7.0),
        yaw: 30.0,
        pitch: 0.0,
    })
    .finish();
    let keys = resample(&tl, fps(), 0, &CameraConfig::default());
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].position, Point3::new(5.0, 6.0, 7.0));
    assert_eq!(keys[0].rotation.yaw, 30.0);
}

#[test]
fn uncovered_frames_use_nearest_sample() {
    let tl = sample_timeline();
    let keys = resample(&tl, fps(), 90, &CameraConfig::default());
    assert_eq!(keys.len(), 91);
    assert_eq!(keys[90].position, *tl.points.last().unwrap());
}

#[test]
fn z_offset_raises_every_key() {
    let cam = CameraConfig {
        z_offset: 160.0,
        ..CameraConfig::default()
    };
    let keys = resample(&sample_timeline(), fps(), 80, &cam);
    assert!(keys.iter().all(|k| k.position.z == 160.0));
}

#[test]
fn roam_pitch_follows_slope_when_enabled() {
    let mut asm = TimelineAssembler::new(Pose::default());
    let mut roam = dense_line(
        BehaviorKind::Roam,
        0,
        10,
        Point3::ZERO,
        Point3::new(100.0, 0.0, 10.0),
    );
    roam.yaws = vec![0.0; 11];
    asm.push(roam).unwrap();
    let tl = asm.finish();

    let flat = resample(&tl, fps(), 10, &CameraConfig::default());
    assert!(flat.iter().all(|k| k.rotation.pitch == 0.0));

    let sloped = resample(
        &tl,
        fps(),
        10,
        &CameraConfig {
            pitch_from_slope: true,
            ..CameraConfig::default()
        },
    );
    let expected = 10.0f64.atan2(100.0).to_degrees();
    assert!((sloped[5].rotation.pitch - expected).abs() < 1e-6);
}
