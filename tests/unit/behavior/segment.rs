use super::*;

fn dense(frames: u64) -> BehaviorSegment {
    let n = frames as usize + 1;
    BehaviorSegment {
        kind: BehaviorKind::TranslateForward,
        points: (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect(),
        yaws: vec![0.0; n],
        pitches: vec![0.0; n],
        start_frame: 10,
        end_frame: 10 + frames,
        metadata: BTreeMap::new(),
    }
}

fn rotate(frames: u64, keys: usize, angle: f64) -> BehaviorSegment {
    BehaviorSegment {
        kind: BehaviorKind::RotateYaw,
        points: vec![Point3::ZERO; keys],
        yaws: (0..keys)
            .map(|k| angle * k as f64 / (keys - 1) as f64)
            .collect(),
        pitches: vec![0.0; keys],
        start_frame: 0,
        end_frame: frames,
        metadata: BTreeMap::new(),
    }
}

#[test]
fn dense_segment_needs_one_sample_per_frame() {
    dense(30).validate().unwrap();
    let mut bad = dense(30);
    bad.points.pop();
    bad.yaws.pop();
    bad.pitches.pop();
    assert!(matches!(
        bad.validate(),
        Err(BehaviorFailure::InvalidSegment(_))
    ));
}

#[test]
fn misaligned_arrays_are_rejected() {
    let mut bad = dense(5);
    bad.yaws.push(1.0);
    assert!(bad.validate().is_err());
}

#[test]
fn empty_span_and_nan_are_rejected() {
    let mut bad = dense(5);
    bad.end_frame = bad.start_frame;
    assert!(bad.validate().is_err());

    let mut bad = dense(5);
    bad.pitches[2] = f64::NAN;
    assert!(bad.validate().is_err());
}

#[test]
fn keyed_segment_accepts_sparse_keys() {
    rotate(90, 7, 90.0).validate().unwrap();
    rotate(1, 2, 1.0).validate().unwrap();
    assert!(rotate(2, 4, 1.0).validate().is_err());
}

#[test]
fn truncating_dense_keeps_prefix() {
    let mut seg = dense(30);
    seg.truncate(12);
    assert_eq!(seg.frames(), 12);
    assert_eq!(seg.points.len(), 13);
    assert_eq!(seg.points[12], Point3::new(12.0, 0.0, 0.0));
    assert_eq!(seg.metadata["truncated_from_frames"], 30.0);
    seg.validate().unwrap();
}

#[test]
fn truncating_keyed_reinterpolates() {
    let mut seg = rotate(90, 7, 90.0);
    seg.truncate(45);
    seg.validate().unwrap();
    assert_eq!(seg.end_frame, 45);
    assert_eq!(seg.yaws[0], 0.0);
    assert!((seg.yaws.last().unwrap() - 45.0).abs() < 1e-9);
}

#[test]
fn truncate_is_noop_when_fitting() {
    let mut seg = dense(10);
    let before = seg.clone();
    seg.truncate(10);
    assert_eq!(seg, before);
    seg.truncate(0);
    assert_eq!(seg, before);
}

#[test]
fn last_pose_reads_final_sample() {
    let pose = rotate(30, 3, -60.0).last_pose().unwrap();
    assert_eq!(pose.yaw, -60.0);
    assert_eq!(pose.position, Point3::ZERO);
}
