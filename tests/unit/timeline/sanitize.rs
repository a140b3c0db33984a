use super::*;
use crate::foundation::core::{Orientation, Point3};

fn keys(yaws: &[f64], pitches: &[f64], dt: f64) -> Vec<Keyframe> {
    yaws.iter()
        .zip(pitches)
        .enumerate()
        .map(|(i, (y, p))| Keyframe {
            time_seconds: i as f64 * dt,
            position: Point3::ZERO,
            rotation: Orientation {
                yaw: *y,
                pitch: *p,
                roll: 5.0,
            },
        })
        .collect()
}

#[test]
fn yaw_is_unwrapped_across_the_seam() {
    let mut k = keys(&[170.0, -175.0, -170.0], &[0.0; 3], 1.0);
    sanitize(&mut k, &CameraConfig::default(), false);
    let yaws: Vec<f64> = k.iter().map(|k| k.rotation.yaw).collect();
    assert_eq!(yaws, vec![170.0, 185.0, 190.0]);
    assert!(k.iter().all(|k| k.rotation.roll == 0.0));
}

#[test]
fn yaw_rate_is_clamped() {
    let cam = CameraConfig {
        max_yaw_rate: Some(30.0),
        ..CameraConfig::default()
    };
    let mut k = keys(&[0.0, 90.0, 90.0, 90.0], &[0.0; 4], 1.0);
    sanitize(&mut k, &cam, false);
    let yaws: Vec<f64> = k.iter().map(|k| k.rotation.yaw).collect();
    assert_eq!(yaws, vec![0.0, 30.0, 60.0, 90.0]);
}

#[test]
fn zero_dt_uses_floor() {
    let cam = CameraConfig {
        max_yaw_rate: Some(1000.0),
        ..CameraConfig::default()
    };
    let mut k = keys(&[0.0, 90.0], &[0.0; 2], 0.0);
    sanitize(&mut k, &cam, false);
    assert!((k[1].rotation.yaw - 1.0).abs() < 1e-9);
}

#[test]
fn pitch_is_zeroed_unless_kept() {
    let mut k = keys(&[0.0; 3], &[5.0, 10.0, 15.0], 1.0);
    sanitize(&mut k, &CameraConfig::default(), false);
    assert!(k.iter().all(|k| k.rotation.pitch == 0.0));
}

#[test]
fn kept_pitch_is_rate_limited_and_clamped() {
    let mut k = keys(&[0.0; 4], &[-30.0, 30.0, 30.0, 30.0], 1.0);
    sanitize(&mut k, &CameraConfig::default(), true);
    let pitches: Vec<f64> = k.iter().map(|k| k.rotation.pitch).collect();
    assert_eq!(pitches, vec![-20.0, -10.0, 10.0, 20.0]);
}

#[test]
fn empty_input_is_fine() {
    let mut k: Vec<Keyframe> = Vec::new();
    sanitize(&mut k, &CameraConfig::default(), true);
    assert!(k.is_empty());
}
