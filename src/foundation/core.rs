use std::ops::{Add, Mul, Sub};

use crate::foundation::error::{NavTrackError, NavTrackResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// World-space point. Units follow the scene (centimetres in the default configuration).
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate (up).
    pub z: f64,
}

impl Point3 {
    /// Origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Construct a point from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Distance to `other` projected on the XY plane.
    pub fn distance_xy(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Length of the point read as a vector from the origin.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Linear interpolation towards `other`; `t` is not clamped.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Same point with `dz` added to its height.
    pub fn raised(self, dz: f64) -> Self {
        Self {
            z: self.z + dz,
            ..self
        }
    }

    /// True when every component is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl std::fmt::Display for Point3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Camera rotation in degrees.
pub struct Orientation {
    /// Heading around the up axis; 0 looks down +X, 90 down +Y.
    pub yaw: f64,
    /// Elevation; positive looks up.
    pub pitch: f64,
    /// Bank around the view axis.
    pub roll: f64,
}

impl Orientation {
    /// Orientation with zero roll.
    pub const fn new(yaw: f64, pitch: f64) -> Self {
        Self {
            yaw,
            pitch,
            roll: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Position plus yaw/pitch, the state carried between behaviors.
pub struct Pose {
    /// Camera position.
    pub position: Point3,
    /// Yaw in degrees.
    pub yaw: f64,
    /// Pitch in degrees.
    pub pitch: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Axis-aligned box given as center and half-extents.
pub struct SceneBounds {
    /// Box center.
    pub center: Point3,
    /// Half-extents along each axis.
    pub extent: Point3,
}

impl SceneBounds {
    /// XY footprint area in square metres, assuming centimetre units.
    pub fn area_m2(self) -> f64 {
        (self.extent.x * 2.0) * (self.extent.y * 2.0) / (100.0 * 100.0)
    }

    /// Larger of the two horizontal half-extents.
    pub fn horizontal_radius(self) -> f64 {
        self.extent.x.max(self.extent.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Rational frame rate.
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator; must be > 0.
    pub den: u32,
}

impl Fps {
    /// Validated constructor.
    pub fn new(num: u32, den: u32) -> NavTrackResult<Self> {
        if den == 0 {
            return Err(NavTrackError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(NavTrackError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Timestamp of frame `frames`.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Whole frames covering `secs`, rounded down.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }

    /// Whole frames covering `secs`, rounded to nearest.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
