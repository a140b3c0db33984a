use crate::foundation::core::Point3;

/// Tangents shorter than this (XY) carry no usable heading.
pub(crate) const HEADING_EPSILON: f64 = 1e-4;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        // -0.0 and 0.0 hash alike.
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u64(v.to_bits());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Map an angle in degrees into (-180, 180].
pub fn normalize_angle(deg: f64) -> f64 {
    let mut a = deg % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Signed difference `to - from` folded into [-180, 180].
pub fn shortest_angle_delta(from: f64, to: f64) -> f64 {
    let mut diff = (to - from) % 360.0;
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff < -180.0 {
        diff += 360.0;
    }
    diff
}

/// Interpolate between two headings along the shorter arc; result normalized.
pub fn lerp_angle(a: f64, b: f64, t: f64) -> f64 {
    normalize_angle(a + shortest_angle_delta(a, b) * t)
}

/// Make a heading series continuous: each value is re-expressed so that its step from the
/// previous output is the shortest one modulo 360.
pub fn unwrap_angles(angles: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(angles.len());
    for &a in angles {
        match out.last() {
            None => out.push(a),
            Some(&prev) => out.push(prev + shortest_angle_delta(prev, a)),
        }
    }
    out
}

/// Heading in degrees from `a` towards `b` on the XY plane, `None` when the two coincide.
pub fn yaw_between(a: Point3, b: Point3) -> Option<f64> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx.abs() < HEADING_EPSILON && dy.abs() < HEADING_EPSILON {
        return None;
    }
    Some(dy.atan2(dx).to_degrees())
}

/// Pitch following the slope from `a` to `b`, clamped to `[min_deg, max_deg]`.
///
/// Returns `None` when the horizontal run is under one unit.
pub fn pitch_from_slope(a: Point3, b: Point3, min_deg: f64, max_deg: f64) -> Option<f64> {
    let run = a.distance_xy(b);
    if run < 1.0 {
        return None;
    }
    Some((b.z - a.z).atan2(run).to_degrees().clamp(min_deg, max_deg))
}

/// Total polyline length.
pub fn path_length(points: &[Point3]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Cumulative arc length at each vertex; first entry is 0.
pub fn cumulative_lengths(points: &[Point3]) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            acc += points[i - 1].distance(*p);
        }
        out.push(acc);
    }
    out
}

/// Find the vertex pair bracketing arc length `target`.
///
/// Returns `(i, t)` such that the point lies at `t` along `points[i]..points[i + 1]`.
/// `cumulative` must come from [`cumulative_lengths`] and hold at least two entries.
pub fn locate_on_arc(cumulative: &[f64], target: f64) -> (usize, f64) {
    let last_seg = cumulative.len().saturating_sub(2);
    let idx = cumulative
        .partition_point(|&d| d <= target)
        .saturating_sub(1)
        .min(last_seg);
    let d0 = cumulative[idx];
    let d1 = cumulative[idx + 1];
    let t = if d1 > d0 {
        ((target - d0) / (d1 - d0)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (idx, t)
}

/// Resample a polyline to exactly `count` points evenly spaced by arc length.
///
/// The first and last input points are preserved. Inputs with fewer than two points are
/// returned unchanged; `count <= 2` yields `[first, last]`; a zero-length polyline yields
/// `count` copies of its first point.
pub fn resample_by_count(points: &[Point3], count: usize) -> Vec<Point3> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let first = points[0];
    let last = points[points.len() - 1];
    if count <= 2 {
        return vec![first, last];
    }

    let cumulative = cumulative_lengths(points);
    let total = cumulative[cumulative.len() - 1];
    if total <= 1e-3 {
        return vec![first; count];
    }

    let step = total / (count - 1) as f64;
    let mut out = Vec::with_capacity(count);
    out.push(first);
    for k in 1..count - 1 {
        let (idx, t) = locate_on_arc(&cumulative, step * k as f64);
        out.push(points[idx].lerp(points[idx + 1], t));
    }
    out.push(last);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
