use rand::{Rng as _, RngCore};

use crate::foundation::error::{NavTrackError, NavTrackResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Movement primitive producing one timeline segment.
pub enum BehaviorKind {
    /// Walk a navigation path to a random reachable destination.
    Roam,
    /// Straight move along the current heading.
    TranslateForward,
    /// Straight move against the current heading.
    TranslateBackward,
    /// Straight move 90 degrees left of the heading.
    TranslateLeft,
    /// Straight move 90 degrees right of the heading.
    TranslateRight,
    /// Hold the current pose.
    Idle,
    /// Turn in place around the up axis.
    RotateYaw,
    /// Tilt in place.
    RotatePitch,
}

impl BehaviorKind {
    /// Every kind, in weight-table order.
    pub const ALL: [Self; 8] = [
        Self::Roam,
        Self::TranslateForward,
        Self::TranslateBackward,
        Self::TranslateLeft,
        Self::TranslateRight,
        Self::Idle,
        Self::RotateYaw,
        Self::RotatePitch,
    ];

    /// Stable lowercase name, matching the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Self::Roam => "roam",
            Self::TranslateForward => "translate_forward",
            Self::TranslateBackward => "translate_backward",
            Self::TranslateLeft => "translate_left",
            Self::TranslateRight => "translate_right",
            Self::Idle => "idle",
            Self::RotateYaw => "rotate_yaw",
            Self::RotatePitch => "rotate_pitch",
        }
    }

    /// Dense kinds store one sample per frame; the others store sparse evenly spaced keys.
    pub fn is_dense(self) -> bool {
        matches!(self, Self::Roam) || self.translate_heading_offset().is_some()
    }

    /// Heading offset from the camera yaw for translate kinds.
    pub fn translate_heading_offset(self) -> Option<f64> {
        match self {
            Self::TranslateForward => Some(0.0),
            Self::TranslateBackward => Some(180.0),
            Self::TranslateLeft => Some(90.0),
            Self::TranslateRight => Some(-90.0),
            _ => None,
        }
    }

    /// True for the two in-place rotations.
    pub fn is_rotate(self) -> bool {
        matches!(self, Self::RotateYaw | Self::RotatePitch)
    }
}

impl std::fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Relative draw weights. They need not sum to one; all-zero falls back to uniform.
pub struct BehaviorWeights {
    /// Roam weight.
    pub roam: f64,
    /// Forward translate weight.
    pub translate_forward: f64,
    /// Backward translate weight.
    pub translate_backward: f64,
    /// Left translate weight.
    pub translate_left: f64,
    /// Right translate weight.
    pub translate_right: f64,
    /// Idle weight.
    pub idle: f64,
    /// Yaw rotation weight.
    pub rotate_yaw: f64,
    /// Pitch rotation weight.
    pub rotate_pitch: f64,
}

impl Default for BehaviorWeights {
    fn default() -> Self {
        Self {
            roam: 0.6,
            translate_forward: 0.1,
            translate_backward: 0.1,
            translate_left: 0.05,
            translate_right: 0.05,
            idle: 0.05,
            rotate_yaw: 0.05,
            rotate_pitch: 0.0,
        }
    }
}

impl BehaviorWeights {
    /// Weight assigned to `kind`.
    pub fn weight(&self, kind: BehaviorKind) -> f64 {
        match kind {
            BehaviorKind::Roam => self.roam,
            BehaviorKind::TranslateForward => self.translate_forward,
            BehaviorKind::TranslateBackward => self.translate_backward,
            BehaviorKind::TranslateLeft => self.translate_left,
            BehaviorKind::TranslateRight => self.translate_right,
            BehaviorKind::Idle => self.idle,
            BehaviorKind::RotateYaw => self.rotate_yaw,
            BehaviorKind::RotatePitch => self.rotate_pitch,
        }
    }

    /// Weights must be finite and non-negative.
    pub fn validate(&self) -> NavTrackResult<()> {
        for kind in BehaviorKind::ALL {
            let w = self.weight(kind);
            if !w.is_finite() || w < 0.0 {
                return Err(NavTrackError::validation(format!(
                    "behavior weight '{kind}' must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }

    /// Draw a kind proportionally to its weight.
    pub fn choose(&self, rng: &mut dyn RngCore) -> BehaviorKind {
        let total: f64 = BehaviorKind::ALL.iter().map(|k| self.weight(*k)).sum();
        if total <= 0.0 {
            tracing::warn!("all behavior weights are zero, drawing uniformly");
            return BehaviorKind::ALL[rng.gen_range(0..BehaviorKind::ALL.len())];
        }

        let r = rng.gen_range(0.0..total);
        let mut acc = 0.0;
        for kind in BehaviorKind::ALL {
            let w = self.weight(kind);
            acc += w;
            if w > 0.0 && r < acc {
                return kind;
            }
        }
        // Float round-off at the top of the range: take the last kind with weight.
        BehaviorKind::ALL
            .into_iter()
            .rev()
            .find(|k| self.weight(*k) > 0.0)
            .unwrap_or(BehaviorKind::Roam)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/behavior/kind.rs"]
mod tests;
