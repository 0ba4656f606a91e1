use serde::{Deserialize, Serialize};

use crate::error::InvalidLane;

/// Number of lanes on the track.
pub const LANE_COUNT: u8 = 3;

/// One of the three travel lanes: 0 (left), 1 (center), 2 (right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Lane(u8);

impl Lane {
    pub const LEFT: Lane = Lane(0);
    pub const CENTER: Lane = Lane(1);
    pub const RIGHT: Lane = Lane(2);

    pub const ALL: [Lane; LANE_COUNT as usize] = [Lane::LEFT, Lane::CENTER, Lane::RIGHT];

    pub fn new(index: u8) -> Option<Lane> {
        (index < LANE_COUNT).then_some(Lane(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// The neighbouring lane in `shift` direction, if there is one.
    pub fn shifted(self, shift: LaneShift) -> Option<Lane> {
        match shift {
            LaneShift::None => Some(self),
            LaneShift::Left => self.0.checked_sub(1).and_then(Lane::new),
            LaneShift::Right => Lane::new(self.0 + 1),
        }
    }

    /// Lanes to try when leaving this lane: adjacent lanes first (lower index
    /// before higher), then the rest, never this lane itself.
    pub fn escape_order(self) -> Vec<Lane> {
        let mut lanes: Vec<Lane> = Lane::ALL.into_iter().filter(|&l| l != self).collect();
        lanes.sort_by_key(|l| (l.0.abs_diff(self.0), l.0));
        lanes
    }
}

impl TryFrom<u8> for Lane {
    type Error = InvalidLane;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Lane::new(index).ok_or(InvalidLane(index))
    }
}

impl From<Lane> for u8 {
    fn from(lane: Lane) -> u8 {
        lane.0
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lane shift input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneShift {
    #[default]
    None,
    Left,
    Right,
}

/// World-space position. `z` is the travel axis; "ahead" is toward -z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Absolute separation along the travel axis.
    pub fn travel_distance(&self, other: &Position) -> f32 {
        (self.z - other.z).abs()
    }
}

/// Canonical x of a lane center: lane 0 ⇒ -spacing, 1 ⇒ 0, 2 ⇒ +spacing.
pub fn lane_x(lane: Lane, spacing: f32) -> f32 {
    (lane.index() as f32 - 1.0) * spacing
}

/// Resolve the lane whose center is nearest to `x`.
///
/// Only ever fed a body's physical x. Ties go to the lower index; non-finite
/// input resolves to the center lane.
pub fn lane_from_x(x: f32, spacing: f32) -> Lane {
    if !x.is_finite() {
        return Lane::CENTER;
    }
    let mut best = Lane::LEFT;
    let mut best_dist = f32::MAX;
    for lane in Lane::ALL {
        let d = (x - lane_x(lane, spacing)).abs();
        if d < best_dist {
            best = lane;
            best_dist = d;
        }
    }
    best
}

/// Lateral motion of a body between lanes.
///
/// There is no stored "current lane": while `Transitioning`, the lane a body
/// occupies is whatever its interpolated x resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LaneMotion {
    Stationary(Lane),
    Transitioning { from: Lane, to: Lane, progress: f32 },
}

impl LaneMotion {
    /// Destination lane (the stationary lane when not moving).
    pub fn target(&self) -> Lane {
        match *self {
            LaneMotion::Stationary(lane) => lane,
            LaneMotion::Transitioning { to, .. } => to,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, LaneMotion::Transitioning { .. })
    }

    /// Start moving toward `to`. Reversing an in-flight change is allowed and
    /// continues from the current interpolated x. Returns false when nothing
    /// changed.
    pub fn begin(&mut self, to: Lane) -> bool {
        match *self {
            LaneMotion::Stationary(lane) if lane == to => false,
            LaneMotion::Stationary(lane) => {
                *self = LaneMotion::Transitioning {
                    from: lane,
                    to,
                    progress: 0.0,
                };
                true
            },
            LaneMotion::Transitioning {
                from,
                to: current_to,
                progress,
            } => {
                if to == from && to != current_to {
                    *self = LaneMotion::Transitioning {
                        from: current_to,
                        to: from,
                        progress: 1.0 - progress,
                    };
                    true
                } else {
                    false
                }
            },
        }
    }

    /// Advance an in-flight change. `speed` is in lane widths per second,
    /// scaled down for multi-lane moves. Returns the lane arrived at, if any.
    pub fn advance(&mut self, dt: f32, speed: f32) -> Option<Lane> {
        let LaneMotion::Transitioning { from, to, progress } = *self else {
            return None;
        };
        let lanes = from.index().abs_diff(to.index()).max(1) as f32;
        let next = progress + dt * speed / lanes;
        if next >= 1.0 {
            *self = LaneMotion::Stationary(to);
            Some(to)
        } else {
            *self = LaneMotion::Transitioning {
                from,
                to,
                progress: next,
            };
            None
        }
    }

    /// Physical x for this motion state.
    pub fn x(&self, spacing: f32) -> f32 {
        match *self {
            LaneMotion::Stationary(lane) => lane_x(lane, spacing),
            LaneMotion::Transitioning { from, to, progress } => {
                let a = lane_x(from, spacing);
                let b = lane_x(to, spacing);
                a + (b - a) * progress.clamp(0.0, 1.0)
            },
        }
    }
}
