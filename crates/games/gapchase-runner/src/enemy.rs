use serde::{Deserialize, Serialize};

use gapchase_core::status::{StatusKind, StatusSet};

use crate::config::RunnerConfig;
use crate::error::ActionError;
use crate::lane::{Lane, LaneMotion, Position, lane_from_x, lane_x};
use crate::spawn::Obstacle;

/// Timed statuses on the enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyStatus {
    /// Recovering from an obstacle hit; no avoidance while it runs.
    Staggered,
}

impl StatusKind for EnemyStatus {
    fn label(&self) -> &'static str {
        match self {
            EnemyStatus::Staggered => "staggered",
        }
    }
}

/// The fleeing enemy. Holds a fixed lead ahead of the player and dodges
/// obstacles by switching lanes. It never jumps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    pub position: Position,
    pub motion: LaneMotion,
    /// Always false; kept so introspection shows the same flags as the player.
    pub is_jumping: bool,
    pub hits_taken: u32,
    pub statuses: StatusSet<EnemyStatus>,
}

impl EnemyState {
    pub fn new(lane: Lane, z: f32, config: &RunnerConfig) -> Self {
        Self {
            position: Position::new(lane_x(lane, config.lane_spacing), config.ground_y, z),
            motion: LaneMotion::Stationary(lane),
            is_jumping: false,
            hits_taken: 0,
            statuses: StatusSet::new(),
        }
    }

    pub fn current_lane(&self, config: &RunnerConfig) -> Lane {
        lane_from_x(self.position.x, config.lane_spacing)
    }

    pub fn target_lane(&self) -> Lane {
        self.motion.target()
    }

    pub fn is_staggered(&self) -> bool {
        self.statuses.has(EnemyStatus::Staggered)
    }

    /// Start moving toward `lane`. Returns false if nothing changed.
    pub fn set_target_lane(&mut self, lane: Lane) -> bool {
        self.motion.begin(lane)
    }

    /// Enemy jumping is disabled. Always refuses and leaves every flag untouched.
    pub fn jump(&self) -> Result<(), ActionError> {
        Err(ActionError::JumpDisabled)
    }

    /// Advance statuses and lateral motion. Returns the lane arrived at, if any.
    pub fn tick(&mut self, dt: f32, config: &RunnerConfig) -> Option<Lane> {
        self.statuses.tick(dt);
        let arrived = self.motion.advance(dt, config.lane_change_speed);
        self.position.x = self.motion.x(config.lane_spacing);
        arrived
    }
}

/// Nearest active obstacle in `lane` strictly ahead of `origin` and within
/// `range` (inclusive) along the travel axis.
pub fn nearest_obstacle_ahead<'a>(
    origin: &Position,
    lane: Lane,
    obstacles: &'a [Obstacle],
    range: f32,
) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .filter(|o| o.active && o.lane == lane)
        .filter(|o| o.position.z < origin.z && origin.z - o.position.z <= range)
        .min_by(|a, b| b.position.z.total_cmp(&a.position.z))
}

/// Whether `lane` has no active obstacle ahead of `origin` within `range`.
pub fn lane_is_clear(origin: &Position, lane: Lane, obstacles: &[Obstacle], range: f32) -> bool {
    nearest_obstacle_ahead(origin, lane, obstacles, range).is_none()
}

/// Look ahead of the enemy in the lane it physically occupies.
pub fn check_obstacle_ahead<'a>(
    enemy: &EnemyState,
    obstacles: &'a [Obstacle],
    config: &RunnerConfig,
) -> Option<&'a Obstacle> {
    nearest_obstacle_ahead(
        &enemy.position,
        enemy.current_lane(config),
        obstacles,
        config.detection_range,
    )
}

/// Pick a lane to escape `threat` into: adjacent lanes first, lower index
/// first, skipping the threat's lane and any lane with its own obstacle
/// inside detection range. `None` when every lane is blocked.
pub fn choose_escape_lane(
    enemy: &EnemyState,
    threat: &Obstacle,
    obstacles: &[Obstacle],
    config: &RunnerConfig,
) -> Option<Lane> {
    enemy
        .current_lane(config)
        .escape_order()
        .into_iter()
        .filter(|&lane| lane != threat.lane)
        .find(|&lane| lane_is_clear(&enemy.position, lane, obstacles, config.detection_range))
}
