use serde::{Deserialize, Serialize};

use gapchase_core::status::{StatusKind, StatusSet};

use crate::config::RunnerConfig;
use crate::error::ActionError;
use crate::lane::{Lane, LaneMotion, LaneShift, Position, lane_from_x, lane_x};

/// Timed statuses on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerStatus {
    /// Obstacle contact is ignored.
    Invincible,
    /// Throw animation running.
    Throwing,
}

impl StatusKind for RunnerStatus {
    fn label(&self) -> &'static str {
        match self {
            RunnerStatus::Invincible => "invincible",
            RunnerStatus::Throwing => "throwing",
        }
    }
}

/// The player's body and action flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerState {
    pub position: Position,
    pub motion: LaneMotion,
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub is_jumping: bool,
    /// Seconds spent grounded while `is_jumping` is still set.
    pub ground_timer: f32,
    pub has_item: bool,
    pub has_thrown: bool,
    pub lives: u32,
    pub statuses: StatusSet<RunnerStatus>,
}

impl RunnerState {
    pub fn new(lane: Lane, z: f32, config: &RunnerConfig) -> Self {
        Self {
            position: Position::new(lane_x(lane, config.lane_spacing), config.ground_y, z),
            motion: LaneMotion::Stationary(lane),
            vertical_velocity: 0.0,
            grounded: true,
            is_jumping: false,
            ground_timer: 0.0,
            has_item: false,
            has_thrown: false,
            lives: config.starting_lives,
            statuses: StatusSet::new(),
        }
    }

    /// Lane resolved from the live x position.
    pub fn current_lane(&self, config: &RunnerConfig) -> Lane {
        lane_from_x(self.position.x, config.lane_spacing)
    }

    pub fn target_lane(&self) -> Lane {
        self.motion.target()
    }

    pub fn is_invincible(&self) -> bool {
        self.statuses.has(RunnerStatus::Invincible)
    }

    pub fn is_throwing(&self) -> bool {
        self.statuses.has(RunnerStatus::Throwing)
    }

    pub fn set_invincible(&mut self, secs: f32) {
        self.statuses.apply(RunnerStatus::Invincible, secs);
    }

    pub fn clear_invincible(&mut self) {
        self.statuses.clear(RunnerStatus::Invincible);
    }

    pub fn jump(&mut self, config: &RunnerConfig) -> Result<(), ActionError> {
        if !self.grounded || self.is_jumping {
            return Err(ActionError::NotGrounded);
        }
        self.grounded = false;
        self.is_jumping = true;
        self.ground_timer = 0.0;
        self.vertical_velocity = config.jump_velocity;
        Ok(())
    }

    /// Begin a lane change. Returns `(from, to)` where `from` is the lane
    /// resolved from x at the moment of the request.
    pub fn shift_lane(
        &mut self,
        shift: LaneShift,
        config: &RunnerConfig,
    ) -> Result<(Lane, Lane), ActionError> {
        let from = self.current_lane(config);
        let to = self
            .motion
            .target()
            .shifted(shift)
            .ok_or(ActionError::NoLaneThatWay)?;
        if !self.motion.begin(to) {
            return Err(ActionError::LaneChangeInProgress);
        }
        Ok((from, to))
    }

    /// Consume the held item and start the throw animation. The caller
    /// spawns the projectile.
    pub fn start_throw(&mut self, config: &RunnerConfig) -> Result<(), ActionError> {
        if self.is_throwing() {
            return Err(ActionError::AlreadyThrowing);
        }
        if !self.has_item {
            return Err(ActionError::NoItem);
        }
        self.has_item = false;
        self.has_thrown = true;
        self.statuses
            .apply(RunnerStatus::Throwing, config.throw_duration_secs);
        Ok(())
    }

    /// Advance statuses, lateral motion and vertical physics.
    ///
    /// Returns `Some(grounded_for)` when the ground-timer failsafe cleared a
    /// stuck `is_jumping` flag this tick.
    pub fn tick(&mut self, dt: f32, config: &RunnerConfig) -> Option<f32> {
        self.statuses.tick(dt);

        self.motion.advance(dt, config.lane_change_speed);
        self.position.x = self.motion.x(config.lane_spacing);

        if !self.grounded {
            self.vertical_velocity += config.gravity * dt;
            self.position.y += self.vertical_velocity * dt;
            if self.position.y <= config.ground_y {
                self.position.y = config.ground_y;
                self.vertical_velocity = 0.0;
                self.grounded = true;
                self.is_jumping = false;
                self.ground_timer = 0.0;
                tracing::trace!("Runner landed");
            }
            return None;
        }

        if !self.is_jumping {
            self.ground_timer = 0.0;
            return None;
        }

        self.ground_timer += dt;
        if self.ground_timer >= config.ground_failsafe_secs {
            let grounded_for = self.ground_timer;
            self.is_jumping = false;
            self.ground_timer = 0.0;
            tracing::debug!(grounded_for, "Jump failsafe cleared stuck flag");
            return Some(grounded_for);
        }
        None
    }
}
