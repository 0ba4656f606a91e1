use serde::{Deserialize, Serialize};

/// How a handled obstacle is kept from firing again while the bodies still overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitSuppression {
    /// Deactivate the obstacle only.
    Deactivate,
    /// Deactivate the obstacle and grant the player an invincibility window.
    DeactivateAndInvincible,
}

/// Data-driven configuration for the lane runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Distance between neighbouring lane centers (units). Lane 1 sits at x = 0.
    pub lane_spacing: f32,
    /// Lanes per second while changing lanes.
    pub lane_change_speed: f32,
    /// Collision distance along the travel axis for body-vs-obstacle checks.
    pub collision_threshold: f32,
    /// Enemy look-ahead distance for obstacles (units).
    pub detection_range: f32,
    /// Seconds a grounded runner may keep `is_jumping` set before the failsafe clears it.
    pub ground_failsafe_secs: f32,
    /// Gravity (units/s^2, downward).
    pub gravity: f32,
    /// Initial jump velocity.
    pub jump_velocity: f32,
    /// Height of the running surface.
    pub ground_y: f32,
    /// Throw animation length (seconds). No second throw while it runs.
    pub throw_duration_secs: f32,
    /// Projectile speed relative to the runner (units/s).
    pub throw_speed: f32,
    /// Maximum distance a projectile travels before it is discarded.
    pub throw_range: f32,
    /// Projectile-to-enemy hit distance along the travel axis.
    pub enemy_hit_range: f32,
    /// Post-hit invincibility window for the player (seconds).
    pub invincibility_secs: f32,
    pub hit_suppression: HitSuppression,
    /// Seconds the enemy spends staggered after running into an obstacle.
    pub enemy_stagger_secs: f32,
    /// Distance the enemy runs ahead of the player.
    pub enemy_lead: f32,
    /// Hits needed to catch the enemy.
    pub enemy_hits_to_catch: u32,
    pub starting_lives: u32,
    /// World scroll speed toward the runner (units/s).
    pub scroll_speed: f32,
    /// Quiet period at round start with no spawns (seconds).
    pub spawn_delay_secs: f32,
    pub obstacle_interval_secs: f32,
    pub item_interval_secs: f32,
    /// Spawn distance ahead of the player.
    pub spawn_distance: f32,
    /// Distance behind the player after which objects are retired.
    pub despawn_margin: f32,
    /// Pickup distance along the travel axis.
    pub pickup_range: f32,
    /// Round duration in seconds.
    pub round_duration_secs: f32,
    /// Score per unit of distance scrolled.
    pub distance_points_per_unit: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            lane_spacing: 2.0,
            lane_change_speed: 5.0,
            collision_threshold: 3.0,
            detection_range: 12.0,
            ground_failsafe_secs: 1.0,
            gravity: -30.0,
            jump_velocity: 10.0,
            ground_y: 0.0,
            throw_duration_secs: 0.5,
            throw_speed: 20.0,
            throw_range: 12.0,
            enemy_hit_range: 3.0,
            invincibility_secs: 1.5,
            hit_suppression: HitSuppression::DeactivateAndInvincible,
            enemy_stagger_secs: 0.75,
            enemy_lead: 8.0,
            enemy_hits_to_catch: 3,
            starting_lives: 3,
            scroll_speed: 12.0,
            spawn_delay_secs: 3.0,
            obstacle_interval_secs: 1.2,
            item_interval_secs: 4.0,
            spawn_distance: 40.0,
            despawn_margin: 5.0,
            pickup_range: 1.5,
            round_duration_secs: 90.0,
            distance_points_per_unit: 0.1,
        }
    }
}

impl RunnerConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        let path = std::env::var("GAPCHASE_RUNNER_CONFIG")
            .unwrap_or_else(|_| "config/runner.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(contents)
    }
}
