use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use gapchase_core::game_trait::EntityId;

use crate::config::RunnerConfig;
use crate::lane::{Lane, Position};

/// A static obstacle occupying one lane. Scrolls toward the runner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub position: Position,
    pub lane: Lane,
    /// Cleared once the obstacle has been hit. Inactive obstacles never collide.
    pub active: bool,
}

/// A throwable item waiting to be collected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemPickup {
    pub id: EntityId,
    pub position: Position,
    pub lane: Lane,
    pub active: bool,
}

/// Shortest cadence the spawner honours, whatever the config says.
const MIN_SPAWN_INTERVAL: f32 = 0.05;

/// What the spawner wants placed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawn {
    Obstacle(Lane),
    Item(Lane),
}

/// Spawn cadence. Lane choice is derived from `seed` and the spawn count, so
/// the whole schedule survives a state round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    pub seed: u64,
    pub elapsed: f32,
    pub obstacle_cooldown: f32,
    pub item_cooldown: f32,
    pub spawn_count: u64,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            elapsed: 0.0,
            obstacle_cooldown: 0.0,
            item_cooldown: 0.0,
            spawn_count: 0,
        }
    }

    /// Whether the opening quiet period is still running.
    pub fn in_spawn_delay(&self, config: &RunnerConfig) -> bool {
        self.elapsed < config.spawn_delay_secs
    }

    /// Advance the cadence timers and return what should appear this tick.
    /// A long tick catches up on every interval it covered. An item never
    /// shares the lane of an obstacle spawned in the same tick while another
    /// lane is free.
    pub fn tick(&mut self, dt: f32, config: &RunnerConfig) -> Vec<Spawn> {
        self.elapsed += dt;
        if self.in_spawn_delay(config) {
            return Vec::new();
        }

        let mut spawns = Vec::new();
        let mut blocked = Vec::new();

        self.obstacle_cooldown -= dt;
        while self.obstacle_cooldown <= 0.0 {
            self.obstacle_cooldown += config.obstacle_interval_secs.max(MIN_SPAWN_INTERVAL);
            let lane = self.pick_lane(&[]);
            blocked.push(lane);
            spawns.push(Spawn::Obstacle(lane));
        }

        self.item_cooldown -= dt;
        while self.item_cooldown <= 0.0 {
            self.item_cooldown += config.item_interval_secs.max(MIN_SPAWN_INTERVAL);
            spawns.push(Spawn::Item(self.pick_lane(&blocked)));
        }

        spawns
    }

    fn pick_lane(&mut self, avoid: &[Lane]) -> Lane {
        let mut rng = StdRng::seed_from_u64(
            self.seed
                .wrapping_add(self.spawn_count.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        );
        self.spawn_count += 1;
        let mut choices: Vec<Lane> = Lane::ALL
            .into_iter()
            .filter(|l| !avoid.contains(l))
            .collect();
        if choices.is_empty() {
            choices = Lane::ALL.to_vec();
        }
        choices[rng.random_range(0..choices.len())]
    }
}
