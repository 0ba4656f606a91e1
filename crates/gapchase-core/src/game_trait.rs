use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::SimEvent;

/// Identifier for a spawned world object (obstacle, pickup, projectile).
pub type EntityId = u32;

/// Core trait every Gap Chase simulation implements.
///
/// The host loop owns timing and input collection; the simulation only
/// advances its own state from the supplied `dt` and never reads the clock.
pub trait ChaseGame: Send + Sync {
    /// Static description of the game.
    fn metadata(&self) -> GameMetadata;

    /// Reset all state for a fresh round.
    fn init(&mut self, config: &SessionConfig);

    /// Advance the simulation by `dt` seconds. Returns every event produced
    /// during this tick, in the order they happened.
    fn update(&mut self, dt: f32) -> Vec<SimEvent>;

    /// Serialize the full simulation state (MessagePack).
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the simulation state with a previously serialized blob.
    fn apply_state(&mut self, state: &[u8]);

    /// Queue an encoded input for the next tick.
    fn apply_input(&mut self, input: &[u8]);

    /// Preferred host tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    fn supports_pause(&self) -> bool {
        true
    }

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_round_complete(&self) -> bool;

    /// Summary of the round so far (final once `is_round_complete`).
    fn round_result(&self) -> RoundResult;
}

/// Game metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub estimated_round_duration: Duration,
}

/// Configuration for a single session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub round_duration: Duration,
    /// Seed for every random decision the simulation makes.
    pub seed: u64,
    pub custom: HashMap<String, serde_json::Value>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            round_duration: Duration::from_secs(90),
            seed: 42,
            custom: HashMap::new(),
        }
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// The player landed enough thrown items on the enemy.
    Caught,
    /// The player ran out of lives.
    OutOfLives,
    /// The round timer ran out with the player still running.
    Survived,
}

/// Score summary for a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub score: i32,
    pub outcome: Option<RoundOutcome>,
    pub distance: f32,
    pub enemy_hits: u32,
    pub obstacle_hits: u32,
}

/// Generates the 5 boilerplate `ChaseGame` methods shared by every simulation:
/// `serialize_state`, `apply_state`, `pause`, `resume`, `is_round_complete`.
///
/// Requires the implementing struct to have `state: $StateType` and `paused: bool` fields,
/// and `$StateType` to have a `round_complete: bool` field.
#[macro_export]
macro_rules! chase_game_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("simulation state serialization must succeed")
        }

        fn apply_state(&mut self, state: &[u8]) {
            match rmp_serde::from_slice::<$StateType>(state) {
                Ok(s) => self.state = s,
                Err(e) => tracing::debug!(error = %e, "Dropped malformed state blob"),
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_round_complete(&self) -> bool {
            self.state.round_complete
        }
    };
}
