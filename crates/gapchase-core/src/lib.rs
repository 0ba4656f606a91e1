pub mod diag;
pub mod events;
pub mod game_trait;
pub mod status;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::events::SimEvent;
    use crate::game_trait::{ChaseGame, SessionConfig};

    /// Create a SessionConfig with the given round duration in seconds and a fixed seed.
    pub fn default_config(round_duration_secs: u64) -> SessionConfig {
        SessionConfig {
            round_duration: Duration::from_secs(round_duration_secs),
            seed: 42,
            custom: HashMap::new(),
        }
    }

    /// Run N simulation ticks, returning all accumulated events.
    pub fn run_game_ticks(game: &mut dyn ChaseGame, n: usize, dt: f32) -> Vec<SimEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt));
        }
        all_events
    }

    /// Assert that the game's serialized state differs from `before`.
    pub fn assert_game_state_changed(game: &dyn ChaseGame, before: &[u8]) {
        let after = game.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Game state should have changed after operation"
        );
    }

    // ================================================================
    // Simulation Trait Contract Tests
    // ================================================================
    // Every ChaseGame implementation must pass these. Game crates call them
    // from their own #[cfg(test)] modules with a concrete instance.

    /// After init(), serialize_state() must return non-empty bytes.
    pub fn contract_init_creates_state(game: &mut dyn ChaseGame) {
        game.init(&default_config(90));
        let state = game.serialize_state();
        assert!(
            !state.is_empty(),
            "serialize_state() must return non-empty bytes after init"
        );
    }

    /// apply_input() with valid data followed by update() must change state.
    pub fn contract_apply_input_changes_state(game: &mut dyn ChaseGame, valid_input: &[u8]) {
        let before = game.serialize_state();
        game.apply_input(valid_input);
        game.update(0.1);
        assert_game_state_changed(game, &before);
    }

    /// update() with dt>0 must advance the round timer.
    pub fn contract_update_advances_time(game: &mut dyn ChaseGame) {
        let before = game.serialize_state();
        game.update(1.0);
        let after = game.serialize_state();
        assert_ne!(
            before, after,
            "update(dt>0) must advance simulation state (timer)"
        );
    }

    /// Running update() enough times must eventually reach is_round_complete().
    pub fn contract_round_eventually_completes(game: &mut dyn ChaseGame, max_ticks: usize) {
        for _ in 0..max_ticks {
            game.update(1.0);
            if game.is_round_complete() {
                return;
            }
        }
        assert!(
            game.is_round_complete(),
            "Simulation must complete after {max_ticks} ticks of 1s each"
        );
    }

    /// serialize_state → apply_state roundtrip must be stable.
    pub fn contract_state_roundtrip_preserves(game: &mut dyn ChaseGame) {
        let state_a = game.serialize_state();
        game.apply_state(&state_a);
        let state_b = game.serialize_state();
        game.apply_state(&state_b);
        let state_c = game.serialize_state();
        assert_eq!(
            state_b, state_c,
            "State must be stable after serialize→apply→serialize roundtrip"
        );
    }

    /// pause() must freeze the simulation, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(game: &mut dyn ChaseGame) {
        game.pause();
        let before = game.serialize_state();
        let events = game.update(1.0);
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");
        assert!(events.is_empty(), "No events while paused");

        game.resume();
        game.update(1.0);
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// update() after the round is complete must be a no-op.
    pub fn contract_update_after_complete_is_noop(game: &mut dyn ChaseGame, max_ticks: usize) {
        contract_round_eventually_completes(game, max_ticks);
        let before = game.serialize_state();
        let events = game.update(1.0);
        assert!(events.is_empty(), "No events after round complete");
        assert_eq!(before, game.serialize_state());
        assert!(game.round_result().outcome.is_some());
    }
}
