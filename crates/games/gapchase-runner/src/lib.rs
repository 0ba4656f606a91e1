pub mod collision;
pub mod config;
pub mod enemy;
pub mod error;
pub mod lane;
pub mod runner;
pub mod scoring;
pub mod spawn;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use gapchase_core::chase_game_boilerplate;
use gapchase_core::diag::DiagnosticLog;
use gapchase_core::events::{CollisionEvent, EnemyHitEvent, EntityKind, SimEvent, SoundCue};
use gapchase_core::game_trait::{
    ChaseGame, EntityId, GameMetadata, RoundOutcome, RoundResult, SessionConfig,
};

use config::{HitSuppression, RunnerConfig};
use enemy::{EnemyState, EnemyStatus};
use error::ActionError;
use lane::{Lane, LaneShift, Position, lane_x};
use runner::RunnerState;
use spawn::{ItemPickup, Obstacle, Spawn, Spawner};

/// A thrown item in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub position: Position,
    /// Lane the item was thrown from.
    pub lane: Lane,
    /// Distance covered since launch.
    pub travelled: f32,
}

/// Input from the player. Flags accumulate until the next tick consumes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerInput {
    pub lane_shift: LaneShift,
    pub jump: bool,
    pub throw: bool,
}

/// Complete simulation state. This is what `serialize_state` ships and what
/// the debug interface exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaseState {
    pub player: RunnerState,
    pub enemy: EnemyState,
    pub obstacles: Vec<Obstacle>,
    pub items: Vec<ItemPickup>,
    pub projectiles: Vec<Projectile>,
    pub spawner: Spawner,
    pub next_entity_id: EntityId,
    pub round_timer: f32,
    pub round_duration: f32,
    pub round_complete: bool,
    pub outcome: Option<RoundOutcome>,
    /// Distance scrolled this round.
    pub distance: f32,
    pub obstacle_hits: u32,
}

impl ChaseState {
    pub fn new(config: &RunnerConfig, seed: u64, round_duration: f32) -> Self {
        Self {
            player: RunnerState::new(Lane::CENTER, 0.0, config),
            enemy: EnemyState::new(Lane::CENTER, -config.enemy_lead, config),
            obstacles: Vec::new(),
            items: Vec::new(),
            projectiles: Vec::new(),
            spawner: Spawner::new(seed),
            next_entity_id: 1,
            round_timer: 0.0,
            round_duration,
            round_complete: false,
            outcome: None,
            distance: 0.0,
            obstacle_hits: 0,
        }
    }

    pub fn allocate_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = self.next_entity_id.wrapping_add(1);
        id
    }

    pub fn obstacle(&self, id: EntityId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    /// Place an obstacle in `lane` at travel position `z`. Returns its id.
    pub fn spawn_obstacle(&mut self, lane: Lane, z: f32, config: &RunnerConfig) -> EntityId {
        let id = self.allocate_id();
        self.obstacles.push(Obstacle {
            id,
            position: Position::new(lane_x(lane, config.lane_spacing), config.ground_y, z),
            lane,
            active: true,
        });
        id
    }

    /// Place an item pickup in `lane` at travel position `z`. Returns its id.
    pub fn spawn_item(&mut self, lane: Lane, z: f32, config: &RunnerConfig) -> EntityId {
        let id = self.allocate_id();
        self.items.push(ItemPickup {
            id,
            position: Position::new(lane_x(lane, config.lane_spacing), config.ground_y, z),
            lane,
            active: true,
        });
        id
    }
}

/// The Gap Chase lane runner.
pub struct GapChase {
    state: ChaseState,
    pending_input: Option<RunnerInput>,
    paused: bool,
    game_config: RunnerConfig,
    log: DiagnosticLog,
}

impl GapChase {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::load())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            state: ChaseState::new(&config, 0, config.round_duration_secs),
            pending_input: None,
            paused: false,
            game_config: config,
            log: DiagnosticLog::default(),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.game_config
    }

    /// Line-oriented view of every event emitted so far.
    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.log
    }

    /// Read access to the full simulation state.
    pub fn debug(&self) -> &ChaseState {
        &self.state
    }

    /// Write access to the full simulation state, for harnesses that need to
    /// stage a scenario directly.
    pub fn debug_mut(&mut self) -> &mut ChaseState {
        &mut self.state
    }

    pub fn debug_snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.state)
    }

    /// Evaluate collisions now, outside the tick. Applies penalties and
    /// returns the collisions that were handled.
    pub fn check_collisions(&mut self) -> Vec<CollisionEvent> {
        if self.state.round_complete {
            return Vec::new();
        }
        let mut events = Vec::new();
        let hits = self.resolve_collisions(&mut events);
        self.check_round_end(&mut events);
        self.emit(&events);
        hits
    }

    /// Throw the held item. Returns the projectile id.
    pub fn start_throw(&mut self) -> Result<EntityId, ActionError> {
        self.run_action(Self::throw_item)
    }

    pub fn jump(&mut self) -> Result<(), ActionError> {
        self.run_action(|game, _| game.state.player.jump(&game.game_config))
    }

    /// Start a player lane change. Returns the new target lane.
    pub fn shift_lane(&mut self, shift: LaneShift) -> Result<Lane, ActionError> {
        self.run_action(|game, events| game.change_lane(shift, events))
    }

    /// Nearest obstacle ahead of the enemy in its current lane.
    pub fn check_obstacle_ahead(&self) -> Option<&Obstacle> {
        enemy::check_obstacle_ahead(&self.state.enemy, &self.state.obstacles, &self.game_config)
    }

    /// Steer the enemy away from `obstacle`. Returns the lane the enemy is now
    /// heading for, or `None` when no lane is free or an in-flight change
    /// cannot be redirected there (the target lane is left alone).
    pub fn avoid_obstacle(&mut self, obstacle: &Obstacle) -> Option<Lane> {
        let mut events = Vec::new();
        let lane = self.steer_enemy(obstacle, &mut events);
        self.emit(&events);
        lane
    }

    /// Enemy jumping is disabled. Always fails.
    pub fn enemy_jump(&mut self) -> Result<(), ActionError> {
        let result = self.state.enemy.jump();
        if let Err(e) = &result {
            tracing::debug!(error = %e, "Enemy jump rejected");
        }
        result
    }

    fn run_action<T>(
        &mut self,
        action: impl FnOnce(&mut Self, &mut Vec<SimEvent>) -> Result<T, ActionError>,
    ) -> Result<T, ActionError> {
        if self.state.round_complete {
            return Err(ActionError::RoundComplete);
        }
        let mut events = Vec::new();
        let result = action(self, &mut events);
        if let Err(e) = &result {
            tracing::debug!(error = %e, "Action rejected");
        }
        self.emit(&events);
        result
    }

    fn emit(&mut self, events: &[SimEvent]) {
        self.log.record_all(events, self.state.round_timer);
    }

    fn throw_item(&mut self, events: &mut Vec<SimEvent>) -> Result<EntityId, ActionError> {
        let config = &self.game_config;
        self.state.player.start_throw(config)?;

        let lane = self.state.player.current_lane(config);
        let id = self.state.allocate_id();
        let origin = self.state.player.position;
        self.state.projectiles.push(Projectile {
            id,
            position: Position::new(lane_x(lane, config.lane_spacing), origin.y, origin.z),
            lane,
            travelled: 0.0,
        });
        events.push(SimEvent::ThrowStarted {
            projectile_id: id,
            lane: lane.index(),
        });
        events.push(SimEvent::Sound {
            cue: SoundCue::Throw,
        });
        Ok(id)
    }

    fn change_lane(
        &mut self,
        shift: LaneShift,
        events: &mut Vec<SimEvent>,
    ) -> Result<Lane, ActionError> {
        let (from, to) = self.state.player.shift_lane(shift, &self.game_config)?;
        events.push(SimEvent::LaneChange {
            entity: EntityKind::Player,
            from: from.index(),
            to: to.index(),
        });
        Ok(to)
    }

    fn apply_pending_input(&mut self, events: &mut Vec<SimEvent>) {
        let Some(input) = self.pending_input.take() else {
            return;
        };
        if input.lane_shift != LaneShift::None
            && let Err(e) = self.change_lane(input.lane_shift, events)
        {
            tracing::debug!(error = %e, "Lane shift input rejected");
        }
        if input.jump
            && let Err(e) = self.state.player.jump(&self.game_config)
        {
            tracing::debug!(error = %e, "Jump input rejected");
        }
        if input.throw
            && let Err(e) = self.throw_item(events)
        {
            tracing::debug!(error = %e, "Throw input rejected");
        }
    }

    fn steer_enemy(&mut self, threat: &Obstacle, events: &mut Vec<SimEvent>) -> Option<Lane> {
        let config = &self.game_config;
        let enemy = &mut self.state.enemy;
        let Some(lane) = enemy::choose_escape_lane(enemy, threat, &self.state.obstacles, config)
        else {
            tracing::debug!(obstacle_id = threat.id, "Enemy has no free lane");
            return None;
        };
        if enemy.target_lane() == lane {
            return Some(lane);
        }
        let from = enemy.current_lane(config);
        if !enemy.set_target_lane(lane) {
            tracing::debug!(lane = lane.index(), "Enemy cannot retarget mid-change");
            return None;
        }
        events.push(SimEvent::LaneChange {
            entity: EntityKind::Enemy,
            from: from.index(),
            to: lane.index(),
        });
        Some(lane)
    }

    fn run_enemy_avoidance(&mut self, events: &mut Vec<SimEvent>) {
        let enemy = &self.state.enemy;
        if enemy.motion.is_transitioning() || enemy.is_staggered() {
            return;
        }
        let Some(threat) =
            enemy::check_obstacle_ahead(enemy, &self.state.obstacles, &self.game_config).copied()
        else {
            return;
        };
        self.steer_enemy(&threat, events);
    }

    fn scroll_and_spawn(&mut self, dt: f32, events: &mut Vec<SimEvent>) {
        let shift = self.game_config.scroll_speed * dt;
        for obstacle in &mut self.state.obstacles {
            obstacle.position.z += shift;
        }
        for item in &mut self.state.items {
            item.position.z += shift;
        }
        self.state.distance += shift;

        let spawn_z = self.state.player.position.z - self.game_config.spawn_distance;
        for spawn in self.state.spawner.tick(dt, &self.game_config) {
            match spawn {
                Spawn::Obstacle(lane) => {
                    let id = self.state.spawn_obstacle(lane, spawn_z, &self.game_config);
                    events.push(SimEvent::ObstacleSpawned {
                        obstacle_id: id,
                        lane: lane.index(),
                    });
                },
                Spawn::Item(lane) => {
                    self.state.spawn_item(lane, spawn_z, &self.game_config);
                },
            }
        }
    }

    fn advance_projectiles(&mut self, dt: f32, events: &mut Vec<SimEvent>) {
        let config = &self.game_config;
        let step = config.throw_speed * dt;
        let mut in_flight = Vec::with_capacity(self.state.projectiles.len());

        for mut projectile in std::mem::take(&mut self.state.projectiles) {
            projectile.position.z -= step;
            projectile.travelled += step;

            if let Some(distance) = collision::check_projectile_hit(
                &projectile.position,
                &self.state.enemy.position,
                config,
            ) {
                self.state.enemy.hits_taken += 1;
                tracing::debug!(
                    projectile_id = projectile.id,
                    hits = self.state.enemy.hits_taken,
                    "Enemy hit"
                );
                events.push(SimEvent::EnemyHit(EnemyHitEvent {
                    projectile_id: projectile.id,
                    distance,
                    total_hits: self.state.enemy.hits_taken,
                }));
                continue;
            }

            if projectile.travelled >= config.throw_range {
                tracing::trace!(projectile_id = projectile.id, "Projectile expired");
                continue;
            }
            in_flight.push(projectile);
        }

        self.state.projectiles = in_flight;
    }

    fn resolve_collisions(&mut self, events: &mut Vec<SimEvent>) -> Vec<CollisionEvent> {
        let config = &self.game_config;
        let state = &mut self.state;

        let mut hits = Vec::new();
        if !state.player.is_invincible() {
            hits.extend(collision::check_obstacle_hits(
                EntityKind::Player,
                &state.player.position,
                &state.obstacles,
                config,
            ));
        }
        hits.extend(collision::check_obstacle_hits(
            EntityKind::Enemy,
            &state.enemy.position,
            &state.obstacles,
            config,
        ));

        let mut handled = Vec::with_capacity(hits.len());
        for hit in hits {
            if hit.entity == EntityKind::Player && state.player.is_invincible() {
                continue;
            }
            let Some(obstacle) = state
                .obstacles
                .iter_mut()
                .find(|o| o.id == hit.obstacle_id && o.active)
            else {
                continue;
            };
            obstacle.active = false;

            match hit.entity {
                EntityKind::Player => {
                    state.player.lives = state.player.lives.saturating_sub(1);
                    state.obstacle_hits += 1;
                    if config.hit_suppression == HitSuppression::DeactivateAndInvincible {
                        state.player.set_invincible(config.invincibility_secs);
                    }
                    tracing::debug!(
                        obstacle_id = hit.obstacle_id,
                        lives = state.player.lives,
                        "Player hit obstacle"
                    );
                    events.push(SimEvent::Collision(hit.clone()));
                    events.push(SimEvent::Sound { cue: SoundCue::Hit });
                },
                EntityKind::Enemy => {
                    state
                        .enemy
                        .statuses
                        .apply(EnemyStatus::Staggered, config.enemy_stagger_secs);
                    tracing::debug!(obstacle_id = hit.obstacle_id, "Enemy hit obstacle");
                    events.push(SimEvent::Collision(hit.clone()));
                },
            }
            handled.push(hit);
        }
        handled
    }

    fn collect_pickups(&mut self, events: &mut Vec<SimEvent>) {
        if self.state.player.has_item {
            return;
        }
        let Some(index) = collision::find_pickup(
            &self.state.player.position,
            &self.state.items,
            &self.game_config,
        ) else {
            return;
        };
        let item = &mut self.state.items[index];
        item.active = false;
        self.state.player.has_item = true;
        events.push(SimEvent::ItemCollected { item_id: item.id });
        events.push(SimEvent::Sound {
            cue: SoundCue::Pickup,
        });
    }

    fn retire_passed(&mut self, events: &mut Vec<SimEvent>) {
        let limit = self.state.player.position.z + self.game_config.despawn_margin;
        self.state.obstacles.retain(|o| {
            if o.position.z > limit {
                events.push(SimEvent::ObstacleRetired {
                    obstacle_id: o.id,
                    passed: o.active,
                });
                false
            } else {
                true
            }
        });
        self.state
            .items
            .retain(|i| i.active && i.position.z <= limit);
    }

    /// Number of passes needed so no body moves further than the tightest
    /// contact window in one pass. Sampled contact checks cannot skip past a
    /// window that is at least as wide as the step.
    fn substep_count(&self, dt: f32) -> u32 {
        let config = &self.game_config;
        let window = config
            .collision_threshold
            .min(config.enemy_hit_range)
            .min(config.pickup_range);
        let speed = config.scroll_speed.abs().max(config.throw_speed.abs());
        if window <= 0.0 || speed <= 0.0 || dt <= 0.0 {
            return 1;
        }
        ((dt * speed / window).ceil() as u32).max(1)
    }

    /// One fixed slice of the tick.
    fn step(&mut self, dt: f32, events: &mut Vec<SimEvent>) {
        self.state.round_timer += dt;

        if let Some(grounded_for) = self.state.player.tick(dt, &self.game_config) {
            events.push(SimEvent::JumpFailsafe { grounded_for });
        }
        self.state.enemy.tick(dt, &self.game_config);

        self.scroll_and_spawn(dt, events);
        self.run_enemy_avoidance(events);
        self.advance_projectiles(dt, events);
        self.resolve_collisions(events);
        self.collect_pickups(events);
        self.retire_passed(events);
        self.check_round_end(events);
    }

    fn check_round_end(&mut self, events: &mut Vec<SimEvent>) {
        if self.state.round_complete {
            return;
        }
        let outcome = if self.state.player.lives == 0 {
            RoundOutcome::OutOfLives
        } else if self.state.enemy.hits_taken >= self.game_config.enemy_hits_to_catch {
            RoundOutcome::Caught
        } else if self.state.round_timer >= self.state.round_duration {
            RoundOutcome::Survived
        } else {
            return;
        };
        self.state.round_complete = true;
        self.state.outcome = Some(outcome);
        tracing::info!(
            ?outcome,
            distance = self.state.distance,
            enemy_hits = self.state.enemy.hits_taken,
            "Round complete"
        );
        events.push(SimEvent::RoundComplete { outcome });
    }
}

impl Default for GapChase {
    fn default() -> Self {
        Self::with_config(RunnerConfig::default())
    }
}

impl ChaseGame for GapChase {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Gap Chase".to_string(),
            description: "Dodge obstacles across three lanes and pelt the fleeing thief."
                .to_string(),
            estimated_round_duration: Duration::from_secs(
                self.game_config.round_duration_secs.max(0.0) as u64,
            ),
        }
    }

    fn init(&mut self, config: &SessionConfig) {
        let round_duration = match config.round_duration.as_secs_f32() {
            d if d > 0.0 => d,
            _ => self.game_config.round_duration_secs,
        };
        self.state = ChaseState::new(&self.game_config, config.seed, round_duration);
        self.pending_input = None;
        self.paused = false;
        self.log.clear();
        tracing::info!(seed = config.seed, round_duration, "Round started");
    }

    fn update(&mut self, dt: f32) -> Vec<SimEvent> {
        if self.paused || self.state.round_complete {
            return Vec::new();
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let mut events = Vec::new();
        self.apply_pending_input(&mut events);

        let steps = self.substep_count(dt);
        let step_dt = dt / steps as f32;
        for _ in 0..steps {
            self.step(step_dt, &mut events);
            if self.state.round_complete {
                break;
            }
        }

        self.emit(&events);
        events
    }

    chase_game_boilerplate!(state_type: ChaseState);

    fn apply_input(&mut self, input: &[u8]) {
        match rmp_serde::from_slice::<RunnerInput>(input) {
            Err(e) => {
                tracing::debug!(error = %e, "Dropped malformed runner input");
            },
            Ok(ri) => {
                // Accumulate transient flags across frames
                if let Some(existing) = self.pending_input.as_mut() {
                    if ri.lane_shift != LaneShift::None {
                        existing.lane_shift = ri.lane_shift;
                    }
                    existing.jump |= ri.jump;
                    existing.throw |= ri.throw;
                } else {
                    self.pending_input = Some(ri);
                }
            },
        }
    }

    fn round_result(&self) -> RoundResult {
        RoundResult {
            score: scoring::calculate_score(
                self.state.distance,
                self.game_config.distance_points_per_unit,
                self.state.enemy.hits_taken,
                self.state.obstacle_hits,
                self.state.outcome == Some(RoundOutcome::Caught),
            ),
            outcome: self.state.outcome,
            distance: self.state.distance,
            enemy_hits: self.state.enemy.hits_taken,
            obstacle_hits: self.state.obstacle_hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapchase_core::events::{
        ENEMY_HIT_MARKER, ENEMY_HIT_OBSTACLE_MARKER, HIT_SOUND_MARKER, ITEM_COLLECTED_MARKER,
        PLAYER_HIT_MARKER,
    };
    use gapchase_core::test_helpers::{default_config, run_game_ticks};
    use lane::LaneMotion;

    fn new_game() -> GapChase {
        let mut game = GapChase::default();
        game.init(&default_config(90));
        game
    }

    fn encode(input: &RunnerInput) -> Vec<u8> {
        rmp_serde::to_vec(input).unwrap()
    }

    #[test]
    fn init_places_runners() {
        let game = new_game();
        let state = game.debug();
        assert_eq!(state.player.position.x, 0.0);
        assert_eq!(state.player.current_lane(game.config()), Lane::CENTER);
        assert_eq!(state.enemy.position.z, -game.config().enemy_lead);
        assert_eq!(state.player.lives, game.config().starting_lives);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn player_hit_inside_threshold_logs_marker_and_sound() {
        let mut game = new_game();
        let config = game.config().clone();
        let id = game.debug_mut().spawn_obstacle(Lane::CENTER, -2.5, &config);

        let hits = game.check_collisions();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, EntityKind::Player);
        assert_eq!(hits[0].obstacle_id, id);
        assert!(game.log().contains(PLAYER_HIT_MARKER));
        assert!(game.log().contains(HIT_SOUND_MARKER));
        assert_eq!(game.debug().player.lives, config.starting_lives - 1);
        assert!(!game.debug().obstacle(id).unwrap().active);
    }

    #[test]
    fn handled_obstacle_never_retriggers() {
        let mut game = new_game();
        let config = game.config().clone();
        game.debug_mut().spawn_obstacle(Lane::CENTER, -1.0, &config);
        assert_eq!(game.check_collisions().len(), 1);
        game.debug_mut().player.clear_invincible();
        assert!(game.check_collisions().is_empty());
        assert_eq!(game.log().count(PLAYER_HIT_MARKER), 1);
    }

    #[test]
    fn deactivate_only_mode_still_suppresses_retrigger() {
        let mut game = GapChase::with_config(RunnerConfig {
            hit_suppression: HitSuppression::Deactivate,
            ..RunnerConfig::default()
        });
        game.init(&default_config(90));
        let config = game.config().clone();
        game.debug_mut().spawn_obstacle(Lane::CENTER, -1.0, &config);
        game.check_collisions();
        assert!(!game.debug().player.is_invincible());
        assert!(game.check_collisions().is_empty());
    }

    #[test]
    fn threshold_boundary_does_not_collide() {
        let mut game = new_game();
        let config = game.config().clone();
        game.debug_mut().spawn_obstacle(Lane::CENTER, -3.0, &config);
        assert!(game.check_collisions().is_empty());
        assert!(!game.log().contains(PLAYER_HIT_MARKER));
    }

    #[test]
    fn collision_ignores_has_thrown() {
        for has_thrown in [false, true] {
            let mut game = new_game();
            let config = game.config().clone();
            game.debug_mut().player.has_thrown = has_thrown;
            game.debug_mut().spawn_obstacle(Lane::CENTER, 2.0, &config);
            assert_eq!(game.check_collisions().len(), 1, "has_thrown = {has_thrown}");
        }
    }

    #[test]
    fn mid_transition_uses_physical_lane() {
        let mut game = new_game();
        let config = game.config().clone();
        {
            let state = game.debug_mut();
            state.player.motion = LaneMotion::Transitioning {
                from: Lane::CENTER,
                to: Lane::RIGHT,
                progress: 0.0,
            };
            state.player.position.x = 0.0;
            state.spawn_obstacle(Lane::RIGHT, -1.0, &config);
        }
        assert!(game.check_collisions().is_empty());

        let id = game.debug_mut().spawn_obstacle(Lane::CENTER, -1.0, &config);
        let hits = game.check_collisions();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].obstacle_id, id);
    }

    #[test]
    fn invincible_player_is_skipped() {
        let mut game = new_game();
        let config = game.config().clone();
        game.debug_mut().player.set_invincible(1.0);
        let id = game.debug_mut().spawn_obstacle(Lane::CENTER, -1.0, &config);
        assert!(game.check_collisions().is_empty());
        assert!(game.debug().obstacle(id).unwrap().active);
    }

    #[test]
    fn enemy_detects_and_avoids_obstacle() {
        let mut game = new_game();
        let config = game.config().clone();
        let enemy_z = game.debug().enemy.position.z;
        let id = game.debug_mut().spawn_obstacle(Lane::CENTER, enemy_z - 10.0, &config);

        let threat = *game.check_obstacle_ahead().unwrap();
        assert_eq!(threat.id, id);
        assert_eq!(game.avoid_obstacle(&threat), Some(Lane::LEFT));
        assert_ne!(game.debug().enemy.target_lane(), Lane::CENTER);
    }

    #[test]
    fn avoid_reports_lane_already_being_taken() {
        let mut game = new_game();
        let config = game.config().clone();
        let enemy_z = game.debug().enemy.position.z;
        game.debug_mut().spawn_obstacle(Lane::CENTER, enemy_z - 10.0, &config);

        let threat = *game.check_obstacle_ahead().unwrap();
        assert_eq!(game.avoid_obstacle(&threat), Some(Lane::LEFT));
        let lines_before = game.log().lines().len();
        assert_eq!(game.avoid_obstacle(&threat), Some(Lane::LEFT));
        assert_eq!(game.log().lines().len(), lines_before);
        assert_eq!(game.debug().enemy.target_lane(), Lane::LEFT);
    }

    #[test]
    fn enemy_ignores_obstacle_beyond_range() {
        let mut game = new_game();
        let config = game.config().clone();
        let enemy_z = game.debug().enemy.position.z;
        game.debug_mut().spawn_obstacle(Lane::CENTER, enemy_z - 12.5, &config);
        assert!(game.check_obstacle_ahead().is_none());
    }

    #[test]
    fn avoid_with_every_lane_blocked_keeps_target() {
        let mut game = new_game();
        let config = game.config().clone();
        let enemy_z = game.debug().enemy.position.z;
        for lane in Lane::ALL {
            game.debug_mut().spawn_obstacle(lane, enemy_z - 5.0, &config);
        }
        let threat = *game.check_obstacle_ahead().unwrap();
        assert_eq!(game.avoid_obstacle(&threat), None);
        assert_eq!(game.debug().enemy.target_lane(), Lane::CENTER);
    }

    #[test]
    fn enemy_avoids_automatically_during_update() {
        let mut game = new_game();
        let config = game.config().clone();
        let enemy_z = game.debug().enemy.position.z;
        game.debug_mut().spawn_obstacle(Lane::CENTER, enemy_z - 10.0, &config);
        let events = game.update(1.0 / 60.0);
        assert_eq!(game.debug().enemy.target_lane(), Lane::LEFT);
        assert!(events.iter().any(|e| matches!(
            e,
            SimEvent::LaneChange {
                entity: EntityKind::Enemy,
                ..
            }
        )));
    }

    #[test]
    fn enemy_running_into_obstacle_is_staggered() {
        let mut game = new_game();
        let config = game.config().clone();
        let enemy_z = game.debug().enemy.position.z;
        game.debug_mut().spawn_obstacle(Lane::CENTER, enemy_z - 1.0, &config);
        game.update(1.0 / 60.0);
        assert!(game.debug().enemy.is_staggered());
        assert!(game.log().contains(ENEMY_HIT_OBSTACLE_MARKER));
        assert!(!game.log().contains(PLAYER_HIT_MARKER));
    }

    #[test]
    fn enemy_jump_is_inert() {
        let mut game = new_game();
        assert_eq!(game.enemy_jump(), Err(ActionError::JumpDisabled));
        assert!(!game.debug().enemy.is_jumping);
    }

    #[test]
    fn throw_without_item_changes_nothing() {
        let mut game = new_game();
        let before = game.serialize_state();
        assert_eq!(game.start_throw(), Err(ActionError::NoItem));
        assert_eq!(before, game.serialize_state());
    }

    #[test]
    fn thrown_item_hits_enemy_in_same_lane() {
        let mut game = new_game();
        game.debug_mut().player.has_item = true;
        game.start_throw().unwrap();
        assert!(game.debug().player.has_thrown);
        assert!(!game.debug().player.has_item);

        run_game_ticks(&mut game, 30, 1.0 / 60.0);
        assert_eq!(game.debug().enemy.hits_taken, 1);
        assert!(game.debug().projectiles.is_empty());
        assert!(game.log().contains(ENEMY_HIT_MARKER));
    }

    #[test]
    fn thrown_item_misses_enemy_in_other_lane_and_expires() {
        let mut game = new_game();
        let config = game.config().clone();
        {
            let state = game.debug_mut();
            state.enemy.motion = LaneMotion::Stationary(Lane::RIGHT);
            state.enemy.position.x = lane_x(Lane::RIGHT, config.lane_spacing);
            state.player.has_item = true;
        }
        game.start_throw().unwrap();
        run_game_ticks(&mut game, 60, 1.0 / 60.0);
        assert_eq!(game.debug().enemy.hits_taken, 0);
        assert!(game.debug().projectiles.is_empty());
    }

    #[test]
    fn long_frames_do_not_skip_obstacle_contact() {
        let mut game = new_game();
        let config = game.config().clone();
        let id = {
            let state = game.debug_mut();
            state.player.motion = LaneMotion::Stationary(Lane::LEFT);
            state.player.position.x = lane_x(Lane::LEFT, config.lane_spacing);
            state.spawn_obstacle(Lane::LEFT, -config.collision_threshold, &config)
        };

        let events = run_game_ticks(&mut game, 3, 0.5);
        assert_eq!(game.log().count(PLAYER_HIT_MARKER), 1);
        assert_eq!(game.debug().player.lives, config.starting_lives - 1);
        assert!(!events.contains(&SimEvent::ObstacleRetired {
            obstacle_id: id,
            passed: true,
        }));
    }

    #[test]
    fn long_frames_do_not_skip_projectile_contact() {
        let mut game = new_game();
        game.debug_mut().player.has_item = true;
        game.start_throw().unwrap();

        run_game_ticks(&mut game, 4, 0.55);
        assert_eq!(game.debug().enemy.hits_taken, 1);
        assert!(game.log().contains(ENEMY_HIT_MARKER));
    }

    #[test]
    fn long_frame_is_split_into_short_passes() {
        let game = new_game();
        let config = game.config();
        assert_eq!(game.substep_count(1.0 / 60.0), 1);
        assert_eq!(game.substep_count(0.0), 1);
        let steps = game.substep_count(0.55);
        let fastest = config.scroll_speed.max(config.throw_speed);
        assert!(0.55 / steps as f32 * fastest <= config.pickup_range);
    }

    #[test]
    fn failsafe_clears_stuck_jump_flag_through_update() {
        let mut game = new_game();
        game.debug_mut().player.is_jumping = true;
        let events = run_game_ticks(&mut game, 11, 0.1);
        assert!(!game.debug().player.is_jumping);
        assert_eq!(game.debug().player.ground_timer, 0.0);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, SimEvent::JumpFailsafe { .. }))
        );
    }

    #[test]
    fn pickup_grants_item() {
        let mut game = new_game();
        let config = game.config().clone();
        game.debug_mut().spawn_item(Lane::CENTER, -0.5, &config);
        game.update(1.0 / 60.0);
        assert!(game.debug().player.has_item);
        assert!(game.log().contains(ITEM_COLLECTED_MARKER));
        assert!(game.debug().items.is_empty());
    }

    #[test]
    fn no_spawns_during_opening_delay() {
        let mut game = new_game();
        let events = run_game_ticks(&mut game, 29, 0.1);
        assert!(game.debug().obstacles.is_empty());
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, SimEvent::ObstacleSpawned { .. }))
        );
        run_game_ticks(&mut game, 3, 0.1);
        assert!(!game.debug().obstacles.is_empty());
    }

    #[test]
    fn passed_obstacle_is_retired() {
        let mut game = new_game();
        let config = game.config().clone();
        let id = game.debug_mut().spawn_obstacle(Lane::LEFT, 4.9, &config);
        let events = game.update(0.1);
        assert!(game.debug().obstacle(id).is_none());
        assert!(events.contains(&SimEvent::ObstacleRetired {
            obstacle_id: id,
            passed: true,
        }));
    }

    #[test]
    fn last_life_ends_round() {
        let mut game = new_game();
        let config = game.config().clone();
        game.debug_mut().player.lives = 1;
        game.debug_mut().spawn_obstacle(Lane::CENTER, -1.0, &config);
        let events = game.update(1.0 / 60.0);
        assert!(game.is_round_complete());
        assert_eq!(game.round_result().outcome, Some(RoundOutcome::OutOfLives));
        assert!(events.contains(&SimEvent::RoundComplete {
            outcome: RoundOutcome::OutOfLives,
        }));
    }

    #[test]
    fn enough_hits_catch_the_enemy() {
        let mut game = new_game();
        game.debug_mut().enemy.hits_taken = game.config().enemy_hits_to_catch;
        game.update(1.0 / 60.0);
        let result = game.round_result();
        assert_eq!(result.outcome, Some(RoundOutcome::Caught));
        assert!(result.score >= scoring::CATCH_BONUS);
    }

    #[test]
    fn timer_expiry_survives() {
        let mut game = GapChase::default();
        game.init(&default_config(1));
        run_game_ticks(&mut game, 11, 0.1);
        assert_eq!(game.round_result().outcome, Some(RoundOutcome::Survived));
    }

    #[test]
    fn actions_rejected_after_round_complete() {
        let mut game = new_game();
        game.debug_mut().round_complete = true;
        assert_eq!(game.jump(), Err(ActionError::RoundComplete));
        assert!(game.check_collisions().is_empty());
    }

    #[test]
    fn lane_input_moves_player() {
        let mut game = new_game();
        game.apply_input(&encode(&RunnerInput {
            lane_shift: LaneShift::Left,
            ..RunnerInput::default()
        }));
        run_game_ticks(&mut game, 20, 1.0 / 60.0);
        let config = game.config().clone();
        assert_eq!(game.debug().player.current_lane(&config), Lane::LEFT);
        assert_eq!(game.debug().player.position.x, -config.lane_spacing);
    }

    #[test]
    fn debug_snapshot_exposes_state() {
        let mut game = new_game();
        let config = game.config().clone();
        game.debug_mut().spawn_obstacle(Lane::RIGHT, -20.0, &config);
        let json = game.debug_snapshot_json().unwrap();
        assert!(json.contains("ground_timer"));
        assert!(json.contains("obstacles"));
        assert!(json.contains("\"active\": true"));
    }

    // ================================================================
    // Simulation Trait Contract Tests
    // ================================================================

    #[test]
    fn contract_init_creates_state() {
        let mut game = GapChase::default();
        gapchase_core::test_helpers::contract_init_creates_state(&mut game);
    }

    #[test]
    fn contract_apply_input_changes_state() {
        let mut game = new_game();
        let data = encode(&RunnerInput {
            lane_shift: LaneShift::Right,
            jump: true,
            throw: false,
        });
        gapchase_core::test_helpers::contract_apply_input_changes_state(&mut game, &data);
    }

    #[test]
    fn contract_update_advances_time() {
        let mut game = new_game();
        gapchase_core::test_helpers::contract_update_advances_time(&mut game);
    }

    #[test]
    fn contract_round_eventually_completes() {
        let mut game = GapChase::default();
        game.init(&default_config(30));
        gapchase_core::test_helpers::contract_round_eventually_completes(&mut game, 200);
    }

    #[test]
    fn contract_state_roundtrip_preserves() {
        let mut game = new_game();
        run_game_ticks(&mut game, 50, 0.1);
        gapchase_core::test_helpers::contract_state_roundtrip_preserves(&mut game);
    }

    #[test]
    fn contract_pause_stops_updates() {
        let mut game = new_game();
        gapchase_core::test_helpers::contract_pause_stops_updates(&mut game);
    }

    #[test]
    fn contract_update_after_complete_is_noop() {
        let mut game = GapChase::default();
        game.init(&default_config(10));
        gapchase_core::test_helpers::contract_update_after_complete_is_noop(&mut game, 200);
    }

    // ================================================================
    // Input edge cases
    // ================================================================

    #[test]
    fn apply_input_garbage_no_panic() {
        let mut game = new_game();
        game.apply_input(&[0xFF, 0xFE, 0x00, 0x01, 0xAB, 0xCD]);
        game.update(0.05);
        assert!(game.pending_input.is_none());
    }

    #[test]
    fn apply_state_truncated_no_panic() {
        let mut game = new_game();
        run_game_ticks(&mut game, 10, 0.1);
        let before = game.debug().clone();
        let state = game.serialize_state();
        game.apply_state(&state[..state.len() / 2]);
        assert_eq!(game.debug(), &before);
    }

    #[test]
    fn lane_shift_not_lost_across_overwrites() {
        let mut game = new_game();
        game.apply_input(&encode(&RunnerInput {
            lane_shift: LaneShift::Left,
            ..RunnerInput::default()
        }));
        game.apply_input(&encode(&RunnerInput {
            jump: true,
            ..RunnerInput::default()
        }));
        let pending = game.pending_input.as_ref().unwrap();
        assert_eq!(pending.lane_shift, LaneShift::Left);
        assert!(pending.jump);
    }

    #[test]
    fn double_pause_single_resume() {
        let mut game = new_game();
        game.pause();
        game.pause();
        game.resume();
        let timer_before = game.debug().round_timer;
        game.update(0.05);
        assert!(game.debug().round_timer > timer_before);
    }

    #[test]
    fn non_finite_dt_is_ignored() {
        let mut game = new_game();
        game.update(f32::NAN);
        game.update(f32::INFINITY);
        assert_eq!(game.debug().round_timer, 0.0);
    }
}
