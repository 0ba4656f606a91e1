use serde::{Deserialize, Serialize};

use crate::game_trait::{EntityId, RoundOutcome};

/// Marker carried by every player/obstacle collision line.
pub const PLAYER_HIT_MARKER: &str = "Player hit obstacle";
/// Marker carried by every enemy/obstacle collision line.
pub const ENEMY_HIT_OBSTACLE_MARKER: &str = "Enemy hit obstacle";
/// Marker carried when a thrown item connects with the enemy.
pub const ENEMY_HIT_MARKER: &str = "Enemy hit by thrown item";
/// Marker carried by the hit sound cue.
pub const HIT_SOUND_MARKER: &str = "Hit sound effect played";
/// Marker carried when the player picks up an item.
pub const ITEM_COLLECTED_MARKER: &str = "Item collected";

/// How loudly an event should be surfaced by log consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Ambient,
    Notice,
    Urgent,
}

/// Which moving body an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Enemy,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Player => "Player",
            EntityKind::Enemy => "Enemy",
        }
    }
}

/// Sound cues the presentation layer is expected to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    Hit,
    Throw,
    Pickup,
}

/// A body touched an obstacle in its lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub entity: EntityKind,
    pub obstacle_id: EntityId,
    /// Separation along the travel axis at the moment of contact.
    pub distance: f32,
}

/// A thrown item reached the enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyHitEvent {
    pub projectile_id: EntityId,
    pub distance: f32,
    /// Total hits the enemy has taken this round, including this one.
    pub total_hits: u32,
}

/// Everything a simulation tick can report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    #[serde(rename = "collision")]
    Collision(CollisionEvent),
    #[serde(rename = "enemy.hit")]
    EnemyHit(EnemyHitEvent),
    #[serde(rename = "sound")]
    Sound { cue: SoundCue },
    #[serde(rename = "item.collected")]
    ItemCollected { item_id: EntityId },
    #[serde(rename = "throw.started")]
    ThrowStarted { projectile_id: EntityId, lane: u8 },
    #[serde(rename = "jump.failsafe")]
    JumpFailsafe { grounded_for: f32 },
    #[serde(rename = "lane.change")]
    LaneChange { entity: EntityKind, from: u8, to: u8 },
    #[serde(rename = "obstacle.spawned")]
    ObstacleSpawned { obstacle_id: EntityId, lane: u8 },
    #[serde(rename = "obstacle.retired")]
    ObstacleRetired { obstacle_id: EntityId, passed: bool },
    #[serde(rename = "round.complete")]
    RoundComplete { outcome: RoundOutcome },
}

impl SimEvent {
    pub fn severity(&self) -> Severity {
        match self {
            SimEvent::Collision(_) | SimEvent::EnemyHit(_) => Severity::Urgent,
            SimEvent::RoundComplete { .. }
            | SimEvent::JumpFailsafe { .. }
            | SimEvent::ItemCollected { .. }
            | SimEvent::ThrowStarted { .. } => Severity::Notice,
            SimEvent::Sound { .. }
            | SimEvent::LaneChange { .. }
            | SimEvent::ObstacleSpawned { .. }
            | SimEvent::ObstacleRetired { .. } => Severity::Ambient,
        }
    }

    /// Render the event as a single diagnostic line. Line text is matched by
    /// substring downstream, so the marker constants above must stay verbatim.
    pub fn diagnostic_line(&self) -> String {
        match self {
            SimEvent::Collision(c) => match c.entity {
                EntityKind::Player => format!(
                    "{PLAYER_HIT_MARKER} #{} (distance {:.2})",
                    c.obstacle_id, c.distance
                ),
                EntityKind::Enemy => format!(
                    "{ENEMY_HIT_OBSTACLE_MARKER} #{} (distance {:.2})",
                    c.obstacle_id, c.distance
                ),
            },
            SimEvent::EnemyHit(h) => format!(
                "{ENEMY_HIT_MARKER} (distance {:.2}, hits {})",
                h.distance, h.total_hits
            ),
            SimEvent::Sound { cue } => match cue {
                SoundCue::Hit => HIT_SOUND_MARKER.to_string(),
                SoundCue::Throw => "Throw sound effect played".to_string(),
                SoundCue::Pickup => "Pickup sound effect played".to_string(),
            },
            SimEvent::ItemCollected { item_id } => {
                format!("{ITEM_COLLECTED_MARKER} #{item_id}")
            },
            SimEvent::ThrowStarted {
                projectile_id,
                lane,
            } => format!("Item #{projectile_id} thrown from lane {lane}"),
            SimEvent::JumpFailsafe { grounded_for } => {
                format!("Jump failsafe: cleared is_jumping after {grounded_for:.2}s grounded")
            },
            SimEvent::LaneChange { entity, from, to } => {
                format!("{} lane change {from} -> {to}", entity.label())
            },
            SimEvent::ObstacleSpawned { obstacle_id, lane } => {
                format!("Obstacle #{obstacle_id} spawned in lane {lane}")
            },
            SimEvent::ObstacleRetired {
                obstacle_id,
                passed,
            } => {
                if *passed {
                    format!("Obstacle #{obstacle_id} passed")
                } else {
                    format!("Obstacle #{obstacle_id} retired")
                }
            },
            SimEvent::RoundComplete { outcome } => format!("Round complete: {outcome:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_hit(distance: f32) -> SimEvent {
        SimEvent::Collision(CollisionEvent {
            entity: EntityKind::Player,
            obstacle_id: 7,
            distance,
        })
    }

    #[test]
    fn player_collision_line_carries_marker() {
        let line = player_hit(2.5).diagnostic_line();
        assert!(line.contains("Player hit obstacle"), "got {line}");
        assert!(line.contains("2.50"));
    }

    #[test]
    fn enemy_collision_line_is_distinct_from_player() {
        let line = SimEvent::Collision(CollisionEvent {
            entity: EntityKind::Enemy,
            obstacle_id: 1,
            distance: 1.0,
        })
        .diagnostic_line();
        assert!(line.contains(ENEMY_HIT_OBSTACLE_MARKER));
        assert!(!line.contains(PLAYER_HIT_MARKER));
    }

    #[test]
    fn hit_sound_line_is_exact() {
        let line = SimEvent::Sound { cue: SoundCue::Hit }.diagnostic_line();
        assert_eq!(line, "Hit sound effect played");
    }

    #[test]
    fn thrown_item_hit_line_carries_marker() {
        let line = SimEvent::EnemyHit(EnemyHitEvent {
            projectile_id: 3,
            distance: 1.25,
            total_hits: 2,
        })
        .diagnostic_line();
        assert!(line.starts_with(ENEMY_HIT_MARKER));
        assert!(line.contains("hits 2"));
    }

    #[test]
    fn collision_json_tagging() {
        let json = serde_json::to_value(player_hit(2.5)).unwrap();
        assert_eq!(json["type"], "collision");
        assert_eq!(json["entity"], "player");
        assert_eq!(json["obstacle_id"], 7);
    }

    #[test]
    fn event_json_roundtrip() {
        let events = [
            player_hit(2.5),
            SimEvent::Sound {
                cue: SoundCue::Pickup,
            },
            SimEvent::LaneChange {
                entity: EntityKind::Enemy,
                from: 1,
                to: 0,
            },
            SimEvent::RoundComplete {
                outcome: RoundOutcome::Caught,
            },
        ];
        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let back: SimEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event, back);
        }
    }

    #[test]
    fn severity_ordering() {
        assert!(player_hit(1.0).severity() > Severity::Notice);
        assert_eq!(
            SimEvent::ObstacleSpawned {
                obstacle_id: 1,
                lane: 0
            }
            .severity(),
            Severity::Ambient
        );
        assert_eq!(Severity::default(), Severity::Ambient);
    }
}
