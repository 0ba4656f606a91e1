use gapchase_core::events::{CollisionEvent, EntityKind};

use crate::config::RunnerConfig;
use crate::lane::{Lane, Position, lane_from_x};
use crate::spawn::{ItemPickup, Obstacle};

/// Shared hit rule: same lane and strictly closer than `threshold` along the
/// travel axis. Returns the separation when it is a hit.
///
/// `body` is always a live position; its lane is resolved from x here so a
/// pending lane change can never leak into the check.
pub fn lane_contact(
    body: &Position,
    other: &Position,
    other_lane: Lane,
    threshold: f32,
    lane_spacing: f32,
) -> Option<f32> {
    if lane_from_x(body.x, lane_spacing) != other_lane {
        return None;
    }
    let distance = body.travel_distance(other);
    (distance < threshold).then_some(distance)
}

/// Check one body against every active obstacle. Returns one event per
/// obstacle touched, nearest first.
pub fn check_obstacle_hits(
    entity: EntityKind,
    body: &Position,
    obstacles: &[Obstacle],
    config: &RunnerConfig,
) -> Vec<CollisionEvent> {
    let mut hits: Vec<CollisionEvent> = obstacles
        .iter()
        .filter(|o| o.active)
        .filter_map(|o| {
            lane_contact(
                body,
                &o.position,
                o.lane,
                config.collision_threshold,
                config.lane_spacing,
            )
            .map(|distance| CollisionEvent {
                entity,
                obstacle_id: o.id,
                distance,
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Whether a projectile at `projectile` touches the enemy at `enemy`.
/// Same rule as obstacle contact, with the projectile as the moving body.
pub fn check_projectile_hit(
    projectile: &Position,
    enemy: &Position,
    config: &RunnerConfig,
) -> Option<f32> {
    let enemy_lane = lane_from_x(enemy.x, config.lane_spacing);
    lane_contact(
        projectile,
        enemy,
        enemy_lane,
        config.enemy_hit_range,
        config.lane_spacing,
    )
}

/// Index of the nearest active pickup the body can collect.
pub fn find_pickup(body: &Position, items: &[ItemPickup], config: &RunnerConfig) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.active)
        .filter_map(|(i, item)| {
            lane_contact(
                body,
                &item.position,
                item.lane,
                config.pickup_range,
                config.lane_spacing,
            )
            .map(|d| (i, d))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
