/// Points per thrown item that lands on the enemy.
pub const ENEMY_HIT_POINTS: i32 = 50;
/// Points lost per obstacle the player runs into.
pub const OBSTACLE_HIT_POINTS: i32 = -25;
/// Bonus for catching the enemy.
pub const CATCH_BONUS: i32 = 200;

/// Calculate the player's score for a round.
pub fn calculate_score(
    distance: f32,
    points_per_unit: f32,
    enemy_hits: u32,
    obstacle_hits: u32,
    caught: bool,
) -> i32 {
    let mut score = (distance.max(0.0) * points_per_unit).floor() as i32;
    score += enemy_hits as i32 * ENEMY_HIT_POINTS;
    score += obstacle_hits as i32 * OBSTACLE_HIT_POINTS;
    if caught {
        score += CATCH_BONUS;
    }
    score
}
