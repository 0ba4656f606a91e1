use gapchase_runner::{ChaseState, RunnerInput};
use gapchase_runner::config::RunnerConfig;
use gapchase_runner::enemy::{lane_is_clear, nearest_obstacle_ahead};
use gapchase_runner::lane::{Lane, LaneShift};

/// Pick the player's input for this tick from the current state.
///
/// Dodges the nearest obstacle in the player's lane, preferring the lane
/// nearer the enemy, and throws whenever the enemy shares the player's lane.
pub fn generate_input(state: &ChaseState, config: &RunnerConfig) -> RunnerInput {
    let player = &state.player;
    let mut input = RunnerInput::default();

    if player.has_item
        && !player.is_throwing()
        && player.current_lane(config) == state.enemy.current_lane(config)
    {
        input.throw = true;
    }

    if player.motion.is_transitioning() {
        return input;
    }

    let lane = player.current_lane(config);
    let range = config.detection_range;
    if nearest_obstacle_ahead(&player.position, lane, &state.obstacles, range).is_none() {
        return input;
    }

    let enemy_lane = state.enemy.target_lane();
    let mut candidates: Vec<Lane> = lane
        .shifted(LaneShift::Left)
        .into_iter()
        .chain(lane.shifted(LaneShift::Right))
        .filter(|&l| lane_is_clear(&player.position, l, &state.obstacles, range))
        .collect();
    candidates.sort_by_key(|l| l.index().abs_diff(enemy_lane.index()));

    // Boxed in: hold the lane. Contact ignores height, so jumping won't help.
    if let Some(&escape) = candidates.first() {
        input.lane_shift = if escape < lane {
            LaneShift::Left
        } else {
            LaneShift::Right
        };
    }
    input
}
