mod autopilot;
mod settings;

use std::collections::HashMap;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use gapchase_core::game_trait::{ChaseGame, SessionConfig};
use gapchase_runner::GapChase;

use settings::SimSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = SimSettings::load();
    tracing::info!(
        seed = settings.seed,
        tick_rate = settings.tick_rate,
        sim_seconds = settings.sim_seconds,
        "Gap Chase sim starting"
    );

    let mut game = GapChase::new();
    let round_secs = game.config().round_duration_secs.max(0.0) as u64;
    game.init(&SessionConfig {
        round_duration: Duration::from_secs(round_secs),
        seed: settings.seed,
        custom: HashMap::new(),
    });

    let dt = 1.0 / settings.tick_rate;
    let mut event_count = 0usize;

    for _ in 0..settings.tick_count() {
        if settings.autopilot {
            let input = autopilot::generate_input(game.debug(), game.config());
            match rmp_serde::to_vec(&input) {
                Ok(bytes) => game.apply_input(&bytes),
                Err(e) => tracing::warn!(error = %e, "Failed to encode autopilot input"),
            }
        }

        event_count += game.update(dt).len();

        for line in game.log_mut().drain() {
            if line.severity >= settings.echo_severity {
                tracing::info!(t = line.sim_time, "{}", line.text);
            }
        }

        if game.is_round_complete() {
            break;
        }
    }

    let result = game.round_result();
    tracing::info!(
        events = event_count,
        score = result.score,
        "Gap Chase sim finished"
    );
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "Failed to render round result"),
    }
}
