use serde::Deserialize;

use gapchase_core::events::Severity;

/// Headless run settings, loaded from `config/sim.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Simulated seconds to run (the round may end sooner).
    pub sim_seconds: f32,
    /// Fixed tick rate in Hz.
    pub tick_rate: f32,
    pub seed: u64,
    /// Drive the player with the built-in autopilot instead of idling.
    pub autopilot: bool,
    /// Lowest severity echoed from the diagnostic log.
    pub echo_severity: Severity,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            sim_seconds: 90.0,
            tick_rate: 60.0,
            seed: 42,
            autopilot: true,
            echo_severity: Severity::Notice,
        }
    }
}

impl SimSettings {
    /// Load from `$GAPCHASE_SIM_CONFIG` or `config/sim.toml`, then apply env
    /// var overrides.
    pub fn load() -> Self {
        let path = std::env::var("GAPCHASE_SIM_CONFIG")
            .unwrap_or_else(|_| "config/sim.toml".to_string());
        let mut settings = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<SimSettings>(&content) {
                Ok(s) => {
                    tracing::info!("Loaded sim settings from {path}");
                    s
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    SimSettings::default()
                },
            },
            Err(_) => {
                tracing::info!("No {path} found, using defaults");
                SimSettings::default()
            },
        };

        if let Ok(val) = std::env::var("GAPCHASE_SIM_SEED")
            && let Ok(seed) = val.parse::<u64>()
        {
            settings.seed = seed;
        }
        if let Ok(val) = std::env::var("GAPCHASE_SIM_SECONDS")
            && let Ok(secs) = val.parse::<f32>()
        {
            settings.sim_seconds = secs;
        }

        settings.sanitize();
        settings
    }

    /// Clamp values that would stall or break the tick loop.
    pub fn sanitize(&mut self) {
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            tracing::warn!(tick_rate = self.tick_rate, "Invalid tick rate, using 60 Hz");
            self.tick_rate = 60.0;
        }
        if !self.sim_seconds.is_finite() || self.sim_seconds < 0.0 {
            self.sim_seconds = SimSettings::default().sim_seconds;
        }
    }

    pub fn tick_count(&self) -> usize {
        (self.sim_seconds * self.tick_rate).ceil() as usize
    }
}
