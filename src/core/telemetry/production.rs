use crate::core::execution::config::ProductionConfig;
use crate::core::status::{RunState, SystemStatus};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Dashboard production counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionCounters {
    pub red: u64,
    pub blue: u64,
    pub green: u64,
    pub defected: u64,
    /// Drawn independently of the color counts
    pub total: u64,
    pub cycle_time_s: f64,
    /// Percent
    pub efficiency: f64,
}

impl Default for ProductionCounters {
    fn default() -> Self {
        Self {
            red: 12,
            blue: 8,
            green: 15,
            defected: 3,
            total: 38,
            cycle_time_s: 2.3,
            efficiency: 94.0,
        }
    }
}

impl ProductionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one update. Counters only move while the line may produce.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        status: &SystemStatus,
        config: &ProductionConfig,
        rng: &mut R,
    ) {
        if !(status.is_running && status.state == RunState::Active) {
            return;
        }
        self.red += rng.gen_range(0..2);
        self.blue += rng.gen_range(0..2);
        self.green += rng.gen_range(0..2);
        // Defected cubes never tick up on the dashboard feed
        self.total += rng.gen_range(0..3);

        self.cycle_time_s = 2.0 + rng.gen::<f64>() * 0.8;
        let drift = (rng.gen::<f64>() - 0.5) * 2.0;
        self.efficiency =
            (self.efficiency + drift).clamp(config.min_efficiency, config.max_efficiency);
    }
}

/// Availability lamps on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIndicators {
    pub conveyor1: bool,
    pub conveyor2: bool,
    pub camera: bool,
}

impl Default for LineIndicators {
    fn default() -> Self {
        Self {
            conveyor1: true,
            conveyor2: true,
            camera: true,
        }
    }
}

impl LineIndicators {
    /// Follow the line state. `Idle` leaves the lamps as they were.
    pub fn follow(self, state: RunState) -> Self {
        match state {
            RunState::Error => Self {
                conveyor1: false,
                conveyor2: false,
                camera: false,
            },
            RunState::Active => Self::default(),
            RunState::Idle => self,
        }
    }
}
