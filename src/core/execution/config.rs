/// Configuration for the cube sorting line simulation
///
/// This module provides the configuration types for every simulated part of
/// the line: the process flow, conveyor telemetry, production counters,
/// the error feed, statistics and detection polling.
use crate::core::types::{CubeColor, Position};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn check_period(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "period must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("probability {} is outside [0, 1]", value),
        });
    }
    Ok(())
}

/// Fixed coordinates of the line layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Where new cubes appear (CAP3)
    pub entry: Position,
    /// X coordinate a cube is placed at when it enters conveyor A
    pub conveyor_a_start_x: f64,
    /// X coordinate at which conveyor A hands over to the junction
    pub conveyor_a_end_x: f64,
    /// Y coordinate a cube is placed at when it enters conveyor B
    pub conveyor_b_start_y: f64,
    /// Y coordinate at which conveyor B reaches the camera
    pub conveyor_b_end_y: f64,
    pub basket_red: Position,
    pub basket_blue: Position,
    pub basket_green: Position,
    pub basket_defected: Position,
    /// Robot rest position
    pub robot_home: Position,
    /// Half-extent of the robot idle oscillation on each axis
    pub robot_amplitude: Position,
    /// Time constant of the robot oscillation in ms
    pub robot_period_ms: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            entry: Position::new(520.0, 280.0),
            conveyor_a_start_x: 500.0,
            conveyor_a_end_x: 80.0,
            conveyor_b_start_y: 260.0,
            conveyor_b_end_y: 80.0,
            basket_red: Position::new(120.0, 200.0),
            basket_blue: Position::new(160.0, 200.0),
            basket_green: Position::new(200.0, 200.0),
            basket_defected: Position::new(240.0, 200.0),
            robot_home: Position::new(450.0, 150.0),
            robot_amplitude: Position::new(15.0, 10.0),
            robot_period_ms: 1000.0,
        }
    }
}

impl LayoutConfig {
    /// Basket a cube of the given color is sorted into
    pub fn basket(&self, color: CubeColor) -> Position {
        match color {
            CubeColor::Red => self.basket_red,
            CubeColor::Blue => self.basket_blue,
            CubeColor::Green => self.basket_green,
            CubeColor::Defected => self.basket_defected,
        }
    }
}

/// Configuration for the process flow simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Simulated time between two ticks
    pub tick_period_ms: u64,
    /// Simulated time between two spawned cubes
    pub spawn_interval_ms: u64,
    /// Distance a cube moves along a conveyor per tick
    pub linear_step: f64,
    /// Per-tick chance that a cube waiting at the camera is picked up
    pub detection_pickup_probability: f64,
    /// Per-tick chance that a completed cube stays in its basket
    pub complete_retention_probability: f64,
    /// Seed for the simulation RNG; `None` seeds from entropy
    pub random_seed: Option<u64>,
    pub layout: LayoutConfig,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 300,
            spawn_interval_ms: 2000,
            linear_step: 8.0,
            detection_pickup_probability: 0.2,
            complete_retention_probability: 0.9,
            random_seed: Some(42),
            layout: LayoutConfig::default(),
        }
    }
}

impl FlowConfig {
    /// Create a new flow configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tick_period(mut self, ms: u64) -> Self {
        self.tick_period_ms = ms;
        self
    }

    pub fn with_spawn_interval(mut self, ms: u64) -> Self {
        self.spawn_interval_ms = ms;
        self
    }

    pub fn with_linear_step(mut self, step: f64) -> Self {
        self.linear_step = step;
        self
    }

    pub fn with_detection_pickup_probability(mut self, p: f64) -> Self {
        self.detection_pickup_probability = p;
        self
    }

    pub fn with_complete_retention_probability(mut self, p: f64) -> Self {
        self.complete_retention_probability = p;
        self
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_period("flow.tick_period_ms", self.tick_period_ms)?;
        check_period("flow.spawn_interval_ms", self.spawn_interval_ms)?;
        if !(self.linear_step > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "flow.linear_step",
                reason: format!("step {} must be positive", self.linear_step),
            });
        }
        check_probability(
            "flow.detection_pickup_probability",
            self.detection_pickup_probability,
        )?;
        check_probability(
            "flow.complete_retention_probability",
            self.complete_retention_probability,
        )?;
        if !(self.layout.robot_period_ms > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "flow.layout.robot_period_ms",
                reason: "period must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration for conveyor telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConveyorConfig {
    pub update_interval_ms: u64,
    pub cube_detect_probability: f64,
    pub jam_probability: f64,
}

impl Default for ConveyorConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 1000,
            cube_detect_probability: 0.3,
            jam_probability: 0.05,
        }
    }
}

impl ConveyorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_period("conveyors.update_interval_ms", self.update_interval_ms)?;
        check_probability("conveyors.cube_detect_probability", self.cube_detect_probability)?;
        check_probability("conveyors.jam_probability", self.jam_probability)
    }
}

/// Configuration for the dashboard production counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    pub update_interval_ms: u64,
    pub min_efficiency: f64,
    pub max_efficiency: f64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 3000,
            min_efficiency: 85.0,
            max_efficiency: 98.0,
        }
    }
}

impl ProductionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_period("production.update_interval_ms", self.update_interval_ms)?;
        if self.min_efficiency > self.max_efficiency {
            return Err(ConfigError::InvalidValue {
                field: "production.min_efficiency",
                reason: format!(
                    "minimum {} exceeds maximum {}",
                    self.min_efficiency, self.max_efficiency
                ),
            });
        }
        Ok(())
    }
}

/// Configuration for the simulated error feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub enabled: bool,
    pub check_interval_ms: u64,
    pub raise_probability: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_ms: 10_000,
            raise_probability: 0.05,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_period("alerts.check_interval_ms", self.check_interval_ms)?;
        check_probability("alerts.raise_probability", self.raise_probability)
    }
}

/// Configuration for the statistics aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub update_interval_ms: u64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 5000,
        }
    }
}

/// Configuration for detection polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Base URL of the detection service, without the `/api/detections` path
    pub base_url: String,
    /// Operator-supplied live video URL
    pub stream_url: String,
    pub poll_interval_ms: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8500".to_string(),
            stream_url: "http://192.168.100.84:8080/video".to_string(),
            poll_interval_ms: 1000,
        }
    }
}

/// Configuration for the whole engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub flow: FlowConfig,
    pub conveyors: ConveyorConfig,
    pub production: ProductionConfig,
    pub alerts: AlertConfig,
    pub statistics: StatisticsConfig,
    pub detection: DetectionConfig,
}

impl EngineConfig {
    /// Create a new engine configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flow(mut self, flow: FlowConfig) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.flow.random_seed = seed;
        self
    }

    pub fn with_alerts_enabled(mut self, enabled: bool) -> Self {
        self.alerts.enabled = enabled;
        self
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flow.validate()?;
        self.conveyors.validate()?;
        self.production.validate()?;
        self.alerts.validate()?;
        check_period("statistics.update_interval_ms", self.statistics.update_interval_ms)?;
        check_period("detection.poll_interval_ms", self.detection.poll_interval_ms)
    }
}
