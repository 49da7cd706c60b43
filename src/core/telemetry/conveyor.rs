use crate::core::execution::config::ConveyorConfig;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Speed a conveyor restarts at when it was stopped at zero
pub const DEFAULT_SPEED: u32 = 75;
/// Ambient temperature a stopped motor cools down to
pub const AMBIENT_TEMP_C: f64 = 25.0;

/// Live readings and controls of one conveyor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConveyorStatus {
    pub id: u32,
    pub name: String,
    pub is_running: bool,
    /// Percent of maximum belt speed
    pub speed: u32,
    pub cube_detected: bool,
    pub jam_detected: bool,
    pub motor_temp: f64,
    pub vibration: f64,
    pub runtime_hours: f64,
}

impl ConveyorStatus {
    fn update<R: Rng + ?Sized>(&mut self, config: &ConveyorConfig, rng: &mut R) {
        if self.is_running {
            self.cube_detected = rng.gen_bool(config.cube_detect_probability.clamp(0.0, 1.0));
            self.jam_detected = rng.gen_bool(config.jam_probability.clamp(0.0, 1.0));
            self.motor_temp = 35.0 + rng.gen::<f64>() * 15.0 + self.speed as f64 / 10.0;
            self.vibration = 0.1 + rng.gen::<f64>() * 0.3 + self.speed as f64 / 500.0;
            self.runtime_hours += 0.1 / 60.0;
        } else {
            self.cube_detected = false;
            self.jam_detected = false;
            self.motor_temp = (self.motor_temp - 0.5).max(AMBIENT_TEMP_C);
            self.vibration = 0.0;
        }
    }
}

/// The two conveyors of the line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConveyorBank {
    conveyors: Vec<ConveyorStatus>,
}

impl Default for ConveyorBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ConveyorBank {
    pub fn new() -> Self {
        Self {
            conveyors: vec![
                ConveyorStatus {
                    id: 1,
                    name: "Conveyor 1".to_string(),
                    is_running: true,
                    speed: 75,
                    cube_detected: false,
                    jam_detected: false,
                    motor_temp: 42.0,
                    vibration: 0.2,
                    runtime_hours: 7.5,
                },
                ConveyorStatus {
                    id: 2,
                    name: "Conveyor 2".to_string(),
                    is_running: true,
                    speed: 80,
                    cube_detected: false,
                    jam_detected: false,
                    motor_temp: 38.0,
                    vibration: 0.15,
                    runtime_hours: 7.2,
                },
            ],
        }
    }

    pub fn conveyors(&self) -> &[ConveyorStatus] {
        &self.conveyors
    }

    pub fn get(&self, id: u32) -> Option<&ConveyorStatus> {
        self.conveyors.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut ConveyorStatus> {
        self.conveyors.iter_mut().find(|c| c.id == id)
    }

    /// Refresh every conveyor's readings once
    pub fn update<R: Rng + ?Sized>(&mut self, config: &ConveyorConfig, rng: &mut R) {
        for conveyor in &mut self.conveyors {
            conveyor.update(config, rng);
            if conveyor.jam_detected {
                debug!("{} reports a jam", conveyor.name);
            }
        }
    }

    pub fn toggle(&mut self, id: u32) {
        if let Some(conveyor) = self.get_mut(id) {
            conveyor.is_running = !conveyor.is_running;
            info!("{} {}", conveyor.name, if conveyor.is_running { "started" } else { "stopped" });
        }
    }

    /// Set belt speed in percent, clamped to 0..=100
    pub fn set_speed(&mut self, id: u32, speed: u32) {
        if let Some(conveyor) = self.get_mut(id) {
            conveyor.speed = speed.min(100);
        }
    }

    pub fn clear_jam(&mut self, id: u32) {
        if let Some(conveyor) = self.get_mut(id) {
            conveyor.jam_detected = false;
        }
    }

    /// Stop every conveyor and drop its speed to zero
    pub fn emergency_stop(&mut self) {
        for conveyor in &mut self.conveyors {
            conveyor.is_running = false;
            conveyor.speed = 0;
        }
        info!("all conveyors stopped");
    }

    /// Start every conveyor, restoring a default speed where it was zero
    pub fn start_all(&mut self) {
        for conveyor in &mut self.conveyors {
            conveyor.is_running = true;
            if conveyor.speed == 0 {
                conveyor.speed = DEFAULT_SPEED;
            }
        }
        info!("all conveyors started");
    }

    /// Whether any conveyor currently reports a jam
    pub fn any_jammed(&self) -> bool {
        self.conveyors.iter().any(|c| c.jam_detected)
    }
}
