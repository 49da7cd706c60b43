//! Process flow simulator
//!
//! Cubes enter at CAP3, ride conveyor A to the junction, ride conveyor B up
//! to the camera, get picked by the robot and land in the basket for their
//! color. The simulator is an explicit discrete-time stepper: callers feed it
//! elapsed simulated time and the current line status, nothing runs on its
//! own.

use crate::core::execution::config::{ConfigError, FlowConfig};
use crate::core::status::SystemStatus;
use crate::core::types::{CubeColor, ItemId, Position, Stage};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A simulated cube on the line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: ItemId,
    pub position: Position,
    pub color: CubeColor,
    pub stage: Stage,
}

/// What the robot arm is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotActivity {
    Idle,
    Active,
    MovingToPickup,
    SortingCube,
    ReturningHome,
    /// Line is in the error state
    Stopped,
}

impl std::fmt::Display for RobotActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RobotActivity::Idle => write!(f, "Idle"),
            RobotActivity::Active => write!(f, "Active"),
            RobotActivity::MovingToPickup => write!(f, "Moving to pickup"),
            RobotActivity::SortingCube => write!(f, "Sorting cube"),
            RobotActivity::ReturningHome => write!(f, "Returning to home"),
            RobotActivity::Stopped => write!(f, "Error - System Stopped"),
        }
    }
}

/// Per-color count of cubes placed in baskets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedCounts {
    pub red: u64,
    pub blue: u64,
    pub green: u64,
    pub defected: u64,
}

impl SortedCounts {
    pub fn increment(&mut self, color: CubeColor) {
        match color {
            CubeColor::Red => self.red += 1,
            CubeColor::Blue => self.blue += 1,
            CubeColor::Green => self.green += 1,
            CubeColor::Defected => self.defected += 1,
        }
    }

    pub fn get(&self, color: CubeColor) -> u64 {
        match color {
            CubeColor::Red => self.red,
            CubeColor::Blue => self.blue,
            CubeColor::Green => self.green,
            CubeColor::Defected => self.defected,
        }
    }

    pub fn total(&self) -> u64 {
        self.red + self.blue + self.green + self.defected
    }
}

/// Running counters of the simulator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStats {
    /// Ticks executed, including gated ones
    pub ticks: u64,
    /// Ticks on which the line was allowed to make progress
    pub productive_ticks: u64,
    pub spawned: u64,
    /// Cubes removed from their basket
    pub retired: u64,
    pub sorted: SortedCounts,
}

/// Complete simulator state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    /// Cubes currently on the line, oldest first
    pub items: Vec<WorkItem>,
    /// Simulated time
    pub clock_ms: u64,
    /// Elapsed time not yet consumed by a full tick
    pub tick_carry_ms: u64,
    /// Time accumulated towards the next spawn
    pub since_spawn_ms: u64,
    pub robot: Position,
    pub robot_activity: RobotActivity,
    /// Operator pause switch, independent of the line status
    pub animating: bool,
    pub stats: FlowStats,
}

impl FlowState {
    /// Fresh state for the given configuration.
    ///
    /// The spawn timer starts one tick short of due, so the first productive
    /// tick spawns a cube.
    pub fn new(config: &FlowConfig) -> Self {
        Self {
            items: Vec::new(),
            clock_ms: 0,
            tick_carry_ms: 0,
            since_spawn_ms: primed_spawn_timer(config),
            robot: config.layout.robot_home,
            robot_activity: RobotActivity::Idle,
            animating: true,
            stats: FlowStats::default(),
        }
    }

    /// Clear the line and return the robot home. Counters are kept.
    pub fn reset(&mut self, config: &FlowConfig) {
        self.items.clear();
        self.tick_carry_ms = 0;
        self.since_spawn_ms = primed_spawn_timer(config);
        self.robot = config.layout.robot_home;
        self.robot_activity = RobotActivity::Idle;
    }

    /// Items currently at the given stage
    pub fn items_at(&self, stage: Stage) -> impl Iterator<Item = &WorkItem> {
        self.items.iter().filter(move |item| item.stage == stage)
    }
}

fn primed_spawn_timer(config: &FlowConfig) -> u64 {
    config.spawn_interval_ms.saturating_sub(config.tick_period_ms)
}

/// Advance the simulation by `elapsed_ms` of simulated time.
///
/// Runs one tick per full tick period; the remainder carries over into the
/// next call.
pub fn advance<R: Rng + ?Sized>(
    mut state: FlowState,
    elapsed_ms: u64,
    status: &SystemStatus,
    config: &FlowConfig,
    rng: &mut R,
) -> FlowState {
    let period = config.tick_period_ms.max(1);
    state.tick_carry_ms = state.tick_carry_ms.saturating_add(elapsed_ms);
    while state.tick_carry_ms >= period {
        state.tick_carry_ms -= period;
        tick(&mut state, status, config, rng);
    }
    state
}

/// Execute exactly one tick
pub fn tick<R: Rng + ?Sized>(
    state: &mut FlowState,
    status: &SystemStatus,
    config: &FlowConfig,
    rng: &mut R,
) {
    let period = config.tick_period_ms.max(1);
    let spawn_interval = config.spawn_interval_ms.max(1);
    state.clock_ms = state.clock_ms.saturating_add(period);
    state.stats.ticks += 1;

    if !status.can_produce() || !state.animating {
        // Time keeps passing, but a stopped line never owes more than one cube
        let due = primed_spawn_timer(config);
        if state.since_spawn_ms < due {
            state.since_spawn_ms = state.since_spawn_ms.saturating_add(period).min(due);
        }
        state.robot_activity = if status.is_error() {
            RobotActivity::Stopped
        } else if status.can_produce() {
            // Paused by the operator; keep whatever the robot was doing
            state.robot_activity
        } else {
            RobotActivity::Idle
        };
        return;
    }

    debug!("=== Flow tick {} at {} ms ===", state.stats.ticks, state.clock_ms);
    state.stats.productive_ticks += 1;
    if matches!(state.robot_activity, RobotActivity::Idle | RobotActivity::Stopped) {
        state.robot_activity = RobotActivity::Active;
    }

    state.since_spawn_ms = state.since_spawn_ms.saturating_add(period);
    if state.since_spawn_ms >= spawn_interval {
        state.since_spawn_ms = (state.since_spawn_ms - spawn_interval) % spawn_interval;
        let item = WorkItem {
            id: ItemId::generate(rng),
            position: config.layout.entry,
            color: CubeColor::random(rng),
            stage: Stage::Entry,
        };
        info!("spawned {} cube {} at {} ms", item.color, item.id, state.clock_ms);
        state.items.push(item);
        state.stats.spawned += 1;
    }

    for item in state.items.iter_mut() {
        if let Some(activity) = step_item(item, config, rng) {
            if activity == RobotActivity::ReturningHome {
                state.stats.sorted.increment(item.color);
            }
            state.robot_activity = activity;
        }
    }

    let retention = config.complete_retention_probability.clamp(0.0, 1.0);
    let before = state.items.len();
    state
        .items
        .retain(|item| item.stage != Stage::Complete || rng.gen_bool(retention));
    state.stats.retired += (before - state.items.len()) as u64;

    let t = state.clock_ms as f64 / config.layout.robot_period_ms;
    state.robot = Position::new(
        config.layout.robot_home.x + t.sin() * config.layout.robot_amplitude.x,
        config.layout.robot_home.y + t.cos() * config.layout.robot_amplitude.y,
    );
}

/// Move one item a single step along the pipeline.
///
/// Returns the new robot activity when the step involved the robot.
fn step_item<R: Rng + ?Sized>(
    item: &mut WorkItem,
    config: &FlowConfig,
    rng: &mut R,
) -> Option<RobotActivity> {
    let layout = &config.layout;
    match item.stage {
        Stage::Entry => {
            item.stage = Stage::ConveyorA;
            item.position.x = layout.conveyor_a_start_x;
            None
        }
        Stage::ConveyorA => {
            let (x, arrived) = slide(
                item.position.x,
                layout.conveyor_a_start_x,
                layout.conveyor_a_end_x,
                config.linear_step,
            );
            item.position.x = x;
            if arrived {
                item.stage = Stage::Junction;
            }
            None
        }
        Stage::Junction => {
            item.stage = Stage::ConveyorB;
            item.position.y = layout.conveyor_b_start_y;
            None
        }
        Stage::ConveyorB => {
            let (y, arrived) = slide(
                item.position.y,
                layout.conveyor_b_start_y,
                layout.conveyor_b_end_y,
                config.linear_step,
            );
            item.position.y = y;
            if arrived {
                item.stage = Stage::Detection;
            }
            None
        }
        Stage::Detection => {
            let p = config.detection_pickup_probability.clamp(0.0, 1.0);
            if rng.gen_bool(p) {
                item.stage = Stage::Pickup;
                Some(RobotActivity::MovingToPickup)
            } else {
                None
            }
        }
        Stage::Pickup => {
            item.stage = Stage::Sorting;
            Some(RobotActivity::SortingCube)
        }
        Stage::Sorting => {
            item.position = layout.basket(item.color);
            item.stage = Stage::Complete;
            Some(RobotActivity::ReturningHome)
        }
        Stage::Complete => None,
    }
}

/// Move a coordinate one step from `start` towards `end`.
///
/// Snaps to `end` once reached or crossed and reports arrival.
fn slide(current: f64, start: f64, end: f64, step: f64) -> (f64, bool) {
    if end < start {
        let next = current - step;
        if next <= end {
            (end, true)
        } else {
            (next, false)
        }
    } else {
        let next = current + step;
        if next >= end {
            (end, true)
        } else {
            (next, false)
        }
    }
}

/// Process flow simulator with its own seeded random source
pub struct ProcessFlowSimulator {
    config: FlowConfig,
    state: FlowState,
    rng: StdRng,
}

impl ProcessFlowSimulator {
    /// Create a simulator. Seeds from `config.random_seed`, or from entropy
    /// when no seed is set.
    pub fn new(config: FlowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            state: FlowState::new(&config),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.state.items
    }

    pub fn stats(&self) -> &FlowStats {
        &self.state.stats
    }

    /// Advance by `elapsed_ms` of simulated time under the given status
    pub fn advance(&mut self, elapsed_ms: u64, status: &SystemStatus) -> &FlowState {
        let state = std::mem::replace(&mut self.state, FlowState::new(&self.config));
        self.state = advance(state, elapsed_ms, status, &self.config, &mut self.rng);
        &self.state
    }

    /// Run a single tick regardless of accumulated time
    pub fn tick(&mut self, status: &SystemStatus) -> &FlowState {
        tick(&mut self.state, status, &self.config, &mut self.rng);
        &self.state
    }

    /// Operator pause/resume
    pub fn set_animating(&mut self, animating: bool) {
        self.state.animating = animating;
    }

    pub fn is_animating(&self) -> bool {
        self.state.animating
    }

    pub fn reset(&mut self) {
        self.state.reset(&self.config);
    }
}
