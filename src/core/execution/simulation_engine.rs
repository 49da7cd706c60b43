use crate::core::alerts::AlertFeed;
use crate::core::detection::{DetectionPoller, DetectionSource};
use crate::core::execution::config::EngineConfig;
use crate::core::execution::process_flow::{FlowState, ProcessFlowSimulator};
use crate::core::execution::timer::IntervalTimer;
use crate::core::statistics::StatisticsData;
use crate::core::status::{ErrorRecord, OperatorRole, StatusObserver, StatusStore, SystemStatus};
use crate::core::telemetry::{ConveyorBank, LineIndicators, ProductionCounters};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Mixed into the flow seed so telemetry draws do not mirror flow draws
const TELEMETRY_SEED_SALT: u64 = 0x5EED_7E1E;

/// Observer trait for engine steps
pub trait SimulationObserver {
    /// Called after every slice of a step with the simulated clock and the
    /// flow state. Slices end on flow tick boundaries.
    fn on_tick(&mut self, clock_ms: u64, flow: &FlowState);
}

/// Drives every simulated part of the line on one simulated clock.
///
/// Each part keeps its own interval timer. A step is cut into slices that end
/// on flow tick boundaries, so every flow tick sees the status as of that
/// tick and one long step matches the same time taken in ticks.
pub struct SimulationEngine {
    config: EngineConfig,
    store: StatusStore,
    flow: ProcessFlowSimulator,
    conveyors: ConveyorBank,
    production: ProductionCounters,
    indicators: LineIndicators,
    statistics: StatisticsData,
    alerts: AlertFeed,
    detection: Option<DetectionPoller<Box<dyn DetectionSource>>>,
    conveyor_timer: IntervalTimer,
    production_timer: IntervalTimer,
    statistics_timer: IntervalTimer,
    rng: StdRng,
    clock_ms: u64,
    role: OperatorRole,
    conveyors_tripped: bool,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, String> {
        config.validate().map_err(|e| e.to_string())?;
        let flow = ProcessFlowSimulator::new(config.flow.clone()).map_err(|e| e.to_string())?;
        let rng = match config.flow.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ TELEMETRY_SEED_SALT),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            store: StatusStore::new(),
            flow,
            conveyors: ConveyorBank::new(),
            production: ProductionCounters::new(),
            indicators: LineIndicators::default(),
            statistics: StatisticsData::new(),
            alerts: AlertFeed::new(config.alerts.clone()),
            detection: None,
            conveyor_timer: IntervalTimer::new(config.conveyors.update_interval_ms),
            production_timer: IntervalTimer::new(config.production.update_interval_ms),
            statistics_timer: IntervalTimer::new(config.statistics.update_interval_ms),
            rng,
            clock_ms: 0,
            role: OperatorRole::Maintenance,
            conveyors_tripped: false,
            observers: Vec::new(),
            config,
        })
    }

    /// Attach a detection source, polled on the configured interval
    pub fn with_detection_source(mut self, source: Box<dyn DetectionSource>) -> Self {
        self.detection = Some(DetectionPoller::new(
            source,
            self.config.detection.stream_url.clone(),
            self.config.detection.poll_interval_ms,
        ));
        self
    }

    /// Start from an existing error log. The records are shown as-is and do
    /// not count toward the critical or acknowledged totals. Status observers
    /// should subscribe after this.
    pub fn with_error_log(mut self, records: Vec<ErrorRecord>) -> Self {
        let status = self.store.status().clone().with_error_log(records);
        self.store = StatusStore::with_status(status);
        self
    }

    /// Set who is operating the line
    pub fn with_role(mut self, role: OperatorRole) -> Self {
        self.role = role;
        self
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Subscribe to status transitions
    pub fn subscribe_status(&mut self, observer: Box<dyn StatusObserver>) {
        self.store.subscribe(observer);
    }

    /// Advance every part of the line by `elapsed_ms` of simulated time
    pub fn step(&mut self, elapsed_ms: u64) {
        let period = self.config.flow.tick_period_ms;
        let mut remaining = elapsed_ms;
        loop {
            let to_tick = period.saturating_sub(self.flow.state().tick_carry_ms);
            let slice = remaining.min(to_tick);
            self.step_slice(slice);
            remaining -= slice;
            if remaining == 0 {
                break;
            }
        }
    }

    /// Advance by at most one flow tick
    fn step_slice(&mut self, elapsed_ms: u64) {
        self.clock_ms += elapsed_ms;
        debug!("=== Simulation Step {} ms ===", self.clock_ms);

        for record in self.alerts.advance(elapsed_ms, &mut self.rng) {
            self.store.report_error(record);
        }

        for _ in 0..self.conveyor_timer.advance(elapsed_ms) {
            self.conveyors.update(&self.config.conveyors, &mut self.rng);
        }
        for _ in 0..self.production_timer.advance(elapsed_ms) {
            self.production
                .update(self.store.status(), &self.config.production, &mut self.rng);
        }
        for _ in 0..self.statistics_timer.advance(elapsed_ms) {
            self.statistics.update(&mut self.rng);
        }
        self.indicators = self.indicators.follow(self.store.status().state);

        if let Some(poller) = self.detection.as_mut() {
            poller.advance(elapsed_ms);
        }

        self.flow.advance(elapsed_ms, self.store.status());

        for observer in &mut self.observers {
            observer.on_tick(self.clock_ms, self.flow.state());
        }
    }

    /// Run `max_ticks` flow ticks, returns the final simulated clock
    pub fn run(&mut self, max_ticks: u64) -> u64 {
        let period = self.config.flow.tick_period_ms;
        for _ in 0..max_ticks {
            self.step(period);
        }
        self.clock_ms
    }

    /// Start the line. Conveyors halted by an emergency stop come back with
    /// it; conveyors the operator switched off stay off.
    pub fn start(&mut self) -> &SystemStatus {
        self.store.start();
        if self.conveyors_tripped && self.store.status().can_produce() {
            self.conveyors.start_all();
            self.conveyors_tripped = false;
        }
        info!("start requested, line is {}", self.store.status().state);
        self.store.status()
    }

    pub fn stop(&mut self) -> &SystemStatus {
        info!("stop requested");
        self.store.stop()
    }

    /// Stop the line and every conveyor
    pub fn emergency_stop(&mut self) -> &SystemStatus {
        warn!("emergency stop");
        self.conveyors.emergency_stop();
        self.conveyors_tripped = true;
        self.store.emergency_stop()
    }

    pub fn acknowledge(&mut self, id: &str) -> &SystemStatus {
        self.store.acknowledge(id)
    }

    /// Mark an error resolved. Only maintenance may do this.
    pub fn resolve(&mut self, id: &str) -> Result<&SystemStatus, String> {
        if !self.role.can_resolve() {
            return Err(format!("{} may not resolve errors", self.role));
        }
        Ok(self.store.resolve(id))
    }

    pub fn clear_resolved(&mut self) -> &SystemStatus {
        self.store.clear_resolved()
    }

    pub fn role(&self) -> OperatorRole {
        self.role
    }

    pub fn set_role(&mut self, role: OperatorRole) {
        info!("operator role set to {}", role);
        self.role = role;
    }

    /// Operator pause/resume of the process flow view
    pub fn set_animating(&mut self, animating: bool) {
        self.flow.set_animating(animating);
    }

    pub fn store_mut(&mut self) -> &mut StatusStore {
        &mut self.store
    }

    pub fn status(&self) -> &SystemStatus {
        self.store.status()
    }

    pub fn flow(&self) -> &ProcessFlowSimulator {
        &self.flow
    }

    pub fn conveyors(&self) -> &ConveyorBank {
        &self.conveyors
    }

    pub fn conveyors_mut(&mut self) -> &mut ConveyorBank {
        &mut self.conveyors
    }

    pub fn production(&self) -> &ProductionCounters {
        &self.production
    }

    pub fn indicators(&self) -> LineIndicators {
        self.indicators
    }

    pub fn statistics(&self) -> &StatisticsData {
        &self.statistics
    }

    pub fn detection(&self) -> Option<&DetectionPoller<Box<dyn DetectionSource>>> {
        self.detection.as_ref()
    }

    pub fn detection_mut(&mut self) -> Option<&mut DetectionPoller<Box<dyn DetectionSource>>> {
        self.detection.as_mut()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current simulated time
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }
}
