// Tests for SimulationEngine functionality
#[cfg(test)]
mod tests {
    use crate::core::{
        detection::{Detection, DetectionError, DetectionSource},
        execution::config::{EngineConfig, FlowConfig},
        execution::process_flow::FlowState,
        execution::simulation_engine::{SimulationEngine, SimulationObserver},
        alerts::seed_errors,
        status::{ErrorRecord, ErrorState, OperatorRole, RunState, Severity},
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quiet_config() -> EngineConfig {
        EngineConfig::new().with_alerts_enabled(false)
    }

    struct ClockProbe {
        seen: Rc<RefCell<Vec<(u64, usize)>>>,
    }

    impl SimulationObserver for ClockProbe {
        fn on_tick(&mut self, clock_ms: u64, flow: &FlowState) {
            self.seen.borrow_mut().push((clock_ms, flow.items.len()));
        }
    }

    struct FixedSource {
        calls: Rc<RefCell<u32>>,
    }

    impl DetectionSource for FixedSource {
        fn fetch(&mut self) -> Result<Vec<Detection>, DetectionError> {
            *self.calls.borrow_mut() += 1;
            Ok(vec![Detection {
                id: "blue_1".to_string(),
                color: "blue".to_string(),
                confidence: 88.0,
                x: 100.0,
                y: 40.0,
                width: 50.0,
                height: 50.0,
                timestamp: "09:00:01".to_string(),
            }])
        }
    }

    #[test]
    fn test_run_advances_clock_by_tick_period() {
        let mut engine = SimulationEngine::new(quiet_config()).unwrap();
        let clock = engine.run(20);

        assert_eq!(clock, 6000);
        assert_eq!(engine.clock_ms(), 6000);
        assert_eq!(engine.flow().stats().ticks, 20);
    }

    #[test]
    fn test_observer_sees_every_step() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut engine = SimulationEngine::new(quiet_config()).unwrap();
        engine.add_observer(Box::new(ClockProbe { seen: seen.clone() }));

        engine.run(3);

        let clocks: Vec<u64> = seen.borrow().iter().map(|(clock, _)| *clock).collect();
        assert_eq!(clocks, vec![300, 600, 900]);
        assert_eq!(seen.borrow()[0].1, 1, "first tick spawns one item");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = quiet_config().with_flow(FlowConfig::new().with_tick_period(0));
        assert!(SimulationEngine::new(config).is_err());
    }

    #[test]
    fn test_emergency_stop_freezes_flow_and_conveyors() {
        let mut engine = SimulationEngine::new(quiet_config()).unwrap();
        engine.run(5);
        engine.emergency_stop();

        assert_eq!(engine.status().state, RunState::Error);
        assert!(engine.conveyors().conveyors().iter().all(|c| !c.is_running && c.speed == 0));

        let frozen = engine.flow().state().items.clone();
        engine.run(10);
        assert_eq!(engine.flow().state().items, frozen);
        assert!(!engine.indicators().camera);
    }

    #[test]
    fn test_start_restores_conveyors() {
        let mut engine = SimulationEngine::new(quiet_config()).unwrap();
        engine.emergency_stop();
        engine.start();

        assert!(engine.status().is_running);
        assert_eq!(engine.status().state, RunState::Active);
        assert!(engine.conveyors().conveyors().iter().all(|c| c.is_running && c.speed > 0));
    }

    #[test]
    fn test_start_leaves_switched_off_conveyor_off() {
        let mut engine = SimulationEngine::new(quiet_config()).unwrap();
        engine.conveyors_mut().toggle(1);
        assert!(!engine.conveyors().get(1).unwrap().is_running);

        engine.stop();
        engine.start();
        assert!(!engine.conveyors().get(1).unwrap().is_running);
        assert!(engine.conveyors().get(2).unwrap().is_running);

        engine.emergency_stop();
        engine.start();
        engine.conveyors_mut().toggle(1);
        engine.stop();
        engine.start();
        assert!(!engine.conveyors().get(1).unwrap().is_running);
    }

    #[test]
    fn test_start_refused_with_critical_error() {
        let mut engine = SimulationEngine::new(quiet_config()).unwrap();
        engine
            .store_mut()
            .report_error(ErrorRecord::new("E900", Severity::Critical, "KUKA Robot"));
        engine.start();

        assert!(!engine.status().is_running);
        assert_eq!(engine.status().state, RunState::Error);
    }

    #[test]
    fn test_alert_feed_reports_into_store() {
        let mut config = EngineConfig::new();
        config.alerts.raise_probability = 1.0;
        config.alerts.check_interval_ms = 1000;
        let mut engine = SimulationEngine::new(config).unwrap();

        engine.step(3000);

        assert_eq!(engine.status().errors.len(), 3);
        assert!(engine.status().errors.iter().all(|e| e.id.starts_with('E')));
    }

    #[test]
    fn test_long_step_matches_tick_steps() {
        let mut config = EngineConfig::new().with_random_seed(Some(1));
        config.alerts.raise_probability = 1.0;
        config.alerts.check_interval_ms = 900;

        let mut coarse = SimulationEngine::new(config.clone()).unwrap();
        let mut fine = SimulationEngine::new(config).unwrap();
        coarse.step(9_900);
        for _ in 0..33 {
            fine.step(300);
        }

        assert_eq!(coarse.clock_ms(), fine.clock_ms());
        assert_eq!(coarse.flow().state(), fine.flow().state());
        assert_eq!(coarse.flow().stats().ticks, 33);
        assert_eq!(coarse.status().state, fine.status().state);
        assert_eq!(
            coarse.status().critical_error_count,
            fine.status().critical_error_count
        );
        let ids = |e: &SimulationEngine| -> Vec<String> {
            e.status().errors.iter().map(|r| r.id.clone()).collect()
        };
        assert_eq!(ids(&coarse), ids(&fine));
        assert_eq!(coarse.conveyors().conveyors(), fine.conveyors().conveyors());
    }

    #[test]
    fn test_observer_sees_each_tick_of_long_step() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut engine = SimulationEngine::new(quiet_config()).unwrap();
        engine.add_observer(Box::new(ClockProbe { seen: seen.clone() }));

        engine.step(450);
        engine.step(450);

        let clocks: Vec<u64> = seen.borrow().iter().map(|(clock, _)| *clock).collect();
        assert_eq!(clocks, vec![300, 450, 600, 900]);
        assert_eq!(engine.flow().stats().ticks, 3);
    }

    #[test]
    fn test_error_log_is_shown_but_not_counted() {
        let mut engine = SimulationEngine::new(quiet_config())
            .unwrap()
            .with_error_log(seed_errors());

        assert_eq!(engine.status().errors.len(), 2);
        assert_eq!(engine.status().errors[0].id, "E001");
        assert_eq!(engine.status().critical_error_count, 0);
        assert_eq!(engine.status().state, RunState::Active);

        engine.run(1);
        assert_eq!(engine.flow().items().len(), 1);
    }

    #[test]
    fn test_only_maintenance_resolves() {
        let mut engine = SimulationEngine::new(quiet_config())
            .unwrap()
            .with_role(OperatorRole::Operator);
        engine
            .store_mut()
            .report_error(ErrorRecord::new("E900", Severity::Critical, "KUKA Robot"));
        let before = engine.status().clone();

        assert!(engine.resolve("E900").is_err());
        assert_eq!(engine.status(), &before);

        engine.acknowledge("E900");
        assert_eq!(
            engine.status().find("E900").map(|e| e.state),
            Some(ErrorState::Acknowledged)
        );

        engine.set_role(OperatorRole::Admin);
        assert!(engine.resolve("E900").is_err());

        engine.set_role(OperatorRole::Maintenance);
        let status = engine.resolve("E900").unwrap();
        assert_eq!(status.critical_error_count, 0);
        assert_eq!(
            status.find("E900").map(|e| e.state),
            Some(ErrorState::Resolved)
        );
    }

    #[test]
    fn test_detection_polled_from_step() {
        let calls = Rc::new(RefCell::new(0));
        let mut engine = SimulationEngine::new(quiet_config())
            .unwrap()
            .with_detection_source(Box::new(FixedSource { calls: calls.clone() }));

        engine.step(300);
        engine.step(1000);

        assert_eq!(*calls.borrow(), 2);
        let poller = engine.detection().unwrap();
        assert_eq!(poller.detections().len(), 1);
        assert_eq!(poller.stream_url(), "http://192.168.100.84:8080/video");
    }

    #[test]
    fn test_periodic_telemetry_updates() {
        let mut engine = SimulationEngine::new(quiet_config()).unwrap();
        let before = engine.statistics().total_cubes;
        engine.step(50_000);

        assert!(engine.statistics().total_cubes >= before);
        assert!(engine.production().efficiency >= 85.0);
        assert!(engine.production().efficiency <= 98.0);
    }
}
