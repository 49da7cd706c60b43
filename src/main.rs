use chrono::Utc;
use clap::Parser;
use cubesort::core::alerts::{seed_errors, ErrorFilter};
use cubesort::core::detection::HttpDetectionSource;
use cubesort::core::execution::{EngineConfig, SimulationEngine};
use cubesort::core::statistics::{export_to_path, ExportFormat, TimeRange};
use cubesort::core::status::{ErrorRecord, ErrorState, Severity};
use cubesort::core::types::{CubeColor, Stage};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cubesort-sim")]
#[command(about = "Headless cube-sorting line simulation")]
struct Args {
    /// Number of flow ticks to run
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,

    /// Random seed, overriding the configured one (42 by default)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON engine configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll detections from this service base URL
    #[arg(long)]
    detections_url: Option<String>,

    /// Trigger an emergency stop at this tick
    #[arg(long)]
    emergency_stop_at: Option<u64>,

    /// Report a critical robot error at this tick
    #[arg(long)]
    critical_error_at: Option<u64>,

    /// Start with the demonstration error log
    #[arg(long)]
    seed_errors: bool,

    /// Export statistics after the run (csv or json)
    #[arg(long)]
    export: Option<ExportFormat>,

    /// Directory for the export artifact
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Time range recorded in the export
    #[arg(long, default_value = "today")]
    range: TimeRange,
}

fn build_engine(args: &Args) -> Result<SimulationEngine, String> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => EngineConfig::new(),
    };
    if args.seed.is_some() {
        config = config.with_random_seed(args.seed);
    }
    if let Some(url) = &args.detections_url {
        config.detection.base_url = url.clone();
    }

    let mut engine = SimulationEngine::new(config)?;
    if args.detections_url.is_some() {
        let source = HttpDetectionSource::new(&engine.config().detection.base_url)
            .map_err(|e| e.to_string())?;
        engine = engine.with_detection_source(Box::new(source));
    }
    Ok(engine)
}

fn run(args: Args) -> Result<(), String> {
    let mut engine = build_engine(&args)?;
    if args.seed_errors {
        engine = engine.with_error_log(seed_errors());
    }
    let period = engine.config().flow.tick_period_ms;

    println!("Running cube-sorting line for {} ticks...", args.ticks);
    for tick in 0..args.ticks {
        if args.emergency_stop_at == Some(tick) {
            engine.emergency_stop();
        }
        if args.critical_error_at == Some(tick) {
            engine.store_mut().report_error(
                ErrorRecord::new("E999", Severity::Critical, "KUKA Robot")
                    .with_code("ROB_999")
                    .with_description("Injected critical fault"),
            );
        }
        engine.step(period);
    }

    let status = engine.status();
    let flow = engine.flow();
    println!("\nSIMULATION RESULTS:");
    println!("===================");
    println!("Simulated time: {} ms", engine.clock_ms());
    println!(
        "Line: {} (running: {}, critical: {}, acknowledged: {})",
        status.state,
        status.is_running,
        status.critical_error_count,
        status.acknowledged_error_count
    );
    println!(
        "Items: {} spawned, {} in flight, {} retired",
        flow.stats().spawned,
        flow.items().len(),
        flow.stats().retired
    );
    for stage in Stage::ALL {
        let count = flow.state().items_at(stage).count();
        if count > 0 {
            println!("  {:?}: {}", stage, count);
        }
    }
    for color in CubeColor::ALL {
        println!("Sorted {}: {}", color.as_str(), flow.stats().sorted.get(color));
    }
    println!("Robot: {}", flow.state().robot_activity);
    let open = ErrorFilter::new().with_state(ErrorState::Active);
    for record in open.apply(&status.errors) {
        println!(
            "  [{}] {} {}: {}",
            record.severity, record.id, record.component, record.description
        );
    }
    println!(
        "Open errors: {} of {} logged",
        open.apply(&status.errors).len(),
        status.errors.len()
    );
    if let Some(poller) = engine.detection() {
        println!(
            "Detections: {} current, {} polls, {} failed",
            poller.detections().len(),
            poller.polls(),
            poller.failures()
        );
    }

    if let Some(format) = args.export {
        let path = export_to_path(
            &args.export_dir,
            engine.statistics(),
            args.range,
            format,
            Utc::now(),
        )
        .map_err(|e| e.to_string())?;
        println!("Statistics exported to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
