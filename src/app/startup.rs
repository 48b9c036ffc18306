//! Application startup
//!
//! Parse arguments, resolve settings, start logging, then run the sensor
//! pipeline under shutdown coordination.

use crate::app::cli::args::Args;
use crate::app::cli::config::{load_config_file, Settings};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version;
use crate::pipeline::{
    CountingSink, LogSink, Pipeline, PipelineReport, PipelineResult, RecordSink, SimulatedSource,
};
use crate::queue::DEFAULT_ROLES;
use clap::Parser;
use std::io::IsTerminal;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
/// The pipeline stopped early on an interrupt and tore the queue down cleanly
pub const EXIT_INTERRUPTED: i32 = 3;

/// Run the application and return the process exit code
pub async fn startup() -> i32 {
    let args = Args::parse();

    let file_config = match load_config_file(args.config_file.clone()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG;
        }
    };
    let settings = match Settings::resolve(&args, file_config, std::io::stderr().is_terminal()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG;
        }
    };

    if let Err(e) = init_logging(&settings.log) {
        eprintln!("Error: failed to start logging: {}", e);
        return EXIT_FAILURE;
    }
    log::info!("{}", version::version_banner());
    log::debug!("Settings: {:?}", settings);

    let data_view = CountingSink::new("data");
    let sink_view = data_view.clone();
    let outcome = ShutdownCoordinator::guard(|shutdown| async move {
        run_pipeline(&settings, sink_view, &shutdown).await
    })
    .await;

    match outcome {
        Ok(report) => {
            for line in report.to_string().lines() {
                log::info!("{}", line);
            }
            log_sensor_summary(&data_view);
            exit_code(&report)
        }
        Err(e) => {
            log_error_with_context(&e, "Running sensor pipeline");
            EXIT_FAILURE
        }
    }
}

/// Exit status for a pipeline run that returned a report
pub fn exit_code(report: &PipelineReport) -> i32 {
    if report.interrupted {
        EXIT_INTERRUPTED
    } else {
        EXIT_OK
    }
}

async fn run_pipeline(
    settings: &Settings,
    data_sink: CountingSink,
    shutdown: &ShutdownCoordinator,
) -> PipelineResult<PipelineReport> {
    let source = SimulatedSource::new(settings.sources.clone(), settings.records);
    let sinks = sinks_for_roles(data_sink, DEFAULT_ROLES);
    Pipeline::<DEFAULT_ROLES>::run(settings.pipeline_config(), source, sinks, shutdown).await
}

/// Role 0 aggregates, role 1 stands in for storage, any further roles log
pub fn sinks_for_roles(data_sink: CountingSink, roles: usize) -> Vec<Box<dyn RecordSink>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::with_capacity(roles);
    if roles > 0 {
        sinks.push(Box::new(data_sink));
    }
    for role in 1..roles {
        let name = if role == 1 {
            "storage".to_string()
        } else {
            format!("reader-{}", role)
        };
        sinks.push(Box::new(LogSink::new(name)));
    }
    sinks
}

fn log_sensor_summary(view: &CountingSink) {
    match view.tallies() {
        Ok(tallies) => {
            for (sensor, tally) in tallies {
                log::info!(
                    "sensor {}: {} readings, last {:.2}",
                    sensor,
                    tally.count,
                    tally.last_value
                );
            }
        }
        Err(e) => log::warn!("Sensor summary unavailable: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shutdown::FORCED_EXIT_CODE;
    use crate::queue::QueueStats;

    fn report(interrupted: bool) -> PipelineReport {
        PipelineReport {
            produced: 0,
            roles: Vec::new(),
            final_stats: QueueStats {
                nodes: 0,
                reclaimable: 0,
                pending_per_role: vec![0; DEFAULT_ROLES],
                inserted: 0,
                removed: 0,
            },
            discarded: 0,
            interrupted,
        }
    }

    #[test]
    fn test_exit_code_for_completed_run() {
        assert_eq!(exit_code(&report(false)), EXIT_OK);
    }

    #[test]
    fn test_interrupted_run_is_not_a_forced_exit() {
        assert_eq!(exit_code(&report(true)), EXIT_INTERRUPTED);
        assert_ne!(EXIT_INTERRUPTED, FORCED_EXIT_CODE);
        assert_ne!(EXIT_INTERRUPTED, EXIT_FAILURE);
        assert_ne!(EXIT_INTERRUPTED, EXIT_CONFIG);
    }

    #[test]
    fn test_sinks_for_two_roles() {
        let sinks = sinks_for_roles(CountingSink::new("data"), 2);
        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["data", "storage"]);
    }

    #[test]
    fn test_sinks_for_more_roles() {
        let sinks = sinks_for_roles(CountingSink::new("data"), 4);
        let names: Vec<&str> = sinks.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["data", "storage", "reader-2", "reader-3"]);
        assert!(sinks_for_roles(CountingSink::new("data"), 0).is_empty());
    }
}
