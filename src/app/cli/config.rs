//! TOML configuration file loading and settings resolution
//!
//! Precedence is command line, then configuration file, then defaults.

use crate::app::cli::args::Args;
use crate::core::logging::{level_for_verbosity, LogFormat, LogSettings};
use crate::core::retry::PollPolicy;
use crate::pipeline::PipelineConfig;
use crate::queue::{QueueConfig, SourceId};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_RECORDS: usize = 100;
pub const DEFAULT_SOURCES: [SourceId; 4] = [15, 21, 37, 49];
pub const DEFAULT_INTERVAL_MS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Contents of `sensorbuf.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub queue_name: Option<String>,
    pub records: Option<usize>,
    pub sources: Option<Vec<SourceId>>,
    pub interval_ms: Option<u64>,
    pub node_capacity: Option<usize>,
    pub poll_initial_ms: Option<u64>,
    pub poll_max_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<String>,
    pub color: Option<bool>,
}

impl FileConfig {
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `<config dir>/Sensorbuf/sensorbuf.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Sensorbuf").join("sensorbuf.toml"))
}

/// Load the configuration file
///
/// An explicitly named file must exist. Without one, the default location
/// is used if a file is there, otherwise there is no file configuration.
pub async fn load_config_file(
    config_file: Option<PathBuf>,
) -> Result<Option<FileConfig>, ConfigError> {
    let path = match config_file {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound { path });
            }
            path
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    log::debug!("Loading configuration from {}", path.display());
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
    FileConfig::parse(&path, &contents).map(Some)
}

/// Fully resolved run settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub queue_name: String,
    pub records: usize,
    pub sources: Vec<SourceId>,
    pub interval: Duration,
    pub node_capacity: Option<usize>,
    pub poll: PollPolicy,
    pub log: LogSettings,
}

impl Settings {
    /// Merge command line and file values, then validate
    ///
    /// `terminal_color` is used when neither source decides on colour.
    pub fn resolve(
        args: &Args,
        file: Option<FileConfig>,
        terminal_color: bool,
    ) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();

        let sources = if !args.sources.is_empty() {
            args.sources.clone()
        } else {
            file.sources.unwrap_or_else(|| DEFAULT_SOURCES.to_vec())
        };
        let records = args.records.or(file.records).unwrap_or(DEFAULT_RECORDS);
        let node_capacity = args.node_capacity.or(file.node_capacity);

        let defaults = PollPolicy::default();
        let poll = PollPolicy {
            initial_delay: file
                .poll_initial_ms
                .map_or(defaults.initial_delay, Duration::from_millis),
            max_delay: file
                .poll_max_ms
                .map_or(defaults.max_delay, Duration::from_millis),
            max_attempts: None,
        };

        let base_level = args
            .log_level
            .clone()
            .or(file.log_level)
            .unwrap_or_else(|| "info".to_string());
        let log_file = match &args.log_file {
            Some(path) => disabled_or_path(&path.to_string_lossy()),
            None => file.log_file.as_deref().and_then(disabled_or_path),
        };
        let log_format = args.log_format.as_deref().or(file.log_format.as_deref());
        let log = LogSettings {
            level: level_for_verbosity(&base_level, args.verbosity()),
            format: LogFormat::parse_or_default(log_format),
            file: log_file,
            color: args.color_choice().or(file.color).unwrap_or(terminal_color),
        };

        let settings = Self {
            queue_name: file
                .queue_name
                .unwrap_or_else(|| QueueConfig::default().name),
            records,
            sources,
            interval: Duration::from_millis(
                args.interval_ms
                    .or(file.interval_ms)
                    .unwrap_or(DEFAULT_INTERVAL_MS),
            ),
            node_capacity,
            poll,
            log,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        if self.records > 0 && self.sources.is_empty() {
            return invalid("at least one sensor id is required to produce records".to_string());
        }
        if self.node_capacity == Some(0) {
            return invalid("node-capacity must be at least 1".to_string());
        }
        if self.poll.initial_delay.is_zero() || self.poll.initial_delay > self.poll.max_delay {
            return invalid(format!(
                "poll-initial-ms ({}) must be between 1 and poll-max-ms ({})",
                self.poll.initial_delay.as_millis(),
                self.poll.max_delay.as_millis()
            ));
        }
        if self.queue_name.trim().is_empty() {
            return invalid("queue-name must not be empty".to_string());
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut queue = QueueConfig::new(self.queue_name.clone());
        if let Some(capacity) = self.node_capacity {
            queue = queue.with_node_capacity(capacity);
        }
        PipelineConfig {
            queue,
            interval: self.interval,
            poll: self.poll.clone(),
        }
    }
}

// "none" and "-" switch file logging off
fn disabled_or_path(value: &str) -> Option<PathBuf> {
    if value.eq_ignore_ascii_case("none") || value == "-" {
        None
    } else {
        Some(PathBuf::from(value))
    }
}
