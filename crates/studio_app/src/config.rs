use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use studio_engine::{ensure_output_dir, ApiError, ApiSettings, PersistError, DEFAULT_API_BASE};
use studio_logging::{LogDestination, DEFAULT_LOG_FILE};
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "plan2scene")]
#[command(about = "Plan2Scene Studio: turn 2D floorplans into 3D interior previews")]
#[command(version)]
pub struct Cli {
    /// Floorplan image (PNG or JPEG). Without it, paths are read from stdin.
    pub file: Option<PathBuf>,

    /// Base URL of the job API
    #[arg(long, env = "PLAN2SCENE_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Milliseconds between two status requests
    #[arg(long, env = "PLAN2SCENE_POLL_MS", default_value_t = 1500)]
    pub poll_ms: u64,

    /// Save the preview image and walkthrough video here once a job is done
    #[arg(long, value_name = "DIR")]
    pub download: Option<PathBuf>,

    /// Check that the API answers, then exit
    #[arg(long)]
    pub check: bool,

    /// Log file location
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Mirror the log on the terminal at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base url {url:?}: {source}")]
    ApiBase { url: String, source: ApiError },
    #[error("poll interval must be at least 1 ms")]
    PollInterval,
    #[error("--check cannot be combined with a floorplan file")]
    CheckWithFile,
    #[error("download directory unusable: {0}")]
    DownloadDir(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Probe `/api/health` and exit.
    Check,
    /// Submit one file, follow it to a terminal status, exit.
    Single(PathBuf),
    /// Read floorplan paths from stdin until `quit` or EOF.
    Interactive,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub poll_interval: Duration,
    pub download_dir: Option<PathBuf>,
    pub mode: RunMode,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let base_url = match cli.api_base.trim() {
            "" => DEFAULT_API_BASE.to_string(),
            trimmed => trimmed.to_string(),
        };
        let api = ApiSettings {
            base_url,
            ..ApiSettings::default()
        };
        api.endpoint(&[]).map_err(|source| ConfigError::ApiBase {
            url: api.base_url.clone(),
            source,
        })?;

        if cli.poll_ms == 0 {
            return Err(ConfigError::PollInterval);
        }

        let mode = match (cli.check, cli.file) {
            (true, Some(_)) => return Err(ConfigError::CheckWithFile),
            (true, None) => RunMode::Check,
            (false, Some(file)) => RunMode::Single(file),
            (false, None) => RunMode::Interactive,
        };

        if let Some(dir) = &cli.download {
            ensure_output_dir(dir)?;
        }

        let (log_destination, log_level) = if cli.verbose {
            (LogDestination::Both(cli.log_file), LevelFilter::Debug)
        } else {
            (LogDestination::File(cli.log_file), LevelFilter::Info)
        };

        Ok(Self {
            api,
            poll_interval: Duration::from_millis(cli.poll_ms),
            download_dir: cli.download,
            mode,
            log_destination,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["plan2scene"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid args")
    }

    #[test]
    fn file_argument_selects_single_mode() {
        let config = AppConfig::from_cli(parse(&[
            "--api-base",
            "http://studio.test:9000",
            "plan.png",
        ]))
        .unwrap();

        assert_eq!(config.mode, RunMode::Single(PathBuf::from("plan.png")));
        assert_eq!(config.api.base_url, "http://studio.test:9000");
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn no_file_means_interactive_with_default_interval() {
        let config = AppConfig::from_cli(parse(&["--api-base", "http://localhost:8000"])).unwrap();

        assert_eq!(config.mode, RunMode::Interactive);
        assert_eq!(config.poll_interval, Duration::from_millis(1500));
        assert_eq!(config.download_dir, None);
    }

    #[test]
    fn blank_api_base_falls_back_to_default() {
        let config = AppConfig::from_cli(parse(&["--api-base", "  "])).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn rejects_bad_base_url_and_zero_interval() {
        let err = AppConfig::from_cli(parse(&["--api-base", "localhost"])).unwrap_err();
        assert!(matches!(err, ConfigError::ApiBase { .. }));

        let err = AppConfig::from_cli(parse(&[
            "--api-base",
            "http://localhost:8000",
            "--poll-ms",
            "0",
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::PollInterval));
    }

    #[test]
    fn check_conflicts_with_file() {
        let err = AppConfig::from_cli(parse(&[
            "--api-base",
            "http://localhost:8000",
            "--check",
            "plan.png",
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::CheckWithFile));
    }

    #[test]
    fn download_dir_is_checked_up_front() {
        let temp = tempfile::TempDir::new().unwrap();
        let file_path = temp.path().join("plan.png");
        std::fs::write(&file_path, b"png").unwrap();

        let err = AppConfig::from_cli(parse(&[
            "--api-base",
            "http://localhost:8000",
            "--download",
            file_path.to_str().unwrap(),
            "plan.png",
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DownloadDir(PersistError::NotADirectory(_))
        ));

        let renders = temp.path().join("renders");
        let config = AppConfig::from_cli(parse(&[
            "--api-base",
            "http://localhost:8000",
            "--download",
            renders.to_str().unwrap(),
        ]))
        .unwrap();
        assert_eq!(config.download_dir, Some(renders.clone()));
        assert!(renders.is_dir());
    }

    #[test]
    fn verbose_logs_to_both_at_debug() {
        let config = AppConfig::from_cli(parse(&[
            "--api-base",
            "http://localhost:8000",
            "-v",
            "--log-file",
            "/tmp/p2s.log",
        ]))
        .unwrap();
        assert_eq!(
            config.log_destination,
            LogDestination::Both(PathBuf::from("/tmp/p2s.log"))
        );
        assert_eq!(config.log_level, LevelFilter::Debug);
    }
}
