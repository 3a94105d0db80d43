//! Command-line arguments and resolved runtime configuration
//!
//! Priority for each setting: command line, then environment variable (both
//! handled by clap), then the TOML file, then the compiled default.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rand::Rng;
use svgb_common::config::{load_toml_config, Directories, TomlConfig};

use crate::error::Result;
use crate::naming::{NamingRules, ProcessingMode};
use crate::store::DEFAULT_IO_TIMEOUT;

/// Default input directory
pub const DEFAULT_IN: &str = "./input";

/// Default output directory
pub const DEFAULT_OUT: &str = "./cropped";

/// Range the default port is drawn from
pub const DEFAULT_PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8900;

/// Command-line arguments for svgb-cropper
#[derive(Parser, Debug, Clone)]
#[command(name = "svgb-cropper")]
#[command(about = "Trim the whitespace from a directory of SVG icons.")]
#[command(version)]
pub struct Args {
    /// The input directory of SVG files
    #[arg(long = "in", default_value = DEFAULT_IN, env = "SVGB_INPUT")]
    pub input: PathBuf,

    /// The output directory
    #[arg(long = "out", default_value = DEFAULT_OUT, env = "SVGB_OUTPUT")]
    pub output: PathBuf,

    /// The port number for the converter server (random 8000-8900 if unset)
    #[arg(short, long, env = "SVGB_PORT")]
    pub port: Option<u16>,

    /// Produce outline icons (appends the outline suffix to output names)
    #[arg(long)]
    pub outline: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "SVGB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Timeout for a single asset read or write, in milliseconds
    #[arg(long, env = "SVGB_IO_TIMEOUT_MS")]
    pub io_timeout_ms: Option<u64>,

    /// Do not open the UI in a browser on startup
    #[arg(long)]
    pub no_open: bool,
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone)]
pub struct CropperConfig {
    pub dirs: Directories,
    pub port: u16,
    pub mode: ProcessingMode,
    pub io_timeout: Duration,
    pub open_browser: bool,
    pub rules: NamingRules,
}

impl CropperConfig {
    /// Load the TOML file named by the arguments and resolve everything
    pub fn load(args: &Args) -> Result<Self> {
        let toml = load_toml_config(args.config.as_deref())?;
        Self::resolve(args, &toml)
    }

    /// Merge arguments over file values over defaults, and prepare directories
    pub fn resolve(args: &Args, toml: &TomlConfig) -> Result<Self> {
        let dirs = Directories::prepare(&args.input, &args.output)?;

        let port = args
            .port
            .or(toml.port)
            .unwrap_or_else(|| rand::thread_rng().gen_range(DEFAULT_PORT_RANGE));

        let io_timeout = args
            .io_timeout_ms
            .or(toml.io_timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_IO_TIMEOUT);

        let mode = if args.outline {
            ProcessingMode::Alternate
        } else {
            ProcessingMode::Normal
        };

        Ok(Self {
            dirs,
            port,
            mode,
            io_timeout,
            open_browser: !args.no_open && toml.open_browser.unwrap_or(true),
            rules: NamingRules::from_config(&toml.naming),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgb_common::config::NamingConfig;
    use tempfile::TempDir;

    fn args_for(root: &TempDir, extra: &[&str]) -> Args {
        let input = root.path().join("in");
        std::fs::create_dir_all(&input).unwrap();
        let output = root.path().join("out");
        let mut argv = vec![
            "svgb-cropper".to_string(),
            "--in".to_string(),
            input.display().to_string(),
            "--out".to_string(),
            output.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let root = TempDir::new().unwrap();
        let config = CropperConfig::resolve(&args_for(&root, &[]), &TomlConfig::default()).unwrap();

        assert!(DEFAULT_PORT_RANGE.contains(&config.port));
        assert_eq!(config.mode, ProcessingMode::Normal);
        assert_eq!(config.io_timeout, DEFAULT_IO_TIMEOUT);
        assert!(config.open_browser);
        assert_eq!(config.rules, NamingRules::default());
        assert!(config.dirs.output.is_dir());
    }

    #[test]
    fn test_cli_overrides_file() {
        let root = TempDir::new().unwrap();
        let toml = TomlConfig {
            port: Some(8100),
            io_timeout_ms: Some(100),
            open_browser: Some(true),
            naming: NamingConfig::default(),
        };
        let args = args_for(
            &root,
            &["--port", "8200", "--io-timeout-ms", "900", "--outline", "--no-open"],
        );

        let config = CropperConfig::resolve(&args, &toml).unwrap();
        assert_eq!(config.port, 8200);
        assert_eq!(config.io_timeout, Duration::from_millis(900));
        assert_eq!(config.mode, ProcessingMode::Alternate);
        assert!(!config.open_browser);
    }

    #[test]
    fn test_file_values_used_when_cli_silent() {
        let root = TempDir::new().unwrap();
        let toml = TomlConfig {
            port: Some(8100),
            io_timeout_ms: Some(100),
            open_browser: Some(false),
            naming: NamingConfig {
                prefix: Some("x-".to_string()),
                ..NamingConfig::default()
            },
        };

        let config = CropperConfig::resolve(&args_for(&root, &[]), &toml).unwrap();
        assert_eq!(config.port, 8100);
        assert_eq!(config.io_timeout, Duration::from_millis(100));
        assert!(!config.open_browser);
        assert_eq!(config.rules.prefix, "x-");
    }
}
