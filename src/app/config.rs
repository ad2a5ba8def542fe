//! Configuration file loading and CLI/file/default resolution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use segstitch_core::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use segstitch_core::pipeline::{MAX_LANES, MIN_LANES};
use segstitch_core::{DEFAULT_FETCH_CHUNK_SIZE, DEFAULT_LANE_COUNT};

use crate::cli::Args;

const MAX_TIMEOUT_SECS: u64 = 3600;

/// Key = value file configuration for recorder defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FileConfig {
    /// Directory relative output paths are placed in.
    pub output_dir: Option<PathBuf>,
    /// Default number of fetch lanes.
    pub lanes: Option<usize>,
    /// Default segment read granularity in bytes.
    pub chunk_size: Option<usize>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    /// Keep partial output on abort.
    pub keep_partial: Option<bool>,
}

impl FileConfig {
    /// Validates config values against the same ranges the CLI enforces.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(lanes) = self.lanes
            && !(MIN_LANES..=MAX_LANES).contains(&lanes)
        {
            bail!(
                "Invalid config value for `lanes`: {lanes}. Expected range: {MIN_LANES}..={MAX_LANES}"
            );
        }
        if self.chunk_size == Some(0) {
            bail!("Invalid config value for `chunk_size`: 0. Expected a positive byte count");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=MAX_TIMEOUT_SECS).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..={MAX_TIMEOUT_SECS}");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/segstitch/config.toml`
/// 2. `$HOME/.config/segstitch/config.toml`
#[must_use]
pub(crate) fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("segstitch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("segstitch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub(crate) fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

pub(crate) fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "lanes" => {
                cfg.lanes = Some(parse_usize(value).with_context(context)?);
            }
            "chunk_size" => {
                cfg.chunk_size = Some(parse_usize(value).with_context(context)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "keep_partial" => {
                cfg.keep_partial = Some(parse_boolean(value).with_context(context)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_usize(raw_value: &str) -> Result<usize> {
    let value = parse_integer_u64(raw_value)?;
    usize::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for usize"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

/// Effective settings for one recording run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSettings {
    pub output: PathBuf,
    pub lanes: usize,
    pub chunk_size: usize,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub keep_partial: bool,
}

/// Merges CLI flags over file config over built-in defaults.
pub(crate) fn resolve_settings(args: &Args, file: Option<&FileConfig>) -> Result<RunSettings> {
    let file = file.cloned().unwrap_or_default();

    let chunk_size = match args.chunk_size {
        Some(bytes) => usize::try_from(bytes)
            .with_context(|| format!("--chunk-size {bytes} does not fit in memory"))?,
        None => file.chunk_size.unwrap_or(DEFAULT_FETCH_CHUNK_SIZE),
    };

    let output = match &file.output_dir {
        Some(dir) if args.output.is_relative() => dir.join(&args.output),
        _ => args.output.clone(),
    };

    Ok(RunSettings {
        output,
        lanes: args
            .lanes
            .map(usize::from)
            .or(file.lanes)
            .unwrap_or(DEFAULT_LANE_COUNT),
        chunk_size,
        connect_timeout_secs: args
            .connect_timeout
            .or(file.connect_timeout_secs)
            .unwrap_or(CONNECT_TIMEOUT_SECS),
        read_timeout_secs: args
            .read_timeout
            .or(file.read_timeout_secs)
            .unwrap_or(READ_TIMEOUT_SECS),
        keep_partial: args.keep_partial || file.keep_partial.unwrap_or(false),
    })
}
