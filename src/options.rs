//! Settings for the sampler, merged from the config file and arguments.
//! Arguments take priority over the config file, which takes priority over
//! the defaults.

pub mod config;
pub mod error;

use std::{
    fs,
    num::NonZeroU64,
    path::{Path, PathBuf},
    time::Duration,
};

use self::{
    config::{Config, SamplerConfig, StringOrNum},
    error::{OptionError, OptionResult},
};
use crate::args::SamplerArgs;

/// Where the config file lives, relative to the OS config directory.
pub const DEFAULT_CONFIG_FILE_LOCATION: &str = "memstat/memstat.toml";

pub const DEFAULT_RATE: Duration = Duration::from_secs(5);
pub const MIN_RATE: Duration = Duration::from_millis(250);
pub const DEFAULT_PREFIX: &str = "node_memory_";

/// Resolved settings for a sampling run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplerOptions {
    /// The time between the start of one cycle and the next.
    pub rate: Duration,
    /// How many cycles to run; [`None`] means no limit.
    pub count: Option<NonZeroU64>,
    /// Prepended to every metric name on output.
    pub prefix: String,
    pub log_file: Option<PathBuf>,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            count: None,
            prefix: DEFAULT_PREFIX.to_string(),
            log_file: None,
        }
    }
}

impl SamplerOptions {
    pub fn new(args: &SamplerArgs, config: &Config) -> OptionResult<Self> {
        let sampler_config = config.sampler.clone().unwrap_or_default();

        Ok(Self {
            rate: get_rate(args, &sampler_config)?,
            count: get_count(args, &sampler_config),
            prefix: get_prefix(args, &sampler_config)?,
            log_file: args
                .log_file
                .as_ref()
                .or(sampler_config.log_file.as_ref())
                .map(PathBuf::from),
        })
    }
}

/// Returns the path of the config file to read. An explicit location is used
/// as-is; otherwise the default location under the OS config directory is
/// used, if there is one.
pub fn get_config_path(override_config_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_config_path {
        return Some(path.to_path_buf());
    }

    dirs::config_dir().map(|path| path.join(DEFAULT_CONFIG_FILE_LOCATION))
}

/// Reads and parses the config file.
///
/// A missing file at the default location is not an error, and gives an empty
/// [`Config`]. A missing file that was explicitly asked for is.
pub fn read_config(config_location: Option<&str>) -> OptionResult<Config> {
    let explicit = config_location.is_some();
    let Some(path) = get_config_path(config_location.map(Path::new)) else {
        return Ok(Config::default());
    };

    match fs::read_to_string(&path) {
        Ok(contents) => Ok(toml_edit::de::from_str(&contents)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
            Ok(Config::default())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(OptionError::config(
            format!("the config file '{}' does not exist.", path.display()),
        )),
        Err(err) => Err(err.into()),
    }
}

/// Parses a duration, either as a plain number of milliseconds or as a human
/// duration like `5s` or `1m 30s`.
fn try_parse_ms(s: &str) -> Result<Duration, ()> {
    if let Ok(ms) = s.parse::<u64>() {
        Ok(Duration::from_millis(ms))
    } else {
        humantime::parse_duration(s).map_err(|_| ())
    }
}

fn get_rate(args: &SamplerArgs, config: &SamplerConfig) -> OptionResult<Duration> {
    let rate = if let Some(rate) = &args.rate {
        try_parse_ms(rate).map_err(|_| OptionError::invalid_arg_value("rate"))?
    } else if let Some(rate) = &config.rate {
        match rate {
            StringOrNum::String(s) => {
                try_parse_ms(s).map_err(|_| OptionError::invalid_config_value("rate"))?
            }
            StringOrNum::Num(ms) => Duration::from_millis(*ms),
        }
    } else {
        return Ok(DEFAULT_RATE);
    };

    if rate < MIN_RATE {
        return Err(OptionError::config(
            "set your update rate to be at least 250 milliseconds.",
        ));
    }

    Ok(rate)
}

fn get_count(args: &SamplerArgs, config: &SamplerConfig) -> Option<NonZeroU64> {
    args.count.or(config.count).and_then(NonZeroU64::new)
}

fn get_prefix(args: &SamplerArgs, config: &SamplerConfig) -> OptionResult<String> {
    if let Some(prefix) = &args.prefix {
        if is_valid_prefix(prefix) {
            Ok(prefix.clone())
        } else {
            Err(OptionError::invalid_arg_value("prefix"))
        }
    } else if let Some(prefix) = &config.prefix {
        if is_valid_prefix(prefix) {
            Ok(prefix.clone())
        } else {
            Err(OptionError::invalid_config_value("prefix"))
        }
    } else {
        Ok(DEFAULT_PREFIX.to_string())
    }
}

/// A prefix may be empty; otherwise it must match `[a-zA-Z_:][a-zA-Z0-9_:]*`.
fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();

    match chars.next() {
        None => true,
        Some(first) if first.is_ascii_digit() => false,
        Some(first) => std::iter::once(first)
            .chain(chars)
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':'),
    }
}
