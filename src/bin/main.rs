use std::io::{self, Write};

use anyhow::{Context, Result};
use memstat::{
    args::Args,
    collection::memory::{MemoryStatCollector, NativeCounterSource},
    options::{SamplerOptions, read_config},
    sampler::{Sampler, write_field_table},
};

fn main() -> Result<()> {
    let args = Args::from_env();
    let sampler_args = &args.sampler_args;

    let config = read_config(sampler_args.config_location.as_deref())
        .context("Unable to parse or read the config file.")?;
    let options = SamplerOptions::new(sampler_args, &config)
        .context("Found an issue while trying to build the sampler options.")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if sampler_args.list_fields {
        write_field_table(&mut out, &options.prefix)?;
        out.flush()?;

        return Ok(());
    }

    #[cfg(feature = "logging")]
    if let Some(log_file) = &options.log_file {
        let level = if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };

        memstat::utils::logging::init_logger(level, log_file)
            .context("Unable to set up the log file.")?;
    }

    #[cfg(not(feature = "logging"))]
    if options.log_file.is_some() {
        eprintln!("memstat was built without the 'logging' feature, so no log file will be written.");
    }

    log::info!(
        "sampling memory every {} with prefix '{}'",
        humantime::format_duration(options.rate),
        options.prefix
    );

    let sampler = Sampler::new(
        MemoryStatCollector::new(NativeCounterSource::default()),
        options,
    );
    let stats = sampler.run(&mut out)?;

    if stats.succeeded == 0 {
        if let Some(err) = stats.last_error {
            return Err(err).context("Unable to collect any memory statistics.");
        }
    }

    Ok(())
}
