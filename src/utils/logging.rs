//! File logging for debugging. Only built with the `logging` feature.

use std::path::Path;

use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

// The weird "[[[" is because we need to escape a bracket ("[[") to show one "[".
// See https://time-rs.github.io/book/api/format-description.html
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[[[year]-[month]-[day]][[[hour]:[minute]:[second].[subsecond digits:9]]"
);

/// Sets up a global logger that appends to `log_file`, keeping records at or
/// above `min_level`.
pub fn init_logger(min_level: log::LevelFilter, log_file: &Path) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            // Note we aren't using local time since it only works on single-threaded processes.
            let now = OffsetDateTime::now_utc();
            let timestamp = now.format(TIMESTAMP_FORMAT).unwrap_or_default();

            out.finish(format_args!(
                "{}[{}][{}] {}",
                timestamp,
                record.target(),
                record.level(),
                message
            ))
        })
        .level(min_level)
        .chain(fern::log_file(log_file)?)
        .apply()?;

    Ok(())
}
