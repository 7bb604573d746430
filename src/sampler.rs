//! Periodic collection. Runs the collector on a fixed rate and writes each
//! successful sample out as `<prefix><name> <value>` lines.

use std::{
    io::{self, Write},
    thread,
    time::Instant,
};

use itertools::Itertools;

use crate::{
    collection::{
        error::CollectionError,
        memory::{
            KernelCounterSource, MEMORY_FIELDS, MemorySample, MemoryStatCollector,
            PageSizeResolver,
        },
    },
    options::SamplerOptions,
};

/// What happened over a sampling run.
#[derive(Debug, Default)]
pub struct SamplerStats {
    pub succeeded: u64,
    pub failed: u64,
    /// The error from the most recent failed cycle, if any.
    pub last_error: Option<CollectionError>,
}

impl SamplerStats {
    pub fn cycles(&self) -> u64 {
        self.succeeded + self.failed
    }
}

pub struct Sampler<S> {
    collector: MemoryStatCollector<S>,
    options: SamplerOptions,
}

impl<S> Sampler<S>
where
    S: KernelCounterSource + PageSizeResolver,
{
    pub fn new(collector: MemoryStatCollector<S>, options: SamplerOptions) -> Self {
        Self { collector, options }
    }

    /// Runs collection cycles until the configured count is reached, or forever
    /// if there is none.
    ///
    /// A failed cycle is logged and skipped; it doesn't stop the run. Only a
    /// failure to write to `out` does.
    pub fn run<W: Write>(&self, out: &mut W) -> io::Result<SamplerStats> {
        let mut stats = SamplerStats::default();

        loop {
            let start = Instant::now();

            match self.collector.collect() {
                Ok(sample) => {
                    stats.succeeded += 1;
                    log::debug!("collected {} memory metrics", sample.len());

                    write_sample(out, &self.options.prefix, &sample)?;
                    out.flush()?;
                }
                Err(err) => {
                    stats.failed += 1;
                    log::warn!("skipping collection cycle {}: {err}", stats.cycles());

                    stats.last_error = Some(err);
                }
            }

            if self
                .options
                .count
                .is_some_and(|count| stats.cycles() >= count.get())
            {
                break;
            }

            thread::sleep(self.options.rate.saturating_sub(start.elapsed()));
        }

        Ok(stats)
    }
}

/// Writes a sample as one `<prefix><name> <value>` line per metric, sorted by
/// name, followed by a blank line.
pub fn write_sample<W: Write>(out: &mut W, prefix: &str, sample: &MemorySample) -> io::Result<()> {
    for (name, value) in sample.iter().sorted_unstable_by_key(|(name, _)| *name) {
        writeln!(out, "{prefix}{name} {value}")?;
    }

    writeln!(out)
}

/// Writes every metric that can be reported, alongside its legacy alias, unit,
/// and the kernel counter it comes from.
pub fn write_field_table<W: Write>(out: &mut W, prefix: &str) -> io::Result<()> {
    let rows = MEMORY_FIELDS
        .iter()
        .map(|field| {
            [
                format!("{prefix}{}", field.name),
                field
                    .legacy_name
                    .map(|legacy_name| format!("{prefix}{legacy_name}"))
                    .unwrap_or_else(|| "-".to_string()),
                field.unit.as_str().to_string(),
                format!("{:?}", field.counter),
            ]
        })
        .collect_vec();

    let header = ["NAME", "ALIAS", "UNIT", "COUNTER"].map(String::from);
    let widths = std::iter::once(&header)
        .chain(&rows)
        .fold([0; 4], |mut widths, row| {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
            widths
        });

    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::{cell::Cell, num::NonZeroU64, time::Duration};

    use super::*;
    use crate::collection::{
        error::CollectionResult,
        memory::{Amount, PageSize, RawCounterSet},
    };

    /// Fails on the cycles listed in `fail_on` (1-based), succeeds otherwise.
    struct FlakySource {
        fail_on: Vec<usize>,
        calls: Cell<usize>,
    }

    impl FlakySource {
        fn new(fail_on: Vec<usize>) -> Self {
            Self {
                fail_on,
                calls: Cell::new(0),
            }
        }
    }

    impl PageSizeResolver for FlakySource {
        fn page_size(&self) -> PageSize {
            PageSize::FOUR_KIB
        }
    }

    impl KernelCounterSource for FlakySource {
        fn fetch_raw_counters(&self) -> CollectionResult<RawCounterSet> {
            let call = self.calls.get() + 1;
            self.calls.set(call);

            if self.fail_on.contains(&call) {
                Err(CollectionError::Syscall {
                    call: "host_statistics",
                    code: 5,
                })
            } else {
                Ok(RawCounterSet {
                    free: Some(Amount::Pages(2)),
                    total: Some(Amount::Bytes(65536)),
                    ..Default::default()
                })
            }
        }
    }

    fn options(count: u64) -> SamplerOptions {
        SamplerOptions {
            rate: Duration::ZERO,
            count: NonZeroU64::new(count),
            prefix: "node_memory_".to_string(),
            log_file: None,
        }
    }

    fn sampler(fail_on: Vec<usize>, count: u64) -> Sampler<FlakySource> {
        Sampler::new(
            MemoryStatCollector::new(FlakySource::new(fail_on)),
            options(count),
        )
    }

    #[test]
    fn test_write_sample_is_sorted() {
        let sampler = sampler(vec![], 1);
        let mut out = Vec::new();
        sampler.run(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "node_memory_MemFree 8192\n\
            node_memory_MemTotal 65536\n\
            node_memory_bytes_total 65536\n\
            node_memory_free_bytes_total 8192\n\
            \n"
        );
    }

    #[test]
    fn test_runs_count_cycles() {
        let sampler = sampler(vec![], 3);
        let mut out = Vec::new();
        let stats = sampler.run(&mut out).unwrap();

        assert_eq!(stats.succeeded, 3);
        assert_eq!(stats.failed, 0);
        assert!(stats.last_error.is_none());
        assert_eq!(sampler.collector.source().calls.get(), 3);
        assert_eq!(String::from_utf8(out).unwrap().matches("\n\n").count(), 3);
    }

    #[test]
    fn test_failed_cycles_are_skipped() {
        let sampler = sampler(vec![2], 3);
        let mut out = Vec::new();
        let stats = sampler.run(&mut out).unwrap();

        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert!(matches!(
            stats.last_error,
            Some(CollectionError::Syscall { code: 5, .. })
        ));
        assert_eq!(
            String::from_utf8(out)
                .unwrap()
                .matches("node_memory_bytes_total 65536")
                .count(),
            2
        );
    }

    #[test]
    fn test_all_cycles_failing() {
        let sampler = sampler(vec![1, 2], 2);
        let mut out = Vec::new();
        let stats = sampler.run(&mut out).unwrap();

        assert_eq!(stats.succeeded, 0);
        assert_eq!(stats.cycles(), 2);
        assert!(out.is_empty());
    }

    #[test]
    fn test_custom_prefix() {
        let mut sampler = sampler(vec![], 1);
        sampler.options.prefix = String::new();

        let mut out = Vec::new();
        sampler.run(&mut out).unwrap();

        assert!(String::from_utf8(out).unwrap().starts_with("MemFree 8192\n"));
    }

    #[test]
    fn test_field_table() {
        let mut out = Vec::new();
        write_field_table(&mut out, "node_memory_").unwrap();
        let table = String::from_utf8(out).unwrap();
        let lines = table.lines().collect_vec();

        assert_eq!(lines.len(), MEMORY_FIELDS.len() + 1);
        assert!(lines[0].starts_with("NAME"));
        assert!(table.contains("node_memory_bytes_total"));
        assert!(table.contains("node_memory_MemTotal"));

        let swapped_in = lines
            .iter()
            .find(|line| line.starts_with("node_memory_swapped_in_pages_total"))
            .unwrap();
        assert!(swapped_in.contains("bytes"));
        assert!(swapped_in.ends_with("PageIns"));
    }
}
