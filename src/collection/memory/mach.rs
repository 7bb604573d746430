//! Memory counters for macOS, from Mach's `host_statistics` and the
//! `hw.memsize` sysctl.

use std::io;

use super::{Amount, KernelCounterSource, PageSize, PageSizeResolver, RawCounterSet};
use crate::collection::error::{CollectionError, CollectionResult};

#[cfg(target_os = "macos")]
mod bindings;

#[cfg(target_os = "macos")]
pub use self::bindings::MachHost;

const HOST_STATISTICS: &str = "host_statistics";
const MEMSIZE: &str = "hw.memsize";

/// The parts of `vm_statistics_data_t` we use. Counts are in pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VmStatistics {
    pub free_count: u32,
    pub active_count: u32,
    pub inactive_count: u32,
    pub wire_count: u32,
    pub pageins: u32,
    pub pageouts: u32,
}

/// The host queries a [`MachCounterSource`] needs.
pub trait HostStatistics {
    /// Queries `HOST_VM_INFO`. On failure, returns the `kern_return_t`.
    fn vm_statistics(&self) -> Result<VmStatistics, i32>;

    /// Returns the raw value of the `hw.memsize` sysctl.
    fn memsize(&self) -> io::Result<Vec<u8>>;

    fn page_size(&self) -> PageSize;
}

/// Reads memory counters from a Mach host.
#[derive(Clone, Debug, Default)]
pub struct MachCounterSource<H> {
    host: H,
}

impl<H> MachCounterSource<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }
}

impl<H: HostStatistics> PageSizeResolver for MachCounterSource<H> {
    fn page_size(&self) -> PageSize {
        self.host.page_size()
    }
}

impl<H: HostStatistics> KernelCounterSource for MachCounterSource<H> {
    fn fetch_raw_counters(&self) -> CollectionResult<RawCounterSet> {
        let vm_stats = self
            .host
            .vm_statistics()
            .map_err(|code| CollectionError::Syscall {
                call: HOST_STATISTICS,
                code,
            })?;

        let memsize = self
            .host
            .memsize()
            .map_err(|source| CollectionError::ConfigQuery {
                name: MEMSIZE,
                source,
            })?;

        let Some(total) = decode_memsize(&memsize) else {
            return Err(CollectionError::ConfigQuery {
                name: MEMSIZE,
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("expected 1 to 8 bytes, got {}", memsize.len()),
                ),
            });
        };

        Ok(RawCounterSet {
            active: Some(Amount::Pages(vm_stats.active_count.into())),
            inactive: Some(Amount::Pages(vm_stats.inactive_count.into())),
            wired: Some(Amount::Pages(vm_stats.wire_count.into())),
            free: Some(Amount::Pages(vm_stats.free_count.into())),
            page_ins: Some(Amount::Pages(vm_stats.pageins.into())),
            page_outs: Some(Amount::Pages(vm_stats.pageouts.into())),
            total: Some(Amount::Bytes(total)),
        })
    }
}

/// Decodes the value of `hw.memsize`, a little-endian `u64`. Trailing zero
/// bytes may have been stripped, so shorter values are zero-extended.
pub fn decode_memsize(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return None;
    }

    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);

    Some(u64::from_le_bytes(buf))
}
