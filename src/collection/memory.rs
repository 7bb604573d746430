//! Memory data collection.
//!
//! A collection cycle resolves the page size, pulls a [`RawCounterSet`] from a
//! platform [`KernelCounterSource`], and turns it into a [`MemorySample`] with
//! [`normalize`]. Which source backs [`get_memory_sample`] is decided at
//! compile time, see [`NativeCounterSource`].
//!
//! Nothing is cached between cycles; every call opens and releases whatever
//! kernel resources it needs.

use std::num::NonZeroU64;

use hashbrown::HashMap;

use crate::collection::error::{CollectionError, CollectionResult};

pub mod kstat;
pub mod mach;
mod normalize;

pub use self::normalize::{FieldSpec, MEMORY_FIELDS, Unit, normalize, normalize_with};

/// The size of a memory page, in bytes. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSize(NonZeroU64);

impl PageSize {
    /// A 4 KiB page, used where the page size can't be queried.
    pub const FOUR_KIB: PageSize = match NonZeroU64::new(4096) {
        Some(size) => PageSize(size),
        None => unreachable!(),
    };

    /// Returns a [`PageSize`], or [`None`] if `bytes` is zero.
    pub fn new(bytes: u64) -> Option<PageSize> {
        NonZeroU64::new(bytes).map(PageSize)
    }

    /// Queries the page size with `sysconf`, falling back to
    /// [`PageSize::FOUR_KIB`] if that fails.
    #[cfg(unix)]
    pub fn from_sysconf() -> PageSize {
        // SAFETY: sysconf has no side effects and `_SC_PAGESIZE` is always a valid name.
        let raw = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

        u64::try_from(raw)
            .ok()
            .and_then(PageSize::new)
            .unwrap_or(PageSize::FOUR_KIB)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// A raw counter value, along with what it counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Amount {
    Pages(u64),
    Bytes(u64),
}

impl Amount {
    /// Returns the amount in bytes. Page counts are multiplied by `page_size`,
    /// saturating at [`u64::MAX`].
    #[inline]
    pub fn as_bytes(self, page_size: PageSize) -> u64 {
        match self {
            Amount::Pages(pages) => pages.saturating_mul(page_size.get()),
            Amount::Bytes(bytes) => bytes,
        }
    }

    /// Returns the amount in whole pages.
    #[inline]
    pub fn as_pages(self, page_size: PageSize) -> u64 {
        match self {
            Amount::Pages(pages) => pages,
            Amount::Bytes(bytes) => bytes / page_size.get(),
        }
    }
}

/// The counters a kernel can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RawCounter {
    Active,
    Inactive,
    Wired,
    Free,
    PageIns,
    PageOuts,
    Total,
}

/// Counters as reported by one backend for one cycle. A [`None`] counter is
/// one the backend doesn't report, which is not the same as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawCounterSet {
    pub active: Option<Amount>,
    pub inactive: Option<Amount>,
    pub wired: Option<Amount>,
    pub free: Option<Amount>,
    pub page_ins: Option<Amount>,
    pub page_outs: Option<Amount>,
    pub total: Option<Amount>,
}

impl RawCounterSet {
    pub fn get(&self, counter: RawCounter) -> Option<Amount> {
        match counter {
            RawCounter::Active => self.active,
            RawCounter::Inactive => self.inactive,
            RawCounter::Wired => self.wired,
            RawCounter::Free => self.free,
            RawCounter::PageIns => self.page_ins,
            RawCounter::PageOuts => self.page_outs,
            RawCounter::Total => self.total,
        }
    }
}

/// One collection cycle's worth of memory metrics, keyed by metric name.
///
/// Keys are unique and unordered. A metric that the platform doesn't report is
/// absent rather than zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemorySample(HashMap<&'static str, f64>);

impl MemorySample {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        MemorySample(HashMap::with_capacity(capacity))
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: f64) {
        self.0.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the unit of a metric in this sample, if present.
    pub fn unit(&self, name: &str) -> Option<Unit> {
        if self.contains(name) {
            normalize::unit_of(name)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.0.iter().map(|(name, value)| (*name, *value))
    }
}

impl IntoIterator for MemorySample {
    type Item = (&'static str, f64);
    type IntoIter = hashbrown::hash_map::IntoIter<&'static str, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Resolves the page size a backend's page counts are measured in.
pub trait PageSizeResolver {
    fn page_size(&self) -> PageSize;
}

/// A platform-specific source of raw memory counters.
pub trait KernelCounterSource {
    /// Fetches the counters. Any failure aborts the whole cycle; no partial
    /// set is ever returned.
    fn fetch_raw_counters(&self) -> CollectionResult<RawCounterSet>;
}

/// Collects a [`MemorySample`] from a counter source.
#[derive(Debug, Default)]
pub struct MemoryStatCollector<S> {
    source: S,
}

impl<S> MemoryStatCollector<S>
where
    S: KernelCounterSource + PageSizeResolver,
{
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one collection cycle. Errors from the source are returned as-is.
    pub fn collect(&self) -> CollectionResult<MemorySample> {
        let page_size = self.source.page_size();
        let raw = self.source.fetch_raw_counters()?;

        Ok(normalize(&raw, page_size))
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "macos")] {
        /// The counter source for this platform, backed by Mach `host_statistics`.
        pub type NativeCounterSource = mach::MachCounterSource<mach::MachHost>;
    } else if #[cfg(any(target_os = "solaris", target_os = "illumos"))] {
        /// The counter source for this platform, backed by `libkstat`.
        pub type NativeCounterSource = kstat::KstatCounterSource<kstat::LibKstat>;
    } else {
        /// There's no counter source for this platform.
        pub type NativeCounterSource = UnsupportedSource;
    }
}

/// A counter source that always fails with [`CollectionError::Unsupported`].
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedSource;

impl PageSizeResolver for UnsupportedSource {
    fn page_size(&self) -> PageSize {
        PageSize::FOUR_KIB
    }
}

impl KernelCounterSource for UnsupportedSource {
    fn fetch_raw_counters(&self) -> CollectionResult<RawCounterSet> {
        Err(CollectionError::Unsupported)
    }
}

/// Collects a [`MemorySample`] using this platform's [`NativeCounterSource`].
pub fn get_memory_sample() -> CollectionResult<MemorySample> {
    MemoryStatCollector::new(NativeCounterSource::default()).collect()
}
