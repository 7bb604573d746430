//! Memory counters for Solaris and illumos, from the `unix:0:system_pages`
//! kstat.
//!
//! Some notes on what the `system_pages` fields mean, since they are sparsely
//! documented:
//!
//! - `physmem` is the number of pages of physical memory (`pagestotal + 1`).
//! - `freemem` is the number of pages on the free list. It is close to, but not
//!   exactly, what `mdb`'s `::memstat` reports as "Free (freelist)"; pages on
//!   the cache list are not counted as free.
//!
//! There's no page size query here, so a 4 KiB page is assumed.

use hashbrown::HashMap;

use super::{Amount, KernelCounterSource, PageSize, PageSizeResolver, RawCounterSet};
use crate::collection::error::CollectionResult;

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
mod bindings;

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
pub use self::bindings::{KstatCtl, LibKstat};

const SYSTEM_PAGES_MODULE: &str = "unix";
const SYSTEM_PAGES_INSTANCE: i32 = 0;
const SYSTEM_PAGES_NAME: &str = "system_pages";

/// A value from a named kstat, tagged with its declared type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamedValue {
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    /// Any other type (chars, strings), holding its `KSTAT_DATA_*` tag.
    Other(u8),
}

/// A snapshot of a named kstat, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamedTable(HashMap<String, NamedValue>);

impl NamedTable {
    pub fn insert(&mut self, name: impl Into<String>, value: NamedValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&NamedValue> {
        self.0.get(name)
    }

    /// Returns a `KSTAT_DATA_UINT64` field. Missing fields, and fields of any
    /// other type, read as zero.
    pub fn uint64_or_zero(&self, name: &str) -> u64 {
        match self.get(name) {
            Some(NamedValue::Uint64(value)) => *value,
            _ => 0,
        }
    }
}

impl<S: Into<String>> FromIterator<(S, NamedValue)> for NamedTable {
    fn from_iter<I: IntoIterator<Item = (S, NamedValue)>>(iter: I) -> Self {
        NamedTable(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

/// Opens kstat sessions.
pub trait KstatProvider {
    type Session: KstatSession;

    /// Opens a session. The session is closed when it is dropped.
    fn open(&self) -> CollectionResult<Self::Session>;
}

/// An open kstat session.
pub trait KstatSession {
    /// Looks up and reads the named kstat `module:instance:name`.
    fn lookup(
        &mut self, module: &'static str, instance: i32, name: &'static str,
    ) -> CollectionResult<NamedTable>;
}

/// Reads memory counters from kstat. A session is opened and closed for every
/// call.
#[derive(Clone, Debug, Default)]
pub struct KstatCounterSource<P> {
    provider: P,
}

impl<P> KstatCounterSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> PageSizeResolver for KstatCounterSource<P> {
    fn page_size(&self) -> PageSize {
        PageSize::FOUR_KIB
    }
}

impl<P: KstatProvider> KernelCounterSource for KstatCounterSource<P> {
    fn fetch_raw_counters(&self) -> CollectionResult<RawCounterSet> {
        let table = {
            let mut session = self.provider.open()?;
            session.lookup(
                SYSTEM_PAGES_MODULE,
                SYSTEM_PAGES_INSTANCE,
                SYSTEM_PAGES_NAME,
            )?
        };

        Ok(RawCounterSet {
            total: Some(Amount::Pages(table.uint64_or_zero("physmem"))),
            free: Some(Amount::Pages(table.uint64_or_zero("freemem"))),
            ..Default::default()
        })
    }
}
