//! Turning raw counters into named metrics.
//!
//! Each quantity is published under its native name, and some also under the
//! name Linux's `/proc/meminfo` uses for it, so that consumers written against
//! Linux hosts keep working. Which names exist is entirely described by
//! [`MEMORY_FIELDS`].

use super::{MemorySample, PageSize, RawCounter, RawCounterSet};

/// The unit a metric's value is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Bytes,
    Pages,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Bytes => "bytes",
            Unit::Pages => "pages",
        }
    }
}

/// How one raw counter is published.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub counter: RawCounter,
    pub name: &'static str,
    pub legacy_name: Option<&'static str>,
    pub unit: Unit,
}

impl FieldSpec {
    const fn new(counter: RawCounter, name: &'static str, unit: Unit) -> Self {
        Self {
            counter,
            name,
            legacy_name: None,
            unit,
        }
    }

    const fn with_legacy(mut self, legacy_name: &'static str) -> Self {
        self.legacy_name = Some(legacy_name);
        self
    }
}

/// Every metric that can show up in a [`MemorySample`].
///
/// Note the swap counters keep their historical `_pages_total` names but hold
/// bytes (page count times page size), matching what existing Darwin
/// dashboards expect.
pub const MEMORY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(RawCounter::Active, "active_bytes_total", Unit::Bytes),
    FieldSpec::new(RawCounter::Inactive, "inactive_bytes_total", Unit::Bytes)
        .with_legacy("Inactive"),
    FieldSpec::new(RawCounter::Wired, "wired_bytes_total", Unit::Bytes),
    FieldSpec::new(RawCounter::Free, "free_bytes_total", Unit::Bytes).with_legacy("MemFree"),
    FieldSpec::new(RawCounter::PageIns, "swapped_in_pages_total", Unit::Bytes),
    FieldSpec::new(RawCounter::PageOuts, "swapped_out_pages_total", Unit::Bytes),
    FieldSpec::new(RawCounter::Total, "bytes_total", Unit::Bytes).with_legacy("MemTotal"),
];

/// Normalizes `raw` using [`MEMORY_FIELDS`].
pub fn normalize(raw: &RawCounterSet, page_size: PageSize) -> MemorySample {
    normalize_with(raw, page_size, MEMORY_FIELDS)
}

/// Normalizes `raw` using the given field table. Counters the table doesn't
/// mention, and counters `raw` doesn't have, are skipped.
pub fn normalize_with(
    raw: &RawCounterSet, page_size: PageSize, fields: &[FieldSpec],
) -> MemorySample {
    let mut sample = MemorySample::with_capacity(fields.len() * 2);

    for field in fields {
        let Some(amount) = raw.get(field.counter) else {
            continue;
        };

        let value = match field.unit {
            Unit::Bytes => amount.as_bytes(page_size),
            Unit::Pages => amount.as_pages(page_size),
        } as f64;

        sample.insert(field.name, value);
        if let Some(legacy_name) = field.legacy_name {
            sample.insert(legacy_name, value);
        }
    }

    sample
}

/// Looks up the unit of a native or legacy metric name.
pub(super) fn unit_of(name: &str) -> Option<Unit> {
    MEMORY_FIELDS
        .iter()
        .find(|field| field.name == name || field.legacy_name == Some(name))
        .map(|field| field.unit)
}
