//! A library for memstat, a memory statistics sampler.
//!
//! The interesting part is [`collection::memory`], which reads kernel memory
//! counters on macOS (Mach `host_statistics`) and on Solaris/illumos (`kstat`)
//! and normalizes them into byte-valued metrics. The rest is the harness the
//! `memstat` binary runs on top of it.

pub mod args;
pub mod collection;
pub mod options;
pub mod sampler;

pub mod utils {
    #[cfg(feature = "logging")]
    pub mod logging;
}
