use std::io;

use thiserror::Error;

/// An error to do with memory data collection.
///
/// Every variant is terminal for the current collection cycle; nothing here is
/// retried, and no partial sample accompanies an error.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// A kernel call returned a non-success status code.
    #[error("{call} returned {code}")]
    Syscall { call: &'static str, code: i32 },

    /// A system configuration query (e.g. `hw.memsize`) failed or returned
    /// something unusable.
    #[error("failed to query '{name}': {source}")]
    ConfigQuery {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    /// A kernel statistics session could not be opened.
    #[error("failed to open a kstat session: {0}")]
    SessionOpen(#[source] io::Error),

    /// A named kernel statistics table was not found, or could not be read.
    #[error("failed to look up kstat '{module}:{instance}:{name}': {source}")]
    TableLookup {
        module: &'static str,
        instance: i32,
        name: &'static str,
        #[source]
        source: io::Error,
    },

    /// The collection is unsupported.
    #[error("memstat does not support memory data collection for this platform")]
    Unsupported,
}

impl CollectionError {
    /// Creates a [`CollectionError::TableLookup`] for the kstat `module:instance:name`.
    #[cfg_attr(
        not(any(test, target_os = "solaris", target_os = "illumos")),
        expect(dead_code)
    )]
    pub(crate) fn table_lookup(
        module: &'static str, instance: i32, name: &'static str, source: io::Error,
    ) -> Self {
        CollectionError::TableLookup {
            module,
            instance,
            name,
            source,
        }
    }
}

/// A [`Result`] with the error type being a [`CollectionError`].
pub type CollectionResult<T> = Result<T, CollectionError>;
