//! Compilation session and converter cache
//!
//! One [`CompilationSession`] scopes one compilation run. It owns the cache
//! of compiled composite, reference, and parent-extension converters, keyed
//! by fully-qualified record name; every reference to a name within the
//! session resolves to the same converter instance, which is what terminates
//! recursion over self-referencing types.
//!
//! Each cache entry also records the origin it was compiled from, a
//! kind-prefixed string (`path:`, `reference:`, or `extension:`) so entries
//! of different kinds can never share an origin. Two distinct origins that
//! concatenate to the same record name would otherwise alias silently; the
//! session rejects the second one instead.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::converter::ConverterRef;
use crate::error::SchemaError;

struct CacheEntry {
    origin: String,
    converter: ConverterRef,
}

/// Per-run compilation context owning the converter cache.
///
/// The lock gives at-most-one-writer-per-key and read-your-writes visibility,
/// so a host may share one session across threads compiling trees that
/// reference the same types. Entries are never evicted; the cache is
/// discarded with the session.
#[derive(Default)]
pub struct CompilationSession {
    converters: RwLock<IndexMap<String, CacheEntry>>,
}

impl CompilationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The converter previously compiled under `full_name`, if any.
    pub fn get(&self, full_name: &str) -> Option<ConverterRef> {
        self.converters
            .read()
            .get(full_name)
            .map(|entry| Arc::clone(&entry.converter))
    }

    /// Return the converter cached under `full_name`, building and publishing
    /// it when absent.
    ///
    /// On a hit the builder is dropped unused: recompilation of a published
    /// name is idempotent and never alters the published schema, regardless
    /// of what children the caller supplies this time. A hit whose recorded
    /// origin differs from `origin` is a name collision and fails without
    /// touching the cache.
    pub fn get_or_insert(
        &self,
        full_name: &str,
        origin: &str,
        build: impl FnOnce() -> ConverterRef,
    ) -> Result<ConverterRef, SchemaError> {
        let mut converters = self.converters.write();

        if let Some(entry) = converters.get(full_name) {
            if entry.origin != origin {
                return Err(SchemaError::NameCollision {
                    full_name: full_name.to_string(),
                    existing: entry.origin.clone(),
                    conflicting: origin.to_string(),
                });
            }
            log::trace!("cache hit for {full_name}");
            return Ok(Arc::clone(&entry.converter));
        }

        let converter = build();
        converters.insert(
            full_name.to_string(),
            CacheEntry {
                origin: origin.to_string(),
                converter: Arc::clone(&converter),
            },
        );
        Ok(converter)
    }

    /// Fully-qualified names compiled so far, in compilation order.
    pub fn compiled_names(&self) -> Vec<String> {
        self.converters.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.converters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.read().is_empty()
    }
}
