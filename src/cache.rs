//! Compiled-query cache.
//!
//! Compilation is deterministic for a fixed resolver and registry, so the
//! generated SQL for a given (query text, dialect) pair can be reused
//! across executions with different parameter bindings. The cache is
//! externally owned: the compiler itself stays stateless, and the host
//! decides when to invalidate (after changing entity registrations, for
//! instance, `clear` is the host's responsibility).
//!
//! Reads take a shared lock; a miss compiles outside any lock and only
//! takes the write lock to publish the result. Two racing compilations of
//! the same text both succeed; the first published entry wins.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::{CompiledQuery, Compiler};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<Dialect, HashMap<String, Arc<CompiledQuery>>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str, dialect: Dialect) -> Option<Arc<CompiledQuery>> {
        self.entries
            .read()
            .get(&dialect)
            .and_then(|per_dialect| per_dialect.get(text))
            .cloned()
    }

    pub fn insert(&self, text: impl Into<String>, dialect: Dialect, compiled: Arc<CompiledQuery>) {
        self.entries
            .write()
            .entry(dialect)
            .or_default()
            .insert(text.into(), compiled);
    }

    /// Returns the cached compilation for `text` under the compiler's
    /// dialect, compiling and publishing it on a miss. Errors are not
    /// cached; a failing query recompiles on every call.
    pub fn get_or_compile(&self, compiler: &Compiler<'_>, text: &str) -> Result<Arc<CompiledQuery>> {
        let dialect = compiler.dialect();
        if let Some(hit) = self.get(text, dialect) {
            return Ok(hit);
        }

        let compiled = Arc::new(compiler.compile(text)?);

        let mut entries = self.entries.write();
        let per_dialect = entries.entry(dialect).or_default();
        Ok(per_dialect
            .entry(text.to_string())
            .or_insert(compiled)
            .clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
