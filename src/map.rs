//! Map-typed flag values (`--feature-gates=a=true,b=false`).
//!
//! A [`MapValue`] is seeded with the caller's current map at registration.
//! Each occurrence of the flag on the command line calls [`Value::set`]: the
//! first call discards the seed, later calls accumulate into the map built
//! so far. After parsing, [`overwrite`](MapValue::overwrite) and
//! [`merge`](MapValue::merge) push the result into application state.

use std::collections::HashMap;
use std::fmt;
use std::mem;

use crate::element::MapElement;
use crate::error::FlagError;
use crate::merge::{apply_merge, apply_overwrite};
use crate::pairs::{parse_pairs, render_pairs};
use crate::types::MapOptions;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct MapValue<V> {
    initialized: bool,
    /// `None` when the value has no target at all; `Some(None)` for an
    /// absent map that `set` allocates on demand.
    target: Option<Option<HashMap<String, V>>>,
    options: MapOptions,
}

impl<V: MapElement> MapValue<V> {
    /// Bind a value to `seed` (the caller's current map, `None` if absent).
    /// Separator defaults are resolved here, once.
    pub fn new(seed: Option<HashMap<String, V>>, options: MapOptions) -> Self {
        Self {
            initialized: false,
            target: Some(seed),
            options: options.resolved(),
        }
    }

    /// A value with no target; every `set` fails with [`FlagError::NoTarget`].
    pub fn detached(options: MapOptions) -> Self {
        Self {
            initialized: false,
            target: None,
            options: options.resolved(),
        }
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Whether `set` has been called at least once.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The accumulated map, or the seed if `set` was never called.
    pub fn get(&self) -> Option<&HashMap<String, V>> {
        self.target.as_ref().and_then(Option::as_ref)
    }

    /// True if there is no map or it has no entries.
    pub fn is_empty(&self) -> bool {
        self.get().is_none_or(HashMap::is_empty)
    }

    /// Replace `target` with the accumulated map.
    pub fn overwrite(&self, target: &mut HashMap<String, V>) {
        let current = mem::take(target);
        *target = apply_overwrite(current, self.snapshot());
    }

    /// Insert every accumulated key into `target`, keeping keys that only
    /// `target` has.
    pub fn merge(&self, target: &mut HashMap<String, V>) {
        let current = mem::take(target);
        *target = apply_merge(current, self.snapshot());
    }

    pub(crate) fn snapshot(&self) -> HashMap<String, V> {
        self.get().cloned().unwrap_or_default()
    }
}

impl<V: MapElement> Value for MapValue<V> {
    /// Apply one occurrence of the flag.
    ///
    /// Pairs are inserted as they parse, so on error the pairs before the
    /// bad one stay in the map.
    fn set(&mut self, raw: &str) -> Result<(), FlagError> {
        let slot = self.target.as_mut().ok_or(FlagError::NoTarget {
            value_type: V::TYPE_NAME,
        })?;
        let map = slot.get_or_insert_with(HashMap::new);

        if !self.initialized {
            if !map.is_empty() {
                log::trace!("discarding {} seeded {} entries", map.len(), V::MAP_TYPE_NAME);
            }
            map.clear();
            self.initialized = true;
        }

        for pair in parse_pairs::<V>(raw, &self.options) {
            let (key, value) = pair?;
            map.insert(key, value);
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        V::MAP_TYPE_NAME
    }
}

impl<V: MapElement> fmt::Display for MapValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(map) => f.write_str(&render_pairs(map, &self.options)),
            None => Ok(()),
        }
    }
}
