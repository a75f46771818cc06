use std::collections::HashMap;

/// Replace `target` with `overlay` wholesale.
///
/// Keys present only in `target` are dropped.
pub fn apply_overwrite<V>(_target: HashMap<String, V>, overlay: HashMap<String, V>) -> HashMap<String, V> {
    overlay
}

/// Shallow key-wise merge of `overlay` on top of `base`.
/// Keys present in both take `overlay`'s value; keys only in `base` are kept.
pub fn apply_merge<V>(mut base: HashMap<String, V>, overlay: HashMap<String, V>) -> HashMap<String, V> {
    for (key, value) in overlay {
        base.insert(key, value);
    }
    base
}
