use serde::{Deserialize, Serialize};

pub const DEFAULT_PAIR_SEP: &str = ",";
pub const DEFAULT_KEY_VALUE_SEP: &str = "=";

/// How a map flag splits its raw text into key/value pairs.
///
/// Empty separators mean "use the default"; [`resolved()`](Self::resolved)
/// fills them in. Map values resolve their options once, when built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Delimits successive pairs within one occurrence (default `,`).
    pub pair_sep: String,
    /// Delimits a pair's key from its value (default `=`).
    pub key_value_sep: String,
    /// Treat each occurrence as exactly one pair, so values may contain
    /// the pair separator.
    pub disable_comma_separated_pairs: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            pair_sep: DEFAULT_PAIR_SEP.to_string(),
            key_value_sep: DEFAULT_KEY_VALUE_SEP.to_string(),
            disable_comma_separated_pairs: false,
        }
    }
}

impl MapOptions {
    /// Options that accept one `key=value` per occurrence.
    pub fn single_pair() -> Self {
        Self {
            disable_comma_separated_pairs: true,
            ..Self::default()
        }
    }

    pub fn pair_sep(mut self, sep: &str) -> Self {
        self.pair_sep = sep.to_string();
        self
    }

    pub fn key_value_sep(mut self, sep: &str) -> Self {
        self.key_value_sep = sep.to_string();
        self
    }

    /// Fill every unset separator with its default.
    pub fn resolved(mut self) -> Self {
        if self.pair_sep.is_empty() {
            self.pair_sep = DEFAULT_PAIR_SEP.to_string();
        }
        if self.key_value_sep.is_empty() {
            self.key_value_sep = DEFAULT_KEY_VALUE_SEP.to_string();
        }
        self
    }
}

/// Outcome of parsing one flag: either the user never supplied it, or it
/// was set to a value.
///
/// Consumers decide explicitly what an unset flag means for their state
/// instead of asking the registry afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting<T> {
    Unset,
    SetTo(T),
}

impl<T> Setting<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Setting::SetTo(_))
    }

    /// Copy the value into `target` if the flag was set; otherwise leave
    /// `target` untouched.
    pub fn set(self, target: &mut T) {
        if let Setting::SetTo(value) = self {
            *target = value;
        }
    }

    /// Call `apply` with the value only if the flag was set.
    pub fn apply<F: FnOnce(T)>(self, apply: F) {
        if let Setting::SetTo(value) = self {
            apply(value);
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Setting<U> {
        match self {
            Setting::Unset => Setting::Unset,
            Setting::SetTo(value) => Setting::SetTo(f(value)),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Setting::Unset => None,
            Setting::SetTo(value) => Some(value),
        }
    }
}

impl<T> From<Option<T>> for Setting<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Setting::SetTo(v),
            None => Setting::Unset,
        }
    }
}
