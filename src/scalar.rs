//! Single-valued flags (`--verbosity=-1`, `--bind-address=10.0.0.1`).
//!
//! Parsing is just the type's `FromStr`. Materialization goes through
//! [`Setting`](crate::Setting): copy into the target only if the user
//! supplied the flag.

use std::fmt;
use std::str::FromStr;

use crate::error::FlagError;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarValue<T> {
    value: T,
}

impl<T> ScalarValue<T> {
    pub fn new(default: T) -> Self {
        Self { value: default }
    }

    pub fn get(&self) -> &T {
        &self.value
    }
}

impl<T> Value for ScalarValue<T>
where
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    /// Later occurrences replace earlier ones.
    fn set(&mut self, raw: &str) -> Result<(), FlagError> {
        self.value = raw.parse().map_err(|e: T::Err| FlagError::InvalidScalar {
            raw: raw.to_string(),
            value_type: short_type_name::<T>(),
            cause: e.to_string(),
        })?;
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        short_type_name::<T>()
    }
}

impl<T: fmt::Display> fmt::Display for ScalarValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

/// `std::net::ip_addr::IpAddr` -> `IpAddr`.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
