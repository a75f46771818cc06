use std::fmt::Display;

use crate::error::FlagError;

/// A flag value the registry can feed raw command-line text into.
///
/// `set` is called once per occurrence, in command-line order. `Display`
/// renders the current value in the same grammar `set` accepts, and is used
/// as the flag's textual default at registration.
pub trait Value: Display {
    fn set(&mut self, raw: &str) -> Result<(), FlagError>;

    /// Short type name, e.g. `stringToBool` or `i8`.
    fn type_name(&self) -> &'static str;
}
