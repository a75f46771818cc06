//! Typed command-line flags that only touch your configuration when the user
//! actually supplied them.
//!
//! A program usually has its settings in some struct already (loaded from
//! defaults, a file, whatever). Flags are an overlay on top of that state:
//! `--verbosity=2` should replace the verbosity, but *not* passing it must
//! leave the loaded value alone, even if the flag's compiled-in default
//! differs. Flagoverlay keeps "flag absent" and "flag present with the same
//! value as the default" apart.
//!
//! ```ignore
//! let mut fs = FlagSet::new("myapp");
//! let gates = fs.map_string_bool_var(
//!     "feature-gates",
//!     Some(&config.feature_gates),
//!     "A set of key=value pairs",
//!     MapOptions::default(),
//! );
//! let verbosity = fs.int8_var("v", config.verbosity, "Log level");
//! fs.parse(std::env::args().skip(1))?;
//!
//! fs.map(&gates)?.merge(&mut config.feature_gates);
//! fs.scalar(&verbosity)?.set(&mut config.verbosity);
//! ```
//!
//! # Map flags
//!
//! Map flags take `key=value` pairs: `--feature-gates=a=true,b=false`. The
//! flag may be repeated; each occurrence adds to (and overrides keys of) the
//! map built by earlier occurrences. The first occurrence discards whatever
//! the map was seeded with, so the command line fully describes the result.
//!
//! [`MapOptions`] controls the grammar:
//!
//! - **`pair_sep`** (default `,`) separates pairs within one occurrence.
//!   Segments are trimmed, so `a=true, b=false` works.
//! - **`key_value_sep`** (default `=`) separates a key from its value. Only
//!   the first separator counts: `a=x=y` is key `a`, value `x=y`.
//! - **`disable_comma_separated_pairs`** makes every occurrence exactly one
//!   pair, for values that contain the pair separator:
//!   `--label=a=x,y --label=b=z`.
//!
//! Element types implement [`MapElement`]; `bool` (accepting `1 t T TRUE
//! true True` and their false counterparts) and `String` are provided.
//!
//! After parsing, a map flag is materialized in one of three ways:
//!
//! | Operation | Effect on the target map |
//! |-----------|--------------------------|
//! | [`set`](MapSetting::set) | replaced by the flag's map (the seed if the flag was absent) |
//! | [`merge`](MapSetting::merge) | flag's keys inserted, other keys kept |
//! | [`apply`](MapSetting::apply) | callback runs only if the flag was given |
//!
//! # Scalar flags
//!
//! Single-valued flags parse through the type's `FromStr`. After parsing they
//! become a [`Setting`]: `Unset` or `SetTo(value)`. `Setting::set` copies into
//! the target only in the second case; `Setting::apply` calls back only then.
//!
//! # Errors
//!
//! Parse failures are reported as [`FlagError`], naming the flag, the raw
//! text, and the cause:
//!
//! ```text
//! invalid argument "one=foo" for "--feature-gates" flag: invalid value of one: foo, err: parsing "foo": invalid syntax
//! ```
//!
//! A failing occurrence stops parsing. Pairs of that occurrence that parsed
//! before the bad one have already been applied and are not rolled back.
//!
//! # Clap adapter
//!
//! The registry ([`FlagSet`]) is a thin layer over
//! [clap](https://docs.rs/clap), behind the `clap` Cargo feature (on by
//! default). The core types ([`MapValue`], [`ScalarValue`], the [`Value`]
//! trait, and the pair codec) do not depend on clap and can be driven by any
//! parser:
//!
//! ```toml
//! flagoverlay = { version = "...", default-features = false }
//! ```

pub mod error;
pub mod types;

#[cfg(feature = "clap")]
mod cli;
mod element;
mod map;
pub(crate) mod merge;
mod pairs;
mod scalar;
mod value;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::{FlagSet, MapFlag, MapSetting, ScalarFlag};
pub use element::{MapElement, parse_bool};
pub use error::FlagError;
pub use map::MapValue;
pub use merge::{apply_merge, apply_overwrite};
pub use pairs::{Pairs, parse_pairs, render_pairs};
pub use scalar::ScalarValue;
pub use types::{MapOptions, Setting};
pub use value::Value;
