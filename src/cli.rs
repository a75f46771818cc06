//! Clap adapter: the flag registry.
//!
//! This module is the **optional integration layer** between the parser-
//! agnostic core ([`MapValue`], [`ScalarValue`], [`Setting`]) and the
//! [clap](https://docs.rs/clap) command-line parser. It is compiled only when
//! the `clap` Cargo feature is enabled (on by default).
//!
//! [`FlagSet`] registers flags, hands the command line to clap, and feeds
//! every occurrence the user supplied into the registered value. Clap's
//! [`ValueSource`] is the only signal of whether a flag was explicitly given;
//! defaults never pass through `set`.
//!
//! Registration returns a typed handle ([`MapFlag`], [`ScalarFlag`]). After
//! [`FlagSet::parse`], a handle turns into an explicit outcome:
//!
//! ```ignore
//! let mut fs = FlagSet::new("kubelet");
//! let gates = fs.map_string_bool_var("feature-gates", Some(&config.gates), "", MapOptions::default());
//! let verbosity = fs.int8_var("v", config.verbosity, "log level");
//! fs.parse(std::env::args().skip(1))?;
//!
//! fs.map(&gates)?.merge(&mut config.gates);
//! fs.scalar(&verbosity)?.set(&mut config.verbosity);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::marker::PhantomData;
use std::net::IpAddr;
use std::str::FromStr;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, Command, value_parser};

use crate::element::MapElement;
use crate::error::FlagError;
use crate::map::MapValue;
use crate::scalar::ScalarValue;
use crate::types::{MapOptions, Setting};
use crate::value::Value;

/// Id of the hidden positional that collects non-flag arguments.
const ARGS_ID: &str = "__flagoverlay_args";

trait Registered: Value {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Value + Any> Registered for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Flag {
    name: String,
    usage: String,
    default_text: String,
    is_bool: bool,
    changed: bool,
    value: Box<dyn Registered>,
}

/// A set of flags parsed together from one command line.
pub struct FlagSet {
    name: String,
    flags: Vec<Flag>,
    args: Vec<String>,
}

/// Handle to a registered map flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFlag<V> {
    name: String,
    _marker: PhantomData<fn() -> V>,
}

/// Handle to a registered single-valued flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarFlag<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<V> MapFlag<V> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> ScalarFlag<T> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FlagSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: Vec::new(),
            args: Vec::new(),
        }
    }

    /// Register a map flag seeded from `seed`, the caller's current map.
    ///
    /// The seed's rendering becomes the flag's textual default. The caller's
    /// map is not touched until one of the [`MapSetting`] operations is
    /// called after parsing.
    ///
    /// # Panics
    ///
    /// If a flag called `name` is already registered.
    pub fn map_var<V: MapElement + 'static>(
        &mut self,
        name: &str,
        seed: Option<&HashMap<String, V>>,
        usage: &str,
        options: MapOptions,
    ) -> MapFlag<V> {
        let value = MapValue::new(seed.cloned(), options);
        self.register(name, usage, false, Box::new(value));
        MapFlag {
            name: name.to_string(),
            _marker: PhantomData,
        }
    }

    pub fn map_string_bool_var(
        &mut self,
        name: &str,
        seed: Option<&HashMap<String, bool>>,
        usage: &str,
        options: MapOptions,
    ) -> MapFlag<bool> {
        self.map_var(name, seed, usage, options)
    }

    pub fn map_string_string_var(
        &mut self,
        name: &str,
        seed: Option<&HashMap<String, String>>,
        usage: &str,
        options: MapOptions,
    ) -> MapFlag<String> {
        self.map_var(name, seed, usage, options)
    }

    /// Register a single-valued flag parsed with `T`'s `FromStr`.
    ///
    /// # Panics
    ///
    /// If a flag called `name` is already registered.
    pub fn scalar_var<T>(&mut self, name: &str, default: T, usage: &str) -> ScalarFlag<T>
    where
        T: FromStr + fmt::Display + 'static,
        T::Err: fmt::Display,
    {
        self.scalar_flag(name, default, usage, false)
    }

    /// A bare `--name` means `true`; `--name=false` turns it off.
    pub fn bool_var(&mut self, name: &str, default: bool, usage: &str) -> ScalarFlag<bool> {
        self.scalar_flag(name, default, usage, true)
    }

    pub fn string_var(&mut self, name: &str, default: &str, usage: &str) -> ScalarFlag<String> {
        self.scalar_var(name, default.to_string(), usage)
    }

    pub fn int8_var(&mut self, name: &str, default: i8, usage: &str) -> ScalarFlag<i8> {
        self.scalar_var(name, default, usage)
    }

    pub fn ip_var(&mut self, name: &str, default: IpAddr, usage: &str) -> ScalarFlag<IpAddr> {
        self.scalar_var(name, default, usage)
    }

    fn scalar_flag<T>(&mut self, name: &str, default: T, usage: &str, is_bool: bool) -> ScalarFlag<T>
    where
        T: FromStr + fmt::Display + 'static,
        T::Err: fmt::Display,
    {
        self.register(name, usage, is_bool, Box::new(ScalarValue::new(default)));
        ScalarFlag {
            name: name.to_string(),
            _marker: PhantomData,
        }
    }

    fn register(&mut self, name: &str, usage: &str, is_bool: bool, value: Box<dyn Registered>) {
        if self.flags.iter().any(|f| f.name == name) {
            panic!("{} flag redefined: {name}", self.name);
        }
        self.flags.push(Flag {
            name: name.to_string(),
            usage: usage.to_string(),
            default_text: value.to_string(),
            is_bool,
            changed: false,
            value,
        });
    }

    fn command(&self) -> Command {
        let positional = Arg::new(ARGS_ID)
            .num_args(1..)
            .action(ArgAction::Append)
            .value_parser(value_parser!(String))
            .hide(true);

        let mut command = Command::new(self.name.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(positional);

        for flag in &self.flags {
            let mut arg = Arg::new(flag.name.clone())
                .long(flag.name.clone())
                .help(flag.usage.clone())
                .action(ArgAction::Append)
                .value_parser(value_parser!(String));
            if !flag.default_text.is_empty() {
                arg = arg.default_value(flag.default_text.clone());
            }
            arg = if flag.is_bool {
                arg.num_args(0..=1)
                    .require_equals(true)
                    .default_missing_value("true")
            } else {
                arg.num_args(1).allow_hyphen_values(true)
            };
            command = command.arg(arg);
        }
        command
    }

    /// Parse `args` (without the program name).
    ///
    /// Every flag occurrence is fed into its value in command-line order,
    /// across all flags. The first failing occurrence stops parsing: later
    /// occurrences are not applied and their flags do not count as changed.
    pub fn parse<I, T>(&mut self, args: I) -> Result<(), FlagError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;

        // (position on the command line, flag slot, raw text)
        let mut occurrences: Vec<(usize, usize, String)> = Vec::new();
        for (slot, flag) in self.flags.iter().enumerate() {
            if matches.value_source(&flag.name) != Some(ValueSource::CommandLine) {
                continue;
            }
            let Some(values) = matches.get_many::<String>(&flag.name) else {
                continue;
            };
            let indices: Vec<usize> = matches
                .indices_of(&flag.name)
                .map(Iterator::collect)
                .unwrap_or_default();
            let before = occurrences.len();
            for (n, raw) in values.enumerate() {
                // values clap synthesized (e.g. a bare bool flag) may carry no index
                let index = indices
                    .get(n)
                    .or(indices.last())
                    .copied()
                    .unwrap_or_default();
                occurrences.push((index, slot, raw.clone()));
            }
            log::debug!(
                "--{} set on the command line ({} occurrence(s))",
                flag.name,
                occurrences.len() - before
            );
        }
        occurrences.sort_by_key(|(index, _, _)| *index);

        for (_, slot, raw) in occurrences {
            let flag = &mut self.flags[slot];
            flag.value.set(&raw).map_err(|source| FlagError::InvalidArgument {
                flag: flag.name.clone(),
                raw: raw.clone(),
                source: Box::new(source),
            })?;
            flag.changed = true;
        }

        self.args = matches
            .get_many::<String>(ARGS_ID)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();
        Ok(())
    }

    /// Whether the user supplied `name` on the command line.
    pub fn changed(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f.name == name && f.changed)
    }

    /// Non-flag arguments left over from the last [`parse`](Self::parse).
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Textual default recorded at registration.
    pub fn default_text(&self, name: &str) -> Option<&str> {
        self.find(name).ok().map(|f| f.default_text.as_str())
    }

    /// Current value of `name`, rendered the way its parser accepts it.
    pub fn lookup_text(&self, name: &str) -> Option<String> {
        self.find(name).ok().map(|f| f.value.to_string())
    }

    /// Type name of the value registered as `name`.
    pub fn type_name(&self, name: &str) -> Option<&'static str> {
        self.find(name).ok().map(|f| f.value.type_name())
    }

    /// Explicit outcome of a single-valued flag.
    pub fn scalar<T: Clone + 'static>(&self, flag: &ScalarFlag<T>) -> Result<Setting<T>, FlagError> {
        let entry = self.find(&flag.name)?;
        let value = entry
            .value
            .as_any()
            .downcast_ref::<ScalarValue<T>>()
            .ok_or_else(|| FlagError::TypeMismatch {
                name: flag.name.clone(),
                expected: std::any::type_name::<T>(),
            })?;
        if entry.changed {
            Ok(Setting::SetTo(value.get().clone()))
        } else {
            Ok(Setting::Unset)
        }
    }

    /// Materialization view of a map flag.
    pub fn map<V: MapElement + 'static>(&self, flag: &MapFlag<V>) -> Result<MapSetting<'_, V>, FlagError> {
        let entry = self.find(&flag.name)?;
        let value = entry
            .value
            .as_any()
            .downcast_ref::<MapValue<V>>()
            .ok_or_else(|| FlagError::TypeMismatch {
                name: flag.name.clone(),
                expected: V::MAP_TYPE_NAME,
            })?;
        Ok(MapSetting {
            value,
            changed: entry.changed,
        })
    }

    fn find(&self, name: &str) -> Result<&Flag, FlagError> {
        self.flags
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FlagError::UnknownFlag(name.to_string()))
    }
}

/// A parsed map flag, ready to be pushed into application state.
pub struct MapSetting<'a, V> {
    value: &'a MapValue<V>,
    changed: bool,
}

impl<V: MapElement> MapSetting<'_, V> {
    /// Whether the user supplied the flag.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Overwrite `target` with the flag's map. If the flag was never given
    /// this copies the seed.
    pub fn set(&self, target: &mut HashMap<String, V>) {
        self.value.overwrite(target);
    }

    /// Overlay the flag's keys onto `target`.
    pub fn merge(&self, target: &mut HashMap<String, V>) {
        self.value.merge(target);
    }

    /// Call `apply` with the flag's map only if the user supplied the flag.
    pub fn apply<F: FnOnce(HashMap<String, V>)>(&self, apply: F) {
        self.clone_setting().apply(apply);
    }

    pub fn into_setting(self) -> Setting<HashMap<String, V>> {
        self.clone_setting()
    }

    fn clone_setting(&self) -> Setting<HashMap<String, V>> {
        if self.changed {
            Setting::SetTo(self.value.snapshot())
        } else {
            Setting::Unset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{bool_map, seeded_bools, seeded_strings, string_map};
    use rstest::rstest;

    // --- scalar flags ---

    #[rstest]
    #[case::flag_is_set(&["--foo=-1"], -1, true)]
    #[case::flag_is_not_set(&[""], 0, false)]
    #[case::separate_value(&["--foo", "-1"], -1, true)]
    fn int8_var(#[case] args: &[&str], #[case] set: i8, #[case] apply: bool) {
        let mut target: i8 = 0;
        let mut fs = FlagSet::new("test");
        let val = fs.int8_var("foo", target, "");
        fs.parse(args).unwrap();

        fs.scalar(&val).unwrap().set(&mut target);
        assert_eq!(target, set);

        let mut applied = false;
        fs.scalar(&val).unwrap().apply(|value| {
            applied = true;
            assert_eq!(value, set);
        });
        assert_eq!(applied, apply);
    }

    #[test]
    fn unset_scalar_leaves_target_untouched() {
        let mut fs = FlagSet::new("test");
        let val = fs.int8_var("foo", 3, "");
        fs.parse(Vec::<String>::new()).unwrap();

        let mut target: i8 = 42;
        fs.scalar(&val).unwrap().set(&mut target);
        assert_eq!(target, 42);
    }

    #[test]
    fn ip_var() {
        let mut fs = FlagSet::new("test");
        let val = fs.ip_var("bind", IpAddr::from([0, 0, 0, 0]), "");
        fs.parse(["--bind=10.1.2.3"]).unwrap();

        let mut target = IpAddr::from([127, 0, 0, 1]);
        fs.scalar(&val).unwrap().set(&mut target);
        assert_eq!(target, IpAddr::from([10, 1, 2, 3]));
    }

    #[test]
    fn bare_bool_flag_means_true() {
        let mut fs = FlagSet::new("test");
        let val = fs.bool_var("verbose", false, "");
        fs.parse(["--verbose"]).unwrap();
        assert_eq!(fs.scalar(&val).unwrap(), Setting::SetTo(true));
    }

    #[test]
    fn explicit_false_bool_is_still_set() {
        let mut fs = FlagSet::new("test");
        let val = fs.bool_var("verbose", true, "");
        fs.parse(["--verbose=false"]).unwrap();
        assert_eq!(fs.scalar(&val).unwrap(), Setting::SetTo(false));
    }

    #[test]
    fn string_var_last_occurrence_wins() {
        let mut fs = FlagSet::new("test");
        let val = fs.string_var("name", "default", "");
        fs.parse(["--name=a", "--name=b"]).unwrap();
        assert_eq!(fs.scalar(&val).unwrap(), Setting::SetTo("b".to_string()));
    }

    #[test]
    fn failing_occurrence_stops_later_flags() {
        let mut fs = FlagSet::new("test");
        let a = fs.int8_var("a", 0, "");
        fs.int8_var("b", 0, "");
        let err = fs.parse(["--b=300", "--a=5"]).unwrap_err();

        assert!(matches!(err, FlagError::InvalidArgument { ref flag, .. } if flag == "b"));
        assert!(!fs.changed("a"));
        assert!(!fs.changed("b"));
        assert_eq!(fs.scalar(&a).unwrap(), Setting::Unset);
        assert_eq!(fs.lookup_text("a").as_deref(), Some("0"));
    }

    #[test]
    fn occurrences_apply_in_command_line_order() {
        let mut fs = FlagSet::new("test");
        fs.map_string_bool_var("gates", None, "", MapOptions::default());
        fs.int8_var("v", 0, "");
        let err = fs
            .parse(["--gates=x=true", "--v=1", "--gates=y", "--v=2"])
            .unwrap_err();

        assert!(matches!(err, FlagError::InvalidArgument { ref flag, .. } if flag == "gates"));
        assert!(fs.changed("gates"));
        assert!(fs.changed("v"));
        assert_eq!(fs.lookup_text("v").as_deref(), Some("1"));
        assert_eq!(fs.lookup_text("gates").as_deref(), Some("x=true"));
    }

    #[test]
    fn invalid_scalar_is_invalid_argument() {
        let mut fs = FlagSet::new("test");
        fs.int8_var("foo", 0, "");
        let err = fs.parse(["--foo=300"]).unwrap_err();
        assert!(matches!(err, FlagError::InvalidArgument { ref flag, .. } if flag == "foo"));
    }

    // --- map flags ---

    #[rstest]
    #[case::flag_is_set(
        &["--foo=one=false,bar=true"],
        bool_map(&[("one", false), ("bar", true)]),
        bool_map(&[("one", false), ("foo", true), ("bar", true)]),
        true
    )]
    #[case::flag_is_not_set(&[""], seeded_bools(), seeded_bools(), false)]
    #[case::repeated_occurrences(
        &["--foo=one=false", "--foo", "bar=true,one=true"],
        bool_map(&[("one", true), ("bar", true)]),
        bool_map(&[("one", true), ("foo", true), ("bar", true)]),
        true
    )]
    #[case::empty_value_clears(&["--foo="], bool_map(&[]), seeded_bools(), true)]
    fn map_string_bool_var(
        #[case] args: &[&str],
        #[case] set: HashMap<String, bool>,
        #[case] merge: HashMap<String, bool>,
        #[case] apply: bool,
    ) {
        let target = seeded_bools();
        let mut fs = FlagSet::new("test");
        let val = fs.map_string_bool_var("foo", Some(&target), "", MapOptions::default());
        fs.parse(args).unwrap();
        let setting = fs.map(&val).unwrap();

        let mut set_target = target.clone();
        setting.set(&mut set_target);
        assert_eq!(set_target, set);

        let mut merge_target = target.clone();
        setting.merge(&mut merge_target);
        assert_eq!(merge_target, merge);

        let mut applied = false;
        setting.apply(|value| {
            applied = true;
            assert_eq!(value, set);
        });
        assert_eq!(applied, apply);
    }

    #[rstest]
    #[case::flag_is_set(
        &["--foo=one=quux,bar=baz"],
        string_map(&[("one", "quux"), ("bar", "baz")]),
        string_map(&[("one", "quux"), ("foo", "baz"), ("bar", "baz")]),
        true
    )]
    #[case::flag_is_not_set(&[""], seeded_strings(), seeded_strings(), false)]
    fn map_string_string_var(
        #[case] args: &[&str],
        #[case] set: HashMap<String, String>,
        #[case] merge: HashMap<String, String>,
        #[case] apply: bool,
    ) {
        let target = seeded_strings();
        let mut fs = FlagSet::new("test");
        let val = fs.map_string_string_var("foo", Some(&target), "", MapOptions::default());
        fs.parse(args).unwrap();
        let setting = fs.map(&val).unwrap();

        let mut set_target = target.clone();
        setting.set(&mut set_target);
        assert_eq!(set_target, set);

        let mut merge_target = target.clone();
        setting.merge(&mut merge_target);
        assert_eq!(merge_target, merge);

        let mut applied = false;
        setting.apply(|value| {
            applied = true;
            assert_eq!(value, set);
        });
        assert_eq!(applied, apply);
    }

    #[test]
    fn single_pair_occurrences_keep_commas() {
        let mut fs = FlagSet::new("test");
        let val = fs.map_string_string_var("label", None, "", MapOptions::single_pair());
        fs.parse(["--label=a=x,y", "--label=b=z"]).unwrap();
        assert_eq!(
            fs.map(&val).unwrap().into_setting(),
            Setting::SetTo(string_map(&[("a", "x,y"), ("b", "z")]))
        );
    }

    #[test]
    fn malformed_pair_stops_parse() {
        let mut fs = FlagSet::new("test");
        fs.map_string_bool_var("foo", None, "", MapOptions::default());
        let err = fs.parse(["--foo=one"]).unwrap_err();
        match err {
            FlagError::InvalidArgument { flag, raw, source } => {
                assert_eq!(flag, "foo");
                assert_eq!(raw, "one");
                assert_eq!(source.to_string(), "malformed pair, expect string=bool");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn textual_default_comes_from_seed() {
        let mut fs = FlagSet::new("test");
        fs.map_string_bool_var("foo", Some(&seeded_bools()), "", MapOptions::default());
        fs.map_string_bool_var("bar", None, "", MapOptions::default());
        assert_eq!(fs.default_text("foo"), Some("bar=false,foo=true"));
        assert_eq!(fs.default_text("bar"), Some(""));
        assert_eq!(fs.type_name("foo"), Some("stringToBool"));
    }

    #[test]
    fn lookup_text_reflects_parsed_value() {
        let mut fs = FlagSet::new("test");
        fs.map_string_bool_var("foo", Some(&seeded_bools()), "", MapOptions::default());
        fs.parse(["--foo=z=true"]).unwrap();
        assert_eq!(fs.lookup_text("foo").as_deref(), Some("z=true"));
    }

    // --- registry plumbing ---

    #[test]
    fn changed_tracks_command_line_only() {
        let mut fs = FlagSet::new("test");
        fs.int8_var("a", 1, "");
        fs.int8_var("b", 2, "");
        fs.parse(["--b=3"]).unwrap();
        assert!(!fs.changed("a"));
        assert!(fs.changed("b"));
        assert!(!fs.changed("missing"));
    }

    #[test]
    fn positional_args_are_collected() {
        let mut fs = FlagSet::new("test");
        fs.int8_var("foo", 0, "");
        fs.parse(["--foo=1", "rest", "more"]).unwrap();
        assert_eq!(fs.args(), ["rest".to_string(), "more".to_string()]);
    }

    #[test]
    fn unknown_flag_is_parse_error() {
        let mut fs = FlagSet::new("test");
        fs.int8_var("foo", 0, "");
        let err = fs.parse(["--nope=1"]).unwrap_err();
        assert!(matches!(err, FlagError::Parse(_)));
    }

    #[test]
    fn lookup_of_unregistered_handle() {
        let mut other = FlagSet::new("other");
        let val = other.int8_var("foo", 0, "");
        let fs = FlagSet::new("test");
        assert!(matches!(fs.scalar(&val), Err(FlagError::UnknownFlag(name)) if name == "foo"));
    }

    #[test]
    fn lookup_with_wrong_type() {
        let mut other = FlagSet::new("other");
        let val = other.int8_var("foo", 0, "");
        let mut fs = FlagSet::new("test");
        fs.string_var("foo", "", "");
        assert!(matches!(fs.scalar(&val), Err(FlagError::TypeMismatch { .. })));
    }

    #[test]
    #[should_panic(expected = "flag redefined: foo")]
    fn duplicate_registration_panics() {
        let mut fs = FlagSet::new("test");
        fs.int8_var("foo", 0, "");
        fs.int8_var("foo", 0, "");
    }
}
