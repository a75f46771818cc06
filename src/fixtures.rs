#[cfg(test)]
pub mod test {
    use std::collections::HashMap;

    pub fn bool_map(pairs: &[(&str, bool)]) -> HashMap<String, bool> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    pub fn string_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// The seed most registry tests start from: `{foo: true, bar: false}`.
    pub fn seeded_bools() -> HashMap<String, bool> {
        bool_map(&[("foo", true), ("bar", false)])
    }

    /// `{foo: "baz", bar: "quux"}`.
    pub fn seeded_strings() -> HashMap<String, String> {
        string_map(&[("foo", "baz"), ("bar", "quux")])
    }

    #[test]
    fn seeds_have_two_entries() {
        assert_eq!(seeded_bools().len(), 2);
        assert_eq!(seeded_strings()["bar"], "quux");
    }
}
