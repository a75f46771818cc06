//! Element types a map flag can hold.

/// A value type usable on the right-hand side of a map flag pair.
pub trait MapElement: Clone + Sized {
    /// Name used in error messages, e.g. `malformed pair, expect string=bool`.
    const TYPE_NAME: &'static str;

    /// Type name of the whole map flag, e.g. `stringToBool`.
    const MAP_TYPE_NAME: &'static str;

    /// Parse the value half of one pair. The error is the underlying cause
    /// text, reported verbatim next to the offending key.
    fn parse_element(raw: &str) -> Result<Self, String>;

    fn render(&self) -> String;
}

impl MapElement for bool {
    const TYPE_NAME: &'static str = "bool";
    const MAP_TYPE_NAME: &'static str = "stringToBool";

    fn parse_element(raw: &str) -> Result<Self, String> {
        parse_bool(raw)
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl MapElement for String {
    const TYPE_NAME: &'static str = "string";
    const MAP_TYPE_NAME: &'static str = "stringToString";

    fn parse_element(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

/// Recognize the usual boolean spellings: `1 t T TRUE true True` and
/// `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("parsing {raw:?}: invalid syntax")),
    }
}
