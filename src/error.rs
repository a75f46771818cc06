use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlagError {
    #[error("no target (nil map of string to {value_type})")]
    NoTarget { value_type: &'static str },

    #[error("malformed pair, expect string={value_type}")]
    MalformedPair { value_type: &'static str },

    #[error("invalid value of {key}: {raw}, err: {cause}")]
    InvalidValue {
        key: String,
        raw: String,
        cause: String,
    },

    #[error("invalid {value_type} value {raw:?}: {cause}")]
    InvalidScalar {
        raw: String,
        value_type: &'static str,
        cause: String,
    },

    #[error("invalid argument {raw:?} for \"--{flag}\" flag: {source}")]
    InvalidArgument {
        flag: String,
        raw: String,
        source: Box<FlagError>,
    },

    #[cfg(feature = "clap")]
    #[error("{0}")]
    Parse(#[from] clap::Error),

    #[error("Unknown flag: {0}")]
    UnknownFlag(String),

    #[error("Flag '{name}' is not registered as {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_target_names_element_type() {
        let err = FlagError::NoTarget { value_type: "bool" };
        assert_eq!(err.to_string(), "no target (nil map of string to bool)");
    }

    #[test]
    fn malformed_pair_states_expected_shape() {
        let err = FlagError::MalformedPair {
            value_type: "string",
        };
        assert_eq!(err.to_string(), "malformed pair, expect string=string");
    }

    #[test]
    fn invalid_value_carries_key_raw_and_cause() {
        let err = FlagError::InvalidValue {
            key: "one".into(),
            raw: "foo".into(),
            cause: "boom".into(),
        };
        assert_eq!(err.to_string(), "invalid value of one: foo, err: boom");
    }

    #[test]
    fn invalid_argument_wraps_source() {
        let err = FlagError::InvalidArgument {
            flag: "feature-gates".into(),
            raw: "one".into(),
            source: Box::new(FlagError::MalformedPair { value_type: "bool" }),
        };
        let msg = err.to_string();
        assert!(msg.contains("--feature-gates"));
        assert!(msg.contains("\"one\""));
        assert!(msg.ends_with("malformed pair, expect string=bool"));
    }
}
