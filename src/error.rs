//! Library error types.

/// Errors raised while normalizing a response body.
///
/// Lenient normalization never fails; these only surface in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// A recognized timestamp field held something other than epoch seconds.
    #[error("invalid timestamp at {pointer}: found {found}")]
    InvalidTimestamp {
        /// RFC 6901 pointer to the offending field.
        pointer: String,
        found: &'static str,
    },
}

impl NormalizeError {
    pub(crate) fn invalid_timestamp(field: &str, found: &'static str) -> Self {
        NormalizeError::InvalidTimestamp {
            pointer: format!("/{}", escape_token(field)),
            found,
        }
    }

    /// Prefixes the error's pointer with the segment of the parent container
    /// it was raised under.
    pub(crate) fn within(self, segment: &str) -> Self {
        match self {
            NormalizeError::InvalidTimestamp { pointer, found } => NormalizeError::InvalidTimestamp {
                pointer: format!("/{}{}", escape_token(segment), pointer),
                found,
            },
        }
    }

    pub fn pointer(&self) -> &str {
        match self {
            NormalizeError::InvalidTimestamp { pointer, .. } => pointer,
        }
    }
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_is_built_outward() {
        let err = NormalizeError::invalid_timestamp("created_at", "string")
            .within("3")
            .within("exercises");
        assert_eq!(err.pointer(), "/exercises/3/created_at");
        assert_eq!(
            err.to_string(),
            "invalid timestamp at /exercises/3/created_at: found string"
        );
    }

    #[test]
    fn pointer_tokens_are_escaped() {
        let err = NormalizeError::invalid_timestamp("updated_at", "null").within("a/b~c");
        assert_eq!(err.pointer(), "/a~1b~0c/updated_at");
    }
}
