use error_derive::Error;

/// Returned when an operation is handed a value of the wrong shape
///
/// Constructing a [TypeError] does not fail anything by itself.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[msg = "{0}"]
pub struct TypeError(String);

/// Returned when something attempts to mutate an immutable value in place
///
/// Constructing an [ImmutableError] does not fail anything by itself.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[msg = "{0}"]
pub struct ImmutableError(String);

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[msg = "TypeError: {0}"]
    Type(TypeError),

    #[msg = "ImmutableError: {0}"]
    Immutable(ImmutableError),
}

impl TypeError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl ImmutableError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }

    /// The error for calling a method that would mutate its receiver
    #[must_use]
    pub fn banned_method(name: &str) -> Self {
        Self::new(format!(
            "The {name} method cannot be invoked on an Immutable data structure."
        ))
    }
}

impl Error {
    #[inline]
    #[must_use]
    pub const fn is_type_error(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_immutable_error(&self) -> bool {
        matches!(self, Self::Immutable(_))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn constructing_does_not_fail() {
        let error = ImmutableError::new("nope");
        assert_eq!(error.message(), "nope");
        assert_eq!(error.to_string(), "nope");
    }

    #[test]
    fn wrapped_errors_are_reported_as_source() {
        let error = Error::from(TypeError::new("bad input"));

        assert!(error.is_type_error());
        assert_eq!(error.to_string(), "TypeError: bad input");
        assert_eq!(
            error.source().map(|source| source.to_string()).as_deref(),
            Some("bad input")
        );
    }

    #[test]
    fn banned_method_message() {
        assert_eq!(
            ImmutableError::banned_method("push").message(),
            "The push method cannot be invoked on an Immutable data structure."
        );
    }
}
