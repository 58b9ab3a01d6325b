//! Errors returned when narrowing an erased value.

use crate::type_system::TypeToken;

/// The error returned when an erased value is requested as a type it does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatch {
    /// The name of the requested type.
    pub expected: &'static str,
    /// The name of the type actually held.
    pub found: &'static str,
}

impl TypeMismatch {
    /// Create a mismatch error for a request of `T` against a value of type `found`.
    pub(crate) fn new<T: ?Sized>(found: &TypeToken) -> Self {
        let expected = std::any::type_name::<T>();
        log::trace!("downcast to {} failed; value is a {}", expected, found.name());
        TypeMismatch {
            expected,
            found: found.name(),
        }
    }
}

impl std::fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "type mismatch: expected a {}, but the value is a {}",
            self.expected, self.found
        )
    }
}

impl std::error::Error for TypeMismatch {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_both_types() {
        let e = TypeMismatch::new::<u32>(&TypeToken::of::<String>());
        assert_eq!(e.expected, "u32");
        assert_eq!(e.found, std::any::type_name::<String>());
        let msg = e.to_string();
        assert!(msg.contains("u32"));
        assert!(msg.contains("String"));
    }
}
