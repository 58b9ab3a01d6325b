//! Type identity tokens, used to check downcasts of erased values.

use std::any::TypeId;

/// A process-wide identifier for a concrete rust type.
///
/// The token is composed of the type's `TypeId` and its name. Only the id takes part in
/// comparison and hashing; the name is kept for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

/// Match expression for type tokens.
///
/// Each arm names a rust type; the first arm whose type matches the token is evaluated. The else
/// case is required.
///
/// ```
/// # use dyntrait::{match_type, TypeToken};
/// let tp = TypeToken::of::<u8>();
/// let width = match_type!(tp => {
///     u8 => 1,
///     u16 => 2,
///     => 0
/// });
/// assert_eq!(width, 1);
/// ```
#[macro_export]
macro_rules! match_type {
    ( $token:expr => { $( $t:ty => $e:expr $(,)? )+ => $else:expr } ) => {
        {
            let __dyntrait_match_type_tp: $crate::TypeToken = $token;
            $( if __dyntrait_match_type_tp.is::<$t>() { $e } else )+ { $else }
        }
    };
}

impl TypeToken {
    /// Get the token for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeToken {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Return whether this token identifies `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// The `TypeId` of the identified type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The name of the identified type.
    ///
    /// Names are descriptive only and are not guaranteed to be unique.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl std::hash::Hash for TypeToken {
    fn hash<H: std::hash::Hasher>(&self, h: &mut H) {
        self.id.hash(h)
    }
}

impl std::fmt::Display for TypeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name)
    }
}
