//! Method descriptors and receiver access modes.

use std::marker::PhantomData;
use std::ptr::NonNull;

/// How a method accesses the value it is called on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// The method takes no receiver.
    Static,
    /// The method reads the receiver.
    Shared,
    /// The method may mutate the receiver.
    Exclusive,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Static {}
    impl Sealed for super::Shared {}
    impl Sealed for super::Exclusive {}
}

/// A receiver access mode.
///
/// This trait is sealed; the modes are `Static`, `Shared` and `Exclusive`.
pub trait Access: sealed::Sealed + 'static {
    const KIND: AccessKind;
}

/// Access modes which never mutate the receiver, and so may be used through read-only handles.
pub trait ReadOnly: Access {}

/// The method takes no receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Static;

/// The method takes the receiver by shared reference (`&self`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shared;

/// The method takes the receiver by exclusive reference (`&mut self`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Exclusive;

impl Access for Static {
    const KIND: AccessKind = AccessKind::Static;
}

impl Access for Shared {
    const KIND: AccessKind = AccessKind::Shared;
}

impl Access for Exclusive {
    const KIND: AccessKind = AccessKind::Exclusive;
}

impl ReadOnly for Static {}
impl ReadOnly for Shared {}

/// An abstract operation, independent of any concrete type.
///
/// Method types are descriptors only: they carry the signature of the operation in their
/// associated types and are never instantiated to call anything. Use the `method!` macro to
/// declare them.
pub trait Method: 'static {
    /// The receiver access mode.
    type Access: Access;
    /// The argument types, as a tuple.
    type Args;
    /// The return type.
    type Output;

    /// The method name, for diagnostics.
    const NAME: &'static str;
}

/// The receiver passed to a method implementation.
///
/// `Shared` receivers dereference to `&T`, `Exclusive` receivers additionally to `&mut T`, and
/// `Static` receivers not at all.
pub struct Receiver<'a, T, A: Access> {
    ptr: NonNull<T>,
    _marker: PhantomData<(&'a mut T, A)>,
}

impl<'a, T, A: Access> Receiver<'a, T, A> {
    /// Create a receiver from a pointer to a live `T`.
    ///
    /// # Safety
    /// For `Shared` and `Exclusive` receivers, `ptr` must be valid for reads (and writes, if
    /// `Exclusive`) as a `T` for `'a`, with no conflicting access for that duration. `Static`
    /// receivers never dereference the pointer, but it must be non-null.
    pub(crate) unsafe fn from_raw(ptr: *mut T) -> Self {
        Receiver {
            ptr: NonNull::new_unchecked(ptr),
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Receiver<'a, T, Static> {
    /// Create a receiver for a method which takes none.
    pub fn none() -> Self {
        Receiver {
            ptr: NonNull::dangling(),
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Receiver<'a, T, Shared> {
    /// Create a receiver from a shared reference.
    pub fn shared(value: &'a T) -> Self {
        Receiver {
            ptr: NonNull::from(value),
            _marker: PhantomData,
        }
    }

    /// Get the underlying reference.
    pub fn into_ref(self) -> &'a T {
        unsafe { &*self.ptr.as_ptr() }
    }
}

impl<'a, T> Receiver<'a, T, Exclusive> {
    /// Create a receiver from an exclusive reference.
    pub fn exclusive(value: &'a mut T) -> Self {
        Receiver {
            ptr: NonNull::from(value),
            _marker: PhantomData,
        }
    }

    /// Get the underlying reference.
    pub fn into_mut(self) -> &'a mut T {
        unsafe { &mut *self.ptr.as_ptr() }
    }
}

impl<'a, T> std::ops::Deref for Receiver<'a, T, Shared> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { self.ptr.as_ref() }
    }
}

impl<'a, T> std::ops::Deref for Receiver<'a, T, Exclusive> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { self.ptr.as_ref() }
    }
}

impl<'a, T> std::ops::DerefMut for Receiver<'a, T, Exclusive> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { self.ptr.as_mut() }
    }
}

impl<'a, T, A: Access> std::fmt::Debug for Receiver<'a, T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("type", &std::any::type_name::<T>())
            .field("access", &A::KIND)
            .finish()
    }
}

/// Declare method descriptors.
///
/// Each declaration reads like a function signature without a body. The receiver is `&self`,
/// `&mut self`, or absent; parameter names are for documentation only. Parameter and return
/// types must be `'static`.
///
/// ```
/// dyntrait::method! {
///     /// Move by the given offset.
///     pub struct Move(&mut self, dx: f64, dy: f64);
///     pub struct Area(&self) -> f64;
///     pub struct Sides() -> u32;
/// }
///
/// use dyntrait::{Method, AccessKind, Access};
/// assert_eq!(<Move as Method>::NAME, "Move");
/// assert_eq!(<<Area as Method>::Access as Access>::KIND, AccessKind::Shared);
/// let _: <Move as Method>::Args = (1.0, 2.0);
/// ```
#[macro_export]
macro_rules! method {
    () => {};
    ( $(#[$attr:meta])* $vis:vis struct $name:ident (&mut self $(, $arg:ident : $ty:ty)*) $(-> $ret:ty)? ; $($rest:tt)* ) => {
        $crate::__method_descriptor!($(#[$attr])* $vis $name, $crate::Exclusive, ($($ty,)*), $crate::__method_output!($($ret)?));
        $crate::method!($($rest)*);
    };
    ( $(#[$attr:meta])* $vis:vis struct $name:ident (&self $(, $arg:ident : $ty:ty)*) $(-> $ret:ty)? ; $($rest:tt)* ) => {
        $crate::__method_descriptor!($(#[$attr])* $vis $name, $crate::Shared, ($($ty,)*), $crate::__method_output!($($ret)?));
        $crate::method!($($rest)*);
    };
    ( $(#[$attr:meta])* $vis:vis struct $name:ident ($($arg:ident : $ty:ty),*) $(-> $ret:ty)? ; $($rest:tt)* ) => {
        $crate::__method_descriptor!($(#[$attr])* $vis $name, $crate::Static, ($($ty,)*), $crate::__method_output!($($ret)?));
        $crate::method!($($rest)*);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __method_descriptor {
    ( $(#[$attr:meta])* $vis:vis $name:ident, $access:ty, $args:ty, $output:ty ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::Method for $name {
            type Access = $access;
            type Args = $args;
            type Output = $output;

            const NAME: &'static str = stringify!($name);
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __method_output {
    () => { () };
    ($ret:ty) => { $ret };
}
