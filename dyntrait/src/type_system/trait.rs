//! Trait declarations: ordered bundles of methods.

use super::method::Method;
use crate::table::Entry;

/// A named, ordered bundle of methods.
///
/// Rust types implementing `Trait` are markers naming the bundle; they are never instantiated.
/// Use the `dyn_trait!` macro to declare them.
pub trait Trait: 'static {
    /// The trait name, for diagnostics.
    const NAME: &'static str;
}

/// A trait which contains the method `M`.
///
/// # Safety
/// `SLOT` must be the index of the entry for `M` in every entry list returned by the trait's
/// `Admits::entries`.
pub unsafe trait Contains<M: Method>: Trait {
    /// The index of `M` within the trait's dispatch tables.
    const SLOT: usize;
}

/// A trait which `T` satisfies.
///
/// A type is admitted when every method of the trait resolves to an implementation for it.
///
/// # Safety
/// `entries` must return one entry per method of the trait, each created with
/// `Entry::of::<M, T>()` for the method `M` at that slot.
pub unsafe trait Admits<T: 'static>: Trait {
    /// Create the dispatch table entries for `T`, in slot order.
    fn entries() -> Vec<Entry>;
}

/// Declare traits from lists of methods.
///
/// The order of methods determines their slot in dispatch tables. Listing a method twice is a
/// compile error.
///
/// ```
/// use dyntrait::{dyn_trait, method, Contains};
///
/// method! {
///     pub struct Draw(&self);
///     pub struct Move(&mut self, dx: f64, dy: f64);
/// }
///
/// dyn_trait! {
///     /// Things which can be shown on screen.
///     pub trait Sprite { Draw, Move }
/// }
///
/// assert_eq!(<Sprite as Contains<Move>>::SLOT, 1);
/// ```
///
/// ```compile_fail
/// use dyntrait::{dyn_trait, method};
///
/// method! { pub struct Draw(&self); }
///
/// dyn_trait! { pub trait Twice { Draw, Draw } }
/// ```
#[macro_export]
macro_rules! dyn_trait {
    () => {};
    ( $(#[$attr:meta])* $vis:vis trait $name:ident { $($method:ty),+ $(,)? } $($rest:tt)* ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy)]
        $vis enum $name {}

        impl $crate::Trait for $name {
            const NAME: &'static str = stringify!($name);
        }

        unsafe impl<__T: 'static> $crate::Admits<__T> for $name
        where
            $(__T: $crate::Implements<$method>,)+
        {
            fn entries() -> ::std::vec::Vec<$crate::table::Entry> {
                ::std::vec![$($crate::table::Entry::of::<$method, __T>()),+]
            }
        }

        $crate::__dyn_trait_slots!($name; 0usize; $($method),+);

        $crate::dyn_trait!($($rest)*);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __dyn_trait_slots {
    ( $name:ident; $slot:expr; ) => {};
    ( $name:ident; $slot:expr; $method:ty $(, $rest:ty)* ) => {
        unsafe impl $crate::Contains<$method> for $name {
            const SLOT: usize = $slot;
        }

        $crate::__dyn_trait_slots!($name; $slot + 1; $($rest),*);
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Implements, Receiver, Static};

    crate::method! {
        struct First(&self) -> u8;
        struct Second() -> u8;
        struct Third(&mut self, v: u8);
    }

    crate::dyn_trait! {
        trait Ordered { First, Second, Third }
        trait Reversed { Third, Second, First, }
        trait Partial { Second }
    }

    #[test]
    fn slots_follow_declaration_order() {
        assert_eq!(<Ordered as Contains<First>>::SLOT, 0);
        assert_eq!(<Ordered as Contains<Second>>::SLOT, 1);
        assert_eq!(<Ordered as Contains<Third>>::SLOT, 2);
        assert_eq!(<Reversed as Contains<Third>>::SLOT, 0);
        assert_eq!(<Reversed as Contains<First>>::SLOT, 2);
        assert_eq!(<Partial as Contains<Second>>::SLOT, 0);
        assert_eq!(Ordered::NAME, "Ordered");
    }

    struct OnlySecond;

    impl Implements<Second> for OnlySecond {
        fn invoke(_: Receiver<'_, Self, Static>, _: ()) -> u8 {
            2
        }
    }

    #[test]
    fn entries_per_method() {
        assert_eq!(<Partial as Admits<OnlySecond>>::entries().len(), 1);
    }
}
