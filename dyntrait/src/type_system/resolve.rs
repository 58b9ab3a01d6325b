//! Resolution of method implementations for concrete types.
//!
//! `Implements<M>` is the one place the implementation of `M` for a type is looked up. It is
//! either written directly for the type, or generated with `use_defaults!` from the method's
//! generic `Defaulted` implementation. A direct implementation and an opted-in default for the
//! same pair conflict, so there is never an ambiguous choice between the two.

use super::method::{Method, Receiver};

/// The implementation of method `M` for `Self`.
///
/// ```
/// use dyntrait::{method, Implements, Receiver, Exclusive};
///
/// method! { pub struct Grow(&mut self, by: u32); }
///
/// struct Plant(u32);
///
/// impl Implements<Grow> for Plant {
///     fn invoke(mut this: Receiver<'_, Self, Exclusive>, (by,): (u32,)) {
///         this.0 += by;
///     }
/// }
///
/// let mut p = Plant(1);
/// Plant::invoke(Receiver::exclusive(&mut p), (2,));
/// assert_eq!(p.0, 3);
/// ```
pub trait Implements<M: Method>: Sized + 'static {
    fn invoke(this: Receiver<'_, Self, M::Access>, args: M::Args) -> M::Output;
}

/// A generic implementation supplied by a method itself.
///
/// Implement this for a method over every type meeting some bound, then opt types into it with
/// `use_defaults!`.
pub trait Defaulted<T>: Method {
    fn invoke_default(this: Receiver<'_, T, Self::Access>, args: Self::Args) -> Self::Output;
}

/// Implement methods for a type using the methods' `Defaulted` implementations.
///
/// ```
/// use dyntrait::{method, use_defaults, Defaulted, Implements, Receiver, Shared};
///
/// method! { pub struct Describe(&self) -> String; }
///
/// impl<T: std::fmt::Debug> Defaulted<T> for Describe {
///     fn invoke_default(this: Receiver<'_, T, Shared>, _: ()) -> String {
///         format!("{:?}", &*this)
///     }
/// }
///
/// #[derive(Debug)]
/// struct Point(i32, i32);
///
/// use_defaults!(Point: Describe);
///
/// let p = Point(1, 2);
/// assert_eq!(Point::invoke(Receiver::shared(&p), ()), "Point(1, 2)");
/// ```
///
/// A type that does not meet the default's bound cannot opt in:
///
/// ```compile_fail
/// use dyntrait::{method, use_defaults, Defaulted, Receiver, Shared};
///
/// method! { pub struct Describe(&self) -> String; }
///
/// impl<T: std::fmt::Debug> Defaulted<T> for Describe {
///     fn invoke_default(this: Receiver<'_, T, Shared>, _: ()) -> String {
///         format!("{:?}", &*this)
///     }
/// }
///
/// struct Opaque;
///
/// use_defaults!(Opaque: Describe);
/// ```
#[macro_export]
macro_rules! use_defaults {
    ( $t:ty : $($method:ty),+ $(,)? ) => {
        $(
            impl $crate::Implements<$method> for $t {
                fn invoke(
                    this: $crate::Receiver<'_, Self, <$method as $crate::Method>::Access>,
                    args: <$method as $crate::Method>::Args,
                ) -> <$method as $crate::Method>::Output {
                    <$method as $crate::Defaulted<Self>>::invoke_default(this, args)
                }
            }
        )+
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Exclusive, Shared, Static};

    crate::method! {
        struct Double(&mut self);
        struct Get(&self) -> i64;
        struct Unit() -> &'static str;
    }

    trait Counter {
        fn count(&mut self) -> &mut i64;
    }

    impl<T: Counter> Defaulted<T> for Double {
        fn invoke_default(mut this: Receiver<'_, T, Exclusive>, _: ()) {
            *this.count() *= 2;
        }
    }

    impl<T> Defaulted<T> for Unit {
        fn invoke_default(_: Receiver<'_, T, Static>, _: ()) -> &'static str {
            "default"
        }
    }

    struct A(i64);
    struct B(i64);

    impl Counter for A {
        fn count(&mut self) -> &mut i64 {
            &mut self.0
        }
    }

    impl Counter for B {
        fn count(&mut self) -> &mut i64 {
            &mut self.0
        }
    }

    use_defaults!(A: Double, Unit);
    crate::use_defaults!(B: Unit);

    impl Implements<Double> for B {
        fn invoke(mut this: Receiver<'_, Self, Exclusive>, _: ()) {
            this.0 *= 3;
        }
    }

    impl Implements<Get> for A {
        fn invoke(this: Receiver<'_, Self, Shared>, _: ()) -> i64 {
            this.0
        }
    }

    #[test]
    fn default_and_override() {
        let mut a = A(5);
        let mut b = B(5);
        <A as Implements<Double>>::invoke(Receiver::exclusive(&mut a), ());
        <B as Implements<Double>>::invoke(Receiver::exclusive(&mut b), ());
        assert_eq!(a.0, 10);
        assert_eq!(b.0, 15);
        assert_eq!(<A as Implements<Get>>::invoke(Receiver::shared(&a), ()), 10);
        assert_eq!(<A as Implements<Unit>>::invoke(Receiver::none(), ()), "default");
    }
}
