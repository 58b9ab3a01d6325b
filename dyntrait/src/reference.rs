//! Borrowed trait objects.
//!
//! A trait reference pairs a pointer to a borrowed value with the dispatch table of the value's
//! type. The referent is never copied, and the borrow checker ensures it outlives the reference.

use crate::error::TypeMismatch;
use crate::table::DispatchTable;
use crate::type_system::{Admits, Contains, Method, ReadOnly, Trait};
use std::marker::PhantomData;
use std::ptr::NonNull;

/// A read-only reference to a value of any type satisfying `Tr`.
///
/// Only methods which do not mutate the receiver may be called:
///
/// ```compile_fail
/// use dyntrait::{dyn_trait, method, Exclusive, Implements, Receiver, TraitRef};
///
/// method! { pub struct Inc(&mut self); }
///
/// dyn_trait! { pub trait Counter { Inc } }
///
/// impl Implements<Inc> for u32 {
///     fn invoke(mut this: Receiver<'_, Self, Exclusive>, _: ()) {
///         *this += 1;
///     }
/// }
///
/// let n = 0u32;
/// TraitRef::<Counter>::new(&n).call::<Inc>(());
/// ```
pub struct TraitRef<'a, Tr: Trait> {
    ptr: NonNull<()>,
    table: &'static DispatchTable,
    _marker: PhantomData<(&'a (), fn() -> Tr)>,
}

impl<'a, Tr: Trait> TraitRef<'a, Tr> {
    /// Borrow a value as a trait reference.
    pub fn new<T: 'static>(value: &'a T) -> Self
    where
        Tr: Admits<T>,
    {
        TraitRef {
            ptr: NonNull::from(value).cast(),
            table: DispatchTable::of::<Tr, T>(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// `ptr` must point to a value of the table's type, readable for `'a`.
    pub(crate) unsafe fn from_raw(ptr: *const (), table: &'static DispatchTable) -> Self {
        TraitRef {
            ptr: NonNull::new_unchecked(ptr as *mut ()),
            table,
            _marker: PhantomData,
        }
    }

    /// Call a method which does not mutate the value.
    #[inline]
    pub fn call<M>(&self, args: M::Args) -> M::Output
    where
        M: Method,
        M::Access: ReadOnly,
        Tr: Contains<M>,
    {
        unsafe {
            self.table
                .invoke::<M>(<Tr as Contains<M>>::SLOT, self.ptr.as_ptr(), args)
        }
    }

    /// Return whether the referent is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.table.type_token().is::<T>()
    }

    /// Get the referent, if it is a `T`.
    pub fn get<T: 'static>(&self) -> Result<&'a T, TypeMismatch> {
        if self.is::<T>() {
            Ok(unsafe { &*(self.ptr.as_ptr() as *const T) })
        } else {
            Err(TypeMismatch::new::<T>(self.table.type_token()))
        }
    }

    /// The name of the referent's type.
    pub fn type_name(&self) -> &'static str {
        self.table.type_token().name()
    }

    /// The dispatch table used by this reference.
    pub fn table(&self) -> &'static DispatchTable {
        self.table
    }
}

impl<'a, Tr: Trait> Clone for TraitRef<'a, Tr> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, Tr: Trait> Copy for TraitRef<'a, Tr> {}

impl<'a, Tr: Trait> From<TraitMut<'a, Tr>> for TraitRef<'a, Tr> {
    fn from(r: TraitMut<'a, Tr>) -> Self {
        TraitRef {
            ptr: r.ptr,
            table: r.table,
            _marker: PhantomData,
        }
    }
}

impl<'a, Tr: Trait> std::fmt::Debug for TraitRef<'a, Tr> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("TraitRef")
            .field("trait", &Tr::NAME)
            .field("type", &self.type_name())
            .finish()
    }
}

/// A mutable reference to a value of any type satisfying `Tr`.
///
/// ```
/// use dyntrait::{dyn_trait, method, Exclusive, Implements, Receiver, Shared, TraitMut};
///
/// method! {
///     pub struct Inc(&mut self);
///     pub struct Value(&self) -> u64;
/// }
///
/// dyn_trait! { pub trait Counter { Inc, Value } }
///
/// impl Implements<Inc> for u64 {
///     fn invoke(mut this: Receiver<'_, Self, Exclusive>, _: ()) {
///         *this += 1;
///     }
/// }
///
/// impl Implements<Value> for u64 {
///     fn invoke(this: Receiver<'_, Self, Shared>, _: ()) -> u64 {
///         *this
///     }
/// }
///
/// let mut n = 41u64;
/// let mut counter = TraitMut::<Counter>::new(&mut n);
/// counter.call_mut::<Inc>(());
/// assert_eq!(counter.call::<Value>(()), 42);
/// *counter.into_mut::<u64>().unwrap() += 1;
/// assert_eq!(n, 43);
/// ```
pub struct TraitMut<'a, Tr: Trait> {
    ptr: NonNull<()>,
    table: &'static DispatchTable,
    _marker: PhantomData<(&'a mut (), fn() -> Tr)>,
}

impl<'a, Tr: Trait> TraitMut<'a, Tr> {
    /// Mutably borrow a value as a trait reference.
    pub fn new<T: 'static>(value: &'a mut T) -> Self
    where
        Tr: Admits<T>,
    {
        TraitMut {
            ptr: NonNull::from(value).cast(),
            table: DispatchTable::of::<Tr, T>(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// `ptr` must point to a value of the table's type, exclusively borrowed for `'a`.
    pub(crate) unsafe fn from_raw(ptr: *mut (), table: &'static DispatchTable) -> Self {
        TraitMut {
            ptr: NonNull::new_unchecked(ptr),
            table,
            _marker: PhantomData,
        }
    }

    /// Call a method which does not mutate the value.
    #[inline]
    pub fn call<M>(&self, args: M::Args) -> M::Output
    where
        M: Method,
        M::Access: ReadOnly,
        Tr: Contains<M>,
    {
        self.as_trait_ref().call::<M>(args)
    }

    /// Call any method of the trait.
    #[inline]
    pub fn call_mut<M>(&mut self, args: M::Args) -> M::Output
    where
        M: Method,
        Tr: Contains<M>,
    {
        unsafe {
            self.table
                .invoke::<M>(<Tr as Contains<M>>::SLOT, self.ptr.as_ptr(), args)
        }
    }

    /// Return whether the referent is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.table.type_token().is::<T>()
    }

    /// Get the referent, if it is a `T`.
    pub fn get<T: 'static>(&self) -> Result<&T, TypeMismatch> {
        self.as_trait_ref().get()
    }

    /// Get the referent mutably, if it is a `T`.
    pub fn get_mut<T: 'static>(&mut self) -> Result<&mut T, TypeMismatch> {
        self.reborrow().into_mut().map_err(|r| r.mismatch::<T>())
    }

    /// Convert into a reference to the referent, if it is a `T`.
    pub fn into_mut<T: 'static>(self) -> Result<&'a mut T, Self> {
        if self.is::<T>() {
            Ok(unsafe { &mut *(self.ptr.as_ptr() as *mut T) })
        } else {
            Err(self)
        }
    }

    /// Reborrow as a read-only reference.
    pub fn as_trait_ref(&self) -> TraitRef<'_, Tr> {
        TraitRef {
            ptr: self.ptr,
            table: self.table,
            _marker: PhantomData,
        }
    }

    /// Reborrow for a shorter lifetime.
    pub fn reborrow(&mut self) -> TraitMut<'_, Tr> {
        TraitMut {
            ptr: self.ptr,
            table: self.table,
            _marker: PhantomData,
        }
    }

    /// The name of the referent's type.
    pub fn type_name(&self) -> &'static str {
        self.table.type_token().name()
    }

    /// The dispatch table used by this reference.
    pub fn table(&self) -> &'static DispatchTable {
        self.table
    }

    fn mismatch<T: 'static>(&self) -> TypeMismatch {
        TypeMismatch::new::<T>(self.table.type_token())
    }
}

impl<'a, Tr: Trait> std::fmt::Debug for TraitMut<'a, Tr> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("TraitMut")
            .field("trait", &Tr::NAME)
            .field("type", &self.type_name())
            .finish()
    }
}
