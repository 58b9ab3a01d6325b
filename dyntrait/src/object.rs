//! Owning trait objects.

use crate::error::TypeMismatch;
use crate::reference::{TraitMut, TraitRef};
use crate::storage::{Dynamic, Inline, Storage, Store};
use crate::table::DispatchTable;
use crate::type_system::{Admits, Contains, Method, ReadOnly, Trait, TypeToken};
use std::marker::PhantomData;

/// A value of any type satisfying the trait `Tr`, held in storage `S`.
///
/// The object holds only its storage and a reference to the shared dispatch table of the stored
/// type. Copying (for inline storage) or cloning (for dynamic storage) an object copies the
/// value and the table reference.
///
/// ```
/// use dyntrait::{dyn_trait, method, Exclusive, Implements, Receiver, Shared, TraitObject};
/// use dyntrait::storage::Inline;
///
/// method! {
///     pub struct Push(&mut self, v: i32);
///     pub struct Total(&self) -> i32;
/// }
///
/// dyn_trait! { pub trait Sink { Push, Total } }
///
/// #[derive(Clone, Copy, Default)]
/// struct Sum(i32);
///
/// impl Implements<Push> for Sum {
///     fn invoke(mut this: Receiver<'_, Self, Exclusive>, (v,): (i32,)) {
///         this.0 += v;
///     }
/// }
///
/// impl Implements<Total> for Sum {
///     fn invoke(this: Receiver<'_, Self, Shared>, _: ()) -> i32 {
///         this.0
///     }
/// }
///
/// let mut sink = TraitObject::<Sink, Inline>::new(Sum::default());
/// sink.call_mut::<Push>((2,));
/// sink.call_mut::<Push>((3,));
/// assert_eq!(sink.call::<Total>(()), 5);
/// assert_eq!(sink.get::<Sum>().unwrap().0, 5);
/// ```
///
/// Types which do not implement every method of the trait cannot be erased:
///
/// ```compile_fail
/// use dyntrait::{dyn_trait, method, Implements, Receiver, Shared, TraitObject};
///
/// method! {
///     pub struct Name(&self) -> String;
///     pub struct Age(&self) -> u32;
/// }
///
/// dyn_trait! { pub trait Person { Name, Age } }
///
/// #[derive(Clone)]
/// struct Anonymous;
///
/// impl Implements<Age> for Anonymous {
///     fn invoke(_: Receiver<'_, Self, Shared>, _: ()) -> u32 {
///         0
///     }
/// }
///
/// let _ = TraitObject::<Person>::new(Anonymous);
/// ```
///
/// Mutating methods require exclusive access to the object:
///
/// ```compile_fail
/// use dyntrait::{dyn_trait, method, Exclusive, Implements, Receiver, TraitObject};
///
/// method! { pub struct Clear(&mut self); }
///
/// dyn_trait! { pub trait Clearable { Clear } }
///
/// impl Implements<Clear> for String {
///     fn invoke(mut this: Receiver<'_, Self, Exclusive>, _: ()) {
///         this.clear();
///     }
/// }
///
/// let s = TraitObject::<Clearable>::new(String::from("text"));
/// s.call::<Clear>(());
/// ```
///
/// Arguments must match the method's declared parameters:
///
/// ```compile_fail
/// use dyntrait::{dyn_trait, method, Exclusive, Implements, Receiver, TraitObject};
///
/// method! { pub struct Resize(&mut self, len: usize); }
///
/// dyn_trait! { pub trait Resizable { Resize } }
///
/// impl Implements<Resize> for Vec<u8> {
///     fn invoke(mut this: Receiver<'_, Self, Exclusive>, (len,): (usize,)) {
///         this.resize(len, 0);
///     }
/// }
///
/// let mut v = TraitObject::<Resizable>::new(vec![1u8]);
/// v.call_mut::<Resize>((4i32,));
/// ```
pub struct TraitObject<Tr: Trait, S: Storage = Dynamic> {
    // Always the table of the type held by `storage`, which `Store` guarantees.
    table: &'static DispatchTable,
    storage: S,
    _trait: PhantomData<fn() -> Tr>,
}

/// A trait object with inline storage of `N` bytes.
pub type InlineObject<Tr, const N: usize> = TraitObject<Tr, Inline<N>>;

impl<Tr: Trait, S: Storage> TraitObject<Tr, S> {
    /// Erase the given value.
    pub fn new<T: 'static>(value: T) -> Self
    where
        Tr: Admits<T>,
        S: Store<T>,
    {
        TraitObject {
            table: DispatchTable::of::<Tr, T>(),
            storage: S::store(value),
            _trait: PhantomData,
        }
    }

    /// Replace the held value with one of (possibly) another type.
    pub fn set<T: 'static>(&mut self, value: T)
    where
        Tr: Admits<T>,
        S: Store<T>,
    {
        *self = Self::new(value);
    }

    /// Call a method which does not mutate the value.
    #[inline]
    pub fn call<M>(&self, args: M::Args) -> M::Output
    where
        M: Method,
        M::Access: ReadOnly,
        Tr: Contains<M>,
    {
        // The access mode is read-only, so the pointer is never written through.
        unsafe {
            self.table.invoke::<M>(
                <Tr as Contains<M>>::SLOT,
                self.storage.as_ptr() as *mut (),
                args,
            )
        }
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
                .invoke::<M>(<Tr as Contains<M>>::SLOT, self.storage.as_mut_ptr(), args)
        }
    }

    /// Return whether the held value is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.storage.held().is::<T>()
    }

    /// Get a reference to the held value, if it is a `T`.
    pub fn get<T: 'static>(&self) -> Result<&T, TypeMismatch> {
        self.storage.get()
    }

    /// Get a mutable reference to the held value, if it is a `T`.
    pub fn get_mut<T: 'static>(&mut self) -> Result<&mut T, TypeMismatch> {
        self.storage.get_mut()
    }

    /// Take the held value, if it is a `T`.
    pub fn into_value<T: 'static>(self) -> Result<T, Self> {
        let TraitObject { table, storage, .. } = self;
        storage.into_value().map_err(|storage| TraitObject {
            table,
            storage,
            _trait: PhantomData,
        })
    }

    /// The identity of the held type.
    pub fn type_token(&self) -> &TypeToken {
        self.storage.held()
    }

    /// The name of the held type.
    pub fn type_name(&self) -> &'static str {
        self.storage.held().name()
    }

    /// The dispatch table used by this object.
    pub fn table(&self) -> &'static DispatchTable {
        self.table
    }

    /// Borrow the object as a read-only trait reference.
    pub fn as_trait_ref(&self) -> TraitRef<'_, Tr> {
        unsafe { TraitRef::from_raw(self.storage.as_ptr(), self.table) }
    }

    /// Borrow the object as a mutable trait reference.
    pub fn as_trait_mut(&mut self) -> TraitMut<'_, Tr> {
        unsafe { TraitMut::from_raw(self.storage.as_mut_ptr(), self.table) }
    }
}

impl<Tr: Trait, S: Storage + Clone> Clone for TraitObject<Tr, S> {
    fn clone(&self) -> Self {
        TraitObject {
            table: self.table,
            storage: self.storage.clone(),
            _trait: PhantomData,
        }
    }
}

impl<Tr: Trait, S: Storage + Copy> Copy for TraitObject<Tr, S> {}

impl<Tr: Trait, S: Storage> std::fmt::Debug for TraitObject<Tr, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("TraitObject")
            .field("trait", &Tr::NAME)
            .field("type", &self.type_name())
            .finish()
    }
}
