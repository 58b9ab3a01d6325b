//! Dispatch tables and their registry.
//!
//! A dispatch table holds one entry per method of a trait, resolved for one concrete type. Tables
//! are built the first time a (trait, type) pair is erased, then leaked: they are immutable and
//! live for the rest of the process, so every handle for the pair shares one table and holds
//! only a `&'static` reference to it.

use crate::type_system::{Admits, Implements, Method, Receiver, Trait, TypeToken};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;

/// The typed form of an entry: a method implementation taking an erased receiver.
pub(crate) type Thunk<M> =
    unsafe fn(*mut (), <M as Method>::Args) -> <M as Method>::Output;

/// A type-erased method implementation.
///
/// Entries are only converted back to their typed form where the method is statically known.
#[derive(Clone, Copy)]
pub struct Entry(unsafe fn());

unsafe fn thunk<M: Method, T: Implements<M>>(
    this: *mut (),
    args: M::Args,
) -> M::Output {
    <T as Implements<M>>::invoke(Receiver::from_raw(this as *mut T), args)
}

impl Entry {
    /// Create the entry which calls `T`'s implementation of `M`.
    pub fn of<M: Method, T: Implements<M>>() -> Self {
        let f: Thunk<M> = thunk::<M, T>;
        Entry(unsafe { std::mem::transmute::<Thunk<M>, unsafe fn()>(f) })
    }

    /// Get the typed function.
    ///
    /// # Safety
    /// The entry must have been created with `Entry::of::<M, _>()`.
    unsafe fn typed<M: Method>(self) -> Thunk<M> {
        std::mem::transmute::<unsafe fn(), Thunk<M>>(self.0)
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Entry({:p})", self.0 as *const ())
    }
}

/// The dispatch table of a trait for one concrete type.
pub struct DispatchTable {
    trait_name: &'static str,
    tp: TypeToken,
    entries: Box<[Entry]>,
}

impl DispatchTable {
    fn build<Tr: Admits<T>, T: 'static>() -> Self {
        DispatchTable {
            trait_name: Tr::NAME,
            tp: TypeToken::of::<T>(),
            entries: Tr::entries().into_boxed_slice(),
        }
    }

    /// Get the table for the given trait and type, building it if necessary.
    ///
    /// Every call with the same pair returns the same table.
    pub fn of<Tr: Admits<T>, T: 'static>() -> &'static DispatchTable {
        let key = TableKey::of::<Tr, T>();
        if let Some(&table) = TABLES.read().get(&key) {
            log::trace!("using {} table for {}", Tr::NAME, table.tp);
            return table;
        }

        // Another thread may have built the table between releasing the read lock and acquiring
        // the write lock, in which case the entry is already occupied.
        let mut tables = TABLES.write();
        *tables.entry(key).or_insert_with(|| {
            let table: &'static DispatchTable = Box::leak(Box::new(Self::build::<Tr, T>()));
            log::debug!(
                "built {} table for {} ({} entries)",
                Tr::NAME,
                table.tp,
                table.entries.len()
            );
            table
        })
    }

    /// The name of the trait this table implements.
    pub fn trait_name(&self) -> &'static str {
        self.trait_name
    }

    /// The identity of the concrete type this table was built for.
    pub fn type_token(&self) -> &TypeToken {
        &self.tp
    }

    /// The number of entries (methods) in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Call the entry at `slot` as method `M`.
    ///
    /// # Safety
    /// `slot` must be the slot of `M` in the table's trait, and `this` must point to a value of
    /// the table's type, valid for the access mode of `M`.
    #[inline]
    pub(crate) unsafe fn invoke<M: Method>(
        &self,
        slot: usize,
        this: *mut (),
        args: M::Args,
    ) -> M::Output {
        debug_assert!(slot < self.entries.len());
        let f = self.entries.get_unchecked(slot).typed::<M>();
        f(this, args)
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("trait", &self.trait_name)
            .field("type", &self.tp.name())
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Registry key for the (trait, type) tuple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct TableKey {
    tr: TypeId,
    tp: TypeId,
}

impl TableKey {
    fn of<Tr: Trait, T: 'static>() -> Self {
        TableKey {
            tr: TypeId::of::<Tr>(),
            tp: TypeId::of::<T>(),
        }
    }
}

lazy_static! {
    static ref TABLES: RwLock<HashMap<TableKey, &'static DispatchTable>> = Default::default();
}

/// The number of dispatch tables built so far in this process.
pub fn registered() -> usize {
    TABLES.read().len()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Exclusive, Shared};

    crate::method! {
        struct Read(&self) -> u64;
        struct Add(&mut self, v: u64) -> u64;
    }

    crate::dyn_trait! {
        trait Accumulator { Read, Add }
        trait Reader { Read }
    }

    struct Acc(u64);

    impl Implements<Read> for Acc {
        fn invoke(this: Receiver<'_, Self, Shared>, _: ()) -> u64 {
            this.0
        }
    }

    impl Implements<Add> for Acc {
        fn invoke(mut this: Receiver<'_, Self, Exclusive>, (v,): (u64,)) -> u64 {
            this.0 += v;
            this.0
        }
    }

    #[test]
    fn tables_are_shared() {
        let a = DispatchTable::of::<Accumulator, Acc>();
        let b = DispatchTable::of::<Accumulator, Acc>();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.len(), 2);
        assert_eq!(a.trait_name(), "Accumulator");
        assert!(a.type_token().is::<Acc>());

        let r = DispatchTable::of::<Reader, Acc>();
        assert!(!std::ptr::eq(a, r));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn invoke_entries() {
        let table = DispatchTable::of::<Accumulator, Acc>();
        let mut acc = Acc(1);
        let this = &mut acc as *mut Acc as *mut ();
        unsafe {
            assert_eq!(table.invoke::<Add>(1, this, (4,)), 5);
            assert_eq!(table.invoke::<Read>(0, this, ()), 5);
        }
    }
}
