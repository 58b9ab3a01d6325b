//! Storage for erased values.
//!
//! `Inline` keeps a `Copy` value in a fixed-size buffer within the handle itself, so handles are
//! plain bytes which may be copied freely. `Dynamic` keeps any `Clone` value in a heap cell.
//!
//! Checked retrieval (`get`, `get_mut`, `into_value`) compares the stored type identity and
//! fails with `TypeMismatch`. Unchecked retrieval is used by dispatch table entries, which are
//! only ever paired with storage of the type they were built for.

use crate::error::TypeMismatch;
use crate::type_system::TypeToken;
use std::any::Any;
use std::marker::PhantomData;
use std::mem::{align_of, size_of, MaybeUninit};

/// The default capacity, in bytes, of inline storage.
pub const DEFAULT_INLINE_CAPACITY: usize = 16;

/// The alignment of inline storage buffers.
///
/// Values with a greater alignment cannot be stored inline.
pub const INLINE_ALIGN: usize = 16;

/// A strategy for holding one erased value.
///
/// # Safety
/// `held` must identify the type of the stored value, and `as_ptr`/`as_mut_ptr` must point to
/// it.
pub unsafe trait Storage: Sized {
    /// The identity of the stored type.
    fn held(&self) -> &TypeToken;

    /// A pointer to the stored value.
    fn as_ptr(&self) -> *const ();

    /// A mutable pointer to the stored value.
    fn as_mut_ptr(&mut self) -> *mut ();

    /// Take the value out of storage, if it is a `T`.
    fn into_value<T: 'static>(self) -> Result<T, Self>;

    /// Get a reference to the value, if it is a `T`.
    fn get<T: 'static>(&self) -> Result<&T, TypeMismatch> {
        if self.held().is::<T>() {
            Ok(unsafe { self.get_unchecked() })
        } else {
            Err(TypeMismatch::new::<T>(self.held()))
        }
    }

    /// Get a mutable reference to the value, if it is a `T`.
    fn get_mut<T: 'static>(&mut self) -> Result<&mut T, TypeMismatch> {
        if self.held().is::<T>() {
            Ok(unsafe { self.get_unchecked_mut() })
        } else {
            Err(TypeMismatch::new::<T>(self.held()))
        }
    }

    /// Get a reference to the value without checking its type.
    ///
    /// # Safety
    /// The stored value must be a `T`.
    unsafe fn get_unchecked<T>(&self) -> &T {
        &*(self.as_ptr() as *const T)
    }

    /// Get a mutable reference to the value without checking its type.
    ///
    /// # Safety
    /// The stored value must be a `T`.
    unsafe fn get_unchecked_mut<T>(&mut self) -> &mut T {
        &mut *(self.as_mut_ptr() as *mut T)
    }
}

/// Storage which can hold a `T`.
///
/// Trait objects pair the dispatch table of `T` with whatever `store` returns, so the contract is
/// unsafe to implement:
///
/// ```compile_fail
/// use dyntrait::storage::{Dynamic, Store};
///
/// struct Big([u64; 64]);
///
/// impl Store<Big> for Dynamic {
///     fn store(_: Big) -> Self {
///         <Dynamic as Store<u8>>::store(7)
///     }
/// }
/// ```
///
/// # Safety
/// The storage returned by `store` must hold the given value: `held` must identify `T`, and
/// `as_ptr`/`as_mut_ptr` must point to the value.
pub unsafe trait Store<T>: Storage {
    /// Create storage holding the given value.
    fn store(value: T) -> Self;
}

/// Fixed-capacity storage of `N` bytes, held inline.
///
/// Only `Copy` values may be stored (so no destructor ever needs to run), and storing a value
/// larger than `N` bytes or aligned to more than `INLINE_ALIGN` fails to compile:
///
/// ```compile_fail
/// use dyntrait::storage::{Inline, Store};
///
/// let _ = <Inline<8> as Store<[u64; 2]>>::store([0, 0]);
/// ```
///
/// ```compile_fail
/// use dyntrait::storage::{Inline, Store};
///
/// #[derive(Clone, Copy)]
/// #[repr(align(32))]
/// struct Aligned([u8; 32]);
///
/// let _ = <Inline<64> as Store<Aligned>>::store(Aligned([0; 32]));
/// ```
///
/// The same value fits when it is aligned within `INLINE_ALIGN`:
///
/// ```
/// use dyntrait::storage::{Inline, Storage, Store};
///
/// #[derive(Clone, Copy)]
/// #[repr(align(16))]
/// struct Aligned([u8; 32]);
///
/// let st = <Inline<64> as Store<Aligned>>::store(Aligned([1; 32]));
/// assert_eq!(st.get::<Aligned>().unwrap().0[31], 1);
/// ```
#[derive(Clone, Copy)]
#[repr(C, align(16))]
pub struct Inline<const N: usize = DEFAULT_INLINE_CAPACITY> {
    buffer: [MaybeUninit<u8>; N],
    held: TypeToken,
    // Stored values need not be Send or Sync.
    _marker: PhantomData<*const ()>,
}

trait Fits<T> {
    const OK: ();
}

impl<T, const N: usize> Fits<T> for Inline<N> {
    const OK: () = assert!(
        size_of::<T>() <= N && align_of::<T>() <= INLINE_ALIGN,
        "value does not fit in inline storage"
    );
}

impl<const N: usize> Inline<N> {
    /// The capacity of the buffer, in bytes.
    pub const CAPACITY: usize = N;
}

unsafe impl<T: Copy + 'static, const N: usize> Store<T> for Inline<N> {
    fn store(value: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = <Self as Fits<T>>::OK;
        let mut ret = Inline {
            buffer: [MaybeUninit::uninit(); N],
            held: TypeToken::of::<T>(),
            _marker: PhantomData,
        };
        unsafe { (ret.buffer.as_mut_ptr() as *mut T).write(value) };
        ret
    }
}

unsafe impl<const N: usize> Storage for Inline<N> {
    fn held(&self) -> &TypeToken {
        &self.held
    }

    fn as_ptr(&self) -> *const () {
        self.buffer.as_ptr() as *const ()
    }

    fn as_mut_ptr(&mut self) -> *mut () {
        self.buffer.as_mut_ptr() as *mut ()
    }

    fn into_value<T: 'static>(self) -> Result<T, Self> {
        if self.held.is::<T>() {
            Ok(unsafe { (self.buffer.as_ptr() as *const T).read() })
        } else {
            Err(self)
        }
    }
}

impl<const N: usize> std::fmt::Debug for Inline<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Inline")
            .field("capacity", &N)
            .field("held", &self.held.name())
            .finish()
    }
}

/// A value which can be cloned behind a type-erased box.
trait CloneAny: Any {
    fn clone_box(&self) -> Box<dyn CloneAny>;
}

impl<T: Any + Clone> CloneAny for T {
    fn clone_box(&self) -> Box<dyn CloneAny> {
        Box::new(self.clone())
    }
}

/// Heap storage for any `Clone` value.
pub struct Dynamic {
    value: Box<dyn CloneAny>,
    held: TypeToken,
}

unsafe impl<T: Clone + 'static> Store<T> for Dynamic {
    fn store(value: T) -> Self {
        Dynamic {
            value: Box::new(value),
            held: TypeToken::of::<T>(),
        }
    }
}

unsafe impl Storage for Dynamic {
    fn held(&self) -> &TypeToken {
        &self.held
    }

    fn as_ptr(&self) -> *const () {
        &*self.value as *const dyn CloneAny as *const ()
    }

    fn as_mut_ptr(&mut self) -> *mut () {
        &mut *self.value as *mut dyn CloneAny as *mut ()
    }

    fn into_value<T: 'static>(self) -> Result<T, Self> {
        if self.held.is::<T>() {
            let ptr = Box::into_raw(self.value) as *mut T;
            Ok(*unsafe { Box::from_raw(ptr) })
        } else {
            Err(self)
        }
    }
}

impl Clone for Dynamic {
    fn clone(&self) -> Self {
        Dynamic {
            value: (*self.value).clone_box(),
            held: self.held,
        }
    }
}

impl std::fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Dynamic")
            .field("held", &self.held.name())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct S {
        a: i32,
        b: (),
        c: [u16; 4],
    }

    #[test]
    fn inline() {
        let s = S {
            a: 42,
            b: (),
            c: [0, 1, 2, 3],
        };
        let mut st = <Inline as Store<S>>::store(s);
        let copied = st;
        assert_eq!(st.get::<S>(), Ok(&s));
        assert!(st.get::<u32>().is_err());
        st.get_mut::<S>().unwrap().a = 7;
        assert_eq!(st.get::<S>().unwrap().a, 7);
        assert_eq!(copied.get::<S>().unwrap().a, 42);
        assert_eq!(copied.into_value::<S>().unwrap(), s);
    }

    #[test]
    fn inline_alignment() {
        let st = <Inline<8> as Store<u64>>::store(0x0102_0304_0506_0708);
        assert_eq!(st.as_ptr() as usize % INLINE_ALIGN, 0);
        assert_eq!(*st.get::<u64>().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(Inline::<8>::CAPACITY, 8);
        let zst = <Inline<0> as Store<()>>::store(());
        assert!(zst.get::<()>().is_ok());
    }

    #[test]
    fn inline_mismatch() {
        let st = <Inline as Store<u8>>::store(1);
        let err = st.get::<i8>().unwrap_err();
        assert_eq!(err.expected, "i8");
        assert_eq!(err.found, "u8");
        let st = st.into_value::<i8>().unwrap_err();
        assert_eq!(st.into_value::<u8>().unwrap(), 1);
    }

    #[test]
    fn dynamic() {
        let st = <Dynamic as Store<String>>::store("hello".to_owned());
        let mut copied = st.clone();
        copied.get_mut::<String>().unwrap().push_str(", world");
        assert_eq!(st.get::<String>().unwrap(), "hello");
        assert_eq!(copied.get::<String>().unwrap(), "hello, world");
        assert!(st.get::<&str>().is_err());
        let st = st.into_value::<Vec<u8>>().unwrap_err();
        assert_eq!(st.into_value::<String>().unwrap(), "hello");
    }

    struct Dropper(std::rc::Rc<std::cell::Cell<u32>>);

    impl Clone for Dropper {
        fn clone(&self) -> Self {
            Dropper(self.0.clone())
        }
    }

    impl Drop for Dropper {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn stored_type_is_held() {
        let st = <Inline as Store<u16>>::store(3);
        assert!(st.held().is::<u16>());
        assert_eq!(unsafe { *(st.as_ptr() as *const u16) }, 3);

        let mut st = <Dynamic as Store<Vec<u8>>>::store(vec![1, 2]);
        assert!(st.held().is::<Vec<u8>>());
        assert_eq!(unsafe { &*(st.as_mut_ptr() as *const Vec<u8>) }, &[1, 2]);
    }

    #[test]
    fn dynamic_drops() {
        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let st = <Dynamic as Store<Dropper>>::store(Dropper(count.clone()));
        let copied = st.clone();
        drop(st);
        assert_eq!(count.get(), 1);
        let d = copied.into_value::<Dropper>().ok().unwrap();
        assert_eq!(count.get(), 1);
        drop(d);
        assert_eq!(count.get(), 2);
    }
}
