//! Duck-typed dynamic dispatch.
//!
//! Values of unrelated types are wrapped in uniform handles and called through named operations,
//! with no base type and no table pointer embedded in the values themselves. A type qualifies for
//! a trait purely by implementing each of its methods.
//!
//! * Methods are declared with `method!` and implemented with `Implements`.
//! * Traits are ordered lists of methods, declared with `dyn_trait!`.
//! * Each (trait, type) pair gets one dispatch table, built on first use and shared thereafter.
//! * `TraitObject` owns an erased value, in `Inline` or `Dynamic` storage.
//! * `TraitRef` and `TraitMut` borrow one.
//!
//! ```
//! use dyntrait::{dyn_trait, method, Exclusive, Implements, Receiver, Shared, TraitObject};
//!
//! method! {
//!     pub struct Area(&self) -> f64;
//!     pub struct Scale(&mut self, by: f64);
//! }
//!
//! dyn_trait! { pub trait Shape { Area, Scale } }
//!
//! #[derive(Clone)]
//! struct Square(f64);
//!
//! impl Implements<Area> for Square {
//!     fn invoke(this: Receiver<'_, Self, Shared>, _: ()) -> f64 {
//!         this.0 * this.0
//!     }
//! }
//!
//! impl Implements<Scale> for Square {
//!     fn invoke(mut this: Receiver<'_, Self, Exclusive>, (by,): (f64,)) {
//!         this.0 *= by;
//!     }
//! }
//!
//! let mut s = TraitObject::<Shape>::new(Square(4.0));
//! s.call_mut::<Scale>((0.5,));
//! assert_eq!(s.call::<Area>(()), 4.0);
//! ```

pub mod error;
mod object;
mod reference;
pub mod storage;
pub mod table;
pub mod type_system;

pub use self::{error::TypeMismatch, object::*, reference::*, table::DispatchTable, type_system::*};
