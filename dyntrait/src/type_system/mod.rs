//! The dyntrait type system.
//!
//! Methods are described by zero-sized descriptor types, and traits are ordered lists of those
//! methods. Any rust type satisfies a trait by implementing every method in it, either directly
//! or through a method's generic default. No type needs to know about the traits it will be used
//! with.
//!
//! ```
//! use dyntrait::{dyn_trait, method, use_defaults, Defaulted, Implements, Receiver, Shared};
//!
//! method! {
//!     pub struct Name(&self) -> String;
//!     pub struct Legs(&self) -> u32;
//! }
//!
//! impl<T> Defaulted<T> for Legs {
//!     fn invoke_default(_: Receiver<'_, T, Shared>, _: ()) -> u32 {
//!         4
//!     }
//! }
//!
//! dyn_trait! {
//!     pub trait Animal { Name, Legs }
//! }
//!
//! struct Dog;
//!
//! impl Implements<Name> for Dog {
//!     fn invoke(_: Receiver<'_, Self, Shared>, _: ()) -> String {
//!         "dog".into()
//!     }
//! }
//!
//! use_defaults!(Dog: Legs);
//!
//! let dog = dyntrait::TraitRef::<Animal>::new(&Dog);
//! assert_eq!(dog.call::<Name>(()), "dog");
//! assert_eq!(dog.call::<Legs>(()), 4);
//! ```

mod method;
mod resolve;

#[path = "type.rs"]
mod dyn_type;

#[path = "trait.rs"]
mod dyn_trait;

pub use dyn_trait::*;
pub use dyn_type::*;
pub use method::*;
pub use resolve::*;
