//! `Shrc<T>` is a heap-allocated smart pointer providing shared ownership of a value within a single thread.
//! `Shrc` stands for: SHared Reference Counted.
//! It is the single-threaded sibling of `Rc<T>`, built on an explicit control block with independent
//! strong and weak counts, and it adds two capabilities `Rc` lacks: custom deleters for externally
//! allocated objects and aliasing projections ([`Shrc::project`]) that keep a whole object alive while
//! pointing at one of its sub-objects.
//!
//! The preferred construction path is [`Shrc::new`], which performs one allocation for the value and
//! its reference counts. Externally allocated objects are adopted through [`Shrc::from_box`] or the
//! unsafe [`Shrc::from_raw_with`] family, which store a by-value [`Deleter`] in the control block and
//! guarantee the deleter still runs if the control-block allocation itself fails.
//!
//! A cycle between `Shrc` pointers can never be deallocated, as the strong counts will never reach
//! zero. The solution is a [`Weak<T>`]: a non-owning handle that observes the object without keeping
//! it alive and must be converted back into an `Shrc` via [`Weak::upgrade`] before the data can be
//! touched. The control-block allocation is freed only once both counts are independently zero.

mod block;
pub mod shrc;
pub use crate::shrc::AllocError;
pub use crate::shrc::BoxDeleter;
pub use crate::shrc::Deleter;
pub use crate::shrc::Shrc;
pub use crate::shrc::Weak;

#[cfg(test)]
mod tests;
