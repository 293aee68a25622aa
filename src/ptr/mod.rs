//! Owning smart pointers
//!
//!  - [`UniquePtr`] is an exclusive owner with a configurable destruction
//!    action ([`Deleter`]).
//!
//!  - [`SharedPtr`] is an atomically reference-counted owner. Pointers derived
//!    from one another (by [`SharedPtr::map`], [`SharedPtr::downcast`], or
//!    [`SharedPtr::cast`]) share the same control block, so the owned object
//!    lives as long as any of them does. [`WeakPtr`] observes a control block
//!    without keeping the object alive, and [`SharedFromThis`] lets an object
//!    obtain a [`SharedPtr`] to itself.
mod shared;
mod unique;

pub use self::{shared::*, unique::*};
