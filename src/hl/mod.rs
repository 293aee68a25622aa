//! High-level containers built on [`crate::tree::RbTree`]
//!
//! [`Set`] and [`Map`] keep at most one element per equivalent key, while
//! [`MultiSet`] and [`MultiMap`] keep every inserted element, ordering
//! equivalent ones by insertion.
pub mod map;
pub mod set;

pub use self::{
    map::{Map, MultiMap},
    set::{MultiSet, Set},
};
