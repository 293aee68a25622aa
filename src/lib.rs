#![doc = include_str!("../README.md")]
#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
#[cfg_attr(test, macro_use)]
extern crate std;

#[macro_use]
mod macros;
pub mod hl;
pub mod ptr;
pub mod tree;
pub mod variant;
mod utils {
    pub mod rbtree;
}
