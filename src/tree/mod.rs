//! The ordered red-black tree shared by every container in [`crate::hl`].
//!
//! [`RbTree`] owns its nodes and orders them by a [`Compare`] applied to the
//! key that a [`KeyOf`] extracts from each element. Positions inside a tree
//! are represented by cursors:
//!
//!  - [`Cursor`] borrows the tree immutably and walks in both directions.
//!  - [`RevCursor`] is a [`Cursor`] with the directions swapped.
//!  - [`CursorMut`] borrows the tree mutably and can remove the element it
//!    points at, moving on to the next one.
//!
//! A cursor can be one of three [`Position`]s. The off-the-edge positions
//! remember the element at that edge, so no sentinel node is needed.
//!
//! # Invalidation
//!
//! Removing an element only invalidates cursors at that element. The borrow
//! checker enforces this: a [`Cursor`] can't outlive a mutation of the tree,
//! and [`CursorMut::remove_current`] repositions the only cursor that can
//! exist during the mutation.
mod compare;
mod cursor;
mod iter;
mod rbtree;

pub use self::{
    compare::*,
    cursor::{Cursor, CursorMut, Position, RevCursor},
    iter::{IntoIter, Iter, Range},
    rbtree::RbTree,
};
pub(crate) use self::iter::IterMut;
use self::cursor::RawCursor;
