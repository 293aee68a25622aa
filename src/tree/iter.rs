use core::{fmt, iter::FusedIterator, marker::PhantomData};

use super::RbTree;
use crate::utils::rbtree::{Link, Node};

/// The front and back of the not-yet-visited part of a tree.
struct RawIter<T> {
    front: Link<T>,
    back: Link<T>,
    len: usize,
}

impl<T> Clone for RawIter<T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T> RawIter<T> {
    fn new<C, X>(tree: &RbTree<T, C, X>) -> Self {
        // Safety: The tree is borrowed
        unsafe {
            Self {
                front: tree.root.map(|root| Node::min(root)),
                back: tree.root.map(|root| Node::max(root)),
                len: tree.len(),
            }
        }
    }

    /// # Safety
    ///
    /// The tree must not have been modified since `self` was created.
    unsafe fn next(&mut self) -> Link<T> {
        if self.len == 0 {
            return None;
        }
        let node = self.front?;
        self.len -= 1;
        self.front = unsafe { Node::successor(node) };
        Some(node)
    }

    /// # Safety
    ///
    /// The tree must not have been modified since `self` was created.
    unsafe fn next_back(&mut self) -> Link<T> {
        if self.len == 0 {
            return None;
        }
        let node = self.back?;
        self.len -= 1;
        self.back = unsafe { Node::predecessor(node) };
        Some(node)
    }
}

/// An iterator over the elements of an [`RbTree`] in order.
pub struct Iter<'a, T> {
    raw: RawIter<T>,
    _phantom: PhantomData<&'a T>,
}

// Safety: `Iter` hands out `&'a T` only
unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new<C, X>(tree: &'a RbTree<T, C, X>) -> Self {
        Self {
            raw: RawIter::new(tree),
            _phantom: PhantomData,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        // Safety: The tree is borrowed for `'a`
        unsafe { self.raw.next().map(|node| &(*node.as_ptr()).element) }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len, Some(self.raw.len))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        unsafe { self.raw.next_back().map(|node| &(*node.as_ptr()).element) }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// An iterator over the elements of an [`RbTree`] that yields mutable
/// references. Only handed out for data that doesn't take part in the
/// ordering, e.g., map values.
pub(crate) struct IterMut<'a, T> {
    raw: RawIter<T>,
    _phantom: PhantomData<&'a mut T>,
}

// Safety: `IterMut` hands out `&'a mut T` only
unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new<C, X>(tree: &'a mut RbTree<T, C, X>) -> Self {
        Self {
            raw: RawIter::new(tree),
            _phantom: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        // Safety: Each node is visited at most once, and the tree is mutably
        // borrowed for `'a`
        unsafe { self.raw.next().map(|node| &mut (*node.as_ptr()).element) }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len, Some(self.raw.len))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        unsafe { self.raw.next_back().map(|node| &mut (*node.as_ptr()).element) }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

/// An iterator over a contiguous run of elements of an [`RbTree`].
pub struct Range<'a, T> {
    /// `None` if exhausted
    front: Link<T>,
    /// The last element to yield (inclusive)
    back: Link<T>,
    _phantom: PhantomData<&'a T>,
}

// Safety: `Range` hands out `&'a T` only
unsafe impl<T: Sync> Send for Range<'_, T> {}
unsafe impl<T: Sync> Sync for Range<'_, T> {}

impl<'a, T> Range<'a, T> {
    /// Iterate from `first` (inclusive) to `stop` (exclusive, `None` means
    /// the end). `first` must not come after `stop`.
    ///
    /// # Safety
    ///
    /// `first` and `stop` must be included in `tree`.
    pub(super) unsafe fn new<C, X>(tree: &'a RbTree<T, C, X>, first: Link<T>, stop: Link<T>) -> Self {
        let back = match stop {
            _ if first == stop => None,
            Some(stop) => unsafe { Node::predecessor(stop) },
            None => tree.root.map(|root| unsafe { Node::max(root) }),
        };
        Self {
            front: back.and(first),
            back,
            _phantom: PhantomData,
        }
    }

    fn finish(&mut self) {
        self.front = None;
        self.back = None;
    }
}

impl<T> Clone for Range<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T: fmt::Debug> fmt::Debug for Range<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Range<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front?;
        if self.front == self.back {
            self.finish();
        } else {
            self.front = unsafe { Node::successor(node) };
        }
        Some(unsafe { &(*node.as_ptr()).element })
    }
}

impl<T> DoubleEndedIterator for Range<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.back?;
        if self.front == self.back {
            self.finish();
        } else {
            self.back = unsafe { Node::predecessor(node) };
        }
        Some(unsafe { &(*node.as_ptr()).element })
    }
}

impl<T> FusedIterator for Range<'_, T> {}

/// An owning iterator over the elements of an [`RbTree`] in order.
pub struct IntoIter<T, C, X> {
    tree: RbTree<T, C, X>,
}

impl<T, C, X> IntoIter<T, C, X> {
    pub(super) fn new(tree: RbTree<T, C, X>) -> Self {
        Self { tree }
    }
}

impl<T: fmt::Debug, C, X> fmt::Debug for IntoIter<T, C, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tree.iter()).finish()
    }
}

impl<T, C, X> Iterator for IntoIter<T, C, X> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<T, C, X> DoubleEndedIterator for IntoIter<T, C, X> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.tree.pop_last()
    }
}

impl<T, C, X> ExactSizeIterator for IntoIter<T, C, X> {}
impl<T, C, X> FusedIterator for IntoIter<T, C, X> {}
