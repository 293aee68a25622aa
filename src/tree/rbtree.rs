use alloc::boxed::Box;
use core::{
    fmt,
    marker::PhantomData,
    ops::{Bound, RangeBounds},
    ptr::NonNull,
};

use super::{
    Compare, Cursor, CursorMut, Identity, IntoIter, Iter, IterMut, KeyOf, Natural, Range,
    RawCursor, RevCursor,
};
use crate::utils::rbtree::{IsRightChild, Link, Node, Search};


// Data types
// ----------------------------------------------------------------------------

/// An ordered collection backed by a red-black tree.
///
/// Elements are ordered by the key extracted by `X` ([`KeyOf`]) under the
/// strict weak order `C` ([`Compare`]). The same tree supports two insertion
/// policies side by side: the `*_unique` methods reject an element whose key
/// is equivalent to an existing one, and the `*_multi` methods keep
/// equivalent elements in insertion order. [`crate::hl`] wraps it into
/// containers that commit to one policy.
///
/// Every lookup and mutation is O(log n). [`Self::len`] is O(1).
pub struct RbTree<T, C = Natural, X = Identity> {
    pub(super) root: Link<T>,
    len: usize,
    compare: C,
    _phantom: PhantomData<(Box<Node<T>>, fn() -> X)>,
}

// Safety: The tree owns its nodes exclusively, i.e., it's like `Box<[T]>`
unsafe impl<T: Send, C: Send, X> Send for RbTree<T, C, X> {}
// Safety: `&RbTree` only gives out `&T` and `&C`
unsafe impl<T: Sync, C: Sync, X> Sync for RbTree<T, C, X> {}

#[cold]
#[track_caller]
fn panic_inverted_range() -> ! {
    panic!("range start is greater than range end");
}

#[cold]
#[track_caller]
fn panic_empty_excluded_range() -> ! {
    panic!("range start and end are equal and excluded");
}

// Comparator-agnostic operations
// ----------------------------------------------------------------------------

impl<T, C: Default, X> RbTree<T, C, X> {
    /// Construct an empty tree.
    #[inline]
    pub fn new() -> Self {
        Self::with_compare(C::default())
    }
}

impl<T, C, X> RbTree<T, C, X> {
    /// Construct an empty tree with the specified comparator.
    #[inline]
    pub const fn with_compare(compare: C) -> Self {
        Self {
            root: None,
            len: 0,
            compare,
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn compare(&self) -> &C {
        &self.compare
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Get a cursor at the first element, or at the end if the tree is empty.
    #[inline]
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(unsafe { RawCursor::begin(&self.root) })
    }

    /// Get a cursor one past the last element.
    #[inline]
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(unsafe { RawCursor::end(&self.root) })
    }

    /// Get a reverse cursor at the last element, or at [`Self::rend`] if the
    /// tree is empty.
    #[inline]
    pub fn rbegin(&self) -> RevCursor<'_, T> {
        Cursor::new(unsafe { RawCursor::last(&self.root) }).rev()
    }

    /// Get a reverse cursor one before the first element.
    #[inline]
    pub fn rend(&self) -> RevCursor<'_, T> {
        Cursor::new(unsafe { RawCursor::before_begin(&self.root) }).rev()
    }

    /// Get a removal-capable cursor at the first element.
    #[inline]
    pub fn begin_mut(&mut self) -> CursorMut<'_, T, C, X> {
        let raw = unsafe { RawCursor::begin(&self.root) };
        CursorMut::new(self, raw)
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    #[inline]
    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }

    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.begin().get()
    }

    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.rbegin().get()
    }

    pub fn pop_first(&mut self) -> Option<T> {
        let node = unsafe { Node::min(self.root?) };
        Some(unsafe { self.remove_node(node) })
    }

    pub fn pop_last(&mut self) -> Option<T> {
        let node = unsafe { Node::max(self.root?) };
        Some(unsafe { self.remove_node(node) })
    }

    /// Remove all elements by repeatedly erasing the first one. Does nothing
    /// if the tree is empty.
    pub fn clear(&mut self) {
        while self.pop_first().is_some() {}
        debug_assert_eq!(self.len, 0);
    }

    /// Retain only the elements for which `keep` returns `true`, visiting
    /// them in order.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let mut cursor = self.begin_mut();
        while let Some(element) = cursor.get() {
            if keep(element) {
                cursor.move_next();
            } else {
                cursor.remove_current();
            }
        }
    }

    /// Append `value` after the last element without consulting the
    /// comparator. The caller must ensure the ordering is maintained.
    fn push_back_unchecked(&mut self, value: T) {
        unsafe {
            let last = self.root.map(|root| Node::max(root));
            self.link_node(last, true, Box::new(Node::new(value)));
        }
    }

    /// # Safety
    ///
    /// `parent` and `side` must designate an empty slot in the current tree
    /// that is consistent with `node.element`'s key.
    pub(crate) unsafe fn link_node(
        &mut self,
        parent: Link<T>,
        side: IsRightChild,
        node: Box<Node<T>>,
    ) -> NonNull<Node<T>> {
        let node = NonNull::from(Box::leak(node));
        unsafe { Node::link(&mut self.root, parent, side, node) };
        self.len += 1;
        node
    }

    /// # Safety
    ///
    /// `node` must be included in this tree.
    #[inline]
    pub(crate) unsafe fn cursor_at(&self, node: NonNull<Node<T>>) -> Cursor<'_, T> {
        Cursor::new(RawCursor::at(node))
    }

    /// Unlink and free `node`, returning its element.
    ///
    /// # Safety
    ///
    /// `node` must be included in this tree.
    pub(super) unsafe fn remove_node(&mut self, node: NonNull<Node<T>>) -> T {
        unsafe {
            Node::erase(&mut self.root, node);
            self.len -= 1;
            Box::from_raw(node.as_ptr()).element
        }
    }

    /// Remove the elements from `first` (inclusive) to `stop` (exclusive,
    /// `None` means the end). Returns the number of removed elements.
    ///
    /// # Safety
    ///
    /// `first` and `stop` must be included in this tree, and `first` must not
    /// come after `stop`.
    unsafe fn remove_span(&mut self, first: Link<T>, stop: Link<T>) -> usize {
        let mut count = 0;
        let mut cursor = first;
        while let Some(node) = cursor {
            if cursor == stop {
                break;
            }
            // Erasure doesn't move elements between nodes, so the successor
            // stays valid
            unsafe {
                cursor = Node::successor(node);
                self.remove_node(node);
            }
            count += 1;
        }
        count
    }
}

// Ordered operations
// ----------------------------------------------------------------------------

impl<T, C: Compare<X::Key>, X: KeyOf<T>> RbTree<T, C, X> {
    #[inline]
    fn lower_bound_link(&self, key: &X::Key) -> Link<T> {
        unsafe { Node::lower_bound(&self.root, |e| self.compare.less(X::key_of(e), key)) }
    }

    #[inline]
    fn upper_bound_link(&self, key: &X::Key) -> Link<T> {
        unsafe { Node::upper_bound(&self.root, |e| self.compare.less(key, X::key_of(e))) }
    }

    #[inline]
    fn find_link(&self, key: &X::Key) -> Link<T> {
        unsafe {
            Node::find(
                &self.root,
                |e| self.compare.less(X::key_of(e), key),
                |e| self.compare.less(key, X::key_of(e)),
            )
        }
    }

    /// Find the place of `key` under the unique-key policy.
    pub(crate) fn search(&self, key: &X::Key) -> Search<T> {
        unsafe {
            Node::search_unique(
                &self.root,
                |e| self.compare.less(X::key_of(e), key),
                |e| self.compare.less(key, X::key_of(e)),
            )
        }
    }

    /// Resolve a range of keys to `(first, stop)` links.
    fn range_links<R: RangeBounds<X::Key>>(&self, range: &R) -> (Link<T>, Link<T>) {
        let (start, end) = (range.start_bound(), range.end_bound());
        match (start, end) {
            (Bound::Excluded(s), Bound::Excluded(e))
                if !self.compare.less(s, e) && !self.compare.less(e, s) =>
            {
                panic_empty_excluded_range()
            }
            (
                Bound::Included(s) | Bound::Excluded(s),
                Bound::Included(e) | Bound::Excluded(e),
            ) if self.compare.less(e, s) => panic_inverted_range(),
            _ => {}
        }

        let first = match start {
            Bound::Included(key) => self.lower_bound_link(key),
            Bound::Excluded(key) => self.upper_bound_link(key),
            Bound::Unbounded => self.root.map(|root| unsafe { Node::min(root) }),
        };
        let stop = match end {
            Bound::Included(key) => self.upper_bound_link(key),
            Bound::Excluded(key) => self.lower_bound_link(key),
            Bound::Unbounded => None,
        };
        (first, stop)
    }

    /// Insert `value` unless an element with an equivalent key exists.
    ///
    /// Returns a cursor at the inserted element and `true`, or a cursor at
    /// the existing element and `false`. In the latter case, `value` is
    /// dropped.
    pub fn insert_unique(&mut self, value: T) -> (Cursor<'_, T>, bool) {
        match self.search(X::key_of(&value)) {
            Search::Found(node) => (Cursor::new(RawCursor::at(node)), false),
            Search::Vacant { parent, side } => {
                let node = unsafe { self.link_node(parent, side, Box::new(Node::new(value))) };
                (Cursor::new(RawCursor::at(node)), true)
            }
        }
    }

    /// Construct an element directly inside a new node and insert it unless
    /// an element with an equivalent key exists. On a conflict, the node and
    /// the element are dropped. See [`Self::insert_unique`].
    pub fn emplace_unique(&mut self, make: impl FnOnce() -> T) -> (Cursor<'_, T>, bool) {
        let node = Box::new(Node::new(make()));
        match self.search(X::key_of(&node.element)) {
            Search::Found(existing) => (Cursor::new(RawCursor::at(existing)), false),
            Search::Vacant { parent, side } => {
                let node = unsafe { self.link_node(parent, side, node) };
                (Cursor::new(RawCursor::at(node)), true)
            }
        }
    }

    /// Insert `value` after every element with an equivalent key.
    pub fn insert_multi(&mut self, value: T) -> Cursor<'_, T> {
        self.emplace_multi(|| value)
    }

    /// Construct an element directly inside a new node and insert it after
    /// every element with an equivalent key.
    pub fn emplace_multi(&mut self, make: impl FnOnce() -> T) -> Cursor<'_, T> {
        let node = Box::new(Node::new(make()));
        let (parent, side) = unsafe {
            let key = X::key_of(&node.element);
            Node::search_multi(&self.root, |e| self.compare.less(key, X::key_of(e)))
        };
        let node = unsafe { self.link_node(parent, side, node) };
        Cursor::new(RawCursor::at(node))
    }

    /// Find an element with a key equivalent to `key`. Returns the end cursor
    /// if there's none. Under the multi-key policy, any of the equivalent
    /// elements may be returned; use [`Self::lower_bound`] to get the first.
    pub fn find(&self, key: &X::Key) -> Cursor<'_, T> {
        let link = self.find_link(key);
        Cursor::new(unsafe { RawCursor::at_or_end(link, &self.root) })
    }

    /// Like [`Self::find`], but the returned cursor can remove the element.
    pub fn find_mut(&mut self, key: &X::Key) -> CursorMut<'_, T, C, X> {
        let raw = self.find(key).raw();
        CursorMut::new(self, raw)
    }

    #[inline]
    pub fn get(&self, key: &X::Key) -> Option<&T> {
        self.find(key).get()
    }

    #[inline]
    pub fn contains(&self, key: &X::Key) -> bool {
        self.find_link(key).is_some()
    }

    /// Get a cursor at the first element whose key is not ordered before
    /// `key`.
    pub fn lower_bound(&self, key: &X::Key) -> Cursor<'_, T> {
        Cursor::new(unsafe { RawCursor::at_or_end(self.lower_bound_link(key), &self.root) })
    }

    /// Get a cursor at the first element whose key is ordered after `key`.
    pub fn upper_bound(&self, key: &X::Key) -> Cursor<'_, T> {
        Cursor::new(unsafe { RawCursor::at_or_end(self.upper_bound_link(key), &self.root) })
    }

    /// Like [`Self::lower_bound`], but the returned cursor can remove
    /// elements.
    pub fn lower_bound_mut(&mut self, key: &X::Key) -> CursorMut<'_, T, C, X> {
        let raw = self.lower_bound(key).raw();
        CursorMut::new(self, raw)
    }

    /// Get `(lower_bound(key), upper_bound(key))`, which delimit the elements
    /// equivalent to `key`.
    pub fn equal_range(&self, key: &X::Key) -> (Cursor<'_, T>, Cursor<'_, T>) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Iterate over the elements equivalent to `key`.
    pub fn equal_iter(&self, key: &X::Key) -> Range<'_, T> {
        unsafe { Range::new(self, self.lower_bound_link(key), self.upper_bound_link(key)) }
    }

    /// Count the elements equivalent to `key`.
    pub fn count_multi(&self, key: &X::Key) -> usize {
        self.equal_iter(key).count()
    }

    /// Iterate over the elements whose keys fall in `range`.
    ///
    /// # Panics
    ///
    /// Panics if the start of `range` is ordered after its end, or if both
    /// ends are excluded and equivalent.
    pub fn range<R: RangeBounds<X::Key>>(&self, range: R) -> Range<'_, T> {
        let (first, stop) = self.range_links(&range);
        unsafe { Range::new(self, first, stop) }
    }

    /// Remove the element equivalent to `key` and return it.
    pub fn remove_unique(&mut self, key: &X::Key) -> Option<T> {
        match self.search(key) {
            Search::Found(node) => Some(unsafe { self.remove_node(node) }),
            Search::Vacant { .. } => None,
        }
    }

    /// Remove the element equivalent to `key`. Returns the number of removed
    /// elements (0 or 1).
    pub fn erase_unique(&mut self, key: &X::Key) -> usize {
        self.remove_unique(key).is_some() as usize
    }

    /// Remove every element equivalent to `key`. Returns the number of
    /// removed elements.
    pub fn erase_multi(&mut self, key: &X::Key) -> usize {
        let (first, stop) = (self.lower_bound_link(key), self.upper_bound_link(key));
        unsafe { self.remove_span(first, stop) }
    }

    /// Remove the elements whose keys fall in `range`. Returns the number of
    /// removed elements.
    ///
    /// # Panics
    ///
    /// See [`Self::range`].
    pub fn erase_range<R: RangeBounds<X::Key>>(&mut self, range: R) -> usize {
        let (first, stop) = self.range_links(&range);
        unsafe { self.remove_span(first, stop) }
    }

    /// Replace the contents with the elements of `iter`, keeping every one of
    /// them (multi-key policy).
    pub fn assign_multi(&mut self, iter: impl IntoIterator<Item = T>) {
        self.clear();
        for value in iter {
            self.insert_multi(value);
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_valid(&self)
    where
        T: fmt::Debug,
    {
        let len = unsafe {
            Node::validate(&self.root, |a, b| {
                self.compare.less(X::key_of(a), X::key_of(b))
            })
        };
        assert_eq!(len, self.len, "element count mismatch");
    }
}

// Trait implementations
// ----------------------------------------------------------------------------

impl<T, C, X> Drop for RbTree<T, C, X> {
    fn drop(&mut self) {
        // Safety: Every node was allocated by `link_node`
        unsafe { Node::destroy_all(&mut self.root) };
    }
}

impl<T, C: Default, X> Default for RbTree<T, C, X> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C: Clone, X> Clone for RbTree<T, C, X> {
    /// Deep-clone the tree by re-inserting every element in order.
    fn clone(&self) -> Self {
        let mut tree = Self::with_compare(self.compare.clone());
        for element in self.iter() {
            tree.push_back_unchecked(element.clone());
        }
        tree
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.compare = source.compare.clone();
        for element in source.iter() {
            self.push_back_unchecked(element.clone());
        }
    }
}

impl<T: fmt::Debug, C, X> fmt::Debug for RbTree<T, C, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, C, X> IntoIterator for &'a RbTree<T, C, X> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C, X> IntoIterator for RbTree<T, C, X> {
    type Item = T;
    type IntoIter = IntoIter<T, C, X>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
