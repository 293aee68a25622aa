use core::{fmt, marker::PhantomData, ptr::NonNull};

use super::RbTree;
use crate::utils::rbtree::{Link, Node};

/// The traversal state of a cursor.
///
/// The off-the-edge states still remember the element at that edge, so
/// stepping back from [`Position::AfterEnd`] lands on the last element and
/// stepping forward from [`Position::BeforeBegin`] lands on the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// At an element.
    Normal,
    /// One before the first element.
    BeforeBegin,
    /// One past the last element.
    AfterEnd,
}

/// The state machine shared by all cursor types.
pub(super) struct RawCursor<T> {
    node: Link<T>,
    position: Position,
}

impl<T> Clone for RawCursor<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RawCursor<T> {}

impl<T> PartialEq for RawCursor<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.node == other.node
    }
}

impl<T> Eq for RawCursor<T> {}

impl<T> RawCursor<T> {
    #[inline]
    pub(super) fn at(node: NonNull<Node<T>>) -> Self {
        Self {
            node: Some(node),
            position: Position::Normal,
        }
    }

    /// # Safety
    ///
    /// `tree` must be the root slot of a well-formed tree.
    pub(super) unsafe fn begin(tree: &Link<T>) -> Self {
        match *tree {
            Some(root) => Self::at(unsafe { Node::min(root) }),
            None => unsafe { Self::end(tree) },
        }
    }

    /// # Safety
    ///
    /// See [`Self::begin`].
    pub(super) unsafe fn end(tree: &Link<T>) -> Self {
        Self {
            node: tree.map(|root| unsafe { Node::max(root) }),
            position: Position::AfterEnd,
        }
    }

    /// # Safety
    ///
    /// See [`Self::begin`].
    pub(super) unsafe fn before_begin(tree: &Link<T>) -> Self {
        Self {
            node: tree.map(|root| unsafe { Node::min(root) }),
            position: Position::BeforeBegin,
        }
    }

    /// # Safety
    ///
    /// See [`Self::begin`].
    pub(super) unsafe fn last(tree: &Link<T>) -> Self {
        match *tree {
            Some(root) => Self::at(unsafe { Node::max(root) }),
            None => unsafe { Self::before_begin(tree) },
        }
    }

    /// At `link`, or at the end if `link` is nil.
    ///
    /// # Safety
    ///
    /// See [`Self::begin`].
    pub(super) unsafe fn at_or_end(link: Link<T>, tree: &Link<T>) -> Self {
        match link {
            Some(node) => Self::at(node),
            None => unsafe { Self::end(tree) },
        }
    }

    #[inline]
    pub(super) fn current(&self) -> Link<T> {
        match self.position {
            Position::Normal => self.node,
            Position::BeforeBegin | Position::AfterEnd => None,
        }
    }

    /// # Safety
    ///
    /// The remembered node must still be in its tree.
    unsafe fn move_next(&mut self) {
        let Some(node) = self.node else {
            // Empty tree
            return;
        };
        match self.position {
            Position::AfterEnd => {}
            Position::BeforeBegin => self.position = Position::Normal,
            Position::Normal => match unsafe { Node::successor(node) } {
                Some(next) => self.node = Some(next),
                None => self.position = Position::AfterEnd,
            },
        }
    }

    /// # Safety
    ///
    /// See [`Self::move_next`].
    unsafe fn move_prev(&mut self) {
        let Some(node) = self.node else {
            return;
        };
        match self.position {
            Position::BeforeBegin => {}
            Position::AfterEnd => self.position = Position::Normal,
            Position::Normal => match unsafe { Node::predecessor(node) } {
                Some(prev) => self.node = Some(prev),
                None => self.position = Position::BeforeBegin,
            },
        }
    }
}

// Shared cursor
// ----------------------------------------------------------------------------

/// A bidirectional position in an [`RbTree`] that borrows the tree immutably.
///
/// Moving past either end saturates: [`Self::move_next`] at
/// [`Position::AfterEnd`] and [`Self::move_prev`] at [`Position::BeforeBegin`]
/// do nothing.
pub struct Cursor<'a, T> {
    raw: RawCursor<T>,
    _phantom: PhantomData<&'a T>,
}

// Safety: `Cursor` is a `&'a T` with extra steps
unsafe impl<T: Sync> Send for Cursor<'_, T> {}
unsafe impl<T: Sync> Sync for Cursor<'_, T> {}

impl<T> Clone for Cursor<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    /// Two cursors are equal if they are in the same state at the same node.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.raw.position)
            .field("element", &self.get())
            .finish()
    }
}

impl<'a, T> Cursor<'a, T> {
    #[inline]
    pub(super) fn new(raw: RawCursor<T>) -> Self {
        Self {
            raw,
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub(super) fn raw(&self) -> RawCursor<T> {
        self.raw
    }

    /// Get the element at the cursor. Returns `None` if the cursor is off
    /// either end.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        // Safety: The tree is borrowed for `'a`
        self.raw
            .current()
            .map(|node| unsafe { &(*node.as_ptr()).element })
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.raw.position
    }

    /// Return `true` if the cursor is one past the last element.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.raw.position == Position::AfterEnd
    }

    #[inline]
    pub fn move_next(&mut self) {
        // Safety: The tree is borrowed for `'a`
        unsafe { self.raw.move_next() }
    }

    #[inline]
    pub fn move_prev(&mut self) {
        // Safety: The tree is borrowed for `'a`
        unsafe { self.raw.move_prev() }
    }

    /// Get the element after the cursor without moving it.
    pub fn peek_next(&self) -> Option<&'a T> {
        let mut next = *self;
        next.move_next();
        next.get()
    }

    /// Get the element before the cursor without moving it.
    pub fn peek_prev(&self) -> Option<&'a T> {
        let mut prev = *self;
        prev.move_prev();
        prev.get()
    }

    /// Convert to a cursor that walks in the opposite direction, starting at
    /// the same position.
    #[inline]
    pub fn rev(self) -> RevCursor<'a, T> {
        RevCursor(self)
    }
}

/// A [`Cursor`] with the directions swapped.
///
/// `rbegin` is the last element and `rend` is [`Position::BeforeBegin`].
pub struct RevCursor<'a, T>(Cursor<'a, T>);

impl<T> Clone for RevCursor<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RevCursor<'_, T> {}

impl<T> PartialEq for RevCursor<'_, T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for RevCursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for RevCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RevCursor").field(&self.0).finish()
    }
}

impl<'a, T> RevCursor<'a, T> {
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.0.get()
    }

    /// The position in terms of the underlying forward cursor.
    #[inline]
    pub fn position(&self) -> Position {
        self.0.position()
    }

    /// Return `true` if the cursor is one before the first element (i.e.,
    /// one past the last element in the reversed sequence).
    #[inline]
    pub fn is_end(&self) -> bool {
        self.0.position() == Position::BeforeBegin
    }

    #[inline]
    pub fn move_next(&mut self) {
        self.0.move_prev()
    }

    #[inline]
    pub fn move_prev(&mut self) {
        self.0.move_next()
    }

    #[inline]
    pub fn base(self) -> Cursor<'a, T> {
        self.0
    }
}

// Exclusive cursor
// ----------------------------------------------------------------------------

/// A bidirectional position in an [`RbTree`] that can remove elements.
pub struct CursorMut<'a, T, C, X> {
    tree: &'a mut RbTree<T, C, X>,
    raw: RawCursor<T>,
}

impl<T: fmt::Debug, C, X> fmt::Debug for CursorMut<'_, T, C, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("position", &self.raw.position)
            .field("element", &self.get())
            .finish()
    }
}

impl<'a, T, C, X> CursorMut<'a, T, C, X> {
    #[inline]
    pub(super) fn new(tree: &'a mut RbTree<T, C, X>, raw: RawCursor<T>) -> Self {
        Self { tree, raw }
    }

    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.raw
            .current()
            .map(|node| unsafe { &(*node.as_ptr()).element })
    }

    /// Get the element mutably. Changing the ordering key is a logic error,
    /// hence crate-private.
    #[inline]
    pub(crate) fn get_mut(&mut self) -> Option<&mut T> {
        self.raw
            .current()
            .map(|node| unsafe { &mut (*node.as_ptr()).element })
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.raw.position
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.raw.position == Position::AfterEnd
    }

    #[inline]
    pub fn move_next(&mut self) {
        // Safety: The tree is mutably borrowed by us
        unsafe { self.raw.move_next() }
    }

    #[inline]
    pub fn move_prev(&mut self) {
        // Safety: The tree is mutably borrowed by us
        unsafe { self.raw.move_prev() }
    }

    /// Borrow as a shared cursor at the same position.
    #[inline]
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self.raw)
    }

    #[inline]
    pub fn into_cursor(self) -> Cursor<'a, T> {
        Cursor::new(self.raw)
    }

    /// Remove the element at the cursor and move to the following element.
    ///
    /// If the removed element was the last one, the cursor ends up at the end
    /// of the remaining elements. Does nothing and returns `None` if the
    /// cursor is off either end.
    pub fn remove_current(&mut self) -> Option<T> {
        let node = self.raw.current()?;
        // Safety: `node` is included in `self.tree`. Removing it doesn't
        // invalidate other nodes, so `next` stays valid.
        unsafe {
            let next = Node::successor(node);
            let element = self.tree.remove_node(node);
            self.raw = RawCursor::at_or_end(next, &self.tree.root);
            Some(element)
        }
    }
}
