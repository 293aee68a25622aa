//! Intrusive [red-black][1] [tree][2] primitives
//!
//! [1]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
//! [2]: https://en.wikipedia.org/wiki/Binary_search_tree
//!
//! The functions here only rewire links. Allocating and freeing nodes is the
//! caller's job (see [`crate::tree::RbTree`]). A node finds its incoming slot
//! by checking which of its parent's children it is, so the tree handle can be
//! moved freely.
//!
//! # Safety
//!
//! Every function here takes raw links and trusts them. Unless stated
//! otherwise, a `tree` argument must be the root slot of a well-formed tree,
//! and every node reachable from it is borrowed (mutably, for the functions
//! that take `&mut Link<T>`) until the function returns.
//!
//! The structural functions never call user code. The search functions call
//! the provided closures only while the tree is in a consistent state, so a
//! panicking comparator leaves the tree intact.
#![allow(unsafe_op_in_unsafe_fn)]
use core::ptr::NonNull;

cfg_if::cfg_if! {
    if #[cfg(debug_assertions)] {
        #[track_caller]
        fn unreachable_unchecked() -> ! {
            unreachable!();
        }
    } else {
        use core::hint::unreachable_unchecked;
    }
}

/// A node.
pub struct Node<T> {
    children: [Link<T>; 2],
    parent: Link<T>,
    color: Color,
    pub element: T,
}

/// A nullable reference to a node. Also used as the root slot of a tree.
pub type Link<T> = Option<NonNull<Node<T>>>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Color {
    Black,
    Red,
}

pub type IsRightChild = bool;

/// The outcome of looking for the place of a unique key.
pub enum Search<T> {
    /// An equivalent element already exists.
    Found(NonNull<Node<T>>),
    /// The key belongs in the empty `side` slot of `parent` (or in the root
    /// slot if `parent` is `None`).
    Vacant {
        parent: Link<T>,
        side: IsRightChild,
    },
}

impl<T> Node<T> {
    pub const fn new(element: T) -> Self {
        Self {
            children: [None, None],
            parent: None,
            color: Color::Red,
            element,
        }
    }

    /// A nil link counts as black.
    #[inline]
    unsafe fn is_red(link: Link<T>) -> bool {
        match link {
            Some(node) => node.as_ref().color == Color::Red,
            None => false,
        }
    }

    #[inline]
    unsafe fn side_of(parent: NonNull<Self>, node: NonNull<Self>) -> IsRightChild {
        debug_assert!(parent.as_ref().children.contains(&Some(node)));
        parent.as_ref().children[1] == Some(node)
    }

    /// Get the link that currently points at `node`: one of the parent's
    /// children, or `tree` itself if `node` is the root.
    #[inline]
    unsafe fn incoming_slot<'a>(tree: &'a mut Link<T>, node: NonNull<Self>) -> &'a mut Link<T> {
        let slot = if let Some(mut parent) = node.as_ref().parent {
            let side = Self::side_of(parent, node);
            &mut parent.as_mut().children[side as usize]
        } else {
            tree
        };
        debug_assert_eq!(*slot, Some(node));
        slot
    }

    /// Find the place where an element equivalent to a key would go, or the
    /// element itself if one exists.
    ///
    /// `is_before(e)` must return `true` iff `e` is ordered before the key.
    /// `is_after(e)` must return `true` iff `e` is ordered after the key.
    ///
    /// # Safety
    ///
    /// See the [module-level documentation](self).
    pub unsafe fn search_unique(
        tree: &Link<T>,
        mut is_before: impl FnMut(&T) -> bool,
        mut is_after: impl FnMut(&T) -> bool,
    ) -> Search<T> {
        let mut parent = None;
        let mut side = false;
        let mut cursor = *tree;
        while let Some(node) = cursor {
            let element = &node.as_ref().element;
            side = if is_after(element) {
                false
            } else if is_before(element) {
                true
            } else {
                return Search::Found(node);
            };
            parent = Some(node);
            cursor = node.as_ref().children[side as usize];
        }
        Search::Vacant { parent, side }
    }

    /// Find the place for a new element, after every equivalent element.
    ///
    /// `is_after(e)` must return `true` iff `e` is ordered after the new
    /// element.
    ///
    /// # Safety
    ///
    /// See [`Self::search_unique`].
    pub unsafe fn search_multi(
        tree: &Link<T>,
        mut is_after: impl FnMut(&T) -> bool,
    ) -> (Link<T>, IsRightChild) {
        let mut parent = None;
        let mut side = false;
        let mut cursor = *tree;
        while let Some(node) = cursor {
            // Equivalent elements send us right, which keeps duplicates in
            // insertion order
            side = !is_after(&node.as_ref().element);
            parent = Some(node);
            cursor = node.as_ref().children[side as usize];
        }
        (parent, side)
    }

    /// Attach `new_node` as a red leaf at the location returned by
    /// [`Self::search_unique`] or [`Self::search_multi`] and restore the
    /// red-black invariants.
    ///
    /// # Safety
    ///
    /// `new_node` must be detached. `parent` and `side` must designate an
    /// empty slot of the tree in its current shape.
    pub unsafe fn link(
        tree: &mut Link<T>,
        parent: Link<T>,
        side: IsRightChild,
        mut new_node: NonNull<Self>,
    ) {
        {
            let new_node = new_node.as_mut();
            new_node.children = [None, None];
            new_node.parent = parent;
            new_node.color = Color::Red;
        }

        let slot = if let Some(mut parent) = parent {
            &mut parent.as_mut().children[side as usize]
        } else {
            &mut *tree
        };
        debug_assert!(slot.is_none());
        *slot = Some(new_node);

        Self::fix_violation(tree, new_node);
    }

    /// Restore the invariants after a red node `node` was attached.
    unsafe fn fix_violation(tree: &mut Link<T>, mut node: NonNull<Self>) {
        loop {
            let Some(mut parent) = node.as_ref().parent else {
                // `node` is the root
                node.as_mut().color = Color::Black;
                return;
            };

            // No red-red edge left?
            if !Self::is_red(Some(node)) || !Self::is_red(Some(parent)) {
                return;
            }

            // The root is black, so a red `parent` has a parent
            let Some(mut grandparent) = parent.as_ref().parent else {
                unreachable_unchecked()
            };
            debug_assert_eq!(grandparent.as_ref().color, Color::Black);

            let parent_side = Self::side_of(grandparent, parent);
            let node_side = Self::side_of(parent, node);
            let uncle = grandparent.as_ref().children[(!parent_side) as usize];

            match uncle {
                Some(mut uncle) if uncle.as_ref().color == Color::Red => {
                    // Push the blackness of `grandparent` down. The conflict
                    // may move up to `grandparent`.
                    parent.as_mut().color = Color::Black;
                    uncle.as_mut().color = Color::Black;
                    grandparent.as_mut().color = Color::Red;
                    node = grandparent;
                }
                _ if node_side == parent_side => {
                    //            grandparent          parent
                    //            /  \                 /  \
                    //       parent  uncle   ==>    node  grandparent
                    //        /                              \
                    //     node                              uncle
                    Self::rotate(tree, grandparent, !node_side);
                    parent.as_mut().color = Color::Black;
                    grandparent.as_mut().color = Color::Red;
                    node = grandparent;
                }
                _ => {
                    // Zig-zag. Turn it into the case above.
                    Self::rotate(tree, parent, !node_side);
                    node = parent;
                }
            }
        }
    }

    /// Remove `node` from a tree. `node`'s links are reset, and it can be
    /// freed or linked again afterwards.
    ///
    /// # Safety
    ///
    /// `node` must be included in the tree.
    pub unsafe fn erase(tree: &mut Link<T>, mut node: NonNull<Self>) {
        let [left, right] = node.as_ref().children;
        let removed_color;
        // Where the missing blackness ends up: a (possibly nil) link, its
        // parent, and which side of the parent it is on
        let (fix_node, fix_parent, fix_side): (Link<T>, Link<T>, IsRightChild);

        match (left, right) {
            (None, child) | (child, None) => {
                removed_color = node.as_ref().color;
                fix_parent = node.as_ref().parent;
                fix_side = match fix_parent {
                    Some(parent) => Self::side_of(parent, node),
                    None => false,
                };
                Self::transplant(tree, node, child);
                fix_node = child;
            }
            (Some(mut left), Some(mut right)) => {
                // Replace `node` with its in-order successor
                let mut successor = Self::min(right);
                removed_color = successor.as_ref().color;
                let successor_right = successor.as_ref().children[1];

                if successor.as_ref().parent == Some(node) {
                    fix_parent = Some(successor);
                    fix_side = true;
                } else {
                    //        node                  successor
                    //        /  \                  /  \
                    //      ...  right      ==>   ...  right
                    //           /                     /
                    //         ...                   ...
                    //         /                     /
                    //   successor               successor_right
                    //         \
                    //    successor_right
                    fix_parent = successor.as_ref().parent;
                    fix_side = false;
                    Self::transplant(tree, successor, successor_right);
                    successor.as_mut().children[1] = Some(right);
                    right.as_mut().parent = Some(successor);
                }

                Self::transplant(tree, node, Some(successor));
                successor.as_mut().children[0] = Some(left);
                left.as_mut().parent = Some(successor);
                successor.as_mut().color = node.as_ref().color;
                fix_node = successor_right;
            }
        }

        node.as_mut().children = [None, None];
        node.as_mut().parent = None;

        if removed_color == Color::Black {
            Self::delete_fixup(tree, fix_node, fix_parent, fix_side);
        }
    }

    /// Redirect `node`'s incoming slot to `replacement`. `replacement`'s
    /// children are left untouched.
    unsafe fn transplant(tree: &mut Link<T>, node: NonNull<Self>, replacement: Link<T>) {
        *Self::incoming_slot(tree, node) = replacement;
        if let Some(mut replacement) = replacement {
            replacement.as_mut().parent = node.as_ref().parent;
        }
    }

    /// Restore the black height after a black node was spliced out. `node`
    /// is carrying an extra black. It's nil if the spliced-in child was
    /// nil, in which case `parent` and `side` locate it.
    unsafe fn delete_fixup(
        tree: &mut Link<T>,
        mut node: Link<T>,
        mut parent: Link<T>,
        mut side: IsRightChild,
    ) {
        while !Self::is_red(node) {
            let Some(mut parent_node) = parent else {
                // Reached the root; the extra black can be dropped
                break;
            };
            debug_assert_eq!(parent_node.as_ref().children[side as usize], node);

            // `node`'s side is one black short, so the sibling's side holds at
            // least one black node
            let Some(mut sibling) = parent_node.as_ref().children[(!side) as usize] else {
                unreachable_unchecked()
            };

            if sibling.as_ref().color == Color::Red {
                // Make the sibling black by rotating a red parent down towards
                // `node`
                sibling.as_mut().color = Color::Black;
                parent_node.as_mut().color = Color::Red;
                Self::rotate(tree, parent_node, side);
                let Some(new_sibling) = parent_node.as_ref().children[(!side) as usize] else {
                    unreachable_unchecked()
                };
                sibling = new_sibling;
            }

            let close_nephew = sibling.as_ref().children[side as usize];
            let distant_nephew = sibling.as_ref().children[(!side) as usize];

            if !Self::is_red(close_nephew) && !Self::is_red(distant_nephew) {
                // Take one black from both sides and move the problem up
                sibling.as_mut().color = Color::Red;
                node = Some(parent_node);
                parent = parent_node.as_ref().parent;
                if let Some(grandparent) = parent {
                    side = Self::side_of(grandparent, parent_node);
                }
                continue;
            }

            if !Self::is_red(distant_nephew) {
                // Move the red close nephew to the sibling's position
                let Some(mut close_nephew) = close_nephew else {
                    unreachable_unchecked()
                };
                close_nephew.as_mut().color = Color::Black;
                sibling.as_mut().color = Color::Red;
                Self::rotate(tree, sibling, !side);
                sibling = close_nephew;
            }

            // The distant nephew is red. Rotating the parent towards `node`
            // adds a black node to `node`'s paths.
            sibling.as_mut().color = parent_node.as_ref().color;
            parent_node.as_mut().color = Color::Black;
            if let Some(mut distant_nephew) = sibling.as_ref().children[(!side) as usize] {
                distant_nephew.as_mut().color = Color::Black;
            }
            Self::rotate(tree, parent_node, side);
            node = *tree;
            break;
        }

        if let Some(mut node) = node {
            node.as_mut().color = Color::Black;
        }
    }

    /// Move `node` down to its `dir` side, lifting its other child into its
    /// place.
    unsafe fn rotate(tree: &mut Link<T>, mut node: NonNull<Self>, dir: IsRightChild) {
        let idir = (!dir) as usize;
        let dir = dir as usize;

        // With `dir == true` (right rotation):
        //
        //        node              pivot
        //       /    \            /    \
        //    pivot    c    ==>    a     node
        //    /   \                     /    \
        //   a    mid                 mid     c
        let Some(mut pivot) = node.as_ref().children[idir] else {
            unreachable_unchecked()
        };
        let mid = pivot.as_ref().children[dir];

        // `incoming_slot` reads `node.parent`, so this goes first
        *Self::incoming_slot(tree, node) = Some(pivot);

        pivot.as_mut().parent = node.as_ref().parent;
        pivot.as_mut().children[dir] = Some(node);
        node.as_mut().parent = Some(pivot);
        node.as_mut().children[idir] = mid;
        if let Some(mut mid) = mid {
            mid.as_mut().parent = Some(node);
        }
    }

    /// Rotate `node` down to the left. `node`'s right child must exist.
    ///
    /// # Safety
    ///
    /// See [`Self::erase`].
    #[inline]
    pub unsafe fn rotate_left(tree: &mut Link<T>, node: NonNull<Self>) {
        Self::rotate(tree, node, false)
    }

    /// Rotate `node` down to the right. `node`'s left child must exist.
    ///
    /// # Safety
    ///
    /// See [`Self::erase`].
    #[inline]
    pub unsafe fn rotate_right(tree: &mut Link<T>, node: NonNull<Self>) {
        Self::rotate(tree, node, true)
    }

    /// Get the leftmost node of the subtree under `this`.
    ///
    /// # Safety
    ///
    /// `this` must be a node of a well-formed tree.
    #[inline]
    pub unsafe fn min(mut this: NonNull<Self>) -> NonNull<Self> {
        while let Some(child) = this.as_ref().children[0] {
            this = child;
        }
        this
    }

    /// Get the rightmost node of the subtree under `this`.
    ///
    /// # Safety
    ///
    /// See [`Self::min`].
    #[inline]
    pub unsafe fn max(mut this: NonNull<Self>) -> NonNull<Self> {
        while let Some(child) = this.as_ref().children[1] {
            this = child;
        }
        this
    }

    /// Get the node preceding `this` in order.
    ///
    /// # Safety
    ///
    /// See [`Self::min`].
    #[inline]
    pub unsafe fn predecessor(this: NonNull<Self>) -> Link<T> {
        Self::neighbor(this, false)
    }

    /// Get the node following `this` in order.
    ///
    /// # Safety
    ///
    /// See [`Self::min`].
    #[inline]
    pub unsafe fn successor(this: NonNull<Self>) -> Link<T> {
        Self::neighbor(this, true)
    }

    unsafe fn neighbor(mut node: NonNull<Self>, dir: IsRightChild) -> Link<T> {
        if let Some(child) = node.as_ref().children[dir as usize] {
            let mut child = child;
            while let Some(grandchild) = child.as_ref().children[(!dir) as usize] {
                child = grandchild;
            }
            return Some(child);
        }

        // Ascend until we come from the other side
        while let Some(parent) = node.as_ref().parent {
            if parent.as_ref().children[(!dir) as usize] == Some(node) {
                return Some(parent);
            }
            node = parent;
        }

        None
    }

    /// Find an element that is neither before nor after a key. See
    /// [`Self::search_unique`] for the meaning of the closures.
    ///
    /// # Safety
    ///
    /// See [`Self::min`].
    pub unsafe fn find(
        tree: &Link<T>,
        is_before: impl FnMut(&T) -> bool,
        is_after: impl FnMut(&T) -> bool,
    ) -> Link<T> {
        match Self::search_unique(tree, is_before, is_after) {
            Search::Found(node) => Some(node),
            Search::Vacant { .. } => None,
        }
    }

    /// Find the minimum element `e` such that `is_before(e)` is `false`.
    ///
    /// `is_before` must be monotonic: `true` for a (possibly empty) prefix
    /// of the in-order sequence and `false` for the rest.
    ///
    /// # Safety
    ///
    /// See [`Self::min`].
    pub unsafe fn lower_bound(tree: &Link<T>, mut is_before: impl FnMut(&T) -> bool) -> Link<T> {
        let mut best = None;
        let mut cursor = *tree;
        while let Some(node) = cursor {
            if is_before(&node.as_ref().element) {
                cursor = node.as_ref().children[1];
            } else {
                best = Some(node);
                cursor = node.as_ref().children[0];
            }
        }
        best
    }

    /// Find the minimum element `e` such that `is_after(e)` is `true`.
    ///
    /// `is_after` must be monotonic: `false` for a (possibly empty) prefix
    /// of the in-order sequence and `true` for the rest.
    ///
    /// # Safety
    ///
    /// See [`Self::min`].
    pub unsafe fn upper_bound(tree: &Link<T>, mut is_after: impl FnMut(&T) -> bool) -> Link<T> {
        Self::lower_bound(tree, |element| !is_after(element))
    }

    /// Unlink and free every node in the tree without rebalancing, in
    /// O(n) time and O(1) space.
    ///
    /// # Safety
    ///
    /// Every node must have been allocated by `Box`.
    pub unsafe fn destroy_all(tree: &mut Link<T>) {
        let mut cursor = tree.take();
        while let Some(mut node) = cursor {
            if let Some(mut left) = node.as_ref().children[0] {
                // Rotate the left child up so that the tree degenerates into
                // a right-leaning list
                node.as_mut().children[0] = left.as_ref().children[1];
                left.as_mut().children[1] = Some(node);
                cursor = Some(left);
            } else {
                cursor = node.as_ref().children[1];
                drop(alloc::boxed::Box::from_raw(node.as_ptr()));
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use std::{
        collections::{BTreeMap, HashSet},
        prelude::v1::*,
    };

    impl<T: std::fmt::Debug> Node<T> {
        unsafe fn walk(
            first: Link<T>,
            step: unsafe fn(NonNull<Self>) -> Link<T>,
        ) -> impl Iterator<Item = NonNull<Self>> {
            let mut next = first;
            std::iter::from_fn(move || {
                let node = next?;
                next = step(node);
                Some(node)
            })
        }

        pub(crate) unsafe fn iter(tree: Link<T>) -> impl Iterator<Item = NonNull<Self>> {
            Self::walk(tree.map(|root| Self::min(root)), Self::successor)
        }

        pub(crate) unsafe fn iter_rev(tree: Link<T>) -> impl Iterator<Item = NonNull<Self>> {
            Self::walk(tree.map(|root| Self::max(root)), Self::predecessor)
        }

        /// Render the tree as an S-expression such as `(B 2 (R 1 . .) .)`.
        pub(crate) unsafe fn dump(link: Link<T>, out: &mut impl std::fmt::Write) -> std::fmt::Result {
            let Some(node) = link else {
                return out.write_str(".");
            };
            let node = node.as_ref();
            let tag = if node.color == Color::Red { 'R' } else { 'B' };
            write!(out, "({} {:?} ", tag, node.element)?;
            Self::dump(node.children[0], out)?;
            out.write_char(' ')?;
            Self::dump(node.children[1], out)?;
            out.write_char(')')
        }

        /// Check the red-black invariants, the link consistency, and the
        /// ordering of the elements (`less` must be a strict weak order).
        /// Returns the number of nodes.
        pub(crate) unsafe fn validate(
            tree: &Link<T>,
            mut less: impl FnMut(&T, &T) -> bool,
        ) -> usize {
            let Some(root) = *tree else { return 0 };
            assert_eq!(root.as_ref().parent, None, "the root has a parent");
            assert_eq!(root.as_ref().color, Color::Black, "the root must be black");

            let mut visited = HashSet::new();
            Self::validate_node(root, &mut visited);

            // The in-order sequence must be sorted
            let elements: Vec<_> = Self::iter(*tree).collect();
            for pair in elements.windows(2) {
                let (prev, next) = (&pair[0].as_ref().element, &pair[1].as_ref().element);
                assert!(
                    !less(next, prev),
                    "elements out of order: {:?} precedes {:?}",
                    prev,
                    next
                );
            }
            assert_eq!(elements.len(), visited.len());

            elements.len()
        }

        /// Returns the black height of the subtree.
        unsafe fn validate_node(p_node: NonNull<Self>, visited: &mut HashSet<NonNull<Self>>) -> usize {
            let node = p_node.as_ref();

            // The tree must not be circular
            assert!(visited.insert(p_node), "tree is circular at {:?}", p_node);

            let mut heights = [0; 2];
            for (height, &child) in heights.iter_mut().zip(node.children.iter()) {
                if let Some(child) = child {
                    assert_eq!(
                        child.as_ref().parent,
                        Some(p_node),
                        "{:?}'s child {:?} has a wrong parent link",
                        p_node,
                        child
                    );
                    if node.color == Color::Red {
                        assert_eq!(
                            child.as_ref().color,
                            Color::Black,
                            "a red node must not have a red child",
                        );
                    }
                    *height = Self::validate_node(child, visited);
                }
            }

            assert_eq!(
                heights[0], heights[1],
                "black height mismatch under {:?}: {:?}",
                node.element, heights
            );

            heights[0] + (node.color == Color::Black) as usize
        }
    }

    /// `.1` is a serial number; only `.0` takes part in the comparison.
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    struct TestElement(u8, usize);

    fn less(e1: &TestElement, e2: &TestElement) -> bool {
        e1.0 < e2.0
    }

    unsafe fn insert_multi(tree: &mut Link<TestElement>, element: TestElement) -> NonNull<Node<TestElement>> {
        let (parent, side) = Node::search_multi(tree, |e| less(&element, e));
        let node = NonNull::from(Box::leak(Box::new(Node::new(element))));
        Node::link(tree, parent, side, node);
        node
    }

    #[quickcheck]
    fn qc_multi(cmds: Vec<u8>) {
        let mut cmds = cmds.into_iter();
        let mut tree: Link<TestElement> = None;
        let mut nodes = Vec::new();
        // key -> serial numbers in insertion order
        let mut expected = BTreeMap::<u8, Vec<usize>>::new();
        let mut serial = 0;

        log::info!("Command: {:?}", cmds);

        (|| -> Option<()> {
            while let Some(cmd) = cmds.next() {
                match cmd % 2 {
                    0 if !nodes.is_empty() => {
                        let node: NonNull<Node<TestElement>> =
                            nodes.swap_remove(cmd as usize % nodes.len());
                        let element = unsafe { node.as_ref().element };
                        log::debug!("Remove {:?}", element);

                        unsafe {
                            Node::erase(&mut tree, node);
                            drop(Box::from_raw(node.as_ptr()));
                        }

                        let serials = expected.get_mut(&element.0).unwrap();
                        serials.retain(|&s| s != element.1);
                        if serials.is_empty() {
                            expected.remove(&element.0);
                        }
                    }
                    _ => {
                        let element = TestElement(cmds.next()? % 32, serial);
                        serial += 1;
                        log::debug!("Insert {:?}", element);

                        nodes.push(unsafe { insert_multi(&mut tree, element) });
                        expected.entry(element.0).or_default().push(element.1);
                    }
                }

                if log::log_enabled!(log::Level::Trace) {
                    let mut st = String::new();
                    unsafe { Node::dump(tree, &mut st).unwrap() };
                    log::trace!("Tree = {}", st);
                }

                let len = unsafe { Node::validate(&tree, less) };
                assert_eq!(len, nodes.len());

                // Check the sequence represented. Duplicates must stay in
                // insertion order.
                let expected: Vec<_> = expected
                    .iter()
                    .flat_map(|(&key, serials)| serials.iter().map(move |&s| TestElement(key, s)))
                    .collect();

                let tree_elements: Vec<_> =
                    unsafe { Node::iter(tree).map(|p| p.as_ref().element).collect() };
                assert_eq!(tree_elements, expected);

                let mut tree_elements: Vec<_> =
                    unsafe { Node::iter_rev(tree).map(|p| p.as_ref().element).collect() };
                tree_elements.reverse();
                assert_eq!(tree_elements, expected);

                // Check the bounds
                for key in 0..32u8 {
                    let lower = unsafe { Node::lower_bound(&tree, |e| e.0 < key) }
                        .map(|p| unsafe { p.as_ref().element });
                    let upper = unsafe { Node::upper_bound(&tree, |e| key < e.0) }
                        .map(|p| unsafe { p.as_ref().element });
                    assert_eq!(lower, expected.iter().find(|e| e.0 >= key).copied());
                    assert_eq!(upper, expected.iter().find(|e| e.0 > key).copied());
                }
            }

            Some(())
        })();

        unsafe { Node::destroy_all(&mut tree) };
        assert!(tree.is_none());
    }

    #[quickcheck]
    fn qc_unique(keys: Vec<u8>) {
        let mut tree: Link<u8> = None;
        let mut expected = std::collections::BTreeSet::new();

        for &key in keys.iter() {
            let search = unsafe { Node::search_unique(&tree, |e| *e < key, |e| key < *e) };
            match search {
                Search::Found(node) => {
                    assert!(!expected.insert(key), "{} is not a duplicate", key);
                    log::debug!("Erase {}", key);
                    unsafe {
                        Node::erase(&mut tree, node);
                        drop(Box::from_raw(node.as_ptr()));
                    }
                    expected.remove(&key);
                }
                Search::Vacant { parent, side } => {
                    assert!(expected.insert(key), "{} is a duplicate", key);
                    log::debug!("Insert {}", key);
                    let node = NonNull::from(Box::leak(Box::new(Node::new(key))));
                    unsafe { Node::link(&mut tree, parent, side, node) };
                }
            }

            unsafe { Node::validate(&tree, |a, b| a < b) };

            let tree_elements: Vec<u8> =
                unsafe { Node::iter(tree).map(|p| p.as_ref().element).collect() };
            let expected: Vec<u8> = expected.iter().copied().collect();
            assert_eq!(tree_elements, expected);

            for key in 0..=255u8 {
                let found = unsafe { Node::find(&tree, |e| *e < key, |e| key < *e) };
                assert_eq!(found.is_some(), expected.binary_search(&key).is_ok());
            }
        }

        unsafe { Node::destroy_all(&mut tree) };
    }

    #[test]
    fn rotations_preserve_order() {
        let mut tree: Link<u32> = None;
        let nodes: Vec<_> = (0..3u32)
            .map(|i| NonNull::from(Box::leak(Box::new(Node::new(i)))))
            .collect();
        unsafe {
            // 0 <- 1 -> 2, linked by hand, all black
            let [mut n0, mut n1, mut n2] = [nodes[0], nodes[1], nodes[2]];
            n1.as_mut().children = [Some(n0), Some(n2)];
            n0.as_mut().parent = Some(n1);
            n2.as_mut().parent = Some(n1);
            for mut n in [n0, n1, n2] {
                n.as_mut().color = Color::Black;
            }
            tree = Some(n1);

            Node::rotate_left(&mut tree, n1);
            assert_eq!(tree, Some(n2));
            assert_eq!(n2.as_ref().children, [Some(n1), None]);
            assert_eq!(n1.as_ref().children, [Some(n0), None]);
            let elements: Vec<u32> = Node::iter(tree).map(|p| p.as_ref().element).collect();
            assert_eq!(elements, [0, 1, 2]);

            Node::rotate_right(&mut tree, n2);
            assert_eq!(tree, Some(n1));
            assert_eq!(n1.as_ref().children, [Some(n0), Some(n2)]);
            assert_eq!(n2.as_ref().parent, Some(n1));
            let elements: Vec<u32> = Node::iter_rev(tree).map(|p| p.as_ref().element).collect();
            assert_eq!(elements, [2, 1, 0]);

            Node::destroy_all(&mut tree);
        }
    }
}
