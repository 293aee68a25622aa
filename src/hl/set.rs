//! Ordered sets
use core::{fmt, iter::FromIterator, ops::RangeBounds};

use crate::tree::{
    Compare, Cursor, CursorMut, Identity, IntoIter, Iter, Natural, Range, RbTree, RevCursor,
};

#[cfg(test)]
mod tests;

// Common parts
// ----------------------------------------------------------------------------

macro_rules! define_set {
	(
		$( #[$meta:meta] )*
		pub struct $ident:ident<T, C>;
	) => {
		$( #[$meta] )*
		pub struct $ident<T, C = Natural> {
			tree: RbTree<T, C, Identity>,
		}

		impl<T, C: Default> $ident<T, C> {
			/// Construct an empty set.
			#[inline]
			pub fn new() -> Self {
				Self { tree: RbTree::new() }
			}
		}

		impl<T, C> $ident<T, C> {
			/// Construct an empty set ordered by `compare`.
			#[inline]
			pub const fn with_compare(compare: C) -> Self {
				Self { tree: RbTree::with_compare(compare) }
			}

			/// Get the comparator.
			#[inline]
			pub fn value_comp(&self) -> &C {
				self.tree.compare()
			}

			/// Borrow the underlying tree.
			#[inline]
			pub fn as_tree(&self) -> &RbTree<T, C, Identity> {
				&self.tree
			}

			#[inline]
			pub fn len(&self) -> usize {
				self.tree.len()
			}

			#[inline]
			pub fn is_empty(&self) -> bool {
				self.tree.is_empty()
			}

			#[inline]
			pub fn clear(&mut self) {
				self.tree.clear()
			}

			#[inline]
			pub fn begin(&self) -> Cursor<'_, T> {
				self.tree.begin()
			}

			#[inline]
			pub fn end(&self) -> Cursor<'_, T> {
				self.tree.end()
			}

			#[inline]
			pub fn rbegin(&self) -> RevCursor<'_, T> {
				self.tree.rbegin()
			}

			#[inline]
			pub fn rend(&self) -> RevCursor<'_, T> {
				self.tree.rend()
			}

			#[inline]
			pub fn begin_mut(&mut self) -> CursorMut<'_, T, C, Identity> {
				self.tree.begin_mut()
			}

			#[inline]
			pub fn iter(&self) -> Iter<'_, T> {
				self.tree.iter()
			}

			#[inline]
			pub fn first(&self) -> Option<&T> {
				self.tree.first()
			}

			#[inline]
			pub fn last(&self) -> Option<&T> {
				self.tree.last()
			}

			#[inline]
			pub fn pop_first(&mut self) -> Option<T> {
				self.tree.pop_first()
			}

			#[inline]
			pub fn pop_last(&mut self) -> Option<T> {
				self.tree.pop_last()
			}

			/// Retain only the elements for which `keep` returns `true`.
			#[inline]
			pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
				self.tree.retain(keep)
			}
		}

		impl<T, C: Compare<T>> $ident<T, C> {
			#[inline]
			pub fn contains(&self, value: &T) -> bool {
				self.tree.contains(value)
			}

			/// Get a cursor at the first element not ordered before `value`.
			#[inline]
			pub fn lower_bound(&self, value: &T) -> Cursor<'_, T> {
				self.tree.lower_bound(value)
			}

			/// Get a cursor at the first element ordered after `value`.
			#[inline]
			pub fn upper_bound(&self, value: &T) -> Cursor<'_, T> {
				self.tree.upper_bound(value)
			}

			#[inline]
			pub fn lower_bound_mut(&mut self, value: &T) -> CursorMut<'_, T, C, Identity> {
				self.tree.lower_bound_mut(value)
			}

			#[inline]
			pub fn equal_range(&self, value: &T) -> (Cursor<'_, T>, Cursor<'_, T>) {
				self.tree.equal_range(value)
			}

			/// Iterate over the elements in `range`.
			///
			/// # Panics
			///
			/// Panics if the start of `range` is ordered after its end.
			#[inline]
			pub fn range<R: RangeBounds<T>>(&self, range: R) -> Range<'_, T> {
				self.tree.range(range)
			}

			/// Remove the elements in `range`. Returns the number of removed
			/// elements.
			#[inline]
			pub fn erase_range<R: RangeBounds<T>>(&mut self, range: R) -> usize {
				self.tree.erase_range(range)
			}

			/// Replace the contents with the elements of `iter`.
			pub fn assign(&mut self, iter: impl IntoIterator<Item = T>) {
				self.clear();
				self.extend(iter);
			}
		}

		impl<T: Clone, C: Clone> Clone for $ident<T, C> {
			#[inline]
			fn clone(&self) -> Self {
				Self { tree: self.tree.clone() }
			}

			#[inline]
			fn clone_from(&mut self, source: &Self) {
				self.tree.clone_from(&source.tree);
			}
		}

		impl<T, C: Default> Default for $ident<T, C> {
			#[inline]
			fn default() -> Self {
				Self::new()
			}
		}

		impl<T: fmt::Debug, C> fmt::Debug for $ident<T, C> {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.debug_set().entries(self.iter()).finish()
			}
		}

		impl<T: PartialEq, C> PartialEq for $ident<T, C> {
			fn eq(&self, other: &Self) -> bool {
				self.len() == other.len() && self.iter().eq(other.iter())
			}
		}

		impl<T: Eq, C> Eq for $ident<T, C> {}

		impl<T, C: Compare<T>> Extend<T> for $ident<T, C> {
			fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
				for value in iter {
					self.insert(value);
				}
			}
		}

		impl<'a, T: Clone + 'a, C: Compare<T>> Extend<&'a T> for $ident<T, C> {
			fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
				self.extend(iter.into_iter().cloned());
			}
		}

		impl<T, C: Compare<T> + Default> FromIterator<T> for $ident<T, C> {
			fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
				let mut this = Self::new();
				this.extend(iter);
				this
			}
		}

		impl<T, C> IntoIterator for $ident<T, C> {
			type Item = T;
			type IntoIter = IntoIter<T, C, Identity>;

			#[inline]
			fn into_iter(self) -> Self::IntoIter {
				self.tree.into_iter()
			}
		}

		impl<'a, T, C> IntoIterator for &'a $ident<T, C> {
			type Item = &'a T;
			type IntoIter = Iter<'a, T>;

			#[inline]
			fn into_iter(self) -> Self::IntoIter {
				self.iter()
			}
		}
	};
}

// `Set`
// ----------------------------------------------------------------------------

define_set! {
    /// An ordered set of unique elements.
    ///
    /// Inserting an element equivalent to an existing one (under `C`) leaves
    /// the set unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbkit::hl::Set;
    ///
    /// let mut set = Set::<i32>::new();
    /// assert!(set.insert(2).1);
    /// assert!(set.insert(1).1);
    /// assert!(!set.insert(2).1);
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2]);
    /// ```
    pub struct Set<T, C>;
}

impl<T, C: Compare<T>> Set<T, C> {
    /// Insert `value` unless an equivalent element exists. Returns a cursor at
    /// the element in the set and whether `value` was inserted.
    #[inline]
    pub fn insert(&mut self, value: T) -> (Cursor<'_, T>, bool) {
        self.tree.insert_unique(value)
    }

    /// Like [`Self::insert`], but constructs the element directly inside a new
    /// node. On a conflict, the node and the element are dropped.
    #[inline]
    pub fn emplace(&mut self, make: impl FnOnce() -> T) -> (Cursor<'_, T>, bool) {
        self.tree.emplace_unique(make)
    }

    /// Find the element equivalent to `value`. Returns the end cursor if
    /// there's none.
    #[inline]
    pub fn find(&self, value: &T) -> Cursor<'_, T> {
        self.tree.find(value)
    }

    #[inline]
    pub fn find_mut(&mut self, value: &T) -> CursorMut<'_, T, C, Identity> {
        self.tree.find_mut(value)
    }

    #[inline]
    pub fn get(&self, value: &T) -> Option<&T> {
        self.tree.get(value)
    }

    /// Return 1 if the set contains an element equivalent to `value`, 0
    /// otherwise.
    #[inline]
    pub fn count(&self, value: &T) -> usize {
        self.contains(value) as usize
    }

    /// Remove the element equivalent to `value`. Returns the number of removed
    /// elements (0 or 1).
    #[inline]
    pub fn erase(&mut self, value: &T) -> usize {
        self.tree.erase_unique(value)
    }

    /// Remove the element equivalent to `value`. Returns whether one was
    /// present.
    #[inline]
    pub fn remove(&mut self, value: &T) -> bool {
        self.erase(value) != 0
    }

    /// Remove and return the element equivalent to `value`.
    #[inline]
    pub fn take(&mut self, value: &T) -> Option<T> {
        self.tree.remove_unique(value)
    }
}

// `MultiSet`
// ----------------------------------------------------------------------------

define_set! {
    /// An ordered collection that allows equivalent elements.
    ///
    /// Equivalent elements are kept in insertion order.
    pub struct MultiSet<T, C>;
}

impl<T, C: Compare<T>> MultiSet<T, C> {
    /// Insert `value` after every equivalent element.
    #[inline]
    pub fn insert(&mut self, value: T) -> Cursor<'_, T> {
        self.tree.insert_multi(value)
    }

    #[inline]
    pub fn emplace(&mut self, make: impl FnOnce() -> T) -> Cursor<'_, T> {
        self.tree.emplace_multi(make)
    }

    /// Find the first element equivalent to `value`. Returns the end cursor if
    /// there's none.
    pub fn find(&self, value: &T) -> Cursor<'_, T> {
        let cursor = self.tree.lower_bound(value);
        match cursor.get() {
            Some(element) if !self.value_comp().less(value, element) => cursor,
            _ => self.tree.end(),
        }
    }

    /// Count the elements equivalent to `value`.
    #[inline]
    pub fn count(&self, value: &T) -> usize {
        self.tree.count_multi(value)
    }

    /// Iterate over the elements equivalent to `value`.
    #[inline]
    pub fn equal_iter(&self, value: &T) -> Range<'_, T> {
        self.tree.equal_iter(value)
    }

    /// Remove every element equivalent to `value`. Returns the number of
    /// removed elements.
    #[inline]
    pub fn erase(&mut self, value: &T) -> usize {
        self.tree.erase_multi(value)
    }

    /// Remove the first element equivalent to `value`. Returns whether one was
    /// present.
    pub fn remove_one(&mut self, value: &T) -> bool {
        if self.find(value).is_end() {
            return false;
        }
        self.tree.lower_bound_mut(value).remove_current().is_some()
    }
}
