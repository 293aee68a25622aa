//! Ordered maps
//!
//! The entries are stored as `(K, V)` pairs ordered by `K`. Cursors therefore
//! yield `&(K, V)`, while the iterators yield `(&K, &V)` like the standard
//! library maps.
use alloc::boxed::Box;
use core::{
    fmt,
    iter::{FromIterator, FusedIterator},
    ops::{Index, RangeBounds},
};

use crate::{
    tree::{self, Compare, Cursor, CursorMut, First, Natural, RbTree, RevCursor},
    utils::rbtree::{Node, Search},
};

#[cfg(test)]
mod tests;

// Iterators
// ----------------------------------------------------------------------------

macro_rules! define_pair_iter {
	(
		$( #[$meta:meta] )*
		pub struct $ident:ident<'a, K, V>($inner:ty);
		|$entry:pat_param| -> $item:ty { $map:expr }
		$( impl $extra:ident; )*
	) => {
		$( #[$meta] )*
		pub struct $ident<'a, K, V>($inner);

		impl<'a, K, V> Iterator for $ident<'a, K, V> {
			type Item = $item;

			#[inline]
			fn next(&mut self) -> Option<Self::Item> {
				self.0.next().map(|$entry| $map)
			}

			#[inline]
			fn size_hint(&self) -> (usize, Option<usize>) {
				self.0.size_hint()
			}
		}

		impl<'a, K, V> DoubleEndedIterator for $ident<'a, K, V> {
			#[inline]
			fn next_back(&mut self) -> Option<Self::Item> {
				self.0.next_back().map(|$entry| $map)
			}
		}

		impl<K, V> FusedIterator for $ident<'_, K, V> {}

		$( impl<K, V> $extra for $ident<'_, K, V> {} )*
	};
}

define_pair_iter! {
    /// An iterator over the entries of a map in key order.
    pub struct Iter<'a, K, V>(tree::Iter<'a, (K, V)>);
    |(k, v)| -> (&'a K, &'a V) { (k, v) }
    impl ExactSizeIterator;
}

define_pair_iter! {
    /// A mutable iterator over the entries of a map in key order.
    pub struct IterMut<'a, K, V>(tree::IterMut<'a, (K, V)>);
    |(k, v)| -> (&'a K, &'a mut V) { (&*k, v) }
    impl ExactSizeIterator;
}

define_pair_iter! {
    /// An iterator over a contiguous run of entries of a map.
    pub struct Range<'a, K, V>(tree::Range<'a, (K, V)>);
    |(k, v)| -> (&'a K, &'a V) { (k, v) }
}

define_pair_iter! {
    /// An iterator over the keys of a map in order.
    pub struct Keys<'a, K, V>(tree::Iter<'a, (K, V)>);
    |(k, _)| -> &'a K { k }
    impl ExactSizeIterator;
}

define_pair_iter! {
    /// An iterator over the values of a map in key order.
    pub struct Values<'a, K, V>(tree::Iter<'a, (K, V)>);
    |(_, v)| -> &'a V { v }
    impl ExactSizeIterator;
}

define_pair_iter! {
    /// A mutable iterator over the values of a map in key order.
    pub struct ValuesMut<'a, K, V>(tree::IterMut<'a, (K, V)>);
    |(_, v)| -> &'a mut V { v }
    impl ExactSizeIterator;
}

/// An owning iterator over the entries of a map in key order.
pub type IntoIter<K, V, C> = tree::IntoIter<(K, V), C, First>;

impl<K, V> Clone for Iter<'_, K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<K, V> Clone for Range<'_, K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

// Common parts
// ----------------------------------------------------------------------------

macro_rules! define_map {
	(
		$( #[$meta:meta] )*
		pub struct $ident:ident<K, V, C>;
	) => {
		$( #[$meta] )*
		pub struct $ident<K, V, C = Natural> {
			tree: RbTree<(K, V), C, First>,
		}

		impl<K, V, C: Default> $ident<K, V, C> {
			/// Construct an empty map.
			#[inline]
			pub fn new() -> Self {
				Self { tree: RbTree::new() }
			}
		}

		impl<K, V, C> $ident<K, V, C> {
			/// Construct an empty map whose keys are ordered by `compare`.
			#[inline]
			pub const fn with_compare(compare: C) -> Self {
				Self { tree: RbTree::with_compare(compare) }
			}

			/// Get the key comparator.
			#[inline]
			pub fn key_comp(&self) -> &C {
				self.tree.compare()
			}

			/// Borrow the underlying tree.
			#[inline]
			pub fn as_tree(&self) -> &RbTree<(K, V), C, First> {
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
			pub fn begin(&self) -> Cursor<'_, (K, V)> {
				self.tree.begin()
			}

			#[inline]
			pub fn end(&self) -> Cursor<'_, (K, V)> {
				self.tree.end()
			}

			#[inline]
			pub fn rbegin(&self) -> RevCursor<'_, (K, V)> {
				self.tree.rbegin()
			}

			#[inline]
			pub fn rend(&self) -> RevCursor<'_, (K, V)> {
				self.tree.rend()
			}

			#[inline]
			pub fn begin_mut(&mut self) -> CursorMut<'_, (K, V), C, First> {
				self.tree.begin_mut()
			}

			#[inline]
			pub fn iter(&self) -> Iter<'_, K, V> {
				Iter(self.tree.iter())
			}

			/// Iterate over the entries with mutable access to the values.
			#[inline]
			pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
				IterMut(self.tree.iter_mut())
			}

			#[inline]
			pub fn keys(&self) -> Keys<'_, K, V> {
				Keys(self.tree.iter())
			}

			#[inline]
			pub fn values(&self) -> Values<'_, K, V> {
				Values(self.tree.iter())
			}

			#[inline]
			pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
				ValuesMut(self.tree.iter_mut())
			}

			#[inline]
			pub fn first_key_value(&self) -> Option<(&K, &V)> {
				self.tree.first().map(|(k, v)| (k, v))
			}

			#[inline]
			pub fn last_key_value(&self) -> Option<(&K, &V)> {
				self.tree.last().map(|(k, v)| (k, v))
			}

			#[inline]
			pub fn pop_first(&mut self) -> Option<(K, V)> {
				self.tree.pop_first()
			}

			#[inline]
			pub fn pop_last(&mut self) -> Option<(K, V)> {
				self.tree.pop_last()
			}

			/// Retain only the entries for which `keep` returns `true`.
			pub fn retain(&mut self, mut keep: impl FnMut(&K, &mut V) -> bool) {
				let mut cursor = self.tree.begin_mut();
				while let Some((key, value)) = cursor.get_mut() {
					if keep(key, value) {
						cursor.move_next();
					} else {
						cursor.remove_current();
					}
				}
			}
		}

		impl<K, V, C: Compare<K>> $ident<K, V, C> {
			#[inline]
			pub fn contains_key(&self, key: &K) -> bool {
				self.tree.contains(key)
			}

			/// Get a cursor at the first entry whose key is not ordered before
			/// `key`.
			#[inline]
			pub fn lower_bound(&self, key: &K) -> Cursor<'_, (K, V)> {
				self.tree.lower_bound(key)
			}

			/// Get a cursor at the first entry whose key is ordered after
			/// `key`.
			#[inline]
			pub fn upper_bound(&self, key: &K) -> Cursor<'_, (K, V)> {
				self.tree.upper_bound(key)
			}

			#[inline]
			pub fn lower_bound_mut(&mut self, key: &K) -> CursorMut<'_, (K, V), C, First> {
				self.tree.lower_bound_mut(key)
			}

			#[inline]
			pub fn equal_range(&self, key: &K) -> (Cursor<'_, (K, V)>, Cursor<'_, (K, V)>) {
				self.tree.equal_range(key)
			}

			/// Iterate over the entries whose keys fall in `range`.
			///
			/// # Panics
			///
			/// Panics if the start of `range` is ordered after its end.
			#[inline]
			pub fn range<R: RangeBounds<K>>(&self, range: R) -> Range<'_, K, V> {
				Range(self.tree.range(range))
			}

			/// Remove the entries whose keys fall in `range`. Returns the
			/// number of removed entries.
			#[inline]
			pub fn erase_range<R: RangeBounds<K>>(&mut self, range: R) -> usize {
				self.tree.erase_range(range)
			}

			/// Replace the contents with the entries of `iter`.
			pub fn assign(&mut self, iter: impl IntoIterator<Item = (K, V)>) {
				self.clear();
				self.extend(iter);
			}
		}

		impl<K: Clone, V: Clone, C: Clone> Clone for $ident<K, V, C> {
			#[inline]
			fn clone(&self) -> Self {
				Self { tree: self.tree.clone() }
			}

			#[inline]
			fn clone_from(&mut self, source: &Self) {
				self.tree.clone_from(&source.tree);
			}
		}

		impl<K, V, C: Default> Default for $ident<K, V, C> {
			#[inline]
			fn default() -> Self {
				Self::new()
			}
		}

		impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for $ident<K, V, C> {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.debug_map().entries(self.iter()).finish()
			}
		}

		impl<K: PartialEq, V: PartialEq, C> PartialEq for $ident<K, V, C> {
			fn eq(&self, other: &Self) -> bool {
				self.len() == other.len() && self.iter().eq(other.iter())
			}
		}

		impl<K: Eq, V: Eq, C> Eq for $ident<K, V, C> {}

		impl<K, V, C: Compare<K>> Extend<(K, V)> for $ident<K, V, C> {
			fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
				for (key, value) in iter {
					self.insert(key, value);
				}
			}
		}

		impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for $ident<K, V, C> {
			fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
				let mut this = Self::new();
				this.extend(iter);
				this
			}
		}

		impl<K, V, C> IntoIterator for $ident<K, V, C> {
			type Item = (K, V);
			type IntoIter = IntoIter<K, V, C>;

			#[inline]
			fn into_iter(self) -> Self::IntoIter {
				self.tree.into_iter()
			}
		}

		impl<'a, K, V, C> IntoIterator for &'a $ident<K, V, C> {
			type Item = (&'a K, &'a V);
			type IntoIter = Iter<'a, K, V>;

			#[inline]
			fn into_iter(self) -> Self::IntoIter {
				self.iter()
			}
		}

		impl<'a, K, V, C> IntoIterator for &'a mut $ident<K, V, C> {
			type Item = (&'a K, &'a mut V);
			type IntoIter = IterMut<'a, K, V>;

			#[inline]
			fn into_iter(self) -> Self::IntoIter {
				self.iter_mut()
			}
		}
	};
}

// `Map`
// ----------------------------------------------------------------------------

define_map! {
    /// An ordered map with unique keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbkit::hl::Map;
    ///
    /// let mut map = Map::<&str, u32>::new();
    /// map.insert("b", 2);
    /// map.insert("a", 1);
    /// assert!(!map.insert("a", 100).1);
    /// *map.get_or_insert_with("c", || 0) += 3;
    ///
    /// assert_eq!(map[&"a"], 1);
    /// assert_eq!(map.iter().collect::<Vec<_>>(), [(&"a", &1), (&"b", &2), (&"c", &3)]);
    /// ```
    pub struct Map<K, V, C>;
}

impl<K, V, C: Compare<K>> Map<K, V, C> {
    /// Insert an entry unless the map already contains an equivalent key, in
    /// which case `value` is dropped and the existing entry is kept. Returns a
    /// cursor at the entry for the key and whether the entry was inserted.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> (Cursor<'_, (K, V)>, bool) {
        self.tree.insert_unique((key, value))
    }

    /// Insert an entry, or overwrite the value if the map already contains an
    /// equivalent key (the existing key is kept). Returns a cursor at the
    /// entry and whether it was newly inserted.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (Cursor<'_, (K, V)>, bool) {
        let (node, inserted) = match self.tree.search(&key) {
            Search::Found(node) => {
                // Safety: `node` belongs to `self.tree`, which we borrow
                // mutably. The key is left untouched.
                unsafe { (*node.as_ptr()).element.1 = value };
                (node, false)
            }
            // Safety: `parent` and `side` were just computed for `key`
            Search::Vacant { parent, side } => unsafe {
                let node = self
                    .tree
                    .link_node(parent, side, Box::new(Node::new((key, value))));
                (node, true)
            },
        };
        // Safety: `node` is included in `self.tree`
        (unsafe { self.tree.cursor_at(node) }, inserted)
    }

    /// Get the value for `key`, inserting `make()` first if the map doesn't
    /// contain the key.
    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> &mut V {
        let node = match self.tree.search(&key) {
            Search::Found(node) => node,
            // Safety: `parent` and `side` were just computed for `key`
            Search::Vacant { parent, side } => unsafe {
                self.tree
                    .link_node(parent, side, Box::new(Node::new((key, make()))))
            },
        };
        // Safety: `node` belongs to `self.tree`, which is borrowed mutably for
        // the returned lifetime. Only the value is exposed mutably.
        unsafe { &mut (*node.as_ptr()).element.1 }
    }

    /// Find the entry for `key`. Returns the end cursor if there's none.
    #[inline]
    pub fn find(&self, key: &K) -> Cursor<'_, (K, V)> {
        self.tree.find(key)
    }

    #[inline]
    pub fn find_mut(&mut self, key: &K) -> CursorMut<'_, (K, V), C, First> {
        self.tree.find_mut(key)
    }

    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key).map(|(_, v)| v)
    }

    #[inline]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.tree.get(key).map(|(k, v)| (k, v))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.tree.search(key) {
            // Safety: `node` belongs to `self.tree`, which is borrowed mutably
            // for the returned lifetime. Only the value is exposed mutably.
            Search::Found(node) => Some(unsafe { &mut (*node.as_ptr()).element.1 }),
            Search::Vacant { .. } => None,
        }
    }

    /// Return 1 if the map contains `key`, 0 otherwise.
    #[inline]
    pub fn count(&self, key: &K) -> usize {
        self.contains_key(key) as usize
    }

    /// Remove the entry for `key`. Returns the number of removed entries (0
    /// or 1).
    #[inline]
    pub fn erase(&mut self, key: &K) -> usize {
        self.tree.erase_unique(key)
    }

    #[inline]
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    #[inline]
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.tree.remove_unique(key)
    }
}

impl<K, V, C: Compare<K>> Index<&K> for Map<K, V, C> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    #[inline]
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

// `MultiMap`
// ----------------------------------------------------------------------------

define_map! {
    /// An ordered map that allows multiple entries with equivalent keys.
    ///
    /// Entries with equivalent keys are kept in insertion order.
    pub struct MultiMap<K, V, C>;
}

impl<K, V, C: Compare<K>> MultiMap<K, V, C> {
    /// Insert an entry after every entry with an equivalent key.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Cursor<'_, (K, V)> {
        self.tree.insert_multi((key, value))
    }

    /// Find the first entry for `key`. Returns the end cursor if there's none.
    pub fn find(&self, key: &K) -> Cursor<'_, (K, V)> {
        let cursor = self.tree.lower_bound(key);
        match cursor.get() {
            Some((k, _)) if !self.key_comp().less(key, k) => cursor,
            _ => self.tree.end(),
        }
    }

    /// Iterate over the entries for `key` in insertion order.
    #[inline]
    pub fn get_all(&self, key: &K) -> Range<'_, K, V> {
        Range(self.tree.equal_iter(key))
    }

    /// Count the entries for `key`.
    #[inline]
    pub fn count(&self, key: &K) -> usize {
        self.tree.count_multi(key)
    }

    /// Remove every entry for `key`. Returns the number of removed entries.
    #[inline]
    pub fn erase(&mut self, key: &K) -> usize {
        self.tree.erase_multi(key)
    }
}
