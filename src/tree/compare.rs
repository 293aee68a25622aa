use core::fmt;

/// A strict weak order over `T`.
///
/// Two values `a` and `b` are *equivalent* if neither `less(a, b)` nor
/// `less(b, a)` holds. Containers assume (but don't check) that `less` is
/// irreflexive and transitive, and that equivalence is transitive. A
/// comparator that breaks these rules leaves the containers in an
/// unspecified (but memory-safe) state.
pub trait Compare<T: ?Sized> {
    /// Return `true` if `lhs` is ordered strictly before `rhs`.
    fn less(&self, lhs: &T, rhs: &T) -> bool;
}

/// Orders values by their [`Ord`] implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord + ?Sized> Compare<T> for Natural {
    #[inline]
    fn less(&self, lhs: &T, rhs: &T) -> bool {
        lhs < rhs
    }
}

/// Orders values by the reverse of their [`Ord`] implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Descending;

impl<T: Ord + ?Sized> Compare<T> for Descending {
    #[inline]
    fn less(&self, lhs: &T, rhs: &T) -> bool {
        rhs < lhs
    }
}

/// Wraps a closure `Fn(&T, &T) -> bool` into a [`Compare`].
#[derive(Default, Clone, Copy)]
pub struct FnCompare<F>(pub F);

impl<F> fmt::Debug for FnCompare<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnCompare").finish_non_exhaustive()
    }
}

impl<T: ?Sized, F: Fn(&T, &T) -> bool> Compare<T> for FnCompare<F> {
    #[inline]
    fn less(&self, lhs: &T, rhs: &T) -> bool {
        (self.0)(lhs, rhs)
    }
}

/// Extracts the ordering key from a stored value.
pub trait KeyOf<T> {
    type Key: ?Sized;

    fn key_of(value: &T) -> &Self::Key;
}

/// The whole value is the key. Used by sets.
#[derive(Debug)]
pub enum Identity {}

impl<T> KeyOf<T> for Identity {
    type Key = T;

    #[inline]
    fn key_of(value: &T) -> &T {
        value
    }
}

/// The first field of a pair is the key. Used by maps.
#[derive(Debug)]
pub enum First {}

impl<K, V> KeyOf<(K, V)> for First {
    type Key = K;

    #[inline]
    fn key_of(value: &(K, V)) -> &K {
        &value.0
    }
}
