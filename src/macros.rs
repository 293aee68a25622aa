/// Construct a [`Set`] from a list of elements.
///
/// Duplicates are dropped, keeping the first occurrence.
///
/// ```
/// let set = rbkit::rbset![3, 1, 2, 1];
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// ```
///
/// [`Set`]: crate::hl::Set
#[macro_export]
macro_rules! rbset {
    () => {
        $crate::hl::Set::<_>::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut set = $crate::hl::Set::<_>::new();
        $( set.insert($value); )+
        set
    }};
}

/// Construct a [`Map`] from a list of `key => value` entries.
///
/// When a key appears more than once, the first entry wins.
///
/// ```
/// let map = rbkit::rbmap! {
///     "one" => 1,
///     "two" => 2,
/// };
/// assert_eq!(map[&"two"], 2);
/// ```
///
/// [`Map`]: crate::hl::Map
#[macro_export]
macro_rules! rbmap {
    () => {
        $crate::hl::Map::<_, _>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::hl::Map::<_, _>::new();
        $( map.insert($key, $value); )+
        map
    }};
}
