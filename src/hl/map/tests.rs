use super::*;
use crate::tree::FnCompare;
use quickcheck_macros::quickcheck;

use std::{collections::BTreeMap, prelude::v1::*};

#[test]
fn map_insert_keeps_first_value() {
    let mut map = Map::<u32, &str>::new();
    assert!(map.insert(2, "two").1);
    assert!(map.insert(1, "one").1);

    let (cursor, inserted) = map.insert(2, "deux");
    assert!(!inserted);
    assert_eq!(cursor.get(), Some(&(2, "two")));

    assert_eq!(map.get(&2), Some(&"two"));
    assert_eq!(map.get(&3), None);
    assert_eq!(map[&1], "one");
    assert_eq!(map.count(&1), 1);
    assert_eq!(map.count(&3), 0);
    map.tree.assert_valid();
}

#[test]
fn map_insert_or_assign() {
    let mut map = Map::<u32, u32>::new();
    let (cursor, inserted) = map.insert_or_assign(5, 50);
    assert!(inserted);
    assert_eq!(cursor.get(), Some(&(5, 50)));

    let (cursor, inserted) = map.insert_or_assign(5, 55);
    assert!(!inserted);
    assert_eq!(cursor.get(), Some(&(5, 55)));
    assert_eq!(map.len(), 1);

    map.insert_or_assign(1, 10);
    map.insert_or_assign(9, 90);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 5, 9]);
    assert_eq!(map.values().copied().collect::<Vec<_>>(), [10, 55, 90]);
    map.tree.assert_valid();
}

#[test]
fn map_get_or_insert_with_counts_words() {
    let mut map = Map::<&str, usize>::new();
    for word in "the cat saw the other cat and the dog".split(' ') {
        *map.get_or_insert_with(word, || 0) += 1;
    }
    assert_eq!(map[&"the"], 3);
    assert_eq!(map[&"cat"], 2);
    assert_eq!(map[&"dog"], 1);
    assert_eq!(map.len(), 6);
    assert_eq!(map.first_key_value(), Some((&"and", &1)));
    assert_eq!(map.last_key_value(), Some((&"the", &3)));
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn map_index_missing_key_panics() {
    let map: Map<u8, u8> = [(1, 1)].into_iter().collect();
    let _ = map[&2];
}

#[test]
fn map_mutation() {
    let mut map: Map<u8, u32> = (0..10).map(|k| (k, k as u32)).collect();

    if let Some(v) = map.get_mut(&3) {
        *v = 300;
    }
    assert_eq!(map.get(&3), Some(&300));
    assert_eq!(map.get_mut(&42), None);

    for (_, v) in &mut map {
        *v += 1;
    }
    for v in map.values_mut() {
        *v *= 2;
    }
    assert_eq!(map[&0], 2);
    assert_eq!(map[&3], 602);

    map.retain(|&k, v| {
        *v += 1;
        k % 2 == 0
    });
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [0, 2, 4, 6, 8]);
    assert_eq!(map[&4], 11);

    assert_eq!(map.remove(&4), Some(11));
    assert_eq!(map.remove(&4), None);
    assert_eq!(map.remove_entry(&6), Some((6, 15)));
    assert_eq!(map.erase(&8), 1);
    assert_eq!(map.erase(&8), 0);
    assert_eq!(map.into_iter().collect::<Vec<_>>(), [(0, 3), (2, 7)]);
}

#[test]
fn map_ranges_and_debug() {
    let map: Map<i32, char> = [(3, 'c'), (1, 'a'), (2, 'b'), (5, 'e')].into_iter().collect();
    assert_eq!(format!("{:?}", map), "{1: 'a', 2: 'b', 3: 'c', 5: 'e'}");

    assert_eq!(
        map.range(2..5).collect::<Vec<_>>(),
        [(&2, &'b'), (&3, &'c')]
    );
    assert_eq!(map.range(..).rev().count(), 4);
    assert_eq!(map.lower_bound(&4).get(), Some(&(5, 'e')));
    assert_eq!(map.upper_bound(&3).get(), Some(&(5, 'e')));
    assert!(map.upper_bound(&5).is_end());

    let (lo, hi) = map.equal_range(&2);
    assert_eq!(lo.get(), Some(&(2, 'b')));
    assert_eq!(hi.get(), Some(&(3, 'c')));

    let mut copy = map.clone();
    assert_eq!(copy, map);
    assert_eq!(copy.erase_range(2..=3), 2);
    assert_ne!(copy, map);
    copy.tree.assert_valid();
}

#[test]
fn map_custom_key_order() {
    let mut map = Map::with_compare(FnCompare(|a: &String, b: &String| {
        a.to_lowercase() < b.to_lowercase()
    }));
    map.insert("Beta".to_string(), 2);
    map.insert("alpha".to_string(), 1);
    assert!(!map.insert("ALPHA".to_string(), 10).1);
    assert_eq!(map.keys().collect::<Vec<_>>(), ["alpha", "Beta"]);
}

#[test]
fn multimap_groups_values() {
    let mut map = MultiMap::<u8, &str>::new();
    map.insert(2, "b1");
    map.insert(1, "a1");
    map.insert(2, "b2");
    map.insert(3, "c1");
    map.insert(2, "b3");
    map.tree.assert_valid();

    assert_eq!(map.len(), 5);
    assert_eq!(map.count(&2), 3);
    assert_eq!(
        map.get_all(&2).map(|(_, v)| *v).collect::<Vec<_>>(),
        ["b1", "b2", "b3"]
    );
    assert_eq!(map.get_all(&2).rev().next(), Some((&2, &"b3")));
    assert_eq!(map.find(&2).get(), Some(&(2, "b1")));
    assert!(map.find(&7).is_end());
    assert_eq!(map.get_all(&7).count(), 0);

    assert_eq!(map.erase(&2), 3);
    assert_eq!(map.erase(&2), 0);
    assert_eq!(map.iter().collect::<Vec<_>>(), [(&1, &"a1"), (&3, &"c1")]);
}

/// `Map::insert_or_assign` and `Map::remove` must behave like `BTreeMap`.
#[quickcheck]
fn qc_map_against_btreemap(cmds: Vec<(bool, u8, u16)>) {
    let mut map = Map::<u8, u16>::new();
    let mut model = BTreeMap::new();

    log::info!("Command: {:?}", cmds);

    for (insert, key, value) in cmds {
        let key = key % 32;
        if insert {
            log::debug!("insert_or_assign {} => {}", key, value);
            let (_, inserted) = map.insert_or_assign(key, value);
            assert_eq!(inserted, model.insert(key, value).is_none());
        } else {
            log::debug!("remove {}", key);
            assert_eq!(map.remove(&key), model.remove(&key));
        }

        map.tree.assert_valid();
        assert!(map.iter().eq(model.iter()));
    }
}
