use super::*;
use crate::tree::{Descending, FnCompare};
use quickcheck_macros::quickcheck;

use std::{cell::Cell, collections::BTreeSet, prelude::v1::*, rc::Rc};

#[test]
fn set_basics() {
    let mut set = Set::<i32>::new();
    for v in [1, 2, 3] {
        assert!(set.insert(v).1);
    }
    assert!(!set.insert(1).1);
    assert!(set.insert(6).1);
    assert_eq!(set.len(), 4);

    assert_eq!(set.find(&3).get(), Some(&3));
    assert!(set.find(&4) == set.end());
    assert_eq!(set.count(&6), 1);
    assert_eq!(set.count(&5), 0);

    assert_eq!(set.erase(&1), 1);
    assert!(!set.remove(&1));
    assert_eq!(set.take(&6), Some(6));
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [2, 3]);
    set.tree.assert_valid();
}

#[test]
fn set_emplace_conflict_drops_element() {
    struct Tracked(u8, Rc<Cell<usize>>);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.1.set(self.1.get() + 1);
        }
    }

    let drops = Rc::new(Cell::new(0));
    let mut set = Set::with_compare(FnCompare(|a: &Tracked, b: &Tracked| a.0 < b.0));
    let (cursor, inserted) = set.emplace(|| Tracked(1, drops.clone()));
    assert!(inserted);
    assert_eq!(cursor.get().map(|t| t.0), Some(1));

    let mut calls = 0;
    let (cursor, inserted) = set.emplace(|| {
        calls += 1;
        Tracked(1, drops.clone())
    });
    assert!(!inserted);
    assert_eq!(cursor.get().map(|t| t.0), Some(1));
    assert_eq!(calls, 1);
    assert_eq!(drops.get(), 1);
    assert_eq!(set.len(), 1);

    drop(set);
    assert_eq!(drops.get(), 2);
}

#[test]
fn set_assign_and_compare() {
    let a: Set<i32> = [4, 1, 3, 1, 2].into_iter().collect();
    assert_eq!(a.len(), 4);
    assert_eq!(format!("{:?}", a), "{1, 2, 3, 4}");

    let mut b = Set::<i32>::new();
    b.assign([9, 8]);
    assert_ne!(a, b);
    b.assign(a.iter().copied());
    assert_eq!(a, b);

    let mut c = a.clone();
    c.pop_first();
    assert_eq!(a.first(), Some(&1));
    assert_eq!(c.first(), Some(&2));
    assert_eq!(c.last(), Some(&4));
}

#[test]
fn set_descending() {
    let set: Set<u8, Descending> = [1, 5, 3].into_iter().collect();
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [5, 3, 1]);
    assert_eq!(set.range(4..=1).copied().collect::<Vec<_>>(), [3, 1]);
    assert_eq!(set.upper_bound(&5).get(), Some(&3));
}

#[test]
fn set_cursor_walk() {
    let set: Set<i32> = (1..=4).collect();
    let mut cursor = set.rbegin();
    let mut seen = Vec::new();
    while !cursor.is_end() {
        seen.push(*cursor.get().unwrap());
        cursor.move_next();
    }
    assert_eq!(seen, [4, 3, 2, 1]);
    assert!(cursor == set.rend());
}

#[test]
fn multiset_basics() {
    let mut set = MultiSet::<i32>::new();
    for v in [3, 1, 3, 2, 3] {
        set.insert(v);
    }
    set.tree.assert_valid();
    assert_eq!(set.len(), 5);
    assert_eq!(set.count(&3), 3);
    assert_eq!(set.equal_iter(&3).count(), 3);
    assert_eq!(set.find(&3).get(), Some(&3));
    assert!(set.find(&4).is_end());

    assert!(set.remove_one(&3));
    assert_eq!(set.count(&3), 2);
    assert_eq!(set.erase(&3), 2);
    assert!(!set.remove_one(&3));
    assert_eq!(set.into_iter().collect::<Vec<_>>(), [1, 2]);
}

#[test]
fn multiset_retain() {
    let mut set: MultiSet<u32> = [5, 1, 5, 2, 5, 3].into_iter().collect();
    set.retain(|&v| v != 5);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    set.tree.assert_valid();
}

/// `Set` must behave like `BTreeSet` for any command stream.
#[quickcheck]
fn qc_set_against_btreeset(cmds: Vec<(u8, u8)>) {
    let mut set = Set::<u8>::new();
    let mut model = BTreeSet::new();

    log::info!("Command: {:?}", cmds);

    for (op, value) in cmds {
        let value = value % 64;
        match op % 4 {
            0 | 1 => {
                log::debug!("insert {}", value);
                assert_eq!(set.insert(value).1, model.insert(value));
            }
            2 => {
                log::debug!("remove {}", value);
                assert_eq!(set.remove(&value), model.remove(&value));
            }
            _ => {
                log::debug!("erase_range {}..", value);
                let expected = model.range(value..).count();
                model.retain(|&v| v < value);
                assert_eq!(set.erase_range(value..), expected);
            }
        }

        set.tree.assert_valid();
        assert_eq!(set.len(), model.len());
        assert!(set.iter().eq(model.iter()));
        assert!(set.iter().rev().eq(model.iter().rev()));
        assert_eq!(
            set.lower_bound(&value).get(),
            model.range(value..).next()
        );
    }
}
