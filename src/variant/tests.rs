use super::*;
use std::prelude::v1::*;

type IntOrFloat = Variant2<i32, f32>;

/// Returns the value as it is, widened to `f64`
struct Widen;

impl Visitor<i32> for Widen {
    type Output = f64;
    fn visit(&mut self, x: &i32) -> f64 {
        f64::from(*x)
    }
}

impl Visitor<f32> for Widen {
    type Output = f64;
    fn visit(&mut self, x: &f32) -> f64 {
        f64::from(*x)
    }
}

/// Counts how many values it has seen and describes each one
#[derive(Default)]
struct Describe {
    seen: usize,
}

impl Visitor<i32> for &mut Describe {
    type Output = String;
    fn visit(&mut self, x: &i32) -> String {
        self.seen += 1;
        format!("int {}", x)
    }
}

impl Visitor<String> for &mut Describe {
    type Output = String;
    fn visit(&mut self, x: &String) -> String {
        self.seen += 1;
        format!("string {:?}", x)
    }
}

impl Visitor<bool> for &mut Describe {
    type Output = String;
    fn visit(&mut self, x: &bool) -> String {
        self.seen += 1;
        format!("bool {}", x)
    }
}

struct Increment;

impl VisitorMut<i32> for Increment {
    type Output = ();
    fn visit_mut(&mut self, x: &mut i32) {
        *x += 1;
    }
}

impl VisitorMut<f32> for Increment {
    type Output = ();
    fn visit_mut(&mut self, x: &mut f32) {
        *x += 1.0;
    }
}

#[test]
fn index_and_holds_alternative() {
    let v = IntOrFloat::V0(3);
    assert_eq!(v.index(), 0);
    assert!(v.holds_alternative::<i32>());
    assert!(!v.holds_alternative::<f32>());
    assert!(!v.holds_alternative::<u8>());

    let w = IntOrFloat::new_at::<1>(1.5);
    assert_eq!(w.index(), 1);
    assert!(w.holds_alternative::<f32>());

    assert_eq!(IntOrFloat::ARITY, 2);
    assert_eq!(Variant3::<u8, u16, u32>::ARITY, 3);
    assert_eq!(Variant4::<u8, u16, u32, u64>::ARITY, 4);
}

#[test]
fn get_by_type() {
    let mut v = IntOrFloat::V0(3);
    assert_eq!(v.get::<i32>(), Ok(&3));
    *v.get_mut::<i32>().unwrap() = 2;
    assert_eq!(v.get::<i32>(), Ok(&2));
    assert_eq!(v.get_at::<0>(), Ok(&2));
    assert_eq!(v.get::<f32>(), Err(BadVariantAccess { held: 0 }));
    assert_eq!(v.get_mut::<f32>(), Err(BadVariantAccess { held: 0 }));
}

#[test]
fn get_if() {
    let mut v = IntOrFloat::V0(3);
    assert!(v.get_if::<i32>().is_some());
    assert!(v.get_if::<f32>().is_none());
    assert!(v.get_if_at::<0>().is_some());
    assert!(v.get_if_at::<1>().is_none());
    assert_eq!(v.get_if_at::<0>(), Some(&3));

    if let Some(x) = v.get_if_at_mut::<0>() {
        *x = 30;
    }
    assert_eq!(v.get_at_mut::<0>(), Ok(&mut 30));
    assert_eq!(v.get_at_mut::<1>(), Err(BadVariantAccess { held: 0 }));
    assert_eq!(v.get_if_mut::<f32>(), None);
}

#[test]
fn visit_unifies_return_type() {
    let v = IntOrFloat::V0(3);
    assert_eq!(v.visit(Widen), 3.0);
    assert_eq!(visit(Widen, &v), 3.0);

    let w = IntOrFloat::V1(0.5);
    assert_eq!(visit(Widen, &w), 0.5);
}

#[test]
fn visit_with_stateful_visitor() {
    let values = [
        Variant3::<i32, String, bool>::V0(7),
        Variant3::V1("seven".to_string()),
        Variant3::V2(true),
    ];

    let mut describe = Describe::default();
    let descriptions: Vec<String> = values.iter().map(|v| v.visit(&mut describe)).collect();

    assert_eq!(descriptions, ["int 7", "string \"seven\"", "bool true"]);
    assert_eq!(describe.seen, 3);
}

#[test]
fn visit_mut_updates_in_place() {
    let mut values = [IntOrFloat::V0(1), IntOrFloat::V1(2.5)];
    for v in &mut values {
        v.visit_mut(Increment);
    }
    assert_eq!(values, [IntOrFloat::V0(2), IntOrFloat::V1(3.5)]);
}

#[test]
fn ordering_follows_index_first() {
    let mut values = vec![
        Variant2::<u8, u8>::V1(0),
        Variant2::V0(9),
        Variant2::V1(5),
        Variant2::V0(1),
    ];
    values.sort();
    assert_eq!(
        values,
        [
            Variant2::V0(1),
            Variant2::V0(9),
            Variant2::V1(0),
            Variant2::V1(5)
        ]
    );
}

#[test]
fn same_type_alternatives_are_told_apart_by_index() {
    let v = Variant2::<u8, u8>::V1(4);
    assert_eq!(v.get_at::<0>(), Err(BadVariantAccess { held: 1 }));
    assert_eq!(v.get_at::<1>(), Ok(&4));
    assert_eq!(v.get::<u8>(), Ok(&4));
}
