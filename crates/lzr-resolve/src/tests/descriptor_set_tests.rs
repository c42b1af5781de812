use super::*;

#[test]
fn keeps_first_position_of_duplicates() {
    let a = Rc::new("a");
    let b = Rc::new("b");
    let mut set = DescriptorSet::new();
    assert!(set.insert(Rc::clone(&a)));
    assert!(set.insert(Rc::clone(&b)));
    assert!(!set.insert(Rc::clone(&a)));
    let items: Vec<&str> = set.iter().map(|item| **item).collect();
    assert_eq!(items, vec!["a", "b"]);
}

#[test]
fn equal_values_in_distinct_allocations_are_distinct() {
    let set: DescriptorSet<u32> = [Rc::new(1), Rc::new(1)].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn contains_is_by_address() {
    let one = Rc::new(1);
    let set: DescriptorSet<u32> = std::iter::once(Rc::clone(&one)).collect();
    assert!(set.contains(&one));
    assert!(!set.contains(&Rc::new(1)));
    assert!(!set.is_empty());
    assert_eq!(set.into_vec().len(), 1);
}
