use super::*;
use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};

#[test]
fn test_computes_once_and_caches() {
    let cell = LazyCell::new();
    let runs = Cell::new(0);
    let compute = || {
        runs.set(runs.get() + 1);
        42
    };
    assert_eq!(cell.get_or_compute(compute, |_| 0), 42);
    assert_eq!(cell.get_or_compute(|| 7, |_| 0), 42);
    assert_eq!(runs.get(), 1);
    assert!(cell.is_computed());
    assert_eq!(cell.state(), SlotState::Computed);
}

#[test]
fn test_reentrant_read_gets_fallback_and_outer_result_is_kept() {
    let cell: LazyCell<Vec<&'static str>> = LazyCell::new();
    let inner_seen = RefCell::new(None);
    let value = cell.get_or_compute(
        || {
            let inner = cell.get_or_compute(|| vec!["inner"], |_| vec!["fallback"]);
            *inner_seen.borrow_mut() = Some(inner);
            vec!["outer"]
        },
        |_| vec!["fallback"],
    );
    assert_eq!(value, vec!["outer"]);
    assert_eq!(inner_seen.into_inner(), Some(vec!["fallback"]));
    assert_eq!(cell.peek(), Some(vec!["outer"]));
}

#[test]
fn test_first_time_flag_only_on_first_detection() {
    let cell: LazyCell<u32> = LazyCell::new();
    let flags = RefCell::new(Vec::new());
    cell.get_or_compute(
        || {
            for _ in 0..3 {
                cell.get_or_compute(
                    || 1,
                    |first| {
                        flags.borrow_mut().push(first);
                        0
                    },
                );
            }
            assert_eq!(cell.state(), SlotState::RecursionDetected);
            5
        },
        |_| 0,
    );
    assert_eq!(flags.into_inner(), vec![true, false, false]);
    assert_eq!(cell.state(), SlotState::Computed);
}

#[test]
fn test_panic_leaves_cell_uncomputed() {
    let cell: LazyCell<u32> = LazyCell::new();
    let result = catch_unwind(AssertUnwindSafe(|| {
        cell.get_or_compute(|| panic!("resolution failed"), |_| 0)
    }));
    assert!(result.is_err());
    assert_eq!(cell.state(), SlotState::NotComputed);
    assert!(!cell.is_computing());
    assert_eq!(cell.get_or_compute(|| 3, |_| 0), 3);
}

#[test]
fn test_error_result_allows_retry() {
    let cell: LazyCell<u32> = LazyCell::new();
    let first: Result<u32, &str> = cell.try_get_or_compute(|| Err("missing"), |_| Ok(0));
    assert_eq!(first, Err("missing"));
    assert!(!cell.is_computed());
    let second: Result<u32, &str> = cell.try_get_or_compute(|| Ok(9), |_| Ok(0));
    assert_eq!(second, Ok(9));
}

#[test]
fn test_post_compute_sees_published_value() {
    let cell: LazyCell<u32> = LazyCell::new();
    let observed = Cell::new(None);
    cell.get_or_compute_with_post(
        || 11,
        |_| 0,
        |value| {
            observed.set(Some(*value));
            // Reading the cell from post-compute returns the stored value.
            assert_eq!(cell.get_or_compute(|| 99, |_| 0), 11);
        },
    );
    assert_eq!(observed.get(), Some(11));
}

#[test]
fn test_lazy_value_recursion_tolerant() {
    use std::rc::{Rc, Weak};

    struct Node {
        value: LazyValue<u32>,
    }
    let node = Rc::new_cyclic(|weak: &Weak<Node>| {
        let weak = weak.clone();
        Node {
            value: LazyValue::recursion_tolerant(
                move || weak.upgrade().map_or(0, |node| node.value.get() + 1),
                100,
            ),
        }
    });
    assert_eq!(node.value.get(), 101);
    assert!(node.value.is_computed());
}

#[test]
fn test_lazy_value_without_fallback_panics_on_recursion() {
    use std::rc::{Rc, Weak};

    struct Node {
        value: LazyValue<u32>,
    }
    let node = Rc::new_cyclic(|weak: &Weak<Node>| {
        let weak = weak.clone();
        Node {
            value: LazyValue::new(move || weak.upgrade().map_or(0, |node| node.value.get())),
        }
    });
    let result = catch_unwind(AssertUnwindSafe(|| node.value.get()));
    assert!(result.is_err());
    assert!(!node.value.is_computing());
}
