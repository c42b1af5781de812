//! Recursion fallback through chains of independent cells.
//!
//! These mirror how member scopes use storage: a table entry whose
//! computation reaches, through other tables, back to itself.

use lzr_storage::{MemoTable, StorageManager};
use std::rc::Rc;

/// Route `lzr::storage` events to the test output when `LZR_LOG` is set.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("LZR_LOG"))
        .with_test_writer()
        .try_init();
}

/// A tiny "class graph": each node's member list is its own name plus
/// the members of its supertypes, memoized per node.
struct Graph {
    supertypes: Vec<Vec<usize>>,
    members: MemoTable<usize, Rc<[usize]>>,
}

impl Graph {
    fn new(manager: &StorageManager, supertypes: Vec<Vec<usize>>) -> Self {
        Graph {
            supertypes,
            members: manager.memo_table("members"),
        }
    }

    fn members(&self, node: usize) -> Rc<[usize]> {
        self.members.invoke(
            &node,
            |&node| {
                let mut result = vec![node];
                for &sup in &self.supertypes[node] {
                    for member in self.members(sup).iter() {
                        if !result.contains(member) {
                            result.push(*member);
                        }
                    }
                }
                result.into()
            },
            |_, _| Rc::from(Vec::new()),
        )
    }
}

#[test]
fn test_acyclic_hierarchy_collects_all_members() {
    let manager = StorageManager::new("acyclic");
    let graph = Graph::new(&manager, vec![vec![1, 2], vec![2], vec![]]);
    assert_eq!(&*graph.members(0), &[0, 1, 2]);
    assert_eq!(&*graph.members(1), &[1, 2]);
    assert_eq!(manager.stats().recursion_hits(), 0);
}

#[test]
fn test_cycle_terminates_with_fallback_for_reentrant_call() {
    init_logging();
    let manager = StorageManager::new("cyclic");
    // 0 -> 1 -> 2 -> 0
    let graph = Graph::new(&manager, vec![vec![1], vec![2], vec![0]]);
    let outer = graph.members(0);
    assert_eq!(&*outer, &[0, 1, 2]);
    assert_eq!(manager.stats().recursion_hits(), 1);
    // Inner nodes were computed while 0 was in flight and kept that view.
    assert_eq!(&*graph.members(2), &[2]);
    assert_eq!(&*graph.members(1), &[1, 2]);
    // Repeated calls are stable.
    assert_eq!(&*graph.members(0), &*outer);
}

#[test]
fn test_deep_chain_is_linear() {
    let manager = StorageManager::new("deep");
    let depth = 200;
    let supertypes = (0..depth)
        .map(|i| if i + 1 < depth { vec![i + 1] } else { Vec::new() })
        .collect();
    let graph = Graph::new(&manager, supertypes);
    assert_eq!(graph.members(0).len(), depth);
    assert_eq!(manager.stats().computations(), depth as u64);
}
