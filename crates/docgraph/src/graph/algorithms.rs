//! Graph ordering algorithms.
//!
//! Provides the topological sort the inheritance linker uses to process
//! every class after its documented ancestors.

use indexmap::{IndexMap, IndexSet};
use std::hash::Hash;

/// Topologically sort a dependency graph.
///
/// `graph` maps each item to the items it depends on. Items that only occur
/// as dependencies come first, then items are peeled in rounds: every item
/// whose remaining dependencies are all emitted is emitted next. Order is
/// deterministic and follows insertion order within each round.
///
/// # Returns
/// The ordered items, or `Err` with every item that could not be ordered
/// when the graph contains a cycle.
pub fn toposort<T>(graph: &IndexMap<T, IndexSet<T>>) -> Result<Vec<T>, Vec<T>>
where
    T: Copy + Eq + Hash,
{
    let mut emitted: IndexSet<T> = IndexSet::new();

    for deps in graph.values() {
        for dep in deps {
            if !graph.contains_key(dep) {
                emitted.insert(*dep);
            }
        }
    }

    let mut remaining: IndexMap<T, IndexSet<T>> = graph
        .iter()
        .map(|(item, deps)| {
            let pending: IndexSet<T> = deps.iter().filter(|d| !emitted.contains(*d)).copied().collect();
            (*item, pending)
        })
        .collect();

    loop {
        let ready: Vec<T> = remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(item, _)| *item)
            .collect();
        if ready.is_empty() {
            break;
        }

        for item in &ready {
            remaining.shift_remove(item);
            emitted.insert(*item);
        }
        for deps in remaining.values_mut() {
            deps.retain(|dep| !ready.contains(dep));
        }
    }

    if remaining.is_empty() {
        Ok(emitted.into_iter().collect())
    } else {
        Err(remaining.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(u32, &[u32])]) -> IndexMap<u32, IndexSet<u32>> {
        edges
            .iter()
            .map(|(item, deps)| (*item, deps.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn test_linear_chain() {
        // D -> C -> B -> A, listed leaf-first
        let g = graph(&[(4, &[3, 2, 1]), (3, &[2, 1]), (2, &[1]), (1, &[])]);
        assert_eq!(toposort(&g).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_dependency_only_items_first() {
        let g = graph(&[(2, &[10]), (3, &[2])]);
        assert_eq!(toposort(&g).unwrap(), vec![10, 2, 3]);
    }

    #[test]
    fn test_independent_items_keep_insertion_order() {
        let g = graph(&[(5, &[]), (1, &[]), (3, &[])]);
        assert_eq!(toposort(&g).unwrap(), vec![5, 1, 3]);
    }

    #[test]
    fn test_cycle_reports_members() {
        let g = graph(&[(1, &[2]), (2, &[1]), (3, &[])]);
        let mut unresolved = toposort(&g).unwrap_err();
        unresolved.sort();
        assert_eq!(unresolved, vec![1, 2]);
    }

    #[test]
    fn test_cycle_reports_dependents() {
        let g = graph(&[(1, &[2]), (2, &[1]), (3, &[1])]);
        let unresolved = toposort(&g).unwrap_err();
        assert_eq!(unresolved.len(), 3);
    }

    #[test]
    fn test_empty_graph() {
        let g: IndexMap<u32, IndexSet<u32>> = IndexMap::new();
        assert!(toposort(&g).unwrap().is_empty());
    }
}
