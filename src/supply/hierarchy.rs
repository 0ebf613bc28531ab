//! Supplier hierarchy: level computation and cycle prevention.
//!
//! Nodes form a forest through their optional `supplier` reference. The level
//! of a node is the number of supplier links followed before reaching a node
//! that has no supplier (a factory). Levels are never stored; they are
//! recomputed from the current links every time a node is read.
//!
//! The store does not prevent cycles, so every walk here is bounded: a
//! revisited node or a chain longer than the configured limit is reported as
//! an error instead of looping forever.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::database::models::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("node {0} cannot be its own supplier")]
    SelfSupplier(NodeId),

    #[error("supplier chain of node {node} loops back through node {repeated}")]
    Cycle { node: NodeId, repeated: NodeId },

    #[error("supplier chain of node {node} is longer than {limit} links")]
    DepthLimitExceeded { node: NodeId, limit: u32 },
}

/// Read access to the `id -> supplier` relation.
pub trait SupplierLookup {
    /// Supplier of `id`, or `None` for a root or an id the lookup does not know.
    fn supplier_of(&self, id: NodeId) -> Option<NodeId>;
}

/// Arena of supplier links keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierLinks {
    links: HashMap<NodeId, Option<NodeId>>,
}

impl SupplierLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, supplier: Option<NodeId>) {
        self.links.insert(id, supplier);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.links.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl FromIterator<(NodeId, Option<NodeId>)> for SupplierLinks {
    fn from_iter<I: IntoIterator<Item = (NodeId, Option<NodeId>)>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl SupplierLookup for SupplierLinks {
    fn supplier_of(&self, id: NodeId) -> Option<NodeId> {
        self.links.get(&id).copied().flatten()
    }
}

/// Number of supplier links between `start` and its root.
pub fn depth<L>(links: &L, start: NodeId, max_depth: u32) -> Result<u32, HierarchyError>
where
    L: SupplierLookup + ?Sized,
{
    let mut level = 0u32;
    let mut current = start;
    let mut seen = HashSet::from([start]);

    while let Some(next) = links.supplier_of(current) {
        if level >= max_depth {
            return Err(HierarchyError::DepthLimitExceeded { node: start, limit: max_depth });
        }
        if !seen.insert(next) {
            return Err(HierarchyError::Cycle { node: start, repeated: next });
        }
        level += 1;
        current = next;
    }

    Ok(level)
}

/// Suppliers of `start` from the nearest up to the root.
pub fn ancestors<L>(links: &L, start: NodeId, max_depth: u32) -> Result<Vec<NodeId>, HierarchyError>
where
    L: SupplierLookup + ?Sized,
{
    let mut chain = Vec::new();
    let mut current = start;
    let mut seen = HashSet::from([start]);

    while let Some(next) = links.supplier_of(current) {
        if chain.len() as u32 >= max_depth {
            return Err(HierarchyError::DepthLimitExceeded { node: start, limit: max_depth });
        }
        if !seen.insert(next) {
            return Err(HierarchyError::Cycle { node: start, repeated: next });
        }
        chain.push(next);
        current = next;
    }

    Ok(chain)
}

/// Levels of clients hanging below `root`; 0 when it has none.
///
/// `clients` holds the links of the nodes below `root`, as loaded by
/// `SupplyRepository::client_links`.
pub fn height(clients: &SupplierLinks, root: NodeId, max_depth: u32) -> Result<u32, HierarchyError> {
    let mut below: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for (&id, &supplier) in &clients.links {
        if let Some(supplier) = supplier {
            below.entry(supplier).or_default().push(id);
        }
    }

    let mut seen = HashSet::from([root]);
    let mut frontier = vec![root];
    let mut levels = 0u32;
    loop {
        let next: Vec<NodeId> = frontier
            .iter()
            .filter_map(|id| below.get(id))
            .flatten()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if next.is_empty() {
            return Ok(levels);
        }
        levels += 1;
        if levels > max_depth {
            return Err(HierarchyError::DepthLimitExceeded { node: root, limit: max_depth });
        }
        frontier = next;
    }
}

/// Checks that making `supplier` the supplier of `node` keeps every chain
/// acyclic and within `max_depth`.
///
/// `node` is `None` for a node that does not exist yet. `links` must cover
/// `supplier` and all of its ancestors; `clients_height` is the `height` of
/// the subtree below `node`, which moves along with it.
pub fn ensure_acyclic<L>(
    links: &L,
    node: Option<NodeId>,
    supplier: NodeId,
    clients_height: u32,
    max_depth: u32,
) -> Result<(), HierarchyError>
where
    L: SupplierLookup + ?Sized,
{
    if node == Some(supplier) {
        return Err(HierarchyError::SelfSupplier(supplier));
    }

    let chain = ancestors(links, supplier, max_depth)?;
    if let Some(node) = node {
        if chain.contains(&node) {
            return Err(HierarchyError::Cycle { node, repeated: supplier });
        }
    }

    // deepest client ends up: supplier's chain, the new link, then the subtree
    if chain.len() as u32 + 1 + clients_height > max_depth {
        return Err(HierarchyError::DepthLimitExceeded {
            node: node.unwrap_or(supplier),
            limit: max_depth,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u32 = 1000;

    fn chain() -> SupplierLinks {
        // 1 <- 2 <- 3, and 4 as a second client of 1
        [(1, None), (2, Some(1)), (3, Some(2)), (4, Some(1))]
            .into_iter()
            .collect()
    }

    #[test]
    fn root_has_level_zero() {
        assert_eq!(depth(&chain(), 1, LIMIT).unwrap(), 0);
    }

    #[test]
    fn level_is_supplier_level_plus_one() {
        let links = chain();
        for id in [2, 3, 4] {
            let supplier = links.supplier_of(id).unwrap();
            assert_eq!(
                depth(&links, id, LIMIT).unwrap(),
                depth(&links, supplier, LIMIT).unwrap() + 1
            );
        }
        assert_eq!(depth(&links, 3, LIMIT).unwrap(), 2);
    }

    #[test]
    fn unknown_node_counts_as_root() {
        assert_eq!(depth(&chain(), 42, LIMIT).unwrap(), 0);
    }

    #[test]
    fn detaching_the_root_shifts_levels_down() {
        // deleting node 1 clears the supplier of its clients
        let links: SupplierLinks = [(2, None), (3, Some(2)), (4, None)].into_iter().collect();
        assert_eq!(depth(&links, 2, LIMIT).unwrap(), 0);
        assert_eq!(depth(&links, 3, LIMIT).unwrap(), 1);
        assert_eq!(depth(&links, 4, LIMIT).unwrap(), 0);
    }

    #[test]
    fn cycle_is_reported_not_looped() {
        let links: SupplierLinks = [(1, Some(3)), (2, Some(1)), (3, Some(2))].into_iter().collect();
        assert!(matches!(depth(&links, 1, LIMIT), Err(HierarchyError::Cycle { node: 1, .. })));
    }

    #[test]
    fn long_chain_hits_the_limit() {
        let links: SupplierLinks = (1..=10).map(|id| (id, if id == 1 { None } else { Some(id - 1) })).collect();
        assert_eq!(depth(&links, 10, 9).unwrap(), 9);
        assert_eq!(
            depth(&links, 10, 8),
            Err(HierarchyError::DepthLimitExceeded { node: 10, limit: 8 })
        );
    }

    #[test]
    fn ancestors_are_nearest_first() {
        assert_eq!(ancestors(&chain(), 3, LIMIT).unwrap(), vec![2, 1]);
        assert!(ancestors(&chain(), 1, LIMIT).unwrap().is_empty());
    }

    #[test]
    fn self_supplier_is_rejected() {
        assert_eq!(ensure_acyclic(&chain(), Some(2), 2, 0, LIMIT), Err(HierarchyError::SelfSupplier(2)));
    }

    #[test]
    fn descendant_as_supplier_is_rejected() {
        // making 3 the supplier of 1 would close 1 <- 2 <- 3 <- 1
        assert!(matches!(
            ensure_acyclic(&chain(), Some(1), 3, 2, LIMIT),
            Err(HierarchyError::Cycle { node: 1, repeated: 3 })
        ));
    }

    #[test]
    fn sibling_as_supplier_is_allowed() {
        assert!(ensure_acyclic(&chain(), Some(4), 3, 0, LIMIT).is_ok());
        assert!(ensure_acyclic(&chain(), None, 3, 0, LIMIT).is_ok());
    }

    #[test]
    fn height_counts_levels_below_the_root() {
        let below_1: SupplierLinks = [(2, Some(1)), (3, Some(2)), (4, Some(1))].into_iter().collect();
        assert_eq!(height(&below_1, 1, LIMIT).unwrap(), 2);
        assert_eq!(height(&SupplierLinks::new(), 3, LIMIT).unwrap(), 0);
        assert_eq!(
            height(&below_1, 1, 1),
            Err(HierarchyError::DepthLimitExceeded { node: 1, limit: 1 })
        );
    }

    #[test]
    fn moved_subtree_must_fit_under_the_limit() {
        // 3 sits at level 2; hanging 5 <- 6 below it puts 6 at level 4
        let links = chain();
        assert_eq!(
            ensure_acyclic(&links, Some(5), 3, 1, 3),
            Err(HierarchyError::DepthLimitExceeded { node: 5, limit: 3 })
        );
        assert!(ensure_acyclic(&links, Some(5), 3, 1, 4).is_ok());
        assert!(ensure_acyclic(&links, Some(5), 3, 0, 3).is_ok());
    }

    #[test]
    fn new_node_under_a_full_chain_is_rejected() {
        assert!(matches!(
            ensure_acyclic(&chain(), None, 3, 0, 2),
            Err(HierarchyError::DepthLimitExceeded { node: 3, limit: 2 })
        ));
    }
}
