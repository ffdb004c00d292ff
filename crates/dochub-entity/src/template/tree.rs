//! Parent→children index over a template's node forest.

use std::collections::HashMap;

use uuid::Uuid;

use super::model::TemplateNode;

/// An index over a template's nodes keyed by parent, with siblings in
/// ascending `sort_order`.
///
/// Root nodes (those with no parent) are keyed by `None` and materialize
/// as direct children of the entity root folder.
#[derive(Debug, Clone)]
pub struct TemplateTree {
    children: HashMap<Option<Uuid>, Vec<TemplateNode>>,
    total_nodes: usize,
}

impl TemplateTree {
    /// Build the index from a flat node list.
    pub fn build(nodes: Vec<TemplateNode>) -> Self {
        let total_nodes = nodes.len();
        let mut children: HashMap<Option<Uuid>, Vec<TemplateNode>> = HashMap::new();

        for node in nodes {
            children.entry(node.parent_id).or_default().push(node);
        }

        for siblings in children.values_mut() {
            siblings.sort_by_key(|n| n.sort_order);
        }

        Self {
            children,
            total_nodes,
        }
    }

    /// The root nodes of the forest, in sibling order.
    pub fn roots(&self) -> &[TemplateNode] {
        self.children.get(&None).map_or(&[], Vec::as_slice)
    }

    /// The children of a node, in sibling order.
    pub fn children_of(&self, node_id: Uuid) -> &[TemplateNode] {
        self.children.get(&Some(node_id)).map_or(&[], Vec::as_slice)
    }

    /// Total number of nodes in the template.
    pub fn len(&self) -> usize {
        self.total_nodes
    }

    /// Whether the template has no nodes.
    pub fn is_empty(&self) -> bool {
        self.total_nodes == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u128, parent: Option<u128>, name: &str, order: i32) -> TemplateNode {
        TemplateNode {
            id: Uuid::from_u128(id),
            template_id: Uuid::from_u128(999),
            parent_id: parent.map(Uuid::from_u128),
            name: name.to_string(),
            sort_order: order,
        }
    }

    #[test]
    fn test_roots_sorted_by_order() {
        let tree = TemplateTree::build(vec![
            node(2, None, "01. Contracts", 1),
            node(1, None, "00. Admin", 0),
            node(3, None, "02. Finance", 2),
        ]);
        let names: Vec<_> = tree.roots().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["00. Admin", "01. Contracts", "02. Finance"]);
    }

    #[test]
    fn test_children_keyed_by_parent() {
        let tree = TemplateTree::build(vec![
            node(1, None, "00. Admin", 0),
            node(2, Some(1), "Invoices", 1),
            node(3, Some(1), "Minutes", 0),
        ]);
        let names: Vec<_> = tree
            .children_of(Uuid::from_u128(1))
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, ["Minutes", "Invoices"]);
        assert!(tree.children_of(Uuid::from_u128(2)).is_empty());
    }

    #[test]
    fn test_empty_tree() {
        let tree = TemplateTree::build(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
    }
}
