//! An editable copy of an expression tree, for interactive rewriting.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Each node knows its parent, so a
//! selected sub-expression can be replaced in place: the parent's child slot is pointed at the new
//! subtree, and the old subtree is left orphaned in the arena until [`Tree::compact`] drops it.

use btm_parser::Expr;
use crate::{compose::{compose, Substitution}, rules::Match};
use std::collections::HashMap;

/// The index of a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    /// The expression at this node, with each child replaced by a placeholder.
    head: Expr,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    selected: bool,
}

/// An arena-backed expression tree with parent links.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Copies an expression into a new tree.
    pub fn from_expr(expr: &Expr) -> Self {
        let mut tree = Self { nodes: Vec::new(), root: NodeId(0) };
        tree.root = tree.insert(expr, None);
        tree
    }

    /// Adds the subtree to the arena, returning the id of its root.
    fn insert(&mut self, expr: &Expr, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut head = expr.clone();
        for child in head.children_mut() {
            *child = Expr::default();
        }
        self.nodes.push(Node { head, children: Vec::new(), parent, selected: false });

        let children = expr.children()
            .into_iter()
            .map(|child| self.insert(child, Some(id)))
            .collect();
        self.nodes[id.0].children = children;
        id
    }

    /// Returns the root of the tree.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the parent of a node, or [`None`] for the root and orphaned nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Returns the children of a node, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Marks a node as selected or not.
    pub fn select(&mut self, id: NodeId, selected: bool) {
        self.nodes[id.0].selected = selected;
    }

    /// Returns true if the node is selected.
    pub fn selected(&self, id: NodeId) -> bool {
        self.nodes[id.0].selected
    }

    /// Returns the selected nodes that are still part of the tree, in pre-order.
    pub fn selection(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.selected(id) {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Rebuilds the expression rooted at a node.
    pub fn subtree(&self, id: NodeId) -> Expr {
        let node = &self.nodes[id.0];
        let mut expr = node.head.clone();
        for (slot, &child) in expr.children_mut().into_iter().zip(&node.children) {
            *slot = self.subtree(child);
        }
        expr
    }

    /// Rebuilds the whole expression.
    pub fn to_expr(&self) -> Expr {
        self.subtree(self.root)
    }

    /// Replaces the subtree at a node with a new expression, returning the id of the new subtree.
    /// The old subtree stays in the arena with no parent.
    pub fn replace(&mut self, id: NodeId, expr: &Expr) -> NodeId {
        let parent = self.nodes[id.0].parent;
        let new_id = self.insert(expr, parent);
        match parent {
            Some(parent) => {
                for slot in self.nodes[parent.0].children.iter_mut() {
                    if *slot == id {
                        *slot = new_id;
                    }
                }
            },
            None => self.root = new_id,
        }
        self.nodes[id.0].parent = None;
        new_id
    }

    /// Returns the number of nodes in the arena, orphaned ones included.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Drops every node that is no longer reachable from the root. Selection flags are kept.
    ///
    /// Node ids from before the call are invalidated; the returned map gives the new id of each
    /// node that survived.
    pub fn compact(&mut self) -> HashMap<NodeId, NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }

        let remap = order.iter()
            .enumerate()
            .map(|(new, &old)| (old, NodeId(new)))
            .collect::<HashMap<_, _>>();
        let nodes = order.iter()
            .map(|old| {
                let node = &self.nodes[old.0];
                Node {
                    head: node.head.clone(),
                    children: node.children.iter().map(|child| remap[child]).collect(),
                    parent: node.parent.map(|parent| remap[&parent]),
                    selected: node.selected,
                }
            })
            .collect();

        self.nodes = nodes;
        self.root = remap[&self.root];
        remap
    }

    /// Replaces the subtree at a node with the replacement offered by a rule. The `inputs` fill
    /// the placeholders `input1`, `input2`, ... of the replacement in order; placeholders with no
    /// input are kept.
    pub fn apply_match(&mut self, id: NodeId, found: &Match, inputs: &[Substitution]) -> NodeId {
        let bindings = inputs.iter()
            .enumerate()
            .map(|(i, input)| (format!("input{}", i + 1), input.clone()))
            .collect::<HashMap<_, _>>();
        let replacement = compose(found.substitution(), &bindings, &());
        self.replace(id, &replacement)
    }
}

#[cfg(test)]
mod tests {
    use btm_parser::parse;
    use crate::{options::Options, rules::RuleCatalog};
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn round_trip() {
        for source in ["3+2*(x+1)", "sin(x)^2", "D(x^2,x,3)", "a[k+1]-/y"] {
            let expr = parse(source);
            assert_eq!(Tree::from_expr(&expr).to_expr(), expr);
        }
    }

    #[test]
    fn parent_links() {
        let tree = Tree::from_expr(&parse("3+2*(x+1)"));
        let root = tree.root();
        assert_eq!(tree.parent(root), None);
        let product = tree.children(root)[1];
        assert_eq!(tree.parent(product), Some(root));
        assert_eq!(tree.subtree(product).to_string(), "2*(x+1)");
    }

    #[test]
    fn replace_rewires_parent() {
        let mut tree = Tree::from_expr(&parse("3+2*(x+1)"));
        let root = tree.root();
        let product = tree.children(root)[1];
        let new_id = tree.replace(product, &parse("2*x+2"));
        assert_eq!(tree.to_expr().to_string(), "3+(2*x+2)");
        assert_eq!(tree.parent(new_id), Some(root));
        assert_eq!(tree.parent(product), None);
        assert_eq!(tree.children(root)[1], new_id);
    }

    #[test]
    fn replace_root() {
        let mut tree = Tree::from_expr(&parse("x*1"));
        let new_root = tree.replace(tree.root(), &parse("x"));
        assert_eq!(tree.root(), new_root);
        assert_eq!(tree.to_expr().to_string(), "x");
    }

    #[test]
    fn compact_drops_orphans() {
        let mut tree = Tree::from_expr(&parse("a+b*c"));
        let product = tree.children(tree.root())[1];
        tree.select(tree.children(tree.root())[0], true);
        for _ in 0..50 {
            let current = tree.children(tree.root())[1];
            tree.replace(current, &parse("b*c"));
        }
        assert_eq!(tree.arena_len(), 5 + 50 * 3);

        let remap = tree.compact();
        assert_eq!(tree.arena_len(), 5);
        assert!(!remap.contains_key(&product));
        assert_eq!(tree.to_expr().to_string(), "a+b*c");
        assert_eq!(tree.selection(), vec![tree.children(tree.root())[0]]);

        let root = tree.root();
        for &child in tree.children(root) {
            assert_eq!(tree.parent(child), Some(root));
        }
    }

    #[test]
    fn selection() {
        let mut tree = Tree::from_expr(&parse("a+b*c"));
        let root = tree.root();
        let product = tree.children(root)[1];
        tree.select(product, true);
        assert!(tree.selected(product));
        assert_eq!(tree.selection(), vec![product]);

        tree.replace(product, &parse("d"));
        assert!(tree.selection().is_empty());
    }

    #[test]
    fn apply_rule_with_input() {
        let mut catalog = RuleCatalog::new();
        catalog.add_rule("x==x*a/a", "Multiply by One", true, true, &Options::default()).unwrap();

        let mut tree = Tree::from_expr(&parse("y+1"));
        let target = tree.children(tree.root())[0];
        let found = catalog.find_match_rules(&tree.subtree(target), true);
        assert_eq!(found[0].num_inputs, 1);

        tree.apply_match(target, &found[0], &["3".into()]);
        assert_eq!(tree.to_expr().to_string(), "y*3/3+1");
    }
}
