//! Shared traversal of MJCF documents
//!
//! Both the topology parser and the visual geometry loader walk the same
//! body tree. The walk is an explicit pre-order traversal so that indices
//! handed out here always satisfy `parent < child`.

use roxmltree::{Document, Node};

use crate::error::{MjcfError, Result};

/// One `<body>` visited during pre-order traversal
#[derive(Debug, Clone, Copy)]
pub struct BodyVisit<'a, 'input> {
    /// Index in visitation order
    pub index: usize,
    /// Parent index, `None` for the root body
    pub parent: Option<usize>,
    pub node: Node<'a, 'input>,
}

impl BodyVisit<'_, '_> {
    /// Body name, generated from the index when the element is unnamed
    pub fn name(&self) -> String {
        match self.node.attribute("name") {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("body_{}", self.index),
        }
    }
}

/// Direct element children of `node` with the given tag
pub fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == tag)
}

/// First direct element child of `node` with the given tag
pub fn first_child<'a, 'input>(node: Node<'a, 'input>, tag: &'static str) -> Option<Node<'a, 'input>> {
    child_elements(node, tag).next()
}

/// The top-level body under `<worldbody>`
pub fn root_body<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    let worldbody = first_child(doc.root_element(), "worldbody")
        .ok_or_else(|| MjcfError::MissingElement("worldbody".to_string()))?;
    first_child(worldbody, "body").ok_or_else(|| MjcfError::MissingElement("body".to_string()))
}

/// Visit every body below (and including) the root body in pre-order
pub fn preorder_bodies<'a, 'input>(doc: &'a Document<'input>) -> Result<Vec<BodyVisit<'a, 'input>>> {
    let root = root_body(doc)?;

    let mut visits = Vec::new();
    let mut stack: Vec<(Node<'a, 'input>, Option<usize>)> = vec![(root, None)];

    while let Some((node, parent)) = stack.pop() {
        let index = visits.len();
        visits.push(BodyVisit {
            index,
            parent,
            node,
        });

        // Reverse so that siblings are visited in document order
        let children: Vec<_> = child_elements(node, "body").collect();
        for child in children.into_iter().rev() {
            stack.push((child, Some(index)));
        }
    }

    Ok(visits)
}
