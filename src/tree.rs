use std::collections::BTreeMap;

use crate::hashing::Hash32;
use crate::models::{FileMetadata, FileNode, FileTree, Node};

/// Shape of a walked directory. File leaves index into the scanned file list.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanNode {
    File(usize),
    Directory(BTreeMap<String, ScanNode>),
}

/// Insert a node into the walked tree, creating parent directories as needed
pub fn insert_into_tree(tree: &mut BTreeMap<String, ScanNode>, components: &[String], node: ScanNode) {
    let Some((name, rest)) = components.split_first() else {
        return;
    };

    if rest.is_empty() {
        // A directory may already exist if one of its children came first
        tree.entry(name.clone()).or_insert(node);
    } else {
        let entry = tree
            .entry(name.clone())
            .or_insert_with(|| ScanNode::Directory(BTreeMap::new()));
        if let ScanNode::Directory(map) = entry {
            insert_into_tree(map, rest, node);
        }
    }
}

/// Visit file indices in tree order: children by ascending name, depth first
pub fn for_each_file(tree: &BTreeMap<String, ScanNode>, visit: &mut impl FnMut(usize)) {
    for node in tree.values() {
        match node {
            ScanNode::File(index) => visit(*index),
            ScanNode::Directory(children) => for_each_file(children, visit),
        }
    }
}

/// Renumber file leaves with `remap(old_index)`
pub fn remap_files(tree: &mut BTreeMap<String, ScanNode>, remap: &mut impl FnMut(usize) -> usize) {
    for node in tree.values_mut() {
        match node {
            ScanNode::File(index) => *index = remap(*index),
            ScanNode::Directory(children) => remap_files(children, remap),
        }
    }
}

/// The file tree leaf for one file: `{"": {length, pieces root?}}`
pub fn file_node(length: u64, root: Option<Hash32>) -> Node {
    Node::File(FileNode {
        metadata: FileMetadata {
            length,
            pieces_root: root.map(|r| serde_bytes::ByteBuf::from(r.to_vec())),
        },
    })
}

/// Build the v2 file tree from a walked layout and per-file leaves
pub fn build_file_tree(layout: &BTreeMap<String, ScanNode>, leaf: &impl Fn(usize) -> Node) -> FileTree {
    layout
        .iter()
        .map(|(name, node)| {
            let node = match node {
                ScanNode::File(index) => leaf(*index),
                ScanNode::Directory(children) => Node::Directory(build_file_tree(children, leaf)),
            };
            (name.clone(), node)
        })
        .collect()
}
