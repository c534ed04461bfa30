//! Directory tree used for navigation.

use serde::{Deserialize, Serialize};

/// One directory in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Directory name.
    pub name: String,
    /// Path-qualified directory name.
    pub full_name: String,
    /// Child directories, sorted by name.
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Find the node for `full_name` in this subtree.
    pub fn find(&self, full_name: &str) -> Option<&TreeNode> {
        if self.full_name == full_name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(full_name))
    }

    /// Number of directories in this subtree, including this node.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }
}
