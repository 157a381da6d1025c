use alloc::string::String;
use core::fmt::{self, Write};

use super::AvlIndex;
use crate::raw::{Handle, RawAvlTree};

impl<K: fmt::Debug, V: fmt::Debug, C, E> AvlIndex<K, V, C, E> {
    /// Renders the tree shape for debugging.
    ///
    /// Each node is a `* key` line indented two spaces per level, left subtree
    /// before right. When a node has exactly one child, the missing one is shown
    /// as a bare `*`. With `with_values`, each key line is followed by a line
    /// listing that key's values.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlIndex;
    ///
    /// let mut index = AvlIndex::new();
    /// for k in [2, 1, 3] {
    ///     index.insert(k, ()).unwrap();
    /// }
    /// assert_eq!(index.pretty_print(false), "* 2\n  * 1\n  * 3\n");
    /// ```
    #[must_use]
    pub fn pretty_print(&self, with_values: bool) -> String {
        let mut out = String::new();
        if let Some(root) = self.raw.root() {
            write_node(&self.raw, root, with_values, 0, &mut out)
                .expect("`AvlIndex::pretty_print()` - writing to a `String` failed!");
        }
        out
    }
}

fn write_node<K: fmt::Debug, V: fmt::Debug>(
    tree: &RawAvlTree<K, V>,
    handle: Handle,
    with_values: bool,
    depth: usize,
    out: &mut String,
) -> fmt::Result {
    let node = tree.node(handle);
    let indent = depth * 2;
    writeln!(out, "{:indent$}* {:?}", "", node.key())?;
    if with_values {
        writeln!(out, "{:indent$}* {:?}", "", node.values())?;
    }

    if node.is_leaf() {
        return Ok(());
    }
    for child in [node.left(), node.right()] {
        match child {
            Some(child) => write_node(tree, child, with_values, depth + 1, out)?,
            None => writeln!(out, "{:width$}*", "", width = indent + 2)?,
        }
    }
    Ok(())
}

impl<K: fmt::Debug, V: fmt::Debug, C, E> fmt::Debug for AvlIndex<K, V, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
