//! Immutable parse trees.
//!
//! A [`Tree`] is produced by an [`IncrementalParser`](crate::IncrementalParser) for one committed
//! buffer version and is never mutated afterwards; stores hand it out behind an `Arc`.
//!
//! Nodes live in a flat arena indexed by [`NodeId`]. The root is always [`Tree::root`]. Leaves
//! own their literal text and are additionally indexed in source order so consumers (folding,
//! delimiter matching) can walk them without recursion.
//!
//! All offsets are **character** offsets into the tree's source text, half-open.

use crate::matcher::DelimiterToken;
use crate::tags::Tag;
use std::ops::Range;
use std::sync::Arc;

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of a [`Tree`].
#[derive(Debug, Clone)]
pub struct Node {
    tags: Box<[Tag]>,
    start: usize,
    end: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: Option<Box<str>>,
}

impl Node {
    /// Structural tags of this node.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Whether this node carries `tag`.
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Start character offset.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End character offset (exclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    /// Character range covered by this node.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in source order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Literal text for leaves, `None` for inner nodes.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.text.is_some()
    }
}

/// A borrowed view of a leaf token.
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> Leaf<'a> {
    /// The leaf's node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn node(&self) -> &'a Node {
        &self.tree.nodes[self.id.index()]
    }

    /// Literal source text of the leaf.
    pub fn text(&self) -> &'a str {
        self.node().text.as_deref().unwrap_or_default()
    }

    /// Start character offset.
    pub fn start(&self) -> usize {
        self.node().start
    }

    /// End character offset (exclusive).
    pub fn end(&self) -> usize {
        self.node().end
    }

    /// Structural tags of the leaf.
    pub fn tags(&self) -> &'a [Tag] {
        &self.node().tags
    }

    /// Whether the leaf carries `tag`.
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.node().has_tag(tag)
    }

    /// Immediate structural parent.
    pub fn parent(&self) -> Option<NodeId> {
        self.node().parent
    }

    /// Whether the immediate parent spans more than one source line.
    pub fn parent_spans_multiple_lines(&self) -> bool {
        self.parent()
            .is_some_and(|parent| self.tree.spans_multiple_lines(parent))
    }
}

impl DelimiterToken for Leaf<'_> {
    fn glyph(&self) -> &str {
        self.text()
    }

    fn start_offset(&self) -> usize {
        self.start()
    }

    fn end_offset(&self) -> usize {
        self.end()
    }
}

/// An immutable parse tree for one buffer version.
#[derive(Debug, Clone)]
pub struct Tree {
    text: Arc<str>,
    nodes: Vec<Node>,
    leaves: Vec<NodeId>,
    /// Character offsets of every `'\n'` in `text`, ascending.
    line_breaks: Vec<usize>,
    char_count: usize,
    version: u64,
    broken: bool,
}

impl Tree {
    /// The root node id.
    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Parent of `id`, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Number of nodes (root included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Leaves in source order.
    pub fn leaves(&self) -> impl Iterator<Item = Leaf<'_>> + '_ {
        self.leaves.iter().map(move |&id| Leaf { tree: self, id })
    }

    /// Source text this tree was built from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shared handle on the source text.
    pub fn shared_text(&self) -> Arc<str> {
        self.text.clone()
    }

    /// Number of characters in the source text.
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Build version the tree was produced for.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether parsing failed to fully resolve structure.
    ///
    /// A broken tree still exposes every leaf it managed to read.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Zero-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_breaks.partition_point(|&brk| brk < offset)
    }

    /// Number of lines in the source text.
    pub fn line_count(&self) -> usize {
        self.line_breaks.len() + 1
    }

    /// Whether node `id` covers at least one line break.
    pub fn spans_multiple_lines(&self, id: NodeId) -> bool {
        let node = self.node(id);
        let before_start = self.line_breaks.partition_point(|&brk| brk < node.start);
        let before_end = self.line_breaks.partition_point(|&brk| brk < node.end);
        before_end > before_start
    }
}

/// Builds a [`Tree`] from parser events.
///
/// Nodes must be started and leaves added in source order.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    leaves: Vec<NodeId>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    /// Create a builder whose root node is already open.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                tags: Box::new([Tag::ROOT]),
                start: 0,
                end: 0,
                parent: None,
                children: Vec::new(),
                text: None,
            }],
            leaves: Vec::new(),
            open: vec![NodeId::new(0)],
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId::new(0))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let parent = node.parent;
        self.nodes.push(node);
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    /// Open an inner node starting at `start`.
    pub fn start_node(&mut self, tags: impl IntoIterator<Item = Tag>, start: usize) -> NodeId {
        let id = self.push(Node {
            tags: tags.into_iter().collect(),
            start,
            end: start,
            parent: Some(self.current()),
            children: Vec::new(),
            text: None,
        });
        self.open.push(id);
        id
    }

    /// Add a leaf under the currently open node.
    pub fn leaf(
        &mut self,
        tags: impl IntoIterator<Item = Tag>,
        start: usize,
        text: &str,
    ) -> NodeId {
        let id = self.push(Node {
            tags: tags.into_iter().collect(),
            start,
            end: start + text.chars().count(),
            parent: Some(self.current()),
            children: Vec::new(),
            text: Some(text.into()),
        });
        self.leaves.push(id);
        id
    }

    /// Close the innermost open node at `end`.
    ///
    /// Returns `None` when only the root is open; the root is closed by [`TreeBuilder::finish`].
    pub fn finish_node(&mut self, end: usize) -> Option<NodeId> {
        if self.open.len() <= 1 {
            return None;
        }
        let id = self.open.pop()?;
        self.nodes[id.index()].end = end;
        Some(id)
    }

    /// Number of open nodes, root excluded.
    pub fn depth(&self) -> usize {
        self.open.len().saturating_sub(1)
    }

    /// Tags of the innermost open node.
    pub fn current_tags(&self) -> &[Tag] {
        &self.nodes[self.current().index()].tags
    }

    /// Seal the tree.
    ///
    /// Nodes still open are closed at the end of `text` and mark the tree broken.
    pub fn finish(mut self, text: impl Into<Arc<str>>, version: u64, broken: bool) -> Tree {
        let text: Arc<str> = text.into();
        let mut char_count = 0;
        let mut line_breaks = Vec::new();
        for (idx, ch) in text.chars().enumerate() {
            if ch == '\n' {
                line_breaks.push(idx);
            }
            char_count = idx + 1;
        }

        let unclosed = self.depth() > 0;
        while self.finish_node(char_count).is_some() {}
        self.nodes[0].end = char_count;

        Tree {
            text,
            nodes: self.nodes,
            leaves: self.leaves,
            line_breaks,
            char_count,
            version,
            broken: broken || unclosed,
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
