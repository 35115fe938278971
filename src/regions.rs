//! Markup regions: named, editable blocks of the main document.
//!
//! The composer builds the document as a [`Tree`] of nodes instead of one
//! string. Named regions are nodes of their own, and partials can register
//! [`Edit`]s against them by id. Edits run after every partial has rendered,
//! in the order they were registered, so a later edit sees the result of an
//! earlier one.
//!
//! ```text
//! html
//! ├── head#html-head          frame region: prepend/append only
//! │   ├── <style> hide        pinned
//! │   ├── <noscript> reveal   pinned
//! │   └── meta, title, links, metadata, styles
//! └── body#html-body          frame region: prepend/append only
//!     ├── <script> dark mode  pinned
//!     ├── header              region
//!     ├── main                region (page layout)
//!     ├── footer              region
//!     ├── <style> reveal      pinned
//!     └── scripts             pinned
//! ```
//!
//! Pinned nodes hold the flash-prevention styles and the dark-mode bootstrap.
//! No edit moves, replaces or removes them, and prepend/append on a region
//! lands on the inner side of its pinned nodes. This keeps the hide style in
//! front of every piece of visible content and the reveal style behind it.

use maud::{Markup, PreEscaped, Render, html};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("no region with id '{0}'")]
    UnknownRegion(String),
    #[error("region '{id}' is part of the document frame and only accepts prepend/append, not {op}")]
    FrameRegion { id: String, op: &'static str },
    #[error("region '{0}' holds pinned markup and cannot be replaced or removed")]
    Pinned(String),
}

/// How a region shows up in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionElement {
    /// Rendered as `<head id="...">`.
    Head,
    /// Rendered as `<body id="...">`.
    Body,
    /// No wrapper element; only the children are emitted.
    Virtual,
}

impl RegionElement {
    pub fn is_frame(self) -> bool {
        matches!(self, Self::Head | Self::Body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: String,
    pub element: RegionElement,
    pub children: Vec<Node>,
}

impl Region {
    pub fn new(id: impl Into<String>, element: RegionElement, children: Vec<Node>) -> Self {
        Self {
            id: id.into(),
            element,
            children,
        }
    }

    fn leading_pinned(&self) -> usize {
        self.children.iter().take_while(|n| n.is_pinned()).count()
    }

    fn trailing_pinned(&self) -> usize {
        self.children.iter().rev().take_while(|n| n.is_pinned()).count()
    }

    fn contains_pinned(&self) -> bool {
        self.children.iter().any(|n| match n {
            Node::Pinned(_) => true,
            Node::Region(r) => r.contains_pinned(),
            Node::Markup(_) => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Ordinary markup, emitted verbatim.
    Markup(String),
    /// Frame markup that edits never touch.
    Pinned(String),
    Region(Region),
}

impl Node {
    pub fn markup(html: impl Into<String>) -> Self {
        Self::Markup(html.into())
    }

    pub fn pinned(markup: Markup) -> Self {
        Self::Pinned(markup.into_string())
    }

    fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned(_))
    }
}

impl From<Markup> for Node {
    fn from(markup: Markup) -> Self {
        Self::Markup(markup.into_string())
    }
}

impl From<Region> for Node {
    fn from(region: Region) -> Self {
        Self::Region(region)
    }
}

impl Render for Node {
    fn render(&self) -> Markup {
        match self {
            Node::Markup(s) | Node::Pinned(s) => PreEscaped(s.clone()),
            Node::Region(region) => region.render(),
        }
    }
}

impl Render for Region {
    fn render(&self) -> Markup {
        match self.element {
            RegionElement::Head => html! {
                head id=(self.id) { @for child in &self.children { (child) } }
            },
            RegionElement::Body => html! {
                body id=(self.id) { @for child in &self.children { (child) } }
            },
            RegionElement::Virtual => html! {
                @for child in &self.children { (child) }
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Insert as the first (unpinned) child.
    Prepend(String),
    /// Insert as the last (unpinned) child.
    Append(String),
    /// Insert as the sibling right before the region.
    Before(String),
    /// Insert as the sibling right after the region.
    After(String),
    /// Replace the region's children. The region stays addressable.
    Replace(String),
    /// Drop the region and everything in it.
    Remove,
}

impl EditOp {
    fn name(&self) -> &'static str {
        match self {
            Self::Prepend(_) => "prepend",
            Self::Append(_) => "append",
            Self::Before(_) => "before",
            Self::After(_) => "after",
            Self::Replace(_) => "replace",
            Self::Remove => "remove",
        }
    }
}

/// A transform registered against a region id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub target: String,
    pub op: EditOp,
}

impl Edit {
    pub fn prepend(target: impl Into<String>, html: impl Into<String>) -> Self {
        Self::new(target, EditOp::Prepend(html.into()))
    }

    pub fn append(target: impl Into<String>, html: impl Into<String>) -> Self {
        Self::new(target, EditOp::Append(html.into()))
    }

    pub fn before(target: impl Into<String>, html: impl Into<String>) -> Self {
        Self::new(target, EditOp::Before(html.into()))
    }

    pub fn after(target: impl Into<String>, html: impl Into<String>) -> Self {
        Self::new(target, EditOp::After(html.into()))
    }

    pub fn replace(target: impl Into<String>, html: impl Into<String>) -> Self {
        Self::new(target, EditOp::Replace(html.into()))
    }

    pub fn remove(target: impl Into<String>) -> Self {
        Self::new(target, EditOp::Remove)
    }

    fn new(target: impl Into<String>, op: EditOp) -> Self {
        Self {
            target: target.into(),
            op,
        }
    }
}

/// The document body between `<html>` and `</html>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Find a region anywhere in the tree.
    pub fn region(&self, id: &str) -> Option<&Region> {
        find_region(&self.nodes, id)
    }

    /// Apply one edit to the first region whose id matches.
    pub fn apply(&mut self, edit: &Edit) -> Result<(), EditError> {
        apply_in(&mut self.nodes, edit)
            .unwrap_or_else(|| Err(EditError::UnknownRegion(edit.target.clone())))
    }

    /// Apply edits in order. Edits that cannot apply are logged and skipped.
    ///
    /// Returns the number of edits applied.
    pub fn apply_all<'a>(&mut self, edits: impl IntoIterator<Item = &'a Edit>) -> usize {
        let mut applied = 0;
        for edit in edits {
            match self.apply(edit) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("skipping region edit: {e}"),
            }
        }
        applied
    }
}

impl Render for Tree {
    fn render(&self) -> Markup {
        html! { @for node in &self.nodes { (node) } }
    }
}

fn find_region<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Region> {
    nodes.iter().find_map(|node| match node {
        Node::Region(r) if r.id == id => Some(r),
        Node::Region(r) => find_region(&r.children, id),
        _ => None,
    })
}

/// `None` when no region in `nodes` (recursively) has the target id.
fn apply_in(nodes: &mut Vec<Node>, edit: &Edit) -> Option<Result<(), EditError>> {
    let pos = nodes
        .iter()
        .position(|n| matches!(n, Node::Region(r) if r.id == edit.target));
    if let Some(idx) = pos {
        return Some(apply_at(nodes, idx, edit));
    }
    nodes.iter_mut().find_map(|node| match node {
        Node::Region(region) => apply_in(&mut region.children, edit),
        _ => None,
    })
}

fn apply_at(nodes: &mut Vec<Node>, idx: usize, edit: &Edit) -> Result<(), EditError> {
    let Some(Node::Region(region)) = nodes.get_mut(idx) else {
        return Err(EditError::UnknownRegion(edit.target.clone()));
    };
    let is_frame = region.element.is_frame();
    if is_frame && !matches!(edit.op, EditOp::Prepend(_) | EditOp::Append(_)) {
        return Err(EditError::FrameRegion {
            id: region.id.clone(),
            op: edit.op.name(),
        });
    }

    match &edit.op {
        EditOp::Prepend(html) => {
            let at = region.leading_pinned();
            region.children.insert(at, Node::markup(html.as_str()));
        }
        EditOp::Append(html) => {
            let at = region.children.len() - region.trailing_pinned();
            region.children.insert(at, Node::markup(html.as_str()));
        }
        EditOp::Replace(html) => {
            if region.contains_pinned() {
                return Err(EditError::Pinned(region.id.clone()));
            }
            region.children = vec![Node::markup(html.as_str())];
        }
        EditOp::Remove => {
            if region.contains_pinned() {
                return Err(EditError::Pinned(region.id.clone()));
            }
            nodes.remove(idx);
        }
        EditOp::Before(html) => nodes.insert(idx, Node::markup(html.as_str())),
        EditOp::After(html) => nodes.insert(idx + 1, Node::markup(html.as_str())),
    }
    Ok(())
}
