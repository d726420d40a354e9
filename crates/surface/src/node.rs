//! The laid-out node tree behind a renderable surface.
//!
//! Layout happens upstream: every node arrives with a frame in CSS pixels,
//! relative to its parent's origin. This module only describes, walks and
//! measures the tree.

use folio_types::{Color, Rect, ResourceUri};
use serde::{Deserialize, Serialize};

/// Stable handle to a node. Handles survive cloning, so a node found in the
/// live document can be located again inside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

/// How a node is displaced from its laid-out frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum Position {
    #[default]
    Static,
    /// Shifted from the flow position, as relative, fixed or transformed
    /// boxes are.
    Offset { dx: f32, dy: f32 },
}

impl Position {
    pub fn displacement(&self) -> (f32, f32) {
        match self {
            Position::Static => (0.0, 0.0),
            Position::Offset { dx, dy } => (*dx, *dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub color: Color,
    pub width: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxStyle {
    pub background: Option<Color>,
    pub border: Option<Border>,
    pub overflow: Overflow,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub content: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub align: TextAlign,
}

fn default_font_size() -> f32 {
    14.0
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Block,
    Text(TextRun),
    /// `slot` indexes the owning document's image slots.
    Image { source: ResourceUri, slot: usize },
    Rule { color: Color, thickness: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: Option<String>,
    pub frame: Rect,
    pub style: BoxStyle,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Block)
    }

    /// Frame after applying the position displacement, in the parent's
    /// coordinate space.
    pub fn placed_frame(&self) -> Rect {
        let (dx, dy) = self.style.position.displacement();
        self.frame.translate(dx, dy)
    }

    /// Everything this node paints, in the parent's coordinate space.
    /// Children of a node with hidden overflow never extend past its frame.
    pub fn content_extent(&self) -> Rect {
        let placed = self.placed_frame();
        if self.style.overflow == Overflow::Hidden {
            return placed;
        }
        self.children.iter().fold(placed, |acc, child| {
            acc.union(&child.content_extent().translate(placed.x, placed.y))
        })
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    pub fn find_named(&self, name: &str) -> Option<&Node> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_named(name))
    }

    /// The descendant container (not `self`) with the largest frame area.
    pub fn largest_container_id(&self) -> Option<NodeId> {
        let mut best: Option<(f32, NodeId)> = None;
        let mut stack: Vec<&Node> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            if node.is_container() {
                let area = node.frame.area();
                if best.is_none_or(|(a, _)| area > a) {
                    best = Some((area, node.id));
                }
            }
            stack.extend(node.children.iter());
        }
        best.map(|(_, id)| id)
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

/// Serializable description of a node, used to build documents from JSON or
/// from code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub frame: Rect,
    #[serde(default, flatten)]
    pub style: BoxStyle,
    #[serde(flatten)]
    pub content: NodeContent,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum NodeContent {
    Block,
    Text(TextRun),
    Image { src: ResourceUri },
    Rule {
        #[serde(default)]
        color: Color,
        #[serde(default = "default_rule_thickness")]
        thickness: f32,
    },
}

fn default_rule_thickness() -> f32 {
    1.0
}

impl NodeSpec {
    pub fn block(frame: Rect) -> Self {
        Self {
            name: None,
            frame,
            style: BoxStyle::default(),
            content: NodeContent::Block,
            children: Vec::new(),
        }
    }

    pub fn text(frame: Rect, run: TextRun) -> Self {
        Self {
            content: NodeContent::Text(run),
            ..Self::block(frame)
        }
    }

    pub fn image(frame: Rect, src: impl Into<ResourceUri>) -> Self {
        Self {
            content: NodeContent::Image { src: src.into() },
            ..Self::block(frame)
        }
    }

    pub fn rule(frame: Rect, color: Color, thickness: f32) -> Self {
        Self {
            content: NodeContent::Rule { color, thickness },
            ..Self::block(frame)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.style.background = Some(color);
        self
    }

    pub fn with_child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

impl TextRun {
    pub fn new(content: impl Into<String>, font_size: f32) -> Self {
        Self {
            content: content.into(),
            font_size,
            bold: false,
            color: Color::BLACK,
            align: TextAlign::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}
