//! Node and edge records as the engine sees them.
//!
//! The store owns these; the engine reads a snapshot and only ever writes
//! back through discrete commands. Node content (prompt text, image URL,
//! answers) is absent; renderers fetch it themselves.

use crate::geom::{Size, WorldPoint};
use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Channels as 8-bit values, for renderers that take bytes.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

// ─── Node kinds ──────────────────────────────────────────────────────────

/// What a node is. Only `Port` carries geometry the engine cares about;
/// every other variant is a tag for renderer dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Text,
    Prompt,
    Question,
    Answer,
    Image,
    Link,
    Debate,
    /// A node with connectable ports down its left (inputs) and right
    /// (outputs) edges.
    Port {
        #[serde(default)]
        inputs: u8,
        #[serde(default)]
        outputs: u8,
    },
    #[default]
    #[serde(other)]
    Generic,
}

impl NodeKind {
    /// Stable tag used as the renderer registry key.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Prompt => "prompt",
            NodeKind::Question => "question",
            NodeKind::Answer => "answer",
            NodeKind::Image => "image",
            NodeKind::Link => "link",
            NodeKind::Debate => "debate",
            NodeKind::Port { .. } => "port",
            NodeKind::Generic => "generic",
        }
    }

    /// Port counts as `(inputs, outputs)`; zero for non-port kinds.
    pub fn port_counts(&self) -> (u8, u8) {
        match self {
            NodeKind::Port { inputs, outputs } => (*inputs, *outputs),
            _ => (0, 0),
        }
    }
}

// ─── Edge kinds ──────────────────────────────────────────────────────────

/// Semantic flavour of a connection. Each maps to one fixed visual style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeKind {
    #[default]
    Direct,
    Reference,
    Question,
    Answer,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::Direct,
        EdgeKind::Reference,
        EdgeKind::Question,
        EdgeKind::Answer,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            EdgeKind::Direct => "direct",
            EdgeKind::Reference => "reference",
            EdgeKind::Question => "question",
            EdgeKind::Answer => "answer",
        }
    }

    /// Lenient parse: unknown tags fall back to `Direct`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "reference" => EdgeKind::Reference,
            "question" => EdgeKind::Question,
            "answer" => EdgeKind::Answer,
            _ => EdgeKind::Direct,
        }
    }

    /// Pick a kind for a new connection from its endpoint kinds.
    pub fn infer(source: NodeKind, target: NodeKind) -> Self {
        match (source, target) {
            (NodeKind::Question, NodeKind::Answer) => EdgeKind::Answer,
            (_, NodeKind::Question) => EdgeKind::Question,
            (NodeKind::Link, _) => EdgeKind::Reference,
            _ => EdgeKind::Direct,
        }
    }
}

impl Serialize for EdgeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for EdgeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EdgeKind::from_tag(&s))
    }
}

// ─── Records ─────────────────────────────────────────────────────────────

/// A node as seen by the engine: identity, kind, and world position of its
/// top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    #[serde(default)]
    pub kind: NodeKind,
    pub position: WorldPoint,
    /// Extents reported by the node's renderer. `None` means the configured
    /// estimate is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl NodeRef {
    pub fn new(id: NodeId, kind: NodeKind, position: WorldPoint) -> Self {
        Self {
            id,
            kind,
            position,
            size: None,
        }
    }

    /// Extents to use for geometry: the reported size, else `estimate`.
    pub fn size_or(&self, estimate: Size) -> Size {
        self.size.unwrap_or(estimate)
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Self {
            id: EdgeId::generate(),
            source,
            target,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_emits_alpha_only_when_translucent() {
        assert_eq!(Color::rgb8(0x3B, 0x82, 0xF6).to_hex(), "#3B82F6");
        assert_eq!(Color::rgba(1.0, 0.0, 0.0, 0.5).to_hex(), "#FF000080");
        assert_eq!(Color::rgba(2.0, -1.0, 0.0, 1.0).to_rgba8(), [255, 0, 0, 255]);
    }

    #[test]
    fn unknown_edge_kind_is_direct() {
        let k: EdgeKind = serde_json::from_str("\"sideways\"").unwrap();
        assert_eq!(k, EdgeKind::Direct);
        let k: EdgeKind = serde_json::from_str("\"answer\"").unwrap();
        assert_eq!(k, EdgeKind::Answer);
        assert_eq!(serde_json::to_string(&EdgeKind::Reference).unwrap(), "\"reference\"");
    }

    #[test]
    fn node_kind_tags_and_unknown_fallback() {
        let k: NodeKind = serde_json::from_str(r#"{"type":"port","inputs":2,"outputs":1}"#).unwrap();
        assert_eq!(k, NodeKind::Port { inputs: 2, outputs: 1 });
        assert_eq!(k.port_counts(), (2, 1));

        let k: NodeKind = serde_json::from_str(r#"{"type":"hologram"}"#).unwrap();
        assert_eq!(k, NodeKind::Generic);
        assert_eq!(NodeKind::Prompt.tag(), "prompt");
    }

    #[test]
    fn node_ref_deserializes_without_kind_or_size() {
        let n: NodeRef = serde_json::from_str(r#"{"id":"a","position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(n.kind, NodeKind::Generic);
        assert_eq!(n.size, None);
        assert_eq!(n.size_or(Size::new(300.0, 150.0)), Size::new(300.0, 150.0));
    }

    #[test]
    fn edge_kind_inference() {
        assert_eq!(EdgeKind::infer(NodeKind::Question, NodeKind::Answer), EdgeKind::Answer);
        assert_eq!(EdgeKind::infer(NodeKind::Prompt, NodeKind::Question), EdgeKind::Question);
        assert_eq!(EdgeKind::infer(NodeKind::Link, NodeKind::Text), EdgeKind::Reference);
        assert_eq!(EdgeKind::infer(NodeKind::Text, NodeKind::Prompt), EdgeKind::Direct);
    }
}
