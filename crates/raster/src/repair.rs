//! Restyling of the captured copy so it lays out as one full-width page.

use folio_surface::{DocumentSnapshot, Node, NodeId, Overflow, Position};
use log::{debug, warn};

/// Which node a repair ended up restyling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairTarget {
    /// The node handed in by the caller.
    Handle(NodeId),
    /// The handle was missing; the largest container was used instead.
    LargestContainer(NodeId),
    Root(NodeId),
}

impl RepairTarget {
    pub fn node(&self) -> NodeId {
        match self {
            RepairTarget::Handle(id) | RepairTarget::LargestContainer(id) | RepairTarget::Root(id) => *id,
        }
    }
}

fn restyle(node: &mut Node, page_width_px: f32) {
    node.style.position = Position::Static;
    node.style.overflow = Overflow::Visible;
    node.frame.width = page_width_px;
}

/// Forces static positioning, page width and visible overflow on the target
/// node of `snapshot`, then re-measures it. Never fails: a missing handle
/// falls back to the largest container, then to the root.
pub fn repair_snapshot(
    snapshot: &mut DocumentSnapshot,
    handle: Option<NodeId>,
    page_width_px: f32,
) -> RepairTarget {
    let target = match handle {
        Some(id) if snapshot.root.find(id).is_some() => RepairTarget::Handle(id),
        _ => {
            if let Some(id) = handle {
                warn!("[RASTER] Node {:?} not found in captured copy, using a fallback container", id);
            }
            match snapshot.root.largest_container_id() {
                Some(id) => RepairTarget::LargestContainer(id),
                None => RepairTarget::Root(snapshot.root.id),
            }
        }
    };

    if let Some(node) = snapshot.root.find_mut(target.node()) {
        restyle(node, page_width_px);
    }
    if target.node() != snapshot.root.id {
        // A clipping root would hide the widened target.
        let root = &mut snapshot.root;
        root.style.position = Position::Static;
        root.style.overflow = Overflow::Visible;
    }
    let extent = snapshot.root.content_extent();
    snapshot.size = folio_types::Size::new(extent.right().max(0.0), extent.bottom().max(0.0));
    debug!(
        "[RASTER] Repaired {:?}; copy now measures {}x{}px",
        target, snapshot.size.width, snapshot.size.height
    );
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_surface::{NodeSpec, RenderableDocument};
    use folio_types::{Rect, Size};

    fn snapshot() -> (RenderableDocument, DocumentSnapshot) {
        let mut shifted = NodeSpec::block(Rect::new(0.0, 0.0, 300.0, 500.0)).named("invoice");
        shifted.style.position = Position::Offset { dx: -2000.0, dy: 0.0 };
        shifted.style.overflow = Overflow::Hidden;
        let doc = RenderableDocument::from_spec(
            NodeSpec::block(Rect::new(0.0, 0.0, 320.0, 520.0))
                .with_child(NodeSpec::block(Rect::new(0.0, 0.0, 50.0, 50.0)))
                .with_child(shifted),
        );
        let snap = doc.snapshot();
        (doc, snap)
    }

    #[test]
    fn repairs_the_handle() {
        let (doc, mut snap) = snapshot();
        let handle = doc.node_named("invoice").unwrap();
        let target = repair_snapshot(&mut snap, Some(handle), 794.0);
        assert_eq!(target, RepairTarget::Handle(handle));
        let node = snap.root.find(handle).unwrap();
        assert_eq!(node.style.position, Position::Static);
        assert_eq!(node.style.overflow, Overflow::Visible);
        assert_eq!(node.frame.width, 794.0);
        assert_eq!(snap.size, Size::new(794.0, 520.0));
    }

    #[test]
    fn missing_handle_falls_back_to_largest_container() {
        let (doc, mut snap) = snapshot();
        let target = repair_snapshot(&mut snap, Some(NodeId(999)), 794.0);
        assert_eq!(target, RepairTarget::LargestContainer(doc.node_named("invoice").unwrap()));
    }

    #[test]
    fn lone_root_is_repaired_in_place() {
        let doc = RenderableDocument::from_spec(NodeSpec::block(Rect::new(0.0, 0.0, 100.0, 100.0)));
        let mut snap = doc.snapshot();
        let target = repair_snapshot(&mut snap, None, 794.0);
        assert_eq!(target, RepairTarget::Root(doc.root_id()));
        assert_eq!(snap.size.width, 794.0);
        // The live document is untouched.
        assert_eq!(doc.measured_size().width, 100.0);
    }
}
