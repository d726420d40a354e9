//! The renderable document: a laid-out node tree, its image slots, and the
//! bookkeeping that keeps mutation and capture apart.

use crate::error::SurfaceError;
use crate::images::{DecodedImage, ImageSlot};
use crate::node::{Node, NodeContent, NodeId, NodeKind, NodeSpec};
use folio_traits::ResourceProvider;
use folio_types::{Rect, Size};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

#[derive(Debug)]
struct DocumentInner {
    root: Node,
    attached: bool,
    next_id: u32,
}

#[derive(Debug)]
pub struct RenderableDocument {
    inner: RwLock<DocumentInner>,
    images: RwLock<Vec<Arc<ImageSlot>>>,
    capturing: AtomicBool,
    layout_passes: AtomicU64,
}

/// An immutable copy of the document taken under a [`CaptureGuard`]. The
/// rasterizer restyles this copy freely; the live document never sees it.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub root: Node,
    /// Indexed by image slot. `None` for images that failed or never loaded.
    pub images: Vec<Option<Arc<DecodedImage>>>,
    pub size: Size,
}

impl DocumentSnapshot {
    pub fn image(&self, slot: usize) -> Option<&DecodedImage> {
        self.images.get(slot).and_then(|i| i.as_deref())
    }
}

/// Outcome of [`RenderableDocument::load_images`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageLoadSummary {
    pub loaded: usize,
    pub failed: usize,
    pub timed_out: usize,
}

/// Exclusive capture access. Structural mutation of the document fails with
/// [`SurfaceError::CaptureInProgress`] until this guard is dropped.
#[derive(Debug)]
pub struct CaptureGuard<'a> {
    document: &'a RenderableDocument,
}

impl CaptureGuard<'_> {
    pub fn snapshot(&self) -> DocumentSnapshot {
        self.document.snapshot()
    }

    pub fn document(&self) -> &RenderableDocument {
        self.document
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.document.capturing.store(false, Ordering::Release);
    }
}

fn build_node(spec: NodeSpec, next_id: &mut u32, images: &mut Vec<Arc<ImageSlot>>) -> Node {
    let id = NodeId(*next_id);
    *next_id += 1;
    let kind = match spec.content {
        NodeContent::Block => NodeKind::Block,
        NodeContent::Text(run) => NodeKind::Text(run),
        NodeContent::Rule { color, thickness } => NodeKind::Rule { color, thickness },
        NodeContent::Image { src } => {
            images.push(Arc::new(ImageSlot::new(src.clone())));
            NodeKind::Image {
                source: src,
                slot: images.len() - 1,
            }
        }
    };
    let children = spec
        .children
        .into_iter()
        .map(|child| build_node(child, next_id, images))
        .collect();
    Node {
        id,
        name: spec.name,
        frame: spec.frame,
        style: spec.style,
        kind,
        children,
    }
}

impl RenderableDocument {
    /// Builds a detached document. Call [`set_attached`](Self::set_attached)
    /// once it is part of a live surface.
    pub fn from_spec(spec: NodeSpec) -> Self {
        let mut next_id = 0;
        let mut images = Vec::new();
        let root = build_node(spec, &mut next_id, &mut images);
        Self {
            inner: RwLock::new(DocumentInner {
                root,
                attached: false,
                next_id,
            }),
            images: RwLock::new(images),
            capturing: AtomicBool::new(false),
            layout_passes: AtomicU64::new(0),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SurfaceError> {
        let spec: NodeSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(spec))
    }

    fn read(&self) -> RwLockReadGuard<'_, DocumentInner> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DocumentInner>, SurfaceError> {
        if self.is_capturing() {
            return Err(SurfaceError::CaptureInProgress);
        }
        Ok(self.inner.write().unwrap_or_else(|p| p.into_inner()))
    }

    pub fn root_id(&self) -> NodeId {
        self.read().root.id
    }

    pub fn node_named(&self, name: &str) -> Option<NodeId> {
        self.read().root.find_named(name).map(|n| n.id)
    }

    pub fn node_count(&self) -> usize {
        self.read().root.count()
    }

    pub fn is_attached(&self) -> bool {
        self.read().attached
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Acquire)
    }

    /// Width and height of everything the root paints, in CSS pixels.
    pub fn measured_size(&self) -> Size {
        self.read().root.content_extent().size()
    }

    /// Recomputes layout metrics from the current tree and returns the
    /// measured size.
    pub fn reflow(&self) -> Size {
        let size = self.measured_size();
        let pass = self.layout_passes.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Reflow #{} measured {}x{}px", pass, size.width, size.height);
        size
    }

    pub fn layout_passes(&self) -> u64 {
        self.layout_passes.load(Ordering::Relaxed)
    }

    pub fn image_slots(&self) -> Vec<Arc<ImageSlot>> {
        self.images.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn pending_images(&self) -> usize {
        self.image_slots().iter().filter(|s| !s.is_settled()).count()
    }

    pub fn set_attached(&self, attached: bool) -> Result<(), SurfaceError> {
        self.write()?.attached = attached;
        Ok(())
    }

    pub fn update_frame(&self, id: NodeId, frame: Rect) -> Result<(), SurfaceError> {
        let mut inner = self.write()?;
        let node = inner.root.find_mut(id).ok_or(SurfaceError::UnknownNode(id))?;
        node.frame = frame;
        Ok(())
    }

    /// Appends `spec` under `parent` and returns the new subtree's root id.
    pub fn push_child(&self, parent: NodeId, spec: NodeSpec) -> Result<NodeId, SurfaceError> {
        let mut inner = self.write()?;
        if inner.root.find(parent).is_none() {
            return Err(SurfaceError::UnknownNode(parent));
        }
        let mut images = self.images.write().unwrap_or_else(|p| p.into_inner());
        let mut next_id = inner.next_id;
        let child = build_node(spec, &mut next_id, &mut images);
        inner.next_id = next_id;
        let id = child.id;
        inner
            .root
            .find_mut(parent)
            .ok_or(SurfaceError::UnknownNode(parent))?
            .children
            .push(child);
        Ok(id)
    }

    /// Takes exclusive capture access. Fails if a capture is already running.
    pub fn begin_capture(&self) -> Result<CaptureGuard<'_>, SurfaceError> {
        self.capturing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SurfaceError::CaptureInProgress)?;
        Ok(CaptureGuard { document: self })
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        let inner = self.read();
        let images = self.image_slots().iter().map(|slot| slot.image()).collect();
        DocumentSnapshot {
            size: inner.root.content_extent().size(),
            root: inner.root.clone(),
            images,
        }
    }

    /// Resolves every pending image slot through `provider`. Each image races
    /// its own deadline; expiry marks the slot failed instead of erroring.
    pub async fn load_images(
        &self,
        provider: Arc<dyn ResourceProvider>,
        timeout: Duration,
    ) -> ImageLoadSummary {
        let pending: Vec<Arc<ImageSlot>> = self
            .image_slots()
            .into_iter()
            .filter(|s| !s.is_settled())
            .collect();

        let mut handles = Vec::with_capacity(pending.len());
        for slot in pending {
            let provider = Arc::clone(&provider);
            handles.push(tokio::spawn(async move {
                let task_slot = Arc::clone(&slot);
                let work = tokio::task::spawn_blocking(move || fetch_and_decode(&task_slot, &*provider));
                match tokio::time::timeout(timeout, work).await {
                    Ok(Ok(Ok(image))) => {
                        slot.resolve(image);
                        LoadOutcome::Loaded
                    }
                    Ok(Ok(Err(reason))) => {
                        warn!("[SURFACE] Image '{}' failed to load: {}", slot.source(), reason);
                        slot.fail(reason);
                        LoadOutcome::Failed
                    }
                    Ok(Err(join_err)) => {
                        warn!("[SURFACE] Image '{}' loader panicked: {}", slot.source(), join_err);
                        slot.fail(join_err.to_string());
                        LoadOutcome::Failed
                    }
                    Err(_) => {
                        warn!(
                            "[SURFACE] Image '{}' did not load within {}ms",
                            slot.source(),
                            timeout.as_millis()
                        );
                        slot.fail("timed out");
                        LoadOutcome::TimedOut
                    }
                }
            }));
        }

        let mut summary = ImageLoadSummary::default();
        for handle in handles {
            match handle.await {
                Ok(LoadOutcome::Loaded) => summary.loaded += 1,
                Ok(LoadOutcome::Failed) | Err(_) => summary.failed += 1,
                Ok(LoadOutcome::TimedOut) => summary.timed_out += 1,
            }
        }
        debug!(
            "[SURFACE] Image loading finished: {} loaded, {} failed, {} timed out",
            summary.loaded, summary.failed, summary.timed_out
        );
        summary
    }
}

enum LoadOutcome {
    Loaded,
    Failed,
    TimedOut,
}

fn fetch_and_decode(
    slot: &ImageSlot,
    provider: &dyn ResourceProvider,
) -> Result<DecodedImage, String> {
    let bytes = provider
        .load(slot.source().as_str())
        .map_err(|e| e.to_string())?;
    DecodedImage::decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TextRun;
    use folio_traits::InMemoryResourceProvider;
    use std::io::Cursor;

    fn png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn sample() -> RenderableDocument {
        let spec = NodeSpec::block(Rect::new(0.0, 0.0, 600.0, 400.0))
            .named("invoice")
            .with_child(NodeSpec::text(
                Rect::new(10.0, 10.0, 200.0, 20.0),
                TextRun::new("INVOICE", 18.0),
            ))
            .with_child(NodeSpec::image(Rect::new(400.0, 10.0, 100.0, 50.0), "logo.png"))
            .with_child(NodeSpec::image(Rect::new(400.0, 70.0, 100.0, 50.0), "missing.png"));
        RenderableDocument::from_spec(spec)
    }

    #[test]
    fn ids_are_assigned_depth_first() {
        let doc = sample();
        assert_eq!(doc.root_id(), NodeId(0));
        assert_eq!(doc.node_named("invoice"), Some(NodeId(0)));
        assert_eq!(doc.node_count(), 4);
        assert_eq!(doc.image_slots().len(), 2);
        assert_eq!(doc.pending_images(), 2);
    }

    #[test]
    fn mutation_is_refused_during_capture() {
        let doc = sample();
        {
            let guard = doc.begin_capture().unwrap();
            assert_eq!(doc.set_attached(true), Err(SurfaceError::CaptureInProgress));
            assert_eq!(
                doc.update_frame(NodeId(1), Rect::default()),
                Err(SurfaceError::CaptureInProgress)
            );
            assert!(doc.begin_capture().is_err());
            assert_eq!(guard.snapshot().root.count(), 4);
        }
        assert!(!doc.is_capturing());
        doc.set_attached(true).unwrap();
        assert!(doc.is_attached());
    }

    #[test]
    fn push_child_registers_new_images() {
        let doc = sample();
        let id = doc
            .push_child(
                doc.root_id(),
                NodeSpec::image(Rect::new(0.0, 500.0, 10.0, 10.0), "late.png"),
            )
            .unwrap();
        assert_eq!(id, NodeId(4));
        assert_eq!(doc.image_slots().len(), 3);
        assert_eq!(doc.measured_size(), Size::new(600.0, 510.0));
        assert_eq!(
            doc.push_child(NodeId(99), NodeSpec::block(Rect::default())),
            Err(SurfaceError::UnknownNode(NodeId(99)))
        );
    }

    #[test]
    fn reflow_counts_passes() {
        let doc = sample();
        assert_eq!(doc.reflow(), Size::new(600.0, 400.0));
        doc.reflow();
        assert_eq!(doc.layout_passes(), 2);
    }

    #[tokio::test]
    async fn load_images_settles_every_slot() {
        let doc = sample();
        let provider = InMemoryResourceProvider::new().with("logo.png", png());
        let summary = doc
            .load_images(Arc::new(provider), Duration::from_secs(5))
            .await;
        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(doc.pending_images(), 0);

        let snap = doc.snapshot();
        assert!(snap.image(0).is_some());
        assert!(snap.image(1).is_none());
    }

    #[tokio::test]
    async fn inline_image_sources_load_through_the_provider() {
        use base64::Engine;
        let source = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png())
        );
        let doc = RenderableDocument::from_spec(
            NodeSpec::block(Rect::new(0.0, 0.0, 100.0, 100.0))
                .with_child(NodeSpec::image(Rect::new(0.0, 0.0, 4.0, 4.0), source)),
        );

        let summary = doc
            .load_images(Arc::new(InMemoryResourceProvider::new()), Duration::from_secs(5))
            .await;
        assert_eq!(summary.loaded, 1);
        assert!(doc.snapshot().image(0).is_some());
    }
}
