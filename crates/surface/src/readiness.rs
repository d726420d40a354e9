//! Layout readiness: whether a document is stable enough to capture.

use crate::document::RenderableDocument;
use log::{debug, warn};
use std::time::Duration;
use tokio::time::Instant;

/// Interval between readiness checks in [`wait_until_ready`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReady {
    Absent,
    Detached,
    ZeroSize,
    PendingImages(usize),
}

impl std::fmt::Display for NotReady {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotReady::Absent => write!(f, "no document"),
            NotReady::Detached => write!(f, "document is not attached"),
            NotReady::ZeroSize => write!(f, "document has zero width or height"),
            NotReady::PendingImages(n) => write!(f, "{} image(s) still loading", n),
        }
    }
}

/// Checks readiness once. Images that failed to load count as settled.
pub fn check(document: Option<&RenderableDocument>) -> Result<(), NotReady> {
    let doc = document.ok_or(NotReady::Absent)?;
    if !doc.is_attached() {
        return Err(NotReady::Detached);
    }
    if doc.measured_size().is_degenerate() {
        return Err(NotReady::ZeroSize);
    }
    match doc.pending_images() {
        0 => Ok(()),
        n => Err(NotReady::PendingImages(n)),
    }
}

pub fn is_ready(document: Option<&RenderableDocument>) -> bool {
    check(document).is_ok()
}

/// Polls [`is_ready`] every [`DEFAULT_POLL_INTERVAL`] until it holds or
/// `timeout` elapses. Returns `false` on timeout. `label` names the
/// document in log lines.
pub async fn wait_until_ready(
    document: Option<&RenderableDocument>,
    label: &str,
    timeout: Duration,
) -> bool {
    wait_until_ready_with(document, label, timeout, DEFAULT_POLL_INTERVAL).await
}

pub async fn wait_until_ready_with(
    document: Option<&RenderableDocument>,
    label: &str,
    timeout: Duration,
    poll: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        let reason = match check(document) {
            Ok(()) => return true,
            Err(reason) => reason,
        };
        let now = Instant::now();
        if now >= deadline {
            warn!("{}", timeout_message(label, timeout, reason));
            return false;
        }
        debug!("[SURFACE] Waiting for '{}' layout: {}", label, reason);
        tokio::time::sleep(poll.min(deadline - now)).await;
    }
}

fn timeout_message(label: &str, timeout: Duration, reason: NotReady) -> String {
    format!(
        "[SURFACE] '{}' not ready after {}ms ({}), continuing anyway",
        label,
        timeout.as_millis(),
        reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeSpec;
    use folio_types::Rect;

    fn doc_with_image() -> RenderableDocument {
        let doc = RenderableDocument::from_spec(
            NodeSpec::block(Rect::new(0.0, 0.0, 100.0, 100.0))
                .with_child(NodeSpec::image(Rect::new(0.0, 0.0, 10.0, 10.0), "slow.png")),
        );
        doc.set_attached(true).unwrap();
        doc
    }

    #[test]
    fn reports_each_reason() {
        assert_eq!(check(None), Err(NotReady::Absent));

        let flat = RenderableDocument::from_spec(NodeSpec::block(Rect::new(0.0, 0.0, 100.0, 0.0)));
        assert_eq!(check(Some(&flat)), Err(NotReady::Detached));
        flat.set_attached(true).unwrap();
        assert_eq!(check(Some(&flat)), Err(NotReady::ZeroSize));

        let doc = doc_with_image();
        assert_eq!(check(Some(&doc)), Err(NotReady::PendingImages(1)));
    }

    #[test]
    fn errored_image_is_settled() {
        let doc = doc_with_image();
        doc.image_slots()[0].fail("404");
        assert!(is_ready(Some(&doc)));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_image_times_out_without_hanging() {
        let doc = doc_with_image();
        let start = Instant::now();
        let ready = wait_until_ready(Some(&doc), "slow-invoice", Duration::from_millis(1000)).await;
        assert!(!ready);
        assert!(start.elapsed() <= Duration::from_millis(1050));
    }

    #[tokio::test(start_paused = true)]
    async fn becomes_ready_once_image_settles() {
        let doc = std::sync::Arc::new(doc_with_image());
        let slot = doc.image_slots()[0].clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(600)).await;
            slot.fail("gave up");
        });
        assert!(wait_until_ready(Some(&doc), "slow-invoice", Duration::from_secs(5)).await);
    }

    #[test]
    fn timeout_warning_names_the_document() {
        let message = timeout_message("ORD-1042", Duration::from_millis(3000), NotReady::PendingImages(2));
        assert_eq!(
            message,
            "[SURFACE] 'ORD-1042' not ready after 3000ms (2 image(s) still loading), continuing anyway"
        );
    }
}
