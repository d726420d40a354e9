use folio_types::ResourceUri;
use std::sync::{Arc, Mutex, MutexGuard};

/// An image decoded to straight (non-premultiplied) RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err("image has no pixels".to_string());
        }
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }
}

#[derive(Debug, Clone)]
enum ImageState {
    Pending,
    Loaded(Arc<DecodedImage>),
    Failed(String),
}

impl ImageState {
    /// Loaded and failed images have both finished loading.
    fn is_settled(&self) -> bool {
        !matches!(self, ImageState::Pending)
    }
}

/// One `image` node's loading state, shared between the document and
/// whatever task is fetching it.
#[derive(Debug)]
pub struct ImageSlot {
    source: ResourceUri,
    state: Mutex<ImageState>,
}

impl ImageSlot {
    pub fn new(source: ResourceUri) -> Self {
        Self {
            source,
            state: Mutex::new(ImageState::Pending),
        }
    }

    pub fn source(&self) -> &ResourceUri {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, ImageState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_settled(&self) -> bool {
        self.lock().is_settled()
    }

    pub fn image(&self) -> Option<Arc<DecodedImage>> {
        match &*self.lock() {
            ImageState::Loaded(img) => Some(Arc::clone(img)),
            _ => None,
        }
    }

    pub fn resolve(&self, image: DecodedImage) {
        *self.lock() = ImageState::Loaded(Arc::new(image));
    }

    /// Marks the slot failed unless it has already settled.
    pub fn fail(&self, reason: impl Into<String>) {
        let mut state = self.lock();
        if !state.is_settled() {
            *state = ImageState::Failed(reason.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([200, 10, 10, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png() {
        let decoded = DecodedImage::decode(&tiny_png()).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 3));
        assert_eq!(decoded.rgba.len(), 2 * 3 * 4);
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(DecodedImage::decode(b"not an image").is_err());
    }

    #[test]
    fn failed_slot_counts_as_settled() {
        let slot = ImageSlot::new("logo.png".into());
        assert!(!slot.is_settled());
        slot.fail("404");
        assert!(slot.is_settled());
        assert!(slot.image().is_none());
    }

    #[test]
    fn fail_does_not_clobber_loaded_image() {
        let slot = ImageSlot::new("logo.png".into());
        slot.resolve(DecodedImage::decode(&tiny_png()).unwrap());
        slot.fail("late timeout");
        assert!(slot.image().is_some());
    }
}
