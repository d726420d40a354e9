// crates/raster/src/fonts.rs
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Raw bytes of one face plus its index inside a collection file.
#[derive(Debug)]
pub struct FontData {
    bytes: Vec<u8>,
    index: u32,
}

impl FontData {
    pub fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.bytes, self.index).ok()
    }
}

/// Font discovery for text capture. Faces are resolved through `fontdb` and
/// their bytes cached by face id.
#[derive(Clone)]
pub struct FontLibrary {
    db: Arc<RwLock<fontdb::Database>>,
    cache: Arc<RwLock<HashMap<fontdb::ID, Arc<FontData>>>>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let faces = self.db.read().map(|db| db.len()).unwrap_or(0);
        f.debug_struct("FontLibrary").field("faces", &faces).finish()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLibrary {
    /// An empty library. Text is skipped until a face is added.
    pub fn new() -> Self {
        Self {
            db: Arc::new(RwLock::new(fontdb::Database::new())),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_system_fonts(self) -> Self {
        if let Ok(mut db) = self.db.write() {
            db.load_system_fonts();
        }
        self
    }

    pub fn add_font_dir<P: AsRef<Path>>(&self, path: P) {
        if let Ok(mut db) = self.db.write() {
            db.load_fonts_dir(path);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.db.read().map(|db| db.is_empty()).unwrap_or(true)
    }

    /// The sans-serif face closest to the requested weight.
    pub fn resolve(&self, bold: bool) -> Option<Arc<FontData>> {
        let weight = if bold {
            fontdb::Weight::BOLD
        } else {
            fontdb::Weight::NORMAL
        };
        let db = self.db.read().ok()?;
        let id = db.query(&fontdb::Query {
            families: &[
                fontdb::Family::Name("Helvetica"),
                fontdb::Family::Name("Arial"),
                fontdb::Family::SansSerif,
            ],
            weight,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })?;

        if let Some(data) = self.cache.read().ok()?.get(&id) {
            return Some(Arc::clone(data));
        }

        let data = db.with_face_data(id, |bytes, index| FontData {
            bytes: bytes.to_vec(),
            index,
        })?;
        let data = Arc::new(data);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(id, Arc::clone(&data));
        }
        Some(data)
    }
}
