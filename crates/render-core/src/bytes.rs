use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// A finished PDF file. Created by exactly one successful producer and
/// consumed by transport.
#[derive(Clone, PartialEq, Eq)]
pub struct PdfBytes(Vec<u8>);

impl PdfBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `%PDF-x.y` version from the header, if present.
    pub fn version(&self) -> Option<&str> {
        let header = self.0.strip_prefix(b"%PDF-")?;
        let end = header.iter().position(|b| b.is_ascii_whitespace())?;
        std::str::from_utf8(&header[..end]).ok()
    }

    /// True when the file ends with `%%EOF`, ignoring trailing whitespace.
    pub fn has_eof_marker(&self) -> bool {
        self.0.trim_ascii_end().ends_with(b"%%EOF")
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        STANDARD.decode(encoded.trim()).map(Self)
    }
}

impl std::fmt::Debug for PdfBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfBytes")
            .field("len", &self.0.len())
            .field("version", &self.version())
            .finish()
    }
}

impl From<Vec<u8>> for PdfBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for PdfBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip_is_exact() {
        let bytes: Vec<u8> = (0..=255u8).chain(b"%%EOF".iter().copied()).collect();
        let pdf = PdfBytes::new(bytes.clone());
        let back = PdfBytes::from_base64(&pdf.to_base64()).unwrap();
        assert_eq!(back.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn reads_header_version_and_eof() {
        let pdf = PdfBytes::new(b"%PDF-1.4\n...\n%%EOF\n".to_vec());
        assert_eq!(pdf.version(), Some("1.4"));
        assert!(pdf.has_eof_marker());
        assert_eq!(PdfBytes::new(b"garbage".to_vec()).version(), None);
    }
}
