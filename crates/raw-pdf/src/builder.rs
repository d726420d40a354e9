use crate::error::RawPdfError;
use crate::object::{ObjRef, PdfDict, PdfValue};
use base64::Engine;
use std::fmt::Write;

#[derive(Debug, Clone)]
enum Body {
    Value(PdfValue),
    Stream { dict: PdfDict, data: String },
}

impl Body {
    fn references(&self) -> Vec<ObjRef> {
        let mut out = Vec::new();
        match self {
            Body::Value(v) => v.references(&mut out),
            Body::Stream { dict, .. } => PdfValue::Dict(dict.clone()).references(&mut out),
        }
        out
    }

    fn validate_names(&self) -> Result<(), RawPdfError> {
        match self {
            Body::Value(v) => v.validate_names(),
            Body::Stream { dict, .. } => PdfValue::Dict(dict.clone()).validate_names(),
        }
    }
}

/// Collects numbered objects and writes the file with a cross-reference
/// table computed from the real byte offsets.
#[derive(Debug, Clone)]
pub struct RawPdfBuilder {
    version: String,
    slots: Vec<Option<Body>>,
    root: Option<ObjRef>,
}

impl RawPdfBuilder {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            slots: Vec::new(),
            root: None,
        }
    }

    /// Allocates a number for an object defined later with [`define`](Self::define).
    pub fn reserve(&mut self) -> ObjRef {
        self.slots.push(None);
        ObjRef(self.slots.len() as u32)
    }

    pub fn define(&mut self, id: ObjRef, value: impl Into<PdfValue>) -> Result<(), RawPdfError> {
        self.fill(id, Body::Value(value.into()))
    }

    fn fill(&mut self, id: ObjRef, body: Body) -> Result<(), RawPdfError> {
        let slot = (id.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.slots.get_mut(index))
            .ok_or(RawPdfError::Undefined(id.0))?;
        if slot.is_some() {
            return Err(RawPdfError::AlreadyDefined(id.0));
        }
        *slot = Some(body);
        Ok(())
    }

    pub fn add(&mut self, value: impl Into<PdfValue>) -> ObjRef {
        self.slots.push(Some(Body::Value(value.into())));
        ObjRef(self.slots.len() as u32)
    }

    pub fn add_stream(&mut self, dict: PdfDict, data: String) -> ObjRef {
        self.slots.push(Some(Body::Stream { dict, data }));
        ObjRef(self.slots.len() as u32)
    }

    pub fn set_root(&mut self, catalog: ObjRef) {
        self.root = Some(catalog);
    }

    fn validate(&self) -> Result<ObjRef, RawPdfError> {
        let root = self.root.ok_or(RawPdfError::MissingRoot)?;
        let defined = |r: ObjRef| {
            (r.0 as usize)
                .checked_sub(1)
                .and_then(|index| self.slots.get(index))
                .is_some_and(|s| s.is_some())
        };
        if !defined(root) {
            return Err(RawPdfError::MissingRoot);
        }
        for (index, slot) in self.slots.iter().enumerate() {
            let number = index as u32 + 1;
            let body = slot.as_ref().ok_or(RawPdfError::Undefined(number))?;
            body.validate_names()?;
            if let Some(missing) = body.references().into_iter().find(|r| !defined(*r)) {
                return Err(RawPdfError::DanglingReference {
                    from: number,
                    to: missing.0,
                });
            }
        }
        Ok(root)
    }

    pub fn build(self) -> Result<RawPdf, RawPdfError> {
        let root = self.validate()?;
        let mut text = String::new();
        let _ = writeln!(text, "%PDF-{}", self.version);

        let mut offsets = Vec::with_capacity(self.slots.len());
        for (index, body) in self.slots.iter().flatten().enumerate() {
            offsets.push(text.len());
            let _ = writeln!(text, "{} 0 obj", index + 1);
            match body {
                Body::Value(value) => value.write_to(&mut text),
                Body::Stream { dict, data } => {
                    let mut dict = dict.clone();
                    dict.insert("Length", data.len() as i64);
                    dict.write_to(&mut text);
                    text.push_str("\nstream\n");
                    text.push_str(data);
                    text.push_str("\nendstream");
                }
            }
            text.push_str("\nendobj\n");
        }

        let startxref = text.len();
        let _ = writeln!(text, "xref\n0 {}", offsets.len() + 1);
        text.push_str("0000000000 65535 f \n");
        for offset in &offsets {
            let _ = writeln!(text, "{:010} 00000 n ", offset);
        }

        let trailer = PdfDict::new()
            .with("Size", (offsets.len() + 1) as i64)
            .with("Root", root);
        text.push_str("trailer\n");
        trailer.write_to(&mut text);
        let _ = write!(text, "\nstartxref\n{}\n%%EOF\n", startxref);

        Ok(RawPdf {
            text,
            offsets,
            startxref,
        })
    }
}

/// A finished minimal PDF. The text is pure ASCII, so it doubles as the
/// file's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPdf {
    text: String,
    offsets: Vec<usize>,
    startxref: usize,
}

impl RawPdf {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Byte offset of each object, by object number minus one.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn startxref(&self) -> usize {
        self.startxref
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.text.as_bytes())
    }
}
