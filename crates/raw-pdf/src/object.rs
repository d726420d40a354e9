//! The small subset of PDF object syntax the minimal documents need, written
//! as 7-bit ASCII so byte offsets equal string offsets.

use crate::error::RawPdfError;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef(pub(crate) u32);

impl ObjRef {
    pub fn number(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Int(i64),
    Real(f32),
    Name(String),
    /// A literal string; escaped on output.
    Text(String),
    Array(Vec<PdfValue>),
    Dict(PdfDict),
    Ref(ObjRef),
}

impl PdfValue {
    pub fn name(name: &str) -> Self {
        PdfValue::Name(name.to_string())
    }

    pub fn text(text: &str) -> Self {
        PdfValue::Text(text.to_string())
    }

    pub(crate) fn references(&self, out: &mut Vec<ObjRef>) {
        match self {
            PdfValue::Ref(r) => out.push(*r),
            PdfValue::Array(items) => items.iter().for_each(|v| v.references(out)),
            PdfValue::Dict(dict) => dict.references(out),
            _ => {}
        }
    }

    pub(crate) fn validate_names(&self) -> Result<(), RawPdfError> {
        match self {
            PdfValue::Name(n) => check_name(n),
            PdfValue::Array(items) => items.iter().try_for_each(|v| v.validate_names()),
            PdfValue::Dict(dict) => dict.validate_names(),
            _ => Ok(()),
        }
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        match self {
            PdfValue::Null => out.push_str("null"),
            PdfValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            PdfValue::Int(i) => {
                let _ = write!(out, "{}", i);
            }
            PdfValue::Real(r) => out.push_str(&format_real(*r)),
            PdfValue::Name(n) => {
                out.push('/');
                out.push_str(n);
            }
            PdfValue::Text(t) => {
                out.push('(');
                out.push_str(&escape_text(t));
                out.push(')');
            }
            PdfValue::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    item.write_to(out);
                }
                out.push(']');
            }
            PdfValue::Dict(dict) => dict.write_to(out),
            PdfValue::Ref(r) => {
                let _ = write!(out, "{} 0 R", r.0);
            }
        }
    }
}

impl From<i64> for PdfValue {
    fn from(value: i64) -> Self {
        PdfValue::Int(value)
    }
}

impl From<f32> for PdfValue {
    fn from(value: f32) -> Self {
        PdfValue::Real(value)
    }
}

impl From<ObjRef> for PdfValue {
    fn from(value: ObjRef) -> Self {
        PdfValue::Ref(value)
    }
}

impl From<PdfDict> for PdfValue {
    fn from(value: PdfDict) -> Self {
        PdfValue::Dict(value)
    }
}

impl From<Vec<PdfValue>> for PdfValue {
    fn from(value: Vec<PdfValue>) -> Self {
        PdfValue::Array(value)
    }
}

/// Dictionary that keeps insertion order, so output is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfDict(Vec<(String, PdfValue)>);

impl PdfDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<PdfValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<PdfValue>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PdfValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn references(&self, out: &mut Vec<ObjRef>) {
        self.0.iter().for_each(|(_, v)| v.references(out));
    }

    fn validate_names(&self) -> Result<(), RawPdfError> {
        for (key, value) in &self.0 {
            check_name(key)?;
            value.validate_names()?;
        }
        Ok(())
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        out.push_str("<<");
        for (key, value) in &self.0 {
            out.push_str(" /");
            out.push_str(key);
            out.push(' ');
            value.write_to(out);
        }
        out.push_str(" >>");
    }
}

fn check_name(name: &str) -> Result<(), RawPdfError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+'));
    if valid {
        Ok(())
    } else {
        Err(RawPdfError::InvalidName(name.to_string()))
    }
}

/// Shortest decimal form with at most two fractional digits.
pub(crate) fn format_real(value: f32) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "" | "-0" => "0".to_string(),
        t => t.to_string(),
    }
}

/// Escapes a literal string body. Latin-1 characters become octal escapes;
/// anything beyond becomes `?`.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' '..='~' => out.push(c),
            c if (c as u32) < 256 => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: &PdfValue) -> String {
        let mut out = String::new();
        value.write_to(&mut out);
        out
    }

    #[test]
    fn writes_nested_values() {
        let dict = PdfDict::new()
            .with("Type", PdfValue::name("Page"))
            .with("MediaBox", vec![0_i64.into(), 0_i64.into(), 595.28_f32.into(), 841.89_f32.into()])
            .with("Parent", ObjRef(2));
        assert_eq!(
            render(&dict.into()),
            "<< /Type /Page /MediaBox [0 0 595.28 841.89] /Parent 2 0 R >>"
        );
    }

    #[test]
    fn reals_are_trimmed() {
        assert_eq!(format_real(12.0), "12");
        assert_eq!(format_real(12.5), "12.5");
        assert_eq!(format_real(-0.001), "0");
        assert_eq!(format_real(f32::NAN), "0");
    }

    #[test]
    fn text_is_escaped_to_ascii() {
        assert_eq!(escape_text("a(b)\\"), "a\\(b\\)\\\\");
        assert_eq!(escape_text("Café"), "Caf\\351");
        assert_eq!(escape_text("€"), "?");
        assert!(escape_text("Ünïcode ✓").is_ascii());
    }

    #[test]
    fn rejects_names_with_delimiters() {
        assert!(check_name("F1").is_ok());
        assert!(check_name("Bad Name").is_err());
        assert!(check_name("A/B").is_err());
    }
}
