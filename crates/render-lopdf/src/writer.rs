use flate2::write::ZlibEncoder;
use flate2::Compression;
use folio_render_core::RenderError;
use lopdf::content::Content;
use lopdf::xref::{Xref, XrefEntry, XrefType};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream};
use std::collections::BTreeMap;
use std::io::{self, Seek, Write};

/// Buffers indirect objects and writes them out with an xref table and
/// trailer on [`finish`](Self::finish). Output carries no dates or ids, so
/// equal input produces equal bytes.
pub struct StreamingPdfWriter<W: Write + Seek> {
    writer: W,
    xref: Xref,
    max_id: u32,
    pub catalog_id: ObjectId,
    pub pages_id: ObjectId,
    pub resources_id: ObjectId,
    resources: Dictionary,
    info: Option<Dictionary>,
    page_ids: Vec<ObjectId>,
    buffered_objects: BTreeMap<ObjectId, Object>,
}

impl<W: Write + Seek> StreamingPdfWriter<W> {
    pub fn new(mut writer: W, version: &str, resources: Dictionary) -> io::Result<Self> {
        writer.write_all(format!("%PDF-{}\n%âãÏÓ\n", version).as_bytes())?;

        let resources_id = (1, 0);
        let pages_id = (2, 0);
        let catalog_id = (3, 0);

        Ok(Self {
            writer,
            xref: Xref::new(0, XrefType::CrossReferenceTable),
            max_id: 3,
            catalog_id,
            pages_id,
            resources_id,
            resources,
            info: None,
            page_ids: Vec::new(),
            buffered_objects: BTreeMap::new(),
        })
    }

    pub fn new_object_id(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }

    pub fn buffer_object(&mut self, object: Object) -> ObjectId {
        let id = self.new_object_id();
        self.buffered_objects.insert(id, object);
        id
    }

    /// Buffers a page content stream, Flate-compressed.
    pub fn buffer_content_stream(&mut self, content: Content) -> Result<ObjectId, RenderError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&content.encode()?)?;
        let compressed = encoder.finish()?;
        let stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed);
        Ok(self.buffer_object(Object::Stream(stream)))
    }

    /// Registers `stream` under `/XObject /<name>` in the shared resources.
    pub fn add_xobject(&mut self, name: &str, stream: Stream) -> ObjectId {
        let id = self.buffer_object(Object::Stream(stream));
        let mut xobjects = match self.resources.get(b"XObject") {
            Ok(Object::Dictionary(existing)) => existing.clone(),
            _ => Dictionary::new(),
        };
        xobjects.set(name.as_bytes(), Object::Reference(id));
        self.resources.set("XObject", Object::Dictionary(xobjects));
        id
    }

    /// Buffers a page showing `content_id` and appends it to the page tree.
    pub fn add_page(&mut self, content_id: ObjectId, page_width: f32, page_height: f32) -> ObjectId {
        let page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.0.into(), 0.0.into(), page_width.into(), page_height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        let id = self.buffer_object(page.into());
        self.page_ids.push(id);
        id
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn set_title(&mut self, title: &str) {
        self.info = Some(dictionary! {
            "Title" => Object::string_literal(title),
            "Producer" => Object::string_literal("folio"),
        });
    }

    pub fn finish(mut self) -> io::Result<W> {
        let resources = std::mem::take(&mut self.resources);
        self.buffered_objects.insert(self.resources_id, resources.into());

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => self.page_ids.len() as i64,
        };
        self.buffered_objects.insert(self.pages_id, pages_dict.into());

        let catalog_dict = dictionary! { "Type" => "Catalog", "Pages" => self.pages_id };
        self.buffered_objects.insert(self.catalog_id, catalog_dict.into());

        let info_id = match self.info.take() {
            Some(info) => Some(self.buffer_object(info.into())),
            None => None,
        };

        for (id, object) in &self.buffered_objects {
            internal_writer::write_indirect_object(&mut self.writer, *id, object, &mut self.xref)?;
        }

        let xref_start = self.writer.stream_position()?;
        self.xref.size = self.max_id + 1;
        internal_writer::write_xref(&mut self.writer, &self.xref)?;

        let mut trailer = dictionary! { "Size" => self.xref.size as i64, "Root" => self.catalog_id };
        if let Some(info_id) = info_id {
            trailer.set("Info", info_id);
        }
        writeln!(self.writer, "trailer")?;
        internal_writer::write_dictionary(&mut self.writer, &trailer)?;
        writeln!(self.writer, "\nstartxref")?;
        writeln!(self.writer, "{}", xref_start)?;
        writeln!(self.writer, "%%EOF")?;

        self.writer.flush()?;
        Ok(self.writer)
    }
}

mod internal_writer {
    use super::*;
    use lopdf::StringFormat;

    pub fn write_indirect_object<W: Write + Seek>(
        writer: &mut W,
        id: ObjectId,
        object: &Object,
        xref: &mut Xref,
    ) -> io::Result<()> {
        let offset = writer.stream_position()?;
        xref.insert(
            id.0,
            XrefEntry::Normal {
                offset: offset as u32,
                generation: id.1,
            },
        );
        writeln!(writer, "{} {} obj", id.0, id.1)?;
        write_object(writer, object)?;
        writeln!(writer, "\nendobj")?;
        Ok(())
    }

    pub fn write_object(writer: &mut dyn Write, object: &Object) -> io::Result<()> {
        match object {
            Object::Null => writer.write_all(b"null"),
            Object::Boolean(b) => writer.write_all(if *b { b"true" } else { b"false" }),
            Object::Integer(i) => write!(writer, "{}", i),
            Object::Real(r) => write!(writer, "{:.3}", r),
            Object::Name(n) => {
                writer.write_all(b"/")?;
                writer.write_all(n)
            }
            Object::String(s, format) => match format {
                StringFormat::Literal => {
                    writer.write_all(b"(")?;
                    for &byte in s {
                        if byte == b'(' || byte == b')' || byte == b'\\' {
                            writer.write_all(b"\\")?;
                        }
                        writer.write_all(&[byte])?;
                    }
                    writer.write_all(b")")
                }
                StringFormat::Hexadecimal => {
                    writer.write_all(b"<")?;
                    for byte in s {
                        write!(writer, "{:02X}", byte)?;
                    }
                    writer.write_all(b">")
                }
            },
            Object::Array(arr) => {
                writer.write_all(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        writer.write_all(b" ")?;
                    }
                    write_object(writer, obj)?;
                }
                writer.write_all(b"]")
            }
            Object::Dictionary(dict) => write_dictionary(writer, dict),
            Object::Stream(stream) => {
                let mut dict = stream.dict.clone();
                dict.set("Length", stream.content.len() as i64);
                write_dictionary(writer, &dict)?;
                writer.write_all(b"\nstream\n")?;
                writer.write_all(&stream.content)?;
                writer.write_all(b"\nendstream")
            }
            Object::Reference(id) => write!(writer, "{} {} R", id.0, id.1),
        }
    }

    pub fn write_dictionary(writer: &mut dyn Write, dict: &Dictionary) -> io::Result<()> {
        writer.write_all(b"<<")?;
        let sorted_keys: BTreeMap<_, _> = dict.iter().collect();
        for (key, value) in sorted_keys {
            writer.write_all(b"/")?;
            writer.write_all(key)?;
            writer.write_all(b" ")?;
            write_object(writer, value)?;
            writer.write_all(b" ")?;
        }
        writer.write_all(b">>")
    }

    /// One subsection covering every id up to `xref.size`; ids that were
    /// allocated but never written are listed as free.
    pub fn write_xref<W: Write>(writer: &mut W, xref: &Xref) -> io::Result<()> {
        writeln!(writer, "xref")?;
        writeln!(writer, "0 {}", xref.size)?;
        writeln!(writer, "0000000000 65535 f ")?;
        for id in 1..xref.size {
            match xref.get(id) {
                Some(XrefEntry::Normal { offset, generation }) => {
                    writeln!(writer, "{:010} {:05} n ", offset, generation)?
                }
                _ => writeln!(writer, "0000000000 00000 f ")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use std::io::Cursor;

    fn one_page() -> Vec<u8> {
        let mut writer = StreamingPdfWriter::new(Cursor::new(Vec::new()), "1.7", Dictionary::new()).unwrap();
        let content = Content {
            operations: vec![Operation::new("re", vec![0.0.into(), 0.0.into(), 10.0.into(), 10.0.into()]), Operation::new("f", vec![])],
        };
        let content_id = writer.buffer_content_stream(content).unwrap();
        writer.add_page(content_id, 595.28, 841.89);
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn output_parses_and_is_deterministic() {
        let bytes = one_page();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.trim_ascii_end().ends_with(b"%%EOF"));
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert_eq!(bytes, one_page());
    }

    #[test]
    fn page_contents_are_flate_compressed() {
        let doc = lopdf::Document::load_mem(&one_page()).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let contents = doc.get_dictionary(page_id).unwrap().get(b"Contents").unwrap().as_reference().unwrap();
        let stream = doc.get_object(contents).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");

        let decoded = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();
        assert!(decoded.contains("re"));
    }

    #[test]
    fn xobjects_are_added_to_shared_resources() {
        let mut writer = StreamingPdfWriter::new(Cursor::new(Vec::new()), "1.7", Dictionary::new()).unwrap();
        let id = writer.add_xobject("Im1", Stream::new(dictionary! { "Type" => "XObject" }, vec![]));
        match writer.resources.get(b"XObject").unwrap() {
            Object::Dictionary(d) => assert_eq!(d.get(b"Im1").unwrap(), &Object::Reference(id)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
