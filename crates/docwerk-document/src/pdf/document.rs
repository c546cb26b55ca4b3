// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory PDF document: the capability surface the operation handlers are
// written against: load/save, page enumeration and copying, rotation, text
// and image drawing, and document-information metadata.

use std::collections::HashMap;

use docwerk_core::Rgb;
use docwerk_core::error::{DocwerkError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, instrument, warn};

use super::copy::{PageCopier, inherited_attribute};
use crate::font::StandardFont;
use crate::image::EmbeddableImage;

/// US Letter, used when a page carries no usable `/MediaBox`.
const FALLBACK_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Resource name of the shared standard font.
const FONT_RESOURCE: &str = "DwF1";

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Fields of the document information dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Title,
    Author,
    Subject,
    Keywords,
    Creator,
    Producer,
}

impl MetadataField {
    pub const ALL: [MetadataField; 6] = [
        Self::Title,
        Self::Author,
        Self::Subject,
        Self::Keywords,
        Self::Creator,
        Self::Producer,
    ];

    fn key(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Subject => "Subject",
            Self::Keywords => "Keywords",
            Self::Creator => "Creator",
            Self::Producer => "Producer",
        }
    }
}

/// Visible page rectangle in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Axis-aligned placement rectangle in points (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// How a run of text is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: StandardFont,
    pub size: f32,
    pub color: Rgb,
    /// Fill alpha, 0.0..=1.0.
    pub opacity: f32,
    /// Counter-clockwise rotation about the text origin.
    pub rotation_degrees: f32,
    /// Text origin (baseline start) in page space.
    pub x: f32,
    pub y: f32,
}

/// An image XObject embedded in a document, ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef {
    id: ObjectId,
}

/// Structural save parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Flate-compress every stream that allows it.
    pub compress_streams: bool,
    /// Drop objects unreachable from the trailer.
    pub prune_unreferenced: bool,
    /// Renumber objects densely from 1.
    pub renumber_objects: bool,
    /// Remove page thumbnails and private application data.
    pub strip_page_extras: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            compress_streams: true,
            prune_unreferenced: false,
            renumber_objects: false,
            strip_page_extras: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PdfDocument
// ---------------------------------------------------------------------------

/// An editable PDF held in memory.
///
/// Pages are addressed by 0-based index in reading order.
pub struct PdfDocument {
    document: Document,
    /// Root `/Pages` node new pages are attached to.
    pages_root: ObjectId,
    /// Page object ids in reading order. Rebuilt whenever the object table
    /// is rewritten.
    page_ids: Vec<ObjectId>,
    /// Standard font object, created on first text draw.
    font_id: Option<ObjectId>,
    /// Graphics states keyed by fill alpha in hundredths.
    alpha_states: HashMap<u16, ObjectId>,
    /// Counter for generated XObject resource names.
    image_counter: usize,
}

impl PdfDocument {
    // -- Construction ---------------------------------------------------------

    /// Create an empty document with no pages.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_root = document.add_object(Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(Vec::new())),
            ("Count", Object::Integer(0)),
        ])));
        let catalog_id = document.add_object(Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_root)),
        ])));
        document.trailer.set("Root", Object::Reference(catalog_id));

        Self::wrap(document, pages_root)
    }

    /// Parse a document from raw PDF bytes.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn load(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            DocwerkError::PdfError(format!("failed to load PDF from memory: {err}"))
        })?;

        if document.is_encrypted() {
            return Err(DocwerkError::PdfError(
                "encrypted documents are not supported".into(),
            ));
        }

        let pages_root = document
            .catalog()
            .map_err(|err| DocwerkError::PdfError(format!("no catalog: {err}")))?
            .get(b"Pages")
            .and_then(Object::as_reference)
            .map_err(|err| DocwerkError::PdfError(format!("no /Pages: {err}")))?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self::wrap(document, pages_root))
    }

    fn wrap(document: Document, pages_root: ObjectId) -> Self {
        let page_ids = document.get_pages().into_values().collect();
        Self {
            document,
            pages_root,
            page_ids,
            font_id: None,
            alpha_states: HashMap::new(),
            image_counter: 0,
        }
    }

    /// Serialise the document with the given structural options.
    #[instrument(skip(self))]
    pub fn save(&mut self, options: &SaveOptions) -> Result<Vec<u8>> {
        if options.strip_page_extras {
            self.strip_page_extras();
        }
        if options.prune_unreferenced {
            let pruned = self.document.prune_objects();
            debug!(pruned = pruned.len(), "Unreferenced objects pruned");
        }
        if options.renumber_objects {
            self.document.renumber_objects();
        }
        if options.prune_unreferenced || options.renumber_objects {
            self.refresh_object_ids()?;
        }
        if options.compress_streams {
            self.document.compress();
        }

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|err| DocwerkError::PdfError(format!("failed to serialise PDF: {err}")))?;

        debug!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }

    /// Re-resolve cached object ids after the object table was rewritten.
    fn refresh_object_ids(&mut self) -> Result<()> {
        self.pages_root = self
            .document
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|err| DocwerkError::PdfError(format!("no /Pages after rewrite: {err}")))?;
        self.page_ids = self.document.get_pages().into_values().collect();
        self.font_id = None;
        self.alpha_states.clear();
        Ok(())
    }

    // -- Pages ----------------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            DocwerkError::PdfError(format!(
                "page index {index} out of range (document has {} pages)",
                self.page_ids.len()
            ))
        })
    }

    /// Copy the pages at `indices` (0-based, in the given order) from
    /// `source` and append them. Returns the new pages' indices.
    #[instrument(skip(self, source), fields(count = indices.len()))]
    pub fn copy_pages(&mut self, source: &PdfDocument, indices: &[usize]) -> Result<Vec<usize>> {
        let source_ids = indices
            .iter()
            .map(|&index| source.page_id(index))
            .collect::<Result<Vec<_>>>()?;

        let mut copier = PageCopier::new(&source.document);
        let mut added = Vec::with_capacity(source_ids.len());
        for page_id in source_ids {
            let new_id = copier.copy_page(&mut self.document, page_id)?;
            added.push(self.attach_page(new_id)?);
        }
        Ok(added)
    }

    /// Append a blank page of `width` x `height` points. Returns its index.
    pub fn add_page(&mut self, width: f32, height: f32) -> Result<usize> {
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
        ]);
        let page_id = self.document.add_object(Object::Dictionary(page));
        self.attach_page(page_id)
    }

    /// Link `page_id` as the last kid of the root page tree node.
    fn attach_page(&mut self, page_id: ObjectId) -> Result<usize> {
        let pages_root = self.pages_root;
        let root = self
            .document
            .get_object_mut(pages_root)
            .and_then(Object::as_dict_mut)
            .map_err(|err| DocwerkError::PdfError(format!("invalid /Pages node: {err}")))?;

        match root.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
            _ => root.set("Kids", Object::Array(vec![Object::Reference(page_id)])),
        }
        let count = match root.get(b"Count") {
            Ok(Object::Integer(count)) => *count,
            _ => 0,
        };
        root.set("Count", Object::Integer(count + 1));

        self.page_dict_mut(page_id)?
            .set("Parent", Object::Reference(pages_root));

        self.page_ids.push(page_id);
        Ok(self.page_ids.len() - 1)
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.document
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| DocwerkError::PdfError(format!("invalid page {page_id:?}: {err}")))
    }

    /// Visible page rectangle (`/MediaBox`, possibly inherited).
    pub fn page_box(&self, index: usize) -> Result<PageBox> {
        let page_id = self.page_id(index)?;
        let [llx, lly, urx, ury] = inherited_attribute(&self.document, page_id, b"MediaBox")
            .and_then(|obj| self.rectangle(obj))
            .unwrap_or_else(|| {
                warn!(index, "Page has no usable MediaBox, assuming Letter");
                FALLBACK_MEDIA_BOX
            });
        Ok(PageBox {
            x: llx.min(urx),
            y: lly.min(ury),
            width: (urx - llx).abs(),
            height: (ury - lly).abs(),
        })
    }

    /// Page width and height in points, ignoring rotation.
    pub fn page_size(&self, index: usize) -> Result<(f32, f32)> {
        let page_box = self.page_box(index)?;
        Ok((page_box.width, page_box.height))
    }

    fn rectangle(&self, object: &Object) -> Option<[f32; 4]> {
        let array = match object {
            Object::Reference(id) => self.document.get_object(*id).ok()?.as_array().ok()?,
            other => other.as_array().ok()?,
        };
        if array.len() != 4 {
            return None;
        }
        let mut rect = [0.0f32; 4];
        for (slot, value) in rect.iter_mut().zip(array) {
            *slot = number(value)?;
        }
        Some(rect)
    }

    /// Cumulative page rotation in degrees, normalised to 0/90/180/270.
    pub fn rotation(&self, index: usize) -> Result<i64> {
        let page_id = self.page_id(index)?;
        let rotation = inherited_attribute(&self.document, page_id, b"Rotate")
            .and_then(|obj| match obj {
                Object::Integer(value) => Some(*value),
                Object::Real(value) => Some(*value as i64),
                _ => None,
            })
            .unwrap_or(0);
        Ok(rotation.rem_euclid(360))
    }

    /// Set the page's absolute rotation. `angle` must be a multiple of 90.
    pub fn set_rotation(&mut self, index: usize, angle: i64) -> Result<()> {
        if angle % 90 != 0 {
            return Err(DocwerkError::PdfError(format!(
                "rotation must be a multiple of 90, got {angle}"
            )));
        }
        let page_id = self.page_id(index)?;
        self.page_dict_mut(page_id)?
            .set("Rotate", Object::Integer(angle.rem_euclid(360)));
        Ok(())
    }

    // -- Drawing --------------------------------------------------------------

    /// Draw a single line of text on the page. Characters the font cannot
    /// encode must be sanitised by the caller.
    pub fn draw_text(&mut self, index: usize, text: &str, style: &TextStyle) -> Result<()> {
        let page_id = self.page_id(index)?;
        let font_id = self.standard_font(style.font);
        let (gs_name, gs_id) = self.alpha_state(style.opacity);
        self.register_resource(page_id, b"Font", FONT_RESOURCE, font_id)?;
        self.register_resource(page_id, b"ExtGState", &gs_name, gs_id)?;

        let (r, g, b) = style.color.to_unit();
        let radians = style.rotation_degrees.to_radians();
        let (sin, cos) = radians.sin_cos();

        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(gs_name.into_bytes())]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(FONT_RESOURCE.into()), style.size.into()],
            ),
            Operation::new(
                "Tm",
                vec![
                    cos.into(),
                    sin.into(),
                    (-sin).into(),
                    cos.into(),
                    style.x.into(),
                    style.y.into(),
                ],
            ),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ];
        self.append_content(page_id, operations)
    }

    /// Fill `rect` with a solid colour.
    pub fn fill_rect(&mut self, index: usize, rect: Rect, color: Rgb) -> Result<()> {
        let page_id = self.page_id(index)?;
        let (r, g, b) = color.to_unit();
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new(
                "re",
                vec![
                    rect.x.into(),
                    rect.y.into(),
                    rect.width.into(),
                    rect.height.into(),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ];
        self.append_content(page_id, operations)
    }

    /// Add an image XObject to the document. Draw it with
    /// [`PdfDocument::draw_image`].
    pub fn embed_image(&mut self, image: &EmbeddableImage) -> Result<ImageRef> {
        let stream = image.to_stream();
        let id = self.document.add_object(Object::Stream(stream));
        Ok(ImageRef { id })
    }

    /// Draw an embedded image scaled into `placement`.
    pub fn draw_image(&mut self, index: usize, image: &ImageRef, placement: Rect) -> Result<()> {
        let page_id = self.page_id(index)?;
        self.image_counter += 1;
        let name = format!("DwIm{}", self.image_counter);
        self.register_resource(page_id, b"XObject", &name, image.id)?;

        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ];
        self.append_content(page_id, operations)
    }

    fn standard_font(&mut self, font: StandardFont) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(font.base_font().into())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]);
        let id = self.document.add_object(Object::Dictionary(dict));
        self.font_id = Some(id);
        id
    }

    fn alpha_state(&mut self, opacity: f32) -> (String, ObjectId) {
        let hundredths = (opacity.clamp(0.0, 1.0) * 100.0).round() as u16;
        let name = format!("DwGs{hundredths}");
        if let Some(id) = self.alpha_states.get(&hundredths) {
            return (name, *id);
        }
        let alpha = hundredths as f32 / 100.0;
        let dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"ExtGState".to_vec())),
            ("ca", Object::Real(alpha)),
            ("CA", Object::Real(alpha)),
        ]);
        let id = self.document.add_object(Object::Dictionary(dict));
        self.alpha_states.insert(hundredths, id);
        (name, id)
    }

    /// Register `target` under `/Resources/<category>/<name>` on the page,
    /// materialising inherited or indirect resource dictionaries.
    fn register_resource(
        &mut self,
        page_id: ObjectId,
        category: &[u8],
        name: &str,
        target: ObjectId,
    ) -> Result<()> {
        let mut resources = inherited_attribute(&self.document, page_id, b"Resources")
            .and_then(|obj| self.owned_dictionary(obj))
            .unwrap_or_default();
        let mut entries = resources
            .get(category)
            .ok()
            .and_then(|obj| self.owned_dictionary(obj))
            .unwrap_or_default();

        entries.set(name, Object::Reference(target));
        resources.set(category, Object::Dictionary(entries));
        self.page_dict_mut(page_id)?
            .set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn owned_dictionary(&self, object: &Object) -> Option<Dictionary> {
        match object {
            Object::Dictionary(dict) => Some(dict.clone()),
            Object::Reference(id) => self.document.get_dictionary(*id).ok().cloned(),
            _ => None,
        }
    }

    /// Append drawing operations after the page's existing content. The
    /// existing content is bracketed by `q`/`Q` so its graphics state cannot
    /// leak into ours.
    fn append_content(&mut self, page_id: ObjectId, operations: Vec<Operation>) -> Result<()> {
        let encoded = Content { operations }
            .encode()
            .map_err(|err| DocwerkError::PdfError(format!("failed to encode content: {err}")))?;
        let new_stream = self
            .document
            .add_object(Object::Stream(Stream::new(Dictionary::new(), encoded)));

        let existing = self
            .document
            .get_dictionary(page_id)
            .ok()
            .and_then(|page| page.get(b"Contents").ok())
            .cloned();

        let contents = match existing {
            None | Some(Object::Null) => Object::Reference(new_stream),
            Some(previous) => {
                let save = self.add_raw_stream(b"q\n".to_vec());
                let restore = self.add_raw_stream(b"\nQ\n".to_vec());
                let mut parts = vec![Object::Reference(save)];
                match previous {
                    Object::Array(items) => parts.extend(items),
                    other => parts.push(other),
                }
                parts.push(Object::Reference(restore));
                parts.push(Object::Reference(new_stream));
                Object::Array(parts)
            }
        };

        self.page_dict_mut(page_id)?.set("Contents", contents);
        Ok(())
    }

    fn add_raw_stream(&mut self, content: Vec<u8>) -> ObjectId {
        self.document
            .add_object(Object::Stream(Stream::new(Dictionary::new(), content)))
    }

    /// Remove per-page thumbnails and private application data.
    fn strip_page_extras(&mut self) {
        for page_id in self.page_ids.clone() {
            if let Ok(page) = self.page_dict_mut(page_id) {
                page.remove(b"Thumb");
                page.remove(b"PieceInfo");
            }
        }
    }

    // -- Metadata -------------------------------------------------------------

    /// Read a document information field.
    pub fn metadata_field(&self, field: MetadataField) -> Option<String> {
        let info = self.info_dictionary()?;
        match info.get(field.key().as_bytes()).ok()? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    /// Set (or with `None`, remove) a document information field.
    pub fn set_metadata_field(&mut self, field: MetadataField, value: Option<&str>) -> Result<()> {
        let info_id = self.ensure_info_dictionary()?;
        let info = self
            .document
            .get_object_mut(info_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| DocwerkError::PdfError(format!("invalid /Info: {err}")))?;

        match value {
            Some(text) => info.set(field.key(), encode_text_string(text)),
            None => {
                info.remove(field.key().as_bytes());
            }
        }
        Ok(())
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        match self.document.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.document.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    fn ensure_info_dictionary(&mut self) -> Result<ObjectId> {
        if let Ok(Object::Reference(id)) = self.document.trailer.get(b"Info")
            && self.document.get_dictionary(*id).is_ok()
        {
            return Ok(*id);
        }
        // Inline or missing: move it into its own object.
        let existing = match self.document.trailer.get(b"Info") {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        let id = self.document.add_object(Object::Dictionary(existing));
        self.document.trailer.set("Info", Object::Reference(id));
        Ok(id)
    }
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

/// PDF text string: ASCII as a literal, anything else as UTF-16BE with BOM.
fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    // PDFDocEncoding agrees with Latin-1 for printable characters.
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ColorSpace, EmbeddableImage, ImageEncoding};

    /// Helper: a document whose page `i` is `100 + i` points wide.
    fn numbered_document(pages: usize) -> PdfDocument {
        let mut doc = PdfDocument::new();
        for i in 0..pages {
            doc.add_page(100.0 + i as f32, 200.0).expect("add page");
        }
        doc
    }

    fn reload(doc: &mut PdfDocument) -> PdfDocument {
        let bytes = doc.save(&SaveOptions::default()).expect("save");
        PdfDocument::load(&bytes).expect("reload")
    }

    #[test]
    fn new_document_round_trips_pages() {
        let mut doc = numbered_document(3);
        let reloaded = reload(&mut doc);
        assert_eq!(reloaded.page_count(), 3);
        assert_eq!(reloaded.page_size(2).expect("size"), (102.0, 200.0));
    }

    #[test]
    fn load_rejects_garbage() {
        assert!(matches!(
            PdfDocument::load(b"not a pdf"),
            Err(DocwerkError::PdfError(_))
        ));
    }

    #[test]
    fn copy_pages_preserves_requested_order() {
        let source = numbered_document(4);
        let mut target = PdfDocument::new();
        let added = target.copy_pages(&source, &[3, 0, 2]).expect("copy");
        assert_eq!(added, vec![0, 1, 2]);

        let mut target = reload(&mut target);
        let widths: Vec<f32> = (0..target.page_count())
            .map(|i| target.page_size(i).expect("size").0)
            .collect();
        assert_eq!(widths, vec![103.0, 100.0, 102.0]);
        assert!(target.save(&SaveOptions::default()).is_ok());
    }

    #[test]
    fn copy_pages_rejects_out_of_range_index() {
        let source = numbered_document(2);
        let mut target = PdfDocument::new();
        assert!(target.copy_pages(&source, &[2]).is_err());
        assert_eq!(target.page_count(), 0);
    }

    #[test]
    fn rotation_is_absolute_and_normalised() {
        let mut doc = numbered_document(1);
        assert_eq!(doc.rotation(0).expect("rotation"), 0);
        doc.set_rotation(0, 270).expect("rotate");
        doc.set_rotation(0, 450).expect("rotate");
        assert_eq!(doc.rotation(0).expect("rotation"), 90);
        assert!(doc.set_rotation(0, 45).is_err());

        let reloaded = reload(&mut doc);
        assert_eq!(reloaded.rotation(0).expect("rotation"), 90);
    }

    #[test]
    fn page_indices_survive_renumbering() {
        let mut doc = PdfDocument::new();
        doc.add_raw_stream(b"orphan".to_vec());
        for i in 0..3 {
            doc.add_page(100.0 + i as f32, 200.0).expect("add page");
        }
        doc.save(&SaveOptions {
            compress_streams: false,
            prune_unreferenced: true,
            renumber_objects: true,
            strip_page_extras: false,
        })
        .expect("save");

        let widths: Vec<f32> = (0..doc.page_count())
            .map(|i| doc.page_size(i).expect("size").0)
            .collect();
        assert_eq!(widths, vec![100.0, 101.0, 102.0]);
        assert_eq!(doc.add_page(50.0, 50.0).expect("add page"), 3);
        doc.set_rotation(1, 90).expect("rotate");

        let reloaded = reload(&mut doc);
        let rotations: Vec<i64> = (0..reloaded.page_count())
            .map(|i| reloaded.rotation(i).expect("rotation"))
            .collect();
        assert_eq!(rotations, vec![0, 90, 0, 0]);
        assert_eq!(reloaded.page_size(3).expect("size"), (50.0, 50.0));
    }

    #[test]
    fn metadata_round_trip_including_unicode() {
        let mut doc = numbered_document(1);
        doc.set_metadata_field(MetadataField::Title, Some("Quarterly report"))
            .expect("set title");
        doc.set_metadata_field(MetadataField::Author, Some("Zoë Ångström"))
            .expect("set author");

        let mut reloaded = reload(&mut doc);
        assert_eq!(
            reloaded.metadata_field(MetadataField::Title).as_deref(),
            Some("Quarterly report")
        );
        assert_eq!(
            reloaded.metadata_field(MetadataField::Author).as_deref(),
            Some("Zoë Ångström")
        );

        reloaded
            .set_metadata_field(MetadataField::Title, None)
            .expect("remove title");
        assert!(reloaded.metadata_field(MetadataField::Title).is_none());
    }

    #[test]
    fn drawing_text_and_images_produces_a_loadable_document() {
        let mut doc = numbered_document(1);
        let style = TextStyle {
            font: StandardFont::Helvetica,
            size: 24.0,
            color: Rgb::new(200, 0, 0),
            opacity: 0.5,
            rotation_degrees: 45.0,
            x: 10.0,
            y: 10.0,
        };
        doc.draw_text(0, "DRAFT", &style).expect("draw text");
        doc.draw_text(0, "AGAIN", &style).expect("draw text twice");

        let image = EmbeddableImage {
            width: 2,
            height: 1,
            color_space: ColorSpace::DeviceRgb,
            encoding: ImageEncoding::Raw(vec![255, 0, 0, 0, 0, 255]),
        };
        let image_ref = doc.embed_image(&image).expect("embed");
        doc.draw_image(
            0,
            &image_ref,
            Rect {
                x: 0.0,
                y: 0.0,
                width: 50.0,
                height: 25.0,
            },
        )
        .expect("draw image");

        let reloaded = reload(&mut doc);
        assert_eq!(reloaded.page_count(), 1);
    }
}
