//! PDF render surface – implements [`RenderSurface`] on top of `printpdf`
//! (v0.8 ops-based API) with the builtin PDF fonts.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use printpdf::*;

use crate::error::SurfaceError;
use crate::fonts::{ascender_pt, measure_text_width, BuiltinFamily};
use crate::surface::{DocumentBody, FontHandle, RenderSurface, RenderedDocument};

const PT_TO_MM: f32 = 0.352778;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Surface that accumulates printpdf ops per page and serialises the
/// document on [`RenderSurface::end_document`].
pub struct PdfSurface {
    page_width_pt: f32,
    page_height_pt: f32,
    doc: Option<PdfDocument>,
    title: String,
    pages: Vec<PdfPage>,
    ops: Vec<Op>,
    page_open: bool,
    font: FontHandle,
    images: HashMap<String, ImageResource>,
}

impl PdfSurface {
    pub fn new(page_width_pt: f32, page_height_pt: f32) -> Self {
        Self {
            page_width_pt,
            page_height_pt,
            doc: None,
            title: String::new(),
            pages: Vec::new(),
            ops: Vec::new(),
            page_open: false,
            font: FontHandle {
                family: "Helvetica".to_string(),
                size: 10.0,
                bold: false,
                italic: false,
            },
            images: HashMap::new(),
        }
    }

    fn require_page(&self, op: &'static str) -> Result<(), SurfaceError> {
        if self.page_open {
            Ok(())
        } else {
            Err(SurfaceError::NoOpenPage(op))
        }
    }

    fn builtin_font(&self) -> BuiltinFont {
        let f = &self.font;
        match (BuiltinFamily::resolve(&f.family), f.bold, f.italic) {
            (BuiltinFamily::Helvetica, true, true) => BuiltinFont::HelveticaBoldOblique,
            (BuiltinFamily::Helvetica, true, false) => BuiltinFont::HelveticaBold,
            (BuiltinFamily::Helvetica, false, true) => BuiltinFont::HelveticaOblique,
            (BuiltinFamily::Helvetica, false, false) => BuiltinFont::Helvetica,
            (BuiltinFamily::Courier, true, true) => BuiltinFont::CourierBoldOblique,
            (BuiltinFamily::Courier, true, false) => BuiltinFont::CourierBold,
            (BuiltinFamily::Courier, false, true) => BuiltinFont::CourierOblique,
            (BuiltinFamily::Courier, false, false) => BuiltinFont::Courier,
            (BuiltinFamily::Times, true, true) => BuiltinFont::TimesBoldItalic,
            (BuiltinFamily::Times, true, false) => BuiltinFont::TimesBold,
            (BuiltinFamily::Times, false, true) => BuiltinFont::TimesItalic,
            (BuiltinFamily::Times, false, false) => BuiltinFont::TimesRoman,
        }
    }

    /// Register an image with the document once; later draws reuse it.
    fn image_resource(&mut self, path: &str) -> Result<&ImageResource, SurfaceError> {
        if !self.images.contains_key(path) {
            let doc = self.doc.as_mut().ok_or(SurfaceError::NoDocument)?;
            let fail = |reason: String| SurfaceError::Image {
                path: preview(path).to_string(),
                reason,
            };

            let bytes = if path.starts_with("data:") {
                parse_data_uri(path).map_err(fail)?
            } else {
                std::fs::read(path).map_err(|e| fail(e.to_string()))?
            };

            // Decode with the `image` crate to obtain pixel dimensions.
            let dyn_img = ::image::load_from_memory(&bytes).map_err(|e| fail(format!("decode error: {e}")))?;
            let (px_width, px_height) = (dyn_img.width(), dyn_img.height());

            let mut warnings: Vec<PdfWarnMsg> = Vec::new();
            let raw = RawImage::decode_from_bytes(&bytes, &mut warnings)
                .map_err(|e| fail(format!("PDF encode error: {e}")))?;
            let xobj_id = doc.add_image(&raw);

            self.images.insert(
                path.to_string(),
                ImageResource {
                    xobj_id,
                    px_width,
                    px_height,
                },
            );
        }
        self.images
            .get(path)
            .ok_or_else(|| SurfaceError::Image {
                path: preview(path).to_string(),
                reason: "not registered".to_string(),
            })
    }
}

impl RenderSurface for PdfSurface {
    fn start_document(&mut self, title: &str) -> Result<(), SurfaceError> {
        self.title = title.to_string();
        self.doc = Some(PdfDocument::new(title));
        self.pages.clear();
        self.images.clear();
        Ok(())
    }

    fn start_page(&mut self) -> Result<(), SurfaceError> {
        if self.doc.is_none() {
            return Err(SurfaceError::NoDocument);
        }
        if self.page_open {
            self.end_page()?;
        }
        self.ops.clear();
        self.page_open = true;
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &FontHandle) -> f32 {
        measure_text_width(text, font.size, font.bold, &font.family)
    }

    fn select_font(&mut self, family: &str, size: f32, bold: bool, italic: bool) -> FontHandle {
        self.font = FontHandle {
            family: family.to_string(),
            size,
            bold,
            italic,
        };
        self.font.clone()
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), SurfaceError> {
        self.require_page("draw_text")?;
        if text.is_empty() {
            return Ok(());
        }
        let font = self.builtin_font();
        let size = self.font.size;
        // PDF origin is bottom-left; baseline sits one ascender below `y`.
        let ascender = ascender_pt(size);
        let text_y = self.page_height_pt - y - ascender;

        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(x),
                y: Pt(text_y),
            },
        });
        self.ops.push(Op::SetFontSizeBuiltinFont { size: Pt(size), font });
        self.ops.push(Op::SetFillColor { col: black() });
        self.ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(to_winlatin(text))],
            font,
        });
        self.ops.push(Op::EndTextSection);
        Ok(())
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<(), SurfaceError> {
        self.require_page("draw_line")?;
        let h = self.page_height_pt;
        self.ops.push(Op::SetOutlineColor { col: black() });
        self.ops.push(Op::SetOutlineThickness { pt: Pt(0.5) });
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![
                    LinePoint {
                        p: Point {
                            x: Pt(x1),
                            y: Pt(h - y1),
                        },
                        bezier: false,
                    },
                    LinePoint {
                        p: Point {
                            x: Pt(x2),
                            y: Pt(h - y2),
                        },
                        bezier: false,
                    },
                ],
                is_closed: false,
            },
        });
        Ok(())
    }

    fn draw_image(&mut self, path: &str, x: f32, y: f32, w: f32, h: f32) -> Result<(), SurfaceError> {
        self.require_page("draw_image")?;
        let page_height = self.page_height_pt;
        let res = self.image_resource(path)?;

        // At dpi=72 printpdf renders 1 px = 1 pt, so scale = desired_pt / px_dim.
        let scale_x = if res.px_width > 0 { w / res.px_width as f32 } else { 1.0 };
        let scale_y = if res.px_height > 0 { h / res.px_height as f32 } else { 1.0 };
        let op = Op::UseXobject {
            id: res.xobj_id.clone(),
            transform: XObjectTransform {
                translate_x: Some(Pt(x)),
                translate_y: Some(Pt(page_height - y - h)),
                dpi: Some(72.0),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                rotate: None,
            },
        };
        self.ops.push(op);
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), SurfaceError> {
        self.require_page("end_page")?;
        let ops = std::mem::take(&mut self.ops);
        self.pages.push(PdfPage::new(
            Mm(self.page_width_pt * PT_TO_MM),
            Mm(self.page_height_pt * PT_TO_MM),
            ops,
        ));
        self.page_open = false;
        Ok(())
    }

    fn end_document(&mut self) -> Result<RenderedDocument, SurfaceError> {
        if self.page_open {
            self.end_page()?;
        }
        let mut doc = self.doc.take().ok_or(SurfaceError::NoDocument)?;
        let pages = std::mem::take(&mut self.pages);
        let page_count = pages.len() as u32;

        // printpdf needs at least one page.
        let pages = if pages.is_empty() {
            vec![PdfPage::new(
                Mm(self.page_width_pt * PT_TO_MM),
                Mm(self.page_height_pt * PT_TO_MM),
                Vec::new(),
            )]
        } else {
            pages
        };

        doc.with_pages(pages);
        let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
        log::debug!("'{}' serialised: {} pages, {} bytes", self.title, page_count, bytes.len());

        Ok(RenderedDocument {
            title: std::mem::take(&mut self.title),
            page_count,
            body: DocumentBody::Pdf(bytes),
        })
    }
}

fn black() -> Color {
    Color::Rgb(Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        icc_profile: None,
    })
}

fn preview(src: &str) -> &str {
    match src.char_indices().nth(80) {
        Some((idx, _)) => &src[..idx],
        None => src,
    }
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet (package size marker)
            '\u{2013}' => 0x96, // en-dash
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0x9F range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
fn parse_data_uri(src: &str) -> Result<Vec<u8>, String> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let comma_pos = rest
        .find(',')
        .ok_or_else(|| "Invalid data URI: missing `,` separator between header and data".to_string())?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err("Only base64-encoded data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(rest[comma_pos + 1..].trim())
        .map_err(|e| format!("Base64 decode error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_empty_document() {
        let mut s = PdfSurface::new(612.0, 792.0);
        s.start_document("empty").unwrap();
        let doc = s.end_document().unwrap();
        let bytes = doc.pdf_bytes().unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(doc.page_count, 0);
    }

    #[test]
    fn pages_are_counted() {
        let mut s = PdfSurface::new(189.0, 72.0);
        s.start_document("labels").unwrap();
        for i in 0..3 {
            s.start_page().unwrap();
            s.select_font("Courier New", 12.0, true, false);
            s.draw_text(4.0, 4.0, &format!("label {i} ••")).unwrap();
            s.draw_line(0.0, 70.0, 189.0, 70.0).unwrap();
            s.end_page().unwrap();
        }
        let doc = s.end_document().unwrap();
        assert_eq!(doc.page_count, 3);
        assert_eq!(&doc.pdf_bytes().unwrap()[0..5], b"%PDF-");
    }

    #[test]
    fn missing_image_file_is_a_surface_error() {
        let mut s = PdfSurface::new(612.0, 792.0);
        s.start_document("img").unwrap();
        s.start_page().unwrap();
        let err = s
            .draw_image("/nonexistent/logo.png", 0.0, 0.0, 10.0, 10.0)
            .unwrap_err();
        assert!(matches!(err, SurfaceError::Image { .. }));
    }

    #[test]
    fn data_uri_parsing() {
        assert_eq!(parse_data_uri("data:image/png;base64,aGk=").unwrap(), b"hi");
        assert!(parse_data_uri("data:image/png,plain").is_err());
        assert!(parse_data_uri("logo.png").is_err());
    }

    #[test]
    fn bullet_maps_to_winansi() {
        assert_eq!(to_winlatin("•").as_bytes(), &[0x95]);
        assert_eq!(to_winlatin("a").as_bytes(), b"a");
    }
}
