//! Render surface boundary.
//!
//! The engines decide *where* things go; a [`RenderSurface`] does the
//! drawing. Coordinates are points measured from the top-left corner of the
//! current page, and `draw_text` places the top of the text line at `y`.

use serde::Serialize;

use crate::error::SurfaceError;
use crate::fonts::measure_text_width;

/// A font selected on a surface. Text drawn afterwards uses it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontHandle {
    pub family: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

/// What a finished surface produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentBody {
    Pdf(Vec<u8>),
    /// Dry runs and tests keep the drawing calls instead of bytes.
    Commands(Vec<DrawCommand>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub title: String,
    pub page_count: u32,
    pub body: DocumentBody,
}

impl RenderedDocument {
    pub fn pdf_bytes(&self) -> Option<&[u8]> {
        match &self.body {
            DocumentBody::Pdf(bytes) => Some(bytes),
            DocumentBody::Commands(_) => None,
        }
    }

    pub fn commands(&self) -> Option<&[DrawCommand]> {
        match &self.body {
            DocumentBody::Commands(c) => Some(c),
            DocumentBody::Pdf(_) => None,
        }
    }
}

/// A finished document plus how many items or labels actually made it
/// onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub document: RenderedDocument,
    pub printed_count: usize,
}

/// Drawing capabilities the core consumes.
pub trait RenderSurface {
    fn start_document(&mut self, title: &str) -> Result<(), SurfaceError>;

    fn start_page(&mut self) -> Result<(), SurfaceError>;

    fn measure_text(&self, text: &str, font: &FontHandle) -> f32;

    fn select_font(&mut self, family: &str, size: f32, bold: bool, italic: bool) -> FontHandle;

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), SurfaceError>;

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<(), SurfaceError>;

    /// Draw the image at `path` (a file path or a base64 data URI) scaled
    /// into the `w` × `h` box whose top-left corner is (`x`, `y`).
    fn draw_image(&mut self, path: &str, x: f32, y: f32, w: f32, h: f32) -> Result<(), SurfaceError>;

    fn end_page(&mut self) -> Result<(), SurfaceError>;

    fn end_document(&mut self) -> Result<RenderedDocument, SurfaceError>;
}

/// Draw `text` horizontally centred on `center_x` in the current font.
pub fn draw_centered<S: RenderSurface + ?Sized>(
    surface: &mut S,
    font: &FontHandle,
    center_x: f32,
    y: f32,
    text: &str,
) -> Result<(), SurfaceError> {
    let width = surface.measure_text(text, font);
    surface.draw_text(center_x - width / 2.0, y, text)
}

/// Draw `text` so it ends at `right_x`.
pub fn draw_right<S: RenderSurface + ?Sized>(
    surface: &mut S,
    font: &FontHandle,
    right_x: f32,
    y: f32,
    text: &str,
) -> Result<(), SurfaceError> {
    let width = surface.measure_text(text, font);
    surface.draw_text(right_x - width, y, text)
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    StartDocument { title: String },
    StartPage { page: u32 },
    SelectFont(FontHandle),
    Text { x: f32, y: f32, text: String },
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    Image { path: String, x: f32, y: f32, w: f32, h: f32 },
    EndPage,
    EndDocument,
}

/// Surface that records every call. With `echo` set, each call is also
/// logged at info level, which is how dry runs show their output.
#[derive(Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    title: Option<String>,
    pages: u32,
    page_open: bool,
    echo: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    fn push(&mut self, command: DrawCommand) {
        if self.echo {
            log::info!("[dry run] {command:?}");
        }
        self.commands.push(command);
    }

    fn require_page(&self, op: &'static str) -> Result<(), SurfaceError> {
        if self.page_open {
            Ok(())
        } else {
            Err(SurfaceError::NoOpenPage(op))
        }
    }
}

impl RenderSurface for RecordingSurface {
    fn start_document(&mut self, title: &str) -> Result<(), SurfaceError> {
        self.title = Some(title.to_string());
        self.push(DrawCommand::StartDocument {
            title: title.to_string(),
        });
        Ok(())
    }

    fn start_page(&mut self) -> Result<(), SurfaceError> {
        if self.title.is_none() {
            return Err(SurfaceError::NoDocument);
        }
        if self.page_open {
            self.end_page()?;
        }
        self.pages += 1;
        self.page_open = true;
        self.push(DrawCommand::StartPage { page: self.pages });
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &FontHandle) -> f32 {
        measure_text_width(text, font.size, font.bold, &font.family)
    }

    fn select_font(&mut self, family: &str, size: f32, bold: bool, italic: bool) -> FontHandle {
        let handle = FontHandle {
            family: family.to_string(),
            size,
            bold,
            italic,
        };
        self.push(DrawCommand::SelectFont(handle.clone()));
        handle
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), SurfaceError> {
        self.require_page("draw_text")?;
        self.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
        });
        Ok(())
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<(), SurfaceError> {
        self.require_page("draw_line")?;
        self.push(DrawCommand::Line { x1, y1, x2, y2 });
        Ok(())
    }

    fn draw_image(&mut self, path: &str, x: f32, y: f32, w: f32, h: f32) -> Result<(), SurfaceError> {
        self.require_page("draw_image")?;
        self.push(DrawCommand::Image {
            path: path.to_string(),
            x,
            y,
            w,
            h,
        });
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), SurfaceError> {
        self.require_page("end_page")?;
        self.page_open = false;
        self.push(DrawCommand::EndPage);
        Ok(())
    }

    fn end_document(&mut self) -> Result<RenderedDocument, SurfaceError> {
        let title = self.title.take().ok_or(SurfaceError::NoDocument)?;
        if self.page_open {
            self.end_page()?;
        }
        self.push(DrawCommand::EndDocument);
        Ok(RenderedDocument {
            title,
            page_count: self.pages,
            body: DocumentBody::Commands(std::mem::take(&mut self.commands)),
        })
    }
}

/// Texts drawn on `page` (1-based) of a recorded command stream.
pub fn texts_on_page(commands: &[DrawCommand], page: u32) -> Vec<&str> {
    let mut current = 0;
    let mut out = Vec::new();
    for cmd in commands {
        match cmd {
            DrawCommand::StartPage { page: p } => current = *p,
            DrawCommand::Text { text, .. } if current == page => out.push(text.as_str()),
            _ => {}
        }
    }
    out
}
