//! Order documents – packing slips, store invoices and pick lists.
//!
//! All three are letter-size continuous documents driven by the
//! [`FlowEngine`]; they differ only in their capacity table, the columns of
//! an item row and the totals block under the last row.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::capacity::slots_required;
use crate::error::{PrintError, SurfaceError};
use crate::fonts::truncate_with;
use crate::layout_config::{DocumentLayout, EngineConfig};
use crate::model::{Order, PriceRule};
use crate::pagination::{FlowCursor, FlowEngine, FlowObserver, PlacementEvent};
use crate::surface::{draw_right, Composition, FontHandle, RenderSurface};

const FAMILY: &str = "Helvetica";
const BODY_SIZE: f32 = 10.0;
const HEADER_Y: f32 = 40.0;
const LOGO_W: f32 = 120.0;
const LOGO_H: f32 = 60.0;
const BLOCK_Y: f32 = 110.0;
const BLOCK_PITCH: f32 = 13.0;
const CHECKBOX: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PackingSlip,
    StoreInvoice,
    PickList,
}

impl DocumentKind {
    pub fn layout(self, config: &EngineConfig) -> &DocumentLayout {
        match self {
            DocumentKind::PackingSlip => &config.packing_slip,
            DocumentKind::StoreInvoice => &config.store_invoice,
            DocumentKind::PickList => &config.pick_list,
        }
    }

    /// Pick lists print no prices, so they accept items without one.
    pub fn price_rule(self) -> PriceRule {
        match self {
            DocumentKind::PickList => PriceRule::Ignored,
            _ => PriceRule::Required,
        }
    }

    fn shows_prices(self) -> bool {
        self != DocumentKind::PickList
    }

    fn address_caption(self) -> &'static str {
        match self {
            DocumentKind::StoreInvoice => "Bill To:",
            _ => "Ship To:",
        }
    }
}

/// Horizontal positions of the row columns, derived from the page width
/// and margin.
#[derive(Debug, Clone, Copy)]
struct Columns {
    checkbox_x: f32,
    qty_right: f32,
    label_x: f32,
    label_max: f32,
    price_right: f32,
    total_right: f32,
}

impl Columns {
    fn for_layout(kind: DocumentKind, layout: &DocumentLayout) -> Self {
        let left = layout.margin_x;
        let right = layout.page.width_pt - layout.margin_x;
        let (qty_right, label_x) = match kind {
            DocumentKind::PickList => (left + CHECKBOX + 42.0, left + CHECKBOX + 52.0),
            _ => (left + 30.0, left + 40.0),
        };
        let price_right = right - 90.0;
        let label_end = if kind.shows_prices() { price_right - 70.0 } else { right };
        Self {
            checkbox_x: left,
            qty_right,
            label_x,
            label_max: (label_end - label_x).max(0.0),
            price_right,
            total_right: right,
        }
    }
}

fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Draws one order document as the flow engine reports placements.
struct SlipPainter<'a, S: RenderSurface + ?Sized> {
    kind: DocumentKind,
    layout: &'a DocumentLayout,
    config: &'a EngineConfig,
    order: &'a Order,
    columns: Columns,
    total_pages: u32,
    surface: &'a mut S,
    body_font: Option<FontHandle>,
}

impl<'a, S: RenderSurface + ?Sized> SlipPainter<'a, S> {
    fn body_font(&mut self) -> FontHandle {
        let font = self.surface.select_font(FAMILY, BODY_SIZE, false, false);
        self.body_font = Some(font.clone());
        font
    }

    fn draw_page_header(&mut self, page: u32) -> Result<(), SurfaceError> {
        let right = self.columns.total_right;
        let title_x = match (&self.config.logo_path, page) {
            (Some(_), 1) => self.layout.margin_x + LOGO_W + 10.0,
            _ => self.layout.margin_x,
        };

        self.surface.select_font(FAMILY, 16.0, true, false);
        self.surface.draw_text(title_x, HEADER_Y, &self.layout.title)?;

        let bold = self.surface.select_font(FAMILY, 11.0, true, false);
        draw_right(&mut *self.surface, &bold, right, HEADER_Y, &format!("Order #{}", self.order.id))?;
        let plain = self.surface.select_font(FAMILY, BODY_SIZE, false, false);
        draw_right(
            &mut *self.surface,
            &plain,
            right,
            HEADER_Y + 16.0,
            &format!("Page {page} of {}", self.total_pages),
        )
    }

    fn draw_first_page_blocks(&mut self) -> Result<(), SurfaceError> {
        let left = self.layout.margin_x;
        if let Some(logo) = &self.config.logo_path {
            self.surface.draw_image(logo, left, HEADER_Y - 4.0, LOGO_W, LOGO_H)?;
        }

        self.surface.select_font(FAMILY, 9.0, false, false);
        for (i, line) in self.config.store_lines.iter().enumerate() {
            self.surface.draw_text(left, BLOCK_Y + i as f32 * 12.0, line)?;
        }

        let block_x = self.layout.page.width_pt / 2.0 + 14.0;
        self.surface.select_font(FAMILY, BODY_SIZE, true, false);
        self.surface.draw_text(block_x, BLOCK_Y, self.kind.address_caption())?;
        self.surface.select_font(FAMILY, BODY_SIZE, false, false);

        let customer = &self.order.customer;
        let lines = std::iter::once(customer.name.as_str())
            .chain(customer.address_lines.iter().map(String::as_str))
            .chain(customer.email.as_deref())
            .chain(customer.phone.as_deref())
            .filter(|l| !l.trim().is_empty());
        for (i, line) in lines.enumerate() {
            self.surface
                .draw_text(block_x, BLOCK_Y + (i + 1) as f32 * BLOCK_PITCH, line)?;
        }

        self.draw_column_header()
    }

    fn draw_column_header(&mut self) -> Result<(), SurfaceError> {
        let c = self.columns;
        let y = self.layout.flow.first_page_top - self.layout.flow.line_height - 4.0;
        let font = self.surface.select_font(FAMILY, BODY_SIZE, true, false);
        draw_right(&mut *self.surface, &font, c.qty_right, y, "Qty")?;
        self.surface.draw_text(c.label_x, y, "Item")?;
        if self.kind.shows_prices() {
            draw_right(&mut *self.surface, &font, c.price_right, y, "Price")?;
            draw_right(&mut *self.surface, &font, c.total_right, y, "Total")?;
        }
        let rule_y = self.layout.flow.first_page_top - 4.0;
        self.surface
            .draw_line(self.layout.margin_x, rule_y, c.total_right, rule_y)
    }

    fn draw_checkbox(&mut self, y: f32) -> Result<(), SurfaceError> {
        let (x0, y0) = (self.columns.checkbox_x, y + 1.0);
        let (x1, y1) = (x0 + CHECKBOX, y0 + CHECKBOX);
        self.surface.draw_line(x0, y0, x1, y0)?;
        self.surface.draw_line(x1, y0, x1, y1)?;
        self.surface.draw_line(x1, y1, x0, y1)?;
        self.surface.draw_line(x0, y1, x0, y0)
    }

    /// Totals under the last row, on the last page.
    fn draw_totals(&mut self, top: f32) -> Result<(), SurfaceError> {
        let c = self.columns;
        let pitch = self.layout.flow.line_height;
        let totals = &self.order.totals;
        let rows: Vec<(&str, String)> = match self.kind {
            DocumentKind::PackingSlip => vec![
                ("Subtotal", money(totals.subtotal)),
                ("Shipping", money(totals.shipping)),
                ("Tax", money(totals.tax)),
                ("Total", money(totals.total)),
            ],
            DocumentKind::StoreInvoice => vec![
                ("Subtotal", money(totals.subtotal)),
                ("Tax", money(totals.tax)),
                ("Credit", money(totals.credit)),
            ],
            DocumentKind::PickList => vec![("Total quantity", self.order.total_quantity().to_string())],
        };

        self.surface.draw_line(c.price_right - 80.0, top, c.total_right, top)?;
        let last = rows.len() - 1;
        for (i, (caption, value)) in rows.iter().enumerate() {
            let y = top + 4.0 + i as f32 * pitch;
            let font = self.surface.select_font(FAMILY, BODY_SIZE, i == last, false);
            draw_right(&mut *self.surface, &font, c.price_right, y, caption)?;
            draw_right(&mut *self.surface, &font, c.total_right, y, value)?;
        }
        Ok(())
    }
}

impl<'a, S: RenderSurface + ?Sized> FlowObserver<'a> for SlipPainter<'a, S> {
    type Error = SurfaceError;

    fn on_page_start(&mut self, page: u32, _cursor: &FlowCursor) -> Result<(), SurfaceError> {
        self.surface.start_page()?;
        self.draw_page_header(page)?;
        if page == 1 {
            self.draw_first_page_blocks()?;
        }
        self.body_font();
        Ok(())
    }

    fn on_place(&mut self, event: PlacementEvent<'a>) -> Result<(), SurfaceError> {
        let c = self.columns;
        let y = event.vertical_position;
        let font = match &self.body_font {
            Some(font) => font.clone(),
            None => self.body_font(),
        };
        let item = event.item;

        if self.kind == DocumentKind::PickList {
            self.draw_checkbox(y)?;
        }
        draw_right(&mut *self.surface, &font, c.qty_right, y, &item.quantity().to_string())?;

        let surface = &*self.surface;
        let label = truncate_with(item.label(), c.label_max, |s| surface.measure_text(s, &font));
        self.surface.draw_text(c.label_x, y, &label)?;

        if self.kind.shows_prices() {
            draw_right(&mut *self.surface, &font, c.price_right, y, &money(item.unit_price()))?;
            draw_right(&mut *self.surface, &font, c.total_right, y, &money(item.line_total()))?;
        }
        Ok(())
    }
}

/// Render `order` as a `kind` document on `surface`.
///
/// The surface must be fresh: this starts and ends the document. The page
/// count printed in every header is computed up front from the capacity
/// table and always matches the pages the flow produces.
pub fn compose_order<S: RenderSurface + ?Sized>(
    kind: DocumentKind,
    order: &Order,
    config: &EngineConfig,
    surface: &mut S,
) -> Result<Composition, PrintError> {
    let layout = kind.layout(config);
    layout.capacity.validate(&layout.title)?;

    let engine = FlowEngine::new(layout.capacity, layout.flow);
    let total_pages = layout.capacity.pages_required(slots_required(order));

    surface.start_document(&layout.title)?;
    let mut painter = SlipPainter {
        kind,
        layout,
        config,
        order,
        columns: Columns::for_layout(kind, layout),
        total_pages,
        surface,
        body_font: None,
    };
    let summary = engine.flow(order, &mut painter)?;
    debug_assert_eq!(summary.pages, total_pages);
    painter.draw_totals(summary.final_position + layout.flow.line_height / 2.0)?;

    let document = painter.surface.end_document()?;
    log::debug!(
        "{} for order {}: {} items on {} pages",
        layout.title,
        order.id,
        summary.items_placed,
        document.page_count
    );
    Ok(Composition {
        document,
        printed_count: summary.items_placed as usize,
    })
}
