//! Pipeline – ties together validation, flow or grid placement and
//! rendering into a single function call per print job.

use serde::{Deserialize, Serialize};

use crate::error::{Manifest, PrintError};
use crate::label::{GermRecord, LabelContent, LabelFace, LabelRecord};
use crate::label_print::{compose_germ_label, compose_labels, LabelMedium};
use crate::layout_config::{EngineConfig, PageSize};
use crate::model::OrderRecord;
use crate::render::PdfSurface;
use crate::slips::{compose_order, DocumentKind};
use crate::surface::{Composition, RecordingSurface, RenderSurface, RenderedDocument};

/// One print request, as JSON tagged by `"kind"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrintJob {
    PackingSlip(OrderRecord),
    StoreInvoice(OrderRecord),
    PickList(OrderRecord),
    FrontLabels {
        #[serde(default)]
        medium: LabelMedium,
        #[serde(default)]
        labels: Vec<LabelRecord>,
    },
    BackLabels {
        #[serde(default)]
        medium: LabelMedium,
        #[serde(default)]
        labels: Vec<LabelRecord>,
    },
    GermLabel(GermRecord),
}

impl PrintJob {
    pub fn from_json(json: &str) -> Result<Self, PrintError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrintJob::PackingSlip(_) => "packing slip",
            PrintJob::StoreInvoice(_) => "store invoice",
            PrintJob::PickList(_) => "pick list",
            PrintJob::FrontLabels { .. } => "front labels",
            PrintJob::BackLabels { .. } => "back labels",
            PrintJob::GermLabel(_) => "germination label",
        }
    }

    /// Page size of the physical output this job prints on.
    pub fn page_size(&self, config: &EngineConfig) -> PageSize {
        match self {
            PrintJob::PackingSlip(_) => config.packing_slip.page,
            PrintJob::StoreInvoice(_) => config.store_invoice.page,
            PrintJob::PickList(_) => config.pick_list.page,
            PrintJob::FrontLabels { medium, .. } | PrintJob::BackLabels { medium, .. } => match medium {
                LabelMedium::Roll => config.roll_label,
                LabelMedium::Sheet => config.sheet_page,
            },
            PrintJob::GermLabel(_) => config.germ_label.page,
        }
    }
}

/// Per-request settings. Nothing here is process-wide.
#[derive(Debug, Clone)]
pub struct PrintContext {
    /// Record drawing calls and log them instead of producing a PDF.
    pub dry_run: bool,
    /// Full print passes to run; each gets its own surface.
    pub copies: u32,
    pub config: EngineConfig,
}

impl Default for PrintContext {
    fn default() -> Self {
        Self {
            dry_run: false,
            copies: 1,
            config: EngineConfig::default(),
        }
    }
}

/// Result of one print pass.
#[derive(Debug, Clone)]
pub struct PrintOutcome {
    pub document: RenderedDocument,
    /// Skipped items and substituted values.
    pub manifest: Manifest,
    /// Items or labels actually drawn.
    pub printed_count: usize,
    pub page_count: u32,
}

fn validate_labels(records: &[LabelRecord], manifest: &mut Manifest) -> Vec<LabelContent> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| record.validate(i + 1, manifest))
        .collect()
}

/// Run one flow-and-render pass of `job` on `surface`.
///
/// Per-item problems end up in the outcome's manifest; any surface failure
/// aborts the document and is returned as `Err`.
pub fn print_job<S: RenderSurface + ?Sized>(
    job: &PrintJob,
    ctx: &PrintContext,
    surface: &mut S,
) -> Result<PrintOutcome, PrintError> {
    log::info!("printing {}{}", job.name(), if ctx.dry_run { " (dry run)" } else { "" });
    let config = &ctx.config;
    let mut manifest = Manifest::new();

    let composition = match job {
        PrintJob::PackingSlip(record) | PrintJob::StoreInvoice(record) | PrintJob::PickList(record) => {
            let kind = match job {
                PrintJob::StoreInvoice(_) => DocumentKind::StoreInvoice,
                PrintJob::PickList(_) => DocumentKind::PickList,
                _ => DocumentKind::PackingSlip,
            };
            let (order, issues) = record.validate(kind.price_rule());
            manifest.extend(issues);
            compose_order(kind, &order, config, surface)?
        }
        PrintJob::FrontLabels { medium, labels } => {
            let contents = validate_labels(labels, &mut manifest);
            compose_labels(LabelFace::Front, *medium, &contents, config, surface)?
        }
        PrintJob::BackLabels { medium, labels } => {
            let contents = validate_labels(labels, &mut manifest);
            compose_labels(LabelFace::Back, *medium, &contents, config, surface)?
        }
        PrintJob::GermLabel(record) => match record.validate(&mut manifest) {
            Some(label) => compose_germ_label(&label, config, surface)?,
            None => {
                surface.start_document("Germination Label")?;
                Composition {
                    document: surface.end_document()?,
                    printed_count: 0,
                }
            }
        },
    };

    let Composition {
        document,
        printed_count,
    } = composition;
    log::info!(
        "{} done: {printed_count} printed on {} pages, {} manifest entries",
        job.name(),
        document.page_count,
        manifest.entries.len()
    );
    Ok(PrintOutcome {
        page_count: document.page_count,
        document,
        manifest,
        printed_count,
    })
}

/// Run `ctx.copies` sequential passes of `job`, each on a fresh surface:
/// a [`PdfSurface`] sized for the job, or an echoing [`RecordingSurface`]
/// when `ctx.dry_run` is set.
pub fn render_copies(job: &PrintJob, ctx: &PrintContext) -> Result<Vec<PrintOutcome>, PrintError> {
    ctx.config.validate()?;
    let copies = ctx.copies.max(1);
    (1..=copies)
        .map(|pass| {
            log::debug!("pass {pass} of {copies}");
            if ctx.dry_run {
                print_job(job, ctx, &mut RecordingSurface::echoing())
            } else {
                let page = job.page_size(&ctx.config);
                print_job(job, ctx, &mut PdfSurface::new(page.width_pt, page.height_pt))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItemIssue;
    use crate::samples;
    use crate::surface::DrawCommand;

    fn job(json: &str) -> PrintJob {
        PrintJob::from_json(json).unwrap()
    }

    fn dry() -> PrintContext {
        PrintContext {
            dry_run: true,
            ..PrintContext::default()
        }
    }

    #[test]
    fn parses_every_kind() {
        for (json, name) in [
            (samples::packing_slip().to_string(), "packing slip"),
            (samples::store_invoice().to_string(), "store invoice"),
            (samples::pick_list().to_string(), "pick list"),
            (samples::front_labels().to_string(), "front labels"),
            (samples::back_labels().to_string(), "back labels"),
            (samples::germ_label(), "germination label"),
        ] {
            assert_eq!(job(&json).name(), name);
        }
    }

    #[test]
    fn unknown_kind_is_an_invalid_job() {
        let err = PrintJob::from_json(r#"{"kind": "shipping_manifest"}"#).unwrap_err();
        assert!(matches!(err, PrintError::InvalidJob(_)));
    }

    #[test]
    fn missing_price_is_skipped_and_reported() {
        let j = job(
            r#"{"kind": "packing_slip", "id": "55",
                "items": [
                    {"category": "pkt", "label": "Sungold", "qty": 1, "price": "3.25"},
                    {"category": "pkt", "label": "Brandywine", "qty": 2}
                ]}"#,
        );
        let mut s = RecordingSurface::new();
        let out = print_job(&j, &PrintContext::default(), &mut s).unwrap();
        assert_eq!(out.printed_count, 1);
        assert_eq!(out.manifest.missing().count(), 1);
        assert_eq!(
            out.manifest.entries[0].issue,
            ItemIssue::MissingRequiredField { field: "unit_price" }
        );
    }

    #[test]
    fn pick_list_keeps_unpriced_items() {
        let j = job(r#"{"kind": "pick_list", "id": "56", "items": [{"label": "Kale", "qty": 3}]}"#);
        let out = print_job(&j, &dry(), &mut RecordingSurface::new()).unwrap();
        assert_eq!(out.printed_count, 1);
        assert!(out.manifest.is_empty());
    }

    #[test]
    fn oversized_numbers_are_substituted_not_overflowed() {
        let j = job(
            r#"{"kind": "packing_slip", "id": "57", "items": [
                {"label": "Oats", "qty": 9223372036854775807, "price": "79228162514264337593543950"}
            ]}"#,
        );
        let out = print_job(&j, &PrintContext::default(), &mut RecordingSurface::new()).unwrap();
        assert_eq!(out.printed_count, 1);
        assert_eq!(out.manifest.substituted().count(), 2);
    }

    #[test]
    fn pick_list_quantity_sum_stays_in_range() {
        let j = job(
            r#"{"kind": "pick_list", "id": "58", "items": [
                {"label": "Kale", "qty": 9223372036854775807},
                {"label": "Leek", "qty": 1}
            ]}"#,
        );
        let mut s = RecordingSurface::new();
        let out = print_job(&j, &PrintContext::default(), &mut s).unwrap();
        assert_eq!(out.printed_count, 2);
        assert_eq!(out.manifest.substituted().count(), 1);
        let texts: Vec<&str> = s
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"1"));
    }

    #[test]
    fn label_without_lot_code_is_skipped() {
        let j = job(
            r#"{"kind": "back_labels", "medium": "sheet", "labels": [
                {"variety": "Sungold", "crop": "Tomato", "lot_code": "A1", "copies": 2},
                {"variety": "Orphan", "crop": "Tomato"}
            ]}"#,
        );
        let out = print_job(&j, &dry(), &mut RecordingSurface::new()).unwrap();
        assert_eq!(out.printed_count, 2);
        assert_eq!(out.page_count, 1);
        assert_eq!(out.manifest.missing().next().unwrap().subject, "label 2 (Orphan)");
    }

    #[test]
    fn invalid_germ_label_prints_an_empty_document() {
        let j = job(r#"{"kind": "germ_label", "variety": "Sungold"}"#);
        let out = print_job(&j, &dry(), &mut RecordingSurface::new()).unwrap();
        assert_eq!(out.printed_count, 0);
        assert_eq!(out.page_count, 0);
        assert_eq!(out.manifest.missing().count(), 1);
    }

    #[test]
    fn dry_run_copies_are_independent_passes() {
        let ctx = PrintContext {
            copies: 3,
            ..dry()
        };
        let outcomes = render_copies(&job(samples::front_labels()), &ctx).unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.document.commands().is_some()));
        assert_eq!(outcomes[0].document, outcomes[2].document);
    }

    #[test]
    fn pdf_copy_uses_job_page_size() {
        let outcomes = render_copies(&job(&samples::germ_label()), &PrintContext::default()).unwrap();
        let bytes = outcomes[0].document.pdf_bytes().unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(outcomes[0].page_count, 1);
    }

    #[test]
    fn bad_config_stops_before_printing() {
        let mut ctx = dry();
        ctx.config.packing_slip.capacity.first_page_capacity = -5;
        let err = render_copies(&job(samples::packing_slip()), &ctx).unwrap_err();
        assert!(matches!(err, PrintError::CapacityTableMisconfiguration { first: -5, .. }));
    }
}
