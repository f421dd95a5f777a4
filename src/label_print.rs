//! Label printing – one engine for both faces and both media.
//!
//! A roll is the degenerate case of a sheet: one label per page of the
//! label size, drawn at the page origin. Sheets place labels with the grid
//! engine and start a new letter page whenever the slot's page changes.

use serde::{Deserialize, Serialize};

use crate::error::{PrintError, SurfaceError};
use crate::fonts::truncate_with;
use crate::grid::place;
use crate::label::{germ_lines, lines_for, GermLabel, LabelContent, LabelFace, LabelLine};
use crate::layout_config::EngineConfig;
use crate::surface::{draw_centered, Composition, RenderSurface};

/// Horizontal padding kept free on each side of a label line.
const PADDING: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMedium {
    #[default]
    Roll,
    Sheet,
}

/// Repeat each label `copies` times, keeping input order.
pub fn expand_copies(contents: &[LabelContent]) -> Vec<&LabelContent> {
    contents
        .iter()
        .flat_map(|c| std::iter::repeat(c).take(c.copies as usize))
        .collect()
}

/// Draw `lines` centred in a `width`-wide label whose top-left corner is
/// (`x`, `y`).
fn draw_label_lines<S: RenderSurface + ?Sized>(
    surface: &mut S,
    lines: &[LabelLine],
    family: Option<&str>,
    x: f32,
    y: f32,
    width: f32,
) -> Result<(), SurfaceError> {
    let max_width = (width - 2.0 * PADDING).max(0.0);
    for line in lines {
        let font = surface.select_font(family.unwrap_or(line.family), line.size, line.bold, line.italic);
        let text = truncate_with(&line.text, max_width, |s| surface.measure_text(s, &font));
        draw_centered(surface, &font, x + width / 2.0, y + line.y, &text)?;
    }
    Ok(())
}

/// Print `face` of every label in `contents` on `medium`.
pub fn compose_labels<S: RenderSurface + ?Sized>(
    face: LabelFace,
    medium: LabelMedium,
    contents: &[LabelContent],
    config: &EngineConfig,
    surface: &mut S,
) -> Result<Composition, PrintError> {
    let labels = expand_copies(contents);
    let title = match face {
        LabelFace::Front => "Front Labels",
        LabelFace::Back => "Back Labels",
    };
    surface.start_document(title)?;

    match medium {
        LabelMedium::Roll => {
            let width = config.roll_label.width_pt;
            for content in &labels {
                surface.start_page()?;
                draw_label_lines(surface, &lines_for(content, face), None, 0.0, 0.0, width)?;
                surface.end_page()?;
            }
        }
        LabelMedium::Sheet => {
            let geometry = &config.label_sheet;
            if !labels.is_empty() {
                log::debug!(
                    "{} labels on {} sheets",
                    labels.len(),
                    geometry.shape.pages_for(labels.len())
                );
            }
            let slots = place(labels.len(), geometry.shape);
            let mut current_page = 0;
            for (content, slot) in labels.iter().zip(slots) {
                if slot.page != current_page {
                    if current_page > 0 {
                        surface.end_page()?;
                        log::debug!("label sheet {current_page} full, starting sheet {}", slot.page);
                    }
                    surface.start_page()?;
                    current_page = slot.page;
                }
                let (x, y) = geometry.origin_of(slot);
                draw_label_lines(surface, &lines_for(content, face), None, x, y, geometry.cell_width)?;
            }
            if current_page > 0 {
                surface.end_page()?;
            }
            debug_assert!(labels.is_empty() || current_page == geometry.shape.pages_for(labels.len()));
        }
    }

    let document = surface.end_document()?;
    Ok(Composition {
        document,
        printed_count: labels.len(),
    })
}

/// Print one germination-sample label: three Courier lines and the
/// pre-generated barcode image under them.
pub fn compose_germ_label<S: RenderSurface + ?Sized>(
    label: &GermLabel,
    config: &EngineConfig,
    surface: &mut S,
) -> Result<Composition, PrintError> {
    let germ = &config.germ_label;
    let width = germ.page.width_pt;
    let lines = germ_lines(label, germ.font_size, germ.top, germ.line_height);

    surface.start_document("Germination Label")?;
    surface.start_page()?;
    draw_label_lines(surface, &lines, Some(germ.font_family.as_str()), 0.0, 0.0, width)?;

    match &label.barcode_image {
        Some(barcode) => {
            let bar_w = width * germ.barcode_width_ratio;
            let last_y = lines.last().map_or(germ.top, |l| l.y);
            let bar_y = last_y + germ.line_height + germ.barcode_gap;
            surface.draw_image(barcode, (width - bar_w) / 2.0, bar_y, bar_w, germ.barcode_height)?;
        }
        None => log::warn!("germ label for lot {} has no barcode image", label.lot_number()),
    }
    surface.end_page()?;

    let document = surface.end_document()?;
    Ok(Composition {
        document,
        printed_count: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Manifest;
    use crate::label::{EnvType, LabelRecord};
    use crate::surface::{texts_on_page, DrawCommand, RecordingSurface};
    use serde_json::json;

    fn content(variety: &str, copies: u32) -> LabelContent {
        LabelContent {
            variety: variety.into(),
            crop: "Tomato".into(),
            desc_line1: "Indeterminate".into(),
            desc_line2: "75 days".into(),
            desc_line3: None,
            package_size: Some("25 seeds".into()),
            env_type: EnvType::HomeGarden,
            sku_prefix: Some("TOM".into()),
            lot_code: "A7".into(),
            germination: Some("91%".into()),
            packed_for: Some("2026".into()),
            rad_type: None,
            copies,
        }
    }

    fn page_starts(cmds: &[DrawCommand]) -> usize {
        cmds.iter().filter(|c| matches!(c, DrawCommand::StartPage { .. })).count()
    }

    #[test]
    fn copies_expand_in_order() {
        let contents = vec![content("A", 2), content("B", 0), content("C", 1)];
        let names: Vec<&str> = expand_copies(&contents).iter().map(|c| c.variety.as_str()).collect();
        assert_eq!(names, vec!["A", "A", "C"]);
    }

    #[test]
    fn roll_prints_one_page_per_label() {
        let mut s = RecordingSurface::new();
        let out = compose_labels(
            LabelFace::Front,
            LabelMedium::Roll,
            &[content("Sungold", 3)],
            &EngineConfig::default(),
            &mut s,
        )
        .unwrap();
        assert_eq!(out.printed_count, 3);
        assert_eq!(out.document.page_count, 3);
        let texts = texts_on_page(out.document.commands().unwrap(), 2);
        assert_eq!(texts[0], "'Sungold'");
        assert!(texts.contains(&"25 seeds •"));
    }

    #[test]
    fn sheet_of_31_spills_onto_second_page() {
        let mut s = RecordingSurface::new();
        let out = compose_labels(
            LabelFace::Back,
            LabelMedium::Sheet,
            &[content("Brandywine", 31)],
            &EngineConfig::default(),
            &mut s,
        )
        .unwrap();
        let cmds = out.document.commands().unwrap();
        assert_eq!(page_starts(cmds), 2);
        assert_eq!(out.document.page_count, EngineConfig::default().label_sheet.shape.pages_for(31));
        assert_eq!(out.printed_count, 31);
        // Only the 31st label's lines land on page 2.
        let second = texts_on_page(cmds, 2);
        assert_eq!(second.iter().filter(|t| t.starts_with("Lot:")).count(), 1);
        assert_eq!(texts_on_page(cmds, 1).iter().filter(|t| t.starts_with("Lot:")).count(), 30);
    }

    #[test]
    fn sheet_offsets_follow_column_corrections() {
        let config = EngineConfig::default();
        let mut s = RecordingSurface::new();
        let out = compose_labels(LabelFace::Front, LabelMedium::Sheet, &[content("X", 3)], &config, &mut s).unwrap();
        let cmds = out.document.commands().unwrap();
        let xs: Vec<f32> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { x, text, .. } if text == "'X'" => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs.len(), 3);
        let g = &config.label_sheet;
        let spacing = xs[1] - xs[0];
        let expected = g.pitch_x + g.column_corrections[1] - g.column_corrections[0];
        assert!((spacing - expected).abs() < 1e-3);
    }

    #[test]
    fn empty_batch_prints_nothing() {
        let mut s = RecordingSurface::new();
        let out = compose_labels(LabelFace::Front, LabelMedium::Sheet, &[], &EngineConfig::default(), &mut s).unwrap();
        assert_eq!(out.document.page_count, 0);
        assert_eq!(out.printed_count, 0);
    }

    #[test]
    fn germ_label_draws_courier_lines_and_barcode() {
        let mut m = Manifest::new();
        let label = crate::label::GermRecord {
            variety: Some("Cherokee Purple (OP)".into()),
            species: Some("Solanum lycopersicum".into()),
            sku_prefix: Some("TOM".into()),
            lot_code: Some("B17".into()),
            barcode_image: Some("barcode.png".into()),
        }
        .validate(&mut m)
        .unwrap();
        let config = EngineConfig::default();
        let mut s = RecordingSurface::new();
        let out = compose_germ_label(&label, &config, &mut s).unwrap();
        let cmds = out.document.commands().unwrap();
        assert_eq!(
            texts_on_page(cmds, 1),
            vec!["'Cherokee Purple' (OP)", "Solanum lycopersicum", "Lot: TOM-B17"]
        );
        assert!(cmds.iter().any(|c| matches!(c, DrawCommand::SelectFont(f) if f.family == "Courier New")));
        let image = cmds.iter().find_map(|c| match c {
            DrawCommand::Image { x, w, .. } => Some((*x, *w)),
            _ => None,
        });
        let (x, w) = image.unwrap();
        let width = config.germ_label.page.width_pt;
        assert!((w - width * 0.9).abs() < 1e-3);
        assert!((x - width * 0.05).abs() < 1e-3);
    }

    #[test]
    fn three_line_variant_prints_third_description() {
        let mut m = Manifest::new();
        let c: LabelRecord = serde_json::from_value(json!({
            "variety": "Dragon Tongue", "crop": "Bean", "lot_code": "C2",
            "desc_line1": "Flat wax pod", "desc_line2": "Purple streaks", "desc_line3": "58 days"
        }))
        .unwrap();
        let c = c.validate(1, &mut m).unwrap();
        let mut s = RecordingSurface::new();
        let out = compose_labels(LabelFace::Front, LabelMedium::Roll, &[c], &EngineConfig::default(), &mut s).unwrap();
        assert!(texts_on_page(out.document.commands().unwrap(), 1).contains(&"58 days"));
    }
}
