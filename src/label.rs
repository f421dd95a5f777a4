//! Label content model: what goes on a seed label, how request records are
//! validated into it, and which lines each face of a label carries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ItemIssue, Manifest};
use crate::model::read_integer;
use crate::variant::{package_text, quote_variety, select_variant, RadiantBlock, TemplateVariant, RAD_FONT_SIZE, RAD_SHIFT};

/// Most identical copies one label record may request.
pub const MAX_LABEL_COPIES: u32 = 1_000;

/// Growing-environment class of a package; decides the size-class marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvType {
    Commercial,
    HomeGarden,
    #[default]
    Standard,
}

impl EnvType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "commercial" | "market" => EnvType::Commercial,
            "home" | "home_garden" | "garden" => EnvType::HomeGarden,
            _ => EnvType::Standard,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            EnvType::Commercial => "••",
            EnvType::HomeGarden => "•",
            EnvType::Standard => "",
        }
    }
}

/// Everything printed on one seed label (front and back).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelContent {
    pub variety: String,
    pub crop: String,
    pub desc_line1: String,
    pub desc_line2: String,
    pub desc_line3: Option<String>,
    pub package_size: Option<String>,
    pub env_type: EnvType,
    pub sku_prefix: Option<String>,
    pub lot_code: String,
    pub germination: Option<String>,
    pub packed_for: Option<String>,
    pub rad_type: Option<String>,
    /// Identical labels to print from this content.
    pub copies: u32,
}

impl LabelContent {
    /// `SKU-LOT`, or the bare lot code without a prefix.
    pub fn lot_number(&self) -> String {
        match &self.sku_prefix {
            Some(prefix) => format!("{prefix}-{}", self.lot_code),
            None => self.lot_code.clone(),
        }
    }

    pub fn variant(&self) -> TemplateVariant {
        select_variant(self)
    }
}

/// A label as it arrives in a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelRecord {
    #[serde(default, alias = "variety_name")]
    pub variety: Option<String>,
    #[serde(default, alias = "common_name")]
    pub crop: Option<String>,
    #[serde(default)]
    pub desc_line1: Option<String>,
    #[serde(default)]
    pub desc_line2: Option<String>,
    #[serde(default)]
    pub desc_line3: Option<String>,
    #[serde(default)]
    pub package_size: Option<String>,
    #[serde(default)]
    pub env_type: Option<String>,
    #[serde(default)]
    pub sku_prefix: Option<String>,
    #[serde(default)]
    pub lot_code: Option<String>,
    #[serde(default)]
    pub germination: Option<String>,
    #[serde(default, alias = "germ_year")]
    pub packed_for: Option<String>,
    #[serde(default)]
    pub rad_type: Option<String>,
    #[serde(default, alias = "quantity")]
    pub copies: Option<Value>,
}

/// Trim and drop blank strings: an empty field counts as absent.
fn present(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl LabelRecord {
    pub fn validate(&self, index: usize, manifest: &mut Manifest) -> Option<LabelContent> {
        let variety = present(&self.variety);
        let subject = match &variety {
            Some(v) => format!("label {index} ({v})"),
            None => format!("label {index}"),
        };

        let absent = [
            ("variety", variety.is_none()),
            ("crop", present(&self.crop).is_none()),
            ("lot_code", present(&self.lot_code).is_none()),
        ];
        // Report the first missing field only; the label is skipped either way.
        if let Some(&(field, _)) = absent.iter().find(|(_, missing)| *missing) {
            manifest.record(subject, ItemIssue::MissingRequiredField { field });
            return None;
        }

        let copies = match &self.copies {
            None | Some(Value::Null) => 1,
            Some(raw) => match read_integer(raw)
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n <= MAX_LABEL_COPIES)
            {
                Some(n) => n,
                None => {
                    manifest.record(
                        subject.clone(),
                        ItemIssue::InvalidNumericValue {
                            field: "copies",
                            raw: raw.to_string(),
                            substituted: "1".into(),
                        },
                    );
                    1
                }
            },
        };

        Some(LabelContent {
            variety: variety.unwrap_or_default(),
            crop: present(&self.crop).unwrap_or_default(),
            desc_line1: present(&self.desc_line1).unwrap_or_default(),
            desc_line2: present(&self.desc_line2).unwrap_or_default(),
            desc_line3: present(&self.desc_line3),
            package_size: present(&self.package_size),
            env_type: self.env_type.as_deref().map(EnvType::parse).unwrap_or_default(),
            sku_prefix: present(&self.sku_prefix),
            lot_code: present(&self.lot_code).unwrap_or_default(),
            germination: present(&self.germination),
            packed_for: present(&self.packed_for),
            rad_type: present(&self.rad_type),
            copies,
        })
    }
}

/// Germination-sample label for the roll printer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GermLabel {
    pub variety: String,
    pub species: String,
    pub sku_prefix: String,
    pub lot_code: String,
    /// Pre-generated barcode image (path or data URI) encoding the lot number.
    pub barcode_image: Option<String>,
}

impl GermLabel {
    pub fn lot_number(&self) -> String {
        format!("{}-{}", self.sku_prefix, self.lot_code)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GermRecord {
    #[serde(default, alias = "variety_name")]
    pub variety: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub sku_prefix: Option<String>,
    #[serde(default)]
    pub lot_code: Option<String>,
    #[serde(default)]
    pub barcode_image: Option<String>,
}

impl GermRecord {
    pub fn validate(&self, manifest: &mut Manifest) -> Option<GermLabel> {
        let variety = present(&self.variety);
        let subject = match &variety {
            Some(v) => format!("germ label ({v})"),
            None => "germ label".to_string(),
        };
        let fields = [
            ("variety", variety),
            ("species", present(&self.species)),
            ("sku_prefix", present(&self.sku_prefix)),
            ("lot_code", present(&self.lot_code)),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, v)| v.is_none()) {
            manifest.record(subject, ItemIssue::MissingRequiredField { field });
            return None;
        }
        let [variety, species, sku_prefix, lot_code] = fields.map(|(_, v)| v.unwrap_or_default());
        Some(GermLabel {
            variety,
            species,
            sku_prefix,
            lot_code,
            barcode_image: present(&self.barcode_image),
        })
    }
}

// ---------------------------------------------------------------------------
// Line composition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFace {
    Front,
    Back,
}

/// One centred text line of a label, `y` measured from the label top.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLine {
    pub text: String,
    pub family: &'static str,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub y: f32,
}

impl LabelLine {
    fn plain(text: impl Into<String>, size: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            family: "Helvetica",
            size,
            bold: false,
            italic: false,
            y,
        }
    }
}

pub fn lines_for(content: &LabelContent, face: LabelFace) -> Vec<LabelLine> {
    match face {
        LabelFace::Front => front_lines(content),
        LabelFace::Back => back_lines(content),
    }
}

/// Front face: variety, crop, optional radiant line, descriptions, package.
pub fn front_lines(content: &LabelContent) -> Vec<LabelLine> {
    let variant = content.variant();
    let m = variant.metrics();
    let mut y = m.top;
    let mut lines = Vec::with_capacity(7);

    lines.push(LabelLine {
        bold: true,
        ..LabelLine::plain(quote_variety(&content.variety), m.font_size + 1.0, y)
    });
    y += m.pitch;
    lines.push(LabelLine::plain(content.crop.clone(), m.font_size, y));
    y += m.pitch;

    if let (RadiantBlock::WithRadType, Some(rad)) = (variant.radiant, &content.rad_type) {
        lines.push(LabelLine {
            italic: true,
            ..LabelLine::plain(rad.clone(), RAD_FONT_SIZE, y)
        });
        y += RAD_SHIFT;
    }

    let descriptions = [Some(&content.desc_line1), Some(&content.desc_line2), content.desc_line3.as_ref()];
    for desc in descriptions.into_iter().flatten() {
        lines.push(LabelLine::plain(desc.clone(), m.font_size, y));
        y += m.pitch;
    }

    if let Some(size) = &content.package_size {
        lines.push(LabelLine::plain(package_text(size, content.env_type), m.font_size, y));
    }
    lines
}

/// Back face: variety, lot number, germination and pack year, package.
pub fn back_lines(content: &LabelContent) -> Vec<LabelLine> {
    const TOP: f32 = 8.0;
    const PITCH: f32 = 12.0;
    const SIZE: f32 = 9.0;

    let mut texts = vec![format!("Lot: {}", content.lot_number())];
    if let Some(germ) = &content.germination {
        texts.push(format!("Germination: {germ}"));
    }
    if let Some(year) = &content.packed_for {
        texts.push(format!("Packed for {year}"));
    }
    if let Some(size) = &content.package_size {
        texts.push(package_text(size, content.env_type));
    }

    let mut lines = vec![LabelLine {
        bold: true,
        ..LabelLine::plain(quote_variety(&content.variety), SIZE, TOP)
    }];
    lines.extend(
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| LabelLine::plain(text, SIZE, TOP + (i + 1) as f32 * PITCH)),
    );
    lines
}

/// Germination label: three centred Courier lines.
pub fn germ_lines(label: &GermLabel, size: f32, top: f32, pitch: f32) -> Vec<LabelLine> {
    [
        quote_variety(&label.variety),
        label.species.clone(),
        format!("Lot: {}", label.lot_number()),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, text)| LabelLine {
        family: "Courier",
        ..LabelLine::plain(text, size, top + i as f32 * pitch)
    })
    .collect()
}
