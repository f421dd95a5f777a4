//! Template variant selection and the text transforms applied to label
//! fields before they are measured.

use serde::{Deserialize, Serialize};

use crate::label::{EnvType, LabelContent};

/// How many description lines the front layout carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DescriptionLayout {
    TwoLines,
    ThreeLines,
}

/// Whether the radiant-type line is inserted under the crop name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadiantBlock {
    Standard,
    WithRadType,
}

/// The line layout used for a label's front face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateVariant {
    pub description: DescriptionLayout,
    pub radiant: RadiantBlock,
}

/// Vertical metrics of one line layout, in points from the label top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantMetrics {
    pub top: f32,
    pub pitch: f32,
    pub font_size: f32,
}

/// Extra drop applied to every line below the radiant-type line.
pub const RAD_SHIFT: f32 = 8.5;
pub const RAD_FONT_SIZE: f32 = 7.0;

impl TemplateVariant {
    pub fn metrics(&self) -> VariantMetrics {
        match self.description {
            DescriptionLayout::TwoLines => VariantMetrics {
                top: 6.0,
                pitch: 11.5,
                font_size: 9.0,
            },
            DescriptionLayout::ThreeLines => VariantMetrics {
                top: 4.0,
                pitch: 10.0,
                font_size: 8.0,
            },
        }
    }
}

/// Pick the layout from which optional fields are present. Nothing else
/// about the content is consulted.
pub fn select_variant(content: &LabelContent) -> TemplateVariant {
    variant_for(content.desc_line3.is_some(), content.rad_type.is_some())
}

pub fn variant_for(has_desc_line3: bool, has_rad_type: bool) -> TemplateVariant {
    TemplateVariant {
        description: if has_desc_line3 {
            DescriptionLayout::ThreeLines
        } else {
            DescriptionLayout::TwoLines
        },
        radiant: if has_rad_type {
            RadiantBlock::WithRadType
        } else {
            RadiantBlock::Standard
        },
    }
}

/// Quote a variety name. With a parenthesised suffix only the part before
/// the parenthesis is quoted: `Cherokee Purple (OP)` → `'Cherokee Purple' (OP)`.
pub fn quote_variety(name: &str) -> String {
    let name = name.trim();
    match name.find('(') {
        Some(idx) if idx > 0 => {
            let (head, tail) = name.split_at(idx);
            format!("'{}' {}", head.trim_end(), tail)
        }
        _ => format!("'{name}'"),
    }
}

/// Package-size text with the size-class marker appended.
pub fn package_text(size: &str, env: EnvType) -> String {
    let size = size.trim();
    match env.suffix() {
        "" => size.to_string(),
        suffix => format!("{size} {suffix}"),
    }
}
