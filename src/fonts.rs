//! Font metrics and text measurement for the builtin PDF fonts.
//!
//! Helvetica, Courier and Times are never embedded, so there are no font
//! bytes to read advances from; each family is measured with an average
//! advance per character.

/// Builtin families the PDF surface can draw without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFamily {
    Helvetica,
    Courier,
    Times,
}

impl BuiltinFamily {
    /// Map a requested family name onto a builtin; unknown names fall back
    /// to Helvetica.
    pub fn resolve(family: &str) -> Self {
        let lower = family.to_ascii_lowercase();
        if lower.contains("courier") || lower.contains("mono") {
            BuiltinFamily::Courier
        } else if lower.contains("times") || (lower.contains("serif") && !lower.contains("sans")) {
            BuiltinFamily::Times
        } else {
            BuiltinFamily::Helvetica
        }
    }

    /// Average advance as a fraction of the font size.
    fn average_advance(self, bold: bool) -> f32 {
        match (self, bold) {
            (BuiltinFamily::Courier, _) => 0.6,
            (BuiltinFamily::Helvetica, false) => 0.5,
            (BuiltinFamily::Helvetica, true) => 0.55,
            (BuiltinFamily::Times, false) => 0.45,
            (BuiltinFamily::Times, true) => 0.5,
        }
    }
}

/// Width of `text` in points at `font_size`.
pub fn measure_text_width(text: &str, font_size: f32, bold: bool, family: &str) -> f32 {
    let avg = BuiltinFamily::resolve(family).average_advance(bold);
    text.chars().count() as f32 * font_size * avg
}

/// Ascender in points (0.75 × size for every builtin family).
pub fn ascender_pt(font_size: f32) -> f32 {
    font_size * 0.75
}

/// Shorten `text` with a trailing ellipsis so that `measure` reports it
/// within `max_width`.
pub fn truncate_with(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> String {
    if measure(text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>().trim_end().to_string() + "…";
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}
