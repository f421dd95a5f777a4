//! Sample print jobs for testing and demonstration.
//!
//! Each job exercises a different document kind; the generators build
//! orders and label batches of any size.

/// 1×1 PNG used as a stand-in barcode image.
pub const BARCODE_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Small packing slip with one item in each category.
pub fn packing_slip() -> &'static str {
    r#"{
    "kind": "packing_slip",
    "id": "10452",
    "customer": {
        "name": "Marguerite Okafor",
        "address_lines": ["418 Orchard Row", "Decorah, IA 52101"],
        "email": "m.okafor@example.com"
    },
    "shipping": "6.95",
    "tax": 1.12,
    "items": [
        {"category": "pkt", "label": "Cherokee Purple Tomato", "qty": 2, "price": "3.75"},
        {"category": "misc", "label": "Gift card", "qty": 1, "price": 25},
        {"category": "bulk", "label": "Provider Bush Bean, 1 lb", "qty": 1, "price": "14.50"},
        {"category": "pkt", "label": "Lacinato Kale", "qty": 1, "price": "3.50"}
    ]
}"#
}

/// Store invoice: wholesale order billed with store credit.
pub fn store_invoice() -> &'static str {
    r#"{
    "kind": "store_invoice",
    "order_id": "S-2231",
    "customer": {
        "name": "Prairie Moon Garden Center",
        "address_lines": ["9 Depot St", "Viroqua, WI 54665"],
        "phone": "608-555-0147"
    },
    "tax": "4.20",
    "credit": "-12.00",
    "items": [
        {"category": "pkt", "label": "Sungold Tomato", "qty": 24, "price": "1.90"},
        {"category": "pkt", "label": "Dragon Tongue Bean", "qty": 12, "price": "1.90"},
        {"category": "pkt", "label": "Genovese Basil", "qty": 24, "price": "1.60"}
    ]
}"#
}

/// Pick list: no prices needed.
pub fn pick_list() -> &'static str {
    r#"{
    "kind": "pick_list",
    "id": "10453",
    "items": [
        {"category": "bulk", "name": "Vates Collards, 1/4 lb", "qty": 2},
        {"category": "pkt", "name": "Tendergreen Mustard", "qty": 3},
        {"category": "pkt", "name": "Red Russian Kale", "qty": "1"}
    ]
}"#
}

/// Front labels on the roll, one of them using the three-line and
/// radiant-type layouts.
pub fn front_labels() -> &'static str {
    r#"{
    "kind": "front_labels",
    "medium": "roll",
    "labels": [
        {
            "variety": "Cherokee Purple (OP)",
            "crop": "Tomato",
            "desc_line1": "Dusky rose beefsteak",
            "desc_line2": "80 days from transplant",
            "package_size": "30 seeds",
            "env_type": "home_garden",
            "sku_prefix": "TOM",
            "lot_code": "B17",
            "copies": 2
        },
        {
            "variety": "Bright Lights",
            "crop": "Swiss Chard",
            "rad_type": "Multicolor stems",
            "desc_line1": "Gold, pink, orange and red",
            "desc_line2": "Mild flavour",
            "desc_line3": "55 days",
            "package_size": "1 oz",
            "env_type": "commercial",
            "lot_code": "C04"
        }
    ]
}"#
}

/// Back labels on a 30-up sheet.
pub fn back_labels() -> &'static str {
    r#"{
    "kind": "back_labels",
    "medium": "sheet",
    "labels": [
        {
            "variety": "Lacinato",
            "crop": "Kale",
            "sku_prefix": "KAL",
            "lot_code": "A22",
            "germination": "92%",
            "packed_for": "2026",
            "package_size": "250 seeds",
            "copies": 12
        }
    ]
}"#
}

pub fn germ_label() -> String {
    format!(
        r#"{{
    "kind": "germ_label",
    "variety": "Cherokee Purple (OP)",
    "species": "Solanum lycopersicum",
    "sku_prefix": "TOM",
    "lot_code": "B17",
    "barcode_image": "{BARCODE_PNG}"
}}"#
    )
}

/// Order job of `kind` with `misc`, `bulk` and `pkt` items, every item
/// priced at $2.00.
pub fn order_job(kind: &str, misc: usize, bulk: usize, pkt: usize) -> String {
    let items: Vec<serde_json::Value> = [("misc", misc), ("bulk", bulk), ("pkt", pkt)]
        .into_iter()
        .flat_map(|(category, n)| {
            (1..=n).map(move |i| {
                serde_json::json!({
                    "category": category,
                    "label": format!("{category} item {i}"),
                    "qty": 1,
                    "price": "2.00"
                })
            })
        })
        .collect();
    serde_json::json!({
        "kind": kind,
        "id": format!("T-{}", misc + bulk + pkt),
        "customer": {"name": "Test Customer", "address_lines": ["1 Main St"]},
        "items": items
    })
    .to_string()
}

/// Label job of `kind` on `medium` holding `count` distinct labels.
pub fn label_job(kind: &str, medium: &str, count: usize) -> String {
    let labels: Vec<serde_json::Value> = (1..=count)
        .map(|i| {
            serde_json::json!({
                "variety": format!("Variety {i}"),
                "crop": "Lettuce",
                "desc_line1": "Loose leaf",
                "desc_line2": "45 days",
                "lot_code": format!("L{i:03}")
            })
        })
        .collect();
    serde_json::json!({"kind": kind, "medium": medium, "labels": labels}).to_string()
}
