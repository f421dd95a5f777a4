//! Content model for order documents: items, category groups, orders, and
//! the raw request records they are validated from.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ItemIssue, Manifest};

/// Largest quantity accepted on one line item.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Largest magnitude accepted for any money value in a request.
pub const MAX_AMOUNT: i64 = 1_000_000_000;

/// Item category. Flow order is fixed: see [`Category::FLOW_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Misc,
    Bulk,
    Pkt,
}

impl Category {
    /// Priority in which category sections are flowed onto a document.
    pub const FLOW_ORDER: [Category; 3] = [Category::Misc, Category::Bulk, Category::Pkt];

    /// Parse a request value; accepts a few spellings seen on the wire.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "misc" | "miscellaneous" => Some(Category::Misc),
            "bulk" => Some(Category::Bulk),
            "pkt" | "packet" | "packets" => Some(Category::Pkt),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Misc => "misc",
            Category::Bulk => "bulk",
            Category::Pkt => "pkt",
        }
    }
}

/// One line item. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowableItem {
    category: Category,
    label: String,
    quantity: i64,
    unit_price: Decimal,
}

impl FlowableItem {
    pub fn new(category: Category, label: impl Into<String>, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            category,
            label: label.into(),
            quantity,
            unit_price,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Unit price × quantity, saturating at the `Decimal` range.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Ordered run of items sharing one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemGroup {
    category: Category,
    items: Vec<FlowableItem>,
}

impl ItemGroup {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            items: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn items(&self) -> &[FlowableItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Split items into per-category groups, preserving input order inside
    /// each group. Empty groups are dropped; the result is in flow order.
    pub fn partition(items: impl IntoIterator<Item = FlowableItem>) -> Vec<ItemGroup> {
        let mut groups: Vec<ItemGroup> = Category::FLOW_ORDER.iter().map(|c| ItemGroup::new(*c)).collect();
        for item in items {
            if let Some(group) = groups.iter_mut().find(|g| g.category == item.category) {
                group.items.push(item);
            }
        }
        groups.retain(|g| !g.is_empty());
        groups
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Money totals printed under the item rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// Store-credit amount issued on store invoices.
    pub credit: Decimal,
}

/// A validated order, consumed once by one print pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub totals: OrderTotals,
    groups: Vec<ItemGroup>,
}

impl Order {
    pub fn new(id: impl Into<String>, customer: Customer, totals: OrderTotals, items: Vec<FlowableItem>) -> Self {
        Self {
            id: id.into(),
            customer,
            totals,
            groups: ItemGroup::partition(items),
        }
    }

    /// Non-empty groups in flow order.
    pub fn groups(&self) -> &[ItemGroup] {
        &self.groups
    }

    pub fn group(&self, category: Category) -> Option<&ItemGroup> {
        self.groups.iter().find(|g| g.category == category)
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(ItemGroup::len).sum()
    }

    pub fn non_empty_categories(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_empty()).count()
    }

    /// All items in flow order.
    pub fn items(&self) -> impl Iterator<Item = &FlowableItem> {
        Category::FLOW_ORDER
            .iter()
            .filter_map(|c| self.group(*c))
            .flat_map(|g| g.items.iter())
    }

    pub fn total_quantity(&self) -> i64 {
        self.items()
            .map(FlowableItem::quantity)
            .fold(0, i64::saturating_add)
    }
}

// ---------------------------------------------------------------------------
// Raw request records
// ---------------------------------------------------------------------------

/// Whether a line item must carry a unit price to be printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRule {
    Required,
    /// Pick lists show no prices, so a missing price is not an error.
    Ignored,
}

/// A line item as it arrives in a request. Every field is optional;
/// numeric fields accept JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemRecord {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "name")]
    pub label: Option<String>,
    #[serde(default, alias = "qty")]
    pub quantity: Option<Value>,
    #[serde(default, alias = "price")]
    pub unit_price: Option<Value>,
}

/// An order as it arrives in a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(alias = "order_id")]
    pub id: String,
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub subtotal: Option<Value>,
    #[serde(default)]
    pub shipping: Option<Value>,
    #[serde(default)]
    pub tax: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub credit: Option<Value>,
    #[serde(default)]
    pub items: Vec<LineItemRecord>,
}

impl LineItemRecord {
    /// Validate into a [`FlowableItem`]; `None` means the item is skipped
    /// and the reason has been recorded in `manifest`.
    pub fn validate(&self, line: usize, prices: PriceRule, manifest: &mut Manifest) -> Option<FlowableItem> {
        let label = self.label.as_deref().map(str::trim).unwrap_or_default();
        let subject = if label.is_empty() {
            format!("line {line}")
        } else {
            format!("line {line} ({label})")
        };

        if label.is_empty() {
            manifest.record(subject, ItemIssue::MissingRequiredField { field: "label" });
            return None;
        }

        let category = match self.category.as_deref() {
            None => Category::Misc,
            Some(raw) => match Category::parse(raw) {
                Some(c) => c,
                None => {
                    manifest.record(subject, ItemIssue::MissingRequiredField { field: "category" });
                    return None;
                }
            },
        };

        let unit_price = match (&self.unit_price, prices) {
            (None, PriceRule::Required) | (Some(Value::Null), PriceRule::Required) => {
                manifest.record(subject, ItemIssue::MissingRequiredField { field: "unit_price" });
                return None;
            }
            (None, PriceRule::Ignored) | (Some(Value::Null), PriceRule::Ignored) => Decimal::ZERO,
            (Some(raw), _) => decimal_or_zero(raw, "unit_price", &subject, manifest),
        };

        let quantity = match &self.quantity {
            Some(raw) => match read_integer(raw) {
                Some(q) if (0..=MAX_ITEM_QUANTITY).contains(&q) => q,
                _ => {
                    manifest.record(
                        subject.clone(),
                        ItemIssue::InvalidNumericValue {
                            field: "quantity",
                            raw: display_raw(raw),
                            substituted: "0".into(),
                        },
                    );
                    0
                }
            },
            None => {
                manifest.record(
                    subject.clone(),
                    ItemIssue::InvalidNumericValue {
                        field: "quantity",
                        raw: String::new(),
                        substituted: "0".into(),
                    },
                );
                0
            }
        };

        Some(FlowableItem::new(category, label, quantity, unit_price))
    }
}

impl OrderRecord {
    /// Validate the request into an [`Order`] plus a manifest of skipped
    /// items and substituted values.
    ///
    /// Absent totals are derived: subtotal from the line totals, total as
    /// subtotal + shipping + tax, store credit as the total.
    pub fn validate(&self, prices: PriceRule) -> (Order, Manifest) {
        let mut manifest = Manifest::new();
        let items: Vec<FlowableItem> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, rec)| rec.validate(i + 1, prices, &mut manifest))
            .collect();

        let subject = format!("order {}", self.id);
        let mut amount = |raw: &Option<Value>, field: &'static str| -> Option<Decimal> {
            match raw {
                None | Some(Value::Null) => None,
                Some(v) => Some(decimal_or_zero(v, field, &subject, &mut manifest)),
            }
        };

        let subtotal = amount(&self.subtotal, "subtotal");
        let shipping = amount(&self.shipping, "shipping").unwrap_or(Decimal::ZERO);
        let tax = amount(&self.tax, "tax").unwrap_or(Decimal::ZERO);
        let total = amount(&self.total, "total");
        let credit = amount(&self.credit, "credit");

        let subtotal = subtotal.unwrap_or_else(|| {
            items
                .iter()
                .map(FlowableItem::line_total)
                .fold(Decimal::ZERO, Decimal::saturating_add)
        });
        let total = total.unwrap_or_else(|| subtotal.saturating_add(shipping).saturating_add(tax));
        let totals = OrderTotals {
            subtotal,
            shipping,
            tax,
            total,
            credit: credit.unwrap_or(total),
        };

        (Order::new(self.id.clone(), self.customer.clone(), totals, items), manifest)
    }
}

fn decimal_or_zero(raw: &Value, field: &'static str, subject: &str, manifest: &mut Manifest) -> Decimal {
    let limit = Decimal::from(MAX_AMOUNT);
    match read_decimal(raw).filter(|d| d.abs() <= limit) {
        Some(d) => d,
        None => {
            manifest.record(
                subject,
                ItemIssue::InvalidNumericValue {
                    field,
                    raw: display_raw(raw),
                    substituted: "0.00".into(),
                },
            );
            Decimal::ZERO
        }
    }
}

/// Read a decimal from a JSON number or a numeric string ("$3.99" accepted).
pub fn read_decimal(raw: &Value) -> Option<Decimal> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', ""),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Read a whole number from a JSON number or a numeric string.
pub fn read_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn display_raw(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> OrderRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn partition_keeps_flow_order_and_input_order() {
        let items = vec![
            FlowableItem::new(Category::Pkt, "p1", 1, Decimal::ONE),
            FlowableItem::new(Category::Misc, "m1", 1, Decimal::ONE),
            FlowableItem::new(Category::Pkt, "p2", 1, Decimal::ONE),
            FlowableItem::new(Category::Bulk, "b1", 1, Decimal::ONE),
        ];
        let groups = ItemGroup::partition(items);
        let cats: Vec<_> = groups.iter().map(|g| g.category()).collect();
        assert_eq!(cats, vec![Category::Misc, Category::Bulk, Category::Pkt]);
        let pkts: Vec<_> = groups[2].items().iter().map(|i| i.label()).collect();
        assert_eq!(pkts, vec!["p1", "p2"]);
    }

    #[test]
    fn partition_drops_empty_groups() {
        let groups = ItemGroup::partition(vec![FlowableItem::new(Category::Bulk, "b", 2, Decimal::ONE)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category(), Category::Bulk);
    }

    #[test]
    fn missing_price_skips_item() {
        let rec = record(json!({
            "id": "1001",
            "items": [
                {"category": "pkt", "label": "Basil", "quantity": 2, "unit_price": "3.50"},
                {"category": "pkt", "label": "Dill", "quantity": 1}
            ]
        }));
        let (order, manifest) = rec.validate(PriceRule::Required);
        assert_eq!(order.item_count(), 1);
        let missing: Vec<_> = manifest.missing().collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].subject, "line 2 (Dill)");
        assert_eq!(missing[0].issue, ItemIssue::MissingRequiredField { field: "unit_price" });
    }

    #[test]
    fn pick_list_ignores_missing_price() {
        let rec = record(json!({
            "id": "1001",
            "items": [{"category": "bulk", "label": "Oats", "quantity": 5}]
        }));
        let (order, manifest) = rec.validate(PriceRule::Ignored);
        assert_eq!(order.item_count(), 1);
        assert!(manifest.is_empty());
    }

    #[test]
    fn invalid_quantity_substitutes_zero() {
        let rec = record(json!({
            "id": "7",
            "items": [{"label": "Twine", "quantity": "lots", "price": 4}]
        }));
        let (order, manifest) = rec.validate(PriceRule::Required);
        let item = order.items().next().unwrap();
        assert_eq!(item.quantity(), 0);
        assert_eq!(item.category(), Category::Misc);
        assert_eq!(manifest.substituted().count(), 1);
    }

    #[test]
    fn out_of_range_numbers_are_substituted() {
        let rec = record(json!({
            "id": "8",
            "items": [
                {"label": "Bulk oats", "qty": 9223372036854775807_i64, "price": "79228162514264337593543950"},
                {"label": "Rye", "qty": MAX_ITEM_QUANTITY + 1, "price": "2.00"}
            ]
        }));
        let (order, manifest) = rec.validate(PriceRule::Required);
        let items: Vec<_> = order.items().collect();
        assert_eq!(items[0].quantity(), 0);
        assert_eq!(items[0].unit_price(), Decimal::ZERO);
        assert_eq!(items[1].quantity(), 0);
        assert_eq!(manifest.substituted().count(), 3);
        assert_eq!(order.totals.subtotal, Decimal::ZERO);
    }

    #[test]
    fn quantity_at_the_cap_is_kept() {
        let rec = record(json!({
            "id": "9",
            "items": [{"label": "Twine", "qty": MAX_ITEM_QUANTITY, "price": "1.00"}]
        }));
        let (order, manifest) = rec.validate(PriceRule::Required);
        assert!(manifest.is_empty());
        assert_eq!(order.total_quantity(), MAX_ITEM_QUANTITY);
    }

    #[test]
    fn huge_order_amounts_do_not_overflow_the_total() {
        let rec = record(json!({
            "id": "10",
            "subtotal": "79228162514264337593543950335",
            "shipping": "79228162514264337593543950335",
            "items": []
        }));
        let (order, manifest) = rec.validate(PriceRule::Required);
        assert_eq!(manifest.substituted().count(), 2);
        assert_eq!(order.totals.total, Decimal::ZERO);
    }

    #[test]
    fn arithmetic_saturates_on_unvalidated_items() {
        let big = FlowableItem::new(Category::Bulk, "b", i64::MAX, Decimal::MAX);
        assert_eq!(big.line_total(), Decimal::MAX);
        let order = Order::new(
            "11",
            Customer::default(),
            OrderTotals::default(),
            vec![big, FlowableItem::new(Category::Pkt, "p", 1, Decimal::ONE)],
        );
        assert_eq!(order.total_quantity(), i64::MAX);
    }

    #[test]
    fn unknown_category_is_skipped() {
        let rec = record(json!({
            "id": "7",
            "items": [{"category": "tools", "label": "Hoe", "quantity": 1, "price": 20}]
        }));
        let (order, manifest) = rec.validate(PriceRule::Required);
        assert_eq!(order.item_count(), 0);
        assert_eq!(manifest.missing().count(), 1);
    }

    #[test]
    fn totals_are_derived_when_absent() {
        let rec = record(json!({
            "id": "42",
            "shipping": "5.00",
            "tax": 1.25,
            "items": [
                {"category": "pkt", "label": "Kale", "quantity": 2, "price": "3.50"},
                {"category": "bulk", "label": "Rye", "quantity": 1, "price": "$10"}
            ]
        }));
        let (order, manifest) = rec.validate(PriceRule::Required);
        assert!(manifest.is_empty());
        assert_eq!(order.totals.subtotal, Decimal::from_str("17.00").unwrap());
        assert_eq!(order.totals.total, Decimal::from_str("23.25").unwrap());
        assert_eq!(order.totals.credit, order.totals.total);
    }

    #[test]
    fn reads_numbers_and_strings() {
        assert_eq!(read_decimal(&json!(3.99)), Some(Decimal::from_str("3.99").unwrap()));
        assert_eq!(read_decimal(&json!("1,250.10")), Some(Decimal::from_str("1250.10").unwrap()));
        assert_eq!(read_decimal(&json!(true)), None);
        assert_eq!(read_integer(&json!("12")), Some(12));
        assert_eq!(read_integer(&json!(3.0)), Some(3));
        assert_eq!(read_integer(&json!(2.5)), None);
    }
}
