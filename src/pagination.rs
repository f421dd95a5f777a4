//! Flow pagination – walks an order's category sections and decides which
//! page and vertical position every item lands on.
//!
//! Handles:
//! - fixed section order (misc, bulk, pkt)
//! - one spacer gap between consecutive non-empty sections
//! - page breaks at the capacity thresholds of the document type
//! - header re-rendering on each new page via [`FlowObserver::on_page_start`]
//!
//! The engine never draws anything itself; it threads a [`FlowCursor`]
//! through the order and reports what it decided to an observer.

use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTable;
use crate::model::{Category, FlowableItem, Order};

/// Vertical metrics of the item area of a continuous document, in points
/// from the top of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowLayout {
    /// Where the first item row sits on page 1 (below the address block).
    pub first_page_top: f32,
    /// Where the first item row sits on every continuation page.
    pub continuation_top: f32,
    pub line_height: f32,
    /// Extra spacing inserted before a section that is not the first.
    pub section_gap: f32,
}

/// The engine's two operating states. The only transition is a page break,
/// and there is no way back to the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    OnFirstPage,
    OnContinuationPage,
}

/// Mutable pagination state carried across placement decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowCursor {
    pub current_page: u32,
    /// 1-based ordinal of the next item to place, across the whole document.
    pub item_index: u32,
    pub vertical_position: f32,
    /// Capacity slots consumed so far: placed items plus section gaps.
    pub slots_used: u64,
    state: FlowState,
}

impl FlowCursor {
    pub fn new(top: f32) -> Self {
        Self {
            current_page: 1,
            item_index: 1,
            vertical_position: top,
            slots_used: 0,
            state: FlowState::OnFirstPage,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    fn break_page(&mut self, top: f32) {
        self.current_page += 1;
        self.vertical_position = top;
        self.state = FlowState::OnContinuationPage;
    }

    fn advance(&mut self, line_height: f32) {
        self.vertical_position += line_height;
        self.item_index += 1;
        self.slots_used += 1;
    }
}

/// Where one item was placed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementEvent<'a> {
    pub item: &'a FlowableItem,
    pub page: u32,
    pub vertical_position: f32,
    pub item_index: u32,
}

/// Receives the engine's decisions in document order.
///
/// `on_page_start` fires for page 1 before anything else and again after
/// every break, before the item that caused the break. Implementations draw
/// the page header there and select the body font again.
pub trait FlowObserver<'a> {
    type Error;

    fn on_page_start(&mut self, page: u32, cursor: &FlowCursor) -> Result<(), Self::Error>;

    fn on_section_gap(&mut self, _category: Category, _page: u32, _vertical_position: f32) -> Result<(), Self::Error> {
        Ok(())
    }

    fn on_place(&mut self, event: PlacementEvent<'a>) -> Result<(), Self::Error>;
}

/// Totals for one completed flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSummary {
    pub pages: u32,
    pub items_placed: u32,
    pub slots_used: u64,
    /// Cursor position after the last row, on the last page.
    pub final_position: f32,
}

/// A recorded flow decision, as collected by [`FlowEngine::plan`].
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent<'a> {
    PageStart(u32),
    SectionGap {
        category: Category,
        page: u32,
        vertical_position: f32,
    },
    Place(PlacementEvent<'a>),
}

#[derive(Debug, Clone)]
pub struct FlowPlan<'a> {
    pub events: Vec<FlowEvent<'a>>,
    pub summary: FlowSummary,
}

impl<'a> FlowPlan<'a> {
    pub fn placements(&self) -> impl Iterator<Item = &PlacementEvent<'a>> {
        self.events.iter().filter_map(|e| match e {
            FlowEvent::Place(p) => Some(p),
            _ => None,
        })
    }
}

#[derive(Default)]
struct Collector<'a> {
    events: Vec<FlowEvent<'a>>,
}

impl<'a> FlowObserver<'a> for Collector<'a> {
    type Error = Infallible;

    fn on_page_start(&mut self, page: u32, _cursor: &FlowCursor) -> Result<(), Infallible> {
        self.events.push(FlowEvent::PageStart(page));
        Ok(())
    }

    fn on_section_gap(&mut self, category: Category, page: u32, vertical_position: f32) -> Result<(), Infallible> {
        self.events.push(FlowEvent::SectionGap {
            category,
            page,
            vertical_position,
        });
        Ok(())
    }

    fn on_place(&mut self, event: PlacementEvent<'a>) -> Result<(), Infallible> {
        self.events.push(FlowEvent::Place(event));
        Ok(())
    }
}

/// One flow engine per continuous document shape.
#[derive(Debug, Clone, Copy)]
pub struct FlowEngine {
    table: CapacityTable,
    layout: FlowLayout,
}

impl FlowEngine {
    pub fn new(table: CapacityTable, layout: FlowLayout) -> Self {
        Self { table, layout }
    }

    pub fn table(&self) -> &CapacityTable {
        &self.table
    }

    /// Flow every item of `order`, reporting to `observer`.
    pub fn flow<'a, O>(&self, order: &'a Order, observer: &mut O) -> Result<FlowSummary, O::Error>
    where
        O: FlowObserver<'a>,
    {
        let mut cursor = FlowCursor::new(self.layout.first_page_top);
        observer.on_page_start(cursor.current_page, &cursor)?;

        let mut first_section = true;
        for category in Category::FLOW_ORDER {
            let group = match order.group(category) {
                Some(g) if !g.is_empty() => g,
                _ => continue,
            };

            if !first_section {
                // A gap landing on a threshold breaks first and is not drawn at
                // the top of the new page; its slot still counts.
                if !self.break_if_full(&mut cursor, observer)? {
                    observer.on_section_gap(category, cursor.current_page, cursor.vertical_position)?;
                    cursor.vertical_position += self.layout.section_gap;
                }
                cursor.slots_used += 1;
            }
            first_section = false;

            for item in group.items() {
                self.break_if_full(&mut cursor, observer)?;
                observer.on_place(PlacementEvent {
                    item,
                    page: cursor.current_page,
                    vertical_position: cursor.vertical_position,
                    item_index: cursor.item_index,
                })?;
                cursor.advance(self.layout.line_height);
            }
        }

        Ok(FlowSummary {
            pages: cursor.current_page,
            items_placed: cursor.item_index - 1,
            slots_used: cursor.slots_used,
            final_position: cursor.vertical_position,
        })
    }

    /// Flow `order` and collect the decisions instead of acting on them.
    pub fn plan<'a>(&self, order: &'a Order) -> FlowPlan<'a> {
        let mut collector = Collector::default();
        let summary = match self.flow(order, &mut collector) {
            Ok(summary) => summary,
            Err(never) => match never {},
        };
        FlowPlan {
            events: collector.events,
            summary,
        }
    }

    fn break_if_full<'a, O>(&self, cursor: &mut FlowCursor, observer: &mut O) -> Result<bool, O::Error>
    where
        O: FlowObserver<'a>,
    {
        if cursor.slots_used < self.table.threshold(cursor.current_page) {
            return Ok(false);
        }
        cursor.break_page(self.layout.continuation_top);
        log::debug!(
            "page break before item {} (slot {}), now on page {}",
            cursor.item_index,
            cursor.slots_used + 1,
            cursor.current_page
        );
        observer.on_page_start(cursor.current_page, cursor)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::slots_required;
    use crate::model::{Customer, OrderTotals};
    use rust_decimal::Decimal;

    const LAYOUT: FlowLayout = FlowLayout {
        first_page_top: 300.0,
        continuation_top: 90.0,
        line_height: 15.0,
        section_gap: 10.0,
    };

    fn order(misc: usize, bulk: usize, pkt: usize) -> Order {
        let mut items = Vec::new();
        // Interleave categories so ordering is the engine's doing.
        for i in 0..misc.max(bulk).max(pkt) {
            if i < pkt {
                items.push(FlowableItem::new(Category::Pkt, format!("pkt {i}"), 1, Decimal::ONE));
            }
            if i < bulk {
                items.push(FlowableItem::new(Category::Bulk, format!("bulk {i}"), 1, Decimal::ONE));
            }
            if i < misc {
                items.push(FlowableItem::new(Category::Misc, format!("misc {i}"), 1, Decimal::ONE));
            }
        }
        Order::new("T-1", Customer::default(), OrderTotals::default(), items)
    }

    fn engine() -> FlowEngine {
        FlowEngine::new(CapacityTable::PACKING_SLIP, LAYOUT)
    }

    #[test]
    fn empty_order_is_one_page() {
        let o = order(0, 0, 0);
        let plan = engine().plan(&o);
        assert_eq!(plan.events, vec![FlowEvent::PageStart(1)]);
        assert_eq!(plan.summary.pages, 1);
        assert_eq!(plan.summary.items_placed, 0);
    }

    #[test]
    fn categories_flow_misc_bulk_pkt() {
        let o = order(4, 3, 5);
        let plan = engine().plan(&o);
        let cats: Vec<Category> = plan.placements().map(|p| p.item.category()).collect();
        let mut sorted = cats.clone();
        sorted.sort();
        assert_eq!(cats, sorted);
        assert_eq!(cats.len(), 12);
    }

    #[test]
    fn item_index_runs_across_sections() {
        let o = order(2, 2, 2);
        let plan = engine().plan(&o);
        let idx: Vec<u32> = plan.placements().map(|p| p.item_index).collect();
        assert_eq!(idx, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn gaps_between_sections_only() {
        let o = order(2, 0, 2);
        let plan = engine().plan(&o);
        let gaps: Vec<_> = plan
            .events
            .iter()
            .filter(|e| matches!(e, FlowEvent::SectionGap { .. }))
            .collect();
        assert_eq!(gaps.len(), 1);
        assert!(matches!(gaps[0], FlowEvent::SectionGap { category: Category::Pkt, .. }));

        let first_pkt = plan.placements().find(|p| p.item.category() == Category::Pkt).unwrap();
        assert_eq!(first_pkt.vertical_position, 300.0 + 2.0 * 15.0 + 10.0);
    }

    #[test]
    fn single_section_has_no_gap() {
        let o = order(0, 6, 0);
        let plan = engine().plan(&o);
        assert!(!plan.events.iter().any(|e| matches!(e, FlowEvent::SectionGap { .. })));
        assert_eq!(plan.summary.slots_used, 6);
    }

    #[test]
    fn breaking_item_opens_the_new_page() {
        let o = order(0, 0, 28);
        let plan = engine().plan(&o);
        let pos = plan
            .events
            .iter()
            .position(|e| *e == FlowEvent::PageStart(2))
            .expect("second page");
        match &plan.events[pos + 1] {
            FlowEvent::Place(p) => {
                assert_eq!(p.item_index, 28);
                assert_eq!(p.page, 2);
                assert_eq!(p.vertical_position, LAYOUT.continuation_top);
            }
            other => panic!("expected placement after page start, got {other:?}"),
        }
        match &plan.events[pos - 1] {
            FlowEvent::Place(p) => assert_eq!(p.item_index, 27),
            other => panic!("expected placement before page start, got {other:?}"),
        }
        assert_eq!(plan.summary.pages, 2);
    }

    #[test]
    fn twenty_seven_items_stay_on_one_page() {
        let o = order(0, 0, 27);
        let plan = engine().plan(&o);
        assert_eq!(plan.summary.pages, 1);
        assert!(plan.placements().all(|p| p.page == 1));
    }

    #[test]
    fn gap_consumes_a_slot_and_can_push_a_break() {
        // 26 misc + gap fill the 27 slots of page 1; the first bulk item breaks.
        let o = order(26, 3, 0);
        let plan = engine().plan(&o);
        let first_bulk = plan.placements().find(|p| p.item.category() == Category::Bulk).unwrap();
        assert_eq!(first_bulk.page, 2);
        assert_eq!(first_bulk.vertical_position, LAYOUT.continuation_top);
        assert!(plan
            .events
            .iter()
            .any(|e| matches!(e, FlowEvent::SectionGap { page: 1, .. })));
    }

    #[test]
    fn gap_on_threshold_is_not_drawn_at_page_top() {
        let o = order(27, 3, 0);
        let plan = engine().plan(&o);
        assert!(!plan.events.iter().any(|e| matches!(e, FlowEvent::SectionGap { .. })));
        let first_bulk = plan.placements().find(|p| p.item.category() == Category::Bulk).unwrap();
        assert_eq!(first_bulk.page, 2);
        assert_eq!(first_bulk.vertical_position, LAYOUT.continuation_top);
    }

    #[test]
    fn page_count_matches_capacity_policy() {
        for (m, b, p) in [(0, 0, 1), (26, 1, 0), (27, 1, 1), (30, 30, 30), (5, 100, 250), (69, 0, 1)] {
            let o = order(m, b, p);
            let plan = engine().plan(&o);
            assert_eq!(
                plan.summary.pages,
                CapacityTable::PACKING_SLIP.pages_required(slots_required(&o)),
                "distribution {m}/{b}/{p}"
            );
        }
    }

    #[test]
    fn every_item_yields_exactly_one_placement() {
        for (m, b, p) in [(0, 0, 0), (1, 0, 0), (13, 44, 7), (100, 0, 100), (0, 250, 0)] {
            let o = order(m, b, p);
            let plan = engine().plan(&o);
            assert_eq!(plan.placements().count(), m + b + p);
            assert_eq!(plan.summary.items_placed as usize, m + b + p);
        }
    }

    #[test]
    fn cursor_resets_on_each_continuation_page() {
        let o = order(0, 0, 200);
        let plan = engine().plan(&o);
        let starts: Vec<u32> = plan
            .events
            .iter()
            .filter_map(|e| match e {
                FlowEvent::PageStart(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![1, 2, 3, 4, 5, 6]);
        for page in 2..=6 {
            let first = plan.placements().find(|p| p.page == page).unwrap();
            assert_eq!(first.vertical_position, LAYOUT.continuation_top);
        }
    }

    struct StateProbe {
        states: Vec<FlowState>,
    }

    impl<'a> FlowObserver<'a> for StateProbe {
        type Error = ();

        fn on_page_start(&mut self, _page: u32, cursor: &FlowCursor) -> Result<(), ()> {
            self.states.push(cursor.state());
            Ok(())
        }

        fn on_place(&mut self, _event: PlacementEvent<'a>) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn state_machine_never_returns_to_first_page() {
        let o = order(10, 60, 40);
        let mut probe = StateProbe { states: Vec::new() };
        engine().flow(&o, &mut probe).unwrap();
        assert_eq!(probe.states[0], FlowState::OnFirstPage);
        assert!(probe.states[1..].iter().all(|s| *s == FlowState::OnContinuationPage));
        assert!(probe.states.len() > 2);
    }

    struct FailOnPage(u32);

    impl<'a> FlowObserver<'a> for FailOnPage {
        type Error = String;

        fn on_page_start(&mut self, page: u32, _cursor: &FlowCursor) -> Result<(), String> {
            if page == self.0 {
                return Err(format!("page {page} failed"));
            }
            Ok(())
        }

        fn on_place(&mut self, _event: PlacementEvent<'a>) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn observer_errors_abort_the_flow() {
        let o = order(0, 0, 80);
        let err = engine().flow(&o, &mut FailOnPage(2)).unwrap_err();
        assert_eq!(err, "page 2 failed");
    }
}
