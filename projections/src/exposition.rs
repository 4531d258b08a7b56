//! Prometheus-style text exposition of a [`StatsSnapshot`].
//!
//! One sample line per nonzero cell, `roomshare_<category>` as the family
//! name. Room-tracking categories split every cell by `has_room` and add a
//! `_unique_rooms` family; the other categories carry plain
//! `product`/`subevent` labels. Ordering is deterministic (category, then
//! product, then sub-event), so the output is diffable across scrapes.

use crate::stats::StatsSnapshot;

/// Content type of the rendered document (Prometheus text format).
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Renders the snapshot as Prometheus text format.
#[must_use]
pub fn render_metrics(snapshot: &StatsSnapshot) -> String {
    let mut out = String::new();
    for (category, stats) in &snapshot.categories {
        let key = category.key();
        if let Some(rooms) = &stats.rooms {
            for (product, by_subevent) in &stats.by_product {
                for (subevent, total) in by_subevent {
                    let with = rooms
                        .with_room
                        .get(product)
                        .and_then(|m| m.get(subevent))
                        .copied()
                        .unwrap_or(0);
                    let without = total.saturating_sub(with);
                    let product = escape_label(product);
                    let subevent = escape_label(subevent);
                    if with > 0 {
                        out.push_str(&format!(
                            "roomshare_{key}{{product=\"{product}\",subevent=\"{subevent}\",has_room=\"true\"}} {with}\n"
                        ));
                    }
                    if without > 0 {
                        out.push_str(&format!(
                            "roomshare_{key}{{product=\"{product}\",subevent=\"{subevent}\",has_room=\"false\"}} {without}\n"
                        ));
                    }
                }
            }
            for (product, by_subevent) in &rooms.unique_rooms {
                for (subevent, count) in by_subevent {
                    if *count > 0 {
                        let product = escape_label(product);
                        let subevent = escape_label(subevent);
                        out.push_str(&format!(
                            "roomshare_{key}_unique_rooms{{product=\"{product}\",subevent=\"{subevent}\"}} {count}\n"
                        ));
                    }
                }
            }
        } else {
            for (product, by_subevent) in &stats.by_product {
                for (subevent, count) in by_subevent {
                    if *count > 0 {
                        let product = escape_label(product);
                        let subevent = escape_label(subevent);
                        out.push_str(&format!(
                            "roomshare_{key}{{product=\"{product}\",subevent=\"{subevent}\"}} {count}\n"
                        ));
                    }
                }
            }
        }
    }
    out
}

// Label value escaping per the Prometheus text format: backslash, double
// quote and newline.
fn escape_label(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use roomshare_core::types::EventId;

    use super::*;
    use crate::categories::TicketCategory;
    use crate::stats::{CategoryStats, RoomStats};

    fn tab(cells: &[(&str, &str, u64)]) -> BTreeMap<String, BTreeMap<String, u64>> {
        let mut out: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for (outer, inner, n) in cells {
            out.entry((*outer).to_owned())
                .or_default()
                .insert((*inner).to_owned(), *n);
        }
        out
    }

    fn snapshot_with(category: TicketCategory, stats: CategoryStats) -> StatsSnapshot {
        let mut categories = BTreeMap::new();
        categories.insert(category, stats);
        StatsSnapshot {
            event: EventId::new(),
            categories,
        }
    }

    #[test]
    fn splits_room_categories_by_has_room() {
        let snapshot = snapshot_with(
            TicketCategory::Paid,
            CategoryStats {
                tickets: 3,
                by_product: tab(&[("Pass", "", 3)]),
                by_subevent: tab(&[("", "Pass", 3)]),
                rooms: Some(RoomStats {
                    with_room: tab(&[("Pass", "", 2)]),
                    unique_rooms: tab(&[("Pass", "", 1)]),
                    subevent_with_room: BTreeMap::from([(String::new(), 2)]),
                    subevent_without_room: BTreeMap::from([(String::new(), 1)]),
                    subevent_unique_rooms: BTreeMap::from([(String::new(), 1)]),
                }),
            },
        );
        assert_eq!(
            render_metrics(&snapshot),
            "roomshare_paid{product=\"Pass\",subevent=\"\",has_room=\"true\"} 2\n\
             roomshare_paid{product=\"Pass\",subevent=\"\",has_room=\"false\"} 1\n\
             roomshare_paid_unique_rooms{product=\"Pass\",subevent=\"\"} 1\n"
        );
    }

    #[test]
    fn fully_housed_cells_omit_the_has_room_false_line() {
        let snapshot = snapshot_with(
            TicketCategory::Total,
            CategoryStats {
                tickets: 2,
                by_product: tab(&[("Pass", "Day 1", 2)]),
                by_subevent: tab(&[("Day 1", "Pass", 2)]),
                rooms: Some(RoomStats {
                    with_room: tab(&[("Pass", "Day 1", 2)]),
                    unique_rooms: tab(&[("Pass", "Day 1", 1)]),
                    subevent_with_room: BTreeMap::from([("Day 1".to_owned(), 2)]),
                    subevent_without_room: BTreeMap::new(),
                    subevent_unique_rooms: BTreeMap::from([("Day 1".to_owned(), 1)]),
                }),
            },
        );
        let text = render_metrics(&snapshot);
        assert!(text.contains("has_room=\"true\"} 2"));
        assert!(!text.contains("has_room=\"false\""));
    }

    #[test]
    fn plain_categories_carry_no_has_room_label() {
        let snapshot = snapshot_with(
            TicketCategory::Denied,
            CategoryStats {
                tickets: 1,
                by_product: tab(&[("Pass", "", 1)]),
                by_subevent: tab(&[("", "Pass", 1)]),
                rooms: None,
            },
        );
        assert_eq!(
            render_metrics(&snapshot),
            "roomshare_denied{product=\"Pass\",subevent=\"\"} 1\n"
        );
    }

    #[test]
    fn label_values_are_escaped() {
        let snapshot = snapshot_with(
            TicketCategory::Canceled,
            CategoryStats {
                tickets: 1,
                by_product: tab(&[("Say \"hi\"\\\n", "", 1)]),
                by_subevent: tab(&[("", "Say \"hi\"\\\n", 1)]),
                rooms: None,
            },
        );
        assert_eq!(
            render_metrics(&snapshot),
            "roomshare_canceled{product=\"Say \\\"hi\\\"\\\\\\n\",subevent=\"\"} 1\n"
        );
    }

    #[test]
    fn empty_snapshots_render_nothing() {
        let snapshot = StatsSnapshot {
            event: EventId::new(),
            categories: BTreeMap::new(),
        };
        assert_eq!(render_metrics(&snapshot), "");
    }
}
