//! Property tests for the coordination invariants

use std::collections::BTreeSet;

use proptest::prelude::*;

use spectre::catalog::ProjectionKind;
use spectre::highlight::HighlightCoordinator;
use spectre::layout::{FrameScheduler, ResizeReason};
use spectre::palette::CategoryRegistry;
use spectre::views::confusion::{aggregate, normalize_rows};
use spectre::views::{ConfusionMatrix, TopK};

fn category() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,11}"
}

fn batches() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(category(), 0..12), 1..6)
}

/// Square matrix with labels `c0..cn` and small integer counts
fn matrix() -> impl Strategy<Value = ConfusionMatrix> {
    (1usize..10).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0u32..50, n), n).prop_map(move |rows| {
            let labels: Vec<String> = (0..n).map(|i| format!("c{}", i)).collect();
            let counts = rows.into_iter().map(|r| r.into_iter().map(f64::from).collect()).collect();
            ConfusionMatrix::new(labels.clone(), labels, counts)
        })
    })
}

fn reason() -> impl Strategy<Value = ResizeReason> {
    prop_oneof![
        Just(ResizeReason::Layout),
        Just(ResizeReason::Divider),
        Just(ResizeReason::Window),
        Just(ResizeReason::Data),
        Just(ResizeReason::Highlight),
    ]
}

proptest! {
    #[test]
    fn colors_never_change_once_assigned(batches in batches()) {
        let mut registry = CategoryRegistry::new();
        let mut seen: Vec<(String, _)> = Vec::new();
        for batch in &batches {
            registry.register_categories(batch);
            for (name, color) in &seen {
                prop_assert_eq!(registry.color_of(name), *color);
            }
            seen = registry.assignments().map(|(n, c)| (n.to_string(), c)).collect();
        }
    }

    #[test]
    fn registry_only_grows(batches in batches()) {
        let mut registry = CategoryRegistry::new();
        let mut previous: Vec<String> = Vec::new();
        for batch in &batches {
            let before = registry.len();
            let appended = registry.register_categories(batch);
            let names: Vec<String> = registry.assignments().map(|(n, _)| n.to_string()).collect();
            prop_assert!(names.len() >= before);
            prop_assert_eq!(&names[..previous.len()], &previous[..]);
            prop_assert_eq!(appended, names.len() > before);
            for name in batch {
                prop_assert!(registry.contains(name));
            }
            previous = names;
        }
    }

    #[test]
    fn aggregation_conserves_total(m in matrix(), k in 0i64..12) {
        let agg = aggregate(&m, TopK::new(k));
        prop_assert!((agg.total() - m.total()).abs() < 1e-9);
        let kept = (k.max(1) as usize).min(m.true_labels().len());
        prop_assert_eq!(agg.labels.len(), kept + 1);
        prop_assert_eq!(agg.labels.last().map(String::as_str), Some("Other"));
    }

    #[test]
    fn row_normalization_is_idempotent(m in matrix()) {
        let once = normalize_rows(m.counts());
        let twice = normalize_rows(&once);
        for (a, b) in once.iter().flatten().zip(twice.iter().flatten()) {
            prop_assert!((a - b).abs() < 1e-12);
        }
        for row in &once {
            let sum: f64 = row.iter().sum();
            prop_assert!(sum == 0.0 || (sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn hover_takes_precedence_over_selection(
        selected in prop::collection::btree_set(category(), 0..6),
        hovered in category(),
        probe in category(),
    ) {
        let mut hc = HighlightCoordinator::new(0.2, false);
        hc.set_active(Some(ProjectionKind::Cls));
        for c in &selected {
            hc.set_selected(ProjectionKind::Cls, c, true);
        }
        hc.set_hover(Some(&hovered));

        prop_assert_eq!(hc.effective_highlight().to_set(), BTreeSet::from([hovered.clone()]));
        let expected = if probe == hovered { 1.0 } else { 0.2 };
        prop_assert_eq!(hc.styled_opacity(&probe), expected);

        hc.set_hover(None);
        prop_assert_eq!(hc.effective_highlight().to_set(), selected.clone());
    }

    #[test]
    fn at_most_one_pass_per_frame(frames in prop::collection::vec(prop::collection::vec(reason(), 0..8), 1..10)) {
        let mut scheduler = FrameScheduler::new();
        let mut total_requests = 0;
        for requests in &frames {
            for r in requests {
                scheduler.request(*r);
            }
            total_requests += requests.len();
            let pass = scheduler.advance_frame();
            prop_assert_eq!(pass.is_some(), !requests.is_empty());
            if let (Some(pass), Some(last)) = (pass, requests.last()) {
                prop_assert_eq!(pass.reason, *last);
                prop_assert_eq!(pass.coalesced, requests.len());
            }
            prop_assert!(!scheduler.is_pending());
        }
        let busy = frames.iter().filter(|f| !f.is_empty()).count() as u64;
        prop_assert_eq!(scheduler.passes(), busy);
        prop_assert!(scheduler.passes() <= total_requests as u64);
    }
}
