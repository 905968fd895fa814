//! Engine output wired into the slot controller, the way a viewer session
//! does it: first load features the top live channel, later go-lives only
//! claim the main slot while it is empty.

mod common;

use common::{live, offline};
use quadview_proto::roster::{RosterUpdate, StatusDiffEngine};
use quadview_proto::split::{SplitController, ViewMode};

fn follow(split: &mut SplitController, update: &RosterUpdate, first_load: bool) {
    if first_load {
        if let Some(top) = update.roster.iter().find(|c| c.is_live) {
            split.assign_channel(&top.channel_id).unwrap();
        }
        return;
    }
    let Some(diff) = &update.diff else { return };
    if split.state().slot(0).is_none() {
        if let Some(first) = diff.newly_live.first() {
            split.assign_channel(&first.channel_id).unwrap();
        }
    }
}

#[test]
fn first_load_features_most_watched_live_channel() {
    let mut engine = StatusDiffEngine::new();
    let mut split = SplitController::new();

    let update = engine.update(vec![offline("quiet"), live("small", 10, "a"), live("big", 900, "b")]);
    assert!(update.diff.is_none());
    follow(&mut split, &update, true);

    assert_eq!(split.state().slot(0), Some("big"));
}

#[test]
fn go_live_fills_empty_main_slot_only() {
    let mut engine = StatusDiffEngine::new();
    let mut split = SplitController::new();

    let first = engine.update(vec![offline("a"), offline("b")]);
    follow(&mut split, &first, true);
    assert_eq!(split.state().slot(0), None);

    let second = engine.update(vec![live("a", 5, "hi"), offline("b")]);
    follow(&mut split, &second, false);
    assert_eq!(split.state().slot(0), Some("a"));

    let third = engine.update(vec![live("a", 5, "hi"), live("b", 50, "yo")]);
    assert_eq!(third.diff.as_ref().unwrap().newly_live[0].channel_id, "b");
    follow(&mut split, &third, false);
    assert_eq!(split.state().slot(0), Some("a"));
}

#[test]
fn synthetic_go_live_reaches_split_and_is_dropped_by_next_poll() {
    let mut engine = StatusDiffEngine::new();
    let mut split = SplitController::new();
    split.set_mode(ViewMode::Dual);

    engine.update(vec![offline("a")]);
    let injected = engine.inject_synthetic(live("teststream", 1337, "test"));
    follow(&mut split, &injected, false);
    assert!(split.state().contains_channel("teststream"));

    let next = engine.update(vec![offline("a")]);
    assert!(next.diff.is_none());
    assert!(next.roster.iter().all(|c| c.channel_id != "teststream"));
}

#[test]
fn poll_after_a_skipped_failure_reports_nothing_new() {
    let mut engine = StatusDiffEngine::new();
    let mut split = SplitController::new();

    let update = engine.update(vec![live("a", 5, "hi"), offline("b")]);
    follow(&mut split, &update, true);
    let split_before = split.state().clone();

    // The failed fetch in between never reached the engine.
    let recovered = engine.update(vec![live("a", 7, "hi"), offline("b")]);
    assert!(recovered.diff.is_none());
    follow(&mut split, &recovered, false);
    assert_eq!(split.state(), &split_before);
}
