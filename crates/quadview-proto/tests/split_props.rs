//! Property-based tests for the slot controller.
//!
//! Arbitrary command sequences, including out-of-range indices and repeated
//! channel ids, must never break the occupancy and range invariants.

use proptest::prelude::*;
use quadview_proto::split::{SplitCommand, SplitController, ViewMode, SLOT_COUNT};

fn channel() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e", "f"]).prop_map(str::to_string)
}

fn command() -> impl Strategy<Value = SplitCommand> {
    prop_oneof![
        4 => channel().prop_map(SplitCommand::AssignChannel),
        1 => prop::sample::select(ViewMode::ALL.to_vec()).prop_map(SplitCommand::SetMode),
        2 => (0usize..6).prop_map(SplitCommand::SetActiveSlot),
        1 => (0usize..6).prop_map(SplitCommand::SetUnmutedSlot),
    ]
}

proptest! {
    #[test]
    fn no_duplicate_occupancy(commands in prop::collection::vec(command(), 0..64)) {
        let mut split = SplitController::new();
        for cmd in commands {
            let _ = split.apply(cmd);
            let visible: Vec<&str> = split
                .state()
                .visible()
                .iter()
                .filter_map(|s| s.as_deref())
                .collect();
            let mut deduped = visible.clone();
            deduped.sort_unstable();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), visible.len());
        }
    }

    #[test]
    fn hidden_slots_stay_empty_and_indices_in_range(
        commands in prop::collection::vec(command(), 0..64)
    ) {
        let mut split = SplitController::new();
        for cmd in commands {
            let _ = split.apply(cmd);
            let state = split.state();
            prop_assert!(state.active_slot() < SLOT_COUNT);
            prop_assert!(state.unmuted_slot() < SLOT_COUNT);
            for slot in &state.slots()[state.slot_count()..] {
                prop_assert!(slot.is_none());
            }
        }
    }

    #[test]
    fn rejected_commands_do_not_mutate(index in SLOT_COUNT..64usize) {
        let mut split = SplitController::new();
        split.set_mode(ViewMode::Quad);
        split.assign_channel("a").unwrap();
        let before = split.state().clone();
        prop_assert!(split.set_active_slot(index).is_err());
        prop_assert!(split.set_unmuted_slot(index).is_err());
        prop_assert_eq!(split.state(), &before);
    }

    #[test]
    fn assigned_channel_is_visible(
        setup in prop::collection::vec(command(), 0..32),
        id in channel()
    ) {
        let mut split = SplitController::new();
        for cmd in setup {
            let _ = split.apply(cmd);
        }
        split.assign_channel(&id).unwrap();
        prop_assert!(split.state().contains_channel(&id));
    }
}
