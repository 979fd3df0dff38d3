//! Lineup slot table and the greedy assigner that fills it.

pub mod assigner;
pub mod slots;

pub use assigner::{assign, assign_pool, FilledSlot, LineupAssignment};
pub use slots::{validate_slots, SlotConfig, SlotInstance, SlotKind, SlotRequirement, SlotSpec};
