//! Domain Services - business operations spanning several entities

pub mod grouping;
pub mod ledger;
pub mod progression;

pub use grouping::group_by_title_prefix;
pub use ledger::{merge_achievements, total_points};
pub use progression::{
    check_advance, check_review_decision, check_review_request, check_toggle,
    ensure_stage_complete, next_stage, seed_plan, ChecklistItem, StageChecklist,
};
