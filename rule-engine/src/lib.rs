//! Rule Engine - rule matching and group activation for the extension manager
//!
//! Given the current browsing context, this crate decides which predefined
//! rules apply, resolves each rule's target (a named group of extensions or
//! an explicit list) into a concrete extension set, merges overlapping rules
//! into one deterministic plan, applies the plan idempotently through the
//! browser's extension-management collaborator, and records history for
//! every applied action.

pub mod cycle;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod history;
pub mod matcher;
pub mod planner;
pub mod scene;
pub mod traits;
pub mod types;


pub use cycle::{CycleGate, CycleToken};
pub use dispatcher::ActionDispatcher;
pub use engine::{CycleNotice, RuleEngine};
pub use error::{EngineResult, RuleEngineError};
pub use history::HistoryRecorder;
pub use matcher::{any_host_matches, condition_matches, host_matches, match_rules};
pub use planner::{build_plan, PlanOutcome};
pub use scene::{build_scene, extract_host};
pub use traits::{ExtensionHost, HistoryStore, RuleStore};
pub use types::{
    ActionSpec, DispatchOutcome, DispatchReport, DispatchedAction, EvaluationResult,
    ExtensionAction, ExtensionActionPlan, Group, MatchCondition, MatchMethod, PlannedAction, Rule,
    Scene, TabContext, Target,
};
