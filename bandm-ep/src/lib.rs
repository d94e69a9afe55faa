//! bandm-ep library - Escalation Planner
//!
//! Decides which roles an event still needs, stages suggestions from the
//! event's lineup, ranks candidate members by priority history and keeps the
//! confirmed roster in step with the backend.
//!
//! Components, leaves first:
//! - [`priority::PriorityRanker`] - per-role member ordering, cached per session
//! - [`lineup::expand_lineup`] - lineup slots into pending suggestions
//! - [`escalation_set::EscalationSet`] - confirmed roster, refetched after every mutation
//! - [`staging::StagingArea`] - unconfirmed suggestions, addressed by key
//! - [`scale_status`] - pure readiness derivation for dashboards
//!
//! [`session::PlanningSession`] wires them together for one event.

pub mod api;
pub mod context;
pub mod error;
pub mod escalation_set;
pub mod lineup;
pub mod priority;
pub mod scale_status;
pub mod session;
pub mod staging;

pub use api::{ApiError, BandApi, HttpBandApi};
pub use context::SessionContext;
pub use error::{PlanError, PlanResult};
pub use escalation_set::{EscalationDraft, EscalationSet};
pub use scale_status::{ScaleReport, ScaleStatus};
pub use session::{ApplyOutcome, PlanningSession};
pub use staging::{PendingSuggestion, StagingArea, SuggestionKey};
