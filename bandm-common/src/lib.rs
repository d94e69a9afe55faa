//! # Band Management Common Library
//!
//! Shared code for the band-management client crates:
//! - Identifier type parsed at the API boundary
//! - Domain models (roles, members, lineups, events, escalations)
//! - Configuration loading
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use ids::{BandId, EscalationId, EventId, Id, LineupId, RoleId, SlotId, UserId};
