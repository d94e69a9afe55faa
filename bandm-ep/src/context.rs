//! Explicit session context

use bandm_common::{BandId, UserId};

/// Who is planning, and for which band
///
/// Passed to every operation that needs band or viewer information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub band_id: BandId,
    pub viewer_id: UserId,
    /// Band administrators see expected lineup sizes and may edit rosters
    pub viewer_is_admin: bool,
}

impl SessionContext {
    pub fn new(band_id: BandId, viewer_id: UserId, viewer_is_admin: bool) -> Self {
        Self {
            band_id,
            viewer_id,
            viewer_is_admin,
        }
    }
}
