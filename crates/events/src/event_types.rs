//! Event names published on the bus.

pub const RECOGNITION_INGESTED: &str = "recognition.ingested";
pub const RECOGNITION_CLAIMED: &str = "recognition.claimed";
pub const RECOGNITION_RELEASED: &str = "recognition.released";
pub const RECOGNITION_RESOLVED: &str = "recognition.resolved";
pub const EDITS_SAVED: &str = "edits.saved";
pub const EDITS_REVERTED: &str = "edits.reverted";
pub const EDITS_RESET: &str = "edits.reset";

/// Entity kinds used as event sources.
pub const ENTITY_CANDIDATE: &str = "recognition_candidate";
pub const ENTITY_IMAGE: &str = "image";
