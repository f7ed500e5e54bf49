//! Row structs for the review and edit tables.
//!
//! Each row converts into the matching `vinco_core` domain type; status and
//! action columns are decoded there so a bad row surfaces as an error
//! instead of a panic.

pub mod candidate;
pub mod claim;
pub mod edit_version;
pub mod status;
pub mod transition;
