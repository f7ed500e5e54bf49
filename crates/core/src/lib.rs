//! Vinco domain core.
//!
//! Zero internal dependencies: everything the database, event and HTTP layers
//! share lives here so that the recognition review rules and the edit
//! parameter model are defined exactly once.
//!
//! - [`edits`] -- non-destructive edit parameters, validation and diffing.
//! - [`history`] -- append-only edit snapshot log per image.
//! - [`candidate`] -- recognized-athlete candidates and their review state machine.
//! - [`ingest`] -- threshold policy deciding a detection's initial status.
//! - [`claims`] -- advisory, time-bounded review leases.
//! - [`queue`] -- the validation queue service, ordering, filters and cursor.
//! - [`store`] -- persistence traits and the in-memory implementation.

pub mod candidate;
pub mod claims;
pub mod diff;
pub mod edits;
pub mod error;
pub mod history;
pub mod ingest;
pub mod queue;
pub mod roles;
pub mod store;
pub mod types;
