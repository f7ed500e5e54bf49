//! Repository layer.
//!
//! Each repository is a zero-sized struct whose async methods take any
//! Postgres executor first, so the same query runs against the pool or
//! inside a transaction.

pub mod candidate_repo;
pub mod claim_repo;
pub mod edit_version_repo;
pub mod transition_repo;

pub use candidate_repo::CandidateRepo;
pub use claim_repo::ClaimRepo;
pub use edit_version_repo::EditVersionRepo;
pub use transition_repo::TransitionRepo;
