//! Status enums mapping to SMALLINT lookup tables.
//!
//! Discriminants match the seed order (1-based) in the `*_statuses` table.

use vinco_core::candidate::CandidateStatus;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Decode a stored id. `None` for ids not in the seed data.
            pub fn from_id(id: StatusId) -> Option<Self> {
                $( if id == $val { return Some(Self::$variant); } )+
                None
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Rows of `candidate_statuses`.
    CandidateStatusId {
        AutoApproved = 1,
        PendingReview = 2,
        Approved = 3,
        Rejected = 4,
    }
}

impl From<CandidateStatus> for CandidateStatusId {
    fn from(status: CandidateStatus) -> Self {
        match status {
            CandidateStatus::AutoApproved => Self::AutoApproved,
            CandidateStatus::PendingReview => Self::PendingReview,
            CandidateStatus::Approved => Self::Approved,
            CandidateStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<CandidateStatusId> for CandidateStatus {
    fn from(id: CandidateStatusId) -> Self {
        match id {
            CandidateStatusId::AutoApproved => Self::AutoApproved,
            CandidateStatusId::PendingReview => Self::PendingReview,
            CandidateStatusId::Approved => Self::Approved,
            CandidateStatusId::Rejected => Self::Rejected,
        }
    }
}

/// Database id for a domain status.
pub fn status_id(status: CandidateStatus) -> StatusId {
    CandidateStatusId::from(status).id()
}

/// Domain status for a stored id.
pub fn decode_status(id: StatusId) -> Result<CandidateStatus, sqlx::Error> {
    CandidateStatusId::from_id(id)
        .map(CandidateStatus::from)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown candidate status id {id}").into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_seed_order() {
        assert_eq!(status_id(CandidateStatus::AutoApproved), 1);
        assert_eq!(status_id(CandidateStatus::PendingReview), 2);
        assert_eq!(status_id(CandidateStatus::Approved), 3);
        assert_eq!(status_id(CandidateStatus::Rejected), 4);
    }

    #[test]
    fn every_status_round_trips_through_its_id() {
        for status in CandidateStatus::ALL {
            assert_eq!(decode_status(status_id(status)).unwrap(), status);
        }
        assert!(decode_status(0).is_err());
        assert!(decode_status(5).is_err());
    }
}
