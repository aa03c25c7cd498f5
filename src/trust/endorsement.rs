//! Endorsement ledger rules.
//!
//! Endorsements are append-only. The weight is looked up from the
//! endorser's trust level at submission and stored on the record; later
//! changes to the endorser's level never touch existing records, which
//! resolves the recursive trust dependency without a live graph walk.

use chrono::Utc;
use uuid::Uuid;

use crate::error::TrustError;
use crate::trust::profile::{Endorsement, TrustLevel, TrustProfile};

/// Submission payload for a new endorsement.
#[derive(Debug, Clone)]
pub struct EndorsementRequest {
    pub endorsee_id: String,
    pub category: String,
    /// 1..=5.
    pub rating: u8,
    pub comment: Option<String>,
}

/// Validate an endorsement submission against the endorser's current
/// profile and build the immutable record.
///
/// Fails when the endorser is UNVERIFIED, SUSPENDED, or BANNED, when the
/// rating is out of range, or on self-endorsement.
pub fn build_endorsement(
    endorser: &TrustProfile,
    request: EndorsementRequest,
) -> Result<Endorsement, TrustError> {
    if endorser.user_id == request.endorsee_id {
        return Err(TrustError::Validation(
            "users cannot endorse themselves".to_string(),
        ));
    }

    if !(1..=5).contains(&request.rating) {
        return Err(TrustError::Validation(format!(
            "endorsement rating must be 1-5, got {}",
            request.rating
        )));
    }

    match endorser.trust_level {
        TrustLevel::Unverified => {
            return Err(TrustError::Validation(
                "unverified users cannot endorse others".to_string(),
            ))
        }
        TrustLevel::Suspended | TrustLevel::Banned => {
            return Err(TrustError::Validation(format!(
                "{} users cannot endorse others",
                endorser.trust_level.as_str()
            )))
        }
        _ => {}
    }

    Ok(Endorsement {
        id: Uuid::new_v4().to_string(),
        endorser_id: endorser.user_id.clone(),
        endorsee_id: request.endorsee_id,
        category: request.category,
        rating: request.rating,
        comment: request.comment,
        weight: endorser.trust_level.endorsement_weight(),
        is_verified: endorser.trust_level >= TrustLevel::Verified,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endorser_at(level: TrustLevel) -> TrustProfile {
        let mut profile = TrustProfile::new("endorser_1");
        profile.trust_level = level;
        profile
    }

    fn request() -> EndorsementRequest {
        EndorsementRequest {
            endorsee_id: "endorsee_1".to_string(),
            category: "communication".to_string(),
            rating: 4,
            comment: Some("responsive and fair".to_string()),
        }
    }

    #[test]
    fn test_unverified_endorser_rejected() {
        let result = build_endorsement(&endorser_at(TrustLevel::Unverified), request());
        assert!(matches!(result, Err(TrustError::Validation(_))));
    }

    #[test]
    fn test_suspended_and_banned_rejected() {
        for level in [TrustLevel::Suspended, TrustLevel::Banned] {
            let result = build_endorsement(&endorser_at(level), request());
            assert!(matches!(result, Err(TrustError::Validation(_))));
        }
    }

    #[test]
    fn test_weight_snapshot_from_current_level() {
        let endorsement = build_endorsement(&endorser_at(TrustLevel::Trusted), request()).unwrap();
        assert_eq!(endorsement.weight, 0.7);
        assert!(endorsement.is_verified);

        let endorsement = build_endorsement(&endorser_at(TrustLevel::Basic), request()).unwrap();
        assert_eq!(endorsement.weight, 0.3);
        assert!(!endorsement.is_verified);
    }

    #[test]
    fn test_self_endorsement_rejected() {
        let endorser = endorser_at(TrustLevel::Expert);
        let mut req = request();
        req.endorsee_id = endorser.user_id.clone();
        assert!(matches!(
            build_endorsement(&endorser, req),
            Err(TrustError::Validation(_))
        ));
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let endorser = endorser_at(TrustLevel::Verified);
        for rating in [0u8, 6] {
            let mut req = request();
            req.rating = rating;
            assert!(matches!(
                build_endorsement(&endorser, req),
                Err(TrustError::Validation(_))
            ));
        }
    }
}
