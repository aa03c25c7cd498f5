//! Review authenticity checks.
//!
//! Pattern-based, not learned: each triggered flag deducts from a starting
//! score of 100 and the final status falls out of fixed thresholds. The
//! stored score is clamped to 0..=100; the status is decided before
//! clamping so stacked flags cannot mask each other.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::trust::profile::ReviewRecord;

/// Reviews allowed per author in the trailing 24 hours before the volume
/// counts as a bulk-review burst.
const BURST_REVIEW_LIMIT: usize = 5;

const DUPLICATE_PENALTY: i32 = 30;
const BURST_PENALTY: i32 = 25;
const UNVERIFIED_PURCHASE_PENALTY: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticityStatus {
    Authentic,
    Suspicious,
    Fake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthenticityFlag {
    /// Same author already reviewed the same subject elsewhere.
    DuplicateReview,
    /// Author exceeded the 24-hour review volume limit.
    SuspiciousTiming,
    /// Review is not linked to a verified purchase.
    FakePurchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuspiciousPattern {
    BulkReviews,
}

/// Outcome of an authenticity check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAuthenticity {
    pub review_id: String,
    /// 0..=100 after clamping.
    pub score: i32,
    pub status: AuthenticityStatus,
    pub flags: Vec<AuthenticityFlag>,
    pub patterns: Vec<SuspiciousPattern>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct AuthenticityVerifier;

impl AuthenticityVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate one review against the author's full review history.
    /// `author_reviews` must include the review under evaluation.
    pub fn verify(
        &self,
        review: &ReviewRecord,
        author_reviews: &[ReviewRecord],
        now: DateTime<Utc>,
    ) -> ReviewAuthenticity {
        let mut score = 100i32;
        let mut flags = Vec::new();
        let mut patterns = Vec::new();

        let duplicate = author_reviews.iter().any(|other| {
            other.review_id != review.review_id && other.subject_id == review.subject_id
        });
        if duplicate {
            flags.push(AuthenticityFlag::DuplicateReview);
            score -= DUPLICATE_PENALTY;
        }

        let window_start = now - Duration::hours(24);
        let recent = author_reviews
            .iter()
            .filter(|r| r.created_at >= window_start)
            .count();
        if recent > BURST_REVIEW_LIMIT {
            flags.push(AuthenticityFlag::SuspiciousTiming);
            patterns.push(SuspiciousPattern::BulkReviews);
            score -= BURST_PENALTY;
        }

        if !review.verified_purchase {
            flags.push(AuthenticityFlag::FakePurchase);
            score -= UNVERIFIED_PURCHASE_PENALTY;
        }

        // Status is decided on the raw total; all three flags together
        // drive it to 5, which is already FAKE, so clamping the stored
        // score never changes the outcome.
        let status = if score < 40 {
            AuthenticityStatus::Fake
        } else if score < 70 {
            AuthenticityStatus::Suspicious
        } else {
            AuthenticityStatus::Authentic
        };

        ReviewAuthenticity {
            review_id: review.review_id.clone(),
            score: score.clamp(0, 100),
            status,
            flags,
            patterns,
            checked_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: &str, subject: &str, verified: bool, age_hours: i64) -> ReviewRecord {
        ReviewRecord {
            review_id: id.to_string(),
            author_id: "author_1".to_string(),
            subject_id: subject.to_string(),
            rating: 5,
            verified_purchase: verified,
            created_at: Utc::now() - Duration::hours(age_hours),
        }
    }

    #[test]
    fn test_clean_review_is_authentic() {
        let target = review("rev_1", "seller_1", true, 1);
        let result =
            AuthenticityVerifier::new().verify(&target, std::slice::from_ref(&target), Utc::now());
        assert_eq!(result.score, 100);
        assert_eq!(result.status, AuthenticityStatus::Authentic);
        assert!(result.flags.is_empty());
        assert!(result.patterns.is_empty());
    }

    #[test]
    fn test_duplicate_review_flagged() {
        let target = review("rev_2", "seller_1", true, 1);
        let history = vec![review("rev_1", "seller_1", true, 400), target.clone()];
        let result = AuthenticityVerifier::new().verify(&target, &history, Utc::now());
        assert_eq!(result.flags, vec![AuthenticityFlag::DuplicateReview]);
        assert_eq!(result.score, 70);
        assert_eq!(result.status, AuthenticityStatus::Authentic);
    }

    #[test]
    fn test_burst_with_unverified_purchase_is_fake() {
        // Six reviews inside 24h, target not linked to a purchase:
        // 100 - 25 - 40 = 35 => FAKE.
        let target = review("rev_5", "seller_x", false, 0);
        let mut history: Vec<_> = (0..5)
            .map(|i| review(&format!("rev_{i}"), &format!("seller_{i}"), true, 2))
            .collect();
        history.push(target.clone());

        let result = AuthenticityVerifier::new().verify(&target, &history, Utc::now());
        assert_eq!(
            result.flags,
            vec![
                AuthenticityFlag::SuspiciousTiming,
                AuthenticityFlag::FakePurchase
            ]
        );
        assert_eq!(result.patterns, vec![SuspiciousPattern::BulkReviews]);
        assert_eq!(result.score, 35);
        assert_eq!(result.status, AuthenticityStatus::Fake);
    }

    #[test]
    fn test_five_reviews_in_window_is_not_a_burst() {
        let target = review("rev_4", "seller_4", true, 0);
        let mut history: Vec<_> = (0..4)
            .map(|i| review(&format!("rev_{i}"), &format!("seller_{i}"), true, 3))
            .collect();
        history.push(target.clone());

        let result = AuthenticityVerifier::new().verify(&target, &history, Utc::now());
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_old_reviews_outside_window_ignored() {
        let target = review("rev_new", "seller_new", true, 0);
        let mut history: Vec<_> = (0..10)
            .map(|i| review(&format!("rev_{i}"), &format!("seller_{i}"), true, 48))
            .collect();
        history.push(target.clone());

        let result = AuthenticityVerifier::new().verify(&target, &history, Utc::now());
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_all_flags_clamp_to_zero() {
        // Duplicate + burst + no purchase: raw 100 - 30 - 25 - 40 = 5,
        // still positive, FAKE. Clamp only matters if penalties grow.
        let target = review("rev_9", "seller_dup", false, 0);
        let mut history: Vec<_> = (0..6)
            .map(|i| review(&format!("rev_{i}"), &format!("seller_{i}"), true, 1))
            .collect();
        history.push(review("rev_8", "seller_dup", true, 2));
        history.push(target.clone());

        let result = AuthenticityVerifier::new().verify(&target, &history, Utc::now());
        assert_eq!(result.flags.len(), 3);
        assert_eq!(result.score, 5);
        assert_eq!(result.status, AuthenticityStatus::Fake);
        assert!((0..=100).contains(&result.score));
    }

    #[test]
    fn test_unverified_purchase_alone_is_suspicious() {
        let target = review("rev_1", "seller_1", false, 1);
        let result =
            AuthenticityVerifier::new().verify(&target, std::slice::from_ref(&target), Utc::now());
        assert_eq!(result.score, 60);
        assert_eq!(result.status, AuthenticityStatus::Suspicious);
    }
}
