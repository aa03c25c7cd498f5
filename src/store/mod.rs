//! Storage boundary.
//!
//! The engine consumes a durable per-user keyed store through the
//! `TrustStore` trait; the trust manager provides the per-user critical
//! section itself, so implementations only need plain CRUD plus
//! list-by-user queries. `MemoryStore` backs tests and single-node
//! deployments; `PostgresStore` is the durable adapter.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::trust::alerts::TrustAlert;
use crate::trust::profile::{
    ActivitySnapshot, Endorsement, OrderRecord, ProfileDetails, ReputationChange, ReviewRecord,
    RiskSignals, SocialSnapshot, TrustMetric, TrustProfile, VerificationBadge,
};
use crate::trust::risk::RiskAssessment;

/// Durable keyed store for every record kind the trust engine reads or
/// writes. All methods are point lookups or per-user lists; platform-wide
/// iteration (`all_profiles`, `unresolved_alerts`, `all_assessments`) is
/// an eventually-consistent snapshot and must not take per-user locks.
#[async_trait]
pub trait TrustStore: Send + Sync {
    // Profiles
    async fn get_profile(&self, user_id: &str) -> Result<Option<TrustProfile>, StoreError>;
    async fn put_profile(&self, profile: &TrustProfile) -> Result<(), StoreError>;
    async fn all_profiles(&self) -> Result<Vec<TrustProfile>, StoreError>;

    // Metrics (unique per user + kind)
    async fn metrics_for_user(&self, user_id: &str) -> Result<Vec<TrustMetric>, StoreError>;
    async fn upsert_metric(&self, metric: &TrustMetric) -> Result<(), StoreError>;

    // Badges (unique per user + kind)
    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<VerificationBadge>, StoreError>;
    async fn upsert_badge(&self, badge: &VerificationBadge) -> Result<(), StoreError>;

    // Endorsements (append-only)
    async fn insert_endorsement(&self, endorsement: &Endorsement) -> Result<(), StoreError>;
    async fn endorsements_for_user(&self, endorsee_id: &str)
        -> Result<Vec<Endorsement>, StoreError>;

    // Reputation changes (append-only audit trail)
    async fn insert_change(&self, change: &ReputationChange) -> Result<(), StoreError>;
    async fn changes_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ReputationChange>, StoreError>;

    // Risk assessments (full overwrite per user)
    async fn put_assessment(&self, assessment: &RiskAssessment) -> Result<(), StoreError>;
    async fn latest_assessment(&self, user_id: &str) -> Result<Option<RiskAssessment>, StoreError>;
    async fn all_assessments(&self) -> Result<Vec<RiskAssessment>, StoreError>;

    // Alerts
    async fn insert_alert(&self, alert: &TrustAlert) -> Result<(), StoreError>;
    async fn get_alert(&self, alert_id: &str) -> Result<Option<TrustAlert>, StoreError>;
    async fn update_alert(&self, alert: &TrustAlert) -> Result<(), StoreError>;
    async fn alerts_for_user(&self, user_id: &str) -> Result<Vec<TrustAlert>, StoreError>;
    async fn unresolved_alerts(&self) -> Result<Vec<TrustAlert>, StoreError>;

    // Reviews
    async fn insert_review(&self, review: &ReviewRecord) -> Result<(), StoreError>;
    async fn get_review(&self, review_id: &str) -> Result<Option<ReviewRecord>, StoreError>;
    async fn reviews_for_subject(&self, subject_id: &str) -> Result<Vec<ReviewRecord>, StoreError>;
    async fn reviews_by_author(&self, author_id: &str) -> Result<Vec<ReviewRecord>, StoreError>;

    // Orders
    async fn insert_order(&self, order: &OrderRecord) -> Result<(), StoreError>;
    async fn orders_for_user(&self, user_id: &str) -> Result<Vec<OrderRecord>, StoreError>;

    // Signals maintained by collaborating services
    async fn activity_for_user(&self, user_id: &str) -> Result<ActivitySnapshot, StoreError>;
    async fn social_for_user(&self, user_id: &str) -> Result<SocialSnapshot, StoreError>;
    async fn risk_signals_for_user(&self, user_id: &str) -> Result<RiskSignals, StoreError>;
    async fn profile_details(&self, user_id: &str) -> Result<Option<ProfileDetails>, StoreError>;
    async fn record_dispute(&self, user_id: &str) -> Result<(), StoreError>;
    async fn record_violation(&self, user_id: &str) -> Result<(), StoreError>;
}
