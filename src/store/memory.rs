//! In-memory trust store.
//!
//! Backs the test suite and single-node deployments without PostgreSQL.
//! Signal snapshots (activity, social, risk, profile details) are fed in
//! through the setter methods the way collaborating services would write
//! their tables.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::store::TrustStore;
use crate::trust::alerts::TrustAlert;
use crate::trust::profile::{
    ActivitySnapshot, Endorsement, OrderRecord, ProfileDetails, ReputationChange, ReviewRecord,
    RiskSignals, SocialSnapshot, TrustMetric, TrustProfile, VerificationBadge,
};
use crate::trust::risk::RiskAssessment;

#[derive(Default)]
pub struct MemoryStore {
    profiles: DashMap<String, TrustProfile>,
    metrics: DashMap<String, Vec<TrustMetric>>,
    badges: DashMap<String, Vec<VerificationBadge>>,
    endorsements: DashMap<String, Vec<Endorsement>>,
    changes: DashMap<String, Vec<ReputationChange>>,
    assessments: DashMap<String, RiskAssessment>,
    alerts: DashMap<String, TrustAlert>,
    reviews: DashMap<String, ReviewRecord>,
    orders: DashMap<String, Vec<OrderRecord>>,
    activity: DashMap<String, ActivitySnapshot>,
    social: DashMap<String, SocialSnapshot>,
    signals: DashMap<String, RiskSignals>,
    details: DashMap<String, ProfileDetails>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Setters standing in for the collaborating services that own these
    // tables in production.

    pub fn set_activity(&self, user_id: impl Into<String>, snapshot: ActivitySnapshot) {
        self.activity.insert(user_id.into(), snapshot);
    }

    pub fn set_social(&self, user_id: impl Into<String>, snapshot: SocialSnapshot) {
        self.social.insert(user_id.into(), snapshot);
    }

    pub fn set_risk_signals(&self, user_id: impl Into<String>, signals: RiskSignals) {
        self.signals.insert(user_id.into(), signals);
    }

    pub fn set_profile_details(&self, user_id: impl Into<String>, details: ProfileDetails) {
        self.details.insert(user_id.into(), details);
    }
}

#[async_trait]
impl TrustStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<TrustProfile>, StoreError> {
        Ok(self.profiles.get(user_id).map(|p| p.clone()))
    }

    async fn put_profile(&self, profile: &TrustProfile) -> Result<(), StoreError> {
        self.profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn all_profiles(&self) -> Result<Vec<TrustProfile>, StoreError> {
        Ok(self.profiles.iter().map(|p| p.value().clone()).collect())
    }

    async fn metrics_for_user(&self, user_id: &str) -> Result<Vec<TrustMetric>, StoreError> {
        Ok(self
            .metrics
            .get(user_id)
            .map(|m| m.clone())
            .unwrap_or_default())
    }

    async fn upsert_metric(&self, metric: &TrustMetric) -> Result<(), StoreError> {
        let mut entry = self.metrics.entry(metric.user_id.clone()).or_default();
        match entry.iter_mut().find(|m| m.kind == metric.kind) {
            Some(existing) => *existing = metric.clone(),
            None => entry.push(metric.clone()),
        }
        Ok(())
    }

    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<VerificationBadge>, StoreError> {
        Ok(self
            .badges
            .get(user_id)
            .map(|b| b.clone())
            .unwrap_or_default())
    }

    async fn upsert_badge(&self, badge: &VerificationBadge) -> Result<(), StoreError> {
        let mut entry = self.badges.entry(badge.user_id.clone()).or_default();
        match entry.iter_mut().find(|b| b.kind == badge.kind) {
            Some(existing) => *existing = badge.clone(),
            None => entry.push(badge.clone()),
        }
        Ok(())
    }

    async fn insert_endorsement(&self, endorsement: &Endorsement) -> Result<(), StoreError> {
        self.endorsements
            .entry(endorsement.endorsee_id.clone())
            .or_default()
            .push(endorsement.clone());
        Ok(())
    }

    async fn endorsements_for_user(
        &self,
        endorsee_id: &str,
    ) -> Result<Vec<Endorsement>, StoreError> {
        Ok(self
            .endorsements
            .get(endorsee_id)
            .map(|e| e.clone())
            .unwrap_or_default())
    }

    async fn insert_change(&self, change: &ReputationChange) -> Result<(), StoreError> {
        self.changes
            .entry(change.user_id.clone())
            .or_default()
            .push(change.clone());
        Ok(())
    }

    async fn changes_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ReputationChange>, StoreError> {
        let mut changes = self
            .changes
            .get(user_id)
            .map(|c| c.clone())
            .unwrap_or_default();
        changes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        changes.truncate(limit);
        Ok(changes)
    }

    async fn put_assessment(&self, assessment: &RiskAssessment) -> Result<(), StoreError> {
        self.assessments
            .insert(assessment.user_id.clone(), assessment.clone());
        Ok(())
    }

    async fn latest_assessment(
        &self,
        user_id: &str,
    ) -> Result<Option<RiskAssessment>, StoreError> {
        Ok(self.assessments.get(user_id).map(|a| a.clone()))
    }

    async fn all_assessments(&self) -> Result<Vec<RiskAssessment>, StoreError> {
        Ok(self.assessments.iter().map(|a| a.value().clone()).collect())
    }

    async fn insert_alert(&self, alert: &TrustAlert) -> Result<(), StoreError> {
        self.alerts.insert(alert.id.clone(), alert.clone());
        Ok(())
    }

    async fn get_alert(&self, alert_id: &str) -> Result<Option<TrustAlert>, StoreError> {
        Ok(self.alerts.get(alert_id).map(|a| a.clone()))
    }

    async fn update_alert(&self, alert: &TrustAlert) -> Result<(), StoreError> {
        if !self.alerts.contains_key(&alert.id) {
            return Err(StoreError::NotFound(format!("alert {}", alert.id)));
        }
        self.alerts.insert(alert.id.clone(), alert.clone());
        Ok(())
    }

    async fn alerts_for_user(&self, user_id: &str) -> Result<Vec<TrustAlert>, StoreError> {
        let mut alerts: Vec<_> = self
            .alerts
            .iter()
            .filter(|a| a.value().user_id == user_id)
            .map(|a| a.value().clone())
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    async fn unresolved_alerts(&self) -> Result<Vec<TrustAlert>, StoreError> {
        Ok(self
            .alerts
            .iter()
            .filter(|a| !a.value().is_resolved)
            .map(|a| a.value().clone())
            .collect())
    }

    async fn insert_review(&self, review: &ReviewRecord) -> Result<(), StoreError> {
        self.reviews.insert(review.review_id.clone(), review.clone());
        Ok(())
    }

    async fn get_review(&self, review_id: &str) -> Result<Option<ReviewRecord>, StoreError> {
        Ok(self.reviews.get(review_id).map(|r| r.clone()))
    }

    async fn reviews_for_subject(
        &self,
        subject_id: &str,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        Ok(self
            .reviews
            .iter()
            .filter(|r| r.value().subject_id == subject_id)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn reviews_by_author(&self, author_id: &str) -> Result<Vec<ReviewRecord>, StoreError> {
        Ok(self
            .reviews
            .iter()
            .filter(|r| r.value().author_id == author_id)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn insert_order(&self, order: &OrderRecord) -> Result<(), StoreError> {
        self.orders
            .entry(order.user_id.clone())
            .or_default()
            .push(order.clone());
        Ok(())
    }

    async fn orders_for_user(&self, user_id: &str) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self
            .orders
            .get(user_id)
            .map(|o| o.clone())
            .unwrap_or_default())
    }

    async fn activity_for_user(&self, user_id: &str) -> Result<ActivitySnapshot, StoreError> {
        Ok(self
            .activity
            .get(user_id)
            .map(|a| a.clone())
            .unwrap_or_default())
    }

    async fn social_for_user(&self, user_id: &str) -> Result<SocialSnapshot, StoreError> {
        Ok(self
            .social
            .get(user_id)
            .map(|s| s.clone())
            .unwrap_or_default())
    }

    async fn risk_signals_for_user(&self, user_id: &str) -> Result<RiskSignals, StoreError> {
        let mut signals = self
            .signals
            .get(user_id)
            .map(|s| s.clone())
            .unwrap_or_default();
        // Order count is derived from the order ledger, not maintained
        // separately.
        signals.order_count = self
            .orders
            .get(user_id)
            .map(|o| o.len() as u32)
            .unwrap_or(0);
        Ok(signals)
    }

    async fn profile_details(&self, user_id: &str) -> Result<Option<ProfileDetails>, StoreError> {
        Ok(self.details.get(user_id).map(|d| d.clone()))
    }

    async fn record_dispute(&self, user_id: &str) -> Result<(), StoreError> {
        self.signals
            .entry(user_id.to_string())
            .or_default()
            .dispute_count += 1;
        Ok(())
    }

    async fn record_violation(&self, user_id: &str) -> Result<(), StoreError> {
        self.signals
            .entry(user_id.to_string())
            .or_default()
            .violation_count += 1;
        Ok(())
    }
}
