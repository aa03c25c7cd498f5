//! Read-only trust reporting.
//!
//! Reports are aggregation over committed records; they take no per-user
//! locks and read an eventually-consistent snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::trust::alerts::{AlertSeverity, TrustAlert};
use crate::trust::profile::{
    Endorsement, ReputationChange, TrustLevel, TrustProfile, VerificationBadge,
};
use crate::trust::risk::{RiskAssessment, RiskLevel};

/// Aggregated view of a user's endorsements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndorsementSummary {
    pub total: usize,
    pub verified: usize,
    /// Trust-weighted average rating, 0 when no endorsements carry weight.
    pub weighted_rating: f64,
    pub by_category: HashMap<String, usize>,
}

impl EndorsementSummary {
    pub fn from_endorsements(endorsements: &[Endorsement]) -> Self {
        let total = endorsements.len();
        let verified = endorsements.iter().filter(|e| e.is_verified).count();

        let total_weight: f64 = endorsements.iter().map(|e| e.weight).sum();
        let weighted_rating = if total_weight > 0.0 {
            endorsements
                .iter()
                .map(|e| f64::from(e.rating) * e.weight)
                .sum::<f64>()
                / total_weight
        } else {
            0.0
        };

        let mut by_category: HashMap<String, usize> = HashMap::new();
        for endorsement in endorsements {
            *by_category.entry(endorsement.category.clone()).or_insert(0) += 1;
        }

        Self {
            total,
            verified,
            weighted_rating,
            by_category,
        }
    }
}

/// Everything an operator view needs about a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTrustReport {
    pub user_id: String,
    pub profile: TrustProfile,
    pub badges: Vec<VerificationBadge>,
    pub endorsements: EndorsementSummary,
    pub active_alerts: Vec<TrustAlert>,
    pub latest_risk: Option<RiskAssessment>,
    pub recent_changes: Vec<ReputationChange>,
    pub generated_at: DateTime<Utc>,
}

/// Platform-wide trust distribution snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformTrustReport {
    pub total_users: usize,
    pub average_trust_score: f64,
    pub level_distribution: HashMap<TrustLevel, usize>,
    pub unresolved_alerts_by_severity: HashMap<AlertSeverity, usize>,
    pub high_risk_users: usize,
    pub generated_at: DateTime<Utc>,
}

impl PlatformTrustReport {
    pub fn build(
        profiles: &[TrustProfile],
        unresolved_alerts: &[TrustAlert],
        assessments: &[RiskAssessment],
        now: DateTime<Utc>,
    ) -> Self {
        let total_users = profiles.len();
        let average_trust_score = if total_users > 0 {
            profiles.iter().map(|p| f64::from(p.trust_score)).sum::<f64>() / total_users as f64
        } else {
            0.0
        };

        let mut level_distribution: HashMap<TrustLevel, usize> = HashMap::new();
        for profile in profiles {
            *level_distribution.entry(profile.trust_level).or_insert(0) += 1;
        }

        let mut unresolved_alerts_by_severity: HashMap<AlertSeverity, usize> = HashMap::new();
        for alert in unresolved_alerts {
            *unresolved_alerts_by_severity
                .entry(alert.severity)
                .or_insert(0) += 1;
        }

        let high_risk_users = assessments
            .iter()
            .filter(|a| a.overall_risk >= RiskLevel::High)
            .count();

        Self {
            total_users,
            average_trust_score,
            level_distribution,
            unresolved_alerts_by_severity,
            high_risk_users,
            generated_at: now,
        }
    }
}
