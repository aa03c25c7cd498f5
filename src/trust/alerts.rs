//! Trust alert monitoring.
//!
//! Runs inside the per-user critical section of a profile update, so the
//! "previous score" it diffs against is the value immediately preceding
//! the write. Alerts are deduplicated per (user, alert type) over a
//! configurable window and are only ever resolved by operator action.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AlertConfig;
use crate::trust::profile::VerificationBadge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    ReputationDrop,
    VerificationExpiring,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::ReputationDrop => "REPUTATION_DROP",
            AlertType::VerificationExpiring => "VERIFICATION_EXPIRING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "REPUTATION_DROP" => Some(AlertType::ReputationDrop),
            "VERIFICATION_EXPIRING" => Some(AlertType::VerificationExpiring),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertSeverity::Low => "LOW",
            AlertSeverity::Medium => "MEDIUM",
            AlertSeverity::High => "HIGH",
            AlertSeverity::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(AlertSeverity::Low),
            "MEDIUM" => Some(AlertSeverity::Medium),
            "HIGH" => Some(AlertSeverity::High),
            "CRITICAL" => Some(AlertSeverity::Critical),
            _ => None,
        }
    }
}

/// An operator-facing notification of a significant trust event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustAlert {
    pub id: String,
    pub user_id: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

impl TrustAlert {
    pub fn new(
        user_id: impl Into<String>,
        alert_type: AlertType,
        severity: AlertSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            alert_type,
            severity,
            message: message.into(),
            is_resolved: false,
            created_at: Utc::now(),
            resolved_at: None,
            resolved_by: None,
        }
    }

    /// Explicit operator resolution.
    pub fn resolve(&mut self, resolved_by: impl Into<String>, now: DateTime<Utc>) {
        self.is_resolved = true;
        self.resolved_at = Some(now);
        self.resolved_by = Some(resolved_by.into());
    }
}

pub struct AlertMonitor {
    config: AlertConfig,
}

impl AlertMonitor {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    /// Compare the previous committed score against the new one and check
    /// badge expirations, emitting deduplicated alerts.
    ///
    /// `existing` is the user's current alert list; an unresolved alert of
    /// the same type created inside the dedup window suppresses a new one,
    /// which keeps concurrent recomputations from double-alerting.
    pub fn check(
        &self,
        user_id: &str,
        previous_score: i32,
        new_score: i32,
        badges: &[VerificationBadge],
        existing: &[TrustAlert],
        now: DateTime<Utc>,
    ) -> Vec<TrustAlert> {
        let mut alerts = Vec::new();

        let drop = previous_score - new_score;
        if drop >= self.config.drop_high && !self.is_duplicate(existing, AlertType::ReputationDrop, now) {
            let severity = if drop >= self.config.drop_critical {
                AlertSeverity::Critical
            } else {
                AlertSeverity::High
            };
            alerts.push(TrustAlert::new(
                user_id,
                AlertType::ReputationDrop,
                severity,
                format!("Trust score dropped from {previous_score} to {new_score} ({drop} points)"),
            ));
        }

        let expiry_cutoff = now + Duration::days(self.config.badge_expiry_window_days);
        let expiring = badges
            .iter()
            .filter(|badge| {
                badge.is_valid_at(now)
                    && badge
                        .expires_at
                        .is_some_and(|expires| expires <= expiry_cutoff)
            })
            .count();
        if expiring > 0 && !self.is_duplicate(existing, AlertType::VerificationExpiring, now) {
            alerts.push(TrustAlert::new(
                user_id,
                AlertType::VerificationExpiring,
                AlertSeverity::Medium,
                format!(
                    "{expiring} verification badge(s) expire within {} days",
                    self.config.badge_expiry_window_days
                ),
            ));
        }

        alerts
    }

    fn is_duplicate(&self, existing: &[TrustAlert], alert_type: AlertType, now: DateTime<Utc>) -> bool {
        let window_start = now - Duration::hours(self.config.dedup_window_hours);
        existing.iter().any(|alert| {
            alert.alert_type == alert_type && !alert.is_resolved && alert.created_at >= window_start
        })
    }
}

impl Default for AlertMonitor {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
