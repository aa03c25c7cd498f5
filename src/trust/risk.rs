//! Abuse-risk assessment, independent of the trust score path.
//!
//! Each present factor carries a score and a weight; the overall risk
//! score is the weighted average over present factors only. An assessment
//! fully replaces any prior one for the user - never an incremental merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RiskConfig;
use crate::trust::profile::RiskSignals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(RiskLevel::Low),
            "MEDIUM" => Some(RiskLevel::Medium),
            "HIGH" => Some(RiskLevel::High),
            "CRITICAL" => Some(RiskLevel::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFactorKind {
    MultipleAccounts,
    HighDisputeRate,
    PolicyViolations,
}

impl RiskFactorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskFactorKind::MultipleAccounts => "MULTIPLE_ACCOUNTS",
            RiskFactorKind::HighDisputeRate => "HIGH_DISPUTE_RATE",
            RiskFactorKind::PolicyViolations => "POLICY_VIOLATIONS",
        }
    }
}

/// A single present risk factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub kind: RiskFactorKind,
    pub score: f64,
    pub weight: f64,
    pub description: String,
}

/// Full risk evaluation for a user at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub id: String,
    pub user_id: String,
    pub overall_risk: RiskLevel,
    pub risk_score: f64,
    pub factors: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

pub struct RiskAssessor {
    config: RiskConfig,
}

impl RiskAssessor {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Evaluate the user's risk signals into a complete assessment.
    pub fn assess(&self, user_id: &str, signals: &RiskSignals, now: DateTime<Utc>) -> RiskAssessment {
        let mut factors = Vec::new();

        if signals.shared_contact_accounts > 0 {
            factors.push(RiskFactor {
                kind: RiskFactorKind::MultipleAccounts,
                score: 30.0,
                weight: 0.8,
                description: format!(
                    "{} other account(s) share this user's email or phone",
                    signals.shared_contact_accounts
                ),
            });
        }

        if signals.order_count > 0 {
            let dispute_rate =
                f64::from(signals.dispute_count) / f64::from(signals.order_count) * 100.0;
            if dispute_rate > self.config.dispute_rate_threshold {
                factors.push(RiskFactor {
                    kind: RiskFactorKind::HighDisputeRate,
                    score: (dispute_rate * 2.0).min(50.0),
                    weight: 0.7,
                    description: format!(
                        "dispute rate {:.1}% over {} order(s)",
                        dispute_rate, signals.order_count
                    ),
                });
            }
        }

        if signals.violation_count > 0 {
            factors.push(RiskFactor {
                kind: RiskFactorKind::PolicyViolations,
                score: (f64::from(signals.violation_count) * 10.0).min(40.0),
                weight: 0.6,
                description: format!("{} recorded policy violation(s)", signals.violation_count),
            });
        }

        let risk_score = Self::weighted_score(&factors);
        let overall_risk = self.classify(risk_score);
        let recommendations = Self::recommendations(&factors, overall_risk);

        RiskAssessment {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            overall_risk,
            risk_score,
            factors,
            recommendations,
            assessed_at: now,
        }
    }

    /// Weighted average over present factors; 0 when none are present.
    fn weighted_score(factors: &[RiskFactor]) -> f64 {
        let total_weight: f64 = factors.iter().map(|f| f.weight).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        factors.iter().map(|f| f.score * f.weight).sum::<f64>() / total_weight
    }

    fn classify(&self, risk_score: f64) -> RiskLevel {
        if risk_score >= self.config.critical_threshold {
            RiskLevel::Critical
        } else if risk_score >= self.config.high_threshold {
            RiskLevel::High
        } else if risk_score >= self.config.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn recommendations(factors: &[RiskFactor], overall: RiskLevel) -> Vec<String> {
        let mut recommendations = Vec::new();
        for factor in factors {
            let text = match factor.kind {
                RiskFactorKind::MultipleAccounts => {
                    "Investigate linked accounts sharing contact details"
                }
                RiskFactorKind::HighDisputeRate => {
                    "Review recent disputed orders and seller conduct"
                }
                RiskFactorKind::PolicyViolations => {
                    "Audit policy violation history for repeat behavior"
                }
            };
            let text = text.to_string();
            if !recommendations.contains(&text) {
                recommendations.push(text);
            }
        }
        match overall {
            RiskLevel::Critical => {
                recommendations.push("Suspend account pending manual review".to_string());
            }
            RiskLevel::High => {
                recommendations.push("Enable enhanced monitoring for this account".to_string());
            }
            RiskLevel::Medium | RiskLevel::Low => {}
        }
        recommendations
    }
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}
