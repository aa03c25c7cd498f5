//! Engine configuration.
//!
//! Loaded from environment variables with production defaults; every
//! override is validated before the engine starts. Scoring constants that
//! the audit trail depends on (badge bonuses, endorsement weights, metric
//! seeds) are fixed tables in code, not configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustConfig {
    pub scoring: ScoringConfig,
    pub risk: RiskConfig,
    pub alerts: AlertConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Exponential recency decay constant for review weighting, in days.
    /// Activity counters arrive pre-windowed to a trailing 30 days by the
    /// services that maintain them, so there is no window knob here.
    pub review_decay_days: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Dispute rate (percent) above which the dispute factor is present.
    pub dispute_rate_threshold: f64,
    /// Risk score thresholds for MEDIUM / HIGH / CRITICAL.
    pub medium_threshold: f64,
    pub high_threshold: f64,
    pub critical_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Score drop that raises a HIGH reputation-drop alert.
    pub drop_high: i32,
    /// Score drop that escalates the alert to CRITICAL.
    pub drop_critical: i32,
    /// Days ahead to warn about badge expiration.
    pub badge_expiry_window_days: i64,
    /// Dedup window per (user, alert type), in hours.
    pub dedup_window_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug) for the embedding binary's
    /// subscriber setup. The library only emits `tracing` events and never
    /// installs a subscriber itself.
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string.
    pub postgres_url: String,
    /// Enable PostgreSQL (if false, callers use the in-memory store).
    pub postgres_enabled: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            review_decay_days: 180.0,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            dispute_rate_threshold: 5.0,
            medium_threshold: 30.0,
            high_threshold: 50.0,
            critical_threshold: 70.0,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            drop_high: 20,
            drop_critical: 40,
            badge_expiry_window_days: 30,
            dedup_window_hours: 6,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            postgres_url: "postgresql://localhost:5432/marketplace_trust".to_string(),
            postgres_enabled: false,
        }
    }
}

impl TrustConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults, and validate the result.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(days) = env::var("TRUST_REVIEW_DECAY_DAYS") {
            config.scoring.review_decay_days =
                days.parse().context("Invalid TRUST_REVIEW_DECAY_DAYS value")?;
        }

        if let Ok(threshold) = env::var("TRUST_RISK_DISPUTE_RATE_THRESHOLD") {
            config.risk.dispute_rate_threshold = threshold
                .parse()
                .context("Invalid TRUST_RISK_DISPUTE_RATE_THRESHOLD value")?;
        }

        if let Ok(threshold) = env::var("TRUST_RISK_MEDIUM_THRESHOLD") {
            config.risk.medium_threshold = threshold
                .parse()
                .context("Invalid TRUST_RISK_MEDIUM_THRESHOLD value")?;
        }

        if let Ok(threshold) = env::var("TRUST_RISK_HIGH_THRESHOLD") {
            config.risk.high_threshold = threshold
                .parse()
                .context("Invalid TRUST_RISK_HIGH_THRESHOLD value")?;
        }

        if let Ok(threshold) = env::var("TRUST_RISK_CRITICAL_THRESHOLD") {
            config.risk.critical_threshold = threshold
                .parse()
                .context("Invalid TRUST_RISK_CRITICAL_THRESHOLD value")?;
        }

        if let Ok(drop) = env::var("TRUST_ALERT_DROP_HIGH") {
            config.alerts.drop_high = drop.parse().context("Invalid TRUST_ALERT_DROP_HIGH value")?;
        }

        if let Ok(drop) = env::var("TRUST_ALERT_DROP_CRITICAL") {
            config.alerts.drop_critical = drop
                .parse()
                .context("Invalid TRUST_ALERT_DROP_CRITICAL value")?;
        }

        if let Ok(days) = env::var("TRUST_ALERT_BADGE_EXPIRY_WINDOW_DAYS") {
            config.alerts.badge_expiry_window_days = days
                .parse()
                .context("Invalid TRUST_ALERT_BADGE_EXPIRY_WINDOW_DAYS value")?;
        }

        if let Ok(hours) = env::var("TRUST_ALERT_DEDUP_WINDOW_HOURS") {
            config.alerts.dedup_window_hours = hours
                .parse()
                .context("Invalid TRUST_ALERT_DEDUP_WINDOW_HOURS value")?;
        }

        if let Ok(level) = env::var("TRUST_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(url) = env::var("TRUST_POSTGRES_URL") {
            config.database.postgres_url = url;
        }

        if let Ok(enabled) = env::var("TRUST_POSTGRES_ENABLED") {
            config.database.postgres_enabled = enabled
                .parse()
                .context("Invalid TRUST_POSTGRES_ENABLED value")?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<()> {
        if self.scoring.review_decay_days <= 0.0 {
            return Err(anyhow::anyhow!(
                "Review decay must be a positive number of days"
            ));
        }

        if self.risk.dispute_rate_threshold < 0.0 {
            return Err(anyhow::anyhow!("Dispute rate threshold cannot be negative"));
        }

        if !(self.risk.medium_threshold < self.risk.high_threshold
            && self.risk.high_threshold < self.risk.critical_threshold)
        {
            return Err(anyhow::anyhow!(
                "Risk thresholds must be strictly increasing (medium < high < critical)"
            ));
        }

        if self.alerts.drop_high <= 0 {
            return Err(anyhow::anyhow!("Alert drop threshold must be positive"));
        }

        if self.alerts.drop_critical < self.alerts.drop_high {
            return Err(anyhow::anyhow!(
                "Critical drop threshold must be at least the high threshold"
            ));
        }

        if self.alerts.dedup_window_hours < 0 {
            return Err(anyhow::anyhow!("Alert dedup window cannot be negative"));
        }

        if self.database.postgres_enabled && self.database.postgres_url.is_empty() {
            return Err(anyhow::anyhow!(
                "PostgreSQL is enabled but no connection string is configured"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TrustConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_risk_thresholds_rejected() {
        let mut config = TrustConfig::default();
        config.risk.high_threshold = 80.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_critical_drop_below_high_rejected() {
        let mut config = TrustConfig::default();
        config.alerts.drop_critical = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_decay_rejected() {
        let mut config = TrustConfig::default();
        config.scoring.review_decay_days = 0.0;
        assert!(config.validate().is_err());
    }
}
