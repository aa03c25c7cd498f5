//! PostgreSQL store - durable persistence for the trust engine.
//!
//! All tables live in the `trust` schema and are created on demand by
//! `init_schema`. Enum-valued columns are stored as their canonical
//! string forms; risk factor lists are stored as JSONB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::info;

use crate::error::StoreError;
use crate::store::TrustStore;
use crate::trust::{
    ActivitySnapshot, AlertSeverity, AlertType, BadgeKind, BadgeStatus, ChangeType, Endorsement,
    MetricKind, OrderOutcome, OrderRecord, ProfileDetails, ProfileStrength, ReputationChange,
    ReviewRecord, RiskAssessment, RiskLevel, RiskSignals, SocialSnapshot, TrustAlert, TrustLevel,
    TrustMetric, TrustProfile, VerificationBadge,
};

pub struct PostgresStore {
    pool: PgPool,
}

fn parse_level(s: &str) -> Result<TrustLevel, StoreError> {
    TrustLevel::parse(s).ok_or_else(|| StoreError::Backend(format!("unknown trust level: {s}")))
}

fn parse_strength(s: &str) -> Result<ProfileStrength, StoreError> {
    ProfileStrength::parse(s)
        .ok_or_else(|| StoreError::Backend(format!("unknown profile strength: {s}")))
}

fn parse_metric_kind(s: &str) -> Result<MetricKind, StoreError> {
    MetricKind::parse(s).ok_or_else(|| StoreError::Backend(format!("unknown metric kind: {s}")))
}

fn parse_badge_kind(s: &str) -> Result<BadgeKind, StoreError> {
    BadgeKind::parse(s).ok_or_else(|| StoreError::Backend(format!("unknown badge kind: {s}")))
}

fn parse_badge_status(s: &str) -> Result<BadgeStatus, StoreError> {
    BadgeStatus::parse(s).ok_or_else(|| StoreError::Backend(format!("unknown badge status: {s}")))
}

fn parse_change_type(s: &str) -> Result<ChangeType, StoreError> {
    ChangeType::parse(s).ok_or_else(|| StoreError::Backend(format!("unknown change type: {s}")))
}

fn parse_alert_type(s: &str) -> Result<AlertType, StoreError> {
    AlertType::parse(s).ok_or_else(|| StoreError::Backend(format!("unknown alert type: {s}")))
}

fn parse_severity(s: &str) -> Result<AlertSeverity, StoreError> {
    AlertSeverity::parse(s)
        .ok_or_else(|| StoreError::Backend(format!("unknown alert severity: {s}")))
}

fn parse_risk_level(s: &str) -> Result<RiskLevel, StoreError> {
    RiskLevel::parse(s).ok_or_else(|| StoreError::Backend(format!("unknown risk level: {s}")))
}

fn profile_from_row(row: &sqlx::postgres::PgRow) -> Result<TrustProfile, StoreError> {
    let level: String = row.get("trust_level");
    let strength: String = row.get("profile_strength");
    Ok(TrustProfile {
        user_id: row.get("user_id"),
        trust_score: row.get("trust_score"),
        trust_level: parse_level(&level)?,
        reputation_score: row.get("reputation_score"),
        reliability_score: row.get("reliability_score"),
        activity_score: row.get("activity_score"),
        social_score: row.get("social_score"),
        profile_strength: parse_strength(&strength)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn endorsement_from_row(row: &sqlx::postgres::PgRow) -> Endorsement {
    let rating: i16 = row.get("rating");
    Endorsement {
        id: row.get("id"),
        endorser_id: row.get("endorser_id"),
        endorsee_id: row.get("endorsee_id"),
        category: row.get("category"),
        rating: rating as u8,
        comment: row.get("comment"),
        weight: row.get("weight"),
        is_verified: row.get("is_verified"),
        created_at: row.get("created_at"),
    }
}

fn change_from_row(row: &sqlx::postgres::PgRow) -> Result<ReputationChange, StoreError> {
    let change_type: String = row.get("change_type");
    Ok(ReputationChange {
        id: row.get("id"),
        user_id: row.get("user_id"),
        change_type: parse_change_type(&change_type)?,
        previous_score: row.get("previous_score"),
        new_score: row.get("new_score"),
        delta: row.get("delta"),
        reason: row.get("reason"),
        triggered_by: row.get("triggered_by"),
        created_at: row.get("created_at"),
    })
}

fn assessment_from_row(row: &sqlx::postgres::PgRow) -> Result<RiskAssessment, StoreError> {
    let risk: String = row.get("overall_risk");
    let factors: serde_json::Value = row.get("factors");
    let recommendations: serde_json::Value = row.get("recommendations");
    Ok(RiskAssessment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        overall_risk: parse_risk_level(&risk)?,
        risk_score: row.get("risk_score"),
        factors: serde_json::from_value(factors)?,
        recommendations: serde_json::from_value(recommendations)?,
        assessed_at: row.get("assessed_at"),
    })
}

fn alert_from_row(row: &sqlx::postgres::PgRow) -> Result<TrustAlert, StoreError> {
    let alert_type: String = row.get("alert_type");
    let severity: String = row.get("severity");
    Ok(TrustAlert {
        id: row.get("id"),
        user_id: row.get("user_id"),
        alert_type: parse_alert_type(&alert_type)?,
        severity: parse_severity(&severity)?,
        message: row.get("message"),
        is_resolved: row.get("is_resolved"),
        created_at: row.get("created_at"),
        resolved_at: row.get("resolved_at"),
        resolved_by: row.get("resolved_by"),
    })
}

fn review_from_row(row: &sqlx::postgres::PgRow) -> ReviewRecord {
    let rating: i16 = row.get("rating");
    ReviewRecord {
        review_id: row.get("review_id"),
        author_id: row.get("author_id"),
        subject_id: row.get("subject_id"),
        rating: rating as u8,
        verified_purchase: row.get("verified_purchase"),
        created_at: row.get("created_at"),
    }
}

fn order_from_row(row: &sqlx::postgres::PgRow) -> Result<OrderRecord, StoreError> {
    let outcome: String = row.get("outcome");
    let on_time: Option<bool> = row.get("on_time");
    let outcome = match outcome.as_str() {
        "delivered" => OrderOutcome::Delivered {
            on_time: on_time.unwrap_or(false),
        },
        "cancelled" => OrderOutcome::Cancelled,
        other => {
            return Err(StoreError::Backend(format!("unknown order outcome: {other}")));
        }
    };
    Ok(OrderRecord {
        order_id: row.get("order_id"),
        user_id: row.get("user_id"),
        outcome,
        created_at: row.get("created_at"),
    })
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self { pool })
    }

    /// Initialize the trust schema and tables.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        info!("Initializing trust schema...");

        sqlx::query("CREATE SCHEMA IF NOT EXISTS trust")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.profiles (
                user_id VARCHAR(255) PRIMARY KEY,
                trust_score INTEGER NOT NULL,
                trust_level VARCHAR(20) NOT NULL,
                reputation_score INTEGER NOT NULL,
                reliability_score INTEGER NOT NULL,
                activity_score INTEGER NOT NULL,
                social_score INTEGER NOT NULL,
                profile_strength VARCHAR(20) NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL,
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.metrics (
                user_id VARCHAR(255) NOT NULL,
                kind VARCHAR(50) NOT NULL,
                value DOUBLE PRECISION NOT NULL,
                max_value DOUBLE PRECISION NOT NULL,
                weight DOUBLE PRECISION NOT NULL,
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL,
                PRIMARY KEY (user_id, kind)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.badges (
                user_id VARCHAR(255) NOT NULL,
                kind VARCHAR(30) NOT NULL,
                status VARCHAR(20) NOT NULL,
                verified_at TIMESTAMP WITH TIME ZONE NOT NULL,
                expires_at TIMESTAMP WITH TIME ZONE,
                PRIMARY KEY (user_id, kind)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.endorsements (
                id VARCHAR(255) PRIMARY KEY,
                endorser_id VARCHAR(255) NOT NULL,
                endorsee_id VARCHAR(255) NOT NULL,
                category VARCHAR(100) NOT NULL,
                rating SMALLINT NOT NULL,
                comment TEXT,
                weight DOUBLE PRECISION NOT NULL,
                is_verified BOOLEAN NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.reputation_changes (
                id VARCHAR(255) PRIMARY KEY,
                user_id VARCHAR(255) NOT NULL,
                change_type VARCHAR(30) NOT NULL,
                previous_score INTEGER NOT NULL,
                new_score INTEGER NOT NULL,
                delta INTEGER NOT NULL,
                reason TEXT NOT NULL,
                triggered_by VARCHAR(255) NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.risk_assessments (
                user_id VARCHAR(255) PRIMARY KEY,
                id VARCHAR(255) NOT NULL,
                overall_risk VARCHAR(10) NOT NULL,
                risk_score DOUBLE PRECISION NOT NULL,
                factors JSONB NOT NULL,
                recommendations JSONB NOT NULL,
                assessed_at TIMESTAMP WITH TIME ZONE NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.alerts (
                id VARCHAR(255) PRIMARY KEY,
                user_id VARCHAR(255) NOT NULL,
                alert_type VARCHAR(50) NOT NULL,
                severity VARCHAR(10) NOT NULL,
                message TEXT NOT NULL,
                is_resolved BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL,
                resolved_at TIMESTAMP WITH TIME ZONE,
                resolved_by VARCHAR(255)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.reviews (
                review_id VARCHAR(255) PRIMARY KEY,
                author_id VARCHAR(255) NOT NULL,
                subject_id VARCHAR(255) NOT NULL,
                rating SMALLINT NOT NULL,
                verified_purchase BOOLEAN NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.orders (
                order_id VARCHAR(255) PRIMARY KEY,
                user_id VARCHAR(255) NOT NULL,
                outcome VARCHAR(20) NOT NULL,
                on_time BOOLEAN,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.activity (
                user_id VARCHAR(255) PRIMARY KEY,
                logins_30d INTEGER NOT NULL DEFAULT 0,
                orders_30d INTEGER NOT NULL DEFAULT 0,
                messages_30d INTEGER NOT NULL DEFAULT 0
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.social (
                user_id VARCHAR(255) PRIMARY KEY,
                connections INTEGER NOT NULL DEFAULT 0,
                posts INTEGER NOT NULL DEFAULT 0
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.risk_signals (
                user_id VARCHAR(255) PRIMARY KEY,
                shared_contact_accounts INTEGER NOT NULL DEFAULT 0,
                dispute_count INTEGER NOT NULL DEFAULT 0,
                violation_count INTEGER NOT NULL DEFAULT 0
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trust.profile_details (
                user_id VARCHAR(255) PRIMARY KEY,
                first_name TEXT,
                last_name TEXT,
                email TEXT,
                phone TEXT,
                bio TEXT,
                avatar_url TEXT
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_endorsements_endorsee ON trust.endorsements(endorsee_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_changes_user ON trust.reputation_changes(user_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_alerts_user ON trust.alerts(user_id, is_resolved)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_reviews_subject ON trust.reviews(subject_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_author ON trust.reviews(author_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_user ON trust.orders(user_id)")
            .execute(&self.pool)
            .await?;

        info!("Trust schema initialized");
        Ok(())
    }

    /// Replace the platform-fed activity counters for a user.
    pub async fn upsert_activity(
        &self,
        user_id: &str,
        snapshot: &ActivitySnapshot,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.activity (user_id, logins_30d, orders_30d, messages_30d)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                logins_30d = EXCLUDED.logins_30d,
                orders_30d = EXCLUDED.orders_30d,
                messages_30d = EXCLUDED.messages_30d
        "#,
        )
        .bind(user_id)
        .bind(snapshot.logins_30d as i32)
        .bind(snapshot.orders_30d as i32)
        .bind(snapshot.messages_30d as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Replace the community-fed social counters for a user.
    pub async fn upsert_social(
        &self,
        user_id: &str,
        snapshot: &SocialSnapshot,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.social (user_id, connections, posts)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                connections = EXCLUDED.connections,
                posts = EXCLUDED.posts
        "#,
        )
        .bind(user_id)
        .bind(snapshot.connections as i32)
        .bind(snapshot.posts as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Replace the identity-fed risk signals for a user. The per-user
    /// order count is always derived from the orders ledger, not stored.
    pub async fn upsert_risk_signals(
        &self,
        user_id: &str,
        signals: &RiskSignals,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.risk_signals (user_id, shared_contact_accounts, dispute_count, violation_count)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                shared_contact_accounts = EXCLUDED.shared_contact_accounts,
                dispute_count = EXCLUDED.dispute_count,
                violation_count = EXCLUDED.violation_count
        "#,
        )
        .bind(user_id)
        .bind(signals.shared_contact_accounts as i32)
        .bind(signals.dispute_count as i32)
        .bind(signals.violation_count as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_profile_details(
        &self,
        user_id: &str,
        details: &ProfileDetails,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.profile_details (user_id, first_name, last_name, email, phone, bio, avatar_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                bio = EXCLUDED.bio,
                avatar_url = EXCLUDED.avatar_url
        "#,
        )
        .bind(user_id)
        .bind(&details.first_name)
        .bind(&details.last_name)
        .bind(&details.email)
        .bind(&details.phone)
        .bind(&details.bio)
        .bind(&details.avatar_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TrustStore for PostgresStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<TrustProfile>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, trust_score, trust_level, reputation_score, reliability_score,
                   activity_score, social_score, profile_strength, created_at, updated_at
            FROM trust.profiles
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| profile_from_row(&row)).transpose()
    }

    async fn put_profile(&self, profile: &TrustProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.profiles
                (user_id, trust_score, trust_level, reputation_score, reliability_score,
                 activity_score, social_score, profile_strength, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id) DO UPDATE SET
                trust_score = EXCLUDED.trust_score,
                trust_level = EXCLUDED.trust_level,
                reputation_score = EXCLUDED.reputation_score,
                reliability_score = EXCLUDED.reliability_score,
                activity_score = EXCLUDED.activity_score,
                social_score = EXCLUDED.social_score,
                profile_strength = EXCLUDED.profile_strength,
                updated_at = EXCLUDED.updated_at
        "#,
        )
        .bind(&profile.user_id)
        .bind(profile.trust_score)
        .bind(profile.trust_level.as_str())
        .bind(profile.reputation_score)
        .bind(profile.reliability_score)
        .bind(profile.activity_score)
        .bind(profile.social_score)
        .bind(profile.profile_strength.as_str())
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn all_profiles(&self) -> Result<Vec<TrustProfile>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, trust_score, trust_level, reputation_score, reliability_score,
                   activity_score, social_score, profile_strength, created_at, updated_at
            FROM trust.profiles
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn metrics_for_user(&self, user_id: &str) -> Result<Vec<TrustMetric>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, kind, value, max_value, weight, updated_at
            FROM trust.metrics
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut metrics = Vec::with_capacity(rows.len());
        for row in rows {
            let kind: String = row.get("kind");
            metrics.push(TrustMetric {
                user_id: row.get("user_id"),
                kind: parse_metric_kind(&kind)?,
                value: row.get("value"),
                max_value: row.get("max_value"),
                weight: row.get("weight"),
                updated_at: row.get("updated_at"),
            });
        }
        Ok(metrics)
    }

    async fn upsert_metric(&self, metric: &TrustMetric) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.metrics (user_id, kind, value, max_value, weight, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, kind) DO UPDATE SET
                value = EXCLUDED.value,
                max_value = EXCLUDED.max_value,
                weight = EXCLUDED.weight,
                updated_at = EXCLUDED.updated_at
        "#,
        )
        .bind(&metric.user_id)
        .bind(metric.kind.as_str())
        .bind(metric.value)
        .bind(metric.max_value)
        .bind(metric.weight)
        .bind(metric.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<VerificationBadge>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, kind, status, verified_at, expires_at
            FROM trust.badges
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut badges = Vec::with_capacity(rows.len());
        for row in rows {
            let kind: String = row.get("kind");
            let status: String = row.get("status");
            badges.push(VerificationBadge {
                user_id: row.get("user_id"),
                kind: parse_badge_kind(&kind)?,
                status: parse_badge_status(&status)?,
                verified_at: row.get("verified_at"),
                expires_at: row.get("expires_at"),
            });
        }
        Ok(badges)
    }

    async fn upsert_badge(&self, badge: &VerificationBadge) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.badges (user_id, kind, status, verified_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, kind) DO UPDATE SET
                status = EXCLUDED.status,
                verified_at = EXCLUDED.verified_at,
                expires_at = EXCLUDED.expires_at
        "#,
        )
        .bind(&badge.user_id)
        .bind(badge.kind.as_str())
        .bind(badge.status.as_str())
        .bind(badge.verified_at)
        .bind(badge.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_endorsement(&self, endorsement: &Endorsement) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.endorsements
                (id, endorser_id, endorsee_id, category, rating, comment, weight, is_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
        )
        .bind(&endorsement.id)
        .bind(&endorsement.endorser_id)
        .bind(&endorsement.endorsee_id)
        .bind(&endorsement.category)
        .bind(endorsement.rating as i16)
        .bind(&endorsement.comment)
        .bind(endorsement.weight)
        .bind(endorsement.is_verified)
        .bind(endorsement.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn endorsements_for_user(
        &self,
        endorsee_id: &str,
    ) -> Result<Vec<Endorsement>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, endorser_id, endorsee_id, category, rating, comment, weight, is_verified, created_at
            FROM trust.endorsements
            WHERE endorsee_id = $1
        "#,
        )
        .bind(endorsee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(endorsement_from_row).collect())
    }

    async fn insert_change(&self, change: &ReputationChange) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.reputation_changes
                (id, user_id, change_type, previous_score, new_score, delta, reason, triggered_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
        )
        .bind(&change.id)
        .bind(&change.user_id)
        .bind(change.change_type.as_str())
        .bind(change.previous_score)
        .bind(change.new_score)
        .bind(change.delta)
        .bind(&change.reason)
        .bind(&change.triggered_by)
        .bind(change.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn changes_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ReputationChange>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, change_type, previous_score, new_score, delta, reason, triggered_by, created_at
            FROM trust.reputation_changes
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
        "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(change_from_row).collect()
    }

    async fn put_assessment(&self, assessment: &RiskAssessment) -> Result<(), StoreError> {
        let factors = serde_json::to_value(&assessment.factors)?;
        let recommendations = serde_json::to_value(&assessment.recommendations)?;

        sqlx::query(
            r#"
            INSERT INTO trust.risk_assessments
                (user_id, id, overall_risk, risk_score, factors, recommendations, assessed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                id = EXCLUDED.id,
                overall_risk = EXCLUDED.overall_risk,
                risk_score = EXCLUDED.risk_score,
                factors = EXCLUDED.factors,
                recommendations = EXCLUDED.recommendations,
                assessed_at = EXCLUDED.assessed_at
        "#,
        )
        .bind(&assessment.user_id)
        .bind(&assessment.id)
        .bind(assessment.overall_risk.as_str())
        .bind(assessment.risk_score)
        .bind(factors)
        .bind(recommendations)
        .bind(assessment.assessed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_assessment(
        &self,
        user_id: &str,
    ) -> Result<Option<RiskAssessment>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, id, overall_risk, risk_score, factors, recommendations, assessed_at
            FROM trust.risk_assessments
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| assessment_from_row(&row)).transpose()
    }

    async fn all_assessments(&self) -> Result<Vec<RiskAssessment>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, id, overall_risk, risk_score, factors, recommendations, assessed_at
            FROM trust.risk_assessments
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(assessment_from_row).collect()
    }

    async fn insert_alert(&self, alert: &TrustAlert) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.alerts
                (id, user_id, alert_type, severity, message, is_resolved, created_at, resolved_at, resolved_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
        )
        .bind(&alert.id)
        .bind(&alert.user_id)
        .bind(alert.alert_type.as_str())
        .bind(alert.severity.as_str())
        .bind(&alert.message)
        .bind(alert.is_resolved)
        .bind(alert.created_at)
        .bind(alert.resolved_at)
        .bind(&alert.resolved_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_alert(&self, alert_id: &str) -> Result<Option<TrustAlert>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, alert_type, severity, message, is_resolved, created_at, resolved_at, resolved_by
            FROM trust.alerts
            WHERE id = $1
        "#,
        )
        .bind(alert_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| alert_from_row(&row)).transpose()
    }

    async fn update_alert(&self, alert: &TrustAlert) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE trust.alerts
            SET is_resolved = $2, resolved_at = $3, resolved_by = $4
            WHERE id = $1
        "#,
        )
        .bind(&alert.id)
        .bind(alert.is_resolved)
        .bind(alert.resolved_at)
        .bind(&alert.resolved_by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("alert {}", alert.id)));
        }
        Ok(())
    }

    async fn alerts_for_user(&self, user_id: &str) -> Result<Vec<TrustAlert>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, alert_type, severity, message, is_resolved, created_at, resolved_at, resolved_by
            FROM trust.alerts
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(alert_from_row).collect()
    }

    async fn unresolved_alerts(&self) -> Result<Vec<TrustAlert>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, alert_type, severity, message, is_resolved, created_at, resolved_at, resolved_by
            FROM trust.alerts
            WHERE is_resolved = FALSE
        "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(alert_from_row).collect()
    }

    async fn insert_review(&self, review: &ReviewRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.reviews (review_id, author_id, subject_id, rating, verified_purchase, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#,
        )
        .bind(&review.review_id)
        .bind(&review.author_id)
        .bind(&review.subject_id)
        .bind(review.rating as i16)
        .bind(review.verified_purchase)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_review(&self, review_id: &str) -> Result<Option<ReviewRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT review_id, author_id, subject_id, rating, verified_purchase, created_at
            FROM trust.reviews
            WHERE review_id = $1
        "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| review_from_row(&row)))
    }

    async fn reviews_for_subject(&self, subject_id: &str) -> Result<Vec<ReviewRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT review_id, author_id, subject_id, rating, verified_purchase, created_at
            FROM trust.reviews
            WHERE subject_id = $1
        "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    async fn reviews_by_author(&self, author_id: &str) -> Result<Vec<ReviewRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT review_id, author_id, subject_id, rating, verified_purchase, created_at
            FROM trust.reviews
            WHERE author_id = $1
        "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    async fn insert_order(&self, order: &OrderRecord) -> Result<(), StoreError> {
        let (outcome, on_time) = match order.outcome {
            OrderOutcome::Delivered { on_time } => ("delivered", Some(on_time)),
            OrderOutcome::Cancelled => ("cancelled", None),
        };

        sqlx::query(
            r#"
            INSERT INTO trust.orders (order_id, user_id, outcome, on_time, created_at)
            VALUES ($1, $2, $3, $4, $5)
        "#,
        )
        .bind(&order.order_id)
        .bind(&order.user_id)
        .bind(outcome)
        .bind(on_time)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn orders_for_user(&self, user_id: &str) -> Result<Vec<OrderRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, user_id, outcome, on_time, created_at
            FROM trust.orders
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn activity_for_user(&self, user_id: &str) -> Result<ActivitySnapshot, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT logins_30d, orders_30d, messages_30d
            FROM trust.activity
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|row| ActivitySnapshot {
                logins_30d: row.get::<i32, _>("logins_30d") as u32,
                orders_30d: row.get::<i32, _>("orders_30d") as u32,
                messages_30d: row.get::<i32, _>("messages_30d") as u32,
            })
            .unwrap_or_default())
    }

    async fn social_for_user(&self, user_id: &str) -> Result<SocialSnapshot, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT connections, posts
            FROM trust.social
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|row| SocialSnapshot {
                connections: row.get::<i32, _>("connections") as u32,
                posts: row.get::<i32, _>("posts") as u32,
            })
            .unwrap_or_default())
    }

    async fn risk_signals_for_user(&self, user_id: &str) -> Result<RiskSignals, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT shared_contact_accounts, dispute_count, violation_count
            FROM trust.risk_signals
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let order_count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM trust.orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?
            .get("n");

        let mut signals = row
            .map(|row| RiskSignals {
                shared_contact_accounts: row.get::<i32, _>("shared_contact_accounts") as u32,
                dispute_count: row.get::<i32, _>("dispute_count") as u32,
                violation_count: row.get::<i32, _>("violation_count") as u32,
                order_count: 0,
            })
            .unwrap_or_default();
        signals.order_count = order_count as u32;
        Ok(signals)
    }

    async fn profile_details(&self, user_id: &str) -> Result<Option<ProfileDetails>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT first_name, last_name, email, phone, bio, avatar_url
            FROM trust.profile_details
            WHERE user_id = $1
        "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ProfileDetails {
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            phone: row.get("phone"),
            bio: row.get("bio"),
            avatar_url: row.get("avatar_url"),
        }))
    }

    async fn record_dispute(&self, user_id: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.risk_signals (user_id, dispute_count)
            VALUES ($1, 1)
            ON CONFLICT (user_id) DO UPDATE SET
                dispute_count = trust.risk_signals.dispute_count + 1
        "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_violation(&self, user_id: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trust.risk_signals (user_id, violation_count)
            VALUES ($1, 1)
            ON CONFLICT (user_id) DO UPDATE SET
                violation_count = trust.risk_signals.violation_count + 1
        "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
