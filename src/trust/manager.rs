//! Trust profile orchestrator.
//!
//! Composes the aggregator, classifier, risk assessor, authenticity
//! verifier, and alert monitor over a `TrustStore`. Profile recomputation
//! runs inside a per-user critical section so the alert monitor always
//! diffs against the score immediately preceding its own write; the
//! scoring itself is pure over committed records, so last-writer-wins is
//! acceptable across concurrent recomputations.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::TrustConfig;
use crate::error::{StoreError, TrustError};
use crate::store::TrustStore;
use crate::trust::alerts::{AlertMonitor, TrustAlert};
use crate::trust::authenticity::{AuthenticityVerifier, ReviewAuthenticity};
use crate::trust::endorsement::{build_endorsement, EndorsementRequest};
use crate::trust::level::{calculate_profile_strength, determine_trust_level};
use crate::trust::profile::{
    BadgeKind, ChangeType, Endorsement, MetricKind, OrderOutcome, OrderRecord, ReputationChange,
    ReviewRecord, TrustLevel, TrustMetric, TrustProfile, VerificationBadge,
};
use crate::trust::report::{EndorsementSummary, PlatformTrustReport, UserTrustReport};
use crate::trust::risk::{RiskAssessment, RiskAssessor};
use crate::trust::scoring::ScoreAggregator;

/// Fixed (max_value, weight) shape of the six base metrics seeded at
/// profile initialization and refreshed from order/review signals.
const BASE_METRICS: [(MetricKind, f64, f64); 6] = [
    (MetricKind::TransactionCount, 100.0, 1.0),
    (MetricKind::SuccessfulTransactions, 100.0, 1.5),
    (MetricKind::DisputeRate, 100.0, -2.0),
    (MetricKind::ResponseTimeHours, 48.0, -0.5),
    (MetricKind::CompletionRate, 100.0, 2.0),
    (MetricKind::CustomerSatisfaction, 5.0, 2.5),
];

/// How many audit records a user report includes.
const REPORT_CHANGE_LIMIT: usize = 20;

/// External events that trigger trust recomputation.
#[derive(Debug, Clone)]
pub enum TrustEvent {
    OrderCompleted {
        user_id: String,
        on_time: bool,
    },
    OrderCancelled {
        user_id: String,
    },
    ReviewPosted {
        review: ReviewRecord,
    },
    BadgeVerified {
        user_id: String,
        kind: BadgeKind,
        expires_at: Option<chrono::DateTime<Utc>>,
    },
    EndorsementSubmitted {
        endorser_id: String,
        request: EndorsementRequest,
    },
    UserReported {
        reported_user_id: String,
    },
    PolicyViolationRecorded {
        user_id: String,
    },
}

/// Main trust orchestrator.
pub struct TrustManager {
    store: Arc<dyn TrustStore>,
    aggregator: ScoreAggregator,
    risk: RiskAssessor,
    authenticity: AuthenticityVerifier,
    alerts: AlertMonitor,

    /// Per-user critical sections for read-recompute-write sequences.
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TrustManager {
    pub fn new(store: Arc<dyn TrustStore>, config: TrustConfig) -> Self {
        Self {
            store,
            aggregator: ScoreAggregator::new(config.scoring),
            risk: RiskAssessor::new(config.risk),
            authenticity: AuthenticityVerifier::new(),
            alerts: AlertMonitor::new(config.alerts),
            user_locks: DashMap::new(),
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Create the default profile and seed the base metrics. Idempotent:
    /// if a profile already exists this delegates to a recomputation.
    pub async fn initialize_trust_profile(
        &self,
        user_id: &str,
    ) -> Result<TrustProfile, TrustError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        if self.store.get_profile(user_id).await?.is_some() {
            return self.update_locked(user_id, "re-initialization").await;
        }

        for (kind, max_value, weight) in BASE_METRICS {
            let metric = TrustMetric::new(user_id, kind, 0.0, max_value, weight);
            self.store.upsert_metric(&metric).await?;
        }

        let profile = TrustProfile::new(user_id);
        self.store.put_profile(&profile).await?;

        let change = ReputationChange::new(
            user_id,
            ChangeType::Initialization,
            profile.trust_score,
            profile.trust_score,
            "trust profile created",
            "initialization",
        );
        self.store.insert_change(&change).await?;

        info!(user_id = %user_id, "Trust profile initialized");
        Ok(profile)
    }

    /// Recompute all sub-scores, classify, persist, and run the alert
    /// monitor. Safe to invoke repeatedly; the event-driven reaction to
    /// every mutating event.
    pub async fn update_trust_profile(&self, user_id: &str) -> Result<TrustProfile, TrustError> {
        self.update_with_trigger(user_id, "recomputation").await
    }

    async fn update_with_trigger(
        &self,
        user_id: &str,
        triggered_by: &str,
    ) -> Result<TrustProfile, TrustError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;
        self.update_locked(user_id, triggered_by).await
    }

    /// Body of a profile update. Caller must hold the user's lock.
    async fn update_locked(
        &self,
        user_id: &str,
        triggered_by: &str,
    ) -> Result<TrustProfile, TrustError> {
        let now = Utc::now();
        let previous = self
            .store
            .get_profile(user_id)
            .await?
            .unwrap_or_else(|| TrustProfile::new(user_id));
        let previous_score = previous.trust_score;

        // Each input fetch fails soft: a transient storage error on one
        // signal must not abort the whole update (or the business event
        // that triggered it).
        let metrics = self.soft(user_id, "metrics", self.store.metrics_for_user(user_id).await);
        let badges = self.soft(user_id, "badges", self.store.badges_for_user(user_id).await);
        let reviews = self.soft(
            user_id,
            "reviews",
            self.store.reviews_for_subject(user_id).await,
        );
        let orders = self.soft(user_id, "orders", self.store.orders_for_user(user_id).await);
        let activity = self.soft(
            user_id,
            "activity",
            self.store.activity_for_user(user_id).await,
        );
        let endorsements = self.soft(
            user_id,
            "endorsements",
            self.store.endorsements_for_user(user_id).await,
        );
        let social = self.soft(user_id, "social", self.store.social_for_user(user_id).await);
        let details = self.soft(
            user_id,
            "profile details",
            self.store.profile_details(user_id).await,
        );

        let trust_score = self.aggregator.calculate_trust_score(&metrics, &badges, now);
        let reputation_score = self.aggregator.calculate_reputation_score(&reviews, now);
        let reliability_score = self.aggregator.calculate_reliability_score(&orders);
        let activity_score = self.aggregator.calculate_activity_score(&activity);
        let social_score = self
            .aggregator
            .calculate_social_score(&endorsements, &social);

        // Administrative overrides survive recomputation; only the
        // score-derived levels move with the score.
        let trust_level = if previous.trust_level.is_override() {
            previous.trust_level
        } else {
            determine_trust_level(trust_score)
        };
        let profile_strength = calculate_profile_strength(details.as_ref(), &badges, now);

        let profile = TrustProfile {
            user_id: user_id.to_string(),
            trust_score,
            trust_level,
            reputation_score,
            reliability_score,
            activity_score,
            social_score,
            profile_strength,
            created_at: previous.created_at,
            updated_at: now,
        };

        // Persist failures propagate: silently dropping a score update
        // would break the audit trail.
        self.store.put_profile(&profile).await?;

        if trust_score != previous_score {
            let change = ReputationChange::new(
                user_id,
                ChangeType::Recalculation,
                previous_score,
                trust_score,
                "trust score recomputed",
                triggered_by,
            );
            self.store.insert_change(&change).await?;
        }

        // The seeded default score is not an observed trust level; the
        // first recomputation after initialization establishes the baseline
        // instead of alerting on the distance from it. A profile that has
        // never been recomputed still carries its creation timestamp as
        // updated_at.
        let drop_baseline = if previous.updated_at == previous.created_at {
            trust_score
        } else {
            previous_score
        };
        self.run_alert_checks(user_id, drop_baseline, trust_score, &badges)
            .await;

        debug!(
            user_id = %user_id,
            trust_score,
            level = trust_level.as_str(),
            triggered_by = %triggered_by,
            "Trust profile updated"
        );

        Ok(profile)
    }

    /// Alert monitoring is non-fatal; failures are retried implicitly on
    /// the next recomputation.
    async fn run_alert_checks(
        &self,
        user_id: &str,
        previous_score: i32,
        new_score: i32,
        badges: &[VerificationBadge],
    ) {
        let existing = match self.store.alerts_for_user(user_id).await {
            Ok(alerts) => alerts,
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "Skipping alert checks: alert history unavailable");
                return;
            }
        };

        let now = Utc::now();
        for alert in self
            .alerts
            .check(user_id, previous_score, new_score, badges, &existing, now)
        {
            match self.store.insert_alert(&alert).await {
                Ok(()) => info!(
                    user_id = %user_id,
                    alert_type = alert.alert_type.as_str(),
                    severity = alert.severity.as_str(),
                    "Trust alert raised"
                ),
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "Failed to persist trust alert");
                }
            }
        }
    }

    pub async fn get_trust_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<TrustProfile>, TrustError> {
        Ok(self.store.get_profile(user_id).await?)
    }

    /// Record a verified badge and fold its bonus into the score.
    pub async fn award_verification_badge(
        &self,
        user_id: &str,
        kind: BadgeKind,
        expires_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<VerificationBadge, TrustError> {
        let badge = VerificationBadge::verified(user_id, kind, expires_at);
        self.store.upsert_badge(&badge).await?;
        info!(user_id = %user_id, badge = kind.as_str(), "Verification badge awarded");

        if let Err(err) = self.update_with_trigger(user_id, "badge verified").await {
            warn!(user_id = %user_id, error = %err, "Deferred profile update after badge award");
        }

        Ok(badge)
    }

    /// Submit an endorsement. The weight snapshot is taken from the
    /// endorser's committed profile at this instant and never re-derived.
    pub async fn add_endorsement(
        &self,
        endorser_id: &str,
        request: EndorsementRequest,
    ) -> Result<Endorsement, TrustError> {
        let endorser = self
            .store
            .get_profile(endorser_id)
            .await?
            .ok_or_else(|| {
                TrustError::Validation(format!("endorser {endorser_id} has no trust profile"))
            })?;

        let endorsement = build_endorsement(&endorser, request)?;
        self.store.insert_endorsement(&endorsement).await?;

        info!(
            endorser_id = %endorsement.endorser_id,
            endorsee_id = %endorsement.endorsee_id,
            weight = endorsement.weight,
            "Endorsement recorded"
        );

        // Affects the endorsee's social score.
        let endorsee_id = endorsement.endorsee_id.clone();
        if let Err(err) = self
            .update_with_trigger(&endorsee_id, "endorsement received")
            .await
        {
            warn!(user_id = %endorsee_id, error = %err, "Deferred profile update after endorsement");
        }

        Ok(endorsement)
    }

    /// Pattern-based authenticity check for a single review. Independent
    /// of the score-update path.
    pub async fn verify_review_authenticity(
        &self,
        review_id: &str,
    ) -> Result<ReviewAuthenticity, TrustError> {
        let review = self
            .store
            .get_review(review_id)
            .await?
            .ok_or_else(|| TrustError::Validation(format!("review {review_id} not found")))?;

        let author_reviews = self.store.reviews_by_author(&review.author_id).await?;
        let result = self
            .authenticity
            .verify(&review, &author_reviews, Utc::now());

        if !result.flags.is_empty() {
            info!(
                review_id = %review_id,
                author_id = %review.author_id,
                score = result.score,
                flags = result.flags.len(),
                "Review flagged by authenticity check"
            );
        }

        Ok(result)
    }

    /// Full risk evaluation; the stored assessment replaces any prior one.
    /// May run concurrently with score updates.
    pub async fn perform_risk_assessment(
        &self,
        user_id: &str,
    ) -> Result<RiskAssessment, TrustError> {
        let signals = self.store.risk_signals_for_user(user_id).await?;
        let assessment = self.risk.assess(user_id, &signals, Utc::now());
        self.store.put_assessment(&assessment).await?;

        info!(
            user_id = %user_id,
            risk = assessment.overall_risk.as_str(),
            score = assessment.risk_score,
            factors = assessment.factors.len(),
            "Risk assessment completed"
        );

        Ok(assessment)
    }

    /// Append an audit record for an externally observed score transition.
    pub async fn record_reputation_change(
        &self,
        user_id: &str,
        change_type: ChangeType,
        previous_score: i32,
        new_score: i32,
        reason: &str,
        triggered_by: &str,
    ) -> Result<ReputationChange, TrustError> {
        let change = ReputationChange::new(
            user_id,
            change_type,
            previous_score,
            new_score,
            reason,
            triggered_by,
        );
        self.store.insert_change(&change).await?;
        Ok(change)
    }

    /// Administrative suspension or ban. The override level survives all
    /// subsequent recomputations until explicitly lifted.
    pub async fn set_administrative_level(
        &self,
        user_id: &str,
        level: TrustLevel,
        reason: &str,
        actor: &str,
    ) -> Result<TrustProfile, TrustError> {
        if !level.is_override() {
            return Err(TrustError::Validation(format!(
                "{} is not an administrative level",
                level.as_str()
            )));
        }

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| TrustError::ProfileNotFound(user_id.to_string()))?;

        profile.trust_level = level;
        profile.updated_at = Utc::now();
        self.store.put_profile(&profile).await?;

        let change = ReputationChange::new(
            user_id,
            ChangeType::AdminOverride,
            profile.trust_score,
            profile.trust_score,
            reason,
            actor,
        );
        self.store.insert_change(&change).await?;

        info!(user_id = %user_id, level = level.as_str(), actor = %actor, "Administrative trust override applied");
        Ok(profile)
    }

    /// Lift an administrative override, restoring the score-derived level.
    pub async fn lift_administrative_override(
        &self,
        user_id: &str,
        reason: &str,
        actor: &str,
    ) -> Result<TrustProfile, TrustError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| TrustError::ProfileNotFound(user_id.to_string()))?;

        if !profile.trust_level.is_override() {
            return Err(TrustError::Validation(format!(
                "user {user_id} has no administrative override to lift"
            )));
        }

        let mut profile = profile;
        profile.trust_level = determine_trust_level(profile.trust_score);
        profile.updated_at = Utc::now();
        self.store.put_profile(&profile).await?;

        let change = ReputationChange::new(
            user_id,
            ChangeType::AdminOverride,
            profile.trust_score,
            profile.trust_score,
            reason,
            actor,
        );
        self.store.insert_change(&change).await?;

        info!(user_id = %user_id, level = profile.trust_level.as_str(), actor = %actor, "Administrative trust override lifted");
        Ok(profile)
    }

    /// Explicit operator resolution of an alert. Idempotent.
    pub async fn resolve_alert(
        &self,
        alert_id: &str,
        resolved_by: &str,
    ) -> Result<TrustAlert, TrustError> {
        let mut alert = self
            .store
            .get_alert(alert_id)
            .await?
            .ok_or_else(|| TrustError::Validation(format!("alert {alert_id} not found")))?;

        if !alert.is_resolved {
            alert.resolve(resolved_by, Utc::now());
            self.store.update_alert(&alert).await?;
            info!(alert_id = %alert_id, resolved_by = %resolved_by, "Trust alert resolved");
        }

        Ok(alert)
    }

    /// Ingest a business event: persist the underlying signal, refresh the
    /// derived metrics, and recompute the affected profile. The triggering
    /// event must never fail because trust scoring hit a transient error,
    /// so all failures are logged and deferred to the next recomputation.
    pub async fn handle_event(&self, event: TrustEvent) {
        match event {
            TrustEvent::OrderCompleted { user_id, on_time } => {
                let order = OrderRecord {
                    order_id: Uuid::new_v4().to_string(),
                    user_id: user_id.clone(),
                    outcome: OrderOutcome::Delivered { on_time },
                    created_at: Utc::now(),
                };
                if let Err(err) = self.store.insert_order(&order).await {
                    warn!(user_id = %user_id, error = %err, "Failed to record completed order signal");
                }
                self.react(&user_id, "order completed").await;
            }
            TrustEvent::OrderCancelled { user_id } => {
                let order = OrderRecord {
                    order_id: Uuid::new_v4().to_string(),
                    user_id: user_id.clone(),
                    outcome: OrderOutcome::Cancelled,
                    created_at: Utc::now(),
                };
                if let Err(err) = self.store.insert_order(&order).await {
                    warn!(user_id = %user_id, error = %err, "Failed to record cancelled order signal");
                }
                self.react(&user_id, "order cancelled").await;
            }
            TrustEvent::ReviewPosted { review } => {
                let subject_id = review.subject_id.clone();
                if let Err(err) = self.store.insert_review(&review).await {
                    warn!(user_id = %subject_id, error = %err, "Failed to record review signal");
                }
                self.react(&subject_id, "review posted").await;
            }
            TrustEvent::BadgeVerified {
                user_id,
                kind,
                expires_at,
            } => {
                if let Err(err) = self
                    .award_verification_badge(&user_id, kind, expires_at)
                    .await
                {
                    warn!(user_id = %user_id, error = %err, "Failed to award badge from event");
                }
            }
            TrustEvent::EndorsementSubmitted {
                endorser_id,
                request,
            } => {
                if let Err(err) = self.add_endorsement(&endorser_id, request).await {
                    warn!(endorser_id = %endorser_id, error = %err, "Endorsement rejected");
                }
            }
            TrustEvent::UserReported { reported_user_id } => {
                if let Err(err) = self.store.record_dispute(&reported_user_id).await {
                    warn!(user_id = %reported_user_id, error = %err, "Failed to record dispute signal");
                }
                self.react(&reported_user_id, "user reported").await;
            }
            TrustEvent::PolicyViolationRecorded { user_id } => {
                if let Err(err) = self.store.record_violation(&user_id).await {
                    warn!(user_id = %user_id, error = %err, "Failed to record violation signal");
                }
                self.react(&user_id, "policy violation").await;
            }
        }
    }

    /// Post-event reaction: refresh derived metrics, then recompute.
    async fn react(&self, user_id: &str, trigger: &str) {
        if let Err(err) = self.refresh_derived_metrics(user_id).await {
            warn!(user_id = %user_id, error = %err, "Failed to refresh derived metrics");
        }
        if let Err(err) = self.update_with_trigger(user_id, trigger).await {
            warn!(user_id = %user_id, trigger = %trigger, error = %err, "Deferred trust recomputation");
        }
    }

    /// Recompute the order- and review-derived base metrics.
    async fn refresh_derived_metrics(&self, user_id: &str) -> Result<(), TrustError> {
        let orders = self.store.orders_for_user(user_id).await?;
        let signals = self.store.risk_signals_for_user(user_id).await?;
        let reviews = self.store.reviews_for_subject(user_id).await?;

        let total = orders.len() as f64;
        let delivered = orders
            .iter()
            .filter(|o| matches!(o.outcome, OrderOutcome::Delivered { .. }))
            .count() as f64;

        let dispute_rate = if total > 0.0 {
            f64::from(signals.dispute_count) / total * 100.0
        } else {
            0.0
        };
        let completion_rate = if total > 0.0 {
            delivered / total * 100.0
        } else {
            0.0
        };
        let satisfaction = if reviews.is_empty() {
            0.0
        } else {
            reviews.iter().map(|r| f64::from(r.rating)).sum::<f64>() / reviews.len() as f64
        };

        for (kind, value) in [
            (MetricKind::TransactionCount, total),
            (MetricKind::SuccessfulTransactions, delivered),
            (MetricKind::DisputeRate, dispute_rate),
            (MetricKind::CompletionRate, completion_rate),
            (MetricKind::CustomerSatisfaction, satisfaction),
        ] {
            let (max_value, weight) = Self::metric_shape(kind);
            let metric = TrustMetric::new(user_id, kind, value, max_value, weight);
            self.store.upsert_metric(&metric).await?;
        }

        Ok(())
    }

    fn metric_shape(kind: MetricKind) -> (f64, f64) {
        BASE_METRICS
            .iter()
            .find(|(k, _, _)| *k == kind)
            .map(|(_, max, weight)| (*max, *weight))
            .unwrap_or((100.0, 1.0))
    }

    /// Operator view of a single user.
    pub async fn generate_user_trust_report(
        &self,
        user_id: &str,
    ) -> Result<UserTrustReport, TrustError> {
        let profile = self
            .store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| TrustError::ProfileNotFound(user_id.to_string()))?;

        let badges = self.store.badges_for_user(user_id).await?;
        let endorsements = self.store.endorsements_for_user(user_id).await?;
        let active_alerts = self
            .store
            .alerts_for_user(user_id)
            .await?
            .into_iter()
            .filter(|a| !a.is_resolved)
            .collect();
        let latest_risk = self.store.latest_assessment(user_id).await?;
        let recent_changes = self
            .store
            .changes_for_user(user_id, REPORT_CHANGE_LIMIT)
            .await?;

        Ok(UserTrustReport {
            user_id: user_id.to_string(),
            profile,
            badges,
            endorsements: EndorsementSummary::from_endorsements(&endorsements),
            active_alerts,
            latest_risk,
            recent_changes,
            generated_at: Utc::now(),
        })
    }

    /// Platform-wide snapshot; reads are lock-free and eventually
    /// consistent across users.
    pub async fn generate_platform_trust_report(
        &self,
    ) -> Result<PlatformTrustReport, TrustError> {
        let profiles = self.store.all_profiles().await?;
        let alerts = self.store.unresolved_alerts().await?;
        let assessments = self.store.all_assessments().await?;
        Ok(PlatformTrustReport::build(
            &profiles,
            &alerts,
            &assessments,
            Utc::now(),
        ))
    }

    /// Fail-soft input fetch: on a transient storage error, log and fall
    /// back to the type's neutral default so the update proceeds.
    fn soft<T: Default>(&self, user_id: &str, input: &str, result: Result<T, StoreError>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    input = %input,
                    error = %err,
                    "Signal unavailable, using neutral fallback"
                );
                T::default()
            }
        }
    }
}
