//! Integration tests for the marketplace trust engine.
//!
//! These tests verify end-to-end flows of the trust system over the
//! in-memory store: profile lifecycle, event-driven recomputation,
//! endorsements, risk assessment, authenticity checks, alerting, and
//! reporting.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use marketplace_trust::trust::{
    ActivitySnapshot, AuthenticityFlag, ProfileDetails, ProfileStrength, RiskFactorKind,
    RiskSignals, SocialSnapshot,
};
use marketplace_trust::{
    AlertSeverity, AlertType, BadgeKind, Endorsement, EndorsementRequest, MemoryStore, OrderRecord,
    ReputationChange, ReviewRecord, RiskAssessment, RiskLevel, StoreError, TrustAlert, TrustConfig,
    TrustError, TrustEvent, TrustLevel, TrustManager, TrustMetric, TrustProfile, TrustStore,
    VerificationBadge,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

// ============================================================================
// Test Helpers
// ============================================================================

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn setup() -> (TrustManager, Arc<MemoryStore>) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let manager = TrustManager::new(store.clone(), TrustConfig::default());
    (manager, store)
}

/// Create a review posted `age_hours` ago.
fn make_review(id: &str, author: &str, subject: &str, rating: u8, verified: bool, age_hours: i64) -> ReviewRecord {
    ReviewRecord {
        review_id: id.to_string(),
        author_id: author.to_string(),
        subject_id: subject.to_string(),
        rating,
        verified_purchase: verified,
        created_at: Utc::now() - Duration::hours(age_hours),
    }
}

/// Persist a profile with a given score and level, bypassing the manager.
/// The profile is backdated so it reads as an established account rather
/// than a fresh initialization.
async fn seed_profile(store: &MemoryStore, user_id: &str, score: i32, level: TrustLevel) {
    let mut profile = TrustProfile::new(user_id);
    profile.trust_score = score;
    profile.trust_level = level;
    profile.created_at = profile.updated_at - Duration::hours(1);
    store.put_profile(&profile).await.unwrap();
}

/// Store double that delegates to `MemoryStore` but can be switched to
/// fail signal reads or profile writes, exercising the degraded paths.
struct FlakyStore {
    inner: MemoryStore,
    fail_signal_reads: AtomicBool,
    fail_profile_writes: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_signal_reads: AtomicBool::new(false),
            fail_profile_writes: AtomicBool::new(false),
        }
    }

    fn outage(&self) -> StoreError {
        StoreError::Backend("storage offline".to_string())
    }

    fn signal_reads_failing(&self) -> bool {
        self.fail_signal_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrustStore for FlakyStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<TrustProfile>, StoreError> {
        self.inner.get_profile(user_id).await
    }

    async fn put_profile(&self, profile: &TrustProfile) -> Result<(), StoreError> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(self.outage());
        }
        self.inner.put_profile(profile).await
    }

    async fn all_profiles(&self) -> Result<Vec<TrustProfile>, StoreError> {
        self.inner.all_profiles().await
    }

    async fn metrics_for_user(&self, user_id: &str) -> Result<Vec<TrustMetric>, StoreError> {
        if self.signal_reads_failing() {
            return Err(self.outage());
        }
        self.inner.metrics_for_user(user_id).await
    }

    async fn upsert_metric(&self, metric: &TrustMetric) -> Result<(), StoreError> {
        self.inner.upsert_metric(metric).await
    }

    async fn badges_for_user(&self, user_id: &str) -> Result<Vec<VerificationBadge>, StoreError> {
        if self.signal_reads_failing() {
            return Err(self.outage());
        }
        self.inner.badges_for_user(user_id).await
    }

    async fn upsert_badge(&self, badge: &VerificationBadge) -> Result<(), StoreError> {
        self.inner.upsert_badge(badge).await
    }

    async fn insert_endorsement(&self, endorsement: &Endorsement) -> Result<(), StoreError> {
        self.inner.insert_endorsement(endorsement).await
    }

    async fn endorsements_for_user(
        &self,
        endorsee_id: &str,
    ) -> Result<Vec<Endorsement>, StoreError> {
        if self.signal_reads_failing() {
            return Err(self.outage());
        }
        self.inner.endorsements_for_user(endorsee_id).await
    }

    async fn insert_change(&self, change: &ReputationChange) -> Result<(), StoreError> {
        self.inner.insert_change(change).await
    }

    async fn changes_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ReputationChange>, StoreError> {
        self.inner.changes_for_user(user_id, limit).await
    }

    async fn put_assessment(&self, assessment: &RiskAssessment) -> Result<(), StoreError> {
        self.inner.put_assessment(assessment).await
    }

    async fn latest_assessment(&self, user_id: &str) -> Result<Option<RiskAssessment>, StoreError> {
        self.inner.latest_assessment(user_id).await
    }

    async fn all_assessments(&self) -> Result<Vec<RiskAssessment>, StoreError> {
        self.inner.all_assessments().await
    }

    async fn insert_alert(&self, alert: &TrustAlert) -> Result<(), StoreError> {
        self.inner.insert_alert(alert).await
    }

    async fn get_alert(&self, alert_id: &str) -> Result<Option<TrustAlert>, StoreError> {
        self.inner.get_alert(alert_id).await
    }

    async fn update_alert(&self, alert: &TrustAlert) -> Result<(), StoreError> {
        self.inner.update_alert(alert).await
    }

    async fn alerts_for_user(&self, user_id: &str) -> Result<Vec<TrustAlert>, StoreError> {
        self.inner.alerts_for_user(user_id).await
    }

    async fn unresolved_alerts(&self) -> Result<Vec<TrustAlert>, StoreError> {
        self.inner.unresolved_alerts().await
    }

    async fn insert_review(&self, review: &ReviewRecord) -> Result<(), StoreError> {
        self.inner.insert_review(review).await
    }

    async fn get_review(&self, review_id: &str) -> Result<Option<ReviewRecord>, StoreError> {
        self.inner.get_review(review_id).await
    }

    async fn reviews_for_subject(&self, subject_id: &str) -> Result<Vec<ReviewRecord>, StoreError> {
        if self.signal_reads_failing() {
            return Err(self.outage());
        }
        self.inner.reviews_for_subject(subject_id).await
    }

    async fn reviews_by_author(&self, author_id: &str) -> Result<Vec<ReviewRecord>, StoreError> {
        self.inner.reviews_by_author(author_id).await
    }

    async fn insert_order(&self, order: &OrderRecord) -> Result<(), StoreError> {
        self.inner.insert_order(order).await
    }

    async fn orders_for_user(&self, user_id: &str) -> Result<Vec<OrderRecord>, StoreError> {
        if self.signal_reads_failing() {
            return Err(self.outage());
        }
        self.inner.orders_for_user(user_id).await
    }

    async fn activity_for_user(&self, user_id: &str) -> Result<ActivitySnapshot, StoreError> {
        if self.signal_reads_failing() {
            return Err(self.outage());
        }
        self.inner.activity_for_user(user_id).await
    }

    async fn social_for_user(&self, user_id: &str) -> Result<SocialSnapshot, StoreError> {
        if self.signal_reads_failing() {
            return Err(self.outage());
        }
        self.inner.social_for_user(user_id).await
    }

    async fn risk_signals_for_user(&self, user_id: &str) -> Result<RiskSignals, StoreError> {
        self.inner.risk_signals_for_user(user_id).await
    }

    async fn profile_details(&self, user_id: &str) -> Result<Option<ProfileDetails>, StoreError> {
        if self.signal_reads_failing() {
            return Err(self.outage());
        }
        self.inner.profile_details(user_id).await
    }

    async fn record_dispute(&self, user_id: &str) -> Result<(), StoreError> {
        self.inner.record_dispute(user_id).await
    }

    async fn record_violation(&self, user_id: &str) -> Result<(), StoreError> {
        self.inner.record_violation(user_id).await
    }
}

// ============================================================================
// Profile Lifecycle
// ============================================================================

#[tokio::test]
async fn test_initialize_creates_neutral_profile() {
    let (manager, store) = setup();

    let profile = manager.initialize_trust_profile("seller_1").await.unwrap();
    assert_eq!(profile.trust_score, 50);
    assert_eq!(profile.trust_level, TrustLevel::Unverified);
    assert_eq!(profile.profile_strength, ProfileStrength::Weak);
    assert_eq!(profile.reputation_score, 50);
    assert_eq!(profile.reliability_score, 50);
    assert_eq!(profile.activity_score, 0);
    assert_eq!(profile.social_score, 0);

    // Six base metrics seeded at zero.
    let metrics = store.metrics_for_user("seller_1").await.unwrap();
    assert_eq!(metrics.len(), 6);
    assert!(metrics.iter().all(|m| m.value == 0.0));
}

#[tokio::test]
async fn test_update_without_events_is_idempotent() {
    let (manager, _) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();

    let first = manager.update_trust_profile("seller_1").await.unwrap();
    let second = manager.update_trust_profile("seller_1").await.unwrap();

    assert_eq!(first.trust_score, second.trust_score);
    assert_eq!(first.trust_level, second.trust_level);
    assert_eq!(first.reputation_score, second.reputation_score);
    assert_eq!(first.reliability_score, second.reliability_score);
    assert_eq!(first.activity_score, second.activity_score);
    assert_eq!(first.social_score, second.social_score);
}

#[tokio::test]
async fn test_get_missing_profile_returns_none() {
    let (manager, _) = setup();
    assert!(manager.get_trust_profile("ghost").await.unwrap().is_none());
}

// ============================================================================
// Badges
// ============================================================================

#[tokio::test]
async fn test_badge_bonuses_add_to_base_score() {
    let (manager, _) = setup();

    // No seeded metrics: the base stays at the neutral 50, so the badge
    // bonuses are directly visible in the composite score.
    manager
        .award_verification_badge("seller_1", BadgeKind::Email, None)
        .await
        .unwrap();
    manager
        .award_verification_badge("seller_1", BadgeKind::Identity, None)
        .await
        .unwrap();

    let profile = manager
        .get_trust_profile("seller_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.trust_score, 62); // 50 + 2 + 10
    assert_eq!(profile.trust_level, TrustLevel::Verified);
}

#[tokio::test]
async fn test_expired_badge_contributes_nothing() {
    let (manager, _) = setup();

    let expired = Some(Utc::now() - Duration::days(1));
    manager
        .award_verification_badge("seller_1", BadgeKind::Business, expired)
        .await
        .unwrap();

    let profile = manager
        .get_trust_profile("seller_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.trust_score, 50);
}

// ============================================================================
// Event-Driven Recomputation
// ============================================================================

#[tokio::test]
async fn test_order_events_drive_reliability_and_metrics() {
    let (manager, store) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();

    manager
        .handle_event(TrustEvent::OrderCompleted {
            user_id: "seller_1".into(),
            on_time: true,
        })
        .await;
    manager
        .handle_event(TrustEvent::OrderCompleted {
            user_id: "seller_1".into(),
            on_time: true,
        })
        .await;

    let profile = manager
        .get_trust_profile("seller_1")
        .await
        .unwrap()
        .unwrap();
    // Two on-time deliveries: (80+20)*2 / 200 * 100.
    assert_eq!(profile.reliability_score, 100);

    // Derived metrics refreshed from the order ledger.
    let metrics = store.metrics_for_user("seller_1").await.unwrap();
    let completion = metrics
        .iter()
        .find(|m| m.kind == marketplace_trust::MetricKind::CompletionRate)
        .unwrap();
    assert_eq!(completion.value, 100.0);
}

#[tokio::test]
async fn test_cancellation_lowers_reliability() {
    let (manager, _) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();

    manager
        .handle_event(TrustEvent::OrderCompleted {
            user_id: "seller_1".into(),
            on_time: false,
        })
        .await;
    manager
        .handle_event(TrustEvent::OrderCancelled {
            user_id: "seller_1".into(),
        })
        .await;

    let profile = manager
        .get_trust_profile("seller_1")
        .await
        .unwrap()
        .unwrap();
    // (80 - 20) / 200 * 100 = 30.
    assert_eq!(profile.reliability_score, 30);
}

#[tokio::test]
async fn test_perfect_reviews_today_give_full_reputation() {
    let (manager, store) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();

    for i in 0..5 {
        let review = make_review(&format!("rev_{i}"), &format!("buyer_{i}"), "seller_1", 5, true, 0);
        store.insert_review(&review).await.unwrap();
    }

    let profile = manager.update_trust_profile("seller_1").await.unwrap();
    assert_eq!(profile.reputation_score, 100);
}

#[tokio::test]
async fn test_review_event_updates_subject() {
    let (manager, _) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();

    manager
        .handle_event(TrustEvent::ReviewPosted {
            review: make_review("rev_1", "buyer_1", "seller_1", 5, true, 0),
        })
        .await;

    let profile = manager
        .get_trust_profile("seller_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.reputation_score, 100);
}

// ============================================================================
// Endorsements
// ============================================================================

#[tokio::test]
async fn test_endorsement_weight_is_snapshotted() {
    let (manager, store) = setup();
    seed_profile(&store, "endorser_1", 75, TrustLevel::Trusted).await;
    manager.initialize_trust_profile("seller_1").await.unwrap();

    let endorsement = manager
        .add_endorsement(
            "endorser_1",
            EndorsementRequest {
                endorsee_id: "seller_1".to_string(),
                category: "communication".to_string(),
                rating: 5,
                comment: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(endorsement.weight, 0.7);
    assert!(endorsement.is_verified);

    // Promote the endorser afterwards; the stored weight must not move.
    seed_profile(&store, "endorser_1", 95, TrustLevel::Expert).await;

    let stored = store.endorsements_for_user("seller_1").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].weight, 0.7);
}

#[tokio::test]
async fn test_unverified_endorser_is_rejected() {
    let (manager, _) = setup();
    manager.initialize_trust_profile("endorser_1").await.unwrap();
    manager.initialize_trust_profile("seller_1").await.unwrap();

    let result = manager
        .add_endorsement(
            "endorser_1",
            EndorsementRequest {
                endorsee_id: "seller_1".to_string(),
                category: "quality".to_string(),
                rating: 4,
                comment: None,
            },
        )
        .await;
    assert!(matches!(result, Err(TrustError::Validation(_))));
}

#[tokio::test]
async fn test_endorsement_raises_social_score() {
    let (manager, store) = setup();
    seed_profile(&store, "endorser_1", 75, TrustLevel::Trusted).await;
    manager.initialize_trust_profile("seller_1").await.unwrap();

    manager
        .add_endorsement(
            "endorser_1",
            EndorsementRequest {
                endorsee_id: "seller_1".to_string(),
                category: "communication".to_string(),
                rating: 5,
                comment: Some("great to work with".to_string()),
            },
        )
        .await
        .unwrap();

    let profile = manager
        .get_trust_profile("seller_1")
        .await
        .unwrap()
        .unwrap();
    // One verified endorsement * 5.
    assert_eq!(profile.social_score, 5);
}

// ============================================================================
// Risk Assessment
// ============================================================================

#[tokio::test]
async fn test_risk_assessment_from_shared_accounts() {
    let (manager, store) = setup();
    store.set_risk_signals(
        "seller_1",
        marketplace_trust::trust::RiskSignals {
            shared_contact_accounts: 2,
            ..Default::default()
        },
    );

    let assessment = manager.perform_risk_assessment("seller_1").await.unwrap();
    assert_eq!(assessment.factors.len(), 1);
    assert_eq!(assessment.factors[0].kind, RiskFactorKind::MultipleAccounts);
    assert!((assessment.risk_score - 30.0).abs() < 1e-9);
    assert_eq!(assessment.overall_risk, RiskLevel::Medium);
    assert!(!assessment.recommendations.is_empty());
}

#[tokio::test]
async fn test_risk_assessment_is_overwritten() {
    let (manager, store) = setup();
    store.set_risk_signals(
        "seller_1",
        marketplace_trust::trust::RiskSignals {
            shared_contact_accounts: 2,
            ..Default::default()
        },
    );
    manager.perform_risk_assessment("seller_1").await.unwrap();

    // Signals clear; the next assessment fully replaces the old one.
    store.set_risk_signals("seller_1", Default::default());
    manager.perform_risk_assessment("seller_1").await.unwrap();

    let latest = store.latest_assessment("seller_1").await.unwrap().unwrap();
    assert!(latest.factors.is_empty());
    assert_eq!(latest.overall_risk, RiskLevel::Low);
    assert_eq!(latest.risk_score, 0.0);
}

// ============================================================================
// Review Authenticity
// ============================================================================

#[tokio::test]
async fn test_burst_unverified_review_is_fake() {
    let (manager, store) = setup();

    // Author posts 6 reviews inside 24 hours, each for a different subject.
    for i in 0..5 {
        let review = make_review(&format!("rev_{i}"), "author_1", &format!("subject_{i}"), 5, true, 2);
        store.insert_review(&review).await.unwrap();
    }
    let target = make_review("rev_target", "author_1", "subject_target", 5, false, 0);
    store.insert_review(&target).await.unwrap();

    let result = manager
        .verify_review_authenticity("rev_target")
        .await
        .unwrap();
    assert!(result.flags.contains(&AuthenticityFlag::SuspiciousTiming));
    assert!(result.flags.contains(&AuthenticityFlag::FakePurchase));
    assert_eq!(result.score, 35); // 100 - 25 - 40
    assert_eq!(
        result.status,
        marketplace_trust::AuthenticityStatus::Fake
    );
}

#[tokio::test]
async fn test_clean_review_is_authentic() {
    let (manager, store) = setup();
    let review = make_review("rev_1", "author_1", "subject_1", 4, true, 0);
    store.insert_review(&review).await.unwrap();

    let result = manager.verify_review_authenticity("rev_1").await.unwrap();
    assert!(result.flags.is_empty());
    assert_eq!(result.score, 100);
}

#[tokio::test]
async fn test_unknown_review_is_rejected() {
    let (manager, _) = setup();
    let result = manager.verify_review_authenticity("missing").await;
    assert!(matches!(result, Err(TrustError::Validation(_))));
}

// ============================================================================
// Alerts
// ============================================================================

#[tokio::test]
async fn test_score_drop_raises_high_alert() {
    let (manager, store) = setup();
    // A profile at 75 with no backing signals recomputes to the neutral 50.
    seed_profile(&store, "seller_1", 75, TrustLevel::Trusted).await;

    manager.update_trust_profile("seller_1").await.unwrap();

    let alerts = store.alerts_for_user("seller_1").await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::ReputationDrop);
    assert_eq!(alerts[0].severity, AlertSeverity::High);
}

#[tokio::test]
async fn test_duplicate_drop_alert_is_suppressed() {
    let (manager, store) = setup();
    seed_profile(&store, "seller_1", 75, TrustLevel::Trusted).await;
    manager.update_trust_profile("seller_1").await.unwrap();

    // Force the same drop again inside the dedup window.
    seed_profile(&store, "seller_1", 75, TrustLevel::Trusted).await;
    manager.update_trust_profile("seller_1").await.unwrap();

    let alerts = store.alerts_for_user("seller_1").await.unwrap();
    assert_eq!(alerts.len(), 1);
}

#[tokio::test]
async fn test_resolved_alert_no_longer_suppresses() {
    let (manager, store) = setup();
    seed_profile(&store, "seller_1", 75, TrustLevel::Trusted).await;
    manager.update_trust_profile("seller_1").await.unwrap();

    let alerts = store.alerts_for_user("seller_1").await.unwrap();
    let resolved = manager.resolve_alert(&alerts[0].id, "ops_1").await.unwrap();
    assert!(resolved.is_resolved);
    assert_eq!(resolved.resolved_by.as_deref(), Some("ops_1"));

    seed_profile(&store, "seller_1", 75, TrustLevel::Trusted).await;
    manager.update_trust_profile("seller_1").await.unwrap();

    let alerts = store.alerts_for_user("seller_1").await.unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(store.unresolved_alerts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_first_recompute_after_initialization_does_not_alert() {
    let (manager, store) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();

    // An idle new account recomputes from its zero-valued seeded metrics,
    // well below the neutral starting score. That establishes the baseline
    // and must not read as a reputation drop.
    let profile = manager.update_trust_profile("seller_1").await.unwrap();
    assert!(profile.trust_score < 50);

    let alerts = store.alerts_for_user("seller_1").await.unwrap();
    assert!(alerts
        .iter()
        .all(|a| a.alert_type != AlertType::ReputationDrop));
}

#[tokio::test]
async fn test_expiring_badge_raises_alert() {
    let (manager, store) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();

    let soon = Some(Utc::now() + Duration::days(7));
    manager
        .award_verification_badge("seller_1", BadgeKind::Identity, soon)
        .await
        .unwrap();

    let alerts = store.alerts_for_user("seller_1").await.unwrap();
    assert!(alerts
        .iter()
        .any(|a| a.alert_type == AlertType::VerificationExpiring));
}

// ============================================================================
// Administrative Overrides
// ============================================================================

#[tokio::test]
async fn test_suspension_survives_business_events() {
    let (manager, _) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();
    manager
        .set_administrative_level("seller_1", TrustLevel::Suspended, "fraud review", "ops_1")
        .await
        .unwrap();

    manager
        .handle_event(TrustEvent::OrderCompleted {
            user_id: "seller_1".into(),
            on_time: true,
        })
        .await;

    let profile = manager
        .get_trust_profile("seller_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.trust_level, TrustLevel::Suspended);
}

#[tokio::test]
async fn test_suspended_user_cannot_endorse() {
    let (manager, store) = setup();
    seed_profile(&store, "endorser_1", 80, TrustLevel::Suspended).await;
    manager.initialize_trust_profile("seller_1").await.unwrap();

    let result = manager
        .add_endorsement(
            "endorser_1",
            EndorsementRequest {
                endorsee_id: "seller_1".to_string(),
                category: "quality".to_string(),
                rating: 5,
                comment: None,
            },
        )
        .await;
    assert!(matches!(result, Err(TrustError::Validation(_))));
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
async fn test_user_report_aggregates_sections() {
    let (manager, store) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();
    seed_profile(&store, "endorser_1", 75, TrustLevel::Trusted).await;

    manager
        .award_verification_badge("seller_1", BadgeKind::Email, None)
        .await
        .unwrap();
    manager
        .add_endorsement(
            "endorser_1",
            EndorsementRequest {
                endorsee_id: "seller_1".to_string(),
                category: "communication".to_string(),
                rating: 5,
                comment: None,
            },
        )
        .await
        .unwrap();
    manager.perform_risk_assessment("seller_1").await.unwrap();

    let report = manager.generate_user_trust_report("seller_1").await.unwrap();
    assert_eq!(report.user_id, "seller_1");
    assert_eq!(report.badges.len(), 1);
    assert_eq!(report.endorsements.total, 1);
    assert_eq!(report.endorsements.verified, 1);
    assert!(report.latest_risk.is_some());
    assert!(!report.recent_changes.is_empty());
}

#[tokio::test]
async fn test_user_report_requires_profile() {
    let (manager, _) = setup();
    let result = manager.generate_user_trust_report("ghost").await;
    assert!(matches!(result, Err(TrustError::ProfileNotFound(_))));
}

#[tokio::test]
async fn test_platform_report_counts() {
    let (manager, store) = setup();
    manager.initialize_trust_profile("seller_1").await.unwrap();
    manager.initialize_trust_profile("seller_2").await.unwrap();

    // Force a drop alert on one user.
    seed_profile(&store, "seller_3", 75, TrustLevel::Trusted).await;
    manager.update_trust_profile("seller_3").await.unwrap();

    let report = manager.generate_platform_trust_report().await.unwrap();
    assert_eq!(report.total_users, 3);
    assert_eq!(
        report
            .unresolved_alerts_by_severity
            .get(&AlertSeverity::High)
            .copied()
            .unwrap_or(0),
        1
    );
}

// ============================================================================
// Storage Degradation
// ============================================================================

#[tokio::test]
async fn test_signal_outage_falls_back_to_neutral_scores() {
    init_tracing();
    let store = Arc::new(FlakyStore::new());
    let manager = TrustManager::new(store.clone(), TrustConfig::default());
    manager.initialize_trust_profile("seller_1").await.unwrap();

    // Every signal read fails; the update still lands, computed from
    // neutral fallbacks instead of aborting.
    store.fail_signal_reads.store(true, Ordering::SeqCst);
    let profile = manager.update_trust_profile("seller_1").await.unwrap();

    assert_eq!(profile.trust_score, 50);
    assert_eq!(profile.reputation_score, 50);
    assert_eq!(profile.reliability_score, 50);
    assert_eq!(profile.activity_score, 0);
    assert_eq!(profile.social_score, 0);
}

#[tokio::test]
async fn test_profile_persist_failure_propagates() {
    init_tracing();
    let store = Arc::new(FlakyStore::new());
    let manager = TrustManager::new(store.clone(), TrustConfig::default());
    manager.initialize_trust_profile("seller_1").await.unwrap();

    store.fail_profile_writes.store(true, Ordering::SeqCst);
    let result = manager.update_trust_profile("seller_1").await;
    assert!(matches!(result, Err(TrustError::Store(_))));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_updates_converge() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let manager = Arc::new(TrustManager::new(store.clone(), TrustConfig::default()));
    manager.initialize_trust_profile("seller_1").await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager.update_trust_profile("seller_1").await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // The serialized updates all computed from the same inputs; a final
    // pass must agree with whatever they wrote.
    let settled = manager.update_trust_profile("seller_1").await.unwrap();
    let stored = manager
        .get_trust_profile("seller_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.trust_score, stored.trust_score);
    assert_eq!(settled.trust_level, stored.trust_level);
}
