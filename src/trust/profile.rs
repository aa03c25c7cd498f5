//! Record types for the trust engine.
//!
//! The trust profile is the per-user aggregate; everything else is either
//! an input signal (metrics, badges, reviews, orders, snapshots) or an
//! output record (endorsements, reputation changes, risk assessments,
//! alerts). All score fields are integers in 0..=100.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default score assigned to a freshly created profile and used as the
/// neutral fallback when a sub-score has no data to work with.
pub const NEUTRAL_SCORE: i32 = 50;

/// Discrete trust classification.
///
/// Variant order is the trust ordering (derived `Ord`): the override
/// states sort below every score-derived level. `Suspended` and `Banned`
/// are reachable only through explicit administrative action; the
/// score-based classifier never produces them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TrustLevel {
    Banned,
    Suspended,
    Unverified,
    Basic,
    Verified,
    Trusted,
    Premium,
    Expert,
}

impl TrustLevel {
    /// Whether this level is an administrative override that routine
    /// recomputation must preserve.
    pub fn is_override(self) -> bool {
        matches!(self, TrustLevel::Suspended | TrustLevel::Banned)
    }

    /// Fixed endorsement weight for an endorser at this level. Snapshotted
    /// onto the endorsement record at submission time and never re-derived.
    pub fn endorsement_weight(self) -> f64 {
        match self {
            TrustLevel::Banned | TrustLevel::Suspended => 0.0,
            TrustLevel::Unverified => 0.1,
            TrustLevel::Basic => 0.3,
            TrustLevel::Verified => 0.5,
            TrustLevel::Trusted => 0.7,
            TrustLevel::Premium => 0.85,
            TrustLevel::Expert => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrustLevel::Banned => "BANNED",
            TrustLevel::Suspended => "SUSPENDED",
            TrustLevel::Unverified => "UNVERIFIED",
            TrustLevel::Basic => "BASIC",
            TrustLevel::Verified => "VERIFIED",
            TrustLevel::Trusted => "TRUSTED",
            TrustLevel::Premium => "PREMIUM",
            TrustLevel::Expert => "EXPERT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BANNED" => Some(TrustLevel::Banned),
            "SUSPENDED" => Some(TrustLevel::Suspended),
            "UNVERIFIED" => Some(TrustLevel::Unverified),
            "BASIC" => Some(TrustLevel::Basic),
            "VERIFIED" => Some(TrustLevel::Verified),
            "TRUSTED" => Some(TrustLevel::Trusted),
            "PREMIUM" => Some(TrustLevel::Premium),
            "EXPERT" => Some(TrustLevel::Expert),
            _ => None,
        }
    }
}

/// Completeness rating of a user's profile data and badges.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ProfileStrength {
    Weak,
    Fair,
    Good,
    Strong,
    Excellent,
}

impl ProfileStrength {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileStrength::Weak => "WEAK",
            ProfileStrength::Fair => "FAIR",
            ProfileStrength::Good => "GOOD",
            ProfileStrength::Strong => "STRONG",
            ProfileStrength::Excellent => "EXCELLENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WEAK" => Some(ProfileStrength::Weak),
            "FAIR" => Some(ProfileStrength::Fair),
            "GOOD" => Some(ProfileStrength::Good),
            "STRONG" => Some(ProfileStrength::Strong),
            "EXCELLENT" => Some(ProfileStrength::Excellent),
            _ => None,
        }
    }
}

/// Per-user trust aggregate.
///
/// Created once per user and updated on every triggering event; never
/// deleted, only demoted to an override level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustProfile {
    pub user_id: String,

    /// Composite score, always in 0..=100.
    pub trust_score: i32,
    pub trust_level: TrustLevel,

    /// Computed sub-scores, each in 0..=100.
    pub reputation_score: i32,
    pub reliability_score: i32,
    pub activity_score: i32,
    pub social_score: i32,

    pub profile_strength: ProfileStrength,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrustProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            trust_score: NEUTRAL_SCORE,
            trust_level: TrustLevel::Unverified,
            reputation_score: NEUTRAL_SCORE,
            reliability_score: NEUTRAL_SCORE,
            activity_score: 0,
            social_score: 0,
            profile_strength: ProfileStrength::Weak,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Kinds of normalized trust metric tracked per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    TransactionCount,
    SuccessfulTransactions,
    DisputeRate,
    ResponseTimeHours,
    CompletionRate,
    CustomerSatisfaction,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::TransactionCount => "transaction_count",
            MetricKind::SuccessfulTransactions => "successful_transactions",
            MetricKind::DisputeRate => "dispute_rate",
            MetricKind::ResponseTimeHours => "response_time_hours",
            MetricKind::CompletionRate => "completion_rate",
            MetricKind::CustomerSatisfaction => "customer_satisfaction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "transaction_count" => Some(MetricKind::TransactionCount),
            "successful_transactions" => Some(MetricKind::SuccessfulTransactions),
            "dispute_rate" => Some(MetricKind::DisputeRate),
            "response_time_hours" => Some(MetricKind::ResponseTimeHours),
            "completion_rate" => Some(MetricKind::CompletionRate),
            "customer_satisfaction" => Some(MetricKind::CustomerSatisfaction),
            _ => None,
        }
    }
}

/// A weighted, normalized signal feeding the composite trust score.
/// Unique per (user, kind). Negative weights penalize (e.g. dispute rate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustMetric {
    pub user_id: String,
    pub kind: MetricKind,
    pub value: f64,
    pub max_value: f64,
    pub weight: f64,
    pub updated_at: DateTime<Utc>,
}

impl TrustMetric {
    pub fn new(user_id: impl Into<String>, kind: MetricKind, value: f64, max_value: f64, weight: f64) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            value,
            max_value,
            weight,
            updated_at: Utc::now(),
        }
    }

    /// Normalized contribution: clamp(value / max_value, 0, 1) * weight.
    pub fn contribution(&self) -> f64 {
        if self.max_value <= 0.0 {
            return 0.0;
        }
        (self.value / self.max_value).clamp(0.0, 1.0) * self.weight
    }
}

/// Credential kinds a user can verify. Each contributes a fixed bonus to
/// the trust score while verified and unexpired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeKind {
    Email,
    Phone,
    Identity,
    Address,
    Business,
    Payment,
    ExpertSeller,
    TopRated,
}

impl BadgeKind {
    /// Fixed trust-score bonus while the badge is valid.
    pub fn bonus(self) -> i32 {
        match self {
            BadgeKind::Email => 2,
            BadgeKind::Phone => 3,
            BadgeKind::Identity => 10,
            BadgeKind::Address => 5,
            BadgeKind::Business => 15,
            BadgeKind::Payment => 5,
            BadgeKind::ExpertSeller => 20,
            BadgeKind::TopRated => 15,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BadgeKind::Email => "email",
            BadgeKind::Phone => "phone",
            BadgeKind::Identity => "identity",
            BadgeKind::Address => "address",
            BadgeKind::Business => "business",
            BadgeKind::Payment => "payment",
            BadgeKind::ExpertSeller => "expert_seller",
            BadgeKind::TopRated => "top_rated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(BadgeKind::Email),
            "phone" => Some(BadgeKind::Phone),
            "identity" => Some(BadgeKind::Identity),
            "address" => Some(BadgeKind::Address),
            "business" => Some(BadgeKind::Business),
            "payment" => Some(BadgeKind::Payment),
            "expert_seller" => Some(BadgeKind::ExpertSeller),
            "top_rated" => Some(BadgeKind::TopRated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeStatus {
    Pending,
    Verified,
    Revoked,
    Expired,
}

impl BadgeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeStatus::Pending => "pending",
            BadgeStatus::Verified => "verified",
            BadgeStatus::Revoked => "revoked",
            BadgeStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BadgeStatus::Pending),
            "verified" => Some(BadgeStatus::Verified),
            "revoked" => Some(BadgeStatus::Revoked),
            "expired" => Some(BadgeStatus::Expired),
            _ => None,
        }
    }
}

/// A verification credential. Unique per (user, kind).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationBadge {
    pub user_id: String,
    pub kind: BadgeKind,
    pub status: BadgeStatus,
    pub verified_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl VerificationBadge {
    pub fn verified(user_id: impl Into<String>, kind: BadgeKind, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            status: BadgeStatus::Verified,
            verified_at: Utc::now(),
            expires_at,
        }
    }

    /// Whether the badge contributes its bonus at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.status == BadgeStatus::Verified
            && self.expires_at.map_or(true, |expiry| expiry > now)
    }
}

/// A peer endorsement. The weight is fixed at submission time from the
/// endorser's trust level and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endorsement {
    pub id: String,
    pub endorser_id: String,
    pub endorsee_id: String,
    pub category: String,
    /// 1..=5.
    pub rating: u8,
    pub comment: Option<String>,
    /// Snapshot of the endorser's level weight at submission.
    pub weight: f64,
    /// Endorser was at least VERIFIED when the endorsement was given.
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Why a trust score changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Initialization,
    Recalculation,
    AdminOverride,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Initialization => "initialization",
            ChangeType::Recalculation => "recalculation",
            ChangeType::AdminOverride => "admin_override",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "initialization" => Some(ChangeType::Initialization),
            "recalculation" => Some(ChangeType::Recalculation),
            "admin_override" => Some(ChangeType::AdminOverride),
            _ => None,
        }
    }
}

/// Append-only audit record of a trust-score transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationChange {
    pub id: String,
    pub user_id: String,
    pub change_type: ChangeType,
    pub previous_score: i32,
    pub new_score: i32,
    /// Always `new_score - previous_score`.
    pub delta: i32,
    pub reason: String,
    pub triggered_by: String,
    pub created_at: DateTime<Utc>,
}

impl ReputationChange {
    pub fn new(
        user_id: impl Into<String>,
        change_type: ChangeType,
        previous_score: i32,
        new_score: i32,
        reason: impl Into<String>,
        triggered_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            change_type,
            previous_score,
            new_score,
            delta: new_score - previous_score,
            reason: reason.into(),
            triggered_by: triggered_by.into(),
            created_at: Utc::now(),
        }
    }
}

/// A review received by (or written by) a marketplace user. Input to the
/// reputation sub-score and the authenticity verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review_id: String,
    pub author_id: String,
    /// The reviewed user.
    pub subject_id: String,
    /// 1..=5.
    pub rating: u8,
    pub verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

/// Terminal outcome of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderOutcome {
    Delivered { on_time: bool },
    Cancelled,
}

/// A completed or cancelled order attributed to a user. Input to the
/// reliability sub-score and the dispute-rate computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub user_id: String,
    pub outcome: OrderOutcome,
    pub created_at: DateTime<Utc>,
}

/// Trailing-30-day activity counters, maintained by the platform's
/// session/messaging services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub logins_30d: u32,
    pub orders_30d: u32,
    pub messages_30d: u32,
}

/// Social graph counters, maintained by the community service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialSnapshot {
    pub connections: u32,
    pub posts: u32,
}

/// Abuse-risk inputs, maintained by identity and order services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskSignals {
    /// Other accounts sharing this user's email or phone.
    pub shared_contact_accounts: u32,
    pub dispute_count: u32,
    pub order_count: u32,
    pub violation_count: u32,
}

/// Optional identity fields feeding profile-strength calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}
