//! Marketplace Trust Engine
//!
//! Computes a composite trust score per user from weighted metrics,
//! reviews, orders, activity, and endorsements, classifies it into a
//! trust level, and watches the result for abuse and degradation.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ ScoreAggregator│────►│   TrustManager   │◄────│ EndorsementLedger│
//! │ (sub-scores)   │     │  (orchestrator)  │     │ (weight snapshot)│
//! └────────────────┘     └──────────────────┘     └──────────────────┘
//!                          │       │       │
//!              ┌───────────┘       │       └───────────┐
//!              ▼                   ▼                   ▼
//!     ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐
//!     │ RiskAssessor │    │ AlertMonitor │    │ Authenticity      │
//!     │ (abuse risk) │    │ (dedup'd)    │    │ Verifier (reviews)│
//!     └──────────────┘    └──────────────┘    └──────────────────┘
//! ```
//!
//! ## Score Model
//!
//! - Composite score in 0..=100; a user with no signals sits at 50
//! - Metrics contribute clamp(value/max, 0, 1) * weight; negative
//!   weights penalize
//! - Valid verification badges add fixed bonuses after normalization
//! - Levels are a pure step function of the score; SUSPENDED and BANNED
//!   are administrative overrides the classifier never emits

pub(crate) mod alerts;
mod authenticity;
mod endorsement;
mod level;
mod manager;
pub(crate) mod profile;
mod report;
pub(crate) mod risk;
mod scoring;

pub use alerts::{AlertMonitor, AlertSeverity, AlertType, TrustAlert};
pub use authenticity::{
    AuthenticityFlag, AuthenticityStatus, AuthenticityVerifier, ReviewAuthenticity,
    SuspiciousPattern,
};
pub use endorsement::{build_endorsement, EndorsementRequest};
pub use level::{calculate_profile_strength, determine_trust_level};
pub use manager::{TrustEvent, TrustManager};
pub use profile::{
    ActivitySnapshot, BadgeKind, BadgeStatus, ChangeType, Endorsement, MetricKind, OrderOutcome,
    OrderRecord, ProfileDetails, ProfileStrength, ReputationChange, ReviewRecord, RiskSignals,
    SocialSnapshot, TrustLevel, TrustMetric, TrustProfile, VerificationBadge, NEUTRAL_SCORE,
};
pub use report::{EndorsementSummary, PlatformTrustReport, UserTrustReport};
pub use risk::{RiskAssessment, RiskAssessor, RiskFactor, RiskFactorKind, RiskLevel};
pub use scoring::ScoreAggregator;
