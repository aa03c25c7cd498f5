//! Marketplace Trust & Risk Engine
//!
//! Embeddable trust scoring for marketplace platforms: weighted metric
//! aggregation, trust level classification, endorsements with
//! snapshotted weights, risk assessment, review authenticity checks,
//! and deduplicated trust alerts, persisted through a pluggable store.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── config.rs      - Configuration (env-driven, validated)
//! ├── error.rs       - Store and engine error types
//! ├── store/         - Persistence layer
//! │   ├── memory.rs     - In-process DashMap store
//! │   └── postgres.rs   - PostgreSQL store (sqlx)
//! └── trust/         - Trust engine
//!     ├── profile.rs       - Core records (profiles, metrics, badges...)
//!     ├── scoring.rs       - Sub-score aggregation
//!     ├── level.rs         - Level & profile-strength classification
//!     ├── endorsement.rs   - Endorsement validation & weight snapshot
//!     ├── risk.rs          - Risk factor assessment
//!     ├── authenticity.rs  - Review authenticity checks
//!     ├── alerts.rs        - Alert monitoring with dedup
//!     ├── report.rs        - User & platform reports
//!     └── manager.rs       - Orchestrator with per-user locking
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use marketplace_trust::{MemoryStore, TrustConfig, TrustEvent, TrustManager};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let manager = TrustManager::new(store, TrustConfig::default());
//!
//! manager.initialize_trust_profile("seller_42").await?;
//! manager
//!     .handle_event(TrustEvent::OrderCompleted {
//!         user_id: "seller_42".into(),
//!         on_time: true,
//!     })
//!     .await;
//!
//! let profile = manager.get_trust_profile("seller_42").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod trust;

pub use config::{AlertConfig, DatabaseConfig, RiskConfig, ScoringConfig, TrustConfig};
pub use error::{StoreError, TrustError};
pub use store::{MemoryStore, PostgresStore, TrustStore};
pub use trust::{
    AlertSeverity, AlertType, AuthenticityStatus, BadgeKind, ChangeType, Endorsement,
    EndorsementRequest, MetricKind, OrderOutcome, OrderRecord, PlatformTrustReport,
    ReputationChange, ReviewAuthenticity, ReviewRecord, RiskAssessment, RiskLevel, TrustAlert,
    TrustEvent, TrustLevel, TrustManager, TrustMetric, TrustProfile, UserTrustReport,
    VerificationBadge,
};
