//! Score aggregation.
//!
//! All calculations are pure functions over already-loaded records so the
//! manager can apply its fail-soft policy around each input fetch. Every
//! result is an integer in 0..=100; empty inputs produce the documented
//! neutral defaults.
//!
//! ## Score model
//!
//! - Composite trust score: weighted metric average (negative weights
//!   penalize) plus fixed bonuses for valid verification badges.
//! - Reputation: review ratings with exponential recency decay.
//! - Reliability: per-order points for delivery, on-time delivery, and
//!   cancellations.
//! - Activity / social: individually capped linear terms.

use chrono::{DateTime, Utc};

use crate::config::ScoringConfig;
use crate::trust::profile::{
    ActivitySnapshot, Endorsement, OrderOutcome, OrderRecord, ReviewRecord, SocialSnapshot,
    TrustMetric, VerificationBadge, NEUTRAL_SCORE,
};

const SECONDS_PER_DAY: f64 = 86_400.0;

pub struct ScoreAggregator {
    config: ScoringConfig,
}

impl ScoreAggregator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Composite trust score: normalized weighted metric average mapped to
    /// 0..=100, plus fixed badge bonuses, clamped.
    pub fn calculate_trust_score(
        &self,
        metrics: &[TrustMetric],
        badges: &[VerificationBadge],
        now: DateTime<Utc>,
    ) -> i32 {
        let weighted_sum: f64 = metrics.iter().map(TrustMetric::contribution).sum();
        let total_weight: f64 = metrics.iter().map(|m| m.weight.abs()).sum();

        let base = if total_weight > 0.0 {
            (weighted_sum / total_weight) * 100.0
        } else {
            f64::from(NEUTRAL_SCORE)
        };

        let bonus: i32 = badges
            .iter()
            .filter(|b| b.is_valid_at(now))
            .map(|b| b.kind.bonus())
            .sum();

        (base + f64::from(bonus)).clamp(0.0, 100.0).round() as i32
    }

    /// Weighted average of review ratings with exponential recency decay
    /// (weight = e^(-days/decay)), mapped from the 1..=5 rating scale to
    /// 0..=100. Neutral 50 with no reviews.
    pub fn calculate_reputation_score(&self, reviews: &[ReviewRecord], now: DateTime<Utc>) -> i32 {
        if reviews.is_empty() {
            return NEUTRAL_SCORE;
        }

        let mut weighted_ratings = 0.0;
        let mut total_weight = 0.0;
        for review in reviews {
            let age_days =
                (now - review.created_at).num_seconds().max(0) as f64 / SECONDS_PER_DAY;
            let weight = (-age_days / self.config.review_decay_days).exp();
            weighted_ratings += f64::from(review.rating) * weight;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return NEUTRAL_SCORE;
        }

        ((weighted_ratings / total_weight) / 5.0 * 100.0).round() as i32
    }

    /// Per-order points: +80 per delivery, +20 on-time bonus, -20 per
    /// cancellation, normalized by the maximum attainable (100 per order).
    /// Neutral 50 with no orders.
    pub fn calculate_reliability_score(&self, orders: &[OrderRecord]) -> i32 {
        if orders.is_empty() {
            return NEUTRAL_SCORE;
        }

        let mut points = 0i64;
        for order in orders {
            match order.outcome {
                OrderOutcome::Delivered { on_time } => {
                    points += 80;
                    if on_time {
                        points += 20;
                    }
                }
                OrderOutcome::Cancelled => points -= 20,
            }
        }

        let max_points = orders.len() as f64 * 100.0;
        (points as f64 / max_points * 100.0).clamp(0.0, 100.0).round() as i32
    }

    /// Trailing-window activity: each term individually capped so the
    /// total never exceeds 100.
    pub fn calculate_activity_score(&self, activity: &ActivitySnapshot) -> i32 {
        let login_score = activity.logins_30d.saturating_mul(2).min(40);
        let order_score = activity.orders_30d.saturating_mul(10).min(40);
        let message_score = activity.messages_30d.min(20);
        (login_score + order_score + message_score) as i32
    }

    /// Verified endorsements plus social graph participation, each term
    /// individually capped.
    pub fn calculate_social_score(
        &self,
        endorsements: &[Endorsement],
        social: &SocialSnapshot,
    ) -> i32 {
        let verified_endorsements = endorsements.iter().filter(|e| e.is_verified).count() as u32;
        let endorsement_score = verified_endorsements.saturating_mul(5).min(50);
        let connection_score = social.connections.saturating_mul(2).min(30);
        let participation_score = social.posts.min(20);
        (endorsement_score + connection_score + participation_score) as i32
    }
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trust::profile::{BadgeKind, MetricKind};
    use chrono::Duration;

    fn metric(kind: MetricKind, value: f64, max: f64, weight: f64) -> TrustMetric {
        TrustMetric::new("user_1", kind, value, max, weight)
    }

    fn review(rating: u8, age_days: i64) -> ReviewRecord {
        ReviewRecord {
            review_id: format!("rev_{rating}_{age_days}"),
            author_id: "author".to_string(),
            subject_id: "user_1".to_string(),
            rating,
            verified_purchase: true,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn order(outcome: OrderOutcome) -> OrderRecord {
        OrderRecord {
            order_id: "order".to_string(),
            user_id: "user_1".to_string(),
            outcome,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_trust_score_neutral_without_metrics() {
        let agg = ScoreAggregator::default();
        assert_eq!(agg.calculate_trust_score(&[], &[], Utc::now()), 50);
    }

    #[test]
    fn test_trust_score_badge_bonus() {
        let agg = ScoreAggregator::default();
        let badges = vec![
            VerificationBadge::verified("user_1", BadgeKind::Identity, None),
            VerificationBadge::verified("user_1", BadgeKind::Email, None),
        ];
        // No metrics: base 50, identity +10, email +2.
        assert_eq!(agg.calculate_trust_score(&[], &badges, Utc::now()), 62);
    }

    #[test]
    fn test_trust_score_bounded_for_any_weights() {
        let agg = ScoreAggregator::default();
        let now = Utc::now();
        let cases: Vec<Vec<TrustMetric>> = vec![
            vec![],
            vec![metric(MetricKind::DisputeRate, 100.0, 100.0, -2.0)],
            vec![
                metric(MetricKind::TransactionCount, 500.0, 100.0, 1.0),
                metric(MetricKind::CompletionRate, 100.0, 100.0, 2.0),
            ],
            vec![
                metric(MetricKind::DisputeRate, 90.0, 100.0, -5.0),
                metric(MetricKind::ResponseTimeHours, 48.0, 48.0, -0.5),
            ],
            vec![metric(MetricKind::CustomerSatisfaction, -3.0, 5.0, 2.5)],
        ];
        for metrics in &cases {
            let score = agg.calculate_trust_score(metrics, &[], now);
            assert!((0..=100).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn test_trust_score_all_negative_clamps_to_zero() {
        let agg = ScoreAggregator::default();
        let metrics = vec![metric(MetricKind::DisputeRate, 100.0, 100.0, -2.0)];
        assert_eq!(agg.calculate_trust_score(&metrics, &[], Utc::now()), 0);
    }

    #[test]
    fn test_reputation_five_perfect_reviews_today() {
        let agg = ScoreAggregator::default();
        let reviews: Vec<_> = (0..5).map(|_| review(5, 0)).collect();
        assert_eq!(agg.calculate_reputation_score(&reviews, Utc::now()), 100);
    }

    #[test]
    fn test_reputation_neutral_without_reviews() {
        let agg = ScoreAggregator::default();
        assert_eq!(agg.calculate_reputation_score(&[], Utc::now()), 50);
    }

    #[test]
    fn test_reputation_recency_weighting() {
        let agg = ScoreAggregator::default();
        // A recent 5-star outweighs an old 1-star.
        let reviews = vec![review(5, 1), review(1, 720)];
        let score = agg.calculate_reputation_score(&reviews, Utc::now());
        assert!(score > 80, "recent review should dominate, got {score}");
    }

    #[test]
    fn test_reliability_neutral_without_orders() {
        let agg = ScoreAggregator::default();
        assert_eq!(agg.calculate_reliability_score(&[]), 50);
    }

    #[test]
    fn test_reliability_scoring() {
        let agg = ScoreAggregator::default();

        // All on-time deliveries: perfect.
        let orders = vec![
            order(OrderOutcome::Delivered { on_time: true }),
            order(OrderOutcome::Delivered { on_time: true }),
        ];
        assert_eq!(agg.calculate_reliability_score(&orders), 100);

        // One late delivery, one cancellation: (80 - 20) / 200 * 100 = 30.
        let orders = vec![
            order(OrderOutcome::Delivered { on_time: false }),
            order(OrderOutcome::Cancelled),
        ];
        assert_eq!(agg.calculate_reliability_score(&orders), 30);

        // All cancellations clamp at zero.
        let orders = vec![order(OrderOutcome::Cancelled); 3];
        assert_eq!(agg.calculate_reliability_score(&orders), 0);
    }

    #[test]
    fn test_activity_terms_capped() {
        let agg = ScoreAggregator::default();
        let activity = ActivitySnapshot {
            logins_30d: 500,
            orders_30d: 500,
            messages_30d: 500,
        };
        assert_eq!(agg.calculate_activity_score(&activity), 100);

        let light = ActivitySnapshot {
            logins_30d: 5,
            orders_30d: 2,
            messages_30d: 8,
        };
        assert_eq!(agg.calculate_activity_score(&light), 38);
    }

    #[test]
    fn test_extreme_counters_stay_capped() {
        let agg = ScoreAggregator::default();

        // 2^31 logins would wrap a plain u32 doubling to zero.
        let activity = ActivitySnapshot {
            logins_30d: 1 << 31,
            orders_30d: u32::MAX,
            messages_30d: u32::MAX,
        };
        assert_eq!(agg.calculate_activity_score(&activity), 100);

        let social = SocialSnapshot {
            connections: 1 << 31,
            posts: u32::MAX,
        };
        assert_eq!(agg.calculate_social_score(&[], &social), 50);
    }

    #[test]
    fn test_social_score() {
        let agg = ScoreAggregator::default();
        let endorsements: Vec<Endorsement> = (0..4)
            .map(|i| Endorsement {
                id: format!("end_{i}"),
                endorser_id: format!("peer_{i}"),
                endorsee_id: "user_1".to_string(),
                category: "communication".to_string(),
                rating: 5,
                comment: None,
                weight: 0.7,
                is_verified: i % 2 == 0,
                created_at: Utc::now(),
            })
            .collect();
        let social = SocialSnapshot {
            connections: 10,
            posts: 3,
        };
        // 2 verified endorsements * 5 + 10 connections * 2 + 3 posts.
        assert_eq!(agg.calculate_social_score(&endorsements, &social), 33);
    }
}
