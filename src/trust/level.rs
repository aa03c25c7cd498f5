//! Trust level classification and profile-strength tiering.
//!
//! `determine_trust_level` is a pure step function over the composite
//! score. It never emits the administrative override states; preserving
//! SUSPENDED/BANNED across recomputation is the manager's responsibility.

use chrono::{DateTime, Utc};

use crate::trust::profile::{ProfileDetails, ProfileStrength, TrustLevel, VerificationBadge};

/// Map a composite trust score to its discrete level.
pub fn determine_trust_level(score: i32) -> TrustLevel {
    if score >= 90 {
        TrustLevel::Expert
    } else if score >= 80 {
        TrustLevel::Premium
    } else if score >= 70 {
        TrustLevel::Trusted
    } else if score >= 60 {
        TrustLevel::Verified
    } else if score >= 40 {
        TrustLevel::Basic
    } else {
        TrustLevel::Unverified
    }
}

/// Profile strength: 10 points per populated identity field, 5 per
/// currently valid badge.
pub fn calculate_profile_strength(
    details: Option<&ProfileDetails>,
    badges: &[VerificationBadge],
    now: DateTime<Utc>,
) -> ProfileStrength {
    let mut points = 0u32;

    if let Some(details) = details {
        let fields = [
            &details.first_name,
            &details.last_name,
            &details.email,
            &details.phone,
            &details.bio,
            &details.avatar_url,
        ];
        points += fields
            .iter()
            .filter(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
            .count() as u32
            * 10;
    }

    points += badges.iter().filter(|b| b.is_valid_at(now)).count() as u32 * 5;

    if points >= 85 {
        ProfileStrength::Excellent
    } else if points >= 70 {
        ProfileStrength::Strong
    } else if points >= 50 {
        ProfileStrength::Good
    } else if points >= 30 {
        ProfileStrength::Fair
    } else {
        ProfileStrength::Weak
    }
}
