//! Local fallback computations used when the remote model cannot answer
//!
//! Mirrors the pipeline's semantics without a model: keyword category
//! prediction, bounded randomized profile defaults, canned comparable items,
//! and the threshold verdict rule. Callers pass the RNG in so tests can seed
//! it; production providers hold an entropy-seeded StdRng.

use chrono::Local;
use extvet_common::models::{Category, Extension, Verdict};
use rand::Rng;
use uuid::Uuid;

/// Minimum rating for a fallback approval
pub const MIN_APPROVAL_RATING: f64 = 4.0;
/// Minimum user base for a fallback approval
pub const MIN_APPROVAL_USERS: u64 = 500_000;

/// Bounds for substituted rating defaults
pub const RATING_DEFAULT_RANGE: (f64, f64) = (3.0, 5.0);
/// Bounds for substituted user-count defaults
pub const USERS_DEFAULT_RANGE: (u64, u64) = (100_000, 1_100_000);

/// Random rating default within [3.0, 5.0], rounded to one decimal
pub fn default_rating(rng: &mut impl Rng) -> f64 {
    let raw = rng.gen_range(RATING_DEFAULT_RANGE.0..=RATING_DEFAULT_RANGE.1);
    (raw * 10.0).round() / 10.0
}

/// Random user-count default within [100_000, 1_100_000]
pub fn default_users(rng: &mut impl Rng) -> u64 {
    rng.gen_range(USERS_DEFAULT_RANGE.0..=USERS_DEFAULT_RANGE.1)
}

/// Predict a category from name keywords
pub fn predict_category(extension_name: &str) -> Category {
    let name = extension_name.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|kw| name.contains(kw));

    if contains_any(&["ad", "block", "privacy", "security"]) {
        Category::PrivacySecurity
    } else if contains_any(&["dev", "debug", "code"]) {
        Category::DeveloperTools
    } else if contains_any(&["shop", "coupon", "deal"]) {
        Category::Shopping
    } else if contains_any(&["productivity", "task", "manage"]) {
        Category::Productivity
    } else if contains_any(&["dark", "theme", "accessibility"]) {
        Category::Accessibility
    } else {
        Category::Other
    }
}

/// Canonical use-case line for a predicted category
pub fn predict_use_case(extension_name: &str) -> &'static str {
    match predict_category(extension_name) {
        Category::PrivacySecurity => "Enhance online privacy and security",
        Category::DeveloperTools => "Improve development workflow and debugging",
        Category::Shopping => "Find deals and save money while shopping",
        Category::Productivity => "Boost productivity and task management",
        Category::Accessibility => "Improve website accessibility and readability",
        Category::Entertainment | Category::Other => "General browser enhancement",
    }
}

/// Best-effort profile when the model is unavailable
pub fn fallback_profile(
    extension_id: &str,
    extension_name: &str,
    rng: &mut impl Rng,
) -> Extension {
    Extension {
        id: extension_id.to_string(),
        name: extension_name.to_string(),
        category: predict_category(extension_name),
        rating: default_rating(rng),
        description: format!("Chrome extension: {}", extension_name),
        functionality: format!("Core functionality of {}", extension_name),
        use_case: predict_use_case(extension_name).to_string(),
        users: default_users(rng),
        last_updated: today_stamp(),
    }
}

/// Canned comparable items when the model is unavailable
pub fn fallback_comparables(extension: &Extension) -> Vec<Extension> {
    vec![
        Extension {
            id: Uuid::new_v4().to_string(),
            name: format!("Alternative to {}", extension.name),
            category: extension.category,
            rating: 4.2,
            description: "Popular alternative with similar functionality".to_string(),
            functionality: "Enhanced version of similar capabilities".to_string(),
            use_case: extension.use_case.clone(),
            users: 750_000,
            last_updated: "2024-03-01".to_string(),
        },
        Extension {
            id: Uuid::new_v4().to_string(),
            name: format!("{} Pro", extension.category),
            category: extension.category,
            rating: 4.4,
            description: "Professional-grade alternative".to_string(),
            functionality: "Advanced features for power users".to_string(),
            use_case: extension.use_case.clone(),
            users: 1_200_000,
            last_updated: "2024-02-15".to_string(),
        },
        Extension {
            id: Uuid::new_v4().to_string(),
            name: format!("{} Essentials", extension.category),
            category: extension.category,
            rating: 4.1,
            description: "Lightweight alternative focused on core features".to_string(),
            functionality: "Streamlined version of similar capabilities".to_string(),
            use_case: extension.use_case.clone(),
            users: 680_000,
            last_updated: "2024-01-20".to_string(),
        },
    ]
}

/// The threshold verdict rule: approve when rating and user base clear the
/// minimums and no overlapping approved item already exists.
pub fn fallback_verdict(extension: &Extension, overlapping: &[Extension]) -> Verdict {
    let good_rating = extension.rating >= MIN_APPROVAL_RATING;
    let large_user_base = extension.users >= MIN_APPROVAL_USERS;
    let has_alternatives = !overlapping.is_empty();

    let approved = good_rating && large_user_base && !has_alternatives;

    let reason = if approved {
        format!(
            "{} meets security standards with {}/5 rating and {} users.",
            extension.name,
            extension.rating,
            format_count(extension.users)
        )
    } else if has_alternatives {
        "Pre-approved alternatives available that provide similar functionality with verified security."
            .to_string()
    } else {
        format!(
            "Extension does not meet minimum security criteria (rating: {}, users: {}).",
            extension.rating,
            format_count(extension.users)
        )
    };

    Verdict {
        approved,
        reason,
        security_concerns: None,
        alternatives: overlapping.iter().take(3).cloned().collect(),
    }
}

/// Today's date as YYYY-MM-DD
pub fn today_stamp() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Format a count with comma thousands separators (1234567 → "1,234,567")
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ext(name: &str, rating: f64, users: u64) -> Extension {
        Extension {
            id: "test0001".to_string(),
            name: name.to_string(),
            category: Category::Productivity,
            rating,
            description: String::new(),
            functionality: String::new(),
            use_case: String::new(),
            users,
            last_updated: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn category_prediction_follows_name_keywords() {
        assert_eq!(predict_category("uBlock Origin"), Category::PrivacySecurity);
        assert_eq!(predict_category("Vue DevTools"), Category::DeveloperTools);
        assert_eq!(predict_category("Coupon Finder"), Category::Shopping);
        assert_eq!(predict_category("Task Tracker"), Category::Productivity);
        assert_eq!(predict_category("Theme Switcher"), Category::Accessibility);
        assert_eq!(predict_category("Grammarly"), Category::Other);
    }

    #[test]
    fn use_case_prediction_matches_category() {
        assert_eq!(
            predict_use_case("Privacy Badger"),
            "Enhance online privacy and security"
        );
        assert_eq!(predict_use_case("Grammarly"), "General browser enhancement");
    }

    #[test]
    fn defaults_stay_inside_the_documented_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let rating = default_rating(&mut rng);
            assert!((3.0..=5.0).contains(&rating), "rating {} out of range", rating);
            assert!(
                ((rating * 10.0).round() - rating * 10.0).abs() < 1e-9,
                "rating {} has more than one decimal",
                rating
            );

            let users = default_users(&mut rng);
            assert!((100_000..=1_100_000).contains(&users), "users {} out of range", users);
        }
    }

    #[test]
    fn fallback_profile_is_fully_populated() {
        let mut rng = StdRng::seed_from_u64(42);
        let profile = fallback_profile("abc123", "Code Formatter", &mut rng);

        assert_eq!(profile.id, "abc123");
        assert_eq!(profile.category, Category::DeveloperTools);
        assert_eq!(profile.description, "Chrome extension: Code Formatter");
        assert_eq!(profile.functionality, "Core functionality of Code Formatter");
        assert!((3.0..=5.0).contains(&profile.rating));
        assert!((100_000..=1_100_000).contains(&profile.users));
    }

    #[test]
    fn fallback_comparables_stay_in_the_requested_category() {
        let requested = ext("Tab Sorter", 4.0, 900_000);
        let comparables = fallback_comparables(&requested);

        assert_eq!(comparables.len(), 3);
        assert_eq!(comparables[0].name, "Alternative to Tab Sorter");
        assert!(comparables.iter().all(|c| c.category == requested.category));
    }

    #[test]
    fn verdict_approves_above_both_thresholds_without_overlap() {
        let verdict = fallback_verdict(&ext("StandOut", 4.5, 2_000_000), &[]);
        assert!(verdict.approved);
        assert!(verdict.reason.contains("meets security standards"));
        assert!(verdict.reason.contains("2,000,000"));
        assert!(verdict.alternatives.is_empty());
    }

    #[test]
    fn verdict_denies_below_rating_threshold_with_criteria_reason() {
        let verdict = fallback_verdict(&ext("LowRated", 3.0, 2_000_000), &[]);
        assert!(!verdict.approved);
        assert!(verdict.reason.contains("minimum security criteria"));
        assert!(verdict.reason.contains("rating: 3"));
    }

    #[test]
    fn verdict_denies_when_overlapping_approved_items_exist() {
        let overlap = vec![ext("Existing", 4.8, 5_000_000)];
        let verdict = fallback_verdict(&ext("NewComer", 4.9, 9_000_000), &overlap);
        assert!(!verdict.approved);
        assert!(verdict.reason.contains("Pre-approved alternatives"));
        assert_eq!(verdict.alternatives.len(), 1);
    }

    #[test]
    fn count_formatting_inserts_thousands_separators() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
