//! Quality Scorer
//!
//! Deterministic 0-100 heuristic over article length, title length and
//! category. Used to estimate the reward for publishing.
//!
//! # Scoring Algorithm
//! - **Content length** (max 50): linear 0→20 over 0..500 characters,
//!   20→40 over 500..2000, 40→50 over 2000..5000, 50 from 5000 on
//! - **Title length** (max 25): linear 0→15 over 0..20 characters,
//!   15→25 over 20..60, then decays 25→20 over 60..100, 20 from 100 on
//! - **Category** (10): flat bonus for a known category
//!
//! Final score = round(sum), capped at 100. Lengths count Unicode scalar values.

use mblog_common::Category;

/// Maximum content-length contribution
pub const CONTENT_POINTS_MAX: f64 = 50.0;

/// Category bonus
pub const CATEGORY_POINTS: f64 = 10.0;

/// Fields the score is computed from
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub category: &'a str,
}

/// Content-length contribution
pub fn content_points(length: usize) -> f64 {
    let len = length as f64;
    if length == 0 {
        0.0
    } else if length < 500 {
        len / 500.0 * 20.0
    } else if length < 2000 {
        20.0 + (len - 500.0) / 1500.0 * 20.0
    } else if length < 5000 {
        40.0 + (len - 2000.0) / 3000.0 * 10.0
    } else {
        CONTENT_POINTS_MAX
    }
}

/// Title-length contribution; overly long titles are penalised
pub fn title_points(length: usize) -> f64 {
    let len = length as f64;
    if length == 0 {
        0.0
    } else if length < 20 {
        len / 20.0 * 15.0
    } else if length < 60 {
        15.0 + (len - 20.0) / 40.0 * 10.0
    } else if length < 100 {
        25.0 - (len - 60.0) / 40.0 * 5.0
    } else {
        20.0
    }
}

/// Category bonus; unknown or empty categories earn nothing
pub fn category_points(category: &str) -> f64 {
    if category.parse::<Category>().is_ok() {
        CATEGORY_POINTS
    } else {
        0.0
    }
}

/// Compute the quality score
pub fn score(input: &ScoreInput<'_>) -> u8 {
    let total = content_points(input.content.chars().count())
        + title_points(input.title.chars().count())
        + category_points(input.category);

    total.round().clamp(0.0, 100.0) as u8
}

/// Reward estimate for a score: floor(score / 10)
pub fn tokens_for_score(score: u8) -> u32 {
    u32::from(score) / 10
}
