//! Turns the backend's loosely-shaped payload into canonical [`QueryResult`]s.
//!
//! Every function here is total: malformed input degrades to defaults.

use serde_json::Value;

use crate::models::{
    QueryResult, RatingCategory, RawPayload, RawRecommendation, Recommendation, RecommendationId,
};

pub const UNTITLED: &str = "Título no disponible";
pub const UNKNOWN_STATUS: &str = "Unknown";
const HIGHLIGHTED_COUNT: usize = 3;

/// Builds a [`QueryResult`] from a raw payload, preserving arrival order
pub fn normalize(raw: &RawPayload, original_anime: &str) -> QueryResult {
    let Some(entries) = raw.0.get("recommendations").and_then(Value::as_array) else {
        tracing::warn!(anime = %original_anime, "No recommendations array in response");
        return QueryResult::empty(original_anime);
    };

    let recommendations: Vec<Recommendation> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            // Non-object entries decode as all-missing and fall back to defaults
            let raw = serde_json::from_value::<RawRecommendation>(entry.clone()).unwrap_or_default();
            normalize_entry(&raw, index)
        })
        .collect();

    tracing::debug!(
        anime = %original_anime,
        results = recommendations.len(),
        "Normalized recommendations"
    );

    QueryResult::new(original_anime, recommendations)
}

fn normalize_entry(raw: &RawRecommendation, index: usize) -> Recommendation {
    let name = [&raw.anime_name, &raw.name, &raw.title]
        .into_iter()
        .find_map(|field| non_empty_text(field.as_ref()))
        .unwrap_or_else(|| UNTITLED.to_string());

    let rating = normalize_rating(raw.rating.as_ref().unwrap_or(&Value::Null));

    Recommendation {
        id: source_id(raw.id.as_ref()).unwrap_or(RecommendationId::Position(index)),
        name,
        similarity: normalize_similarity(raw.similarity_score.as_ref().unwrap_or(&Value::Null)),
        rating,
        rating_category: RatingCategory::from_rating(rating),
        genres: normalize_genres(raw.genres.as_ref()),
        year: positive_integer(raw.year.as_ref()).and_then(|y| i32::try_from(y).ok()),
        episodes: positive_integer(raw.episodes.as_ref()).and_then(|e| u32::try_from(e).ok()),
        status: non_empty_text(raw.status.as_ref()).unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
        synopsis: non_empty_text(raw.synopsis.as_ref()).unwrap_or_default(),
        image_url: non_empty_text(raw.image_url.as_ref())
            .or_else(|| non_empty_text(raw.image_url_camel.as_ref())),
        rank: positive_integer(raw.rank.as_ref())
            .and_then(|r| u32::try_from(r).ok())
            .unwrap_or(index as u32 + 1),
        is_highlighted: index < HIGHLIGHTED_COUNT,
    }
}

/// Similarity as an integer percentage.
///
/// Values at or below 1 are fractions and get scaled by 100; anything else is
/// already a percentage. Non-numeric input yields 0.
pub fn normalize_similarity(value: &Value) -> u8 {
    let Some(similarity) = parse_number(value) else {
        return 0;
    };

    let percent = if similarity <= 1.0 {
        (similarity * 100.0).round()
    } else {
        similarity.round()
    };
    percent.clamp(0.0, 100.0) as u8
}

/// Rating clamped to `0.0..=10.0` and rounded to one decimal. Non-numeric input yields 0.0.
pub fn normalize_rating(value: &Value) -> f64 {
    let Some(rating) = parse_number(value) else {
        return 0.0;
    };
    (rating.clamp(0.0, 10.0) * 10.0).round() / 10.0
}

/// Lenient numeric read: JSON numbers as-is, strings by their leading numeric prefix.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let candidate_len = text
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;

    // Longest prefix that still parses, so "7.5/10" reads as 7.5
    (1..=candidate_len)
        .rev()
        .find_map(|len| text[..len].parse::<f64>().ok())
}

fn positive_integer(value: Option<&Value>) -> Option<u64> {
    let number = match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 1.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    number.filter(|n| *n >= 1)
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

fn source_id(value: Option<&Value>) -> Option<RecommendationId> {
    match value? {
        // A zero id counts as absent
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(RecommendationId::Source(n.to_string())),
        other => non_empty_text(Some(other)).map(RecommendationId::Source),
    }
}

fn normalize_genres(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut genres: Vec<String> = Vec::with_capacity(items.len());
    for genre in items.iter().filter_map(|g| non_empty_text(Some(g))) {
        if !genres.contains(&genre) {
            genres.push(genre);
        }
    }
    genres
}
