use crate::territory::MunAttributes;

/// Maximum attainable infrastructure score.
pub const SEAT_SCORE_MAX: u8 = 2;

/// Top-tier tourism category (normalized); only this tier scores.
const TOURISM_TOP_TIER: &str = "1 - município turístico";

/// Infrastructure score of a seat: +1 for a commercial airport, +1 for the
/// top-tier tourism classification. Range 0..=2.
pub fn seat_score(attrs: &MunAttributes) -> u8 {
    let mut score = 0;
    if attrs.has_airport() {
        score += 1;
    }
    if attrs
        .tourism
        .as_deref()
        .is_some_and(|t| t.to_lowercase().contains(TOURISM_TOP_TIER))
    {
        score += 1;
    }
    score
}
