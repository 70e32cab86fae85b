/// Sentinel rank for missing or unrecognized hierarchy labels.
pub const WORST_REGIC_RANK: u8 = 99;

/// The REGIC urban-hierarchy vocabulary, most central first (lower rank =
/// more central). Matching is substring-based over a normalized label and
/// the first entry that matches wins, so the longer variants of "metrópole"
/// must stay ahead of the bare word.
const RANK_TABLE: [(&str, u8); 11] = [
    ("grande metrópole nacional", 1),
    ("metrópole nacional", 2),
    ("metrópole", 3),
    ("capital regional a", 4),
    ("capital regional b", 5),
    ("capital regional c", 6),
    ("centro sub-regional a", 7),
    ("centro sub-regional b", 8),
    ("centro de zona a", 9),
    ("centro de zona b", 10),
    ("centro local", 11),
];

/// Numeric rank of a REGIC hierarchy label; lower is more central.
///
/// Pure function over the label: lowercase, trim, first substring match in
/// vocabulary order. Anything unmatched (including `None`) gets
/// [`WORST_REGIC_RANK`].
pub fn regic_rank(label: Option<&str>) -> u8 {
    let Some(label) = label else { return WORST_REGIC_RANK };
    let normalized = label.to_lowercase();
    let normalized = normalized.trim();

    RANK_TABLE
        .iter()
        .find(|(pattern, _)| normalized.contains(pattern))
        .map(|&(_, rank)| rank)
        .unwrap_or(WORST_REGIC_RANK)
}
