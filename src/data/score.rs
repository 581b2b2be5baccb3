//! Score string parsing

/// Parse a compact "home-away" score such as `"101-97"`.
///
/// Returns `None` for anything that is not exactly two non-negative
/// integers around a single `-`.
pub fn parse_score(score: &str) -> Option<(u32, u32)> {
    let mut parts = score.split('-');
    let home = parts.next()?.trim().parse().ok()?;
    let away = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((home, away))
}
