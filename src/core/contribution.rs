use crate::core::error::ContributionError;
use crate::core::progress::Amount;

/// Parses a user supplied contribution.
///
/// Surrounding whitespace is ignored and an empty field counts as a zero
/// contribution. Anything else must be a finite, non-negative decimal
/// number, optionally with an exponent (`1.5e6`).
pub fn parse_contribution(raw: &str) -> Result<Amount, ContributionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let value = trimmed.parse::<Amount>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ContributionError::NotANumber(raw.to_owned()))?;

    if value < 0.0 {
        return Err(ContributionError::Negative(value));
    }
    // -0 parses fine and compares equal to 0; store it without the sign
    return Ok(value + 0.0);
}
