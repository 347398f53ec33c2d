use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a command-line value cannot be parsed as an amount.
#[derive(Debug, Error)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Trims whitespace, an optional `R$` prefix and comma thousands separators.
fn normalize_amount_input(s: &str) -> String {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed);
    trimmed.trim().replace(',', "")
}

/// Parses an amount such as `5000`, `5,000.00` or `R$ 5,000.00`.
///
/// Used as a `clap` value parser, so range checks are left to the engine's
/// validators.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    normalized.parse().map_err(|source| {
        tracing::debug!(input = %s, "rejected amount");
        ParseAmountError::Invalid {
            input: s.to_string(),
            source,
        }
    })
}
