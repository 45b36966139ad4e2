// Human-readable byte sizes ("100mb", "2g") for the max file size option

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ByteSizeError {
    #[error("size cannot be empty")]
    Empty,

    #[error("size '{0}' does not contain a numeric part")]
    MissingNumber(String),

    #[error("unknown storage unit '{unit}' in '{input}'")]
    UnknownUnit { unit: String, input: String },

    #[error("size '{0}' is too large to be represented")]
    Overflow(String),
}

const KIB: u64 = 1024;

fn multiplier(unit: &str) -> Option<u64> {
    match unit {
        "" | "b" => Some(1),
        "k" | "kb" => Some(KIB),
        "m" | "mb" => Some(KIB.pow(2)),
        "g" | "gb" => Some(KIB.pow(3)),
        "t" | "tb" => Some(KIB.pow(4)),
        _ => None,
    }
}

/// Parse a size such as `100mb`, `2G` or `512` into bytes
///
/// Case-insensitive, surrounding whitespace ignored, units are powers of 1024.
pub fn parse_byte_size(input: &str) -> Result<u64, ByteSizeError> {
    let s = input.trim().to_ascii_lowercase();
    if s.is_empty() {
        return Err(ByteSizeError::Empty);
    }

    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    if number.is_empty() {
        return Err(ByteSizeError::MissingNumber(input.to_string()));
    }

    let multiplier = multiplier(unit).ok_or_else(|| ByteSizeError::UnknownUnit {
        unit: unit.to_string(),
        input: input.to_string(),
    })?;

    // Digits only at this point, so a parse failure means overflow
    let number: u64 = number
        .parse()
        .map_err(|_| ByteSizeError::Overflow(input.to_string()))?;

    number
        .checked_mul(multiplier)
        .ok_or_else(|| ByteSizeError::Overflow(input.to_string()))
}
