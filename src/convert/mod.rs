use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Separator used to split list properties when the caller gives none.
pub const LIST_SEPARATOR: &str = ",";

/// Separator between a key and its value in section attributes.
pub const ASSIGN_SEPARATOR: &str = "=";

/// Lowercase literals accepted as `true`.
pub const TRUE_VALUES: [&str; 4] = ["yes", "y", "true", "1"];

/// Lowercase literals accepted as `false`.
pub const FALSE_VALUES: [&str; 4] = ["no", "n", "false", "0"];

/// Errors raised when a raw property value cannot be converted to a typed value.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The text is not one of the recognized boolean literals.
    #[error("Invalid boolean data: {0:?}")]
    InvalidBoolean(String),
    /// The text is not a valid integer for the requested width.
    #[error("Invalid integer data: {0}")]
    InvalidInteger(#[from] ParseIntError),
    /// The text is not a valid floating-point number.
    #[error("Invalid float data: {0}")]
    InvalidFloat(#[from] ParseFloatError),
}

/// Strips one pair of surrounding double quotes.
///
/// The value is returned unchanged unless it both starts and ends with `"`
/// and is at least two characters long.
///
/// # Arguments
///
/// * `data` - The raw text to clean.
///
/// # Returns
///
/// The inner text when the value is fully quoted, otherwise `data` itself.
pub fn clean_string(data: &str) -> &str {
    if data.len() >= 2 && data.starts_with('"') && data.ends_with('"') {
        &data[1..data.len() - 1]
    } else {
        data
    }
}

/// Parses a boolean literal.
///
/// The input is trimmed and lowercased, then matched against [`TRUE_VALUES`]
/// and [`FALSE_VALUES`].
///
/// # Errors
///
/// Returns `ConvertError::InvalidBoolean` when the text matches neither set,
/// or both.
pub fn parse_boolean(data: &str) -> Result<bool, ConvertError> {
    let normalized = data.trim().to_lowercase();
    let is_true = TRUE_VALUES.contains(&normalized.as_str());
    let is_false = FALSE_VALUES.contains(&normalized.as_str());

    match (is_true, is_false) {
        (true, false) => Ok(true),
        (false, true) => Ok(false),
        _ => Err(ConvertError::InvalidBoolean(data.to_string())),
    }
}

/// Parses a signed 8-bit integer.
///
/// # Errors
///
/// Returns `ConvertError::InvalidInteger` if the trimmed text is not a valid `i8`.
pub fn parse_byte(data: &str) -> Result<i8, ConvertError> {
    Ok(data.trim().parse::<i8>()?)
}

/// Parses a signed 16-bit integer.
///
/// # Errors
///
/// Returns `ConvertError::InvalidInteger` if the trimmed text is not a valid `i16`.
pub fn parse_short(data: &str) -> Result<i16, ConvertError> {
    Ok(data.trim().parse::<i16>()?)
}

/// Parses a signed 32-bit integer.
///
/// # Errors
///
/// Returns `ConvertError::InvalidInteger` if the trimmed text is not a valid `i32`.
pub fn parse_int(data: &str) -> Result<i32, ConvertError> {
    Ok(data.trim().parse::<i32>()?)
}

/// Parses a 32-bit float.
///
/// # Errors
///
/// Returns `ConvertError::InvalidFloat` if the trimmed text is not a valid `f32`.
pub fn parse_float(data: &str) -> Result<f32, ConvertError> {
    Ok(data.trim().parse::<f32>()?)
}

/// Parses a 64-bit float.
///
/// # Errors
///
/// Returns `ConvertError::InvalidFloat` if the trimmed text is not a valid `f64`.
pub fn parse_double(data: &str) -> Result<f64, ConvertError> {
    Ok(data.trim().parse::<f64>()?)
}

/// Parses a signed 64-bit integer.
///
/// # Errors
///
/// Returns `ConvertError::InvalidInteger` if the trimmed text is not a valid `i64`.
pub fn parse_long(data: &str) -> Result<i64, ConvertError> {
    Ok(data.trim().parse::<i64>()?)
}
