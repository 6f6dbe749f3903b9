pub mod performance;
pub mod sheet;

use std::str::FromStr;

use crate::error::AnalysisError;

/// Split a record into exactly `expected` whitespace-separated fields.
///
/// `line_no` is 1-based and only used for error reporting.
pub(crate) fn record_fields<'a>(
    line_no: usize,
    line: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, AnalysisError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Err(AnalysisError::malformed(line_no, line, "blank line"));
    }
    if fields.len() != expected {
        return Err(AnalysisError::malformed(
            line_no,
            line,
            format!("expected {} fields, found {}", expected, fields.len()),
        ));
    }
    Ok(fields)
}

pub(crate) fn parse_field<T: FromStr>(
    line_no: usize,
    line: &str,
    field: &str,
    what: &str,
) -> Result<T, AnalysisError> {
    field
        .parse::<T>()
        .map_err(|_| AnalysisError::malformed(line_no, line, format!("invalid {}: {}", what, field)))
}

/// Like [`parse_field`] for `f64`, but `NaN` and infinities are malformed.
pub(crate) fn parse_finite(
    line_no: usize,
    line: &str,
    field: &str,
    what: &str,
) -> Result<f64, AnalysisError> {
    let value: f64 = parse_field(line_no, line, field, what)?;
    if !value.is_finite() {
        return Err(AnalysisError::malformed(
            line_no,
            line,
            format!("{} must be a finite number: {}", what, field),
        ));
    }
    Ok(value)
}
