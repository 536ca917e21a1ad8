/// Interprets a raw cell as a number.
///
/// All whitespace is stripped and the first decimal comma becomes a decimal
/// point. Only finite values count; empty input is not a number.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let normalized = compact.replacen(',', ".", 1);
    normalized
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

pub fn is_numeric(value: &str) -> bool {
    parse_numeric(value).is_some()
}
