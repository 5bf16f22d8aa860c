//! General numeric formatting, in the style of C's `%g`

/// Significant digits used by `format_general`
pub const GENERAL_DIGITS: usize = 6;

/// Format with 6 significant digits (`%g`)
pub fn format_general(value: f64) -> String {
    format_significant(value, GENERAL_DIGITS)
}

/// Format with `digits` significant digits, trailing zeros removed.
/// Scientific notation is used when the exponent is below -4 or at
/// least `digits`.
pub fn format_significant(value: f64, digits: usize) -> String {
    let digits = digits.max(1);

    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Round first: the exponent after rounding decides the notation
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= digits as i32 {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        )
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
