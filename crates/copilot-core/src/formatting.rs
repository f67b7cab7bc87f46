use crate::models::Runway;

/// Fixed-point number with comma thousands separators.
///
/// Rounding is half-to-even on the exact binary value, and negative values
/// that round to zero keep their sign.
///
/// # Examples
///
/// ```
/// use copilot_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(2.5, 0), "2");
/// assert_eq!(format_number(-0.4, 0), "-0");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }

    let fixed = format!("{:.*}", decimals as usize, value);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };

    match digits.split_once('.') {
        Some((whole, frac)) => format!("{sign}{}.{frac}", group_thousands(whole)),
        None => format!("{sign}{}", group_thousands(digits)),
    }
}

/// Whole-dollar amount with thousands separators.
///
/// Losses keep the sign after the dollar sign.
///
/// # Examples
///
/// ```
/// use copilot_core::formatting::format_usd;
///
/// assert_eq!(format_usd(1100.0000000000002), "$1,100");
/// assert_eq!(format_usd(0.0), "$0");
/// assert_eq!(format_usd(-2500.4), "$-2,500");
/// ```
pub fn format_usd(amount: f64) -> String {
    format!("${}", format_number(amount, 0))
}

/// Runway in months with one decimal place, `inf` when unbounded.
///
/// # Examples
///
/// ```
/// use copilot_core::formatting::format_runway;
/// use copilot_core::models::Runway;
///
/// assert_eq!(format_runway(Runway::Months(12.34)), "12.3");
/// assert_eq!(format_runway(Runway::Infinite), "inf");
/// ```
pub fn format_runway(runway: Runway) -> String {
    match runway {
        Runway::Months(months) => format_number(months, 1).replace(',', ""),
        Runway::Infinite => "inf".to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn non_finite(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}

/// `"1234567"` -> `"1,234,567"`.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
