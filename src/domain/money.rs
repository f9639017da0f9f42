//! Money formatting with thousands separators.

/// Format `amount` with two decimals and comma grouping, e.g. `₦1,234,567.89`.
///
/// Negative amounts keep the sign in front of the symbol (`-$12.50`).
#[must_use]
pub fn format_money(symbol: &str, amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0.00" is not worth a sign.
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{frac_part}")
}
