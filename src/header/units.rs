use crate::ledger::Balance;

/// Largest number of decimals whose scale fits in a `u128`.
pub const MAX_DECIMALS: u32 = 38;

/// Formats a base-unit `amount` of a token with `decimals` decimals, rounded
/// half-up to at most `max_fraction` fraction digits, trailing zeros trimmed.
///
/// ```
/// use dao_header::header::units::format_units;
///
/// assert_eq!(format_units(1_500_000_000_000_000_000, 18, 2), "1.5");
/// assert_eq!(format_units(0, 18, 2), "0");
/// ```
#[must_use]
pub fn format_units(amount: Balance, decimals: u32, max_fraction: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let shown = max_fraction.min(decimals);

    let unit = 10_u128.pow(decimals - shown);
    let rounded = amount.saturating_add(unit / 2) / unit;
    let scale = 10_u128.pow(shown);
    let whole = rounded / scale;
    let fraction = rounded % scale;

    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0width$}", width = shown as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
