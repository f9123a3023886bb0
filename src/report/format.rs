//! Display formatting for report values

/// Default currency symbol for monetary columns
pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";

/// A fraction as a percentage with four decimals: `0.01` -> `1.0000%`
pub fn format_percent(value: f64) -> String {
    format!("{:.4}%", value * 100.0)
}

/// An amount with two decimals behind a currency symbol: `€50.00`
pub fn format_currency(value: f64, symbol: &str) -> String {
    format!("{}{:.2}", symbol, value)
}
