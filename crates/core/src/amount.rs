use rust_decimal::Decimal;
use std::str::FromStr;

/// Lenient numeric reading of a raw export amount.
///
/// Bank exports decorate amounts with currency codes, symbols, thousands
/// separators and doubled sign characters ("--40 EGP", "$1,234.56",
/// "(75.25)"). Everything except digits, the decimal point and a leading
/// sign run is stripped before parsing; anything still unparseable yields
/// `None` rather than an error; the raw string is kept alongside.
pub fn parse_lenient(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // Accounting-style parenthesised negatives.
    let (parens_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    // Collapse a run of leading minus signs into one sign bit.
    let sign_run = cleaned.chars().take_while(|c| *c == '-').count();
    let body = &cleaned[sign_run..];
    if body.is_empty() {
        return None;
    }

    let mut value = Decimal::from_str(body).ok()?;
    if sign_run > 0 || parens_negative {
        value = -value;
    }
    Some(value)
}
