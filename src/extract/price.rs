/// Parse a raw price string into a realistic product price.
///
/// Strips `,`/`$`/surrounding whitespace and parses as a float. Only values
/// in `0.50..=50000.00` pass; broad text scans otherwise pick up phone
/// numbers, item counts and years. Rejection is a normal no-price outcome,
/// not an error.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "").replace('$', "");
    let value: f64 = cleaned.trim().parse().ok()?;
    (0.5..=50_000.0).contains(&value).then_some(value)
}
