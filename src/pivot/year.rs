// src/pivot/year.rs

// Two-digit years below this are 20xx, the rest 19xx
const CENTURY_PIVOT: u16 = 50;

/// Canonical 4-digit year of a composite `"<metric>_<period>"` field name.
///
/// The period is the text after the last `_`. For `Mar-23` or `2023-24` the
/// part after the first dash is used, otherwise the last two characters
/// (`Mar 2023` → `23`). Returns `None` for anything that is not two or four
/// ASCII digits after that step.
pub fn year_of_field(field: &str) -> Option<u16> {
    let (_, period) = field.rsplit_once('_')?;

    let token = match period.split_once('-') {
        Some((_, tail)) => tail.split('-').next().unwrap_or(tail),
        None => last_two_chars(period),
    };

    full_year(token)
}

/// Expands a two-digit year with the fixed 50 boundary; four digits pass through.
pub fn full_year(token: &str) -> Option<u16> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u16 = token.parse().ok()?;
    match token.len() {
        2 if value < CENTURY_PIVOT => Some(2000 + value),
        2 => Some(1900 + value),
        4 => Some(value),
        _ => None,
    }
}

/// Metric part of a composite field name (everything before the last `_`).
pub fn base_metric(field: &str) -> Option<&str> {
    field.rsplit_once('_').map(|(metric, _)| metric)
}

fn last_two_chars(s: &str) -> &str {
    match s.char_indices().rev().nth(1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_digit_boundary() {
        assert_eq!(full_year("23"), Some(2023));
        assert_eq!(full_year("99"), Some(1999));
        assert_eq!(full_year("49"), Some(2049));
        assert_eq!(full_year("50"), Some(1950));
        assert_eq!(full_year("00"), Some(2000));
    }

    #[test]
    fn every_two_digit_token_follows_the_rule() {
        for y in 0u16..100 {
            let expected = if y < 50 { 2000 + y } else { 1900 + y };
            assert_eq!(full_year(&format!("{:02}", y)), Some(expected));
        }
    }

    #[test]
    fn period_token_forms() {
        assert_eq!(year_of_field("Sales_Mar-23"), Some(2023));
        assert_eq!(year_of_field("Sales_2023-24"), Some(2024));
        assert_eq!(year_of_field("Reserves_Mar 2023"), Some(2023));
        assert_eq!(year_of_field("Net Cash Flow_2019"), Some(2019));
        assert_eq!(year_of_field("Promoters_Dec-1999"), Some(1999));
        assert_eq!(year_of_field("OPM %_Sep 1998"), Some(1998));
    }

    #[test]
    fn unparseable_tokens_are_none() {
        assert_eq!(year_of_field("Company Name"), None);
        assert_eq!(year_of_field("Sales_TTM"), None);
        assert_eq!(year_of_field("Sales_"), None);
        assert_eq!(year_of_field("Sales_Mar-"), None);
        assert_eq!(year_of_field("Sales_Mar-2x"), None);
        assert_eq!(year_of_field("Sales_Mar-123"), None);
    }

    #[test]
    fn base_metric_strips_only_the_last_segment() {
        assert_eq!(base_metric("Sales_Mar-23"), Some("Sales"));
        assert_eq!(base_metric("Cash_Flow_Mar-23"), Some("Cash_Flow"));
        assert_eq!(base_metric("Sales"), None);
    }
}
