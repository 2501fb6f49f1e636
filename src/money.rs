// Rendering constants for the fixed sq-AL / ALL currency pair. The locale
// and currency code are not configurable. The lek carries no fraction
// digits, and grouping only kicks in once the leading group would hold at
// least two digits, so four-digit amounts stay unbroken.
pub(crate) const GROUP_SEPARATOR: char = '\u{a0}';
pub(crate) const CURRENCY_SUFFIX: &str = "Lek\u{eb}";
const MIN_DIGITS_FOR_GROUPING: usize = 5;

/// Lenient leading-numeric-prefix float parse: sign, digits, fraction,
/// exponent, `Infinity`. Trailing non-numeric text is ignored; no numeric
/// prefix at all parses as NaN.
pub fn parse_price(src: &str) -> f64 {
    let src = src.trim_start();
    if src.is_empty() {
        return f64::NAN;
    }

    let bytes = src.as_bytes();
    let mut i = 0usize;

    if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    if src[i..].starts_with("Infinity") {
        return if matches!(bytes.first(), Some(b'-')) {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let mut int_digits = 0usize;
    while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
        int_digits += 1;
        i += 1;
    }

    let mut frac_digits = 0usize;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            frac_digits += 1;
            i += 1;
        }
    }

    if int_digits + frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let exp_start = i;
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }

        let mut exp_digits = 0usize;
        while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            exp_digits += 1;
            i += 1;
        }

        if exp_digits == 0 {
            i = exp_start;
        }
    }

    src[..i].parse::<f64>().unwrap_or(f64::NAN)
}

/// Lenient base-10 integer prefix parse for the cart counter. Empty or
/// non-numeric text counts as 0, so an uninitialized counter bumps to 1.
pub fn parse_count(src: &str) -> i64 {
    let src = src.trim_start();
    let bytes = src.as_bytes();
    let mut i = 0usize;

    let negative = if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
        let is_negative = bytes[i] == b'-';
        i += 1;
        is_negative
    } else {
        false
    };

    let mut value: i64 = 0;
    let mut parsed_any = false;
    while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
        parsed_any = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(bytes[i] - b'0'));
        i += 1;
    }

    if !parsed_any {
        return 0;
    }
    if negative { -value } else { value }
}

/// Canonical serialization of the raw numeric value stored in the
/// `data-amount` attribute, so reformatting reads back the same number.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == f64::INFINITY {
        return "Infinity".to_string();
    }
    if value == f64::NEG_INFINITY {
        return "-Infinity".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Formats an amount in lek the way the page renders every price: rounded to
/// whole lek, no-break-space grouping in threes once the amount reaches five
/// digits, and the currency name appended after a no-break space. Non-finite
/// amounts render their name in place of the digits, matching the page's
/// fail-closed behavior for garbage price text.
pub fn format_lek(value: f64) -> String {
    if value.is_nan() {
        return format!("NaN{GROUP_SEPARATOR}{CURRENCY_SUFFIX}");
    }
    if value == f64::INFINITY {
        return format!("\u{221e}{GROUP_SEPARATOR}{CURRENCY_SUFFIX}");
    }
    if value == f64::NEG_INFINITY {
        return format!("-\u{221e}{GROUP_SEPARATOR}{CURRENCY_SUFFIX}");
    }

    let digits = format!("{:.0}", value.abs());
    let mut out = if digits.len() >= MIN_DIGITS_FOR_GROUPING {
        let mut grouped = String::new();
        for (index, ch) in digits.chars().rev().enumerate() {
            if index > 0 && index % 3 == 0 {
                grouped.push(GROUP_SEPARATOR);
            }
            grouped.push(ch);
        }
        grouped.chars().rev().collect::<String>()
    } else {
        digits
    };

    if value.is_sign_negative() {
        out.insert(0, '-');
    }

    out.push(GROUP_SEPARATOR);
    out.push_str(CURRENCY_SUFFIX);
    out
}
