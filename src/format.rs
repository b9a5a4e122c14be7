/// Whole-dollar currency string with thousands separators, e.g. `$1,235`.
pub fn usd_whole(v: f64) -> String {
    if !v.is_finite() {
        return "$0".to_string();
    }
    let rounded = v.round();
    let digits = add_commas(&format!("{:.0}", rounded.abs()));
    if rounded < 0.0 {
        format!("-${}", digits)
    } else {
        format!("${}", digits)
    }
}

/// Price with precision that scales down for sub-dollar coins.
pub fn format_price(v: f64) -> String {
    if v >= 1.0 {
        let s = format!("{:.2}", v);
        add_commas(&s)
    } else if v >= 0.01 {
        format!("{:.4}", v)
    } else if v > 0.0 {
        format!("{:.6}", v)
    } else {
        "0.00".to_string()
    }
}

pub fn add_commas(s: &str) -> String {
    let (int_part, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let mut result = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 && c != '-' {
            result.push(',');
        }
        result.push(c);
    }
    let int_formatted: String = result.chars().rev().collect();
    match frac {
        Some(f) => format!("{}.{}", int_formatted, f),
        None => int_formatted,
    }
}
