// src/app/utils.rs
use once_cell::sync::Lazy;
use regex::Regex;

static RUNTIME_MINUTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*(?:min)?").expect("valid runtime regex"));

/// OMDb spells missing values as `"N/A"`; treat those (and blanks) as absent.
pub fn field_exists(s: &str) -> bool {
    let t = s.trim();
    !t.is_empty() && t != "N/A" && t != "NaN"
}

/// `Some(owned)` when the wire field carries a real value.
pub fn present(s: Option<String>) -> Option<String> {
    s.filter(|v| field_exists(v))
        .map(|v| v.trim().to_string())
}

/// "148 min" → 148
pub fn parse_runtime_minutes(s: &str) -> Option<u32> {
    if !field_exists(s) {
        return None;
    }
    RUNTIME_MINUTES_RE
        .captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// "8.8" → 8.8; "N/A" and non-finite encodings → None
pub fn parse_rating(s: &str) -> Option<f32> {
    if !field_exists(s) {
        return None;
    }
    s.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

/// "1,234" → 1234. Unparsable counts read as zero.
pub fn parse_total_results(s: Option<&str>) -> u32 {
    s.map(|t| t.trim().replace(',', ""))
        .and_then(|t| t.parse().ok())
        .unwrap_or(0)
}

/// Mean of `values` rounded to the nearest integer.
///
/// Missing or non-finite entries still count towards the divisor but add 0.
pub fn calc_average<I>(values: I) -> i64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let values: Vec<Option<f64>> = values.into_iter().collect();
    if values.is_empty() {
        return 0;
    }
    let n = values.len() as f64;
    let mean = values
        .iter()
        .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0) / n)
        .sum::<f64>();
    mean.round() as i64
}

pub fn poster_title_line(title: &str, year: &str) -> String {
    if field_exists(year) {
        format!("{title} ({year})")
    } else {
        title.to_string()
    }
}
