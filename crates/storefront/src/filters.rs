//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the URL of the stylesheet, content-hashed when available.
///
/// Usage in templates: `{{ ""|css_path }}`
#[askama::filter_fn]
pub fn css_path(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(asset_path("css", "main", "css", env!("CSS_HASH")))
}

/// Returns the URL of the client script, content-hashed when available.
///
/// Usage in templates: `{{ ""|js_path }}`
#[askama::filter_fn]
pub fn js_path(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(asset_path("js", "app", "js", env!("JS_HASH")))
}

/// Formats a wire date (`YYYY-MM-DD`) as e.g. `Sun 18 Oct 2026`.
///
/// Anything that does not parse is shown unchanged.
///
/// Usage in templates: `{{ order.pickup_date|pretty_date }}`
#[askama::filter_fn]
pub fn pretty_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_date(&value.to_string()))
}

/// Whether a cart count is above zero. Takes the count by value or by
/// reference, since `let` bindings in templates hold references.
///
/// Usage in templates: `{% if count|has_items %}`
#[askama::filter_fn]
pub fn has_items(value: impl Display, _env: &dyn askama::Values) -> askama::Result<bool> {
    Ok(nonzero_count(&value.to_string()))
}

fn nonzero_count(rendered: &str) -> bool {
    rendered.parse::<u32>().is_ok_and(|n| n > 0)
}

fn asset_path(dir: &str, stem: &str, ext: &str, hash: &str) -> String {
    if hash.is_empty() {
        format!("/static/{dir}/{stem}.{ext}")
    } else {
        format!("/static/{dir}/derived/{stem}.{hash}.{ext}")
    }
}

fn format_date(raw: &str) -> String {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_or_else(|_| raw.to_string(), |d| d.format("%a %-d %b %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_path() {
        assert_eq!(asset_path("css", "main", "css", ""), "/static/css/main.css");
        assert_eq!(
            asset_path("js", "app", "js", "abcd1234"),
            "/static/js/derived/app.abcd1234.js"
        );
    }

    #[test]
    fn test_nonzero_count() {
        assert!(nonzero_count(&3_u32.to_string()));
        assert!(nonzero_count(&(&1_u32).to_string()));
        assert!(!nonzero_count(&0_u32.to_string()));
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-10-18"), "Sun 18 Oct 2026");
        assert_eq!(format_date("soon"), "soon");
    }
}
