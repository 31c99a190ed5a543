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

/// Turns a wire role such as `platform_admin` into `Platform admin`.
///
/// Usage in templates: `{{ admin.role|role_label }}`
#[askama::filter_fn]
pub fn role_label(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(humanize(&value.to_string()))
}

fn humanize(wire: &str) -> String {
    let spaced = wire.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
