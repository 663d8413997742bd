//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// First character of a title, used as an avatar when a project has no image.
///
/// Usage in templates: `{{ project.title|initial }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn initial(title: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(title
        .to_string()
        .trim()
        .chars()
        .next()
        .map(String::from)
        .unwrap_or_default())
}
