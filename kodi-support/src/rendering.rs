//! Text rendering utilities for human-friendly output.
//!
//! Provides helpers to format type names, registry listings
//! and suggestions in error messages.

/// One line of a registry listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingRow {
    /// Scope the entry lives in
    pub scope: String,
    /// Tag the entry is bound under
    pub tag: String,
    /// Holder variant (e.g. "Single", "Provider")
    pub kind: String,
}

/// Renders registry entries as an aligned table, grouped by scope.
///
/// ```text
/// [kodi.default] Single    app::Database
/// [kodi.default] Constant  api_url
/// [session]      Provider  app::Session
/// ```
///
/// Rows are sorted by scope, then tag, so output is stable
/// regardless of map iteration order.
///
/// # Examples
/// ```
/// use kodi_support::rendering::{render_bindings, BindingRow};
///
/// let rows = vec![BindingRow {
///     scope: "default".into(),
///     tag: "answer".into(),
///     kind: "Constant".into(),
/// }];
/// assert_eq!(render_bindings(&rows), "[default] Constant answer\n");
/// ```
pub fn render_bindings(rows: &[BindingRow]) -> String {
    let mut sorted: Vec<&BindingRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.scope.cmp(&b.scope).then_with(|| a.tag.cmp(&b.tag)));

    let scope_width = sorted.iter().map(|r| r.scope.len()).max().unwrap_or(0);
    let kind_width = sorted.iter().map(|r| r.kind.len()).max().unwrap_or(0);

    let mut result = String::new();
    for row in sorted {
        let scope = format!("[{}]", row.scope);
        result.push_str(&format!(
            "{:<sw$} {:<kw$} {}\n",
            scope,
            row.kind,
            row.tag,
            sw = scope_width + 2,
            kw = kind_width,
        ));
    }
    result
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use kodi_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>");
/// assert_eq!(short, "Arc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut current_segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                current_segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                result.push_str(&current_segment);
                result.push(ch);
                current_segment.clear();
            }
            _ => current_segment.push(ch),
        }
    }

    result.push_str(&current_segment);
    result
}

/// Picks the bound tags that look closest to a requested one.
///
/// Tags are usually type paths, so the comparison runs on both the
/// full string and the shortened form.
pub fn suggest_similar(requested: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    if max_suggestions == 0 || requested.is_empty() {
        return Vec::new();
    }

    let requested_lower = requested.to_lowercase();
    let requested_short = shorten_type_name(requested).to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter(|&&name| name != requested)
        .filter_map(|&name| {
            let name_lower = name.to_lowercase();
            let name_short = shorten_type_name(name).to_lowercase();

            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            if name_short.contains(&requested_short) || requested_short.contains(&name_short) {
                return Some((name, 80));
            }

            let common = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();

            if common >= 3 {
                return Some((name, common * 10));
            }

            None
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored.dedup_by(|a, b| a.0 == b.0);
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}
