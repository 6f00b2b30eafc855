//! Named plot colors.

/// Used when a plot statement carries no color.
pub const DEFAULT_COLOR: &str = "#2962FF";

const NAMESPACE: &str = "color.";

const NAMED_COLORS: [(&str, &str); 8] = [
    ("color.purple", "#A020F0"),
    ("color.blue", "#2962FF"),
    ("color.red", "#FF0000"),
    ("color.green", "#00FF00"),
    ("color.orange", "#FFA500"),
    ("color.yellow", "#FFFF00"),
    ("color.aqua", "#00FFFF"),
    ("color.white", "#FFFFFF"),
];

/// Resolve a color specifier such as `color.red` to a hex string.
///
/// A leading `color=` is accepted and ignored. Unknown `color.<x>` symbols
/// become `#<x>`; anything else is used verbatim.
pub fn resolve_color(fragment: Option<&str>) -> String {
    let Some(fragment) = fragment else {
        return DEFAULT_COLOR.to_string();
    };
    let value = match fragment.split_once('=') {
        Some((key, value)) if key.trim() == "color" => value.trim(),
        _ => fragment.trim(),
    };

    if let Some((_, hex)) = NAMED_COLORS.iter().find(|(name, _)| *name == value) {
        return (*hex).to_string();
    }
    match value.strip_prefix(NAMESPACE) {
        Some(rest) => format!("#{rest}"),
        None => value.to_string(),
    }
}
