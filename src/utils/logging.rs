use serde::Serialize;

/// Characters of a raw upstream body kept in log lines.
pub(crate) const BODY_PREVIEW_CHARS: usize = 200;

/// Runs `log_action` with `value` rendered as pretty JSON, only when DEBUG is enabled.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty_json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    log_action(pretty_json.as_str());
}

/// First [`BODY_PREVIEW_CHARS`] characters of `body`.
pub(crate) fn body_preview(body: &str) -> String {
    format!("{:.len$}", body, len = BODY_PREVIEW_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        let body = "é".repeat(BODY_PREVIEW_CHARS + 10);
        let preview = body_preview(&body);
        assert_eq!(preview.chars().count(), BODY_PREVIEW_CHARS);

        assert_eq!(body_preview("short"), "short");
    }
}
