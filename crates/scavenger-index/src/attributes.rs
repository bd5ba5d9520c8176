//! Inline document attributes such as `Title - Graph search;`.

/// Longest attribute, counted from its name to the terminating `;`.
pub const MAX_ATTRIBUTE_SPAN: usize = 500;

/// Returns the trimmed value of the first `<name> - <value>;` in `content`.
///
/// Only the first occurrence of `"<name> - "` is considered. There is no
/// value when the `;` is missing or lies more than [`MAX_ATTRIBUTE_SPAN`]
/// characters from the start of the attribute.
pub fn extract_attribute(content: &str, name: &str) -> Option<String> {
    let marker = format!("{name} - ");
    let start = content.find(&marker)?;
    let value_start = start + marker.len();
    let value_len = content[value_start..].find(';')?;
    let value_end = value_start + value_len;
    if content[start..value_end].chars().count() > MAX_ATTRIBUTE_SPAN {
        return None;
    }
    Some(content[value_start..value_end].trim().to_string())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extracts_trimmed_value() {
        let content = "// Title -  Shortest paths ;\n// Description - Dijkstra over a heap;\n";
        assert_eq!(
            extract_attribute(content, "Title").as_deref(),
            Some("Shortest paths")
        );
        assert_eq!(
            extract_attribute(content, "Description").as_deref(),
            Some("Dijkstra over a heap")
        );
    }

    #[test]
    fn missing_marker_or_terminator() {
        assert_eq!(extract_attribute("no attributes here", "Title"), None);
        assert_eq!(extract_attribute("Title - never ends", "Title"), None);
        assert_eq!(extract_attribute("Title-tight;", "Title"), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let content = "Title - first; Title - second;";
        assert_eq!(extract_attribute(content, "Title").as_deref(), Some("first"));
    }

    #[test]
    fn overlong_values_are_rejected() {
        let value = "x".repeat(MAX_ATTRIBUTE_SPAN);
        let content = format!("Title - {value};");
        assert_eq!(extract_attribute(&content, "Title"), None);

        let value = "x".repeat(MAX_ATTRIBUTE_SPAN - "Title - ".len());
        let content = format!("Title - {value};");
        assert_eq!(extract_attribute(&content, "Title"), Some(value));
    }

    #[test]
    fn empty_value_is_kept() {
        assert_eq!(extract_attribute("Title - ;", "Title").as_deref(), Some(""));
    }
}
