// Copyright 2026 Viktor Reusch
//
// This file is part of kml_mission_convert.
//
// kml_mission_convert is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// kml_mission_convert is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with kml_mission_convert. If not, see <https://www.gnu.org/licenses/>.

//! Display names for mission files.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Point;

/// Name used when a point has neither an annotation nor a name.
pub const UNNAMED: &str = "Unnamed";
/// Longest sanitized name in bytes, leaving room for the sequence number and
/// extension within the usual 255 byte file name limit.
pub const MAX_NAME_LEN: usize = 200;

/// First cell after a table row with a background style.
static ANNOTATION_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<tr[^>]*background[^>]*>.*?<td[^>]*>(.*?)</td>").unwrap()
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Find the annotation in the HTML `description` of a placemark.
///
/// Google Earth exports attribute tables into descriptions, with the header
/// row colored. The text of the first cell of that row is the annotation.
/// Malformed markup simply yields `None`.
///
/// # Example
/// ```
/// # use kml_mission_convert::extract_annotation;
/// #
/// let description = r#"<table><tr style="background-color:#9CBCE2">
///     <td><b>27  Grove South</b></td><td>ignored</td></tr></table>"#;
///
/// assert_eq!(extract_annotation(description).as_deref(), Some("27  Grove South"));
/// assert_eq!(extract_annotation("<p>plain text</p>"), None);
/// ```
pub fn extract_annotation(description: &str) -> Option<String> {
    let cell = ANNOTATION_CELL.captures(description)?.get(1)?.as_str();
    let text = TAG.replace_all(cell.trim(), "");
    let text = text.trim();

    (!text.is_empty()).then(|| text.to_string())
}

/// Make `name` usable as part of a file name.
///
/// Every character other than a letter, a digit or `_` is replaced by `_`.
/// Runs of underscores are kept as they are. The result is never empty and
/// is cut to at most [`MAX_NAME_LEN`] bytes.
pub fn sanitize(name: &str) -> String {
    let mut sanitized = String::new();
    for c in name.trim().chars() {
        let c = if c.is_alphanumeric() || c == '_' { c } else { '_' };
        if sanitized.len() + c.len_utf8() > MAX_NAME_LEN {
            break;
        }
        sanitized.push(c);
    }

    if sanitized.is_empty() {
        UNNAMED.to_string()
    } else {
        sanitized
    }
}

/// Pick the display name of `point` and [`sanitize`] it.
///
/// The annotation is preferred over the plain name.
pub fn resolve_name(point: &Point) -> String {
    let label = point
        .annotation
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .or_else(|| Some(point.raw_name.trim()).filter(|n| !n.is_empty()))
        .unwrap_or(UNNAMED);

    sanitize(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(raw_name: &str, annotation: Option<&str>) -> Point {
        Point {
            raw_name: raw_name.to_string(),
            annotation: annotation.map(str::to_string),
            ..Point::new(0.0, 0.0, 0.0)
        }
    }

    #[test]
    fn annotation_comes_from_first_styled_row() {
        let description = r##"
            <table>
            <tr><td>unstyled</td></tr>
            <TR BGCOLOR="#E3E3F3" STYLE="BACKGROUND-COLOR:#E3E3F3">
                <TD ALIGN="center">  Station 4  </TD>
                <td>second</td>
            </TR>
            <tr style="background-color:#fff"><td>later</td></tr>
            </table>"##;

        assert_eq!(extract_annotation(description).as_deref(), Some("Station 4"));
    }

    #[test]
    fn annotation_tolerates_broken_markup() {
        assert_eq!(extract_annotation(""), None);
        assert_eq!(extract_annotation("<tr style=\"background:red\"><td>"), None);
        assert_eq!(extract_annotation("<tr style=\"background:red\"><td> <i></i> </td>"), None);
        assert_eq!(extract_annotation("<td>no row</td>"), None);
    }

    #[test]
    fn sanitize_replaces_each_character() {
        assert_eq!(sanitize("Info Center"), "Info_Center");
        assert_eq!(sanitize("27  Grove South"), "27__Grove_South");
        assert_eq!(sanitize("  padded\t"), "padded");
        assert_eq!(sanitize("a/b\\c.kml"), "a_b_c_kml");
        assert_eq!(sanitize("Zürich_Nord"), "Zürich_Nord");
    }

    #[test]
    fn sanitize_is_total() {
        let inputs = ["", "   ", "\n", "---", "../..", "名前", "a b", "<&>", "\u{0}"];

        for input in inputs {
            let sanitized = sanitize(input);
            assert!(!sanitized.is_empty(), "empty result for {input:?}");
            assert!(
                sanitized.chars().all(|c| c.is_alphanumeric() || c == '_'),
                "invalid character in {sanitized:?}"
            );
        }
        assert_eq!(sanitize("   "), UNNAMED);
    }

    #[test]
    fn sanitize_caps_length() {
        let paragraph = "Long header cell text. ".repeat(40);
        let sanitized = sanitize(&paragraph);
        assert_eq!(sanitized.len(), MAX_NAME_LEN);
        assert!(sanitized.starts_with("Long_header_cell_text__"));

        // Multi-byte characters are never split.
        let umlauts = sanitize(&"ü".repeat(MAX_NAME_LEN));
        assert_eq!(umlauts.len(), MAX_NAME_LEN);
        assert_eq!(sanitize(&"ü".repeat(MAX_NAME_LEN + 1)).len(), MAX_NAME_LEN);
        let odd = sanitize(&format!("a{}", "ü".repeat(MAX_NAME_LEN)));
        assert_eq!(odd.len(), MAX_NAME_LEN - 1);
    }

    #[test]
    fn annotation_wins_over_name() {
        assert_eq!(resolve_name(&point("Plain", Some("27  Grove South"))), "27__Grove_South");
    }

    #[test]
    fn blank_annotation_falls_back_to_name() {
        assert_eq!(resolve_name(&point("Info Center", Some("  "))), "Info_Center");
        assert_eq!(resolve_name(&point("Info Center", None)), "Info_Center");
    }

    #[test]
    fn nameless_point_gets_placeholder() {
        assert_eq!(resolve_name(&point("", None)), UNNAMED);
        assert_eq!(resolve_name(&point(" \t ", Some(""))), UNNAMED);
    }
}
