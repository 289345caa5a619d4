//! Projection of parsed review rows into documents.

use super::{Document, ReviewMetadata};
use regex::Regex;
use std::sync::OnceLock;

/// Rows with fewer fields than this are rejected.
pub const MIN_FIELDS: usize = 20;

const AIRLINE_NAME_COL: usize = 1;
const OVERALL_RATING_COL: usize = 2;
const REVIEW_TITLE_COL: usize = 3;
const REVIEW_COL: usize = 6;
const SEAT_TYPE_COL: usize = 9;
const ROUTE_COL: usize = 10;
const RECOMMENDED_COL: usize = 19;

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Normalize a raw field.
///
/// Trims, strips a leading and a trailing double quote, collapses
/// whitespace runs to a single space and trims again. Quote stripping
/// repeats while the trimmed text is still wrapped, so `clean` is
/// idempotent even for inputs like `""x""`.
pub fn clean(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    // Fields from `parse_row` never contain quotes, so on the CSV path this
    // loop runs once. Repeated stripping keeps `clean` idempotent.
    let mut trimmed = text.trim();
    loop {
        let stripped = trimmed.strip_prefix('"').unwrap_or(trimmed);
        let stripped = stripped.strip_suffix('"').unwrap_or(stripped).trim();
        if stripped.len() == trimmed.len() {
            break;
        }
        trimmed = stripped;
    }

    whitespace_run().replace_all(trimmed, " ").trim().to_string()
}

/// Parse an overall rating, falling back to `0.0`.
pub fn parse_rating(rating: Option<&str>) -> f64 {
    let cleaned = clean(rating);
    if cleaned.is_empty() {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// `true` only for a cleaned, case-insensitive `yes`.
pub fn parse_recommended(value: Option<&str>) -> bool {
    clean(value).eq_ignore_ascii_case("yes")
}

/// Build a document from a parsed row.
///
/// Returns `None` when the row is too short or its review body is empty
/// after cleaning.
pub fn build_document(fields: &[String], row_index: usize) -> Option<Document> {
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let field = |col: usize| fields.get(col).map(String::as_str);

    let review_text = clean(field(REVIEW_COL));
    if review_text.is_empty() {
        return None;
    }

    let review_title = clean(field(REVIEW_TITLE_COL));
    let content = if review_title.is_empty() {
        review_text
    } else {
        format!("{}\n\n{}", review_title, review_text)
    };

    let metadata = ReviewMetadata {
        document_id: ReviewMetadata::document_id_for(row_index),
        airline_name: clean(field(AIRLINE_NAME_COL)),
        overall_rating: parse_rating(field(OVERALL_RATING_COL)),
        review_title,
        seat_type: clean(field(SEAT_TYPE_COL)),
        route: clean(field(ROUTE_COL)),
        recommended: parse_recommended(field(RECOMMENDED_COL)),
    };

    Some(Document::new(content, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(overrides: &[(usize, &str)]) -> Vec<String> {
        let mut row = vec![String::new(); MIN_FIELDS];
        for (col, value) in overrides {
            row[*col] = value.to_string();
        }
        row
    }

    fn whitespace_count(s: &str) -> usize {
        s.chars().filter(|c| c.is_whitespace()).count()
    }

    #[test]
    fn test_clean_basic() {
        assert_eq!(clean(None), "");
        assert_eq!(clean(Some("  hello   world  ")), "hello world");
        assert_eq!(clean(Some("\"quoted\"")), "quoted");
        assert_eq!(clean(Some("  \"a\tb\n c\"  ")), "a b c");
        assert_eq!(clean(Some("\"")), "");
    }

    #[test]
    fn test_clean_nested_quotes_are_stable() {
        let once = clean(Some("\"\"twice\"\""));
        assert_eq!(once, "twice");
        assert_eq!(clean(Some("say \"hi\" there")), "say \"hi\" there");
    }

    #[test]
    fn test_clean_idempotent_and_non_increasing() {
        let samples = [
            "",
            "   ",
            "plain",
            "\"  padded inside  \"",
            "\"\" \"x\" \"\"",
            "line\none\r\ntwo\t\tthree",
            " \" lead only",
            "trail only \" ",
            "\"\"\"",
        ];

        for s in samples {
            let once = clean(Some(s));
            let twice = clean(Some(&once));
            assert_eq!(once, twice, "clean not idempotent for {:?}", s);
            assert!(whitespace_count(&once) <= whitespace_count(s));
        }
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating(Some("9")), 9.0);
        assert_eq!(parse_rating(Some(" 7.5 ")), 7.5);
        assert_eq!(parse_rating(Some("\"3\"")), 3.0);
        assert_eq!(parse_rating(Some("")), 0.0);
        assert_eq!(parse_rating(Some("n/a")), 0.0);
        assert_eq!(parse_rating(Some("NaN")), 0.0);
        assert_eq!(parse_rating(None), 0.0);
    }

    #[test]
    fn test_parse_recommended() {
        assert!(parse_recommended(Some("yes")));
        assert!(parse_recommended(Some(" YES ")));
        assert!(parse_recommended(Some("\"Yes\"")));
        assert!(!parse_recommended(Some("no")));
        assert!(!parse_recommended(Some("y")));
        assert!(!parse_recommended(Some("")));
        assert!(!parse_recommended(None));
    }

    #[test]
    fn test_build_document_full_schema() {
        let row = fields(&[
            (1, "  British Airways "),
            (2, "4"),
            (3, "Not great"),
            (6, "Delayed   two hours"),
            (9, "Business Class"),
            (10, "LHR to JFK"),
            (19, "no"),
        ]);

        let doc = build_document(&row, 7).unwrap();
        assert_eq!(doc.content, "Not great\n\nDelayed two hours");
        assert_eq!(
            doc.metadata,
            ReviewMetadata {
                document_id: "id-7".to_string(),
                airline_name: "British Airways".to_string(),
                overall_rating: 4.0,
                review_title: "Not great".to_string(),
                seat_type: "Business Class".to_string(),
                route: "LHR to JFK".to_string(),
                recommended: false,
            }
        );
    }

    #[test]
    fn test_build_document_without_title() {
        let row = fields(&[(6, "Just the body")]);
        let doc = build_document(&row, 0).unwrap();
        assert_eq!(doc.content, "Just the body");
        assert_eq!(doc.metadata.review_title, "");
        assert_eq!(doc.metadata.overall_rating, 0.0);
    }

    #[test]
    fn test_build_document_rejects() {
        let short = vec!["a".to_string(); MIN_FIELDS - 1];
        assert!(build_document(&short, 0).is_none());

        // A title alone is not enough.
        let no_body = fields(&[(3, "Title only"), (6, "   ")]);
        assert!(build_document(&no_body, 0).is_none());
    }
}
