//! Context formatting for RAG prompts and answers.

use crate::vector_store::SearchHit;

/// Format retrieved reviews as prompt context.
pub fn format_context_for_prompt(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let meta = hit.metadata();
            format!(
                "---\n[{}] {} | {} | {} | rated {}/10\n{}\n---",
                i + 1,
                meta.airline_name,
                meta.seat_type,
                meta.route,
                meta.overall_rating,
                hit.document.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One line per source, for showing under an answer.
pub fn format_sources_for_display(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            let meta = hit.metadata();
            let title = if meta.review_title.is_empty() {
                String::new()
            } else {
                format!(" \"{}\"", meta.review_title)
            };
            format!(
                "{} [{}]{} (score: {:.2})",
                meta.airline_name, meta.document_id, title, hit.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::{Document, ReviewMetadata};

    fn hit(title: &str) -> SearchHit {
        SearchHit {
            document: Document::new(
                "Seats were narrow.".to_string(),
                ReviewMetadata {
                    document_id: "id-4".to_string(),
                    airline_name: "Ryanair".to_string(),
                    overall_rating: 2.0,
                    review_title: title.to_string(),
                    seat_type: "Economy Class".to_string(),
                    route: "STN-DUB".to_string(),
                    recommended: false,
                },
            ),
            chunk_index: 0,
            score: 0.812,
        }
    }

    #[test]
    fn test_prompt_context() {
        let context = format_context_for_prompt(&[hit(""), hit("")]);
        assert!(context
            .starts_with("---\n[1] Ryanair | Economy Class | STN-DUB | rated 2/10\nSeats were narrow."));
        assert!(context.contains("[2] Ryanair"));
    }

    #[test]
    fn test_sources_display() {
        assert_eq!(
            format_sources_for_display(&[hit("Never again")]),
            "Ryanair [id-4] \"Never again\" (score: 0.81)"
        );
        assert_eq!(format_sources_for_display(&[hit("")]), "Ryanair [id-4] (score: 0.81)");
    }
}
