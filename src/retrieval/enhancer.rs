//! Smart-mode query rewriting.
//!
//! The chat model is asked for four labeled lines; this module parses them
//! into a rewritten query plus metadata filters. Any model failure degrades
//! to the original query with no filters.

use super::QueryFilters;
use crate::config::Prompts;
use crate::llm::ChatModel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const ENHANCED: &str = "ENHANCED:";
const AIRLINE: &str = "AIRLINE:";
const MIN_RATING: &str = "MIN_RATING:";
const SEAT_TYPE: &str = "SEAT_TYPE:";
const NONE: &str = "NONE";

/// A rewritten query with the filters extracted from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Enhancement {
    pub enhanced_query: String,
    pub filters: QueryFilters,
}

impl Enhancement {
    /// The original query, unfiltered.
    pub fn passthrough(query: &str) -> Self {
        Self {
            enhanced_query: query.to_string(),
            filters: QueryFilters::default(),
        }
    }
}

/// Rewrites queries with a chat model.
pub struct QueryEnhancer {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl QueryEnhancer {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Prompts) -> Self {
        Self { model, prompts }
    }

    /// Rewrite `query`, never failing.
    #[instrument(skip(self))]
    pub async fn enhance(&self, query: &str) -> Enhancement {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.enhancer.user, &vars);

        let reply = match self.model.call(None, &prompt).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!("Query enhancement failed, using original query: {}", e);
                None
            }
        };

        let enhancement = parse_enhancement(query, reply.as_deref());
        debug!(
            "Enhanced query: {:?}, filters: {:?}",
            enhancement.enhanced_query, enhancement.filters
        );
        enhancement
    }
}

/// Parse the model's labeled reply.
///
/// Without a reply, or without a non-empty `ENHANCED:` line, the original
/// query is returned with no filters.
pub fn parse_enhancement(original: &str, reply: Option<&str>) -> Enhancement {
    let Some(reply) = reply else {
        return Enhancement::passthrough(original);
    };

    let mut enhanced = None;
    let mut filters = QueryFilters::default();

    for line in reply.lines().map(str::trim_start) {
        if let Some(value) = line.strip_prefix(ENHANCED) {
            let value = value.trim();
            if !value.is_empty() {
                enhanced = Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix(AIRLINE) {
            filters.airline_name = text_value(value);
        } else if let Some(value) = line.strip_prefix(SEAT_TYPE) {
            filters.seat_type = text_value(value);
        } else if let Some(value) = line.strip_prefix(MIN_RATING) {
            if !value.contains(NONE) {
                filters.min_rating = value.trim().parse::<f64>().ok().filter(|r| r.is_finite());
            }
        }
    }

    match enhanced {
        Some(enhanced_query) => Enhancement {
            enhanced_query,
            filters,
        },
        None => Enhancement::passthrough(original),
    }
}

fn text_value(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.contains(NONE) {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_support::ScriptedChat;

    #[test]
    fn test_full_reply() {
        let reply = "ENHANCED: legroom and seat comfort in economy on long-haul flights\n\
                     AIRLINE: Singapore Airlines\n\
                     MIN_RATING: 7\n\
                     SEAT_TYPE: Economy Class";
        let result = parse_enhancement("roomy seats singapore", Some(reply));

        assert_eq!(
            result.enhanced_query,
            "legroom and seat comfort in economy on long-haul flights"
        );
        assert_eq!(result.filters.airline_name.as_deref(), Some("Singapore Airlines"));
        assert_eq!(result.filters.min_rating, Some(7.0));
        assert_eq!(result.filters.seat_type.as_deref(), Some("Economy Class"));
    }

    #[test]
    fn test_none_values_are_skipped() {
        let reply = "ENHANCED: airline food quality\nAIRLINE: NONE\nMIN_RATING: NONE\nSEAT_TYPE: NONE";
        let result = parse_enhancement("food", Some(reply));
        assert_eq!(result.enhanced_query, "airline food quality");
        assert!(result.filters.is_empty());
    }

    #[test]
    fn test_missing_reply_falls_back() {
        let result = parse_enhancement("lost luggage", None);
        assert_eq!(result, Enhancement::passthrough("lost luggage"));
    }

    #[test]
    fn test_missing_enhanced_line_drops_filters() {
        let result = parse_enhancement("lost luggage", Some("AIRLINE: Delta\nMIN_RATING: 3"));
        assert_eq!(result.enhanced_query, "lost luggage");
        assert!(result.filters.is_empty());
    }

    #[test]
    fn test_prefixes_are_case_sensitive() {
        let result = parse_enhancement("q", Some("enhanced: nope\nENHANCED: yes\nairline: Delta"));
        assert_eq!(result.enhanced_query, "yes");
        assert_eq!(result.filters.airline_name, None);
    }

    #[test]
    fn test_tolerates_indentation_and_bad_rating() {
        let reply = "  ENHANCED: delays at the gate\n   MIN_RATING: about five\n\tAIRLINE:   KLM  ";
        let result = parse_enhancement("q", Some(reply));
        assert_eq!(result.enhanced_query, "delays at the gate");
        assert_eq!(result.filters.min_rating, None);
        assert_eq!(result.filters.airline_name.as_deref(), Some("KLM"));
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let enhancer = QueryEnhancer::new(Arc::new(ScriptedChat::failing()), Prompts::default());
        let result = enhancer.enhance("cheap business class").await;
        assert_eq!(result, Enhancement::passthrough("cheap business class"));
    }

    #[tokio::test]
    async fn test_prompt_contains_query() {
        let chat = Arc::new(ScriptedChat::replying("ENHANCED: wifi quality\nAIRLINE: NONE"));
        let enhancer = QueryEnhancer::new(chat.clone(), Prompts::default());

        let result = enhancer.enhance("is there wifi").await;
        assert_eq!(result.enhanced_query, "wifi quality");
        assert!(chat.last_user_prompt().unwrap().contains("User query: is there wifi"));
    }
}
