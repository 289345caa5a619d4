//! Metadata filters extracted from a query, and their compiled form.

use crate::vector_store::filter::quote;
use serde::Serialize;

/// Filters the enhancer can extract from a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_type: Option<String>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        self.airline_name.is_none() && self.min_rating.is_none() && self.seat_type.is_none()
    }
}

/// Compile filters into a store filter expression.
///
/// Clauses appear in the order airline, rating, seat and are joined with
/// ` && `. No filters compile to the empty string.
pub fn compile_filter(filters: &QueryFilters) -> String {
    let mut clauses = Vec::with_capacity(3);

    if let Some(airline) = &filters.airline_name {
        clauses.push(format!("airline_name == {}", quote(airline)));
    }
    if let Some(rating) = filters.min_rating {
        clauses.push(format!("overall_rating >= {}", rating));
    }
    if let Some(seat) = &filters.seat_type {
        clauses.push(format!("seat_type == {}", quote(seat)));
    }

    clauses.join(" && ")
}
