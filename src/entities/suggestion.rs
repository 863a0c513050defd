use serde::Serialize;

use crate::utils::query::MIN_QUERY_CHARS;

pub const MAX_SUGGESTIONS: usize = 5;

pub const COMMON_MEDICINES: [&str; 15] = [
    "Aspirin",
    "Ibuprofen",
    "Acetaminophen",
    "Amoxicillin",
    "Lisinopril",
    "Metformin",
    "Amlodipine",
    "Metoprolol",
    "Omeprazole",
    "Simvastatin",
    "Losartan",
    "Albuterol",
    "Gabapentin",
    "Sertraline",
    "Montelukast",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    pub suggestions: Vec<String>,
}

/// Case-insensitive substring match against [`COMMON_MEDICINES`], in list order.
///
/// Inputs shorter than two characters once trimmed yield no suggestions.
/// The match itself uses the query as given, surrounding spaces included.
pub fn suggest(query: Option<&str>) -> Vec<String> {
    let Some(query) = query else {
        return Vec::new();
    };
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    COMMON_MEDICINES
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .map(|name| name.to_string())
        .collect()
}
