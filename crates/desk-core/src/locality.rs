//! Fuzzy matching of free-text locality names.
//!
//! The pincode directory and the CARE geography tables spell places differently
//! ("Ernakulam" vs "ernakulam ", "Tamil Nadu" vs "TAMIL  NADU"), so names are compared by
//! containment after normalisation rather than by equality.

use crate::remote::GeographyNode;

/// Lowercases and collapses every whitespace run to a single space, trimming the ends.
pub fn normalise_locality(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when the normalised `candidate` contains the normalised `query`.
///
/// An empty query matches nothing.
pub fn locality_matches(candidate: &str, query: &str) -> bool {
    let query = normalise_locality(query);
    if query.is_empty() {
        return false;
    }
    normalise_locality(candidate).contains(&query)
}

/// First node whose name matches `query`, in list order.
pub fn find_locality<'a>(nodes: &'a [GeographyNode], query: &str) -> Option<&'a GeographyNode> {
    nodes.iter().find(|n| locality_matches(&n.name, query))
}
