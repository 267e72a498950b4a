//! Tag input parsing.
//!
//! Tags are free-form labels kept in the order typed. They carry no meaning to
//! the store and are only matched by search.

/// Splits a comma-separated tag list, trimming each tag and dropping empties.
pub fn parse_tag_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
