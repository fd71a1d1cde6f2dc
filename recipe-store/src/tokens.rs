//! Pure token semantics of the normalizer.
//!
//! The normalizer splits lists inside the database; these functions state
//! the same rules in Rust so they can be checked without one, and so an
//! imported database can be verified against its staging rows.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use recipe_types::{FollowEdge, InstructionStep};

/// Matches an ID token after trimming
static ID_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("Failed to compile id token regex"));

/// Characters trimmed from both ends of an ID token
pub const ID_TRIM: &[char] = &[' ', '"', '\'', '\t', '\n', '\r'];

/// Characters trimmed from both ends of an instruction fragment
pub const STEP_TRIM: &[char] = &[' ', '\t', '\n', '\r'];

/// Clean a single list token, returning the id it names if it is a plain
/// non-negative number
pub fn parse_id_token(token: &str) -> Option<i64> {
    let cleaned = token.trim_matches(ID_TRIM);
    if !ID_TOKEN_REGEX.is_match(cleaned) {
        return None;
    }
    cleaned.parse().ok()
}

/// Split a comma-separated id list and keep the tokens that are ids
///
/// # Examples
///
/// ```
/// use recipe_store::tokens::parse_id_list;
/// assert_eq!(parse_id_list(r#""5","abc","12""#), vec![5, 12]);
/// ```
pub fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',').filter_map(parse_id_token).collect()
}

/// Split instruction text on commas into 1-based numbered steps.
/// Empty or missing text has no steps.
pub fn split_instructions(recipe_id: i64, raw: &str) -> Vec<InstructionStep> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',')
        .enumerate()
        .map(|(i, fragment)| InstructionStep {
            recipe_id,
            step_number: i as i64 + 1,
            text: fragment.trim_matches(STEP_TRIM).to_string(),
        })
        .collect()
}

/// The follow graph implied by one user's lists: the user follows everyone
/// in `following`, and everyone in `followers` follows the user.
pub fn user_follow_edges(
    author_id: i64,
    following: Option<&str>,
    followers: Option<&str>,
) -> Vec<FollowEdge> {
    let outgoing = following
        .map(parse_id_list)
        .unwrap_or_default()
        .into_iter()
        .map(|target| FollowEdge::new(author_id, target));
    let incoming = followers
        .map(parse_id_list)
        .unwrap_or_default()
        .into_iter()
        .map(|source| FollowEdge::new(source, author_id));
    outgoing.chain(incoming).collect()
}

/// Merge the edges of every user into one set; an edge listed from both
/// ends appears once.
pub fn follow_edges<'a, I>(users: I) -> BTreeSet<FollowEdge>
where
    I: IntoIterator<Item = (i64, Option<&'a str>, Option<&'a str>)>,
{
    users
        .into_iter()
        .flat_map(|(author_id, following, followers)| {
            user_follow_edges(author_id, following, followers)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quoted_ids() {
        assert_eq!(parse_id_list(r#""5","abc","12""#), vec![5, 12]);
    }

    #[test]
    fn test_whitespace_and_quotes_trimmed() {
        assert_eq!(parse_id_list(" \"5\",  '7' ,\t9 "), vec![5, 7, 9]);
    }

    #[test]
    fn test_rejects_signs_and_decimals() {
        assert_eq!(parse_id_list("-3,+4,5.0,1e3,6"), vec![6]);
    }

    #[test]
    fn test_empty_tokens_dropped() {
        assert_eq!(parse_id_list(""), Vec::<i64>::new());
        assert_eq!(parse_id_list(",,"), Vec::<i64>::new());
        assert_eq!(parse_id_list(r#""""#), Vec::<i64>::new());
    }

    #[test]
    fn test_inner_space_is_not_an_id() {
        assert_eq!(parse_id_list("1 2,3"), vec![3]);
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(parse_id_token("007"), Some(7));
    }

    #[test]
    fn test_instruction_steps_in_split_order() {
        let steps = split_instructions(10, "Mix, Bake, Serve");
        let pairs: Vec<(i64, &str)> = steps
            .iter()
            .map(|s| (s.step_number, s.text.as_str()))
            .collect();
        assert_eq!(pairs, vec![(1, "Mix"), (2, "Bake"), (3, "Serve")]);
        assert!(steps.iter().all(|s| s.recipe_id == 10));
    }

    #[test]
    fn test_instruction_trailing_comma_keeps_empty_step() {
        let steps = split_instructions(1, "Stir,");
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].text, "");
    }

    #[test]
    fn test_no_instructions() {
        assert!(split_instructions(1, "").is_empty());
    }

    #[test]
    fn test_follow_edges_both_directions() {
        let edges = follow_edges([(1, Some("2"), Some("3"))]);
        assert!(edges.contains(&FollowEdge::new(1, 2)));
        assert!(edges.contains(&FollowEdge::new(3, 1)));
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn test_follow_edges_collapse_duplicates() {
        // 1 lists 2 as following, 2 lists 1 as follower: one edge
        let edges = follow_edges([(1, Some("2"), None), (2, None, Some("1"))]);
        assert_eq!(edges.into_iter().collect::<Vec<_>>(), vec![FollowEdge::new(1, 2)]);
    }

    proptest! {
        #[test]
        fn prop_only_numeric_tokens_survive(tokens in proptest::collection::vec("[0-9a-z\" ]{0,6}", 0..12)) {
            let raw = tokens.join(",");
            let ids = parse_id_list(&raw);
            let expected: Vec<i64> = tokens
                .iter()
                .map(|t| t.trim_matches(ID_TRIM))
                .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
                .map(|t| t.parse::<i64>().unwrap())
                .collect();
            prop_assert_eq!(ids, expected);
        }

        #[test]
        fn prop_steps_are_contiguous(fragments in proptest::collection::vec("[a-z ]{0,8}", 1..10)) {
            let raw = fragments.join(",");
            prop_assume!(!raw.is_empty());
            let steps = split_instructions(1, &raw);
            prop_assert_eq!(steps.len(), fragments.len());
            for (i, step) in steps.iter().enumerate() {
                prop_assert_eq!(step.step_number, i as i64 + 1);
                prop_assert_eq!(step.text.as_str(), fragments[i].trim());
            }
        }

        #[test]
        fn prop_follow_edges_are_symmetric_complete(
            following in proptest::collection::vec(1i64..50, 0..8),
            followers in proptest::collection::vec(1i64..50, 0..8),
        ) {
            let following_raw = following.iter().map(|id| format!("\"{}\"", id)).collect::<Vec<_>>().join(", ");
            let followers_raw = followers.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
            let edges = follow_edges([(100, Some(following_raw.as_str()), Some(followers_raw.as_str()))]);
            for target in &following {
                prop_assert!(edges.contains(&FollowEdge::new(100, *target)));
            }
            for source in &followers {
                prop_assert!(edges.contains(&FollowEdge::new(*source, 100)));
            }
        }

        #[test]
        fn prop_robustness(content in "\\PC*") {
            let _ = parse_id_list(&content);
            let _ = split_instructions(1, &content);
        }
    }
}
