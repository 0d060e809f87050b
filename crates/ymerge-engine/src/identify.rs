//! Identifier matching for sequence items

use crate::tree::{ConfigTree, Mapping};

/// Index of the first mapping in `candidates` that shares an identifier
/// value with `item`.
///
/// Keys are tried in priority order; a key the item lacks is passed over,
/// and a key that matches nothing falls through to the next one.
pub fn find_by_identifier(
    priority: &[String],
    item: &Mapping,
    candidates: &[ConfigTree],
) -> Option<usize> {
    priority.iter().find_map(|key| {
        let wanted = item.get(key)?;
        candidates.iter().position(|candidate| match candidate {
            ConfigTree::Mapping(map) => map.get(key) == Some(wanted),
            _ => false,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn mapping(value: serde_json::Value) -> Mapping {
        match ConfigTree::from(value) {
            ConfigTree::Mapping(m) => m,
            _ => panic!("expected mapping"),
        }
    }

    fn list(value: serde_json::Value) -> Vec<ConfigTree> {
        match ConfigTree::from(value) {
            ConfigTree::Sequence(items) => items,
            _ => panic!("expected sequence"),
        }
    }

    #[test]
    fn test_first_matching_index_wins() {
        let candidates = list(json!([{"id": 2}, {"id": 1, "n": "a"}, {"id": 1, "n": "b"}]));
        let found = find_by_identifier(&keys(&["id"]), &mapping(json!({"id": 1})), &candidates);
        assert_eq!(found, Some(1));
    }

    #[test]
    fn test_priority_order() {
        let candidates = list(json!([{"name": "web"}, {"id": 7}]));
        let item = mapping(json!({"id": 7, "name": "web"}));

        assert_eq!(find_by_identifier(&keys(&["id", "name"]), &item, &candidates), Some(1));
        assert_eq!(find_by_identifier(&keys(&["name", "id"]), &item, &candidates), Some(0));
    }

    #[test]
    fn test_falls_through_to_next_key() {
        let candidates = list(json!([{"name": "db"}]));
        let item = mapping(json!({"id": 99, "name": "db"}));
        assert_eq!(find_by_identifier(&keys(&["id", "name"]), &item, &candidates), Some(0));
    }

    #[test]
    fn test_non_mapping_candidates_skipped() {
        let candidates = list(json!(["id", 1, {"id": 1}]));
        let found = find_by_identifier(&keys(&["id"]), &mapping(json!({"id": 1})), &candidates);
        assert_eq!(found, Some(2));
    }

    #[test]
    fn test_no_identifier_no_match() {
        let candidates = list(json!([{"value": 1}]));
        let found =
            find_by_identifier(&keys(&["id", "name"]), &mapping(json!({"value": 1})), &candidates);
        assert_eq!(found, None);
    }
}
