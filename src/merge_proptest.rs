//! Property-based tests for parsing, filtering and merging sections.
//!
//! Documents are generated as `toml` values and serialized, so every input is
//! valid TOML with a `[tool.ruff]` section of up to two levels. A second
//! generator writes `[tool.ruff.lint]` in two parts around `[tool.black]`,
//! with one of its sub-tables declared before it.

#[cfg(test)]
mod proptest_tests {
    use crate::document::ConfigDocument;
    use crate::exclude::{filter_children, Exclusions};
    use crate::merge::merge;
    use crate::path::SectionPath;
    use crate::section::{locate_mut, Missing};
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    // ============================================================================
    // Generators
    // ============================================================================

    fn key() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,5}"
    }

    fn leaf() -> impl Strategy<Value = toml::Value> {
        prop_oneof![
            any::<i32>().prop_map(|n| toml::Value::Integer(i64::from(n))),
            any::<bool>().prop_map(toml::Value::Boolean),
            "[a-zA-Z0-9 _.-]{0,8}".prop_map(toml::Value::String),
            prop::collection::vec("[A-Z]{1,3}[0-9]{0,3}", 0..4).prop_map(|codes| {
                toml::Value::Array(codes.into_iter().map(toml::Value::String).collect())
            }),
        ]
    }

    fn node() -> impl Strategy<Value = toml::Value> {
        prop_oneof![
            3 => leaf(),
            1 => prop::collection::btree_map(key(), leaf(), 0..4)
                .prop_map(|map| toml::Value::Table(map.into_iter().collect())),
        ]
    }

    fn section() -> impl Strategy<Value = toml::Table> {
        prop::collection::btree_map(key(), node(), 1..6).prop_map(|map| map.into_iter().collect())
    }

    fn leaves(min: usize) -> impl Strategy<Value = toml::Table> {
        prop::collection::btree_map(key(), leaf(), min..4).prop_map(|map| map.into_iter().collect())
    }

    /// A `pyproject.toml` whose `[tool.ruff.lint]` is split around `[tool.black]`
    fn split_pyproject() -> impl Strategy<Value = String> {
        (leaves(0), key(), leaves(1), leaves(1)).prop_map(|(mut ruff, child, nested, mut lint)| {
            ruff.remove("lint");
            lint.remove(&child);
            format!(
                "[tool.ruff]\n{}\n[tool.ruff.lint.{}]\n{}\n[tool.black]\nline-length = 88\n\n[tool.ruff.lint]\n{}",
                toml::to_string(&ruff).unwrap(),
                child,
                toml::to_string(&nested).unwrap(),
                toml::to_string(&lint).unwrap(),
            )
        })
    }

    /// A `pyproject.toml` with `section` as `tool.ruff`
    fn pyproject(section: toml::Table) -> String {
        let mut tool = toml::Table::new();
        tool.insert("ruff".to_string(), toml::Value::Table(section));
        let mut root = toml::Table::new();
        root.insert("tool".to_string(), toml::Value::Table(tool));
        toml::to_string(&root).unwrap()
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    fn ruff() -> SectionPath {
        SectionPath::parse("tool.ruff")
    }

    fn merge_texts(local: &str, upstream: &ConfigDocument) -> String {
        let source = upstream.section(&ruff()).unwrap().unwrap();
        let mut local = ConfigDocument::parse(local, "local").unwrap();
        let destination = locate_mut(local.root_mut(), &ruff(), Missing::Create)
            .unwrap()
            .unwrap();
        merge(destination, &source).unwrap();
        local.to_string()
    }

    fn ruff_value(text: &str) -> toml::Table {
        let root: toml::Table = toml::from_str(text).unwrap();
        root.get("tool")
            .and_then(|tool| tool.get("ruff"))
            .and_then(toml::Value::as_table)
            .cloned()
            .unwrap_or_default()
    }

    fn check_superset(before: &toml::Table, after: &toml::Table) -> Result<(), TestCaseError> {
        for (key, value) in before {
            let Some(merged) = after.get(key) else {
                return Err(TestCaseError::fail(format!("key `{}` was lost", key)));
            };
            if let (toml::Value::Table(before), toml::Value::Table(after)) = (value, merged) {
                check_superset(before, after)?;
            }
        }
        Ok(())
    }

    fn check_upstream_wins(upstream: &toml::Table, after: &toml::Table) -> Result<(), TestCaseError> {
        for (key, value) in upstream {
            match (value, after.get(key)) {
                (toml::Value::Table(upstream), Some(toml::Value::Table(after))) => {
                    check_upstream_wins(upstream, after)?
                }
                (value, Some(merged)) => prop_assert_eq!(value, merged),
                (_, None) => return Err(TestCaseError::fail(format!("key `{}` missing", key))),
            }
        }
        Ok(())
    }

    // ============================================================================
    // Properties
    // ============================================================================

    proptest! {
        /// Property: rendering an unmodified document reproduces its text
        #[test]
        fn round_trip_is_exact(section in section()) {
            let text = pyproject(section);
            let doc = ConfigDocument::parse(&text, "generated").unwrap();
            prop_assert_eq!(doc.to_string(), text);
        }

        /// Property: merging a document into itself changes nothing
        #[test]
        fn merge_with_itself_is_identity(section in section()) {
            let text = pyproject(section);
            let upstream = ConfigDocument::parse(&text, "upstream").unwrap();
            prop_assume!(upstream.section(&ruff()).unwrap().is_some());
            prop_assert_eq!(merge_texts(&text, &upstream), text);
        }

        /// Property: no local key is lost and every upstream value arrives
        #[test]
        fn merge_is_non_destructive_and_upstream_wins(
            local in section(),
            upstream in section(),
        ) {
            let local_text = pyproject(local);
            let upstream_text = pyproject(upstream);
            let upstream_doc = ConfigDocument::parse(&upstream_text, "upstream").unwrap();
            prop_assume!(upstream_doc.section(&ruff()).unwrap().is_some());

            let merged = ruff_value(&merge_texts(&local_text, &upstream_doc));
            check_superset(&ruff_value(&local_text), &merged)?;
            check_upstream_wins(&ruff_value(&upstream_text), &merged)?;
        }

        /// Property: every value of a split upstream table survives the merge
        #[test]
        fn split_tables_merge_losslessly(text in split_pyproject()) {
            let upstream = ConfigDocument::parse(&text, "upstream").unwrap();
            prop_assert!(upstream.is_out_of_order(&ruff().child("lint")));

            let merged = merge_texts("[project]\nname = \"demo\"\n", &upstream);
            prop_assert_eq!(ruff_value(&merged), ruff_value(&text));
        }

        /// Property: merging a split upstream table keeps local keys and
        /// delivers every upstream value
        #[test]
        fn split_tables_merge_non_destructively(
            local in section(),
            text in split_pyproject(),
        ) {
            let local_text = pyproject(local);
            let upstream = ConfigDocument::parse(&text, "upstream").unwrap();

            let merged = ruff_value(&merge_texts(&local_text, &upstream));
            check_superset(&ruff_value(&local_text), &merged)?;
            check_upstream_wins(&ruff_value(&text), &merged)?;
        }

        /// Property: excluded keys never reach a local file that lacked them,
        /// and every other upstream value does
        #[test]
        fn excluded_keys_are_not_merged(
            upstream in section(),
            mask in prop::collection::vec(any::<bool>(), 6),
        ) {
            let keys: Vec<String> = upstream.keys().cloned().collect();
            let excluded: Vec<&String> = keys
                .iter()
                .zip(mask.iter())
                .filter(|(_, &skip)| skip)
                .map(|(key, _)| key)
                .collect();
            let exclusions: Exclusions = excluded.iter().collect();

            let upstream_text = pyproject(upstream);
            let mut upstream_doc = ConfigDocument::parse(&upstream_text, "upstream").unwrap();
            let Some(table) = locate_mut(upstream_doc.root_mut(), &ruff(), Missing::Absent).unwrap() else {
                return Ok(());
            };
            filter_children(table, &exclusions);

            let merged = ruff_value(&merge_texts("[project]\nname = \"demo\"\n", &upstream_doc));
            for (key, value) in ruff_value(&upstream_text) {
                if excluded.contains(&&key) {
                    prop_assert!(!merged.contains_key(&key), "excluded `{}` was merged", key);
                } else if !value.is_table() {
                    prop_assert_eq!(merged.get(&key), Some(&value));
                }
            }
        }
    }
}
