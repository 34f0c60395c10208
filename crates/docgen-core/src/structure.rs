//! Structure analysis of sample JSON documents
//!
//! A template's expected schema is inferred from its sample document rather
//! than parsed out of the template source. The analyzer walks the sample's
//! top-level fields and classifies each one by its JSON shape:
//!
//! - arrays become [`ArrayDescriptor`]s plus an `each <name>` loop entry,
//! - booleans become conditional variables when their key carries a
//!   `show`/`enable`/`display` prefix (other booleans are treated as plain
//!   business data and reported as normal variables),
//! - nested objects contribute one dotted path per inner field plus the bare
//!   field name itself,
//! - everything else is a normal variable.
//!
//! Array shapes are inferred from the **first element only**. Heterogeneous
//! arrays are therefore reported as if every element had the first element's
//! shape; this is documented behavior, not an oversight.

use serde::Serialize;
use serde_json::Value;

/// Marker for array items that bind directly to the loop's current value
/// instead of a named field (arrays of strings or numbers).
pub const CONTEXTUAL_VALUE: &str = "contextual-value";

/// Key prefixes that mark a boolean field as a rendering conditional.
const CONDITIONAL_PREFIXES: [&str; 3] = ["show", "enable", "display"];

/// Shape of one array field, inferred from its first element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayDescriptor {
    /// Field name of the array in the sample document.
    pub name: String,
    /// Field names of the item type, or the single [`CONTEXTUAL_VALUE`]
    /// sentinel when items are primitives.
    pub variables: Vec<String>,
    /// Arrays found inside the first item's fields (one level deep).
    pub nested_arrays: Vec<ArrayDescriptor>,
}

/// Client-facing report of a sample document's structure.
///
/// `normal_variables` and `conditional_variables` are deduplicated and sorted
/// lexicographically; source order is deliberately not preserved so clients
/// get a stable display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureReport {
    pub normal_variables: Vec<String>,
    pub conditional_variables: Vec<String>,
    pub array_info: Vec<ArrayDescriptor>,
    pub loops: Vec<String>,
    pub all_variables: Vec<String>,
}

impl StructureReport {
    /// True when the analysis produced nothing (null or non-object input).
    pub fn is_empty(&self) -> bool {
        self.normal_variables.is_empty()
            && self.conditional_variables.is_empty()
            && self.array_info.is_empty()
            && self.loops.is_empty()
    }
}

/// Analyze a sample document's structure.
///
/// Never fails: `null` or any non-object input yields an empty report.
pub fn analyze(doc: &Value) -> StructureReport {
    let mut report = StructureReport::default();

    let Value::Object(fields) = doc else {
        return report;
    };

    for (key, value) in fields {
        match value {
            Value::Array(items) => {
                let descriptor = analyze_array(key, items);
                tracing::debug!(
                    array = %key,
                    items = items.len(),
                    nested = descriptor.nested_arrays.len(),
                    "array field analyzed"
                );
                report.array_info.push(descriptor);
                report.loops.push(format!("each {key}"));
            }
            Value::Bool(_) => {
                if is_conditional_key(key) {
                    report.conditional_variables.push(key.clone());
                } else {
                    report.normal_variables.push(key.clone());
                }
            }
            Value::Object(nested) => {
                for nested_key in nested.keys() {
                    report.normal_variables.push(format!("{key}.{nested_key}"));
                }
                report.normal_variables.push(key.clone());
            }
            _ => report.normal_variables.push(key.clone()),
        }
    }

    report.normal_variables.sort();
    report.normal_variables.dedup();
    report.conditional_variables.sort();
    report.conditional_variables.dedup();

    report.all_variables = report
        .normal_variables
        .iter()
        .chain(report.conditional_variables.iter())
        .cloned()
        .collect();

    report
}

/// Infer the shape of one array from its first element.
fn analyze_array(name: &str, items: &[Value]) -> ArrayDescriptor {
    let mut descriptor = ArrayDescriptor {
        name: name.to_string(),
        ..ArrayDescriptor::default()
    };

    match items.first() {
        None => {}
        Some(Value::String(_)) | Some(Value::Number(_)) => {
            descriptor.variables.push(CONTEXTUAL_VALUE.to_string());
        }
        Some(Value::Object(fields)) => {
            for (key, value) in fields {
                if let Value::Array(inner) = value {
                    descriptor.nested_arrays.push(ArrayDescriptor {
                        name: key.clone(),
                        variables: inner_variables(inner),
                        nested_arrays: Vec::new(),
                    });
                } else {
                    descriptor.variables.push(key.clone());
                }
            }
        }
        // First element is a bool, null, or another array: no named fields
        // to report.
        Some(_) => {}
    }

    descriptor
}

/// Variables of an array nested inside an array item (one level deep).
fn inner_variables(items: &[Value]) -> Vec<String> {
    match items.first() {
        None => Vec::new(),
        Some(Value::Object(fields)) => fields
            .iter()
            .filter(|(_, value)| !value.is_array())
            .map(|(key, _)| key.clone())
            .collect(),
        Some(_) => vec![CONTEXTUAL_VALUE.to_string()],
    }
}

fn is_conditional_key(key: &str) -> bool {
    CONDITIONAL_PREFIXES
        .iter()
        .any(|prefix| key.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn null_input_yields_empty_report() {
        let report = analyze(&Value::Null);
        assert!(report.is_empty());
        assert!(report.all_variables.is_empty());
    }

    #[test]
    fn non_object_input_yields_empty_report() {
        for doc in [json!("text"), json!(42), json!(true), json!([1, 2, 3])] {
            let report = analyze(&doc);
            assert!(report.is_empty(), "expected empty report for {doc}");
        }
    }

    #[test]
    fn mixed_document_is_classified_by_shape() {
        let doc = json!({
            "a": 1,
            "b": { "c": 2, "d": 3 },
            "e": [1, 2, 3],
            "f": true
        });

        let report = analyze(&doc);

        // `f` has no show/enable/display prefix, so under the prefix-based
        // boolean policy it is a normal variable.
        assert_eq!(
            report.normal_variables,
            vec!["a", "b", "b.c", "b.d", "f"]
        );
        assert!(report.conditional_variables.is_empty());

        assert_eq!(report.array_info.len(), 1);
        assert_eq!(report.array_info[0].name, "e");
        assert_eq!(report.array_info[0].variables, vec![CONTEXTUAL_VALUE]);
        assert!(report.array_info[0].nested_arrays.is_empty());

        assert_eq!(report.loops, vec!["each e"]);
        assert_eq!(report.all_variables, report.normal_variables);
    }

    #[test]
    fn prefixed_booleans_are_conditionals() {
        let doc = json!({
            "show_footer": true,
            "enable_discount": false,
            "display_totals": true,
            "paid": true
        });

        let report = analyze(&doc);

        assert_eq!(
            report.conditional_variables,
            vec!["display_totals", "enable_discount", "show_footer"]
        );
        assert_eq!(report.normal_variables, vec!["paid"]);
        assert_eq!(
            report.all_variables,
            vec!["paid", "display_totals", "enable_discount", "show_footer"]
        );
    }

    #[test]
    fn variables_are_deduplicated_and_sorted() {
        let doc = json!({
            "user.name": "explicit",
            "user": { "name": "nested" }
        });

        let report = analyze(&doc);

        assert_eq!(report.normal_variables, vec!["user", "user.name"]);
    }

    #[test]
    fn nested_arrays_are_detected_inside_array_items() {
        let doc = json!({
            "items": [
                { "name": "x", "tags": ["p", "q"] }
            ]
        });

        let report = analyze(&doc);

        assert_eq!(report.array_info.len(), 1);
        let items = &report.array_info[0];
        assert_eq!(items.name, "items");
        assert_eq!(items.variables, vec!["name"]);
        assert_eq!(items.nested_arrays.len(), 1);
        assert_eq!(items.nested_arrays[0].name, "tags");
        assert_eq!(items.nested_arrays[0].variables, vec![CONTEXTUAL_VALUE]);
    }

    #[test]
    fn nested_array_of_objects_reports_field_names() {
        let doc = json!({
            "orders": [
                { "id": 1, "lines": [{ "sku": "a", "qty": 2 }] }
            ]
        });

        let report = analyze(&doc);

        let orders = &report.array_info[0];
        assert_eq!(orders.variables, vec!["id"]);
        assert_eq!(orders.nested_arrays[0].name, "lines");
        assert_eq!(orders.nested_arrays[0].variables, vec!["qty", "sku"]);
    }

    #[test]
    fn empty_array_yields_empty_descriptor() {
        let doc = json!({ "rows": [] });

        let report = analyze(&doc);

        assert_eq!(report.array_info[0].name, "rows");
        assert!(report.array_info[0].variables.is_empty());
        assert!(report.array_info[0].nested_arrays.is_empty());
        assert_eq!(report.loops, vec!["each rows"]);
    }

    #[test]
    fn array_shape_comes_from_first_element_only() {
        let doc = json!({
            "mixed": [
                { "alpha": 1 },
                { "beta": 2, "gamma": 3 }
            ]
        });

        let report = analyze(&doc);

        assert_eq!(report.array_info[0].variables, vec!["alpha"]);
    }

    #[test]
    fn null_values_are_normal_variables() {
        let doc = json!({ "note": null });

        let report = analyze(&doc);

        assert_eq!(report.normal_variables, vec!["note"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_json() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(|n| serde_json::json!(n)),
                "[a-z]{0,8}".prop_map(Value::String),
            ];
            leaf.prop_recursive(3, 32, 8, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                    prop::collection::btree_map("[a-z.]{1,8}", inner, 0..6)
                        .prop_map(|m| Value::Object(m.into_iter().collect())),
                ]
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn analyze_never_panics(doc in arb_json()) {
                let _ = analyze(&doc);
            }

            #[test]
            fn variable_lists_are_sorted_and_deduplicated(doc in arb_json()) {
                let report = analyze(&doc);
                for list in [&report.normal_variables, &report.conditional_variables] {
                    let mut expected = list.clone();
                    expected.sort();
                    expected.dedup();
                    prop_assert_eq!(list, &expected);
                }
            }

            #[test]
            fn all_variables_is_the_concatenation(doc in arb_json()) {
                let report = analyze(&doc);
                let expected: Vec<String> = report
                    .normal_variables
                    .iter()
                    .chain(report.conditional_variables.iter())
                    .cloned()
                    .collect();
                prop_assert_eq!(report.all_variables, expected);
            }
        }
    }
}
