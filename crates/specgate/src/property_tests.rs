use proptest::prelude::*;

use crate::kit::extract_operation_ids;
use crate::validate::SpecValidator;

fn operation_id() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,24}"
}

proptest! {
    #[test]
    fn extractor_recovers_id_from_any_quoting_style(
        id in operation_id(),
        quote in prop_oneof![Just(""), Just("\""), Just("'")],
        pad in "[ \t]{0,4}",
    ) {
        let line = format!("      operationId:{pad}{quote}{id}{quote}\n");
        prop_assert_eq!(extract_operation_ids(&line), vec![id]);
    }

    #[test]
    fn extractor_preserves_order_and_duplicates(ids in prop::collection::vec(operation_id(), 0..8)) {
        let mut spec = String::from("openapi: 3.0.0\npaths:\n");
        for id in &ids {
            spec.push_str(&format!("      operationId: {id}\n"));
        }
        prop_assert_eq!(extract_operation_ids(&spec), ids);
    }

    #[test]
    fn extractor_ignores_lines_without_the_marker(lines in prop::collection::vec("[a-z :]{0,30}", 0..10)) {
        let body: String = lines
            .iter()
            .filter(|l| !l.contains("operationId"))
            .map(|l| format!("{l}\n"))
            .collect();
        prop_assert!(extract_operation_ids(&body).is_empty());
    }

    #[test]
    fn validator_accepts_any_openapi_three_document(suffix in "[a-zA-Z0-9 \n:{}]{0,200}") {
        let content = format!("openapi: 3.0.0\n{suffix}");
        let verdict = SpecValidator::default().validate(&content);
        // Only the swagger marker can reject a document carrying the v3 header.
        prop_assert_eq!(verdict.ok, !content.to_lowercase().contains("swagger: 2"));
    }

    #[test]
    fn validator_never_panics(content in ".{0,400}") {
        let _ = SpecValidator::default().validate(&content);
    }
}
