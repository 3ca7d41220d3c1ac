use muse_core::{Condition, ContentId, ResponseValue};

#[test]
fn response_values_round_trip_json() {
    let values = vec![
        ResponseValue::Text("Fast Charge Wins".into()),
        ResponseValue::Scale(4),
        ResponseValue::Choice("Prefer not to say".into()),
        ResponseValue::YesNo(true),
    ];

    let json = serde_json::to_string_pretty(&values).expect("serialize");
    let decoded: Vec<ResponseValue> = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, values);
}

#[test]
fn condition_labels_are_stable() {
    assert_eq!(Condition::NoAi.label(), "no-ai");
    assert_eq!(Condition::AiFirst.label(), "ai-first");
    assert_eq!(Condition::HumanFirst.label(), "human-first");
    assert_eq!(
        Condition::FIXED_ORDER,
        [Condition::NoAi, Condition::AiFirst, Condition::HumanFirst]
    );
}

#[test]
fn cells_flatten_every_variant() {
    assert_eq!(ResponseValue::Text("hello".into()).to_cell(), "hello");
    assert_eq!(ResponseValue::Scale(3).to_cell(), "3");
    assert_eq!(ResponseValue::YesNo(false).to_cell(), "No");
    assert!(ResponseValue::Text("  \n ".into()).is_blank_text());
    assert!(!ResponseValue::Text(" x ".into()).is_blank_text());
}

#[test]
fn content_ids_expose_raw_form() {
    let id = ContentId::from_raw("science_technology");
    assert_eq!(id.as_raw(), "science_technology");
}
