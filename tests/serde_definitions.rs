#![cfg(feature = "serde")]

use rulekit::{
    DefaultRulesEngine, ExpressionRuleFactory, Facts, RuleDefinition, RulesEngine, Value,
    DEFAULT_RULE_PRIORITY,
};

const RULES: &str = r#"[
    {
        "name": "adult",
        "description": "flag adults",
        "priority": 1,
        "condition": "age >= 18",
        "actions": ["adult = true"]
    },
    {
        "name": "greeting",
        "compositeRuleType": "UnitRuleGroup",
        "composingRules": [
            { "name": "named", "condition": "name != \"\"", "actions": ["greeting = \"hello \" + name"] },
            { "name": "grown", "condition": "adult" }
        ]
    }
]"#;

#[test]
fn definitions_deserialize_with_camel_case_keys() {
    let definitions: Vec<RuleDefinition> = serde_json::from_str(RULES).unwrap();
    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].actions, vec!["adult = true"]);
    assert_eq!(definitions[1].composite_rule_type.as_deref(), Some("UnitRuleGroup"));
    assert_eq!(definitions[1].composing_rules.len(), 2);
    // Missing keys take the rule defaults.
    assert_eq!(definitions[1].priority, DEFAULT_RULE_PRIORITY);
    assert_eq!(definitions[1].composing_rules[1].actions, Vec::<String>::new());
}

#[test]
fn deserialized_definitions_fire() {
    let definitions: Vec<RuleDefinition> = serde_json::from_str(RULES).unwrap();
    let mut rules = ExpressionRuleFactory::new().create_all(&definitions).unwrap();

    let mut facts = Facts::new().set("age", 42_i64).set("name", "ada");
    let report = DefaultRulesEngine::new().fire(&mut rules, &mut facts).unwrap();
    assert_eq!(report.fired(), vec!["adult", "greeting"]);
    assert_eq!(facts.get("greeting"), Some(&Value::from("hello ada")));
}

#[test]
fn serialization_omits_empty_composite_fields() {
    let definition = RuleDefinition::new("r", "x > 1").with_action("y = 2");
    let json = serde_json::to_value(&definition).unwrap();
    assert_eq!(json["condition"], "x > 1");
    assert!(json.get("compositeRuleType").is_none());
    assert!(json.get("composingRules").is_none());

    let back: RuleDefinition = serde_json::from_value(json).unwrap();
    assert_eq!(back, definition);
}

#[test]
fn values_are_untagged() {
    let values: Vec<Value> = serde_json::from_str(r#"[true, 3, 2.5, "x", [1, "y"]]"#).unwrap();
    assert_eq!(
        values,
        vec![
            Value::Bool(true),
            Value::Int(3),
            Value::Float(2.5),
            Value::from("x"),
            Value::List(vec![Value::Int(1), Value::from("y")]),
        ]
    );
}
