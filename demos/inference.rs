use rulekit::{
    Facts, InferenceRulesEngine, Rule, RuleBuilder, RuleListener, RuleSet, RulesEngine,
    RulesEngineParameters, Value,
};
use tracing_subscriber::EnvFilter;

/// Prints every rule that fires.
struct Narrator;

impl RuleListener for Narrator {
    fn on_success(&self, rule: &dyn Rule, facts: &Facts) {
        println!("  {} fired, facts now at revision {}", rule.name(), facts.revision());
    }
}

fn main() {
    // RUST_LOG=rulekit=debug shows each evaluation.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut rules = RuleSet::new();
    rules.register(
        RuleBuilder::new("decide")
            .description("go out when the weather is fine")
            .priority(1)
            .when(|f: &Facts| f.get("weather").and_then(Value::as_str) == Some("fine"))
            .then(|f: &mut Facts| {
                f.put("plan", "walk");
                Ok(())
            })
            .build(),
    );
    rules.register(
        RuleBuilder::new("forecast")
            .description("no rain means fine weather")
            .priority(2)
            .when(|f: &Facts| f.get("rain") == Some(&Value::Bool(false)))
            .then(|f: &mut Facts| {
                f.put("weather", "fine");
                Ok(())
            })
            .build(),
    );

    let mut engine = InferenceRulesEngine::with_parameters(
        RulesEngineParameters::new().max_rounds(Some(10)),
    );
    engine.register_rule_listener(Narrator);

    let mut facts = Facts::new().set("rain", false);
    match engine.fire(&mut rules, &mut facts) {
        Ok(report) => {
            println!("{report}");
            println!(
                "plan: {}",
                facts.get("plan").map_or_else(|| "stay in".to_owned(), ToString::to_string)
            );
        }
        Err(err) => eprintln!("inference failed: {err}"),
    }
}
