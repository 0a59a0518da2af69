use rulekit::{
    ActionError, DefaultRulesEngine, Facts, RuleBuilder, RuleSet, RulesEngine,
    RulesEngineParameters, Value,
};

fn main() {
    let mut rules = RuleSet::new();
    rules.register(
        RuleBuilder::new("fizzbuzz")
            .description("multiples of 15")
            .priority(1)
            .when(|f: &Facts| number(f) % 15 == 0)
            .then(|f: &mut Facts| say(f, "fizzbuzz"))
            .build(),
    );
    rules.register(
        RuleBuilder::new("fizz")
            .priority(2)
            .when(|f: &Facts| number(f) % 3 == 0)
            .then(|f: &mut Facts| say(f, "fizz"))
            .build(),
    );
    rules.register(
        RuleBuilder::new("buzz")
            .priority(3)
            .when(|f: &Facts| number(f) % 5 == 0)
            .then(|f: &mut Facts| say(f, "buzz"))
            .build(),
    );
    rules.register(
        RuleBuilder::new("number")
            .priority(4)
            .when(|_: &Facts| true)
            .then(|f: &mut Facts| {
                let n = number(f);
                say(f, &n.to_string())
            })
            .build(),
    );

    println!("{rules}");

    // The first rule that applies wins.
    let engine = DefaultRulesEngine::with_parameters(
        RulesEngineParameters::new().skip_on_first_applied_rule(true),
    );
    for n in 1_i64..=15 {
        let mut facts = Facts::new().set("number", n);
        match engine.fire(&mut rules, &mut facts) {
            Ok(_) => println!(
                "{}",
                facts.get("said").and_then(Value::as_str).unwrap_or("?")
            ),
            Err(err) => eprintln!("firing failed: {err}"),
        }
    }
}

fn number(facts: &Facts) -> i64 {
    facts.get("number").and_then(Value::as_int).unwrap_or(0)
}

fn say(facts: &mut Facts, word: &str) -> Result<(), ActionError> {
    facts.put("said", word);
    Ok(())
}
