use rulekit::{
    DefaultRulesEngine, ExpressionRuleFactory, Facts, RuleDefinition, RulesEngine, RulesError,
};

fn main() -> Result<(), RulesError> {
    let definitions = vec![
        RuleDefinition::new("member_discount", "member and total >= 100.0")
            .with_description("members save 10 on large orders")
            .with_priority(1)
            .with_action("total = total - 10")
            .with_action(r#"notes = notes + "member discount""#),
        RuleDefinition::group("shipping", "ActivationRuleGroup")
            .with_priority(2)
            .with_member(
                RuleDefinition::new("free_shipping", "total >= 50")
                    .with_priority(1)
                    .with_action("shipping = 0"),
            )
            .with_member(
                RuleDefinition::new("flat_shipping", "total < 50")
                    .with_priority(2)
                    .with_action("shipping = 5"),
            ),
    ];

    let mut rules = ExpressionRuleFactory::new().create_all(&definitions)?;
    println!("{rules}");

    let engine = DefaultRulesEngine::new();
    for (member, total) in [(true, 120.0), (false, 30.0)] {
        let mut facts = Facts::new()
            .set("member", member)
            .set("total", total)
            .set("notes", Vec::<rulekit::Value>::new());
        let report = engine.fire(&mut rules, &mut facts)?;
        println!("{report}");
        let mut lines: Vec<String> = facts.iter().map(|(k, v)| format!("  {k} = {v}")).collect();
        lines.sort();
        println!("{}", lines.join("\n"));
    }
    Ok(())
}
