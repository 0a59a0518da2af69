use rulekit::{
    ActionError, Bindings, DefaultRulesEngine, Facts, Method, RuleAdapter, RuleSet, RulesEngine,
    Value,
};

/// A plain struct that knows nothing about rules.
#[derive(Debug, Default)]
struct Stock {
    reorder_below: i64,
    orders: Vec<i64>,
}

impl Stock {
    fn low(&self, args: &Bindings) -> bool {
        args.get("on_hand")
            .and_then(Value::as_int)
            .is_some_and(|n| n < self.reorder_below)
    }

    fn reorder(&mut self, args: &Bindings, facts: &mut Facts) -> Result<(), ActionError> {
        let on_hand = args.get("on_hand").and_then(Value::as_int).unwrap_or(0);
        let amount = self.reorder_below * 2 - on_hand;
        self.orders.push(amount);
        facts.put("ordered", amount);
        Ok(())
    }
}

fn main() {
    let adapter = RuleAdapter::new(Stock {
        reorder_below: 10,
        ..Stock::default()
    })
    .name("reorder")
    .description("order stock when running low")
    .priority(1)
    .method(Method::condition("low", Stock::low).fact("on_hand"))
    .method(Method::action("reorder", Stock::reorder).fact("on_hand"));

    let mut rules = RuleSet::new();
    if let Err(err) = rules.register_adapter(adapter) {
        eprintln!("rejected: {err}");
        return;
    }

    // A shape error is reported at registration, and the set is unchanged.
    let broken = RuleAdapter::new(Stock::default())
        .name("broken")
        .method(Method::action("reorder", Stock::reorder));
    if let Err(err) = rules.register_adapter(broken) {
        println!("rejected: {err}");
    }

    let engine = DefaultRulesEngine::new();
    for on_hand in [25_i64, 4] {
        let mut facts = Facts::new().set("on_hand", on_hand);
        if let Err(err) = engine.fire(&mut rules, &mut facts) {
            eprintln!("firing failed: {err}");
            continue;
        }
        match facts.get("ordered") {
            Some(amount) => println!("{on_hand} on hand: ordered {amount}"),
            None => println!("{on_hand} on hand: nothing to do"),
        }
    }
}
