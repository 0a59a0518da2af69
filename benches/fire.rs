use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rulekit::{
    DefaultRulesEngine, ExpressionRuleFactory, Facts, GroupKind, InferenceRulesEngine,
    RuleBuilder, RuleDefinition, RuleGroup, RuleSet, RulesEngine, Value,
};

/// `n` closure rules, each testing its own fact.
fn closure_rules(n: usize) -> RuleSet {
    let mut rules = RuleSet::new();
    for i in 0..n {
        let key = format!("f{i}");
        let out = format!("out{i}");
        rules.register(
            RuleBuilder::new(format!("r{i}"))
                .priority(i32::try_from(i).unwrap_or(i32::MAX))
                .when(move |f: &Facts| f.get(&key).and_then(Value::as_int).is_some_and(|v| v >= 1))
                .then(move |f: &mut Facts| {
                    f.put(&out, true);
                    Ok(())
                })
                .build(),
        );
    }
    rules
}

fn facts(n: usize) -> Facts {
    (0..n).map(|i| (format!("f{i}"), Value::Int(10))).collect()
}

fn bench_default(c: &mut Criterion) {
    let mut group = c.benchmark_group("default_engine");
    let engine = DefaultRulesEngine::new();
    for n in [10, 100, 1000] {
        let mut rules = closure_rules(n);
        let base = facts(n);
        group.bench_with_input(BenchmarkId::new("closure_rules", n), &n, |b, _| {
            b.iter(|| {
                let mut f = base.clone();
                engine.fire(black_box(&mut rules), &mut f).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_expressions(c: &mut Criterion) {
    let definitions: Vec<RuleDefinition> = (0..100)
        .map(|i| {
            RuleDefinition::new(format!("r{i}"), format!("f{i} >= 1 and not done{i}"))
                .with_priority(i)
                .with_action(format!("done{i} = true"))
                .with_action(format!("total = total + f{i}"))
        })
        .collect();
    let mut rules = ExpressionRuleFactory::new().create_all(&definitions).unwrap();
    let base = facts(100).set("total", 0_i64);
    let engine = DefaultRulesEngine::new();

    c.bench_function("expression_rules_100", |b| {
        b.iter(|| {
            let mut f = base.clone();
            engine.fire(black_box(&mut rules), &mut f).unwrap()
        });
    });
}

fn bench_inference_chain(c: &mut Criterion) {
    // step{i} needs the fact written by step{i-1}, declared so that every
    // round can fire only one new step.
    let n = 50;
    let mut rules = RuleSet::new();
    for i in 0..n {
        let have = format!("s{i}");
        let next = format!("s{}", i + 1);
        rules.register(
            RuleBuilder::new(format!("step{i}"))
                .priority(n - i)
                .when(move |f: &Facts| f.contains(&have))
                .then(move |f: &mut Facts| {
                    f.put(&next, true);
                    Ok(())
                })
                .build(),
        );
    }
    let engine = InferenceRulesEngine::new();

    c.bench_function("inference_chain_50", |b| {
        b.iter(|| {
            let mut f = Facts::new().set("s0", true);
            engine.fire(black_box(&mut rules), &mut f).unwrap()
        });
    });
}

fn bench_groups(c: &mut Criterion) {
    let mut rules = RuleSet::new();
    for kind in [GroupKind::Activation, GroupKind::Unit, GroupKind::SortedSequential] {
        let mut group = RuleGroup::new(kind.type_name(), kind);
        for rule in closure_rules(20).names() {
            let key = rule.replace('r', "f");
            group.add_rule(
                RuleBuilder::new(format!("{kind}-{rule}"))
                    .when(move |f: &Facts| f.contains(&key))
                    .build(),
            );
        }
        rules.register(group);
    }
    let engine = DefaultRulesEngine::new();
    let base = facts(20);

    c.bench_function("groups_3x20", |b| {
        b.iter(|| {
            let mut f = base.clone();
            engine.fire(black_box(&mut rules), &mut f).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_default,
    bench_expressions,
    bench_inference_chain,
    bench_groups
);
criterion_main!(benches);
