//! Benchmarks the `enabled()` hot path: one snapshot lookup, one ticker
//! check, one default-tags load, one rule evaluation. No parsing or I/O
//! is on this path, so this is effectively a benchmark of the lock-free
//! snapshot store and the rule-list evaluator.

use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use flagset::backend::{Backend, RefreshResult};
use flagset::flag::rule_list::{Rule, RuleAction, RuleInfo, RuleListFlag};
use flagset::flag::Flag;
use flagset::{Flagset, FlagsetOptions, TagMap};

struct StaticBackend {
    flags: Vec<Flag>,
}

impl Backend for StaticBackend {
    fn refresh(&self) -> Result<RefreshResult, flagset::FlagError> {
        Ok(RefreshResult { flags: self.flags.clone(), source_updated_at: None })
    }
}

fn rate_flag(name: &str) -> Flag {
    Flag::RuleList(RuleListFlag {
        name: name.into(),
        active: true,
        rules: vec![RuleInfo {
            rule: Rule::Rate { rate: 0.5, properties: vec!["cluster".into()] },
            on_match: RuleAction::On,
            on_miss: RuleAction::Off,
        }],
    })
}

fn bench_enabled(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let flagset = rt.block_on(async {
        let backend = Arc::new(StaticBackend { flags: vec![rate_flag("bench.flag")] });
        let flagset = Flagset::new(backend, FlagsetOptions::new());
        tokio::time::sleep(Duration::from_millis(20)).await;
        flagset
    });

    let mut tags = TagMap::new();
    tags.insert("cluster".to_string(), "nw".to_string());

    c.bench_function("enabled_hot_path", |b| {
        b.iter(|| black_box(flagset.enabled("bench.flag", tags.clone())));
    });

    rt.block_on(flagset.close());
}

criterion_group!(benches, bench_enabled);
criterion_main!(benches);
