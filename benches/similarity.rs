//! Benchmarks for transcript scoring and the capture session

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use drill_rs::speech::{ManualClock, ScriptedCapability, ScriptedPlayback};
use drill_rs::{classify, similarity, Config, SpeechSession};

const TARGET: &str = "We have been supplying SiC substrates to automotive customers since 2019.";

/// Interim transcripts growing word by word, as a recognizer emits them
fn interim_transcripts(target: &str) -> Vec<String> {
    let words: Vec<&str> = target.split_whitespace().collect();
    (1..=words.len()).map(|n| words[..n].join(" ")).collect()
}

fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");

    group.bench_function("exact_match", |b| {
        b.iter(|| similarity(black_box(TARGET), black_box(TARGET)))
    });

    group.bench_function("empty_heard", |b| {
        b.iter(|| similarity(black_box(""), black_box(TARGET)))
    });

    // Cost grows with both lengths
    for repeat in [1, 4, 16] {
        let target = vec![TARGET; repeat].join(" ");
        let heard = target.to_lowercase().replace("supplying", "applying");

        group.bench_with_input(
            BenchmarkId::new("length", target.len()),
            &(heard, target),
            |b, (heard, target)| b.iter(|| similarity(black_box(heard), black_box(target))),
        );
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_sweep", |b| {
        b.iter(|| {
            for i in 0..=100 {
                black_box(classify(i as f64 / 100.0));
            }
        })
    });
}

fn bench_session_attempt(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let config = Config::default();
    let transcripts = interim_transcripts(TARGET);

    // One attempt fed interim transcripts until auto-stop fires
    group.bench_function("interim_to_auto_stop", |b| {
        b.iter_with_setup(
            || {
                let capability = ScriptedCapability::new();
                let clock = ManualClock::new();
                let session = SpeechSession::with_clock(
                    &config,
                    capability.clone(),
                    ScriptedPlayback::new(),
                    clock.clone(),
                );
                (session, capability, clock)
            },
            |(mut session, capability, clock)| {
                session.begin_attempt(TARGET).unwrap();
                for text in &transcripts {
                    capability.say(text);
                    clock.advance(Duration::from_millis(100));
                    if let Some(result) = session.pump().unwrap() {
                        return black_box(result);
                    }
                }
                clock.advance(config.session.grace_delay());
                black_box(session.pump().unwrap().unwrap())
            },
        )
    });

    group.finish();
}

criterion_group!(benches, bench_similarity, bench_classify, bench_session_attempt);
criterion_main!(benches);
