use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emoji_core_wasm::{
    synthesize_conversations, EmojiSuggester, LexiconScorer, PolarityScorer, SentimentEngine,
};

fn generate_history(num_messages: usize) -> Vec<String> {
    let phrases = [
        "I love this weather",
        "that sounds great",
        "I'm not sure yet",
        "this is terrible, I hate waiting",
        "what do you think about it",
        "really happy for you 😀",
        "ugh, the build is broken again 😭",
        "see you later",
    ];
    (0..num_messages)
        .map(|i| phrases[i % phrases.len()].to_string())
        .collect()
}

fn bench_lexicon(c: &mut Criterion) {
    let scorer = LexiconScorer::new();
    let history = generate_history(64);
    c.bench_function("lexicon_polarity", |b| {
        b.iter(|| {
            for text in &history {
                black_box(scorer.polarity(black_box(text)));
            }
        })
    });
}

fn bench_long_term(c: &mut Criterion) {
    let engine = SentimentEngine::new(LexiconScorer::new());
    let history = generate_history(1000);
    let mut group = c.benchmark_group("long_term");

    for window in [1, 10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("window", window), window, |b, &window| {
            b.iter(|| engine.long_term(black_box(&history), window));
        });
    }

    group.finish();
}

fn bench_suggest(c: &mut Criterion) {
    let mut group = c.benchmark_group("suggest");
    let cases = [("aligned", 0.8, 0.7), ("divergent", 0.9, -0.9)];

    for (label, short, long) in cases {
        for count in [3usize, 20, 60] {
            let mut suggester = EmojiSuggester::with_seed(42);
            group.bench_with_input(
                BenchmarkId::new(label, count),
                &count,
                |b, &count| {
                    b.iter(|| suggester.suggest(black_box(short), black_box(long), count));
                },
            );
        }
    }

    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let conversations = synthesize_conversations(100, Some(7));
    let mut group = c.benchmark_group("replay");
    group.sample_size(10);

    group.bench_function("synthetic_100", |b| {
        b.iter(|| {
            let mut pipeline =
                emoji_core_wasm::lexicon_pipeline(Default::default(), Some(1));
            pipeline.replay(black_box(&conversations))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexicon,
    bench_long_term,
    bench_suggest,
    bench_replay
);
criterion_main!(benches);
