//! Benchmarks for the per-request pipeline stages that run before and after
//! the upstream call.
//!
//! Run with: cargo bench --bench classifier_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fireworks_proxy::{
    api::PerformanceMetadata,
    services::{
        classifier::{classify, classify_request, parse_body},
        normalizer::attach_performance,
        ReasoningMethod,
    },
};
use serde_json::json;

fn create_prompt(len: usize, marker: Option<&str>) -> String {
    let mut text = "You are a careful assistant. ".repeat(len / 29 + 1);
    text.truncate(len);
    if let Some(marker) = marker {
        text.push_str(marker);
    }
    text
}

fn create_request_body(message_count: usize) -> String {
    let messages: Vec<_> = (0..message_count)
        .map(|i| {
            json!({
                "role": if i % 2 == 0 { "user" } else { "assistant" },
                "content": format!("Message {} with Chain of Thought reasoning", i)
            })
        })
        .collect();

    json!({
        "model": "accounts/fireworks/models/llama-v3p1-70b-instruct",
        "messages": messages,
        "max_tokens": 1024,
        "temperature": 0.7
    })
    .to_string()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for len in [64, 1024, 16 * 1024].iter() {
        let cases = [
            ("standard", create_prompt(*len, None)),
            ("draft", create_prompt(*len, Some("Chain of Draft"))),
            ("thought", create_prompt(*len, Some("Chain of Thought"))),
        ];

        group.throughput(Throughput::Bytes(*len as u64));
        for (name, text) in cases.iter() {
            group.bench_with_input(BenchmarkId::new(*name, len), text, |b, text| {
                b.iter(|| black_box(classify(black_box(text))));
            });
        }
    }

    group.finish();
}

fn bench_parse_and_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_and_classify");

    for message_count in [1, 10, 100].iter() {
        let raw = create_request_body(*message_count);

        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(message_count),
            &raw,
            |b, raw| {
                b.iter(|| {
                    let body = parse_body(Some(black_box(raw.as_bytes()))).expect("parse_body failed");
                    black_box(classify_request(&body))
                });
            },
        );
    }

    group.finish();
}

fn bench_attach_performance(c: &mut Criterion) {
    let body = json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "391" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 30, "completion_tokens": 2, "total_tokens": 32 }
    });

    c.bench_function("attach_performance", |b| {
        b.iter(|| {
            let perf = PerformanceMetadata {
                response_time_ms: 1234,
                reasoning_method: ReasoningMethod::ChainOfThought,
            };
            black_box(attach_performance(body.clone(), perf))
        });
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_parse_and_classify,
    bench_attach_performance
);
criterion_main!(benches);
