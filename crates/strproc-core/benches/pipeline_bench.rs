//! # Pipeline Benchmarks
//!
//! Performance benchmarks for strproc-core draining.
//!
//! Run with: `cargo bench -p strproc-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use strproc_core::transform::{ExpandTabs, Identity, StripControlChars, Uppercase};
use strproc_core::{Buffer, Pipeline, PipelineConfig, SplitLines, Stage, StageSpec, Transit};

/// Pipeline of `depth` single-slot identity stages.
fn create_transit_chain(depth: usize) -> Pipeline<u64> {
    let stages: Vec<Box<dyn Stage<u64>>> = (0..depth)
        .map(|_| Box::new(Transit::<u64, _>::new(Identity)) as Box<dyn Stage<u64>>)
        .collect();
    Pipeline::new(stages)
}

fn sample_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("line {i}\twith\x01 some\tcontrol\x02 text"))
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_depth");

    for depth in [1, 8, 32].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            b.iter(|| {
                let mut pipeline = create_transit_chain(depth);
                for i in 0..1000u64 {
                    let _ = pipeline.input(i);
                    let _ = pipeline.output();
                }
                black_box(pipeline)
            });
        });
    }

    group.finish();
}

fn bench_text_cleanup(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_cleanup");

    for count in [100, 1000].iter() {
        let lines = sample_lines(*count);

        group.bench_with_input(BenchmarkId::from_parameter(count), &lines, |b, lines| {
            b.iter(|| {
                let mut pipeline = Pipeline::builder()
                    .stage(Transit::new(StripControlChars::new()))
                    .stage(Transit::new(ExpandTabs::new(8)))
                    .stage(Transit::new(Uppercase))
                    .build();
                for line in lines {
                    let _ = pipeline.input(line.clone());
                }
                black_box(pipeline.outputs().count())
            });
        });
    }

    group.finish();
}

fn bench_buffered_backlog(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_backlog");

    // Items pile up in interior buffers when the caller never drains.
    for count in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let mut pipeline = Pipeline::builder()
                    .stage(Transit::<u64, _>::new(Identity))
                    .stage(Buffer::new())
                    .stage(Transit::<u64, _>::new(Identity))
                    .build();
                for i in 0..count as u64 {
                    let _ = pipeline.input(i);
                }
                black_box(pipeline.outputs().count())
            });
        });
    }

    group.finish();
}

fn bench_split_and_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_and_nested");
    let chunk = sample_lines(200).join("\n");

    let config = PipelineConfig::new(vec![
        StageSpec::SplitLines,
        StageSpec::Pipeline {
            stages: vec![StageSpec::StripControl, StageSpec::Uppercase],
        },
    ]);
    let observer: strproc_core::Observer = std::rc::Rc::new(|_: &str| {});

    group.bench_function("config_built", |b| {
        b.iter(|| {
            let Ok(mut pipeline) = config.build(&observer) else {
                return 0;
            };
            let _ = pipeline.input(chunk.clone());
            let _ = pipeline.eof();
            black_box(pipeline.outputs().count())
        });
    });

    group.bench_function("hand_built", |b| {
        b.iter(|| {
            let mut pipeline = Pipeline::builder()
                .stage(SplitLines::new())
                .stage(Transit::new(StripControlChars::new()))
                .stage(Transit::new(Uppercase))
                .build();
            let _ = pipeline.input(chunk.clone());
            let _ = pipeline.eof();
            black_box(pipeline.outputs().count())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_chain_depth,
    bench_text_cleanup,
    bench_buffered_backlog,
    bench_split_and_nested,
);

criterion_main!(benches);
