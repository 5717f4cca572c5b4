use criterion::{Criterion, criterion_group, criterion_main};
use markdown_columns_engine::columns::{parse, serialize};
use markdown_columns_engine::editing::{Document, find_column_blocks};
use markdown_columns_engine::sync::SyncController;
use std::hint::black_box;
mod common;

fn bench_block_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_text");
    group.sample_size(20);

    let text = common::generate_block_text(4, 50);
    group.bench_function("parse", |b| {
        b.iter(|| black_box(parse(black_box(&text))));
    });

    let block = parse(&text);
    group.bench_function("serialize", |b| {
        b.iter(|| black_box(serialize(black_box(&block))));
    });

    group.finish();
}

fn bench_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");
    group.sample_size(20);

    let content = common::generate_document(50);
    group.bench_function("find_column_blocks", |b| {
        b.iter(|| black_box(find_column_blocks(black_box(&content)).unwrap()));
    });

    let sites = find_column_blocks(&content).unwrap();
    let last = sites.last().unwrap();
    group.bench_function("write_back_last_block", |b| {
        b.iter(|| {
            let mut doc = Document::from_bytes(content.as_bytes()).unwrap();
            let mut sync = SyncController::for_site(last);
            let mut block = parse(&last.source);
            block.set_column_content(0, "changed\n");
            black_box(sync.write_now(&mut doc, &serialize(&block)));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_block_text, bench_document);
criterion_main!(benches);
