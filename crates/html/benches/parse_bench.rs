use criterion::{Criterion, black_box, criterion_group, criterion_main};
use html::{build_dom, parse_fragment, tokenize};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;

fn make_blocks(blocks: usize) -> String {
    "<p class=box><b>hello</b> &amp; <a href='/x'>world</a><br></p>".repeat(blocks)
}

fn make_rawtext_adversarial(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 32);
    body.push_str("<script>");
    while body.len() < bytes {
        body.push_str("</scri");
        body.push('<');
        body.push_str("pt");
    }
    body.push_str("</script>");
    body
}

fn bench_tokenize_small(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_tokenize_small", |b| {
        b.iter(|| {
            let stream = tokenize(black_box(&input)).expect("well-formed input");
            black_box(stream.tokens().len());
        });
    });
}

fn bench_tokenize_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_tokenize_large", |b| {
        b.iter(|| {
            let stream = tokenize(black_box(&input)).expect("well-formed input");
            black_box(stream.tokens().len());
        });
    });
}

fn bench_tree_build_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    let stream = tokenize(&input).expect("well-formed input");
    c.bench_function("bench_tree_build_large", |b| {
        b.iter(|| black_box(build_dom(black_box(&stream)).is_ok()));
    });
}

fn bench_rawtext_adversarial(c: &mut Criterion) {
    let input = make_rawtext_adversarial(256 * 1024);
    c.bench_function("bench_rawtext_adversarial", |b| {
        b.iter(|| black_box(parse_fragment(black_box(&input)).is_ok()));
    });
}

criterion_group!(
    benches,
    bench_tokenize_small,
    bench_tokenize_large,
    bench_tree_build_large,
    bench_rawtext_adversarial
);
criterion_main!(benches);
