use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use html5_tree::html5::{Html5TreeBuilder, PatchTreeSink, Token, TreeBuilderConfig};
use html5_tree::{ArenaDom, DomPatch};
use html5_tree_test_support::{drive_tokens, tokenize};

const BLOCKS: usize = 5_000;

fn make_blocks(blocks: usize) -> String {
    let mut out = String::from("<!DOCTYPE html><html><body>");
    for _ in 0..blocks {
        out.push_str("<div class=box><span>hello</span><img src=x></div>");
    }
    out
}

fn make_misnested_formatting(blocks: usize) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    for _ in 0..blocks {
        out.push_str("<b><i><a href=#>x<p>y</b>z</i></a></p>");
    }
    out
}

fn make_tables(rows: usize) -> String {
    let mut out = String::from("<!DOCTYPE html><table>");
    for i in 0..rows {
        // Every fourth row carries stray text that gets foster parented.
        if i % 4 == 0 {
            out.push_str("stray");
        }
        out.push_str("<tr><td>a<td>b</tr>");
    }
    out.push_str("</table>");
    out
}

fn build_arena(tokens: Vec<Token>) -> ArenaDom {
    let mut builder = Html5TreeBuilder::new(TreeBuilderConfig::default(), ArenaDom::new());
    drive_tokens(&mut builder, tokens).expect("tree builder should accept tokens");
    builder.into_sink()
}

fn bench_arena(c: &mut Criterion, name: &str, input: &str) {
    let tokens = tokenize(input);
    c.bench_function(name, |b| {
        b.iter_batched(
            || tokens.clone(),
            |tokens| black_box(build_arena(tokens)),
            BatchSize::LargeInput,
        );
    });
}

fn bench_blocks_arena(c: &mut Criterion) {
    bench_arena(c, "bench_blocks_arena", &make_blocks(BLOCKS));
}

fn bench_misnested_formatting(c: &mut Criterion) {
    bench_arena(c, "bench_misnested_formatting", &make_misnested_formatting(BLOCKS));
}

fn bench_foster_parented_tables(c: &mut Criterion) {
    bench_arena(c, "bench_foster_parented_tables", &make_tables(BLOCKS));
}

fn bench_blocks_patches(c: &mut Criterion) {
    let tokens = tokenize(&make_blocks(BLOCKS));
    c.bench_function("bench_blocks_patches", |b| {
        b.iter_batched(
            || tokens.clone(),
            |tokens| {
                let sink = PatchTreeSink::new(Vec::<DomPatch>::new(), true);
                let mut builder = Html5TreeBuilder::new(TreeBuilderConfig::default(), sink);
                drive_tokens(&mut builder, tokens).expect("tree builder should accept tokens");
                black_box(builder.into_sink().into_inner().len());
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_blocks_arena,
    bench_misnested_formatting,
    bench_foster_parented_tables,
    bench_blocks_patches
);
criterion_main!(benches);
