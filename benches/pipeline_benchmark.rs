//! Benchmarks for the highlighting pipeline stages
//!
//! Benchmarks:
//! - Decoding a large semantic stream
//! - Merging semantic and lexical streams with frequent collisions
//! - Stapling over multi-byte text in each position encoding
//! - Full highlight of a generated C file
//!
//! Run with: cargo bench --bench pipeline_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lsp_highlight::decoder::{decode, encode};
use lsp_highlight::language::Language;
use lsp_highlight::lexical::{self, CompilerToken, CompilerTokenKind, SourceLocation};
use lsp_highlight::merge::merge;
use lsp_highlight::staple::staple;
use lsp_highlight::tokens::types;
use lsp_highlight::{AbsoluteToken, HighlightRequest, Highlighter, TextPositionEncoding, TokenLegend};

// Helper to generate a C-like file; every line carries a multi-byte string literal
fn generate_source(line_count: usize) -> String {
    let mut source = String::new();
    for i in 0..line_count {
        source.push_str(&format!("int value_{} = call(\"é😀\", {}); // note\n", i, i));
    }
    source
}

// Semantic tokens for `int`, the identifier and `call`, in UTF-16 units
fn semantic_tokens(source: &str) -> Vec<AbsoluteToken> {
    let mut tokens = Vec::new();
    for (line, text) in source.split('\n').enumerate() {
        if text.is_empty() {
            continue;
        }
        let name_end = text.find(' ').unwrap_or(0) + 1 + text[4..].find(' ').unwrap_or(0);
        tokens.push(AbsoluteToken::new(line, 0, 3, types::KEYWORD));
        tokens.push(AbsoluteToken::new(line, 4, name_end - 4, types::VARIABLE));
        tokens.push(AbsoluteToken::new(line, name_end + 3, 4, types::FUNCTION));
    }
    tokens
}

// Compiler tokens: a colliding keyword, the string literal and the trailing comment
fn compiler_tokens(source: &str) -> Vec<CompilerToken> {
    let mut tokens = Vec::new();
    for (index, text) in source.split('\n').enumerate() {
        if text.is_empty() {
            continue;
        }
        let line = index as u32 + 1;
        let quote = text.find('"').unwrap_or(0) as u32 + 1;
        let comment = text.find("//").unwrap_or(0) as u32 + 1;
        let at = |column| SourceLocation::new(line, column);
        tokens.push(CompilerToken::new(CompilerTokenKind::Keyword, at(1), at(4)));
        tokens.push(CompilerToken::new(CompilerTokenKind::LiteralString, at(quote), at(quote + 8)));
        tokens.push(CompilerToken::new(CompilerTokenKind::Comment, at(comment), at(text.len() as u32 + 1)));
    }
    tokens
}

fn legend() -> TokenLegend {
    TokenLegend::new([types::KEYWORD, types::VARIABLE, types::FUNCTION], Vec::<&str>::new())
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let legend = legend();

    for line_count in [100, 1_000, 10_000] {
        let source = generate_source(line_count);
        let stream = encode(&semantic_tokens(&source), &legend).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(line_count), &stream, |b, stream| {
            b.iter(|| decode(black_box(stream), &legend).unwrap());
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for line_count in [100, 1_000, 10_000] {
        let source = generate_source(line_count);
        let lines: Vec<&str> = source.split('\n').collect();
        let semantic = semantic_tokens(&source);
        let lexical = lexical::adapt(&compiler_tokens(&source), &lines, TextPositionEncoding::Utf16).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(line_count),
            &(semantic, lexical),
            |b, (semantic, lexical)| {
                b.iter(|| merge(black_box(semantic), black_box(lexical)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_staple(c: &mut Criterion) {
    let mut group = c.benchmark_group("staple");
    let source = generate_source(1_000);
    let lines: Vec<&str> = source.split('\n').collect();

    for encoding in TextPositionEncoding::ALL {
        let lexical = lexical::adapt(&compiler_tokens(&source), &lines, encoding).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(encoding), &lexical, |b, tokens| {
            b.iter(|| staple(black_box(tokens), &lines, encoding).unwrap());
        });
    }

    group.finish();
}

fn bench_highlight(c: &mut Criterion) {
    let source = generate_source(1_000);
    let legend = legend();
    let stream = encode(&semantic_tokens(&source), &legend).unwrap();
    let compiler = compiler_tokens(&source);
    let highlighter = Highlighter::default();

    c.bench_function("highlight_1000_lines", |b| {
        b.iter(|| {
            let request = HighlightRequest::new(&source, &stream, &legend)
                .with_compiler_tokens(&compiler)
                .with_language(Some(Language::C));
            highlighter.highlight(black_box(&request)).unwrap()
        });
    });
}

criterion_group!(benches, bench_decode, bench_merge, bench_staple, bench_highlight);
criterion_main!(benches);
