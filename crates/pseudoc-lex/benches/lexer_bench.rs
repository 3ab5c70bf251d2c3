//! Lexer benchmarks.
//!
//! Run with: `cargo bench --package pseudoc-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pseudoc_lex::lex;

fn lexer_token_count(source: &str) -> usize {
    lex(source).expect("benchmark source must lex").len()
}

fn bench_lexer_statements(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let source = "DECLARE x : INTEGER\nx <- 41\nOUTPUT x + 1";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("simple_declare", |b| {
        b.iter(|| lexer_token_count(black_box("DECLARE x : INTEGER")))
    });

    group.bench_function("declare_assign_output", |b| {
        b.iter(|| lexer_token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_complex");

    let source = r#"
TYPE Point
DECLARE x : INTEGER
DECLARE y : INTEGER
ENDTYPE

FUNCTION Dist(a : Point, b : Point) RETURNS REAL
DECLARE dx : INTEGER
DECLARE dy : INTEGER
dx <- a.x - b.x
dy <- a.y - b.y
RETURN dx * dx + dy * dy
ENDFUNCTION

DECLARE grid : ARRAY[1:10, 1:10] OF REAL
DECLARE i : INTEGER
FOR i <- 1 TO 10
grid[i, i] <- RAND(1) // diagonal noise
NEXT i

CASE OF i
10 : OUTPUT "done"
OTHERWISE OUTPUT "impossible"
ENDCASE
"#;

    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("complex_source", |b| {
        b.iter(|| lexer_token_count(black_box(source)))
    });

    group.finish();
}

criterion_group!(benches, bench_lexer_statements, bench_lexer_complex);
criterion_main!(benches);
