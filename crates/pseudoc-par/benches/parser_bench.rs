//! Parser benchmarks.
//!
//! Run with: `cargo bench --package pseudoc-par`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pseudoc_lex::lex;
use pseudoc_par::parse;

fn parse_statement_count(source: &str) -> usize {
    let tokens = lex(source).expect("benchmark source must lex");
    parse(tokens).expect("benchmark source must parse").len()
}

fn bench_parser_statements(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let source = "DECLARE x : INTEGER\nx <- 41\nOUTPUT x + 1";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("declare_assign_output", |b| {
        b.iter(|| parse_statement_count(black_box(source)))
    });

    group.bench_function("nested_expression", |b| {
        b.iter(|| parse_statement_count(black_box("x <- 1 + 2 * 3 - (4 / 5) & \"!\"")))
    });

    group.finish();
}

fn bench_parser_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_complex");

    let source = r#"
TYPE Point
DECLARE x : INTEGER
DECLARE y : INTEGER
ENDTYPE

FUNCTION Sum(n : INTEGER) RETURNS INTEGER
DECLARE total : INTEGER
DECLARE i : INTEGER
total <- 0
FOR i <- 1 TO n
total <- total + i
NEXT i
RETURN total
ENDFUNCTION

DECLARE p : Point
DECLARE r : INTEGER
p.x <- 3
r <- Sum(p.x)
CASE OF r
6 : OUTPUT "six"
OTHERWISE OUTPUT r
ENDCASE
"#;

    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("definitions_and_calls", |b| {
        b.iter(|| parse_statement_count(black_box(source)))
    });

    group.finish();
}

criterion_group!(benches, bench_parser_statements, bench_parser_complex);
criterion_main!(benches);
