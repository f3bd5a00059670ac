use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tabload::normalize::normalize_identifier;
use tabload::types::{Column, DataType, TabularData, Value};

fn synthetic(rows: usize) -> TabularData {
    TabularData::new(vec![
        Column::new(
            "name",
            DataType::Text,
            (0..rows).map(|i| Value::Text(format!("person {i}"))).collect(),
        ),
        Column::new(
            "score",
            DataType::Float,
            (0..rows).map(|i| Value::Float(i as f64 / 7.0)).collect(),
        ),
        Column::new(
            "active",
            DataType::Boolean,
            (0..rows).map(|i| Value::Boolean(i % 2 == 0)).collect(),
        ),
    ])
    .unwrap()
}

fn bench_normalize(c: &mut Criterion) {
    let names = [
        "Tank Name",
        "Größe (m³)",
        "Permit #",
        "2020 Total",
        "ORDER",
        "façade_très_longue_col",
    ];
    c.bench_function("normalize_identifier", |b| {
        b.iter(|| {
            for n in &names {
                black_box(normalize_identifier(black_box(n)));
            }
        })
    });
}

fn bench_row_iteration(c: &mut Criterion) {
    let data = synthetic(10_000);
    c.bench_function("row_iteration_10k", |b| {
        b.iter(|| {
            let mut cells = 0usize;
            for row in data.rows() {
                cells += row.len();
            }
            black_box(cells)
        })
    });
}

fn bench_text_sizing(c: &mut Criterion) {
    let data = synthetic(10_000);
    c.bench_function("max_byte_len_10k", |b| {
        b.iter(|| {
            for col in data.columns() {
                black_box(col.max_byte_len());
            }
        })
    });
}

criterion_group!(benches, bench_normalize, bench_row_iteration, bench_text_sizing);
criterion_main!(benches);
