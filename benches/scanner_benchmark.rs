use std::{fs, sync::LazyLock, time::Duration};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lexrt::{DenseTables, Flow, ScannerBuilder, TableSet};

static SCANNER_INPUT: LazyLock<String> = LazyLock::new(|| {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/statements.input");
    fs::read_to_string(path).unwrap().repeat(2000)
});

static DENSE_TABLES: LazyLock<DenseTables> = LazyLock::new(|| {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/statements.json");
    let file = fs::File::open(path).unwrap();
    serde_json::from_reader(file).unwrap()
});

static TABLES: LazyLock<TableSet> = LazyLock::new(|| DENSE_TABLES.build().unwrap());

fn builder_benchmark(c: &mut Criterion) {
    c.bench_function("builder_benchmark", |b| {
        b.iter(|| {
            black_box(DENSE_TABLES.build().unwrap());
        });
    });
}

fn scanner_benchmark(c: &mut Criterion) {
    c.bench_function("scanner_benchmark", |b| {
        b.iter(|| {
            let mut scanner = ScannerBuilder::new(&TABLES)
                .build(SCANNER_INPUT.as_bytes(), std::io::sink())
                .unwrap();
            // Count all tokens
            let mut count = 0usize;
            scanner
                .scan_with(|rule, _| {
                    count += black_box(rule);
                    Ok(Flow::Continue)
                })
                .unwrap();
            black_box(count);
        });
    });
}

fn edit_benchmark(c: &mut Criterion) {
    c.bench_function("edit_benchmark", |b| {
        b.iter(|| {
            let mut scanner = ScannerBuilder::new(&TABLES)
                .build(SCANNER_INPUT.as_bytes(), std::io::sink())
                .unwrap();
            // Return the last byte of every identifier to the input
            scanner
                .scan_with(|rule, s| {
                    if rule == 2 && s.length() > 1 {
                        s.less(s.length() - 1)?;
                    }
                    Ok(Flow::Continue)
                })
                .unwrap();
        });
    });
}

criterion_group! {
    name = benchesscanner;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = scanner_benchmark, edit_benchmark
}

criterion_group! {
    name = benchesbuilder;
    config = Criterion::default();
    targets = builder_benchmark
}

criterion_main!(benchesscanner, benchesbuilder);
