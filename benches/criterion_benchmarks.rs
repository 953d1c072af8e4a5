use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use earl::{DecodeOptions, EncodeOptions, Term};
use num_bigint::BigInt;

/// The keyed document used as the baseline workload.
fn structure() -> Term {
    Term::Object(vec![
        (
            "a".into(),
            Term::List(vec![Term::Integer(1), Term::Integer(2), Term::Binary("hi".into())]),
        ),
        (
            "b".into(),
            Term::Object(vec![
                ("c".into(), Term::Binary("memes".into())),
                (
                    "d".into(),
                    Term::List(vec![
                        Term::Float(12.5),
                        Term::BigInt(BigInt::from(2_417_298_371_923_812_i64)),
                        Term::Binary("123971293817293817293".into()),
                    ]),
                ),
            ]),
        ),
    ])
}

fn gen_list(len: usize, seed: u64) -> Term {
    let mut s = seed;
    let items = (0..len)
        .map(|i| {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            match i % 4 {
                0 => Term::Integer((s >> 40) as i64 - (1 << 23)),
                1 => Term::Float((s >> 11) as f64 / (1u64 << 53) as f64),
                2 => Term::Binary(format!("item-{}", s >> 48)),
                _ => Term::atom(if s & 1 == 0 { "even" } else { "odd" }),
            }
        })
        .collect();
    Term::List(items)
}

fn gen_map(len: usize) -> Term {
    Term::Object(
        (0..len)
            .map(|i| (format!("key{i}"), Term::List(vec![Term::Integer(i as i64), Term::Boolean(i % 2 == 0)])))
            .collect(),
    )
}

fn bench_structure(c: &mut Criterion) {
    let term = structure();
    let packed = earl::pack(&term).unwrap();
    let as_object = DecodeOptions {
        map_as_object: true,
        ..Default::default()
    };

    let mut g = c.benchmark_group("structure");
    g.bench_function("pack", |b| {
        b.iter(|| black_box(earl::pack(black_box(&term)).unwrap()));
    });
    g.bench_function("unpack", |b| {
        b.iter(|| black_box(earl::unpack(black_box(&packed)).unwrap()));
    });
    g.bench_function("unpack_map_as_object", |b| {
        b.iter(|| black_box(earl::unpack_with(black_box(&packed), &as_object).unwrap()));
    });
    g.finish();
}

fn bench_list_scaling(c: &mut Criterion) {
    let mut g = c.benchmark_group("list_scaling");
    for len in [16usize, 1024, 65_536] {
        let term = gen_list(len, len as u64);
        let packed = earl::pack(&term).unwrap();
        g.throughput(Throughput::Bytes(packed.len() as u64));
        g.bench_with_input(BenchmarkId::new("pack", len), &term, |b, term| {
            b.iter(|| black_box(earl::pack(black_box(term)).unwrap()));
        });
        g.bench_with_input(BenchmarkId::new("unpack", len), &packed, |b, packed| {
            b.iter(|| black_box(earl::unpack(black_box(packed)).unwrap()));
        });
    }
    g.finish();
}

fn bench_map_scaling(c: &mut Criterion) {
    let as_object = DecodeOptions {
        map_as_object: true,
        ..Default::default()
    };
    let mut g = c.benchmark_group("map_scaling");
    for len in [16usize, 1024, 16_384] {
        let term = gen_map(len);
        let packed = earl::pack(&term).unwrap();
        g.throughput(Throughput::Bytes(packed.len() as u64));
        g.bench_with_input(BenchmarkId::new("unpack_pairs", len), &packed, |b, packed| {
            b.iter(|| black_box(earl::unpack(black_box(packed)).unwrap()));
        });
        g.bench_with_input(BenchmarkId::new("unpack_object", len), &packed, |b, packed| {
            b.iter(|| black_box(earl::unpack_with(black_box(packed), &as_object).unwrap()));
        });
    }
    g.finish();
}

fn bench_compression_levels(c: &mut Criterion) {
    let term = gen_list(16_384, 7);
    let mut g = c.benchmark_group("compression_level");
    for level in [1u32, 6, 9] {
        let opts = EncodeOptions {
            compression: Some(level),
            ..Default::default()
        };
        let packed = earl::pack_with(&term, &opts).unwrap();
        g.bench_with_input(BenchmarkId::new("pack", level), &opts, |b, opts| {
            b.iter(|| black_box(earl::pack_with(black_box(&term), opts).unwrap()));
        });
        g.bench_with_input(BenchmarkId::new("unpack", level), &packed, |b, packed| {
            b.iter(|| black_box(earl::unpack(black_box(packed)).unwrap()));
        });
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_structure,
    bench_list_scaling,
    bench_map_scaling,
    bench_compression_levels
);
criterion_main!(benches);
