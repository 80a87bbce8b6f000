use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use strided_transmute::{materialize, permutedims, transmute, transpose, ArraySource, StridedArray};

fn make_array(dims: &[usize]) -> StridedArray<f64> {
    StridedArray::from_fn_col_major(dims, |idx| {
        idx.iter().fold(0.0, |acc, &i| acc * 10.0 + i as f64)
    })
}

// Julia equivalent for `bench_materialize`:
// ```julia
// using BenchmarkTools, TransmuteDims
//
// for n in (32, 64, 128)
//     a = rand(n, n, n)
//     @btime copy(transmute($a, (3, 0, 1, 2)))  # reordering
//     @btime copy(transmute($a, (1, 0, 2, 3)))  # linear
// end
// ```
fn bench_materialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize");
    for n in [32usize, 64, 128] {
        let a = make_array(&[n, n, n]);
        group.throughput(Throughput::Elements((n * n * n) as u64));

        let reordered = transmute(&a, &[3, 0, 1, 2]).unwrap();
        group.bench_with_input(BenchmarkId::new("reordered", n), &n, |b, _| {
            b.iter(|| materialize(black_box(&reordered)).unwrap())
        });

        let linear = transmute(&a, &[1, 0, 2, 3]).unwrap();
        group.bench_with_input(BenchmarkId::new("linear", n), &n, |b, _| {
            b.iter(|| materialize(black_box(&linear)).unwrap())
        });
    }
    group.finish();
}

/// Element access through a chain of wrappers, before and after
/// collapsing the chain into one transmute view.
fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_depth_get");
    let a = make_array(&[16, 16, 16]);
    let idx = [3usize, 7, 11];

    let single = permutedims(&a, &[2, 3, 1]).unwrap();
    let chain = transpose(transpose(transpose(permutedims(&a, &[2, 3, 1]).unwrap()).unwrap()).unwrap())
        .unwrap();

    group.bench_function("wrappers", |b| {
        b.iter(|| chain.get(black_box(&idx)).unwrap())
    });

    let collapsed = transmute(&chain, &[1, 2, 3]).unwrap();
    group.bench_function("collapsed", |b| {
        b.iter(|| collapsed.get(black_box(&idx)).unwrap())
    });

    group.bench_function("single_permutedims", |b| {
        b.iter(|| single.get(black_box(&idx)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_materialize, bench_chain_depth);
criterion_main!(benches);
