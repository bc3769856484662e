//! Benchmarks for the block array container
//!
//! Run with: cargo bench --bench block_array

use token_core::BlockArray;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn filled(count: usize) -> BlockArray<u32> {
    BlockArray::from_vec(256, (0..count as u32).collect())
}

// ============================================================================
// Single element operations
// ============================================================================

#[divan::bench(args = [1_000, 100_000])]
fn insert_middle(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| filled(count))
        .bench_local_values(|mut array| {
            array.insert(count / 2, divan::black_box(7));
            array
        });
}

#[divan::bench(args = [1_000, 100_000])]
fn insert_start(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| filled(count))
        .bench_local_values(|mut array| {
            array.insert(0, divan::black_box(7));
            array
        });
}

#[divan::bench(args = [1_000, 100_000])]
fn remove_middle(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| filled(count))
        .bench_local_values(|mut array| {
            divan::black_box(array.remove_at(count / 2));
            array
        });
}

#[divan::bench(args = [1_000, 100_000])]
fn random_access(bencher: divan::Bencher, count: usize) {
    let array = filled(count);
    bencher.bench_local(|| {
        let mut sum = 0u64;
        for index in (0..count).step_by(97) {
            sum += u64::from(array[divan::black_box(index)]);
        }
        sum
    });
}

// ============================================================================
// Range operations
// ============================================================================

#[divan::bench(args = [100, 10_000])]
fn insert_range_middle(bencher: divan::Bencher, len: usize) {
    bencher
        .with_inputs(|| (filled(100_000), (0..len as u32).collect::<Vec<_>>()))
        .bench_local_values(|(mut array, values)| {
            array.insert_range(50_000, values);
            array
        });
}

#[divan::bench(args = [100, 10_000])]
fn remove_range_middle(bencher: divan::Bencher, len: usize) {
    bencher
        .with_inputs(|| filled(100_000))
        .bench_local_values(|mut array| {
            divan::black_box(array.remove_range(50_000 - len / 2, len));
            array
        });
}

#[divan::bench]
fn iterate_100k(bencher: divan::Bencher) {
    let array = filled(100_000);
    bencher.bench_local(|| array.iter().map(|&v| u64::from(v)).sum::<u64>());
}
