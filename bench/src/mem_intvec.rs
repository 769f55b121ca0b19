use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use tightpack::int_vectors::{RunLengthVec, TightVector};
use tightpack::Serializable;

const NUM_VALUES: usize = 1 << 20;
const SEED_VALUES: u64 = 334;

fn gen_runny_ints(len: usize, max: u64, mean_run: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    let mut ints = Vec::with_capacity(len);
    while ints.len() < len {
        let x = rng.gen_range(0..max);
        let count = rng.gen_range(1..2 * mean_run).min(len - ints.len());
        ints.extend(std::iter::repeat(x).take(count));
    }
    ints
}

fn main() {
    for mean_run in [1, 4, 64] {
        let vals = gen_runny_ints(NUM_VALUES, 1 << 12, mean_run, SEED_VALUES);
        show_memories(&format!("mean_run={mean_run}"), &vals);
    }
}

fn show_data_stats(vals: &[u64]) {
    let nvals = vals.len();
    let max = vals.iter().cloned().max().unwrap();
    let mean = vals.iter().sum::<u64>() as f64 / nvals as f64;

    let mut sorted = vals.to_vec();
    sorted.sort_unstable();
    let median = sorted[nvals / 2];

    println!("Basic: n_vals={nvals}, max_val={max}, mean_val={mean:.3}, median_val={median}");
}

fn show_memories(title: &str, vals: &[u64]) {
    println!("[{title}]");
    show_data_stats(vals);

    let bytes = TightVector::from_slice(vals).size_in_bytes();
    print_memory("TightVector", bytes, vals.len());

    let rl = RunLengthVec::encode(vals.iter().copied());
    println!("RunLengthVec: n_runs={}", rl.num_runs());
    print_memory("RunLengthVec", rl.size_in_bytes(), vals.len());
}

fn print_memory(name: &str, bytes: usize, nvals: usize) {
    println!(
        "{}: {:.3} bits per value",
        name,
        (bytes * 8) as f64 / nvals as f64
    );
}
