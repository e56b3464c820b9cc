//! Benchmarks for adder evaluation and repair
//!
//! This benchmark suite evaluates generated ripple-carry adders of various widths and
//! repairs copies of them with a fixed set of seeded output swaps.

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use gatefix::Circuit;
use gatefix::adder::{ADDEND, AUGEND, SUM, repair, ripple_carry};
use gatefix::netlist::{parse, serialisation::serialise_netlist};

/// Adder widths available for benchmarking
const WIDTHS: &[usize] = &[16, 32, 45];

/// Build an adder of `width` bits holding all-ones operands
fn build_adder(width: usize) -> Circuit {
    let mut circuit = ripple_carry(width).expect("Failed to build adder");
    let ones = (1u64 << width) - 1;
    circuit.write_bus(AUGEND, ones).expect("Failed to write augend");
    circuit.write_bus(ADDEND, ones).expect("Failed to write addend");
    circuit
}

/// Swap three pairs of outputs spread across the adder
fn seed_swaps(circuit: &mut Circuit, width: usize) {
    let (quarter, half, three_quarters) = (width / 4, width / 2, 3 * width / 4);
    let pairs = [
        (format!("h{:02}", quarter), format!("g{:02}", quarter)),
        (format!("z{:02}", half), format!("c{:02}", half)),
        (format!("z{:02}", three_quarters), format!("p{:02}", three_quarters)),
    ];

    for (a, b) in pairs.iter() {
        circuit.swap_signals(a, b).expect("Failed to seed swap");
    }
}

/// Benchmark netlist parsing
fn bench_netlist_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("netlist_parsing");

    for &width in WIDTHS {
        let netlist = serialise_netlist(&build_adder(width));
        group.throughput(Throughput::Bytes(netlist.len() as u64));

        group.bench_with_input(BenchmarkId::new("parse", width), &netlist, |b, netlist| {
            b.iter(|| black_box(parse(black_box(netlist))))
        });
    }

    group.finish();
}

/// Benchmark reading the sum bus
fn bench_bus_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus_evaluation");

    for &width in WIDTHS {
        let circuit = build_adder(width);
        group.throughput(Throughput::Elements(circuit.len() as u64));

        group.bench_with_input(BenchmarkId::new("read_bus", width), &circuit, |b, circuit| {
            b.iter(|| black_box(circuit.read_bus(black_box(SUM))))
        });
    }

    group.finish();
}

/// Benchmark the repair search on adders with seeded swaps
fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("repair");
    group.sample_size(20);

    for &width in WIDTHS {
        let mut circuit = build_adder(width);
        seed_swaps(&mut circuit, width);
        group.throughput(Throughput::Elements(circuit.len() as u64));

        group.bench_with_input(BenchmarkId::new("seeded", width), &circuit, |b, circuit| {
            b.iter_batched(
                || circuit.clone(),
                |mut circuit| black_box(repair(&mut circuit)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_netlist_parsing,
    bench_bus_evaluation,
    bench_repair
);

criterion_main!(benches);
