use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use criterion::{Criterion, criterion_group, criterion_main};
use priority_channel::PriorityChannel;

/// Spawns a consumer that keeps the channel drained for the whole benchmark.
/// The thread is torn down with the process.
fn spawn_consumer(chan: &Arc<PriorityChannel<u64>>) {
    let chan = Arc::clone(chan);
    thread::spawn(move || {
        loop {
            let _ = chan.recv();
        }
    });
}

fn single_level_handoff(c: &mut Criterion) {
    let chan = Arc::new(PriorityChannel::new());
    spawn_consumer(&chan);

    c.bench_function("priority_channel single_level_handoff", |b| {
        b.iter(|| chan.send(black_box(1), black_box(42)))
    });
}

fn rotating_levels_handoff(c: &mut Criterion) {
    let chan = Arc::new(PriorityChannel::new());
    spawn_consumer(&chan);

    let mut priority = 0;
    c.bench_function("priority_channel rotating_levels_handoff", |b| {
        b.iter(|| {
            priority = (priority + 1) % 8;
            chan.send(black_box(priority), black_box(42));
        })
    });
}

criterion_group!(benches, single_level_handoff, rotating_levels_handoff);
criterion_main!(benches);
