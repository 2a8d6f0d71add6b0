use std::{pin::pin, sync::Arc, thread};

use conveyor::sync::BlockingQueue;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use futures_task::{noop_waker, Context};
use futures_util::Future;

fn bench_blocking_queue_async(c: &mut Criterion) {
    const REPETITIONS: u64 = 1_000_000;
    let mut group = c.benchmark_group("blocking_queue_async");
    group.significance_level(0.1).sample_size(10);
    group.throughput(Throughput::Elements(REPETITIONS));
    group.bench_function("enqueue/dequeue pair", |b| {
        b.iter(|| {
            let queue = Arc::new(BlockingQueue::<u64>::bounded(1024).unwrap());
            let c = thread::spawn({
                let queue = queue.clone();
                move || {
                    let waker = noop_waker();
                    let mut cx = Context::from_waker(&waker);
                    for i in 0..REPETITIONS {
                        let mut fut = pin!(queue.dequeue_async());
                        let val = loop {
                            if let std::task::Poll::Ready(val) = fut.as_mut().poll(&mut cx) {
                                break val;
                            }
                            thread::yield_now();
                        };
                        assert_eq!(i, val);
                    }
                }
            });
            let p = thread::spawn(move || {
                let waker = noop_waker();
                let mut cx = Context::from_waker(&waker);
                for i in 0..REPETITIONS {
                    let mut fut = pin!(queue.enqueue_async(i));
                    while fut.as_mut().poll(&mut cx).is_pending() {
                        thread::yield_now();
                    }
                }
            });
            c.join().unwrap();
            p.join().unwrap();
        })
    });
    group.finish();
}

criterion_group!(benches, bench_blocking_queue_async);
criterion_main!(benches);
