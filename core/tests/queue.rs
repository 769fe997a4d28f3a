use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simple_lockfree_core::common::constants::cpu_count;
use simple_lockfree_core::{MsQueue, Queue, TwoPointerQueue};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

const PER_PRODUCER: u64 = 10_000;

fn init() {
    #[cfg(feature = "ci")]
    simple_lockfree_core::common::ci::init();
    #[cfg(feature = "log")]
    simple_lockfree_core::common::init_log();
}

fn workers() -> usize {
    cpu_count().clamp(2, 4)
}

fn spsc_fifo<Q: Queue<u64> + Send + Sync + 'static>(queue: Q) -> std::io::Result<()> {
    init();
    let queue = Arc::new(queue);
    let producer = {
        let queue = queue.clone();
        std::thread::Builder::new()
            .name(String::from("producer"))
            .spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.enqueue(i);
                }
            })?
    };
    let mut expected = 0;
    while expected < PER_PRODUCER {
        match queue.dequeue() {
            Some(i) => {
                assert_eq!(expected, i);
                expected += 1;
            }
            None => std::thread::yield_now(),
        }
    }
    producer.join().unwrap();
    assert!(queue.is_empty());
    assert_eq!(queue.dequeue(), None);
    Ok(())
}

/// Every element dequeued exactly once, and each consumer sees each producer's elements in order.
fn mpmc_conservation<Q: Queue<u64> + Send + Sync + 'static>(queue: Q) -> std::io::Result<()> {
    init();
    let producers = workers();
    let consumers = workers();
    let total = producers * usize::try_from(PER_PRODUCER).unwrap();
    let queue = Arc::new(queue);
    let seen = Arc::new(DashMap::new());
    let consumed = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(producers + consumers));
    let mut handles = Vec::new();
    for p in 0..producers {
        let queue = queue.clone();
        let start = start.clone();
        handles.push(
            std::thread::Builder::new()
                .name(format!("producer-{p}"))
                .spawn(move || {
                    _ = start.wait();
                    let base = u64::try_from(p).unwrap() * PER_PRODUCER;
                    for i in 0..PER_PRODUCER {
                        queue.enqueue(base + i);
                    }
                })?,
        );
    }
    for c in 0..consumers {
        let queue = queue.clone();
        let start = start.clone();
        let seen = seen.clone();
        let consumed = consumed.clone();
        handles.push(
            std::thread::Builder::new()
                .name(format!("consumer-{c}"))
                .spawn(move || {
                    let mut last = vec![None; producers];
                    _ = start.wait();
                    while consumed.load(Ordering::Acquire) < total {
                        let Some(value) = queue.dequeue() else {
                            std::thread::yield_now();
                            continue;
                        };
                        _ = consumed.fetch_add(1, Ordering::AcqRel);
                        assert!(seen.insert(value, c).is_none(), "{value} dequeued twice");
                        let producer = usize::try_from(value / PER_PRODUCER).unwrap();
                        assert!(last[producer] < Some(value), "{value} out of order");
                        last[producer] = Some(value);
                    }
                })?,
        );
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(total, seen.len());
    assert!(queue.is_empty());
    assert_eq!(queue.head(), None);
    Ok(())
}

/// `head` never returns an element that was not enqueued while consumers drain the queue.
fn head_during_drain<Q: Queue<u64> + Send + Sync + 'static>(queue: Q) -> std::io::Result<()> {
    init();
    let queue = Arc::new(queue);
    for i in 0..PER_PRODUCER {
        queue.enqueue(i);
    }
    let mut handles = Vec::new();
    for c in 0..workers() {
        let queue = queue.clone();
        handles.push(
            std::thread::Builder::new()
                .name(format!("consumer-{c}"))
                .spawn(move || while queue.dequeue().is_some() {})?,
        );
    }
    let mut previous = None;
    while let Some(head) = queue.head() {
        assert!(head < PER_PRODUCER);
        assert!(previous <= Some(head), "head moved backwards");
        previous = Some(head);
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(queue.is_empty());
    Ok(())
}

fn matches_model<Q: Queue<u32>>(queue: &Q) {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut model = VecDeque::new();
    for _ in 0..10_000 {
        if rng.random_bool(0.55) {
            let value = rng.random::<u32>();
            queue.enqueue(value);
            model.push_back(value);
        } else {
            assert_eq!(model.pop_front(), queue.dequeue());
        }
        assert_eq!(model.front().copied(), queue.head());
        assert_eq!(model.is_empty(), queue.is_empty());
    }
}

#[test]
fn ms_queue_spsc_fifo() -> std::io::Result<()> {
    spsc_fifo(MsQueue::new())
}

#[test]
fn two_pointer_queue_spsc_fifo() -> std::io::Result<()> {
    spsc_fifo(TwoPointerQueue::new())
}

#[test]
fn ms_queue_mpmc_conservation() -> std::io::Result<()> {
    mpmc_conservation(MsQueue::new())
}

#[test]
fn two_pointer_queue_mpmc_conservation() -> std::io::Result<()> {
    mpmc_conservation(TwoPointerQueue::new())
}

#[test]
fn ms_queue_head_during_drain() -> std::io::Result<()> {
    head_during_drain(MsQueue::new())
}

#[test]
fn two_pointer_queue_head_during_drain() -> std::io::Result<()> {
    head_during_drain(TwoPointerQueue::new())
}

#[test]
fn ms_queue_matches_model() {
    matches_model(&MsQueue::new());
}

#[test]
fn two_pointer_queue_matches_model() {
    matches_model(&TwoPointerQueue::new());
}

/// Two enqueuers race one dequeuer on an empty queue: nothing is lost and nothing duplicated.
#[test]
fn two_pointer_queue_empty_to_one_race() -> std::io::Result<()> {
    init();
    for _ in 0..500 {
        let queue = Arc::new(TwoPointerQueue::new());
        let start = Arc::new(Barrier::new(3));
        let enqueuers: Vec<_> = [1, 2]
            .into_iter()
            .map(|value| {
                let queue = queue.clone();
                let start = start.clone();
                std::thread::Builder::new().spawn(move || {
                    _ = start.wait();
                    queue.enqueue(value);
                })
            })
            .collect::<std::io::Result<_>>()?;
        let dequeuer = {
            let queue = queue.clone();
            let start = start.clone();
            std::thread::Builder::new().spawn(move || {
                _ = start.wait();
                queue.dequeue()
            })?
        };
        for enqueuer in enqueuers {
            enqueuer.join().unwrap();
        }
        let mut all: Vec<u8> = dequeuer.join().unwrap().into_iter().collect();
        all.extend(std::iter::from_fn(|| queue.dequeue()));
        all.sort_unstable();
        assert_eq!(vec![1, 2], all);
        assert!(queue.is_empty());
    }
    Ok(())
}

#[test]
fn absent_element_is_rejected() {
    let queues: [Box<dyn Queue<String>>; 2] =
        [Box::new(MsQueue::new()), Box::new(TwoPointerQueue::new())];
    for queue in queues {
        let error = queue.try_enqueue(None).unwrap_err();
        assert_eq!(std::io::ErrorKind::InvalidInput, error.kind());
        assert!(queue.is_empty());
        assert!(queue.try_enqueue(Some(String::from("x"))).is_ok());
        assert_eq!(queue.dequeue().as_deref(), Some("x"));
    }
}
