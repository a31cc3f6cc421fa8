//! Concurrent append, subscribe and cancel.

use contact_hub::{BroadcastHub, Sequence, SubscriptionConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_subscribe_during_appends_sees_each_event_once() {
    init_tracing();
    let hub = BroadcastHub::new();
    let total = 2_000u64;

    let writer = {
        let hub = hub.clone();
        thread::spawn(move || {
            for i in 1..=total {
                hub.append(i).unwrap();
            }
        })
    };

    let mut subs = Vec::new();
    for _ in 0..20 {
        subs.push(hub.subscribe().unwrap());
        thread::yield_now();
    }

    writer.join().unwrap();
    hub.shutdown();

    for sub in subs {
        let seen: Vec<u64> = sub.map(|e| e.payload).collect();
        assert_eq!(seen, (1..=total).collect::<Vec<_>>());
    }
}

#[test]
fn test_live_start_during_appends_has_no_gap_or_duplicate() {
    let hub = BroadcastHub::new();
    let total = 2_000u64;

    let writer = {
        let hub = hub.clone();
        thread::spawn(move || {
            for i in 1..=total {
                hub.append(i).unwrap();
            }
        })
    };

    let mut subs = Vec::new();
    for _ in 0..20 {
        subs.push(hub.subscribe_with(SubscriptionConfig::live()).unwrap());
        thread::yield_now();
    }

    writer.join().unwrap();
    hub.shutdown();

    for sub in subs {
        let start = sub.cursor().0;
        let seen: Vec<u64> = sub.map(|e| e.payload).collect();
        assert_eq!(seen, (start + 1..=total).collect::<Vec<_>>());
    }
}

#[test]
fn test_concurrent_writers_get_gapless_sequences() {
    let hub = BroadcastHub::new();
    let sub = hub.subscribe().unwrap();
    let writers = 4;
    let per_writer = 500;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|w| {
            let hub = hub.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..per_writer)
                    .map(|i| hub.append((w, i)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut assigned: Vec<Sequence> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assigned.sort();
    let expected: Vec<_> = (1..=(writers * per_writer) as u64).map(Sequence).collect();
    assert_eq!(assigned, expected);

    // Each writer's own events arrive in the order it appended them.
    hub.shutdown();
    let mut last_seen = vec![None; writers];
    let mut previous = Sequence(0);
    for event in sub {
        assert_eq!(event.sequence, previous.next());
        previous = event.sequence;

        let (w, i) = event.payload;
        if let Some(last) = last_seen[w] {
            assert!(i > last);
        }
        last_seen[w] = Some(i);
    }
    assert_eq!(previous, Sequence((writers * per_writer) as u64));
}

#[test]
fn test_stalled_subscriber_does_not_block_writer_or_others() {
    let hub = BroadcastHub::new();
    let total = 10_000u64;

    // Never reads.
    let _stalled = hub.subscribe().unwrap();

    // Holds its subscription but sleeps instead of reading.
    let release = Arc::new(AtomicBool::new(false));
    let sleeper = {
        let sub = hub.subscribe().unwrap();
        let release = Arc::clone(&release);
        thread::spawn(move || {
            while !release.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(5));
            }
            sub.map(|e| e.payload).count()
        })
    };

    let reader = {
        let sub = hub.subscribe().unwrap();
        thread::spawn(move || sub.map(|e| e.payload).collect::<Vec<u64>>())
    };

    let started = Instant::now();
    for i in 1..=total {
        hub.append(i).unwrap();
    }
    assert!(started.elapsed() < Duration::from_secs(10));

    hub.shutdown();
    assert_eq!(reader.join().unwrap(), (1..=total).collect::<Vec<_>>());

    release.store(true, Ordering::SeqCst);
    assert_eq!(sleeper.join().unwrap(), total as usize);
}

#[test]
fn test_cancel_races_delivery() {
    let hub = BroadcastHub::new();
    let sub = Arc::new(hub.subscribe().unwrap());

    let reader = {
        let sub = Arc::clone(&sub);
        thread::spawn(move || {
            let mut seen = Vec::new();
            while let Some(event) = sub.recv() {
                seen.push(event.sequence);
            }
            seen
        })
    };

    for i in 0..1_000u32 {
        hub.append(i).unwrap();
        if i == 500 {
            sub.cancel();
        }
    }

    let seen = reader.join().unwrap();
    // A prefix, in order, with nothing after the cancel point.
    assert!(seen.len() <= 501);
    for (i, seq) in seen.iter().enumerate() {
        assert_eq!(*seq, Sequence(i as u64 + 1));
    }
    assert!(!sub.is_active());
    assert_eq!(hub.subscription_count(), 0);
}

#[test]
fn test_delivery_threads_fan_out() {
    let hub = BroadcastHub::new();
    let deliveries: Vec<_> = (0..8)
        .map(|_| hub.subscribe().unwrap().spawn_delivery().unwrap())
        .collect();

    for i in 0..100u32 {
        hub.append(i).unwrap();
    }
    hub.shutdown();

    for delivery in deliveries {
        let seen: Vec<u32> = delivery.receiver.iter().map(|e| e.payload).collect();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        delivery.join().unwrap();
    }
}

#[test]
fn test_subscribe_racing_shutdown_leaves_nothing_registered() {
    for _ in 0..20 {
        let hub = BroadcastHub::<u32>::new();
        let threads = 4;
        let barrier = Arc::new(Barrier::new(threads + 1));

        // Each thread keeps its most recent subscription alive, so a
        // registration that slipped past the shutdown would stay counted.
        let subscribers: Vec<_> = (0..threads)
            .map(|_| {
                let hub = hub.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut last = None;
                    while let Ok(sub) = hub.subscribe() {
                        last = Some(sub);
                    }
                    last
                })
            })
            .collect();

        barrier.wait();
        thread::yield_now();
        hub.shutdown();

        let held: Vec<_> = subscribers.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(hub.subscription_count(), 0);
        for sub in held.into_iter().flatten() {
            assert!(sub.recv().is_none());
        }
    }
}
