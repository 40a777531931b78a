//! Draining while other threads keep tracing.

use std::sync::Arc;
use std::thread;

use deferlog_core::{Arg, Tracer};

#[test]
fn test_drains_lose_and_duplicate_nothing() {
    const WRITERS: usize = 4;
    const PER_WRITER: usize = 250;

    let tracer = Arc::new(Tracer::new());
    let handles: Vec<_> = (0..WRITERS)
        .map(|w| {
            let tracer = Arc::clone(&tracer);
            thread::spawn(move || {
                for i in 0..PER_WRITER {
                    tracer.log("%d:%d", &[Arg::from(w), Arg::from(i)]);
                }
            })
        })
        .collect();

    let mut drained = Vec::new();
    while handles.iter().any(|h| !h.is_finished()) {
        drained.extend(tracer.drain());
    }
    for handle in handles {
        handle.join().unwrap();
    }
    drained.extend(tracer.drain());

    assert_eq!(drained.len(), WRITERS * PER_WRITER);
    assert_eq!(tracer.pending(), 0);

    // Each writer's messages keep their relative order across drains.
    for w in 0..WRITERS {
        let prefix = format!("{w}:");
        let seq: Vec<usize> = drained
            .iter()
            .filter_map(|m| m.text().strip_prefix(&prefix))
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(seq, (0..PER_WRITER).collect::<Vec<_>>());
    }
}

#[test]
fn test_message_after_drain_waits_for_next_drain() {
    let tracer = Tracer::new();
    tracer.log("first", &[]);
    let first = tracer.drain();
    tracer.log("second", &[]);

    assert_eq!(first.len(), 1);
    assert_eq!(tracer.pending(), 1);
    assert_eq!(tracer.drain()[0].text(), "second");
    assert!(tracer.drain().is_empty());
}
