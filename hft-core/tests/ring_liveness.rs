//! S6: one producer writes sequence 0..1_000_000 into a capacity-1024 ring
//! while a consumer reads; the consumer must observe the exact sequence in
//! order, with no duplicates and no gaps. The unit test alongside `SpscRing`
//! itself uses a smaller N so the default test run stays fast; this is the
//! literal scale, run at the integration level where a slower test belongs.

use hft_core::ring::SpscRing;
use std::sync::Arc;
use std::thread;

#[test]
fn producer_consumer_preserve_order_and_count_at_one_million() {
    const N: u64 = 1_000_000;
    let ring: Arc<SpscRing<u64>> = Arc::new(SpscRing::new(1024));

    let producer = {
        let ring = Arc::clone(&ring);
        thread::spawn(move || {
            let mut i = 0u64;
            while i < N {
                if ring.try_write(i) {
                    i += 1;
                }
            }
        })
    };

    let consumer = {
        let ring = Arc::clone(&ring);
        thread::spawn(move || {
            let mut expected = 0u64;
            while expected < N {
                if let Some(v) = ring.try_read() {
                    assert_eq!(v, expected, "sequence diverged at {expected}");
                    expected += 1;
                }
            }
            expected
        })
    };

    producer.join().unwrap();
    assert_eq!(consumer.join().unwrap(), N);
}
