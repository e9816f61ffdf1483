//! Basic usage of the `index_pool` crate:
//!
//! * Creating a pool.
//! * Allocating indices and filling their slots.
//! * Looking items up again by index.
//! * Releasing indices and observing the reset-on-release behavior.
//!
//! Segment and growth events are logged at debug level.

use index_pool::{ArrayPool, IndexPool};

#[derive(Clone, Debug, Default)]
struct Connection {
    peer: String,
    bytes_received: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut pool = IndexPool::<Connection>::builder().segment_size(4).build();

    // Allocating gives you an index plus the slot to fill in. The slot borrows the pool, so it
    // has to be filled before the next allocation.
    let (alice, slot) = pool.allocate();
    slot.peer = "alice".to_string();

    let (bob, slot) = pool.allocate();
    slot.peer = "bob".to_string();

    for n in 0..6 {
        let (_, slot) = pool.allocate();
        slot.peer = format!("anonymous-{n}");
    }

    println!(
        "Segmented pool holds {} items in segments of {}, capacity {}",
        pool.len(),
        pool.segment_size(),
        pool.capacity()
    );

    pool.get_mut(alice).bytes_received = 512;
    println!("Alice: {:?}", pool.get(alice));

    // Releasing resets the slot, so nothing from Bob's connection lingers.
    pool.release(bob);
    println!("Bob's slot after release: {:?}", pool.get(bob));

    // The next allocation reuses a released index.
    let (carol, slot) = pool.allocate();
    slot.peer = "carol".to_string();
    println!("Carol got index {carol} (Bob had {bob})");

    // The contiguous pool works the same way but reserves index 0 and grows by copying.
    let mut array_pool = ArrayPool::<Connection>::with_capacity(2);

    let ids: Vec<usize> = (0..5)
        .map(|n| {
            let (id, slot) = array_pool.allocate();
            slot.bytes_received = n;
            id
        })
        .collect();

    println!(
        "Array pool handed out {ids:?}, capacity is now {}",
        array_pool.capacity()
    );

    // Releasing an index the pool never handed out is reported rather than ignored.
    if let Err(e) = array_pool.try_release(0) {
        println!("Rejected release: {e}");
    }
}
