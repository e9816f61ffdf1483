#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Object pools that hand out stable integer indices to items of a single type.
//!
//! Latency-sensitive code that creates and discards many short-lived objects of the same shape
//! can keep them in a pool instead of allocating each one separately. The pool hands out an
//! index for each item, and releasing the index resets the item to its default value, so no
//! stale data (or stale references held inside the item) survives into the next use of the slot.
//!
//! Two storage strategies are provided:
//!
//! - [`IndexPool`] stores items in a [`SegmentedList`]: fixed-size segments whose size is a
//!   power of two. Growing never moves existing items. Releasing an unknown index is ignored.
//! - [`ArrayPool`] stores items in one contiguous array with a sentinel at index 0. Growing moves
//!   every item into a larger array. Releasing an unknown index panics.
//!
//! Both implement the [`Pool`] trait, so code can be written against either.
//!
//! # Reference validity
//!
//! Every reference the pools return borrows the pool, so it cannot outlive the next mutating
//! call. Store the index, not the reference.
//!
//! # Example
//!
//! ```rust
//! use index_pool::IndexPool;
//!
//! #[derive(Default)]
//! struct Particle {
//!     position: (f32, f32),
//!     velocity: (f32, f32),
//! }
//!
//! let mut pool = IndexPool::<Particle>::builder().segment_size(64).build();
//!
//! let (index, particle) = pool.allocate();
//! particle.velocity = (1.0, 0.5);
//!
//! let particle = pool.get_mut(index);
//! particle.position.0 += particle.velocity.0;
//!
//! pool.release(index);
//! assert!(pool.is_empty());
//! ```
//!
//! # Logging
//!
//! Segment allocation and release and array growth are reported via [`tracing`] at debug level.
//! Ignored releases are reported at trace level.

mod array_pool;
mod bits;
mod builder;
mod coordinates;
mod error;
mod free_list;
mod index_pool;
mod pool;
mod segment;
mod segmented_list;

pub use array_pool::*;
pub use builder::*;
pub use error::*;
pub use index_pool::*;
pub use pool::*;
pub use segmented_list::*;
