//! Fixed-capacity FIFOs for no-std embedded targets.
//!
//! # Highlights
//! - [`FixedQueue`]: FIFO of `Copy` values.
//! - [`BitQueue`]: FIFO of bits, for packing sub-byte records or raw bit streams.
//! - Caller-supplied storage (owned array or borrowed slice); no allocation, no dynamic dispatch.
//! - Producers that cannot wait can use [`BitQueue::force_push_bits`], which evicts the oldest
//!   bits instead of failing.
//!
//! # Quick start
//! ```
//! use ph_fifo::{BitQueue, FixedQueue, storage_bytes};
//!
//! let mut events = FixedQueue::new([0u16; 9]);
//! events.push(42).unwrap();
//! assert_eq!(events.pop(), Some(42));
//!
//! let mut bits = BitQueue::new([0u8; storage_bytes(8)], 8);
//! bits.push_bits(0b1011_0011, 8).unwrap();
//! bits.force_push_bits(0b1, 1);
//!
//! let mut out = [0u8];
//! assert_eq!(bits.pop_bits(&mut out, 8), 8);
//! assert_eq!(out[0], 0b1101_1001);
//! ```
//!
//! # No-std
//! The crate is `#![no_std]`. Tests require `std`.
//!
//! # Concurrency
//! Queues are plain single-threaded data structures. Sharing one between an interrupt handler
//! and the main loop requires external synchronization.
//!
//! # Semantics
//! - Both queues keep one unit of storage free so that `head == tail` means empty. A storage
//!   of `N` slots (or `N` bits) holds `N - 1` values (or bits).
//! - Running out of room or data is an ordinary result (`Err`, `None`, or a short count).
//! - Broken preconditions (too little storage, indexing past `size()`) panic.
//!
//! # Features
//! - `zero-on-consume`: bit queues default to [`ConsumePolicy::Zero`].
//! - `defmt` / `log`: emit trace events (such as forced evictions) and derive `defmt::Format`
//!   for public types.
#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

mod trace;

pub mod bit_queue;
pub mod bits;
pub mod error;
pub mod queue;

pub use bit_queue::{BitQueue, ConsumePolicy, storage_bytes};
pub use error::CapacityError;
pub use queue::FixedQueue;
