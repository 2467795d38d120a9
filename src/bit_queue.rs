//! Fixed-capacity FIFO of bits over a caller-supplied byte buffer.
//!
//! # Overview
//! - Capacity is counted in bits. A queue of `C` bits needs `C + 1` bits of storage
//!   ([`storage_bytes`]); the extra bit keeps `head == tail` meaning empty without a counter.
//! - Bit position `p` lives in byte `p / 8` at bit `p % 8`, least significant bit first.
//!   Values are pushed and popped low-order bit first.
//! - Every transfer is split into chunks that stay inside one byte and do not cross the end of
//!   the storage; each chunk is one masked read or write.
//! - `push_bits*` and `get_bits_at` fail when there is not enough room or data.
//!   `force_push_bits*` evicts the oldest bits instead of failing. `drop_bits` and `pop_bits`
//!   clamp to what is stored.
//!
//! # Consume policy
//! With [`ConsumePolicy::Zero`], every bit that leaves the queue (pop, drop, clear) is cleared
//! in storage, so the buffer only ever holds live data. The default comes from the
//! `zero-on-consume` feature.

use crate::bits::{BitReader, BitWriter, clear_bits, get_bits, set_bits};
use crate::error::CapacityError;
use crate::trace::trace;

/// Bytes of storage needed for a bit queue holding `capacity_bits` bits.
///
/// ```
/// assert_eq!(ph_fifo::storage_bytes(64), 9);
/// assert_eq!(ph_fifo::storage_bytes(7), 1);
/// ```
#[inline]
pub const fn storage_bytes(capacity_bits: usize) -> usize {
    (capacity_bits + 1).div_ceil(8)
}

/// What happens to storage bits once they leave the queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsumePolicy {
    /// Leave stale bits in place.
    Retain,
    /// Clear consumed bits to zero.
    Zero,
}

impl Default for ConsumePolicy {
    fn default() -> Self {
        if cfg!(feature = "zero-on-consume") {
            ConsumePolicy::Zero
        } else {
            ConsumePolicy::Retain
        }
    }
}

/// Bit range `lo..=hi` inside storage byte `byte`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Chunk {
    byte: usize,
    lo: u32,
    hi: u32,
}

impl Chunk {
    #[inline(always)]
    const fn len(&self) -> u32 {
        self.hi - self.lo + 1
    }
}

/// Splits `left` bits starting at ring position `pos` into [`Chunk`]s.
/// Each chunk is bounded by the bits still requested, the end of the current byte and the end
/// of the ring.
struct Chunks {
    pos: usize,
    left: usize,
    slots: usize,
}

impl Chunks {
    #[inline]
    const fn new(pos: usize, left: usize, slots: usize) -> Self {
        Self { pos, left, slots }
    }
}

impl Iterator for Chunks {
    type Item = Chunk;

    #[inline]
    fn next(&mut self) -> Option<Chunk> {
        if self.left == 0 {
            return None;
        }
        let lo = self.pos % 8;
        let len = self.left.min(8 - lo).min(self.slots - self.pos);
        let chunk = Chunk {
            byte: self.pos / 8,
            lo: lo as u32,
            hi: (lo + len - 1) as u32,
        };
        self.pos = (self.pos + len) % self.slots;
        self.left -= len;
        Some(chunk)
    }
}

/// Fixed-capacity bit FIFO.
///
/// ```
/// use ph_fifo::{BitQueue, storage_bytes};
///
/// let mut q = BitQueue::new([0u8; storage_bytes(12)], 12);
/// q.push_bits(0b101, 3).unwrap();
/// q.push_bits_from(&[0xAB], 8).unwrap();
///
/// let mut out = [0u8; 2];
/// assert_eq!(q.pop_bits(&mut out, 11), 11);
/// assert_eq!(u16::from_le_bytes(out), 0b101 | (0xAB << 3));
/// ```
pub struct BitQueue<S: AsRef<[u8]> + AsMut<[u8]>> {
    storage: S,
    // capacity + 1
    slots: usize,
    head: usize,
    tail: usize,
    policy: ConsumePolicy,
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> BitQueue<S> {
    /// Build an empty queue of `capacity_bits` bits with the default [`ConsumePolicy`].
    ///
    /// # Panics
    /// Panics if `capacity_bits < 2` or `storage` is shorter than
    /// [`storage_bytes(capacity_bits)`](storage_bytes).
    pub fn new(storage: S, capacity_bits: usize) -> Self {
        Self::with_policy(storage, capacity_bits, ConsumePolicy::default())
    }

    /// # Panics
    /// Same as [`new`](Self::new).
    pub fn with_policy(storage: S, capacity_bits: usize, policy: ConsumePolicy) -> Self {
        assert!(capacity_bits >= 2, "BitQueue needs a capacity of at least 2 bits");
        let needed = storage_bytes(capacity_bits);
        let have = storage.as_ref().len();
        assert!(
            have >= needed,
            "BitQueue of {capacity_bits} bits needs {needed} bytes of storage, got {have}"
        );
        let mut q = Self {
            storage,
            slots: capacity_bits + 1,
            head: 0,
            tail: 0,
            policy,
        };
        q.clear();
        q
    }

    #[inline]
    pub fn policy(&self) -> ConsumePolicy {
        self.policy
    }

    /// Capacity in bits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots - 1
    }

    /// Stored bits.
    #[inline]
    pub fn size(&self) -> usize {
        (self.tail + self.slots - self.head) % self.slots
    }

    /// Free bits.
    #[inline]
    pub fn available_capacity(&self) -> usize {
        self.capacity() - self.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.size() == self.capacity()
    }

    /// Empty the queue. Under [`ConsumePolicy::Zero`] the storage is zeroed as well.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        if self.policy == ConsumePolicy::Zero {
            let used = self.slots.div_ceil(8);
            self.storage.as_mut()[..used].fill(0);
        }
    }

    /// The storage bytes backing the ring. Bits outside the stored range are unspecified
    /// unless the policy is [`ConsumePolicy::Zero`].
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage.as_ref()[..self.slots.div_ceil(8)]
    }

    /// Give the storage back.
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Push the low `num_bits` bits of `value`.
    ///
    /// # Panics
    /// Panics if `num_bits > 8`.
    pub fn push_bits(&mut self, value: u8, num_bits: usize) -> Result<(), CapacityError> {
        assert!(num_bits <= 8, "push_bits takes at most 8 bits, use push_bits_from");
        self.check_room(num_bits)?;
        self.write_tail(value, num_bits);
        Ok(())
    }

    /// Push the first `num_bits` bits of `src`. Either all bits are pushed or none.
    ///
    /// # Panics
    /// Panics if `src` holds fewer than `num_bits` bits.
    pub fn push_bits_from(&mut self, src: &[u8], num_bits: usize) -> Result<(), CapacityError> {
        assert_source_len(src, num_bits);
        self.check_room(num_bits)?;
        self.write_tail_from(BitReader::new(src), num_bits);
        Ok(())
    }

    /// Push the low `num_bits` bits of `value`, dropping the oldest bits if there is not enough
    /// room. If `num_bits` exceeds the capacity only the newest `capacity()` bits are kept.
    ///
    /// # Panics
    /// Panics if `num_bits > 8`.
    pub fn force_push_bits(&mut self, value: u8, num_bits: usize) {
        assert!(num_bits <= 8, "force_push_bits takes at most 8 bits, use force_push_bits_from");
        let skip = num_bits.saturating_sub(self.capacity());
        let value = (u32::from(value) >> skip) as u8;
        let num_bits = num_bits - skip;
        self.make_room(num_bits);
        self.write_tail(value, num_bits);
    }

    /// Push the first `num_bits` bits of `src`, dropping the oldest bits if there is not
    /// enough room. If `num_bits` exceeds the capacity only the newest `capacity()` bits of
    /// `src` are kept.
    ///
    /// # Panics
    /// Panics if `src` holds fewer than `num_bits` bits.
    pub fn force_push_bits_from(&mut self, src: &[u8], num_bits: usize) {
        assert_source_len(src, num_bits);
        let skip = num_bits.saturating_sub(self.capacity());
        let num_bits = num_bits - skip;
        self.make_room(num_bits);
        self.write_tail_from(BitReader::at(src, skip), num_bits);
    }

    /// Discard up to `num_bits` of the oldest bits. Returns how many were dropped.
    pub fn drop_bits(&mut self, num_bits: usize) -> usize {
        let n = num_bits.min(self.size());
        self.consume(n);
        n
    }

    /// Move up to `num_bits` of the oldest bits into `dst`, packed from bit 0 of `dst[0]`.
    /// Bits of `dst` past the ones written are left untouched. Returns how many bits were
    /// popped, which is less than `num_bits` when the queue holds fewer.
    ///
    /// # Panics
    /// Panics if `dst` is too short for the bits being popped.
    pub fn pop_bits(&mut self, dst: &mut [u8], num_bits: usize) -> usize {
        let n = num_bits.min(self.size());
        assert_dest_len(dst, n);
        self.read_into(self.head, dst, n);
        self.consume(n);
        n
    }

    /// Copy `num_bits` bits starting `offset` bits after the oldest one into `dst`, without
    /// consuming anything.
    ///
    /// # Panics
    /// Panics if `dst` is too short for `num_bits`.
    pub fn get_bits_at(
        &self,
        offset: usize,
        dst: &mut [u8],
        num_bits: usize,
    ) -> Result<(), CapacityError> {
        let size = self.size();
        let available = size.saturating_sub(offset);
        if offset > size || num_bits > available {
            return Err(CapacityError {
                requested: num_bits,
                available,
            });
        }
        assert_dest_len(dst, num_bits);
        self.read_into((self.head + offset) % self.slots, dst, num_bits);
        Ok(())
    }

    #[inline]
    fn check_room(&self, num_bits: usize) -> Result<(), CapacityError> {
        let available = self.available_capacity();
        if num_bits > available {
            return Err(CapacityError {
                requested: num_bits,
                available,
            });
        }
        Ok(())
    }

    fn make_room(&mut self, num_bits: usize) {
        let available = self.available_capacity();
        if num_bits > available {
            let evicted = self.drop_bits(num_bits - available);
            trace!("bit queue full, evicted {} oldest bits", evicted);
        }
    }

    fn write_tail(&mut self, value: u8, num_bits: usize) {
        let zeroed = self.policy == ConsumePolicy::Zero;
        let data = self.storage.as_mut();
        let mut value = u32::from(value);
        for c in Chunks::new(self.tail, num_bits, self.slots) {
            debug_assert!(
                !zeroed || get_bits(data[c.byte], c.lo, c.hi) == 0,
                "free bits were not cleared on consume"
            );
            data[c.byte] = set_bits(data[c.byte], c.lo, c.hi, value as u8);
            value >>= c.len();
        }
        self.tail = (self.tail + num_bits) % self.slots;
    }

    fn write_tail_from(&mut self, mut src: BitReader<'_>, num_bits: usize) {
        let mut left = num_bits;
        while left > 0 {
            let n = left.min(8);
            let v = src.read(n as u32);
            self.write_tail(v, n);
            left -= n;
        }
    }

    fn read_into(&self, start: usize, dst: &mut [u8], num_bits: usize) {
        let data = self.storage.as_ref();
        let mut out = BitWriter::new(dst);
        for c in Chunks::new(start, num_bits, self.slots) {
            out.write(get_bits(data[c.byte], c.lo, c.hi), c.len());
        }
    }

    fn consume(&mut self, num_bits: usize) {
        if self.policy == ConsumePolicy::Zero {
            let data = self.storage.as_mut();
            for c in Chunks::new(self.head, num_bits, self.slots) {
                data[c.byte] = clear_bits(data[c.byte], c.lo, c.hi);
            }
        }
        self.head = (self.head + num_bits) % self.slots;
    }
}

#[track_caller]
fn assert_source_len(src: &[u8], num_bits: usize) {
    assert!(
        src.len() * 8 >= num_bits,
        "source of {} bytes cannot supply {num_bits} bits",
        src.len()
    );
}

#[track_caller]
fn assert_dest_len(dst: &[u8], num_bits: usize) {
    assert!(
        dst.len() * 8 >= num_bits,
        "destination of {} bytes cannot hold {num_bits} bits",
        dst.len()
    );
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> core::fmt::Debug for BitQueue<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BitQueue")
            .field("capacity", &self.capacity())
            .field("size", &self.size())
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("policy", &self.policy)
            .finish()
    }
}
