/// Initial arena size; doubles whenever the filled region catches up.
const INITIAL_CAPACITY: usize = 1024;

/// Growable byte arena holding the unconsumed bytes of one connection.
///
/// The filled prefix `[0, filled)` is what the parser sees. Consuming `n`
/// bytes shifts the remainder down to offset 0, so parser offsets always
/// start at the beginning of the region. Exclusively owned by a single
/// connection driver; never shared.
#[derive(Debug)]
pub struct ReadBuffer {
    buf: Vec<u8>,
    filled: usize,
}

impl ReadBuffer {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            filled: 0,
        }
    }

    /// Bytes read from the socket but not yet consumed by the parser.
    pub fn unread(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.buf.len()
    }

    /// Doubles the arena. Callers grow before reading when full and more
    /// data is still expected.
    pub fn grow(&mut self) {
        let new_len = self.buf.len() * 2;
        self.buf.resize(new_len, 0);
    }

    /// The writable tail for the next socket read.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    /// Marks `n` freshly-read bytes as filled.
    pub fn advance_filled(&mut self, n: usize) {
        debug_assert!(self.filled + n <= self.buf.len());
        self.filled += n;
    }

    /// Discards `n` consumed bytes, compacting the remainder to offset 0.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.filled);
        self.buf.copy_within(n..self.filled, 0);
        self.filled -= n;
    }
}

impl Default for ReadBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compaction_keeps_unconsumed_tail() {
        let mut buf = ReadBuffer::with_capacity(8);
        buf.spare_mut()[..5].copy_from_slice(b"abcde");
        buf.advance_filled(5);

        buf.consume(2);
        assert_eq!(buf.unread(), b"cde");
    }

    #[test]
    fn grow_doubles_capacity() {
        let mut buf = ReadBuffer::with_capacity(4);
        buf.spare_mut().copy_from_slice(b"wxyz");
        buf.advance_filled(4);
        assert!(buf.is_full());

        buf.grow();
        assert!(!buf.is_full());
        assert_eq!(buf.unread(), b"wxyz");
        assert_eq!(buf.spare_mut().len(), 4);
    }
}
