use super::error::TopologyError;

/// Forward-only cursor over an in-memory topology container.
///
/// All reads are bounds-checked; a short read is reported as
/// `TruncatedRecord` at the current position and leaves the cursor where it
/// was.
pub struct TopologyReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> TopologyReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next `len` bytes without consuming them.
    pub fn peek(&self, len: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(len)?;
        self.data.get(self.position..end)
    }

    pub fn require_len(&self, needed: usize, record: &'static str) -> Result<(), TopologyError> {
        if self.remaining() < needed {
            return Err(TopologyError::TruncatedRecord {
                offset: self.position,
                record,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read(&mut self, len: usize, record: &'static str) -> Result<&'a [u8], TopologyError> {
        self.require_len(len, record)?;
        let start = self.position;
        self.position += len;
        Ok(&self.data[start..self.position])
    }

    pub fn read_vec(&mut self, len: usize, record: &'static str) -> Result<Vec<u8>, TopologyError> {
        self.read(len, record).map(<[u8]>::to_vec)
    }

    /// Skip `len` bytes forward.
    pub fn seek_relative(&mut self, len: usize, record: &'static str) -> Result<(), TopologyError> {
        self.require_len(len, record)?;
        self.position += len;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TopologyReader;
    use crate::topology::error::TopologyError;

    #[test]
    fn read_advances_position() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader = TopologyReader::new(&data);
        assert_eq!(reader.read(2, "test").unwrap(), &[1, 2]);
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.remaining(), 3);
    }

    #[test]
    fn peek_does_not_consume() {
        let data = [9u8, 8];
        let reader = TopologyReader::new(&data);
        assert_eq!(reader.peek(1), Some(&[9u8][..]));
        assert_eq!(reader.peek(3), None);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn short_read_reports_truncation_and_keeps_position() {
        let data = [0u8; 3];
        let mut reader = TopologyReader::new(&data);
        reader.seek_relative(1, "test").unwrap();
        let err = reader.read(4, "block header").unwrap_err();
        assert!(matches!(
            err,
            TopologyError::TruncatedRecord {
                offset: 1,
                needed: 4,
                available: 2,
                ..
            }
        ));
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn eof_after_consuming_everything() {
        let data = [0u8; 2];
        let mut reader = TopologyReader::new(&data);
        assert!(!reader.is_eof());
        reader.seek_relative(2, "test").unwrap();
        assert!(reader.is_eof());
        assert!(reader.seek_relative(1, "test").is_err());
    }
}
