use std::io::{ErrorKind, Read};

/// Fill `buffer` from `reader`, stopping early only at end of file.
///
/// Returns the number of bytes read; anything short of `buffer.len()` means
/// the reader is exhausted.
pub fn read_block<R: Read>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out at most `step` bytes per call
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_read_block_fills_across_short_reads() {
        let data: Vec<u8> = (0..100u8).collect();
        let mut reader = Trickle { data: &data, step: 7 };
        let mut buffer = [0u8; 64];

        assert_eq!(read_block(&mut reader, &mut buffer).unwrap(), 64);
        assert_eq!(&buffer[..], &data[..64]);

        assert_eq!(read_block(&mut reader, &mut buffer).unwrap(), 36);
        assert_eq!(&buffer[..36], &data[64..]);

        assert_eq!(read_block(&mut reader, &mut buffer).unwrap(), 0);
    }
}
