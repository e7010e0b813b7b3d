use std::io::{self, BufRead, BufReader, Read, Take};

/// Buffered reads with a caller-set byte limit, so a hostile peer cannot
/// feed an unbounded request line, header block or body.
pub struct StreamReader<R> {
    buf_reader: Take<BufReader<R>>,
}

impl<R: Read> StreamReader<R> {
    pub fn new(r: R) -> Self {
        Self {
            buf_reader: BufReader::new(r).take(u64::MAX),
        }
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.buf_reader.set_limit(limit);
    }

    /// Reads one line into `buf`. Returns the number of bytes read;
    /// 0 means end of stream or an exhausted limit.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        self.buf_reader.read_line(buf)
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.buf_reader.read_exact(buf)
    }
}
