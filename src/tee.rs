use std::io::{self, Write};

/// A writer that duplicates everything written to it into two writers
///
/// Both writers always receive the bytes, in order. If either fails the
/// error is returned to the caller, even though the other may already hold
/// the bytes. Chain more than two writers by nesting.
pub struct Tee<A: Write, B: Write> {
    a: A,
    b: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Tee { a, b }
    }

    pub fn get_ref(&self) -> (&A, &B) {
        (&self.a, &self.b)
    }

    pub fn into_inner(self) -> (A, B) {
        (self.a, self.b)
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // An empty write is the end-of-stream signal; nothing to duplicate
        if buf.is_empty() {
            return Ok(0);
        }
        let a = self.a.write_all(buf);
        let b = self.b.write_all(buf);
        a.and(b).map(|()| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let a = self.a.flush();
        let b = self.b.flush();
        a.and(b)
    }
}
