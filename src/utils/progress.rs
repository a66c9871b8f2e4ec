use std::io::Write;

/// Prints a fixed number of dots over the course of a download, one batch per
/// chunk, so a complete transfer always ends with exactly `ticks` dots.
pub struct DotProgress<W: Write> {
    out: W,
    total: u64,
    ticks: u64,
    printed: u64,
}

impl<W: Write> DotProgress<W> {
    pub fn new(out: W, total: u64, ticks: u64) -> Self {
        Self {
            out,
            total,
            ticks,
            printed: 0,
        }
    }

    /// Report the running byte count. Progress output is best effort; a broken
    /// stdout never fails a download.
    pub fn advance(&mut self, bytes_done: u64) {
        if self.total == 0 {
            return;
        }
        let due = (self.ticks as u128 * bytes_done.min(self.total) as u128 / self.total as u128) as u64;
        if due > self.printed {
            let dots = ".".repeat((due - self.printed) as usize);
            let _ = self.out.write_all(dots.as_bytes());
            let _ = self.out.flush();
            self.printed = due;
        }
    }

    #[cfg(test)]
    pub fn printed(&self) -> u64 {
        self.printed
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
