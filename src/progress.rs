/// Counts completed units of work for one pipeline run and reports a clamped
/// progress fraction. Owned exclusively by the invocation; progress leaves
/// the pipeline through a plain `FnMut(f64)` callback rather than any
/// particular UI widget.
#[derive(Clone, Copy, Debug)]
pub struct FrameCounter {
    done: u64,
    total: u64,
}

impl FrameCounter {
    pub fn new(total: u64) -> Self {
        Self { done: 0, total }
    }

    /// Record one completed unit and return the updated fraction.
    pub fn advance(&mut self) -> f64 {
        self.done += 1;
        self.fraction()
    }

    /// Fraction of work completed, clamped to [0, 1]. A zero denominator
    /// reports 1.0 so a stray callback can never divide by zero.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.done as f64 / self.total as f64).min(1.0)
        }
    }

    pub fn done(&self) -> u64 {
        self.done
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}
