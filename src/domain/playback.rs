//! Playback cursor over a loaded series.

/// Index into a series plus a running flag. The index always stays within
/// `[0, len)`; an empty series has no valid index and can never run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor {
    index: usize,
    running: bool,
    len: usize,
}

impl PlaybackCursor {
    pub fn new(len: usize) -> Self {
        PlaybackCursor {
            index: 0,
            running: false,
            len,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn at_end(&self) -> bool {
        self.len == 0 || self.index + 1 >= self.len
    }

    /// Start playback. Returns false (and stays stopped) when there is
    /// nothing left to play.
    pub fn start(&mut self) -> bool {
        self.running = !self.at_end();
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.running = false;
    }

    /// Move forward one bar while running. Reaching the last index halts
    /// playback; calls past the end are ignored. Returns whether the index
    /// moved.
    pub fn advance(&mut self) -> bool {
        if !self.running {
            return false;
        }
        if self.at_end() {
            self.running = false;
            return false;
        }
        self.index += 1;
        if self.at_end() {
            self.running = false;
        }
        true
    }

    /// The prefix of `series` up to and including the cursor.
    pub fn visible<'a, T>(&self, series: &'a [T]) -> &'a [T] {
        if series.is_empty() {
            return series;
        }
        let end = (self.index + 1).min(series.len());
        &series[..end]
    }
}
