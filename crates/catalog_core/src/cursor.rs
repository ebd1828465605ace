/// Remote pagination state for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchCursor {
    offset: usize,
    has_more: bool,
}

impl Default for FetchCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchCursor {
    pub fn new() -> Self {
        Self {
            offset: 0,
            has_more: true,
        }
    }

    /// Cursor positioned at `offset`, as restored from a snapshot.
    pub fn at(offset: usize, has_more: bool) -> Self {
        Self { offset, has_more }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Records a fetch of `requested` rows at the current offset that returned
    /// `received` rows. A full batch means more rows may exist.
    pub fn advance(&mut self, requested: usize, received: usize) {
        self.offset += received;
        self.has_more = requested > 0 && received >= requested;
    }

    pub fn exhaust(&mut self) {
        self.has_more = false;
    }
}

/// One cursor per concurrently fetched tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierCursors {
    pub premium: FetchCursor,
    pub regular: FetchCursor,
}

impl TierCursors {
    pub fn has_more(&self) -> bool {
        self.premium.has_more() || self.regular.has_more()
    }

    pub fn exhaust(&mut self) {
        self.premium.exhaust();
        self.regular.exhaust();
    }
}
