/// Monotonic document revision.
///
/// Every mutation of the edited document bumps the revision; change
/// notifications carry the revision they produced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(pub u64);

impl Revision {
    pub fn initial() -> Self {
        Revision(0)
    }

    pub fn next(self) -> Self {
        Revision(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Monotonic sequence source for ids handed out by a single owner.
#[derive(Debug, Default, Clone)]
pub struct Sequence {
    next: u64,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next value, starting at 1.
    pub fn advance(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}
