//! Per-container storage counters.

/// Storage activity observed by one container instance.
///
/// Counters live inside the container that produced them; there is no
/// process-wide state. Copies start with fresh counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of regions acquired from the allocator.
    pub acquisitions: usize,
    /// Number of times the container outgrew its region.
    pub growths: usize,
    /// Total live elements moved from an old region into a new one.
    pub relocations: usize,
}

impl StorageStats {
    /// Records a growth step that moved `relocated` live elements.
    pub(crate) fn record_growth(&mut self, relocated: usize) {
        self.acquisitions += 1;
        self.growths += 1;
        self.relocations += relocated;
    }

    /// Records a region acquired outside of growth, e.g. for a copy.
    pub(crate) fn record_acquisition(&mut self) {
        self.acquisitions += 1;
    }
}
