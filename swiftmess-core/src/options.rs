//! Parser configuration.

/// Options shared by the tokenizers and the grouper.
///
/// ```
/// use swiftmess_core::Options;
///
/// let options = Options::default().reset_on_message(true);
/// assert!(options.reset_on_message);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Initial capacity of the item ring buffer. Rounded up to a power of
    /// two, at least 2.
    pub ring_capacity: usize,

    /// Close the open block and forget block/field state at each message
    /// boundary while grouping. Off by default: a message item then carries
    /// no state change and the next block closes what was left open.
    pub reset_on_message: bool,
}

impl Options {
    pub fn ring_capacity(mut self, capacity: usize) -> Self {
        self.ring_capacity = capacity;
        self
    }

    pub fn reset_on_message(mut self, reset: bool) -> Self {
        self.reset_on_message = reset;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ring_capacity: 16,
            reset_on_message: false,
        }
    }
}
