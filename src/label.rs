//! The label registry.
//!
//! Collected examples are tagged with a target *label vector* rather than a class name: a fixed
//! 10-component vector of values in `[0, 1)`. The user regenerates it with the "randomize label"
//! action, then records any number of examples under it; the registry keeps the vector active
//! until the next randomize or an explicit reset.

/// Number of components in a label vector.
pub const LABEL_LEN: usize = 10;

/// Holds the target label applied to newly collected examples.
///
/// Starts out unset; collection is refused until the first [`randomize`](Self::randomize).
#[derive(Debug, Default)]
pub struct LabelRegistry {
    current: Option<[f32; LABEL_LEN]>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the label with [`LABEL_LEN`] independent uniform draws from `[0, 1)`.
    pub fn randomize(&mut self) -> &[f32; LABEL_LEN] {
        self.current = Some([(); LABEL_LEN].map(|()| fastrand::f32()));
        self.current.as_ref().unwrap()
    }

    /// Returns the active label, or `None` if no label has been set yet.
    pub fn current(&self) -> Option<&[f32; LABEL_LEN]> {
        self.current.as_ref()
    }

    /// Clears the active label; subsequent collection attempts are refused again.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
