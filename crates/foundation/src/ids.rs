/// Locally assigned display id for a rendered feature.
///
/// Only meaningful to the renderer (hover feature-state addressing); unique
/// within one layer's output, never across layers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub u64);

impl DisplayId {
    pub fn new(n: u64) -> Self {
        DisplayId(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for DisplayId {
    fn from(n: u64) -> Self {
        DisplayId(n)
    }
}

impl std::fmt::Display for DisplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
