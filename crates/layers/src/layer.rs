use foundation::arena::IdArena;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl From<u64> for LayerId {
    fn from(n: u64) -> Self {
        LayerId(n)
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait Layer {
    fn id(&self) -> LayerId;
}

/// Hands out layer ids for one engine instance.
///
/// Source and layer names registered with the host are derived from these
/// ids, so two layers created from the same registry never collide.
#[derive(Debug, Default)]
pub struct LayerRegistry {
    ids: IdArena<LayerId>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> LayerId {
        self.ids.alloc()
    }
}
