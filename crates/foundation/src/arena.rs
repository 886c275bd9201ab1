use std::marker::PhantomData;

/// Sequential id allocator owned by a single engine instance.
///
/// Ids start at zero and wrap on overflow. Two arenas never share state, so
/// independent layers hand out overlapping ids.
#[derive(Debug)]
pub struct IdArena<I> {
    next: u64,
    _id: PhantomData<fn() -> I>,
}

impl<I: From<u64>> IdArena<I> {
    pub fn new() -> Self {
        IdArena {
            next: 0,
            _id: PhantomData,
        }
    }

    pub fn alloc(&mut self) -> I {
        let n = self.next;
        self.next = self.next.wrapping_add(1);
        I::from(n)
    }

    /// Number of ids handed out so far (modulo wrap-around).
    pub fn allocated(&self) -> u64 {
        self.next
    }
}

impl<I: From<u64>> Default for IdArena<I> {
    fn default() -> Self {
        Self::new()
    }
}
