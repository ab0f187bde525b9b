use std::cell::RefCell;

/// Recycles iteration buffers so steady-state filter runs stay off the heap.
///
/// Buffers are handed out empty and returned cleared; nested takers each get
/// their own buffer, which keeps filters re-entrant.
pub(crate) struct ScratchArena<T> {
    free: RefCell<Vec<Vec<T>>>,
}

impl<T> ScratchArena<T> {
    pub(crate) fn new() -> ScratchArena<T> {
        ScratchArena {
            free: RefCell::new(vec![]),
        }
    }

    pub(crate) fn take(&self) -> Vec<T> {
        self.free.borrow_mut().pop().unwrap_or_default()
    }

    pub(crate) fn put(&self, mut buffer: Vec<T>) {
        buffer.clear();
        self.free.borrow_mut().push(buffer);
    }
}
