//! Initializer and finalizer tables (`.init_array` / `.fini_array`)

/// One table entry
pub type Hook = extern "C" fn();

/// Ordered, possibly empty sequence of hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct HookTable<'a> {
    hooks: &'a [Hook],
}

impl<'a> HookTable<'a> {
    pub const fn new(hooks: &'a [Hook]) -> Self {
        Self { hooks }
    }

    pub const fn empty() -> Self {
        Self { hooks: &[] }
    }

    /// Table delimited by linker-provided bounds
    ///
    /// Null bounds or `start >= end` give an empty table.
    ///
    /// # Safety
    ///
    /// When non-empty, `[start, end)` must be a contiguous array of valid
    /// hook pointers that lives for `'a`.
    pub unsafe fn from_bounds(start: *const Hook, end: *const Hook) -> Self {
        if start.is_null() || end.is_null() || start >= end {
            return Self::empty();
        }
        let len = end.offset_from(start) as usize;
        Self {
            hooks: core::slice::from_raw_parts(start, len),
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook, first to last
    pub fn run_forward(&self) {
        for hook in self.hooks {
            hook();
        }
    }

    /// Run every hook, last to first
    pub fn run_reverse(&self) {
        for hook in self.hooks.iter().rev() {
            hook();
        }
    }
}
