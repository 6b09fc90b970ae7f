//! Process-wide `environ`
//!
//! The bootstrap stores the initial stack's `envp` here before any
//! initializer runs, so hooks and C code see the environment the same way
//! `getenv` on the runtime context does.

use core::ffi::{c_char, CStr};
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

static ENVIRON: AtomicPtr<*const c_char> = AtomicPtr::new(ptr::null_mut());

pub(crate) fn publish(envp: *const *const c_char) {
    ENVIRON.store(envp.cast_mut(), Ordering::Release);
}

/// NULL-terminated environment vector, null before the bootstrap runs
pub fn environ() -> *const *const c_char {
    ENVIRON.load(Ordering::Acquire)
}

/// Number of entries in the published vector
///
/// # Safety
///
/// The stack the vector was published from must still be alive.
pub unsafe fn environ_len() -> usize {
    let envp = environ();
    if envp.is_null() {
        return 0;
    }
    let mut len = 0;
    while !(*envp.add(len)).is_null() {
        len += 1;
    }
    len
}

/// Entry `index` of the published vector
///
/// # Safety
///
/// As for [`environ_len`]; `index` must be below it.
pub unsafe fn environ_entry<'a>(index: usize) -> &'a CStr {
    CStr::from_ptr(*environ().add(index))
}
