//! Errno cell and result translation
//!
//! Every POSIX-shaped wrapper follows one convention: on success return
//! the value and leave errno alone, on failure store the error in the
//! errno cell and return the call's failure sentinel (`-1`, `None`,
//! `SIG_ERR`).

use shim_abi::{decode, Errno, Kernel, Syscall};

use crate::runtime::Runtime;
use crate::signal::SigHandler;
use crate::{Result, ShimError};

/// Value a POSIX call returns when it fails
pub trait Sentinel {
    fn failure() -> Self;
}

impl Sentinel for i32 {
    fn failure() -> Self {
        -1
    }
}

impl Sentinel for isize {
    fn failure() -> Self {
        -1
    }
}

impl<T> Sentinel for Option<T> {
    fn failure() -> Self {
        None
    }
}

impl Sentinel for SigHandler {
    fn failure() -> Self {
        SigHandler::Error
    }
}

/// Issue `call` and decode the raw result word
pub(crate) fn call<K: Kernel>(kernel: &mut K, call: Syscall<'_>) -> Result<usize> {
    let name = call.name();
    let raw = kernel.syscall(call);
    decode(raw).map_err(|errno| {
        log::trace!("{} failed: {}", name, errno);
        ShimError::Kernel(errno)
    })
}

impl<K: Kernel> Runtime<K> {
    /// Current errno value
    pub fn errno(&self) -> Errno {
        self.errno
    }

    pub fn set_errno(&mut self, errno: Errno) {
        self.errno = errno;
    }

    /// Apply the raw-return convention: `>= 0` passes through, negative
    /// values store `-raw` in errno and become `-1`
    pub fn syscall_ret(&mut self, raw: isize) -> isize {
        match decode(raw) {
            Ok(value) => value as isize,
            Err(errno) => {
                self.errno = errno;
                -1
            }
        }
    }

    /// Collapse a typed result into the POSIX shape
    pub fn translate<T: Sentinel>(&mut self, result: Result<T>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                self.errno = err.errno();
                T::failure()
            }
        }
    }

    /// Issue a request through this runtime's kernel
    pub(crate) fn call(&mut self, request: Syscall<'_>) -> Result<usize> {
        call(&mut self.kernel, request)
    }
}
