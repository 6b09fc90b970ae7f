//! POSIX Compatibility Layer - POSIX surface over the narrow kernel ABI
//!
//! # Purpose
//! Lets POSIX-shaped programs run unmodified on a kernel whose syscalls are
//! typed, return negative error codes, expose directories as handles and
//! offer a single poll-style wait primitive.
//!
//! # Integration Points
//! - Depends on: shim-abi (wire contract, `Kernel` trait)
//! - Provides to: shim-crt (bootstrap), applications
//! - Kernel calls: directory triad, poll, sigaction, kill, getpid, write, exit
//!
//! # Architecture
//! All process-wide state (errno, option-scanner cursor, environment table)
//! lives in one [`Runtime`] context that every call goes through. Each
//! module has a typed layer returning [`Result`] and a POSIX-shaped wrapper
//! on [`Runtime`] that turns the `Result` into a sentinel plus errno.
//!
//! # Concurrency
//! Single-threaded by contract. A [`Runtime`] is not synchronized; sharing
//! one between threads is undefined behavior at the POSIX level.
//!
//! # Testing Strategy
//! - Unit tests: translator, fd sets, option scanner states, signal records
//! - Integration tests: every wrapper against the mock kernel

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

extern crate alloc;

use thiserror::Error;

pub mod dirent;
pub mod env;
pub mod errno;
pub mod getopt;
pub mod logger;
pub mod runtime;
pub mod select;
pub mod signal;
pub mod stubs;
pub mod unistd;

pub use dirent::{DirStream, Dirent};
pub use env::Environ;
pub use errno::Sentinel;
pub use getopt::{HasArg, LongOption};
pub use logger::KernelLogger;
pub use runtime::{Runtime, RuntimeConfig};
pub use select::{FdSet, WaitSets, FD_SETSIZE};
pub use signal::{SigAction, SigHandler, SigSet};

pub use shim_abi::{Errno, Kernel};

/// Errors raised by the typed layer
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ShimError {
    /// The kernel returned a negative result
    #[error("kernel call failed: {0}")]
    Kernel(Errno),

    /// Absent required parameter or out-of-range value
    #[error("invalid argument")]
    InvalidArgument,
}

impl ShimError {
    /// Value stored in the errno cell for this error
    pub fn errno(&self) -> Errno {
        match self {
            ShimError::Kernel(errno) => *errno,
            ShimError::InvalidArgument => Errno::EINVAL,
        }
    }
}

impl From<Errno> for ShimError {
    fn from(errno: Errno) -> Self {
        ShimError::Kernel(errno)
    }
}

pub type Result<T> = core::result::Result<T, ShimError>;
