//! Kernel ABI - Wire contract between the POSIX shim and the kernel
//!
//! # Purpose
//! Describes the narrow kernel interface the runtime shim is built on:
//! error numbering, syscall numbers, and the `repr(C)` records the kernel
//! reads and writes. Nothing here has behavior beyond encoding.
//!
//! # Integration Points
//! - Depends on: nothing (leaf crate)
//! - Provides to: shim-platform (raw backend), shim-mock, shim-posix, shim-crt
//!
//! # Architecture
//! Every kernel operation is a tagged [`Syscall`] request carrying typed
//! arguments. A [`Kernel`] executes requests and returns the raw signed
//! result word (negative = `-errno`). Only the raw backend turns tags into
//! syscall numbers and registers.
//!
//! # Testing Strategy
//! - Unit tests: record layouts, errno decoding, timeout conversion

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

use core::ffi::CStr;

pub mod dirent;
pub mod errno;
pub mod numbers;
pub mod poll;
pub mod signal;
pub mod time;

pub use dirent::{DirentType, RawDirent, NAME_MAX};
pub use errno::{decode, Errno};
pub use poll::{PollEvents, PollFd};
pub use signal::{RawSigaction, SaFlags, NSIG, SIG_DFL, SIG_ERR, SIG_IGN};
pub use time::{Timespec, Timeval};

/// Kernel request with typed arguments
#[derive(Debug)]
pub enum Syscall<'a> {
    /// Terminate the calling process
    Exit { status: i32 },

    /// Identity of the calling process
    GetPid,

    /// Deliver `signal` to process `pid`
    Kill { pid: i32, signal: i32 },

    /// Write bytes to a descriptor
    Write { fd: i32, buf: &'a [u8] },

    /// Open a directory enumeration, returning an opaque handle
    DirOpen { path: &'a CStr },

    /// Fill `entry` with the next entry; an empty name means "no more"
    DirRead { handle: usize, entry: &'a mut RawDirent },

    /// Release a directory handle
    DirClose { handle: usize },

    /// Wait until an entry is ready or `timeout_ms` passes (-1 = forever)
    Poll { fds: &'a mut [PollFd], timeout_ms: i32 },

    /// Install `act` (if any) for `signal`, storing the previous record in `old`
    SigAction {
        signal: i32,
        act: Option<&'a RawSigaction>,
        old: Option<&'a mut RawSigaction>,
    },
}

impl Syscall<'_> {
    /// Kernel syscall number for this request
    pub const fn number(&self) -> usize {
        match self {
            Syscall::Exit { .. } => numbers::SYS_PROCESS_EXIT,
            Syscall::GetPid => numbers::SYS_PROCESS_GETPID,
            Syscall::Kill { .. } => numbers::SYS_PROCESS_KILL,
            Syscall::Write { .. } => numbers::SYS_FILE_WRITE,
            Syscall::DirOpen { .. } => numbers::SYS_DIR_OPENDIR,
            Syscall::DirRead { .. } => numbers::SYS_DIR_READDIR,
            Syscall::DirClose { .. } => numbers::SYS_DIR_CLOSEDIR,
            Syscall::Poll { .. } => numbers::SYS_FILE_POLL,
            Syscall::SigAction { .. } => numbers::SYS_SIGACTION,
        }
    }

    /// Short name for logging
    pub const fn name(&self) -> &'static str {
        match self {
            Syscall::Exit { .. } => "exit",
            Syscall::GetPid => "getpid",
            Syscall::Kill { .. } => "kill",
            Syscall::Write { .. } => "write",
            Syscall::DirOpen { .. } => "opendir",
            Syscall::DirRead { .. } => "readdir",
            Syscall::DirClose { .. } => "closedir",
            Syscall::Poll { .. } => "poll",
            Syscall::SigAction { .. } => "sigaction",
        }
    }
}

/// Executes kernel requests
///
/// Implementations return the kernel's raw result word unchanged:
/// `>= 0` on success, `-errno` on failure.
pub trait Kernel {
    fn syscall(&mut self, call: Syscall<'_>) -> isize;
}

impl<K: Kernel + ?Sized> Kernel for &mut K {
    fn syscall(&mut self, call: Syscall<'_>) -> isize {
        (**self).syscall(call)
    }
}
