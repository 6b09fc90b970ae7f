//! C Runtime Startup - from the kernel's initial stack to `main`
//!
//! # Purpose
//! Turns the raw initial stack into a typed [`ProcessImage`], publishes the
//! environment to the POSIX runtime, runs `.init_array`, calls the program,
//! runs `.fini_array` in reverse and exits with the program's status.
//!
//! # Integration Points
//! - Depends on: shim-abi, shim-posix (runtime context), shim-platform (kernel backend)
//! - Provides to: programs linked against the shim
//!
//! # Architecture
//! - [`image`]: allocation-free parser over the initial stack words
//! - [`hooks`]: initializer/finalizer tables
//! - [`bootstrap`]: the ordered startup sequence, generic over the kernel
//! - [`environ`](mod@environ): the process-wide `envp` visible to initializers
//! - `entry` (runtime feature): `_start`, linker-provided hook bounds, exit
//!
//! # Testing Strategy
//! - Unit tests: stack layouts (well-formed and malformed), hook ordering
//! - Integration tests: full bootstrap against the mock kernel

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

use thiserror::Error;

pub mod bootstrap;
pub mod environ;
pub mod hooks;
pub mod image;

#[cfg(feature = "runtime")]
pub mod entry;

pub use bootstrap::run;
pub use environ::environ;
pub use hooks::{Hook, HookTable};
pub use image::ProcessImage;

pub use shim_platform::PlatformKernel;

/// Malformed initial stack
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    #[error("null initial stack pointer")]
    NullStack,

    #[error("initial stack is empty")]
    Empty,

    #[error("argc {argc} does not fit in a {words}-word stack")]
    TruncatedArgv { argc: usize, words: usize },

    #[error("argument {0} is a null pointer")]
    NullArgument(usize),

    #[error("argument vector is not null-terminated")]
    MissingArgvTerminator,

    #[error("environment is not null-terminated")]
    MissingEnvTerminator,
}

pub type Result<T> = core::result::Result<T, StackError>;
