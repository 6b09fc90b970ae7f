//! Process-wide runtime context
//!
//! Holds everything POSIX keeps in globals: the errno cell, the option
//! scanner's cursor, the published environment and the runtime
//! configuration. The kernel handle lives here too so every wrapper can
//! reach it through `&mut self`.

use shim_abi::{Errno, Kernel};

use crate::env::Environ;
use crate::getopt::GetoptState;

/// Tunables fixed at runtime construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Initial value of the option scanner's diagnostic switch
    pub opterr: bool,
    /// Descriptor that receives option scanner diagnostics
    pub diagnostic_fd: i32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            opterr: true,
            diagnostic_fd: 2,
        }
    }
}

/// POSIX process state bound to one kernel
#[derive(Debug)]
pub struct Runtime<K: Kernel> {
    pub(crate) kernel: K,
    pub(crate) errno: Errno,
    pub(crate) config: RuntimeConfig,
    pub(crate) getopt: GetoptState,
    pub(crate) environ: Environ,
}

impl<K: Kernel> Runtime<K> {
    pub fn new(kernel: K) -> Self {
        Self::with_config(kernel, RuntimeConfig::default())
    }

    pub fn with_config(kernel: K, config: RuntimeConfig) -> Self {
        log::debug!(
            "runtime: opterr={} diagnostic_fd={}",
            config.opterr,
            config.diagnostic_fd
        );
        Self {
            kernel,
            errno: Errno::NONE,
            config,
            getopt: GetoptState::new(config.opterr),
            environ: Environ::new(),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    pub fn into_kernel(self) -> K {
        self.kernel
    }
}
