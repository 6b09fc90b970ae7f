//! # Kernel Platform Layer
//!
//! Provides one [`Kernel`](shim_abi::Kernel) implementation per deployment mode:
//! - **Mock Mode**: in-memory kernel for fast unit testing on any host
//! - **Runtime Mode**: raw syscalls issued with inline assembly
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shim_platform::PlatformKernel;
//! use shim_abi::{Kernel, Syscall};
//!
//! let mut kernel = PlatformKernel::default();
//! let pid = kernel.syscall(Syscall::GetPid);
//! ```
//!
//! ## Build Modes
//!
//! ```bash
//! # Mock (default - host development)
//! cargo build
//!
//! # Runtime (real kernel)
//! cargo build --no-default-features --features runtime
//! ```

#![no_std]

/// Raw syscall backend - the only place request tags become syscall numbers
#[cfg(feature = "runtime")]
pub mod raw;

#[cfg(feature = "runtime")]
pub use raw::RawKernel;

#[cfg(feature = "mock")]
pub use shim_mock::MockKernel;

/// Kernel used by the process entry path in the selected mode
#[cfg(feature = "runtime")]
pub type PlatformKernel = raw::RawKernel;

/// Kernel used by the process entry path in the selected mode
#[cfg(all(feature = "mock", not(feature = "runtime")))]
pub type PlatformKernel = shim_mock::MockKernel;

/// Platform configuration and detection
pub mod config {
    /// Detect which kernel backend is active at compile time
    pub fn platform_mode() -> &'static str {
        #[cfg(feature = "runtime")]
        return "runtime";

        #[cfg(all(feature = "mock", not(feature = "runtime")))]
        return "mock";

        #[cfg(not(any(feature = "mock", feature = "runtime")))]
        compile_error!("No kernel backend selected. Use either 'mock' or 'runtime' feature.");
    }

    /// Check if we're in mock mode (testing)
    pub const fn is_mock() -> bool {
        cfg!(all(feature = "mock", not(feature = "runtime")))
    }

    /// Check if we're in runtime mode (real kernel)
    pub const fn is_runtime() -> bool {
        cfg!(feature = "runtime")
    }
}
