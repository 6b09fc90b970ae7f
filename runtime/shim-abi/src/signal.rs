//! Signal numbers and the kernel's registration record

use bitflags::bitflags;
use static_assertions::const_assert_eq;

/// One past the highest valid signal number
pub const NSIG: i32 = 32;

pub const SIGHUP: i32 = 1;
pub const SIGINT: i32 = 2;
pub const SIGQUIT: i32 = 3;
pub const SIGILL: i32 = 4;
pub const SIGTRAP: i32 = 5;
pub const SIGABRT: i32 = 6;
pub const SIGBUS: i32 = 7;
pub const SIGFPE: i32 = 8;
pub const SIGKILL: i32 = 9;
pub const SIGUSR1: i32 = 10;
pub const SIGSEGV: i32 = 11;
pub const SIGUSR2: i32 = 12;
pub const SIGPIPE: i32 = 13;
pub const SIGALRM: i32 = 14;
pub const SIGTERM: i32 = 15;
pub const SIGCHLD: i32 = 17;
pub const SIGCONT: i32 = 18;
pub const SIGSTOP: i32 = 19;
pub const SIGTSTP: i32 = 20;
pub const SIGWINCH: i32 = 28;
pub const SIGSYS: i32 = 31;

/// Handler word meaning "default action"
pub const SIG_DFL: usize = 0;
/// Handler word meaning "ignore"
pub const SIG_IGN: usize = 1;
/// Handler word returned by `signal()` on failure
pub const SIG_ERR: usize = usize::MAX;

bitflags! {
    /// `sa_flags` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SaFlags: u32 {
        const SA_NOCLDSTOP = 0x0000_0001;
        const SA_NOCLDWAIT = 0x0000_0002;
        const SA_SIGINFO = 0x0000_0004;
        const SA_ONSTACK = 0x0800_0000;
        const SA_RESTART = 0x1000_0000;
        const SA_NODEFER = 0x4000_0000;
        const SA_RESETHAND = 0x8000_0000;
    }
}

/// Kernel `struct sigaction`
///
/// `sa_handler` holds [`SIG_DFL`], [`SIG_IGN`] or a handler address.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSigaction {
    pub sa_handler: usize,
    pub sa_mask: u64,
    pub sa_flags: u32,
}

const_assert_eq!(core::mem::size_of::<RawSigaction>(), 24);

impl RawSigaction {
    pub const fn new(handler: usize, mask: u64, flags: SaFlags) -> Self {
        Self {
            sa_handler: handler,
            sa_mask: mask,
            sa_flags: flags.bits(),
        }
    }

    pub const fn flags(&self) -> SaFlags {
        SaFlags::from_bits_retain(self.sa_flags)
    }
}

/// True for `1 <= signal < NSIG`
pub const fn is_valid_signal(signal: i32) -> bool {
    signal >= 1 && signal < NSIG
}
