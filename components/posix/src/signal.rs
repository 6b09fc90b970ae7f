//! Signal registration and delivery
//!
//! The kernel only understands full `(handler, mask, flags)` records, so
//! the single-handler `signal()` interface is built on `sigaction` with
//! `SA_RESTART` and an empty mask.

use shim_abi::signal::{is_valid_signal, NSIG};
use shim_abi::{Kernel, RawSigaction, SaFlags, Syscall, SIG_DFL, SIG_ERR, SIG_IGN};

use crate::runtime::Runtime;
use crate::{Result, ShimError};

/// Signature of a catching handler
pub type HandlerFn = extern "C" fn(i32);

/// Disposition of one signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigHandler {
    /// `SIG_DFL`
    Default,
    /// `SIG_IGN`
    Ignore,
    Handler(HandlerFn),
    /// `SIG_ERR`: only ever returned, never installable
    Error,
}

impl SigHandler {
    /// Handler word stored in the kernel record
    pub fn to_raw(self) -> usize {
        match self {
            SigHandler::Default => SIG_DFL,
            SigHandler::Ignore => SIG_IGN,
            SigHandler::Handler(f) => f as usize,
            SigHandler::Error => SIG_ERR,
        }
    }

    /// Decode a handler word read back from the kernel
    pub fn from_raw(raw: usize) -> SigHandler {
        match raw {
            SIG_DFL => SigHandler::Default,
            SIG_IGN => SigHandler::Ignore,
            SIG_ERR => SigHandler::Error,
            // SAFETY: the kernel only hands back words this process
            // installed, and every installed non-special word came from a
            // `HandlerFn`.
            addr => SigHandler::Handler(unsafe { core::mem::transmute::<usize, HandlerFn>(addr) }),
        }
    }
}

/// Set of signals (`sigset_t`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SigSet(u64);

impl SigSet {
    pub const fn empty() -> Self {
        SigSet(0)
    }

    /// Every bit set, as `sigfillset` leaves it
    pub const fn full() -> Self {
        SigSet(u64::MAX)
    }

    pub const fn from_bits(bits: u64) -> Self {
        SigSet(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    fn check(signal: i32) -> Result<u64> {
        if is_valid_signal(signal) {
            Ok(1 << signal)
        } else {
            Err(ShimError::InvalidArgument)
        }
    }

    pub fn add(&mut self, signal: i32) -> Result<()> {
        self.0 |= Self::check(signal)?;
        Ok(())
    }

    pub fn remove(&mut self, signal: i32) -> Result<()> {
        self.0 &= !Self::check(signal)?;
        Ok(())
    }

    /// Membership test; out-of-range signals are never members
    pub fn contains(&self, signal: i32) -> bool {
        Self::check(signal).is_ok_and(|bit| self.0 & bit != 0)
    }
}

/// Full registration record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigAction {
    pub handler: SigHandler,
    pub mask: SigSet,
    pub flags: SaFlags,
}

impl Default for SigAction {
    fn default() -> Self {
        Self {
            handler: SigHandler::Default,
            mask: SigSet::empty(),
            flags: SaFlags::empty(),
        }
    }
}

impl SigAction {
    pub fn new(handler: SigHandler, mask: SigSet, flags: SaFlags) -> Self {
        Self {
            handler,
            mask,
            flags,
        }
    }

    pub fn to_raw(&self) -> RawSigaction {
        RawSigaction::new(self.handler.to_raw(), self.mask.bits(), self.flags)
    }

    pub fn from_raw(raw: &RawSigaction) -> Self {
        Self {
            handler: SigHandler::from_raw(raw.sa_handler),
            mask: SigSet::from_bits(raw.sa_mask),
            flags: raw.flags(),
        }
    }
}

impl<K: Kernel> Runtime<K> {
    fn sigaction_inner(&mut self, signal: i32, act: Option<&SigAction>) -> Result<SigAction> {
        if !is_valid_signal(signal) || act.is_some_and(|a| a.handler == SigHandler::Error) {
            return Err(ShimError::InvalidArgument);
        }

        let raw_act = act.map(SigAction::to_raw);
        let mut raw_old = RawSigaction::default();
        self.call(Syscall::SigAction {
            signal,
            act: raw_act.as_ref(),
            old: Some(&mut raw_old),
        })?;
        Ok(SigAction::from_raw(&raw_old))
    }

    /// `sigaction(2)`: install `act` (if any) and report the previous record
    pub fn sigaction(
        &mut self,
        signal: i32,
        act: Option<&SigAction>,
        old: Option<&mut SigAction>,
    ) -> i32 {
        let result = self.sigaction_inner(signal, act).map(|previous| {
            if let Some(old) = old {
                *old = previous;
            }
            0
        });
        self.translate(result)
    }

    /// `signal(2)`: previous handler, or [`SigHandler::Error`]
    pub fn signal(&mut self, signal: i32, handler: SigHandler) -> SigHandler {
        let act = SigAction::new(handler, SigSet::empty(), SaFlags::SA_RESTART);
        let result = self
            .sigaction_inner(signal, Some(&act))
            .map(|previous| previous.handler);
        self.translate(result)
    }

    /// `kill(2)`
    pub fn kill(&mut self, pid: i32, signal: i32) -> i32 {
        let result = self.call(Syscall::Kill { pid, signal }).map(|_| 0);
        self.translate(result)
    }

    /// `raise(3)`: signal the calling process
    pub fn raise(&mut self, signal: i32) -> i32 {
        let result = self.getpid_inner().and_then(|pid| {
            log::debug!("raise {} -> pid {}", signal, pid);
            self.call(Syscall::Kill { pid, signal }).map(|_| 0)
        });
        self.translate(result)
    }

    /// `sigemptyset(3)`
    pub fn sigemptyset(&mut self, set: &mut SigSet) -> i32 {
        *set = SigSet::empty();
        0
    }

    /// `sigfillset(3)`
    pub fn sigfillset(&mut self, set: &mut SigSet) -> i32 {
        *set = SigSet::full();
        0
    }

    /// `sigaddset(3)`
    pub fn sigaddset(&mut self, set: &mut SigSet, signal: i32) -> i32 {
        let result = set.add(signal).map(|()| 0);
        self.translate(result)
    }

    /// `sigdelset(3)`
    pub fn sigdelset(&mut self, set: &mut SigSet, signal: i32) -> i32 {
        let result = set.remove(signal).map(|()| 0);
        self.translate(result)
    }

    /// `sigismember(3)`: 1, 0, or -1 with EINVAL
    pub fn sigismember(&mut self, set: &SigSet, signal: i32) -> i32 {
        let result = SigSet::check(signal).map(|bit| i32::from(set.bits() & bit != 0));
        self.translate(result)
    }
}
