//! select(2) emulated on the kernel's poll primitive
//!
//! The three descriptor bitmaps are flattened into one `PollFd` array
//! (one entry per descriptor with any interest), handed to poll, and the
//! reported `revents` are folded back into the bitmaps in place.

use alloc::vec::Vec;

use shim_abi::signal::NSIG;
use shim_abi::{Kernel, PollEvents, PollFd, Syscall, Timespec, Timeval};

use crate::errno::call;
use crate::runtime::Runtime;
use crate::signal::SigSet;
use crate::{Result, ShimError};

/// Number of descriptors an [`FdSet`] can describe
pub const FD_SETSIZE: usize = 1024;

const WORD_BITS: usize = u64::BITS as usize;

/// Fixed-size descriptor bitmap (`fd_set`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdSet {
    bits: [u64; FD_SETSIZE / WORD_BITS],
}

impl Default for FdSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FdSet {
    /// Empty set
    pub const fn new() -> Self {
        Self {
            bits: [0; FD_SETSIZE / WORD_BITS],
        }
    }

    fn slot(fd: i32) -> Option<(usize, u64)> {
        let fd = usize::try_from(fd).ok().filter(|&fd| fd < FD_SETSIZE)?;
        Some((fd / WORD_BITS, 1 << (fd % WORD_BITS)))
    }

    /// `FD_ZERO`
    pub fn zero(&mut self) {
        self.bits = [0; FD_SETSIZE / WORD_BITS];
    }

    /// `FD_SET`; descriptors outside `[0, FD_SETSIZE)` are ignored
    pub fn set(&mut self, fd: i32) {
        if let Some((word, mask)) = Self::slot(fd) {
            self.bits[word] |= mask;
        }
    }

    /// `FD_CLR`
    pub fn clear(&mut self, fd: i32) {
        if let Some((word, mask)) = Self::slot(fd) {
            self.bits[word] &= !mask;
        }
    }

    /// `FD_ISSET`
    pub fn is_set(&self, fd: i32) -> bool {
        Self::slot(fd).is_some_and(|(word, mask)| self.bits[word] & mask != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&word| word == 0)
    }

    /// Number of descriptors in the set
    pub fn count(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }
}

/// The three interest sets of one select call
pub struct WaitSets<'a> {
    pub read: Option<&'a mut FdSet>,
    pub write: Option<&'a mut FdSet>,
    pub except: Option<&'a mut FdSet>,
}

impl WaitSets<'_> {
    fn interest(&self, fd: i32) -> PollEvents {
        let mut events = PollEvents::empty();
        if self.read.as_deref().is_some_and(|set| set.is_set(fd)) {
            events |= PollEvents::POLLIN;
        }
        if self.write.as_deref().is_some_and(|set| set.is_set(fd)) {
            events |= PollEvents::POLLOUT;
        }
        if self.except.as_deref().is_some_and(|set| set.is_set(fd)) {
            events |= PollEvents::POLLPRI;
        }
        events
    }

    fn clear_all(&mut self) {
        for set in [
            self.read.as_deref_mut(),
            self.write.as_deref_mut(),
            self.except.as_deref_mut(),
        ]
        .into_iter()
        .flatten()
        {
            set.zero();
        }
    }

    /// Fold poll results back into the bitmaps, returning the descriptors
    /// with at least one bit set
    fn apply(&mut self, fds: &[PollFd]) -> usize {
        self.clear_all();

        let mut ready = 0;
        for pfd in fds {
            let wanted = pfd.events();
            let got = pfd.revents();
            let mut hit = false;

            if wanted.contains(PollEvents::POLLIN)
                && got.intersects(PollEvents::POLLIN | PollEvents::POLLHUP | PollEvents::POLLERR)
            {
                if let Some(set) = self.read.as_deref_mut() {
                    set.set(pfd.fd);
                    hit = true;
                }
            }
            if wanted.contains(PollEvents::POLLOUT) && got.contains(PollEvents::POLLOUT) {
                if let Some(set) = self.write.as_deref_mut() {
                    set.set(pfd.fd);
                    hit = true;
                }
            }
            if wanted.contains(PollEvents::POLLPRI)
                && got.intersects(PollEvents::POLLPRI | PollEvents::POLLNVAL | PollEvents::POLLERR)
            {
                if let Some(set) = self.except.as_deref_mut() {
                    set.set(pfd.fd);
                    hit = true;
                }
            }
            ready += usize::from(hit);
        }
        ready
    }
}

/// Typed select: number of ready descriptors
pub fn select_sets<K: Kernel>(
    kernel: &mut K,
    nfds: i32,
    mut sets: WaitSets<'_>,
    timeout: Option<&Timeval>,
) -> Result<usize> {
    let nfds = usize::try_from(nfds)
        .ok()
        .filter(|&n| n <= FD_SETSIZE)
        .ok_or(ShimError::InvalidArgument)?;
    let timeout_ms = timeout.map_or(-1, Timeval::as_millis_clamped);

    let mut fds: Vec<PollFd> = (0..nfds as i32)
        .filter_map(|fd| {
            let events = sets.interest(fd);
            (!events.is_empty()).then(|| PollFd::new(fd, events))
        })
        .collect();

    if fds.is_empty() {
        // Nothing to watch: still honour the timeout
        call(
            kernel,
            Syscall::Poll {
                fds: &mut [],
                timeout_ms,
            },
        )?;
        return Ok(0);
    }

    call(
        kernel,
        Syscall::Poll {
            fds: &mut fds,
            timeout_ms,
        },
    )?;

    Ok(sets.apply(&fds))
}

impl<K: Kernel> Runtime<K> {
    /// `select(2)`
    pub fn select(
        &mut self,
        nfds: i32,
        readfds: Option<&mut FdSet>,
        writefds: Option<&mut FdSet>,
        exceptfds: Option<&mut FdSet>,
        timeout: Option<&Timeval>,
    ) -> i32 {
        let sets = WaitSets {
            read: readfds,
            write: writefds,
            except: exceptfds,
        };
        let result = select_sets(&mut self.kernel, nfds, sets, timeout).map(|n| n as i32);
        self.translate(result)
    }

    /// `pselect(2)`: nanoseconds are floored to microseconds
    ///
    /// The signal mask is not applied for the duration of the wait.
    pub fn pselect(
        &mut self,
        nfds: i32,
        readfds: Option<&mut FdSet>,
        writefds: Option<&mut FdSet>,
        exceptfds: Option<&mut FdSet>,
        timeout: Option<&Timespec>,
        sigmask: Option<&SigSet>,
    ) -> i32 {
        if let Some(mask) = sigmask {
            log::warn!(
                "pselect: ignoring signal mask {:#x} ({} signals)",
                mask.bits(),
                (1..NSIG).filter(|&sig| mask.contains(sig)).count()
            );
        }
        let timeout = timeout.map(Timespec::to_timeval);
        self.select(nfds, readfds, writefds, exceptfds, timeout.as_ref())
    }

    /// `poll(2)`: ready-entry count, `revents` written in place
    pub fn poll(&mut self, fds: &mut [PollFd], timeout_ms: i32) -> i32 {
        let result = self
            .call(Syscall::Poll { fds, timeout_ms })
            .map(|n| n as i32);
        self.translate(result)
    }
}
