//! Readiness primitive records
//!
//! The kernel's only wait primitive takes an array of [`PollFd`] and writes
//! the fired events back into `revents`.

use bitflags::bitflags;
use static_assertions::const_assert_eq;

bitflags! {
    /// Event mask bits shared by `events` and `revents`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PollEvents: i16 {
        /// Data available to read
        const POLLIN = 0x0001;
        /// Exceptional condition (urgent/priority data)
        const POLLPRI = 0x0002;
        /// Writing will not block
        const POLLOUT = 0x0004;
        /// Error condition (revents only)
        const POLLERR = 0x0008;
        /// Peer hung up (revents only)
        const POLLHUP = 0x0010;
        /// Descriptor not open (revents only)
        const POLLNVAL = 0x0020;
    }
}

/// One wait-set entry, laid out as the kernel expects
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollFd {
    pub fd: i32,
    pub events: i16,
    pub revents: i16,
}

const_assert_eq!(core::mem::size_of::<PollFd>(), 8);

impl PollFd {
    /// Entry waiting for `events` on `fd`, with no result yet
    pub const fn new(fd: i32, events: PollEvents) -> Self {
        Self {
            fd,
            events: events.bits(),
            revents: 0,
        }
    }

    /// Requested events
    pub const fn events(&self) -> PollEvents {
        PollEvents::from_bits_retain(self.events)
    }

    /// Events reported by the kernel
    pub const fn revents(&self) -> PollEvents {
        PollEvents::from_bits_retain(self.revents)
    }

    pub fn set_revents(&mut self, revents: PollEvents) {
        self.revents = revents.bits();
    }
}
