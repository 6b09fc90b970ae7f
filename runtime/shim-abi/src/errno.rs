//! Kernel error codes
//!
//! Every syscall returns a signed word. Negative values are `-errno` using
//! the numbering below, which is fixed by the kernel headers and differs
//! from Linux.

use core::fmt;

/// Error code carried by a failing syscall
///
/// `Errno(0)` means "no error recorded".
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Errno(pub i32);

impl Errno {
    pub const NONE: Errno = Errno(0);
    pub const ENOSYS: Errno = Errno(1);
    pub const EINVAL: Errno = Errno(2);
    pub const EPERM: Errno = Errno(3);
    pub const ENOENT: Errno = Errno(4);
    pub const ENOMEM: Errno = Errno(5);
    pub const EAGAIN: Errno = Errno(6);
    pub const EINTR: Errno = Errno(7);
    pub const EILSEQ: Errno = Errno(8);
    pub const EFAULT: Errno = Errno(9);
    pub const EACCES: Errno = Errno(18);
    pub const ESRCH: Errno = Errno(19);
    pub const EEXIST: Errno = Errno(20);
    pub const EBADF: Errno = Errno(21);
    pub const EIO: Errno = Errno(22);
    pub const ENOTDIR: Errno = Errno(28);
    pub const EMFILE: Errno = Errno(30);
    pub const ENOTTY: Errno = Errno(32);
    pub const ENAMETOOLONG: Errno = Errno(43);

    /// Raw numeric value
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Extract the error from a raw syscall return, if it is one
    pub const fn from_ret(ret: isize) -> Option<Errno> {
        if ret < 0 {
            Some(Errno(ret.wrapping_neg() as i32))
        } else {
            None
        }
    }

    /// Encode as the negative return a kernel would produce
    pub const fn to_ret(self) -> isize {
        -(self.0 as isize)
    }

    /// Symbolic name, or `"EUNKNOWN"` for codes outside the table
    pub fn name(self) -> &'static str {
        match self {
            Errno::NONE => "OK",
            Errno::ENOSYS => "ENOSYS",
            Errno::EINVAL => "EINVAL",
            Errno::EPERM => "EPERM",
            Errno::ENOENT => "ENOENT",
            Errno::ENOMEM => "ENOMEM",
            Errno::EAGAIN => "EAGAIN",
            Errno::EINTR => "EINTR",
            Errno::EILSEQ => "EILSEQ",
            Errno::EFAULT => "EFAULT",
            Errno::EACCES => "EACCES",
            Errno::ESRCH => "ESRCH",
            Errno::EEXIST => "EEXIST",
            Errno::EBADF => "EBADF",
            Errno::EIO => "EIO",
            Errno::ENOTDIR => "ENOTDIR",
            Errno::EMFILE => "EMFILE",
            Errno::ENOTTY => "ENOTTY",
            Errno::ENAMETOOLONG => "ENAMETOOLONG",
            _ => "EUNKNOWN",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

/// Split a raw syscall return into its success value or error code
pub const fn decode(ret: isize) -> Result<usize, Errno> {
    match Errno::from_ret(ret) {
        Some(errno) => Err(errno),
        None => Ok(ret as usize),
    }
}
