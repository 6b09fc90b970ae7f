//! Fixed answers for interfaces the kernel does not provide
//!
//! Terminal attributes, resource limits, locales, the user database and
//! dynamic loading have no kernel backing. Programs that call them get
//! stable, harmless results instead of link failures.

use shim_abi::Kernel;

use crate::runtime::Runtime;
use crate::{Result, ShimError};

/// Terminal attributes (`struct termios`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Termios {
    pub c_iflag: u32,
    pub c_oflag: u32,
    pub c_cflag: u32,
    pub c_lflag: u32,
    pub c_cc: [u8; 32],
}

/// Resource limit value meaning "no limit"
pub const RLIM_INFINITY: u64 = u64::MAX;

/// Soft and hard resource limits (`struct rlimit`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rlimit {
    pub rlim_cur: u64,
    pub rlim_max: u64,
}

impl Rlimit {
    pub const UNLIMITED: Rlimit = Rlimit {
        rlim_cur: RLIM_INFINITY,
        rlim_max: RLIM_INFINITY,
    };
}

/// User database entry (`struct passwd`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passwd {
    pub name: &'static str,
    pub passwd: &'static str,
    pub uid: u32,
    pub gid: u32,
    pub gecos: &'static str,
    pub dir: &'static str,
    pub shell: &'static str,
}

/// The only account known to the system
pub static ROOT: Passwd = Passwd {
    name: "root",
    passwd: "x",
    uid: 0,
    gid: 0,
    gecos: "root",
    dir: "/root",
    shell: "/bin/sh",
};

/// Message reported by [`dlerror`]
pub const DL_UNSUPPORTED: &str = "dynamic loading not supported";

/// Opaque handle returned by a successful `dlopen` (never produced)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DlHandle(usize);

impl DlHandle {
    pub fn as_raw(&self) -> usize {
        self.0
    }
}

/// `setlocale(3)`: only the C locale exists
pub fn setlocale(_category: i32, locale: Option<&str>) -> Option<&'static str> {
    match locale {
        None | Some("") | Some("C") | Some("POSIX") => Some("C"),
        Some(other) => {
            log::debug!("setlocale: {:?} unavailable", other);
            None
        }
    }
}

/// `getpwuid(3)`
pub fn getpwuid(uid: u32) -> Option<&'static Passwd> {
    (uid == ROOT.uid).then_some(&ROOT)
}

/// `getpwnam(3)`
pub fn getpwnam(name: &str) -> Option<&'static Passwd> {
    (name == ROOT.name).then_some(&ROOT)
}

/// `getlogin(3)`
pub fn getlogin() -> &'static str {
    ROOT.name
}

/// `dlopen(3)`
pub fn dlopen(filename: Option<&str>, _flags: i32) -> Option<DlHandle> {
    log::debug!("dlopen({:?}): {}", filename, DL_UNSUPPORTED);
    None
}

/// `dlsym(3)`
pub fn dlsym(_handle: Option<DlHandle>, _symbol: &str) -> Option<usize> {
    None
}

/// `dlclose(3)`
pub fn dlclose(_handle: Option<DlHandle>) -> i32 {
    -1
}

/// `dlerror(3)`
pub fn dlerror() -> &'static str {
    DL_UNSUPPORTED
}

impl<K: Kernel> Runtime<K> {
    /// `tcgetattr(3)`: zeroed attributes for any descriptor
    pub fn tcgetattr(&mut self, _fd: i32, termios: Option<&mut Termios>) -> i32 {
        let result: Result<i32> = match termios {
            Some(termios) => {
                *termios = Termios::default();
                Ok(0)
            }
            None => Err(ShimError::InvalidArgument),
        };
        self.translate(result)
    }

    /// `tcsetattr(3)`: accepted and discarded
    pub fn tcsetattr(&mut self, _fd: i32, _action: i32, termios: Option<&Termios>) -> i32 {
        let result = termios.map(|_| 0).ok_or(ShimError::InvalidArgument);
        self.translate(result)
    }

    /// `getrlimit(2)`: every resource is unlimited
    pub fn getrlimit(&mut self, _resource: i32, limit: Option<&mut Rlimit>) -> i32 {
        let result: Result<i32> = match limit {
            Some(limit) => {
                *limit = Rlimit::UNLIMITED;
                Ok(0)
            }
            None => Err(ShimError::InvalidArgument),
        };
        self.translate(result)
    }

    /// `setrlimit(2)`: accepted and discarded
    pub fn setrlimit(&mut self, _resource: i32, limit: Option<&Rlimit>) -> i32 {
        let result = limit.map(|_| 0).ok_or(ShimError::InvalidArgument);
        self.translate(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale() {
        assert_eq!(setlocale(0, None), Some("C"));
        assert_eq!(setlocale(0, Some("")), Some("C"));
        assert_eq!(setlocale(0, Some("POSIX")), Some("C"));
        assert_eq!(setlocale(0, Some("en_US.UTF-8")), None);
    }

    #[test]
    fn test_user_database() {
        assert_eq!(getpwuid(0).map(|pw| pw.dir), Some("/root"));
        assert_eq!(getpwuid(1000), None);
        assert_eq!(getpwnam("root").map(|pw| pw.shell), Some("/bin/sh"));
        assert_eq!(getpwnam("nobody"), None);
        assert_eq!(getlogin(), "root");
    }

    #[test]
    fn test_dynamic_loading_unavailable() {
        let handle = dlopen(Some("libm.so"), 0);
        assert_eq!(handle, None);
        assert_eq!(dlsym(handle, "sin"), None);
        assert_eq!(dlclose(handle), -1);
        assert_eq!(dlerror(), "dynamic loading not supported");
    }
}
