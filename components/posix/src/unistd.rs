//! Process identity, output and termination

use shim_abi::{Kernel, Syscall};

use crate::runtime::Runtime;
use crate::{Result, ShimError};

impl<K: Kernel> Runtime<K> {
    pub(crate) fn getpid_inner(&mut self) -> Result<i32> {
        let pid = self.call(Syscall::GetPid)?;
        i32::try_from(pid).map_err(|_| ShimError::InvalidArgument)
    }

    /// `getpid(2)`
    pub fn getpid(&mut self) -> i32 {
        let result = self.getpid_inner();
        self.translate(result)
    }

    /// `write(2)`: bytes accepted by the kernel
    pub fn write(&mut self, fd: i32, buf: &[u8]) -> isize {
        let result = self.call(Syscall::Write { fd, buf }).map(|n| n as isize);
        self.translate(result)
    }

    /// `_exit(2)`
    ///
    /// On a real kernel this never returns. A kernel that records the
    /// request instead (the mock) hands control back to the caller.
    pub fn exit(&mut self, status: i32) {
        log::info!("exit({})", status);
        if let Err(err) = self.call(Syscall::Exit { status }) {
            log::warn!("exit({}) rejected: {}", status, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use shim_abi::Errno;

    #[derive(Default)]
    struct Recorder {
        exits: Vec<i32>,
    }

    impl Kernel for Recorder {
        fn syscall(&mut self, call: Syscall<'_>) -> isize {
            match call {
                Syscall::GetPid => 42,
                Syscall::Write { fd: 1, buf } => buf.len() as isize,
                Syscall::Write { .. } => Errno::EBADF.to_ret(),
                Syscall::Exit { status } => {
                    self.exits.push(status);
                    0
                }
                _ => Errno::ENOSYS.to_ret(),
            }
        }
    }

    #[test]
    fn test_getpid() {
        let mut rt = Runtime::new(Recorder::default());
        assert_eq!(rt.getpid(), 42);
    }

    #[test]
    fn test_write_translation() {
        let mut rt = Runtime::new(Recorder::default());
        assert_eq!(rt.write(1, b"hello"), 5);
        assert_eq!(rt.write(7, b"hello"), -1);
        assert_eq!(rt.errno(), Errno::EBADF);
    }

    #[test]
    fn test_exit_reaches_kernel() {
        let mut rt = Runtime::new(Recorder::default());
        rt.exit(3);
        assert_eq!(rt.kernel().exits, [3]);
    }
}
