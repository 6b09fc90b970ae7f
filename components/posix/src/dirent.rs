//! Directory streams over the kernel's handle-based enumeration
//!
//! A stream owns a kernel handle plus one entry buffer. Each read refills
//! that buffer in place, so an entry returned by a read is only valid until
//! the next read or close of the same stream; the borrow checker enforces
//! this on the returned reference.

use alloc::boxed::Box;
use alloc::ffi::CString;

use shim_abi::{Kernel, RawDirent, Syscall};

use crate::errno::call;
use crate::runtime::Runtime;
use crate::{Result, ShimError};

/// Directory entry as seen by callers
pub type Dirent = RawDirent;

/// Open directory stream (`DIR`)
#[derive(Debug)]
pub struct DirStream {
    handle: usize,
    entry: RawDirent,
    exhausted: bool,
}

impl DirStream {
    /// Open `path` for enumeration
    pub fn open<K: Kernel>(kernel: &mut K, path: &str) -> Result<Box<DirStream>> {
        let path = CString::new(path).map_err(|_| ShimError::InvalidArgument)?;
        let handle = call(kernel, Syscall::DirOpen { path: &path })?;
        log::debug!("opendir {:?} -> handle {}", path, handle);

        Ok(Box::new(DirStream {
            handle,
            entry: RawDirent::zeroed(),
            exhausted: false,
        }))
    }

    /// Next entry, or `None` once the kernel reports the end
    ///
    /// After the end has been seen, further reads answer `None` without
    /// asking the kernel again.
    pub fn read_next<K: Kernel>(&mut self, kernel: &mut K) -> Result<Option<&RawDirent>> {
        if self.exhausted {
            return Ok(None);
        }

        call(
            kernel,
            Syscall::DirRead {
                handle: self.handle,
                entry: &mut self.entry,
            },
        )?;

        if self.entry.is_end() {
            self.exhausted = true;
            return Ok(None);
        }

        Ok(Some(&self.entry))
    }

    /// Release the kernel handle and the stream record
    ///
    /// The record is freed even when the kernel rejects the close.
    pub fn close<K: Kernel>(self: Box<Self>, kernel: &mut K) -> Result<()> {
        let handle = self.handle;
        drop(self);
        call(kernel, Syscall::DirClose { handle })?;
        log::debug!("closedir handle {}", handle);
        Ok(())
    }

    /// Clear the end-of-stream flag
    ///
    /// The kernel cursor is not repositioned: a kernel that has already
    /// reported the end keeps doing so.
    pub fn rewind(&mut self) {
        self.exhausted = false;
    }

    /// Opaque kernel handle
    pub fn handle(&self) -> usize {
        self.handle
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<K: Kernel> Runtime<K> {
    /// `opendir(3)`: `None` path fails with EINVAL
    pub fn opendir(&mut self, path: Option<&str>) -> Option<Box<DirStream>> {
        let result = match path {
            Some(path) => DirStream::open(&mut self.kernel, path).map(Some),
            None => Err(ShimError::InvalidArgument),
        };
        self.translate(result)
    }

    /// `readdir(3)`: end of directory returns `None` with errno untouched
    pub fn readdir<'d>(&mut self, dir: Option<&'d mut DirStream>) -> Option<&'d Dirent> {
        let result = match dir {
            Some(dir) => dir.read_next(&mut self.kernel),
            None => Err(ShimError::InvalidArgument),
        };
        self.translate(result)
    }

    /// `closedir(3)`
    pub fn closedir(&mut self, dir: Option<Box<DirStream>>) -> i32 {
        let result = match dir {
            Some(dir) => dir.close(&mut self.kernel).map(|()| 0),
            None => Err(ShimError::InvalidArgument),
        };
        self.translate(result)
    }

    /// `rewinddir(3)`: absent stream sets EINVAL
    pub fn rewinddir(&mut self, dir: Option<&mut DirStream>) {
        match dir {
            Some(dir) => dir.rewind(),
            None => self.errno = ShimError::InvalidArgument.errno(),
        }
    }

    /// `dirfd(3)`: the stream's kernel handle, EINVAL if it does not fit
    pub fn dirfd(&mut self, dir: Option<&DirStream>) -> i32 {
        let result = dir
            .ok_or(ShimError::InvalidArgument)
            .and_then(|dir| i32::try_from(dir.handle()).map_err(|_| ShimError::InvalidArgument));
        self.translate(result)
    }
}
