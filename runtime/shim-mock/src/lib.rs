//! MOCK kernel for host development and tests
//!
//! # WARNING: This is NOT the real kernel!
//!
//! An in-memory stand-in that answers the shim's [`Syscall`] requests so the
//! runtime layer can be exercised on any host.
//!
//! ## What it models
//!
//! - Directory enumerations with a kernel-held cursor per handle
//! - Per-descriptor readiness for the poll primitive
//! - The signal disposition table and signals delivered via kill
//! - Bytes written to each descriptor, and the exit status
//! - A per-syscall call counter, plus one-shot injected failures
//!
//! ## Limitations
//!
//! - Poll never blocks: an unsatisfied wait returns 0 as if the timeout expired
//! - Signals are recorded, never delivered to handlers
//! - Descriptors 0, 1 and 2 always exist; 1 and 2 are always writable

#![no_std]

#[cfg(test)]
extern crate std;

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use shim_abi::signal::{SIGKILL, SIGSTOP};
use shim_abi::{
    DirentType, Errno, Kernel, PollEvents, PollFd, RawDirent, RawSigaction, Syscall, NSIG,
};

/// Process id reported when none is configured
pub const DEFAULT_PID: i32 = 1;

/// One recorded poll call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollRecord {
    pub nfds: usize,
    pub timeout_ms: i32,
}

#[derive(Debug, Clone)]
enum Node {
    Directory(Vec<RawDirent>),
    File,
}

#[derive(Debug)]
struct OpenDir {
    entries: Vec<RawDirent>,
    cursor: usize,
}

/// In-memory kernel
#[derive(Debug)]
pub struct MockKernel {
    pid: i32,
    nodes: BTreeMap<String, Node>,
    open_dirs: BTreeMap<usize, OpenDir>,
    next_handle: usize,
    descriptors: BTreeMap<i32, PollEvents>,
    sigactions: [RawSigaction; NSIG as usize],
    delivered: Vec<(i32, i32)>,
    output: BTreeMap<i32, Vec<u8>>,
    exit_status: Option<i32>,
    calls: BTreeMap<usize, usize>,
    polls: Vec<PollRecord>,
    faults: BTreeMap<usize, Errno>,
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockKernel {
    /// Create a mock with only the standard descriptors
    pub fn new() -> Self {
        let mut descriptors = BTreeMap::new();
        descriptors.insert(0, PollEvents::empty());
        descriptors.insert(1, PollEvents::POLLOUT);
        descriptors.insert(2, PollEvents::POLLOUT);

        Self {
            pid: DEFAULT_PID,
            nodes: BTreeMap::new(),
            open_dirs: BTreeMap::new(),
            next_handle: 3,
            descriptors,
            sigactions: [RawSigaction::default(); NSIG as usize],
            delivered: Vec::new(),
            output: BTreeMap::new(),
            exit_status: None,
            calls: BTreeMap::new(),
            polls: Vec::new(),
            faults: BTreeMap::new(),
        }
    }

    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = pid;
        self
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// Register a directory and its entries in enumeration order
    pub fn add_directory<'n, I>(&mut self, path: &str, entries: I)
    where
        I: IntoIterator<Item = (&'n str, u64, DirentType)>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, ino, kind)| RawDirent::new(ino, kind, name.as_bytes()))
            .collect();
        self.nodes.insert(path.to_string(), Node::Directory(entries));
    }

    /// Register a non-directory path (opening it as a directory fails)
    pub fn add_file(&mut self, path: &str) {
        self.nodes.insert(path.to_string(), Node::File);
    }

    /// Make `fd` a valid descriptor that is currently not ready
    pub fn open_descriptor(&mut self, fd: i32) {
        self.descriptors.entry(fd).or_insert(PollEvents::empty());
    }

    /// Set the events `fd` reports when polled (creates the descriptor)
    pub fn set_ready(&mut self, fd: i32, events: PollEvents) {
        self.descriptors.insert(fd, events);
    }

    /// Fail the next call with syscall number `number` with `errno`
    pub fn fail_next(&mut self, number: usize, errno: Errno) {
        self.faults.insert(number, errno);
    }

    /// Number of times syscall `number` reached the mock
    pub fn call_count(&self, number: usize) -> usize {
        self.calls.get(&number).copied().unwrap_or(0)
    }

    /// Bytes written to `fd` so far
    pub fn output(&self, fd: i32) -> &[u8] {
        self.output.get(&fd).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn take_output(&mut self, fd: i32) -> Vec<u8> {
        self.output.remove(&fd).unwrap_or_default()
    }

    pub fn exit_status(&self) -> Option<i32> {
        self.exit_status
    }

    /// `(pid, signal)` pairs accepted by kill, in order
    pub fn delivered_signals(&self) -> &[(i32, i32)] {
        &self.delivered
    }

    /// Currently installed record for `signal`
    pub fn sigaction_for(&self, signal: i32) -> Option<RawSigaction> {
        if shim_abi::signal::is_valid_signal(signal) {
            Some(self.sigactions[signal as usize])
        } else {
            None
        }
    }

    pub fn poll_history(&self) -> &[PollRecord] {
        &self.polls
    }

    /// Forget recorded polls and call counts
    pub fn clear_history(&mut self) {
        self.polls.clear();
        self.calls.clear();
    }

    /// Directory handles not yet closed
    pub fn open_dir_count(&self) -> usize {
        self.open_dirs.len()
    }

    fn dir_open(&mut self, path: &core::ffi::CStr) -> isize {
        let Ok(path) = path.to_str() else {
            return Errno::EILSEQ.to_ret();
        };
        match self.nodes.get(path) {
            None => Errno::ENOENT.to_ret(),
            Some(Node::File) => Errno::ENOTDIR.to_ret(),
            Some(Node::Directory(entries)) => {
                let handle = self.next_handle;
                self.next_handle += 1;
                self.open_dirs.insert(
                    handle,
                    OpenDir {
                        entries: entries.clone(),
                        cursor: 0,
                    },
                );
                handle as isize
            }
        }
    }

    fn dir_read(&mut self, handle: usize, entry: &mut RawDirent) -> isize {
        let Some(dir) = self.open_dirs.get_mut(&handle) else {
            return Errno::EBADF.to_ret();
        };
        match dir.entries.get(dir.cursor) {
            Some(next) => {
                *entry = *next;
                dir.cursor += 1;
            }
            None => entry.clear(),
        }
        0
    }

    fn dir_close(&mut self, handle: usize) -> isize {
        match self.open_dirs.remove(&handle) {
            Some(_) => 0,
            None => Errno::EBADF.to_ret(),
        }
    }

    fn poll(&mut self, fds: &mut [PollFd], timeout_ms: i32) -> isize {
        self.polls.push(PollRecord {
            nfds: fds.len(),
            timeout_ms,
        });

        let mut ready = 0;
        for pfd in fds.iter_mut() {
            if pfd.fd < 0 {
                pfd.revents = 0;
                continue;
            }
            let revents = match self.descriptors.get(&pfd.fd) {
                None => PollEvents::POLLNVAL,
                Some(state) => {
                    *state & (pfd.events() | PollEvents::POLLERR | PollEvents::POLLHUP)
                }
            };
            pfd.set_revents(revents);
            if !revents.is_empty() {
                ready += 1;
            }
        }
        ready
    }

    fn sigaction(
        &mut self,
        signal: i32,
        act: Option<&RawSigaction>,
        old: Option<&mut RawSigaction>,
    ) -> isize {
        if !shim_abi::signal::is_valid_signal(signal) {
            return Errno::EINVAL.to_ret();
        }
        if act.is_some() && (signal == SIGKILL || signal == SIGSTOP) {
            return Errno::EINVAL.to_ret();
        }
        let slot = &mut self.sigactions[signal as usize];
        if let Some(old) = old {
            *old = *slot;
        }
        if let Some(act) = act {
            *slot = *act;
        }
        0
    }

    fn kill(&mut self, pid: i32, signal: i32) -> isize {
        if pid != self.pid {
            return Errno::ESRCH.to_ret();
        }
        if signal == 0 {
            return 0;
        }
        if !shim_abi::signal::is_valid_signal(signal) {
            return Errno::EINVAL.to_ret();
        }
        self.delivered.push((pid, signal));
        0
    }

    fn write(&mut self, fd: i32, buf: &[u8]) -> isize {
        if !self.descriptors.contains_key(&fd) {
            return Errno::EBADF.to_ret();
        }
        self.output.entry(fd).or_default().extend_from_slice(buf);
        buf.len() as isize
    }
}

impl Kernel for MockKernel {
    fn syscall(&mut self, call: Syscall<'_>) -> isize {
        let number = call.number();
        *self.calls.entry(number).or_insert(0) += 1;
        log::trace!("mock syscall {} ({})", call.name(), number);

        if let Some(errno) = self.faults.remove(&number) {
            log::trace!("mock syscall {} failing with injected {}", call.name(), errno);
            return errno.to_ret();
        }

        match call {
            Syscall::Exit { status } => {
                self.exit_status = Some(status);
                0
            }
            Syscall::GetPid => self.pid as isize,
            Syscall::Kill { pid, signal } => self.kill(pid, signal),
            Syscall::Write { fd, buf } => self.write(fd, buf),
            Syscall::DirOpen { path } => self.dir_open(path),
            Syscall::DirRead { handle, entry } => self.dir_read(handle, entry),
            Syscall::DirClose { handle } => self.dir_close(handle),
            Syscall::Poll { fds, timeout_ms } => self.poll(fds, timeout_ms),
            Syscall::SigAction { signal, act, old } => self.sigaction(signal, act, old),
        }
    }
}
