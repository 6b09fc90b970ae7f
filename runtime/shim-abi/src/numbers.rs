//! Syscall numbers consumed by the shim
//!
//! Only the calls the runtime layer actually issues are listed. Values
//! must match the kernel's dispatch table.

pub const SYS_PROCESS_EXIT: usize = 11;
pub const SYS_PROCESS_GETPID: usize = 15;

pub const SYS_FILE_WRITE: usize = 53;

pub const SYS_DIR_OPENDIR: usize = 62;
pub const SYS_DIR_READDIR: usize = 63;
pub const SYS_DIR_CLOSEDIR: usize = 64;

pub const SYS_PROCESS_KILL: usize = 113;

pub const SYS_SIGACTION: usize = 120;

pub const SYS_FILE_POLL: usize = 189;
