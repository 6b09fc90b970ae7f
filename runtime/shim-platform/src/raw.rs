//! Raw syscall backend
//!
//! Architecture calling conventions:
//! - **x86_64**: `syscall`, nr in `rax`, args in `rdi/rsi/rdx`
//! - **aarch64**: `svc #0`, nr in `x8`, args in `x0-x2`
//! - **riscv64**: `ecall`, nr in `a7`, args in `a0-a2`

use core::ptr;

use shim_abi::{Kernel, Syscall};

/// Kernel reached through the trap instruction
#[derive(Debug, Default, Clone, Copy)]
pub struct RawKernel;

impl Kernel for RawKernel {
    fn syscall(&mut self, call: Syscall<'_>) -> isize {
        let nr = call.number();
        // SAFETY: every pointer handed to the kernel comes from a live Rust
        // reference whose referent outlives the call.
        unsafe {
            match call {
                Syscall::Exit { status } => syscall1(nr, status as usize),
                Syscall::GetPid => syscall0(nr),
                Syscall::Kill { pid, signal } => syscall2(nr, pid as usize, signal as usize),
                Syscall::Write { fd, buf } => {
                    syscall3(nr, fd as usize, buf.as_ptr() as usize, buf.len())
                }
                Syscall::DirOpen { path } => syscall1(nr, path.as_ptr() as usize),
                Syscall::DirRead { handle, entry } => {
                    syscall2(nr, handle, entry as *mut _ as usize)
                }
                Syscall::DirClose { handle } => syscall1(nr, handle),
                Syscall::Poll { fds, timeout_ms } => syscall3(
                    nr,
                    fds.as_mut_ptr() as usize,
                    fds.len(),
                    timeout_ms as isize as usize,
                ),
                Syscall::SigAction { signal, act, old } => syscall3(
                    nr,
                    signal as usize,
                    act.map_or(ptr::null(), |a| a as *const _) as usize,
                    old.map_or(ptr::null_mut(), |o| o as *mut _) as usize,
                ),
            }
        }
    }
}

/// Terminate the process without returning
pub fn exit(status: i32) -> ! {
    RawKernel.syscall(Syscall::Exit { status });
    loop {
        core::hint::spin_loop();
    }
}

#[inline(always)]
unsafe fn syscall0(nr: usize) -> isize {
    syscall3(nr, 0, 0, 0)
}

#[inline(always)]
unsafe fn syscall1(nr: usize, a1: usize) -> isize {
    syscall3(nr, a1, 0, 0)
}

#[inline(always)]
unsafe fn syscall2(nr: usize, a1: usize, a2: usize) -> isize {
    syscall3(nr, a1, a2, 0)
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn syscall3(nr: usize, a1: usize, a2: usize, a3: usize) -> isize {
    let ret: isize;
    core::arch::asm!(
        "syscall",
        inlateout("rax") nr as isize => ret,
        in("rdi") a1,
        in("rsi") a2,
        in("rdx") a3,
        lateout("rcx") _,
        lateout("r11") _,
        options(nostack),
    );
    ret
}

#[cfg(target_arch = "aarch64")]
#[inline(always)]
unsafe fn syscall3(nr: usize, a1: usize, a2: usize, a3: usize) -> isize {
    let ret: isize;
    core::arch::asm!(
        "svc #0",
        inlateout("x0") a1 as isize => ret,
        in("x1") a2,
        in("x2") a3,
        in("x8") nr,
        options(nostack),
    );
    ret
}

#[cfg(target_arch = "riscv64")]
#[inline(always)]
unsafe fn syscall3(nr: usize, a1: usize, a2: usize, a3: usize) -> isize {
    let ret: isize;
    core::arch::asm!(
        "ecall",
        inlateout("a0") a1 as isize => ret,
        in("a1") a2,
        in("a2") a3,
        in("a7") nr,
        options(nostack),
    );
    ret
}
