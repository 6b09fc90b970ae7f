//! Real process entry (`_start`)
//!
//! The architecture stub hands the initial stack pointer to
//! `__shim_crt_start`, which a program defines with [`entry!`](crate::entry!).
//! That in turn calls [`start`], which never returns.

use core::ptr::addr_of;

use log::LevelFilter;
use shim_abi::{Kernel, Syscall};
use shim_platform::raw::{self, RawKernel};
use shim_posix::{KernelLogger, Runtime};

use crate::bootstrap;
use crate::hooks::{Hook, HookTable};
use crate::image::ProcessImage;

/// Status used when the initial stack cannot be parsed
pub const BAD_STACK_STATUS: i32 = 127;

/// Program entry point run by [`start`]
pub type MainFn = fn(&mut Runtime<RawKernel>, &ProcessImage<'_>) -> i32;

extern "C" {
    static __init_array_start: [Hook; 0];
    static __init_array_end: [Hook; 0];
    static __fini_array_start: [Hook; 0];
    static __fini_array_end: [Hook; 0];
}

fn stderr_sink(line: &[u8]) {
    RawKernel.syscall(Syscall::Write { fd: 2, buf: line });
}

static LOGGER: KernelLogger = KernelLogger::new(LevelFilter::Warn, stderr_sink);

/// Bootstrap the process and exit with `main`'s status
///
/// # Safety
///
/// `sp` must be the initial stack pointer the kernel handed to `_start`,
/// and this must be the only call to `start` in the process.
pub unsafe fn start(sp: *const usize, main: MainFn) -> ! {
    // an earlier logger stays in place
    LOGGER.install().ok();

    let image = match ProcessImage::from_raw(sp) {
        Ok(image) => image,
        Err(err) => {
            log::error!("bootstrap: {}", err);
            raw::exit(BAD_STACK_STATUS);
        }
    };

    let init = HookTable::from_bounds(
        addr_of!(__init_array_start).cast(),
        addr_of!(__init_array_end).cast(),
    );
    let fini = HookTable::from_bounds(
        addr_of!(__fini_array_start).cast(),
        addr_of!(__fini_array_end).cast(),
    );

    let mut rt = Runtime::new(RawKernel);
    let status = bootstrap::run(&mut rt, &image, &init, &fini, main);
    raw::exit(status)
}

/// Define the program's entry point
///
/// ```rust,ignore
/// fn main(rt: &mut Runtime<RawKernel>, image: &ProcessImage<'_>) -> i32 { 0 }
/// shim_crt::entry!(main);
/// ```
#[macro_export]
macro_rules! entry {
    ($main:path) => {
        #[no_mangle]
        pub unsafe extern "C" fn __shim_crt_start(sp: *const usize) -> ! {
            $crate::entry::start(sp, $main)
        }
    };
}

#[cfg(target_arch = "x86_64")]
core::arch::global_asm!(
    ".globl _start",
    "_start:",
    "xor rbp, rbp",
    "mov rdi, rsp",
    "and rsp, -16",
    "call __shim_crt_start",
    "ud2",
);

#[cfg(target_arch = "aarch64")]
core::arch::global_asm!(
    ".globl _start",
    "_start:",
    "mov x29, xzr",
    "mov x30, xzr",
    "mov x0, sp",
    "and sp, x0, #-16",
    "bl __shim_crt_start",
    "brk #1",
);

#[cfg(target_arch = "riscv64")]
core::arch::global_asm!(
    ".globl _start",
    "_start:",
    "mv a0, sp",
    "andi sp, sp, -16",
    "call __shim_crt_start",
    "unimp",
);
