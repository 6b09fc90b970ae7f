//! POSIX surface driven end to end against the mock kernel

use shim_abi::numbers::{SYS_DIR_CLOSEDIR, SYS_DIR_OPENDIR, SYS_DIR_READDIR, SYS_FILE_POLL, SYS_SIGACTION};
use shim_abi::signal::{SIGINT, SIGKILL, SIGUSR1};
use shim_abi::{DirentType, PollEvents, PollFd, SaFlags, Timespec, Timeval};
use shim_mock::{MockKernel, PollRecord};
use shim_posix::{Errno, FdSet, HasArg, LongOption, Runtime, RuntimeConfig, SigAction, SigHandler, SigSet};

fn runtime_with(kernel: MockKernel) -> Runtime<MockKernel> {
    Runtime::new(kernel)
}

fn listing_kernel() -> MockKernel {
    let mut kernel = MockKernel::new();
    kernel.add_directory(
        "/etc",
        [
            (".", 1, DirentType::Directory),
            ("..", 1, DirentType::Directory),
            ("hosts", 17, DirentType::Regular),
            ("passwd", 18, DirentType::Regular),
        ],
    );
    kernel.add_file("/etc/hosts");
    kernel
}

// ---------------------------------------------------------------------------
// Directory streams
// ---------------------------------------------------------------------------

#[test]
fn test_readdir_reports_each_entry_once() {
    let mut rt = runtime_with(listing_kernel());
    let mut dir = rt.opendir(Some("/etc")).expect("opendir");

    let mut seen = Vec::new();
    while let Some(entry) = rt.readdir(Some(&mut *dir)) {
        seen.push((entry.name_str().unwrap().to_string(), entry.ino(), entry.file_type()));
    }
    assert_eq!(
        seen,
        [
            (".".to_string(), 1, DirentType::Directory),
            ("..".to_string(), 1, DirentType::Directory),
            ("hosts".to_string(), 17, DirentType::Regular),
            ("passwd".to_string(), 18, DirentType::Regular),
        ]
    );

    // four entries plus the end marker
    assert_eq!(rt.kernel().call_count(SYS_DIR_READDIR), 5);
    assert!(rt.readdir(Some(&mut *dir)).is_none());
    assert!(rt.readdir(Some(&mut *dir)).is_none());
    assert_eq!(rt.kernel().call_count(SYS_DIR_READDIR), 5);

    assert_eq!(rt.closedir(Some(dir)), 0);
    assert_eq!(rt.kernel().open_dir_count(), 0);
}

#[test]
fn test_end_of_directory_leaves_errno() {
    let mut kernel = MockKernel::new();
    kernel.add_directory("/empty", []);
    let mut rt = runtime_with(kernel);
    rt.set_errno(Errno::EAGAIN);

    let mut dir = rt.opendir(Some("/empty")).unwrap();
    assert!(rt.readdir(Some(&mut *dir)).is_none());
    assert_eq!(rt.errno(), Errno::EAGAIN);
    assert_eq!(rt.closedir(Some(dir)), 0);
}

#[test]
fn test_opendir_failures() {
    let mut rt = runtime_with(listing_kernel());

    assert!(rt.opendir(Some("/missing")).is_none());
    assert_eq!(rt.errno(), Errno::ENOENT);

    assert!(rt.opendir(Some("/etc/hosts")).is_none());
    assert_eq!(rt.errno(), Errno::ENOTDIR);

    assert!(rt.opendir(None).is_none());
    assert_eq!(rt.errno(), Errno::EINVAL);

    assert!(rt.opendir(Some("/et\0c")).is_none());
    assert_eq!(rt.errno(), Errno::EINVAL);
    assert_eq!(rt.kernel().call_count(SYS_DIR_OPENDIR), 2);
}

#[test]
fn test_absent_stream_arguments() {
    let mut rt = runtime_with(listing_kernel());

    assert!(rt.readdir(None).is_none());
    assert_eq!(rt.errno(), Errno::EINVAL);

    rt.set_errno(Errno::NONE);
    assert_eq!(rt.closedir(None), -1);
    assert_eq!(rt.errno(), Errno::EINVAL);

    rt.set_errno(Errno::NONE);
    assert_eq!(rt.dirfd(None), -1);
    assert_eq!(rt.errno(), Errno::EINVAL);

    rt.set_errno(Errno::NONE);
    rt.rewinddir(None);
    assert_eq!(rt.errno(), Errno::EINVAL);
}

#[test]
fn test_readdir_kernel_error() {
    let mut rt = runtime_with(listing_kernel());
    let mut dir = rt.opendir(Some("/etc")).unwrap();

    rt.kernel_mut().fail_next(SYS_DIR_READDIR, Errno::EIO);
    assert!(rt.readdir(Some(&mut *dir)).is_none());
    assert_eq!(rt.errno(), Errno::EIO);

    // the stream is still usable
    assert_eq!(rt.readdir(Some(&mut *dir)).map(|e| e.ino()), Some(1));
    assert_eq!(rt.closedir(Some(dir)), 0);
}

#[test]
fn test_closedir_failure_still_releases() {
    let mut rt = runtime_with(listing_kernel());
    let dir = rt.opendir(Some("/etc")).unwrap();
    let handle = rt.dirfd(Some(&*dir));
    assert!(handle >= 0);

    rt.kernel_mut().fail_next(SYS_DIR_CLOSEDIR, Errno::EIO);
    assert_eq!(rt.closedir(Some(dir)), -1);
    assert_eq!(rt.errno(), Errno::EIO);
}

#[test]
fn test_rewinddir_resets_flag_only() {
    let mut rt = runtime_with(listing_kernel());
    let mut dir = rt.opendir(Some("/etc")).unwrap();
    while rt.readdir(Some(&mut *dir)).is_some() {}
    let reads = rt.kernel().call_count(SYS_DIR_READDIR);

    rt.rewinddir(Some(&mut *dir));
    assert!(!dir.is_exhausted());

    // the kernel cursor was not moved, so the next read sees the end again
    assert!(rt.readdir(Some(&mut *dir)).is_none());
    assert_eq!(rt.kernel().call_count(SYS_DIR_READDIR), reads + 1);
    assert_eq!(rt.closedir(Some(dir)), 0);
}

// ---------------------------------------------------------------------------
// select / pselect / poll
// ---------------------------------------------------------------------------

#[test]
fn test_select_empty_sets_waits_and_leaves_bitmaps() {
    let mut rt = runtime_with(MockKernel::new());
    let mut read = FdSet::new();
    let mut write = FdSet::new();
    let timeout = Timeval::new(1, 500_000);

    let n = rt.select(8, Some(&mut read), Some(&mut write), None, Some(&timeout));
    assert_eq!(n, 0);
    assert!(read.is_empty() && write.is_empty());
    assert_eq!(
        rt.kernel().poll_history(),
        [PollRecord {
            nfds: 0,
            timeout_ms: 1500
        }]
    );
}

#[test]
fn test_select_readable_descriptor() {
    let mut kernel = MockKernel::new();
    kernel.set_ready(3, PollEvents::POLLIN);
    let mut rt = runtime_with(kernel);

    let mut read = FdSet::new();
    let mut write = FdSet::new();
    let mut except = FdSet::new();
    read.set(3);

    let n = rt.select(4, Some(&mut read), Some(&mut write), Some(&mut except), None);
    assert_eq!(n, 1);
    assert!(read.is_set(3));
    assert_eq!(read.count(), 1);
    assert!(write.is_empty());
    assert!(except.is_empty());
    assert_eq!(rt.kernel().poll_history()[0].timeout_ms, -1);
}

#[test]
fn test_select_counts_ready_descriptors() {
    let mut kernel = MockKernel::new();
    kernel.set_ready(3, PollEvents::POLLIN | PollEvents::POLLOUT);
    kernel.open_descriptor(4);
    let mut rt = runtime_with(kernel);

    let mut read = FdSet::new();
    let mut write = FdSet::new();
    read.set(3);
    read.set(4);
    write.set(3);

    let zero = Timeval::new(0, 0);
    let n = rt.select(5, Some(&mut read), Some(&mut write), None, Some(&zero));
    assert_eq!(n, 1);
    assert!(read.is_set(3) && !read.is_set(4));
    assert!(write.is_set(3));
    assert_eq!(
        rt.kernel().poll_history(),
        [PollRecord {
            nfds: 2,
            timeout_ms: 0
        }]
    );
}

#[test]
fn test_select_error_not_writable() {
    let mut kernel = MockKernel::new();
    kernel.set_ready(5, PollEvents::POLLERR);
    let mut rt = runtime_with(kernel);

    let mut write = FdSet::new();
    write.set(5);

    let zero = Timeval::new(0, 0);
    let n = rt.select(6, None, Some(&mut write), None, Some(&zero));
    assert_eq!(n, 0);
    assert!(!write.is_set(5));
}

#[test]
fn test_select_ignores_descriptors_beyond_nfds() {
    let mut kernel = MockKernel::new();
    kernel.set_ready(1, PollEvents::POLLOUT);
    let mut rt = runtime_with(kernel);

    let mut write = FdSet::new();
    write.set(1);
    let zero = Timeval::new(0, 0);

    assert_eq!(rt.select(1, None, Some(&mut write), None, Some(&zero)), 0);
    assert!(write.is_set(1));
    assert_eq!(rt.kernel().poll_history()[0].nfds, 0);
}

#[test]
fn test_select_invalid_nfds() {
    let mut rt = runtime_with(MockKernel::new());
    let mut read = FdSet::new();
    read.set(0);

    assert_eq!(rt.select(-1, Some(&mut read), None, None, None), -1);
    assert_eq!(rt.errno(), Errno::EINVAL);
    assert_eq!(rt.select(1025, Some(&mut read), None, None, None), -1);
    assert_eq!(rt.errno(), Errno::EINVAL);
    assert!(read.is_set(0));
    assert_eq!(rt.kernel().call_count(SYS_FILE_POLL), 0);
}

#[test]
fn test_select_negative_timeout_is_zero() {
    let mut rt = runtime_with(MockKernel::new());
    let timeout = Timeval::new(-5, 0);
    assert_eq!(rt.select(0, None, None, None, Some(&timeout)), 0);
    assert_eq!(rt.kernel().poll_history()[0].timeout_ms, 0);
}

#[test]
fn test_select_poll_failure_keeps_bitmaps() {
    let mut kernel = MockKernel::new();
    kernel.set_ready(3, PollEvents::POLLIN);
    kernel.fail_next(SYS_FILE_POLL, Errno::EINTR);
    let mut rt = runtime_with(kernel);

    let mut read = FdSet::new();
    read.set(3);
    read.set(5);

    assert_eq!(rt.select(6, Some(&mut read), None, None, None), -1);
    assert_eq!(rt.errno(), Errno::EINTR);
    assert!(read.is_set(3) && read.is_set(5));
}

#[test]
fn test_select_hangup_and_invalid_descriptors() {
    let mut kernel = MockKernel::new();
    kernel.set_ready(3, PollEvents::POLLHUP);
    let mut rt = runtime_with(kernel);

    let mut read = FdSet::new();
    let mut except = FdSet::new();
    read.set(3);
    except.set(7);

    let n = rt.select(8, Some(&mut read), None, Some(&mut except), None);
    assert_eq!(n, 2);
    assert!(read.is_set(3));
    assert!(except.is_set(7));
}

#[test]
fn test_pselect_floors_nanoseconds() {
    let mut rt = runtime_with(MockKernel::new());
    let timeout = Timespec::new(0, 2_999_999);
    let mut mask = SigSet::empty();
    mask.add(SIGINT).unwrap();

    assert_eq!(rt.pselect(0, None, None, None, Some(&timeout), Some(&mask)), 0);
    assert_eq!(rt.kernel().poll_history()[0].timeout_ms, 2);
}

#[test]
fn test_poll_wrapper() {
    let mut kernel = MockKernel::new();
    kernel.set_ready(4, PollEvents::POLLIN);
    let mut rt = runtime_with(kernel);

    let mut fds = [
        PollFd::new(4, PollEvents::POLLIN),
        PollFd::new(-1, PollEvents::POLLIN),
        PollFd::new(9, PollEvents::POLLIN),
    ];
    assert_eq!(rt.poll(&mut fds, 10), 2);
    assert_eq!(fds[0].revents(), PollEvents::POLLIN);
    assert!(fds[1].revents().is_empty());
    assert_eq!(fds[2].revents(), PollEvents::POLLNVAL);

    rt.kernel_mut().fail_next(SYS_FILE_POLL, Errno::EFAULT);
    assert_eq!(rt.poll(&mut fds, 0), -1);
    assert_eq!(rt.errno(), Errno::EFAULT);
}

// ---------------------------------------------------------------------------
// Option scanner
// ---------------------------------------------------------------------------

#[test]
fn test_getopt_bundled_sequence() {
    let mut rt = runtime_with(MockKernel::new());
    let argv = ["prog", "-ab", "-c", "val", "file"];

    assert_eq!(rt.getopt(&argv, b"abc:"), Some(b'a'));
    assert_eq!(rt.getopt(&argv, b"abc:"), Some(b'b'));
    assert_eq!(rt.getopt(&argv, b"abc:"), Some(b'c'));
    assert_eq!(rt.optarg(), Some(&b"val"[..]));
    assert_eq!(rt.getopt(&argv, b"abc:"), None);
    assert_eq!(argv[rt.optind()], "file");
}

#[test]
fn test_getopt_colon_mode_is_silent() {
    let mut rt = runtime_with(MockKernel::new());
    assert_eq!(rt.getopt(&["prog", "-c"], b":c:"), Some(b':'));
    assert_eq!(rt.optopt(), b'c');
    assert!(rt.kernel().output(2).is_empty());
}

#[test]
fn test_getopt_diagnostics_reach_stderr() {
    let mut rt = runtime_with(MockKernel::new());
    assert_eq!(rt.getopt(&["ls", "-z"], b"la"), Some(b'?'));
    assert_eq!(rt.kernel().output(2), b"ls: unknown option '-z'\n");
}

#[test]
fn test_getopt_diagnostic_descriptor_configurable() {
    let config = RuntimeConfig {
        opterr: true,
        diagnostic_fd: 1,
    };
    let mut rt = Runtime::with_config(MockKernel::new(), config);
    assert_eq!(rt.getopt(&["ls", "-q"], b"l:"), Some(b'?'));
    assert_eq!(rt.kernel().output(1), b"ls: unknown option '-q'\n");
    assert!(rt.kernel().output(2).is_empty());
}

#[test]
fn test_getopt_rescan_after_reset() {
    let mut rt = runtime_with(MockKernel::new());
    let first = ["one", "-x"];
    let second = ["two", "-y", "-x"];

    assert_eq!(rt.getopt(&first, b"xy"), Some(b'x'));
    assert_eq!(rt.getopt(&first, b"xy"), None);

    rt.set_optind(0);
    assert_eq!(rt.getopt(&second, b"xy"), Some(b'y'));
    assert_eq!(rt.getopt(&second, b"xy"), Some(b'x'));
    assert_eq!(rt.getopt(&second, b"xy"), None);
}

#[test]
fn test_getopt_long_mixed_with_short() {
    let mut rt = runtime_with(MockKernel::new());
    let longopts = [
        LongOption::new("all", HasArg::No, b'a' as i32),
        LongOption::new("width", HasArg::Required, b'w' as i32),
    ];
    let argv = ["ls", "--all", "-l", "--width", "80", "dir"];

    let mut seen = Vec::new();
    while let Some(opt) = rt.getopt_long(&argv, b"alw:", &longopts, None) {
        let arg = rt.optarg().map(|a| String::from_utf8_lossy(a).into_owned());
        seen.push((opt, arg));
    }
    assert_eq!(
        seen,
        [
            (b'a' as i32, None),
            (b'l' as i32, None),
            (b'w' as i32, Some("80".to_string())),
        ]
    );
    assert_eq!(argv[rt.optind()], "dir");
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

extern "C" fn on_usr1(_sig: i32) {}

#[test]
fn test_signal_returns_previous_handler() {
    let mut rt = runtime_with(MockKernel::new());

    assert_eq!(rt.signal(SIGUSR1, SigHandler::Ignore), SigHandler::Default);
    let installed = rt.kernel().sigaction_for(SIGUSR1).unwrap();
    assert_eq!(installed.sa_handler, shim_abi::SIG_IGN);
    assert_eq!(installed.sa_mask, 0);
    assert_eq!(installed.flags(), SaFlags::SA_RESTART);

    let previous = rt.signal(SIGUSR1, SigHandler::Handler(on_usr1));
    assert_eq!(previous, SigHandler::Ignore);
    assert_eq!(rt.signal(SIGUSR1, SigHandler::Default).to_raw(), on_usr1 as usize);
}

#[test]
fn test_signal_failure_keeps_registration() {
    let mut rt = runtime_with(MockKernel::new());
    rt.signal(SIGINT, SigHandler::Ignore);

    rt.kernel_mut().fail_next(SYS_SIGACTION, Errno::EFAULT);
    assert_eq!(rt.signal(SIGINT, SigHandler::Default), SigHandler::Error);
    assert_eq!(rt.errno(), Errno::EFAULT);
    assert_eq!(rt.kernel().sigaction_for(SIGINT).unwrap().sa_handler, shim_abi::SIG_IGN);

    assert_eq!(rt.signal(SIGKILL, SigHandler::Ignore), SigHandler::Error);
    assert_eq!(rt.errno(), Errno::EINVAL);

    assert_eq!(rt.signal(0, SigHandler::Ignore), SigHandler::Error);
    assert_eq!(rt.signal(32, SigHandler::Ignore), SigHandler::Error);
    assert_eq!(rt.signal(SIGINT, SigHandler::Error), SigHandler::Error);
    assert_eq!(rt.errno(), Errno::EINVAL);
}

#[test]
fn test_sigaction_round_trip() {
    let mut rt = runtime_with(MockKernel::new());
    let mut mask = SigSet::empty();
    rt.sigemptyset(&mut mask);
    assert_eq!(rt.sigaddset(&mut mask, SIGINT), 0);

    let act = SigAction::new(SigHandler::Handler(on_usr1), mask, SaFlags::SA_NODEFER);
    assert_eq!(rt.sigaction(SIGUSR1, Some(&act), None), 0);

    let mut old = SigAction::default();
    assert_eq!(rt.sigaction(SIGUSR1, None, Some(&mut old)), 0);
    assert_eq!(old, act);
}

#[test]
fn test_sigset_wrappers() {
    let mut rt = runtime_with(MockKernel::new());
    let mut set = SigSet::empty();

    assert_eq!(rt.sigfillset(&mut set), 0);
    assert_eq!(set.bits(), u64::MAX);
    assert_eq!(rt.sigismember(&set, SIGKILL), 1);
    assert_eq!(rt.sigdelset(&mut set, SIGKILL), 0);
    assert_eq!(rt.sigismember(&set, SIGKILL), 0);

    assert_eq!(rt.sigaddset(&mut set, 64), -1);
    assert_eq!(rt.errno(), Errno::EINVAL);
    assert_eq!(rt.sigismember(&set, 0), -1);
}

#[test]
fn test_raise_targets_own_pid() {
    let mut rt = runtime_with(MockKernel::new().with_pid(77));
    assert_eq!(rt.raise(SIGUSR1), 0);
    assert_eq!(rt.kernel().delivered_signals(), [(77, SIGUSR1)]);

    assert_eq!(rt.kill(78, SIGUSR1), -1);
    assert_eq!(rt.errno(), Errno::ESRCH);
    assert_eq!(rt.getpid(), 77);
}

// ---------------------------------------------------------------------------
// Environment, output and stubs
// ---------------------------------------------------------------------------

#[test]
fn test_getenv_after_publish() {
    let mut rt = runtime_with(MockKernel::new());
    assert_eq!(rt.getenv("HOME"), None);

    rt.set_environ(["HOME=/root", "TERM=vt100"]);
    assert_eq!(rt.getenv("HOME"), Some(&b"/root"[..]));
    assert_eq!(rt.getenv("TERM"), Some(&b"vt100"[..]));
    assert_eq!(rt.environ().len(), 2);
}

#[test]
fn test_write_and_exit() {
    let mut rt = runtime_with(MockKernel::new());
    assert_eq!(rt.write(1, b"hi\n"), 3);
    assert_eq!(rt.kernel().output(1), b"hi\n");

    assert_eq!(rt.write(9, b"x"), -1);
    assert_eq!(rt.errno(), Errno::EBADF);

    rt.exit(4);
    assert_eq!(rt.kernel().exit_status(), Some(4));
}

#[test]
fn test_stub_wrappers() {
    use shim_posix::stubs::{Rlimit, Termios, RLIM_INFINITY};

    let mut rt = runtime_with(MockKernel::new());

    let mut termios = Termios {
        c_lflag: 0xff,
        ..Termios::default()
    };
    assert_eq!(rt.tcgetattr(0, Some(&mut termios)), 0);
    assert_eq!(termios, Termios::default());
    assert_eq!(rt.tcsetattr(0, 0, Some(&termios)), 0);
    assert_eq!(rt.tcgetattr(0, None), -1);
    assert_eq!(rt.errno(), Errno::EINVAL);

    let mut limit = Rlimit {
        rlim_cur: 1,
        rlim_max: 1,
    };
    assert_eq!(rt.getrlimit(7, Some(&mut limit)), 0);
    assert_eq!(limit.rlim_cur, RLIM_INFINITY);
    assert_eq!(rt.setrlimit(7, Some(&limit)), 0);
}
