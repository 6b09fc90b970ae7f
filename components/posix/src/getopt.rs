//! Command-line option scanner (`getopt`, `getopt_long`)
//!
//! The scanner is a state machine over `argv` whose cursor persists in the
//! [`Runtime`] between calls: `optind` is the next element to examine and
//! an internal position tracks progress through a bundled cluster such as
//! `-abc`. Assigning `optind = 0` (or calling [`Runtime::reset_getopt`])
//! restarts the scan on the next call.

use alloc::vec::Vec;
use core::cell::Cell;

use shim_abi::{Kernel, Syscall};

use crate::runtime::Runtime;

/// Scanner cursor and outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GetoptState {
    optind: usize,
    /// Position inside the current cluster; 0 = not inside one
    optpos: usize,
    optarg: Option<Vec<u8>>,
    optopt: u8,
    opterr: bool,
}

impl GetoptState {
    pub(crate) fn new(opterr: bool) -> Self {
        Self {
            optind: 1,
            optpos: 0,
            optarg: None,
            optopt: 0,
            opterr,
        }
    }

    fn begin_call(&mut self) {
        self.optarg = None;
        if self.optind == 0 {
            self.optind = 1;
            self.optpos = 0;
        }
    }
}

/// Whether a long option takes an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasArg {
    /// `--name` only; `--name=value` is rejected
    No,
    /// `--name=value` or `--name value`
    Required,
    /// `--name=value` only
    Optional,
}

/// One entry of a `getopt_long` option table
#[derive(Debug, Clone, Copy)]
pub struct LongOption<'a> {
    pub name: &'a str,
    pub has_arg: HasArg,
    /// When present, receives `val` and the scanner returns 0
    pub flag: Option<&'a Cell<i32>>,
    pub val: i32,
}

impl<'a> LongOption<'a> {
    pub const fn new(name: &'a str, has_arg: HasArg, val: i32) -> Self {
        Self {
            name,
            has_arg,
            flag: None,
            val,
        }
    }

    pub const fn with_flag(name: &'a str, has_arg: HasArg, flag: &'a Cell<i32>, val: i32) -> Self {
        Self {
            name,
            has_arg,
            flag: Some(flag),
            val,
        }
    }
}

/// Returned for an unknown option or a missing argument
pub const UNKNOWN: u8 = b'?';
/// Returned for a missing argument in colon mode
pub const MISSING: u8 = b':';

impl<K: Kernel> Runtime<K> {
    /// Index of the next argv element to process
    pub fn optind(&self) -> usize {
        self.getopt.optind
    }

    /// Reposition the scanner; 0 requests a full reset on the next call
    pub fn set_optind(&mut self, optind: usize) {
        self.getopt.optind = optind;
    }

    /// Argument of the last option that took one
    pub fn optarg(&self) -> Option<&[u8]> {
        self.getopt.optarg.as_deref()
    }

    /// Option character that caused the last `'?'` or `':'`
    pub fn optopt(&self) -> u8 {
        self.getopt.optopt
    }

    pub fn opterr(&self) -> bool {
        self.getopt.opterr
    }

    pub fn set_opterr(&mut self, opterr: bool) {
        self.getopt.opterr = opterr;
    }

    /// Restart scanning at argv[1]
    pub fn reset_getopt(&mut self) {
        self.getopt.optind = 1;
        self.getopt.optpos = 0;
        self.getopt.optarg = None;
        self.getopt.optopt = 0;
    }

    /// `getopt(3)`: next option character, `'?'`, `':'`, or `None` when done
    pub fn getopt<S: AsRef<[u8]>>(&mut self, argv: &[S], optstring: &[u8]) -> Option<u8> {
        self.getopt.begin_call();
        self.scan_short(argv, optstring)
    }

    fn scan_short<S: AsRef<[u8]>>(&mut self, argv: &[S], optstring: &[u8]) -> Option<u8> {
        let state = &mut self.getopt;
        let arg = argv.get(state.optind)?.as_ref();

        if arg.len() < 2 || arg[0] != b'-' {
            return None;
        }
        if arg == b"--" {
            state.optind += 1;
            return None;
        }

        if state.optpos == 0 {
            state.optpos = 1;
        }
        let Some(&c) = arg.get(state.optpos) else {
            // argv changed under a live cursor: move on to the next element
            state.optind += 1;
            state.optpos = 0;
            return self.scan_short(argv, optstring);
        };
        state.optpos += 1;
        let at_end = state.optpos >= arg.len();

        let colon_mode = optstring.first() == Some(&b':');
        let specs = if colon_mode { &optstring[1..] } else { optstring };

        let found = specs
            .iter()
            .position(|&s| s == c && c != b':')
            .map(|i| specs.get(i + 1) == Some(&b':'));

        let Some(takes_arg) = found else {
            state.optopt = c;
            if at_end {
                state.optind += 1;
                state.optpos = 0;
            }
            if state.opterr && !colon_mode {
                self.diagnose(argv, &[b": unknown option '-", &[c], b"'\n"]);
            }
            return Some(UNKNOWN);
        };

        if !takes_arg {
            if at_end {
                state.optind += 1;
                state.optpos = 0;
            }
            return Some(c);
        }

        if !at_end {
            state.optarg = Some(arg[state.optpos..].to_vec());
        } else {
            state.optind += 1;
            match argv.get(state.optind) {
                Some(next) => state.optarg = Some(next.as_ref().to_vec()),
                None => {
                    state.optopt = c;
                    state.optpos = 0;
                    if colon_mode {
                        return Some(MISSING);
                    }
                    if state.opterr {
                        self.diagnose(argv, &[b": option '-", &[c], b"' requires an argument\n"]);
                    }
                    return Some(UNKNOWN);
                }
            }
        }
        state.optind += 1;
        state.optpos = 0;
        Some(c)
    }

    /// `getopt_long(3)`
    ///
    /// Returns the matched option's `val` (or 0 when it has a flag cell),
    /// `'?'` for errors, a short option character, or `None` when done.
    pub fn getopt_long<S: AsRef<[u8]>>(
        &mut self,
        argv: &[S],
        optstring: &[u8],
        longopts: &[LongOption<'_>],
        longindex: Option<&mut usize>,
    ) -> Option<i32> {
        self.getopt.begin_call();

        let arg = argv.get(self.getopt.optind)?.as_ref();
        if arg.len() < 2 || arg[0] != b'-' {
            return None;
        }
        if arg == b"--" {
            self.getopt.optind += 1;
            return None;
        }
        if self.getopt.optpos != 0 || arg[1] != b'-' {
            return self.scan_short(argv, optstring).map(i32::from);
        }

        let body = &arg[2..];
        let (name, value) = match body.iter().position(|&b| b == b'=') {
            Some(eq) => (&body[..eq], Some(&body[eq + 1..])),
            None => (body, None),
        };

        let Some(index) = longopts.iter().position(|opt| opt.name.as_bytes() == name) else {
            if self.getopt.opterr {
                self.diagnose(argv, &[b": unrecognized option '--", name, b"'\n"]);
            }
            self.getopt.optind += 1;
            return Some(i32::from(UNKNOWN));
        };
        if let Some(longindex) = longindex {
            *longindex = index;
        }
        let opt = &longopts[index];

        match opt.has_arg {
            HasArg::No => {
                if value.is_some() {
                    if self.getopt.opterr {
                        self.diagnose(
                            argv,
                            &[b": option '--", opt.name.as_bytes(), b"' doesn't allow an argument\n"],
                        );
                    }
                    self.getopt.optind += 1;
                    return Some(i32::from(UNKNOWN));
                }
            }
            HasArg::Required => match value {
                Some(value) => self.getopt.optarg = Some(value.to_vec()),
                None => {
                    self.getopt.optind += 1;
                    match argv.get(self.getopt.optind) {
                        Some(next) => self.getopt.optarg = Some(next.as_ref().to_vec()),
                        None => {
                            if self.getopt.opterr {
                                self.diagnose(
                                    argv,
                                    &[b": option '--", opt.name.as_bytes(), b"' requires an argument\n"],
                                );
                            }
                            return Some(i32::from(UNKNOWN));
                        }
                    }
                }
            },
            HasArg::Optional => self.getopt.optarg = value.map(<[u8]>::to_vec),
        }

        self.getopt.optind += 1;
        match opt.flag {
            Some(flag) => {
                flag.set(opt.val);
                Some(0)
            }
            None => Some(opt.val),
        }
    }

    /// Write `"<prog>" + parts` to the diagnostic descriptor
    fn diagnose<S: AsRef<[u8]>>(&mut self, argv: &[S], parts: &[&[u8]]) {
        let prog = argv.first().map_or(&b""[..], |p| p.as_ref());
        let mut line = Vec::from(prog);
        for part in parts {
            line.extend_from_slice(part);
        }

        log::debug!("getopt: {}", core::str::from_utf8(&line).unwrap_or("<non-utf8>").trim_end());
        let fd = self.config.diagnostic_fd;
        if let Err(err) = self.call(Syscall::Write { fd, buf: &line }) {
            log::debug!("getopt: diagnostic write to fd {} failed: {}", fd, err);
        }
    }
}
