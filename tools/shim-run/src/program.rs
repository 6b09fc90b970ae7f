//! Built-in directory listing program
//!
//! ```text
//! ls [-a] [-l] [-p] [--all] [--long] [--poll-stdin[=MS]] [DIR...]
//! ```

use std::ffi::CStr;

use shim_abi::signal::SIGPIPE;
use shim_abi::{DirentType, Timeval};
use shim_crt::{PlatformKernel, ProcessImage};
use shim_posix::{FdSet, HasArg, LongOption, Runtime, SigHandler};

const LONG_OPTIONS: [LongOption<'static>; 3] = [
    LongOption::new("all", HasArg::No, b'a' as i32),
    LongOption::new("long", HasArg::No, b'l' as i32),
    LongOption::new("poll-stdin", HasArg::Optional, b'p' as i32),
];

/// Exit status for bad usage
pub const USAGE_STATUS: i32 = 2;

#[derive(Debug, Default)]
struct Options {
    all: bool,
    long: bool,
    poll_ms: Option<i64>,
}

fn type_char(kind: DirentType) -> char {
    match kind {
        DirentType::Directory => 'd',
        DirentType::Symlink => 'l',
        DirentType::CharDevice => 'c',
        DirentType::BlockDevice => 'b',
        DirentType::Fifo => 'p',
        DirentType::Socket => 's',
        DirentType::Regular => '-',
        DirentType::Unknown => '?',
    }
}

fn parse_options(rt: &mut Runtime<PlatformKernel>, argv: &[&[u8]]) -> Option<Options> {
    let mut options = Options::default();
    while let Some(opt) = rt.getopt_long(argv, b"alp", &LONG_OPTIONS, None) {
        match u8::try_from(opt) {
            Ok(b'a') => options.all = true,
            Ok(b'l') => options.long = true,
            Ok(b'p') => {
                let ms = rt
                    .optarg()
                    .and_then(|arg| std::str::from_utf8(arg).ok())
                    .and_then(|arg| arg.parse().ok())
                    .unwrap_or(0);
                options.poll_ms = Some(ms);
            }
            _ => return None,
        }
    }
    Some(options)
}

fn report_stdin(rt: &mut Runtime<PlatformKernel>, ms: i64) {
    let mut read = FdSet::new();
    read.set(0);
    let timeout = Timeval::new(ms / 1000, (ms % 1000) * 1000);

    let line = match rt.select(1, Some(&mut read), None, None, Some(&timeout)) {
        n if n < 0 => format!("stdin: select failed ({})\n", rt.errno()),
        _ if read.is_set(0) => "stdin: ready\n".to_string(),
        _ => "stdin: idle\n".to_string(),
    };
    rt.write(1, line.as_bytes());
}

fn list(rt: &mut Runtime<PlatformKernel>, prog: &str, path: &str, options: &Options) -> bool {
    let Some(mut dir) = rt.opendir(Some(path)) else {
        let line = format!("{}: cannot open '{}': {}\n", prog, path, rt.errno());
        rt.write(2, line.as_bytes());
        return false;
    };

    let mut out = Vec::new();
    while let Some(entry) = rt.readdir(Some(&mut *dir)) {
        let name = entry.name();
        if !options.all && name.first() == Some(&b'.') {
            continue;
        }
        if options.long {
            out.extend_from_slice(
                format!("{} {:>8} ", type_char(entry.file_type()), entry.ino()).as_bytes(),
            );
        }
        out.extend_from_slice(name);
        out.push(b'\n');
    }

    let closed = rt.closedir(Some(dir)) == 0;
    rt.write(1, &out);
    closed
}

/// Entry point handed to the bootstrap
pub fn ls(rt: &mut Runtime<PlatformKernel>, image: &ProcessImage<'_>) -> i32 {
    let argv: Vec<&[u8]> = image.args().map(CStr::to_bytes).collect();
    let prog = argv
        .first()
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .unwrap_or_else(|| "ls".to_string());

    if rt.signal(SIGPIPE, SigHandler::Ignore) == SigHandler::Error {
        log::warn!("{}: cannot ignore SIGPIPE: {}", prog, rt.errno());
    }

    let Some(options) = parse_options(rt, &argv) else {
        return USAGE_STATUS;
    };
    if let Some(ms) = options.poll_ms {
        report_stdin(rt, ms);
    }

    let operands: Vec<String> = argv[rt.optind().min(argv.len())..]
        .iter()
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .collect();

    let mut ok = true;
    if operands.is_empty() {
        ok &= list(rt, &prog, ".", &options);
    }
    for (i, path) in operands.iter().enumerate() {
        if operands.len() > 1 {
            let header = format!("{}{}:\n", if i > 0 { "\n" } else { "" }, path);
            rt.write(1, header.as_bytes());
        }
        ok &= list(rt, &prog, path, &options);
    }

    if ok {
        0
    } else {
        1
    }
}
