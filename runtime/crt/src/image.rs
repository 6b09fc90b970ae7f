//! Initial process stack
//!
//! Layout, one machine word per slot:
//!
//! ```text
//! sp[0]              argc
//! sp[1 ..= argc]     argument string pointers
//! sp[argc + 1]       0
//! sp[argc + 2 ..]    environment string pointers
//! ...                0
//! ```
//!
//! Parsing borrows the words in place and never allocates.

use core::ffi::{c_char, CStr};

use crate::{Result, StackError};

/// Arguments and environment found on the initial stack
#[derive(Debug, Clone, Copy)]
pub struct ProcessImage<'a> {
    words: &'a [usize],
    argc: usize,
}

impl<'a> ProcessImage<'a> {
    /// Parse a span that holds the whole layout, both terminators included
    ///
    /// Words past the environment terminator are ignored.
    ///
    /// # Safety
    ///
    /// Every non-zero word in the argument and environment ranges must
    /// point to a NUL-terminated string that stays valid and unmodified
    /// for `'a`.
    pub unsafe fn from_words(words: &'a [usize]) -> Result<Self> {
        let (&argc, rest) = words.split_first().ok_or(StackError::Empty)?;

        if rest.len() <= argc {
            return Err(StackError::TruncatedArgv {
                argc,
                words: words.len(),
            });
        }
        if let Some(index) = rest[..argc].iter().position(|&word| word == 0) {
            return Err(StackError::NullArgument(index));
        }
        if rest[argc] != 0 {
            return Err(StackError::MissingArgvTerminator);
        }

        let env = &rest[argc + 1..];
        let env_len = env
            .iter()
            .position(|&word| word == 0)
            .ok_or(StackError::MissingEnvTerminator)?;

        // argc word + argv + NULL + envp + NULL
        let total = 1 + argc + 1 + env_len + 1;
        Ok(Self {
            words: &words[..total],
            argc,
        })
    }

    /// Parse the stack the kernel built at `sp`
    ///
    /// # Safety
    ///
    /// `sp` must point to a well-formed initial stack whose strings stay
    /// valid for `'a`.
    pub unsafe fn from_raw(sp: *const usize) -> Result<Self> {
        if sp.is_null() {
            return Err(StackError::NullStack);
        }

        let argc = *sp;
        let mut len = argc + 2;
        while *sp.add(len) != 0 {
            len += 1;
        }
        let words = core::slice::from_raw_parts(sp, len + 1);
        Self::from_words(words)
    }

    pub fn argc(&self) -> usize {
        self.argc
    }

    fn argv_words(&self) -> &'a [usize] {
        &self.words[1..1 + self.argc]
    }

    fn envp_words(&self) -> &'a [usize] {
        let start = self.argc + 2;
        &self.words[start..self.words.len() - 1]
    }

    /// Argument strings in order
    pub fn args(&self) -> impl ExactSizeIterator<Item = &'a CStr> + 'a {
        self.argv_words().iter().copied().map(to_cstr)
    }

    /// Environment strings in order
    pub fn env(&self) -> impl ExactSizeIterator<Item = &'a CStr> + 'a {
        self.envp_words().iter().copied().map(to_cstr)
    }

    pub fn arg(&self, index: usize) -> Option<&'a CStr> {
        self.argv_words().get(index).map(|&word| to_cstr(word))
    }

    /// NULL-terminated `argv` for C entry points
    pub fn argv_ptr(&self) -> *const *const c_char {
        self.argv_words().as_ptr().cast()
    }

    /// NULL-terminated `envp` for C entry points
    pub fn envp_ptr(&self) -> *const *const c_char {
        self.words[self.argc + 2..].as_ptr().cast()
    }
}

fn to_cstr<'a>(word: usize) -> &'a CStr {
    // SAFETY: the constructors only accept spans whose non-zero string
    // words point to NUL-terminated data valid for 'a; zero words are
    // excluded from both ranges.
    unsafe { CStr::from_ptr(word as *const c_char) }
}
