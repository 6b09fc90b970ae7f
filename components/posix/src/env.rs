//! Environment table published by the bootstrap

use alloc::vec::Vec;

use shim_abi::Kernel;

use crate::runtime::Runtime;

/// `NAME=value` strings, in the order they appeared on the initial stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environ {
    vars: Vec<Vec<u8>>,
}

impl Environ {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first `name=` entry
    pub fn get(&self, name: &[u8]) -> Option<&[u8]> {
        if name.is_empty() || name.contains(&b'=') {
            return None;
        }
        self.vars.iter().find_map(|var| {
            var.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix(b"="))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.vars.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Kernel> Runtime<K> {
    /// Replace the environment table (bootstrap only)
    pub fn set_environ<I, S>(&mut self, vars: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.environ.vars = vars.into_iter().map(|v| v.as_ref().to_vec()).collect();
        log::debug!("environment: {} entries", self.environ.len());
    }

    pub fn environ(&self) -> &Environ {
        &self.environ
    }

    /// `getenv(3)`
    pub fn getenv(&self, name: &str) -> Option<&[u8]> {
        self.environ.get(name.as_bytes())
    }
}
