//! Mock kernel fixture files
//!
//! ```toml
//! pid = 42
//! files = ["/etc/motd"]
//!
//! [[directories]]
//! path = "/srv"
//! entries = [
//!     { name = "data", ino = 12, kind = "directory" },
//!     { name = "notes.txt", ino = 13 },
//! ]
//!
//! [[ready]]
//! fd = 0
//! events = ["in"]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use shim_abi::{DirentType, PollEvents};
use shim_crt::PlatformKernel;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixture {
    pub pid: Option<i32>,
    pub files: Vec<String>,
    pub directories: Vec<DirectoryFixture>,
    pub ready: Vec<ReadyFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryFixture {
    pub path: String,
    #[serde(default)]
    pub entries: Vec<EntryFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryFixture {
    pub name: String,
    pub ino: u64,
    #[serde(default)]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Regular,
    Directory,
    Symlink,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
    Unknown,
}

impl From<EntryKind> for DirentType {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Regular => DirentType::Regular,
            EntryKind::Directory => DirentType::Directory,
            EntryKind::Symlink => DirentType::Symlink,
            EntryKind::CharDevice => DirentType::CharDevice,
            EntryKind::BlockDevice => DirentType::BlockDevice,
            EntryKind::Fifo => DirentType::Fifo,
            EntryKind::Socket => DirentType::Socket,
            EntryKind::Unknown => DirentType::Unknown,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadyFixture {
    pub fd: i32,
    pub events: Vec<ReadyEvent>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyEvent {
    In,
    Pri,
    Out,
    Err,
    Hup,
}

impl From<ReadyEvent> for PollEvents {
    fn from(event: ReadyEvent) -> Self {
        match event {
            ReadyEvent::In => PollEvents::POLLIN,
            ReadyEvent::Pri => PollEvents::POLLPRI,
            ReadyEvent::Out => PollEvents::POLLOUT,
            ReadyEvent::Err => PollEvents::POLLERR,
            ReadyEvent::Hup => PollEvents::POLLHUP,
        }
    }
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid fixture {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML")
    }

    /// Mock kernel seeded with this fixture
    pub fn build_kernel(&self) -> PlatformKernel {
        let mut kernel = PlatformKernel::new();
        if let Some(pid) = self.pid {
            kernel = kernel.with_pid(pid);
        }

        for path in &self.files {
            kernel.add_file(path);
        }
        for dir in &self.directories {
            log::debug!("fixture: {} ({} entries)", dir.path, dir.entries.len());
            kernel.add_directory(
                &dir.path,
                dir.entries
                    .iter()
                    .map(|e| (e.name.as_str(), e.ino, DirentType::from(e.kind))),
            );
        }
        for ready in &self.ready {
            let events = ready
                .events
                .iter()
                .fold(PollEvents::empty(), |acc, &e| acc | PollEvents::from(e));
            kernel.set_ready(ready.fd, events);
        }
        kernel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shim_abi::Kernel;

    const SAMPLE: &str = r#"
pid = 42
files = ["/etc/motd"]

[[directories]]
path = "/srv"
entries = [
    { name = "data", ino = 12, kind = "directory" },
    { name = "notes.txt", ino = 13 },
]

[[ready]]
fd = 0
events = ["in", "hup"]
"#;

    #[test]
    fn test_parse_sample() {
        let fixture = Fixture::parse(SAMPLE).unwrap();
        assert_eq!(fixture.pid, Some(42));
        assert_eq!(fixture.directories.len(), 1);
        assert_eq!(fixture.directories[0].entries[1].name, "notes.txt");
        assert!(matches!(fixture.directories[0].entries[1].kind, EntryKind::Regular));
        assert_eq!(fixture.ready[0].events.len(), 2);
    }

    #[test]
    fn test_empty_fixture() {
        let fixture = Fixture::parse("").unwrap();
        assert!(fixture.pid.is_none());
        assert!(fixture.directories.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Fixture::parse("pids = 3").is_err());
    }

    #[test]
    fn test_demo_fixture_parses() {
        let fixture = Fixture::parse(include_str!("../fixtures/demo.toml")).unwrap();
        assert_eq!(fixture.pid, Some(42));
        assert_eq!(fixture.directories.len(), 2);
        assert!(matches!(fixture.directories[1].entries[4].kind, EntryKind::Symlink));
    }

    #[test]
    fn test_build_kernel() {
        let mut kernel = Fixture::parse(SAMPLE).unwrap().build_kernel();
        assert_eq!(kernel.pid(), 42);
        assert_eq!(kernel.syscall(shim_abi::Syscall::GetPid), 42);
    }
}
