//! Directory entry record filled by the read-one directory syscall

use static_assertions::const_assert_eq;

/// Longest entry name, excluding the NUL terminator
pub const NAME_MAX: usize = 255;

/// File type tag stored in [`RawDirent::d_type`]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirentType {
    Unknown = 0,
    Fifo = 1,
    CharDevice = 2,
    Directory = 4,
    BlockDevice = 6,
    Regular = 8,
    Symlink = 10,
    Socket = 12,
}

impl DirentType {
    /// Decode a kernel tag; unrecognized tags read as `Unknown`
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => DirentType::Fifo,
            2 => DirentType::CharDevice,
            4 => DirentType::Directory,
            6 => DirentType::BlockDevice,
            8 => DirentType::Regular,
            10 => DirentType::Symlink,
            12 => DirentType::Socket,
            _ => DirentType::Unknown,
        }
    }
}

/// Kernel directory entry
///
/// An entry whose name starts with NUL signals "no more entries".
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawDirent {
    pub d_ino: u64,
    pub d_type: u8,
    pub d_name: [u8; NAME_MAX + 1],
}

const_assert_eq!(core::mem::size_of::<RawDirent>(), 272);

impl Default for RawDirent {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl core::fmt::Debug for RawDirent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawDirent")
            .field("d_ino", &self.d_ino)
            .field("d_type", &self.file_type())
            .field("d_name", &core::str::from_utf8(self.name()).unwrap_or("<non-utf8>"))
            .finish()
    }
}

impl RawDirent {
    pub const fn zeroed() -> Self {
        Self {
            d_ino: 0,
            d_type: 0,
            d_name: [0; NAME_MAX + 1],
        }
    }

    /// Build an entry, truncating `name` to [`NAME_MAX`] bytes
    pub fn new(ino: u64, kind: DirentType, name: &[u8]) -> Self {
        let mut entry = Self::zeroed();
        entry.d_ino = ino;
        entry.d_type = kind as u8;
        let len = name.len().min(NAME_MAX);
        entry.d_name[..len].copy_from_slice(&name[..len]);
        entry
    }

    /// Name bytes up to (not including) the first NUL
    pub fn name(&self) -> &[u8] {
        let len = self
            .d_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.d_name.len());
        &self.d_name[..len]
    }

    /// Name as UTF-8, if it is valid
    pub fn name_str(&self) -> Option<&str> {
        core::str::from_utf8(self.name()).ok()
    }

    pub fn ino(&self) -> u64 {
        self.d_ino
    }

    pub fn file_type(&self) -> DirentType {
        DirentType::from_raw(self.d_type)
    }

    /// True for the kernel's end-of-directory record
    pub fn is_end(&self) -> bool {
        self.d_name[0] == 0
    }

    pub fn clear(&mut self) {
        *self = Self::zeroed();
    }
}
