use std::borrow::Cow;

use binrw::{BinRead, BinWrite};

use crate::config::{NAME_FIELD_LEN, NAME_MAX_LEN};
use crate::{FsError, InodeId, Result};

/// 文件系统项的元信息
#[derive(Debug, Default, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct DirEntry {
    inode: u16,
    // 不足14字节时以 \0 填充；恰好14字节时没有结尾的 \0
    name: [u8; NAME_FIELD_LEN],
}

impl DirEntry {
    pub fn new(name: &str, inode: InodeId) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() > NAME_MAX_LEN {
            return Err(FsError::NameTooLong(name.to_owned()));
        }

        let mut field = [0; NAME_FIELD_LEN];
        field[..bytes.len()].copy_from_slice(bytes);

        Ok(Self {
            inode: inode.get(),
            name: field,
        })
    }

    #[inline]
    pub fn inode(&self) -> InodeId {
        InodeId::new(self.inode)
    }

    /// 名字的原始字节，截止到第一个 \0
    pub fn name_bytes(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(NAME_FIELD_LEN);
        &self.name[..len]
    }

    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    #[inline]
    pub fn is_named(&self, name: &str) -> bool {
        self.name_bytes() == name.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Record;

    #[test]
    fn name_is_nul_padded() {
        let entry = DirEntry::new("hosts", InodeId::new(7)).unwrap();
        let bytes = entry.encode().unwrap();

        assert_eq!(&bytes[..2], &7u16.to_le_bytes());
        assert_eq!(&bytes[2..7], b"hosts");
        assert!(bytes[7..].iter().all(|&b| b == 0));
    }

    #[test]
    fn full_width_name_without_terminator() {
        let mut raw = vec![3, 0];
        raw.extend_from_slice(b"fourteen_bytes");
        let entry = DirEntry::decode(&raw).unwrap();

        assert_eq!(entry.name(), "fourteen_bytes");
        assert_eq!(entry.inode(), InodeId::new(3));
    }

    #[test]
    fn thirteen_bytes_is_the_limit() {
        assert!(DirEntry::new("thirteen_byte", InodeId::ROOT).is_ok());
        assert!(matches!(
            DirEntry::new("fourteen_bytes", InodeId::ROOT),
            Err(FsError::NameTooLong(_))
        ));
    }

    #[test]
    fn exact_name_match() {
        let entry = DirEntry::new("a", InodeId::ROOT).unwrap();
        assert!(entry.is_named("a"));
        assert!(!entry.is_named("ab"));
        assert!(!entry.is_named(""));
    }
}
