//! # 索引节点表
//!
//! 从1号块开始的定长 inode 数组，每块16个。没有缓存。

use crate::block_store::BlockStore;
use crate::config::{BLOCK_SIZE, INODE_SIZE, INODES_PER_BLOCK};
use crate::layout::DiskInode;
use crate::{BlockId, FsError, InodeId, Result};

#[derive(Debug, Clone, Copy)]
pub struct InodeTable {
    inode_blocks: usize,
}

impl InodeTable {
    pub fn new(inode_blocks: usize) -> Self {
        Self { inode_blocks }
    }

    /// 能容纳的 inode 个数
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inode_blocks * INODES_PER_BLOCK
    }

    /// inode 所在的块及块内偏移
    pub fn disk_inode_pos(&self, inode: InodeId) -> Result<(BlockId, usize)> {
        let index = inode.index();
        if index >= self.capacity() {
            return Err(FsError::OutOfRange {
                kind: "inode",
                index,
            });
        }

        let offset = index * INODE_SIZE;
        let block = BlockId::try_from(1 + offset / BLOCK_SIZE)?;
        Ok((block, offset % BLOCK_SIZE))
    }

    pub fn get(&self, store: &BlockStore, inode: InodeId) -> Result<DiskInode> {
        let (block, offset) = self.disk_inode_pos(inode)?;
        store.read_record(block, offset)
    }

    pub fn put(&self, store: &BlockStore, inode: InodeId, disk_inode: &DiskInode) -> Result<()> {
        let (block, offset) = self.disk_inode_pos(inode)?;
        log::trace!("put inode {inode} at block {block} +{offset}");
        store.write_record(block, offset, disk_inode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use crate::FileKind;

    #[test]
    fn position_skips_the_superblock() {
        let table = InodeTable::new(4);
        assert_eq!(table.disk_inode_pos(InodeId::NONE).unwrap(), (BlockId::new(1), 0));
        assert_eq!(table.disk_inode_pos(InodeId::ROOT).unwrap(), (BlockId::new(1), 64));
        assert_eq!(table.disk_inode_pos(InodeId::new(15)).unwrap(), (BlockId::new(1), 960));
        assert_eq!(table.disk_inode_pos(InodeId::new(16)).unwrap(), (BlockId::new(2), 0));
        assert_eq!(table.disk_inode_pos(InodeId::new(63)).unwrap(), (BlockId::new(4), 960));
        assert!(matches!(
            table.disk_inode_pos(InodeId::new(64)),
            Err(FsError::OutOfRange { kind: "inode", index: 64 })
        ));
    }

    #[test]
    fn neighbours_are_untouched() {
        let store = testing::store(8);
        let table = InodeTable::new(2);
        let mut dir = DiskInode::new(FileKind::Directory, 42);
        dir.size = 32;

        table.put(&store, InodeId::new(17), &dir).unwrap();

        assert_eq!(table.get(&store, InodeId::new(17)).unwrap(), dir);
        assert!(!table.get(&store, InodeId::new(16)).unwrap().is_allocated());
        assert!(!table.get(&store, InodeId::new(18)).unwrap().is_allocated());
    }
}
