use crate::block_store::BlockStore;
use crate::{FsError, InodeId, InodeTable, Result, SuperBlock};

impl SuperBlock {
    /// 分配一个 inode 号；缓存空时先扫描索引节点区域
    pub fn acquire_inode(&mut self, store: &BlockStore, table: &InodeTable) -> Result<InodeId> {
        if self.free_inodes.is_empty() {
            self.rescan_inodes(store, table)?;
        }

        let inode = self.free_inodes.pop().ok_or(FsError::OutOfSpace("inodes"))?;
        self.modified = true;
        log::debug!("acquire inode {inode}");

        Ok(inode)
    }

    /// 归还一个 inode 号，缓存满时丢弃，留待扫描找回
    pub fn release_inode(&mut self, inode: InodeId) {
        if self.free_inodes.is_full() {
            log::warn!("free inode cache full, inode {inode} dropped until next rescan");
            return;
        }

        self.free_inodes.push(inode);
        self.modified = true;
        log::trace!("release inode {inode}");
    }
}

impl SuperBlock {
    fn rescan_inodes(&mut self, store: &BlockStore, table: &InodeTable) -> Result<()> {
        for index in InodeId::FIRST_FREE.index()..table.capacity() {
            if self.free_inodes.is_full() {
                break;
            }
            let inode = InodeId::try_from(index)?;
            if !table.get(store, inode)?.is_allocated() {
                self.free_inodes.push(inode);
            }
        }

        self.modified = true;
        log::debug!("inode rescan found {} free inodes", self.free_inodes.len());
        Ok(())
    }
}
