use arrayvec::ArrayVec;

use crate::block_store::BlockStore;
use crate::config::FREE_ARRAY_SIZE;
use crate::layout::FreeSegment;
use crate::{BlockId, FsError, Result, SuperBlock};

impl SuperBlock {
    /// 分配一个数据块，同一段内后进先出
    pub fn acquire_block(&mut self, store: &BlockStore) -> Result<BlockId> {
        let block = self
            .free_blocks
            .pop()
            .ok_or_else(|| FsError::Corrupted("free block cache is empty".to_owned()))?;

        if !self.free_blocks.is_empty() {
            self.modified = true;
            log::debug!("acquire block {block}");
            return Ok(block);
        }

        // 弹出的是链接
        if block == BlockId::CHAIN_END {
            self.free_blocks.push(block);
            return Err(FsError::OutOfSpace("blocks"));
        }

        let segment: FreeSegment = match store.read_record(block, 0) {
            Ok(segment) => segment,
            Err(e) => {
                self.free_blocks.push(block);
                return Err(e);
            }
        };
        if let Err(e) = self.check_segment(&segment) {
            self.free_blocks.push(block);
            return Err(e);
        }

        self.free_blocks
            .extend(segment.entries.iter().copied().map(BlockId::new));
        self.modified = true;
        log::debug!("acquire block {block}, next segment loaded");

        Ok(block)
    }

    /// 归还一个数据块
    pub fn release_block(&mut self, store: &BlockStore, block: BlockId) -> Result<()> {
        if !(self.data_start()..self.total_blocks()).contains(&block.index()) {
            return Err(FsError::OutOfRange {
                kind: "data block",
                index: block.index(),
            });
        }

        if self.free_blocks.is_full() {
            let entries: ArrayVec<u16, FREE_ARRAY_SIZE> =
                self.free_blocks.iter().map(|b| b.get()).collect();
            store.write_record(block, 0, &FreeSegment::new(&entries))?;
            self.free_blocks.clear();
        }

        self.free_blocks.push(block);
        self.modified = true;
        log::trace!("release block {block}");

        Ok(())
    }
}

impl SuperBlock {
    fn check_segment(&self, segment: &FreeSegment) -> Result<()> {
        let data = self.data_start()..self.total_blocks();
        for (slot, &block) in segment.entries.iter().enumerate() {
            let is_chain_end = slot == 0 && BlockId::new(block) == BlockId::CHAIN_END;
            if !is_chain_end && !data.contains(&(block as usize)) {
                return Err(FsError::Corrupted(format!(
                    "free chain holds block {block} outside the data region"
                )));
            }
        }
        Ok(())
    }
}
