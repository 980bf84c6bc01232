//! # 块存储层
//!
//! 对块设备的一层薄封装：所有读写都落在 `1024 * 块号 + 块内偏移` 处，
//! 并且先检查块号不越过文件系统、偏移加长度不越过块尾。
//! 这里没有缓存，每次调用都会访问块设备。

use std::sync::Arc;

use block_dev::BlockDevice;

use crate::config::BLOCK_SIZE;
use crate::layout::Record;
use crate::{BlockId, FsError, Result};

pub struct BlockStore {
    device: Arc<dyn BlockDevice>,
    /// 文件系统占据的块数，不一定等于设备的块数
    total_blocks: usize,
}

impl BlockStore {
    pub fn new(device: Arc<dyn BlockDevice>, total_blocks: usize) -> Self {
        Self {
            device,
            total_blocks,
        }
    }

    #[inline]
    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    /// 从块首开始写入，只写 `bytes` 本身的长度
    #[inline]
    pub fn write_block(&self, block: BlockId, bytes: &[u8]) -> Result<()> {
        self.write_at(block, 0, bytes)
    }

    pub fn write_at(&self, block: BlockId, offset: usize, bytes: &[u8]) -> Result<()> {
        self.check(block, offset, bytes.len())?;
        log::trace!("write block {block} [{offset}..{}]", offset + bytes.len());
        self.device.write_at(block.index(), offset, bytes)?;
        Ok(())
    }

    pub fn read_at(&self, block: BlockId, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.check(block, offset, len)?;
        log::trace!("read block {block} [{offset}..{}]", offset + len);
        let mut buf = vec![0; len];
        self.device.read_at(block.index(), offset, &mut buf)?;
        Ok(buf)
    }

    #[inline]
    pub fn read_block(&self, block: BlockId) -> Result<Vec<u8>> {
        self.read_at(block, 0, BLOCK_SIZE)
    }

    #[inline]
    pub fn zero_block(&self, block: BlockId) -> Result<()> {
        self.write_block(block, &[0; BLOCK_SIZE])
    }

    pub fn read_record<T: Record>(&self, block: BlockId, offset: usize) -> Result<T> {
        let bytes = self.read_at(block, offset, T::SIZE)?;
        Ok(T::decode(&bytes)?)
    }

    pub fn write_record<T: Record>(&self, block: BlockId, offset: usize, record: &T) -> Result<()> {
        let bytes = record.encode()?;
        debug_assert_eq!(bytes.len(), T::SIZE);
        self.write_at(block, offset, &bytes)
    }
}

impl BlockStore {
    fn check(&self, block: BlockId, offset: usize, len: usize) -> Result<()> {
        if block.index() >= self.total_blocks {
            return Err(FsError::OutOfRange {
                kind: "block",
                index: block.index(),
            });
        }
        if offset + len > BLOCK_SIZE {
            return Err(FsError::OutOfRange {
                kind: "block offset",
                index: offset + len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn offset_write_then_read() {
        let store = testing::store(8);
        store.write_block(BlockId::new(3), &[1; BLOCK_SIZE]).unwrap();
        store.write_at(BlockId::new(3), 1000, &[2; 24]).unwrap();

        let block = store.read_block(BlockId::new(3)).unwrap();
        assert!(block[..1000].iter().all(|&b| b == 1));
        assert!(block[1000..].iter().all(|&b| b == 2));
        assert_eq!(store.read_at(BlockId::new(3), 998, 4).unwrap(), [1, 1, 2, 2]);
    }

    #[test]
    fn block_past_the_end_is_rejected() {
        let store = testing::store(8);
        assert!(matches!(
            store.write_block(BlockId::new(8), b"x"),
            Err(FsError::OutOfRange { kind: "block", index: 8 })
        ));
        assert!(matches!(
            store.read_at(BlockId::new(100), 0, 1),
            Err(FsError::OutOfRange { .. })
        ));
    }

    #[test]
    fn transfer_crossing_block_end_is_rejected() {
        let store = testing::store(8);
        assert!(matches!(
            store.write_at(BlockId::new(1), 1020, &[0; 8]),
            Err(FsError::OutOfRange { kind: "block offset", .. })
        ));
        assert!(store.read_at(BlockId::new(1), 1016, 8).is_ok());
    }

    #[test]
    fn filesystem_may_be_smaller_than_device() {
        let store = BlockStore::new(testing::device(16), 4);
        assert!(store.read_block(BlockId::new(3)).is_ok());
        assert!(store.read_block(BlockId::new(4)).is_err());
    }
}
