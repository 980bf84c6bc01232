use std::sync::Arc;

use block_dev::{BlockDevice, BlockFile};

use crate::{BlockStore, FileSystem};

pub fn device(blocks: usize) -> Arc<dyn BlockDevice> {
    let fd = tempfile::tempfile().unwrap();
    Arc::new(BlockFile::with_blocks(fd, blocks).unwrap())
}

pub fn store(blocks: usize) -> BlockStore {
    BlockStore::new(device(blocks), blocks)
}

pub fn fs(blocks: usize, inodes: usize) -> FileSystem {
    FileSystem::format(device(blocks), blocks, inodes).unwrap()
}
