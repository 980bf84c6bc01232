//! # 超级块管理器
//!
//! 会话期间超级块常驻内存：几何信息只读，两段空闲缓存只由空闲链修改。
//! 修改不会自动写回，需要调用 [`SuperBlock::persist`]。

use arrayvec::ArrayVec;

use crate::block_store::BlockStore;
use crate::config::*;
use crate::layout::DiskSuperBlock;
use crate::{BlockId, FsError, InodeId, Result};

/// 内存中的超级块
#[derive(Debug)]
pub struct SuperBlock {
    inode_blocks: u32,
    total_blocks: u32,
    /// 空闲块缓存，栈底是空闲链的链接
    pub(crate) free_blocks: ArrayVec<BlockId, FREE_ARRAY_SIZE>,
    /// 空闲 inode 缓存
    pub(crate) free_inodes: ArrayVec<InodeId, FREE_ARRAY_SIZE>,
    legacy: Legacy,
    /// 与磁盘上的版本是否不同
    pub(crate) modified: bool,
}

/// 磁盘格式遗留的锁与时间字段，原样保存
#[derive(Debug, Clone, Copy)]
struct Legacy {
    flock: u16,
    ilock: u16,
    fmod: u16,
    time: [u32; 2],
}

impl SuperBlock {
    /// 格式化：清空索引节点区域，建立空闲块链与空闲 inode 缓存，写回0号块。
    ///
    /// 根目录由调用者随后创建。
    pub fn initialize(store: &BlockStore, total_blocks: usize, total_inodes: usize) -> Result<Self> {
        let inode_blocks = Self::check_geometry(total_blocks, total_inodes)?;

        let mut sb = Self {
            inode_blocks: inode_blocks as u32,
            total_blocks: total_blocks as u32,
            free_blocks: ArrayVec::new(),
            free_inodes: ArrayVec::new(),
            legacy: Legacy {
                flock: u16::from(b'f'),
                ilock: u16::from(b'i'),
                fmod: u16::from(b'f'),
                time: [0; 2],
            },
            modified: true,
        };

        for block in 1..=inode_blocks {
            store.zero_block(BlockId::try_from(block)?)?;
        }

        // 空链只有终点
        sb.free_blocks.push(BlockId::CHAIN_END);
        for block in sb.data_start()..total_blocks {
            sb.release_block(store, BlockId::try_from(block)?)?;
        }

        for inode in InodeId::FIRST_FREE.index()..total_inodes {
            if sb.free_inodes.is_full() {
                break;
            }
            sb.free_inodes.push(InodeId::try_from(inode)?);
        }

        sb.persist(store)?;
        log::info!(
            "initialized: {total_blocks} blocks, {inode_blocks} inode blocks, {} inode slots",
            sb.inode_capacity()
        );

        Ok(sb)
    }

    /// 读出0号块并校验
    pub fn load(store: &BlockStore) -> Result<Self> {
        let raw: DiskSuperBlock = store.read_record(BlockId::new(0), 0)?;
        let sb = Self::from_disk(&raw, store.total_blocks())?;
        log::info!(
            "loaded superblock: {} blocks, {} inode blocks, {} cached free blocks, {} cached free inodes",
            sb.total_blocks,
            sb.inode_blocks,
            sb.free_blocks.len(),
            sb.free_inodes.len()
        );
        Ok(sb)
    }

    /// 写回0号块
    pub fn persist(&mut self, store: &BlockStore) -> Result<()> {
        store.write_record(BlockId::new(0), 0, &self.to_disk())?;
        self.modified = false;
        log::debug!(
            "superblock persisted (nfree={}, ninode={})",
            self.free_blocks.len(),
            self.free_inodes.len()
        );
        Ok(())
    }

    #[inline]
    pub fn inode_blocks(&self) -> usize {
        self.inode_blocks as usize
    }

    #[inline]
    pub fn total_blocks(&self) -> usize {
        self.total_blocks as usize
    }

    /// 索引节点区域能容纳的 inode 个数。
    ///
    /// 磁盘上不记录格式化时要求的 inode 数，这里按整块向上取整：
    /// 要求300个时容量为304，扫描也会交出 300..304。
    #[inline]
    pub fn inode_capacity(&self) -> usize {
        self.inode_blocks() * INODES_PER_BLOCK
    }

    /// 首个数据块
    #[inline]
    pub fn data_start(&self) -> usize {
        1 + self.inode_blocks()
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// 缓存中的空闲块个数（不含链接）
    pub fn cached_free_blocks(&self) -> usize {
        self.free_blocks.len().saturating_sub(1)
    }

    pub fn cached_free_inodes(&self) -> usize {
        self.free_inodes.len()
    }
}

impl SuperBlock {
    /// 返回索引节点区域的块数
    pub(crate) fn check_geometry(total_blocks: usize, total_inodes: usize) -> Result<usize> {
        if total_blocks > MAX_BLOCKS {
            return Err(FsError::InvalidGeometry(format!(
                "{total_blocks} blocks exceed the {MAX_BLOCKS} addressable by 16-bit block numbers"
            )));
        }
        if !(InodeId::FIRST_FREE.index()..=MAX_INODES).contains(&total_inodes) {
            return Err(FsError::InvalidGeometry(format!(
                "inode count {total_inodes} not in {}..={MAX_INODES}",
                InodeId::FIRST_FREE.index()
            )));
        }

        let inode_blocks = (total_inodes * INODE_SIZE).div_ceil(BLOCK_SIZE);
        // 超级块 + 索引节点区域 + 根目录的数据块
        if total_blocks < 1 + inode_blocks + 1 {
            return Err(FsError::InvalidGeometry(format!(
                "{total_blocks} blocks cannot hold the superblock, {inode_blocks} inode blocks and a root directory"
            )));
        }

        Ok(inode_blocks)
    }

    fn to_disk(&self) -> DiskSuperBlock {
        let free: ArrayVec<u16, FREE_ARRAY_SIZE> =
            self.free_blocks.iter().map(|block| block.get()).collect();
        let inode: ArrayVec<u16, FREE_ARRAY_SIZE> =
            self.free_inodes.iter().map(|inode| inode.get()).collect();

        DiskSuperBlock::new(
            self.inode_blocks,
            self.total_blocks,
            &free,
            &inode,
            self.legacy.flock,
            self.legacy.ilock,
            self.legacy.fmod,
            self.legacy.time,
        )
    }

    fn from_disk(raw: &DiskSuperBlock, device_blocks: usize) -> Result<Self> {
        let bad = |reason: String| Err(FsError::BadSuperblock(reason));

        let total_blocks = raw.total_blocks as usize;
        let inode_blocks = raw.inode_blocks as usize;
        if total_blocks > device_blocks || total_blocks > MAX_BLOCKS {
            return bad(format!(
                "{total_blocks} blocks recorded, but the image holds {device_blocks}"
            ));
        }
        if inode_blocks == 0 || 1 + inode_blocks >= total_blocks {
            return bad(format!(
                "{inode_blocks} inode blocks do not fit in {total_blocks} blocks"
            ));
        }

        let Some(free) = raw.cached_blocks().filter(|free| !free.is_empty()) else {
            return bad(format!("free block count {} out of 1..={FREE_ARRAY_SIZE}", raw.nfree));
        };
        let Some(inodes) = raw.cached_inodes() else {
            return bad(format!("free inode count {} out of 0..={FREE_ARRAY_SIZE}", raw.ninode));
        };

        let data = 1 + inode_blocks..total_blocks;
        for (slot, &block) in free.iter().enumerate() {
            let is_chain_end = slot == 0 && BlockId::new(block) == BlockId::CHAIN_END;
            if !is_chain_end && !data.contains(&(block as usize)) {
                return bad(format!("cached free block {block} is not a data block"));
            }
        }
        let capacity = inode_blocks * INODES_PER_BLOCK;
        if let Some(inode) = inodes
            .iter()
            .find(|&&inode| !(InodeId::FIRST_FREE.index()..capacity).contains(&(inode as usize)))
        {
            return bad(format!("cached free inode {inode} is outside the inode table"));
        }

        Ok(Self {
            inode_blocks: raw.inode_blocks,
            total_blocks: raw.total_blocks,
            free_blocks: free.iter().copied().map(BlockId::new).collect(),
            free_inodes: inodes.iter().copied().map(InodeId::new).collect(),
            legacy: Legacy {
                flock: raw.flock,
                ilock: raw.ilock,
                fmod: raw.fmod,
                time: raw.time,
            },
            modified: false,
        })
    }
}
