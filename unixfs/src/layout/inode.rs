//! 磁盘 inode，64字节，布局与 C 结构体的自然对齐一致：
//!
//! | 偏移 | 字段                  |
//! |------|-----------------------|
//! | 0    | flags                 |
//! | 2    | links, uid, gid       |
//! | 8    | size                  |
//! | 12   | 22个直接索引块号      |
//! | 56   | 访问时间、修改时间    |

use binrw::{BinRead, BinWrite};
use enumflags2::{BitFlags, bitflags};

use crate::config::{BLOCK_SIZE, DIRECT_COUNT};
use crate::{BlockId, FileKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct DiskInode {
    flags: u16,
    /// 硬链接个数
    pub links: u8,
    pub uid: u8,
    pub gid: u8,
    _pad: [u8; 3],
    // 不用usize是为了严控布局
    pub size: u32,
    /// 直接索引块，存储容量：DIRECT_COUNT * BLOCK_SIZE 字节
    addr: [u16; DIRECT_COUNT],
    pub accessed: u32,
    pub modified: u32,
}

#[bitflags]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeFlag {
    Directory = 1 << 14,
    Allocated = 1 << 15,
}

impl DiskInode {
    /// 新分配的 inode，链接数为1，属主为0
    pub fn new(kind: FileKind, now: u32) -> Self {
        let mut flags = BitFlags::from(InodeFlag::Allocated);
        if kind == FileKind::Directory {
            flags |= InodeFlag::Directory;
        }

        Self {
            flags: flags.bits(),
            links: 1,
            accessed: now,
            modified: now,
            ..Default::default()
        }
    }

    #[inline]
    pub fn flags(&self) -> BitFlags<InodeFlag> {
        BitFlags::from_bits_truncate(self.flags)
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.flags().contains(InodeFlag::Allocated)
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.flags().contains(InodeFlag::Allocated | InodeFlag::Directory)
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.is_allocated() && !self.is_dir()
    }

    pub fn kind(&self) -> Option<FileKind> {
        if self.is_dir() {
            Some(FileKind::Directory)
        } else if self.is_file() {
            Some(FileKind::File)
        } else {
            None
        }
    }

    /// 容纳 `size` 字节需要多少个数据块
    #[inline]
    pub fn count_data_block(size: u32) -> usize {
        (size as usize).div_ceil(BLOCK_SIZE)
    }

    /// 按顺序给出正在使用的数据块；大小超出直接索引容量时截断
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        let count = Self::count_data_block(self.size).min(DIRECT_COUNT);
        self.addr[..count].iter().copied().map(BlockId::new)
    }

    /// 第 `index` 个直接索引块
    #[inline]
    pub fn block(&self, index: usize) -> BlockId {
        BlockId::new(self.addr[index])
    }

    #[inline]
    pub fn set_block(&mut self, index: usize, block: BlockId) {
        self.addr[index] = block.get();
    }
}
