use arrayvec::ArrayVec;
use binrw::{BinRead, BinWrite};

use crate::config::FREE_ARRAY_SIZE;

/// 超级块：
/// - 记录索引节点区域与整个文件系统的大小；
/// - 缓存一段空闲块号与一段空闲 inode 号
///
/// 恰好占满0号块。
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct DiskSuperBlock {
    /// 索引节点区域占据块数
    pub inode_blocks: u32,
    /// 文件系统占据块数
    pub total_blocks: u32,
    /// `free` 中有效项的个数
    pub nfree: u32,
    /// 空闲块缓存，`free[0]` 是空闲链的链接
    pub free: [u16; FREE_ARRAY_SIZE],
    /// `inode` 中有效项的个数
    pub ninode: u32,
    /// 空闲 inode 缓存
    pub inode: [u16; FREE_ARRAY_SIZE],
    /* 以下字段仅为兼容磁盘格式而保留，从不参与任何操作 */
    pub flock: u16,
    pub ilock: u16,
    pub fmod: u16,
    _reserved: u16,
    pub time: [u32; 2],
}

/// 空闲链上的一段：写在溢出块的开头
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct FreeSegment {
    pub entries: [u16; FREE_ARRAY_SIZE],
}

impl DiskSuperBlock {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inode_blocks: u32,
        total_blocks: u32,
        free: &ArrayVec<u16, FREE_ARRAY_SIZE>,
        inode: &ArrayVec<u16, FREE_ARRAY_SIZE>,
        flock: u16,
        ilock: u16,
        fmod: u16,
        time: [u32; 2],
    ) -> Self {
        Self {
            inode_blocks,
            total_blocks,
            nfree: free.len() as u32,
            free: padded(free),
            ninode: inode.len() as u32,
            inode: padded(inode),
            flock,
            ilock,
            fmod,
            _reserved: 0,
            time,
        }
    }

    /// `free` 中的有效项；计数越界时返回空
    pub fn cached_blocks(&self) -> Option<&[u16]> {
        self.free.get(..self.nfree as usize)
    }

    /// `inode` 中的有效项；计数越界时返回空
    pub fn cached_inodes(&self) -> Option<&[u16]> {
        self.inode.get(..self.ninode as usize)
    }
}

impl FreeSegment {
    pub fn new(entries: &ArrayVec<u16, FREE_ARRAY_SIZE>) -> Self {
        Self {
            entries: padded(entries),
        }
    }
}

/// 超出有效项的部分填0
fn padded(entries: &ArrayVec<u16, FREE_ARRAY_SIZE>) -> [u16; FREE_ARRAY_SIZE] {
    let mut array = [0; FREE_ARRAY_SIZE];
    array[..entries.len()].copy_from_slice(entries);
    array
}
