//! # 磁盘数据结构层
//!
//! unixfs 的磁盘布局（块大小 1024 字节）：
//! 超级块 | 索引节点区域 | 数据块区域
//!
//! 数据块区域在格式化后全部挂在空闲链上，按需分配。
//! 所有记录都按小端序编解码。

use std::io::Cursor;

use binrw::{BinRead, BinResult, BinWrite};

use crate::config::{BLOCK_SIZE, DIR_ENTRY_SIZE, FREE_ARRAY_SIZE, INODE_SIZE};

mod super_block;
pub use super_block::{DiskSuperBlock, FreeSegment};

mod inode;
pub use inode::{DiskInode, InodeFlag};

/// 文件项，也属于磁盘文件系统数据结构
mod dir_entry;
pub use dir_entry::DirEntry;

/// 定长的磁盘记录
pub trait Record: Sized {
    /// 编码后的字节数
    const SIZE: usize;

    fn decode(bytes: &[u8]) -> BinResult<Self>;

    fn encode(&self) -> BinResult<Vec<u8>>;
}

macro_rules! impl_record {
    ($($ty:ty => $size:expr),* $(,)?) => {
        $(
            impl Record for $ty {
                const SIZE: usize = $size;

                #[inline]
                fn decode(bytes: &[u8]) -> BinResult<Self> {
                    <$ty as BinRead>::read(&mut Cursor::new(bytes))
                }

                fn encode(&self) -> BinResult<Vec<u8>> {
                    let mut cursor = Cursor::new(Vec::with_capacity(Self::SIZE));
                    BinWrite::write(self, &mut cursor)?;
                    Ok(cursor.into_inner())
                }
            }
        )*
    };
}

impl_record! {
    DiskSuperBlock => BLOCK_SIZE,
    FreeSegment => FREE_ARRAY_SIZE * 2,
    DiskInode => INODE_SIZE,
    DirEntry => DIR_ENTRY_SIZE,
}
