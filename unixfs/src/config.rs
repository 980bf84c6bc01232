//! 磁盘几何常量

pub use block_dev::BLOCK_SIZE;

/// 超级块里空闲块缓存、空闲 inode 缓存的容量
pub const FREE_ARRAY_SIZE: usize = 248;

/// 磁盘 inode 的大小
pub const INODE_SIZE: usize = 64;
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;

/// 直接索引块个数
pub const DIRECT_COUNT: usize = 22;
/// 文件最大字节数：只有直接索引
pub const MAX_FILE_SIZE: usize = DIRECT_COUNT * BLOCK_SIZE;

/// 目录项大小恒为16字节
pub const DIR_ENTRY_SIZE: usize = 16;
/// 目录内容只占首个数据块
pub const DIR_ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DIR_ENTRY_SIZE;

/// 目录项中名字字段的长度
pub const NAME_FIELD_LEN: usize = 14;
/// 留一字节给 \0
pub const NAME_MAX_LEN: usize = NAME_FIELD_LEN - 1;

/// 块号、inode 号在磁盘上都是 u16
pub const MAX_BLOCKS: usize = u16::MAX as usize + 1;
pub const MAX_INODES: usize = u16::MAX as usize + 1;
