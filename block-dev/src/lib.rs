//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘、光盘、U盘等；
//! [`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 与内核中的块设备不同，这里的读写可以落在块内的任意偏移处，
//! 由上层保证偏移加长度不越过块尾。

use core::any::Any;
use std::io;

mod block_file;

pub use self::block_file::BlockFile;

/// 块大小（字节）
pub const BLOCK_SIZE: usize = 1024;

/// 块设备驱动特质
pub trait BlockDevice: Send + Sync + Any {
    /// 设备拥有的块数
    fn block_count(&self) -> usize;

    /// 从第 `block_id` 块的 `offset` 处读满 `buf`
    fn read_at(&self, block_id: usize, offset: usize, buf: &mut [u8]) -> io::Result<()>;

    /// 把 `buf` 原样写到第 `block_id` 块的 `offset` 处，不做填充
    fn write_at(&self, block_id: usize, offset: usize, buf: &[u8]) -> io::Result<()>;

    #[inline]
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> io::Result<()> {
        self.read_at(block_id, 0, buf)
    }

    #[inline]
    fn write_block(&self, block_id: usize, buf: &[u8]) -> io::Result<()> {
        self.write_at(block_id, 0, buf)
    }
}
