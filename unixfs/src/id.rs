use derive_more::{Display, From, Into};

use crate::{FsError, Result};

/// 块号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, From, Into, Display)]
#[repr(transparent)]
pub struct BlockId(u16);

/// inode 号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, From, Into, Display)]
#[repr(transparent)]
pub struct InodeId(u16);

impl BlockId {
    /// 0号块是超级块，绝不会成为数据块，因此用作空闲链的终点
    pub const CHAIN_END: Self = Self(0);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl InodeId {
    /// 0号 inode 保留不用
    pub const NONE: Self = Self(0);
    /// 根目录
    pub const ROOT: Self = Self(1);
    /// 可分配的最小 inode 号
    pub const FIRST_FREE: Self = Self(2);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for BlockId {
    type Error = FsError;

    fn try_from(raw: usize) -> Result<Self> {
        u16::try_from(raw)
            .map(Self)
            .map_err(|_| FsError::OutOfRange { kind: "block", index: raw })
    }
}

impl TryFrom<usize> for InodeId {
    type Error = FsError;

    fn try_from(raw: usize) -> Result<Self> {
        u16::try_from(raw)
            .map(Self)
            .map_err(|_| FsError::OutOfRange { kind: "inode", index: raw })
    }
}
