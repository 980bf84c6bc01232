//! # 空闲链
//!
//! 两条空闲链都挂在 [`SuperBlock`](crate::SuperBlock) 上：
//! - 空闲块：缓存满时整段写进下一个被释放的块，该块成为新的链接，
//!   链的终点是 [`BlockId::CHAIN_END`](crate::BlockId::CHAIN_END)；
//! - 空闲 inode：缓存满时直接丢弃，缓存空时扫描索引节点区域补充。

mod block;
mod inode;
