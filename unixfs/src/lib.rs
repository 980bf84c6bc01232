/* unixfs 的整体架构，自上而下 */

// 会话层：当前目录与所有对外操作
mod fs;
mod session;

// 文件内容与目录内容
mod content;
mod dir;

// 索引节点表
mod inode_table;

// 超级块与两条空闲链
mod free_list;
mod super_block;

// 磁盘数据结构层：表示磁盘文件系统的数据结构
pub mod layout;

// 块存储层：带越界检查的块读写
mod block_store;

pub mod config;
mod error;
mod id;
mod stat;

#[cfg(test)]
mod testing;

pub use block_dev::{BlockDevice, BlockFile};

pub use self::{
    block_store::BlockStore,
    dir::Directory,
    error::{FsError, Result},
    fs::FileSystem,
    id::{BlockId, InodeId},
    inode_table::InodeTable,
    session::Session,
    stat::{FileKind, Stat},
    super_block::SuperBlock,
};
