//! # 文件内容
//!
//! 普通文件只用直接索引：第 `i` 个 1024 字节的分片存放在 `addr[i]` 指向的块中，
//! 最后一个分片按实际长度写入。

use std::io::{Read, Write};

use crate::block_store::BlockStore;
use crate::config::{BLOCK_SIZE, MAX_FILE_SIZE};
use crate::layout::DiskInode;
use crate::stat::now;
use crate::{BlockId, FileKind, FsError, InodeId, InodeTable, Result, SuperBlock};

/// 把 `reader` 的全部内容写成一个新文件，返回新文件的 inode。
///
/// 中途失败时，已经分配的块与 inode 全部归还。
pub fn write_from(
    sb: &mut SuperBlock,
    store: &BlockStore,
    table: &InodeTable,
    reader: impl Read,
) -> Result<(InodeId, DiskInode)> {
    // 多读一个字节即可判断是否超长
    let mut data = Vec::new();
    reader
        .take(MAX_FILE_SIZE as u64 + 1)
        .read_to_end(&mut data)?;
    if data.len() > MAX_FILE_SIZE {
        return Err(FsError::FileTooLarge);
    }

    let id = sb.acquire_inode(store, table)?;
    let mut inode = DiskInode::new(FileKind::File, now());
    let mut allocated = Vec::with_capacity(DiskInode::count_data_block(data.len() as u32));

    let written = (|| {
        for (index, chunk) in data.chunks(BLOCK_SIZE).enumerate() {
            let block = sb.acquire_block(store)?;
            allocated.push(block);
            inode.set_block(index, block);
            store.write_block(block, chunk)?;
        }
        inode.size = data.len() as u32;
        table.put(store, id, &inode)
    })();

    if let Err(e) = written {
        rollback(sb, store, id, &allocated);
        return Err(e);
    }

    log::debug!(
        "wrote inode {id}: {} bytes in {} blocks",
        data.len(),
        allocated.len()
    );
    Ok((id, inode))
}

/// 把文件内容写到 `writer`，返回字节数
pub fn read_to(store: &BlockStore, inode: &DiskInode, mut writer: impl Write) -> Result<u64> {
    let size = inode.size as usize;
    if size > MAX_FILE_SIZE {
        return Err(FsError::Corrupted(format!(
            "file size {size} exceeds direct blocks"
        )));
    }

    let mut remaining = size;
    for block in inode.blocks() {
        let len = remaining.min(BLOCK_SIZE);
        writer.write_all(&store.read_at(block, 0, len)?)?;
        remaining -= len;
    }
    writer.flush()?;

    Ok(size as u64)
}

/// 归还文件（或目录）占用的全部数据块、清空 inode 并归还 inode 号。
///
/// 目录项需由调用者先行移除。
pub fn release(
    sb: &mut SuperBlock,
    store: &BlockStore,
    table: &InodeTable,
    id: InodeId,
    inode: &DiskInode,
) -> Result<()> {
    for block in inode.blocks() {
        sb.release_block(store, block)?;
    }
    table.put(store, id, &DiskInode::default())?;
    sb.release_inode(id);
    log::debug!("released inode {id}");

    Ok(())
}

fn rollback(sb: &mut SuperBlock, store: &BlockStore, id: InodeId, allocated: &[BlockId]) {
    for &block in allocated {
        if let Err(e) = sb.release_block(store, block) {
            log::warn!("rollback: block {block} lost: {e}");
        }
    }
    sb.release_inode(id);
}
