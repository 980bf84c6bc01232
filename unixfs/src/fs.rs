//! # 会话层
//!
//! [`FileSystem`] 独占一个块设备上的全部可变状态：内存超级块、索引节点表与当前目录。
//! 所有名字都相对于当前目录解析，每次只处理一级。

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use block_dev::{BlockDevice, BlockFile};

use crate::block_store::BlockStore;
use crate::config::{DIR_ENTRIES_PER_BLOCK, NAME_MAX_LEN};
use crate::layout::{DirEntry, DiskInode};
use crate::{
    BlockId, Directory, FileKind, FsError, InodeId, InodeTable, Result, Session, Stat, SuperBlock,
    content,
};

pub struct FileSystem {
    store: BlockStore,
    super_block: SuperBlock,
    inodes: InodeTable,
    session: Session,
}

/// 生命周期
impl FileSystem {
    /// 新建 `blocks * 1024` 字节的镜像文件并格式化；文件已存在时拒绝
    pub fn initialize(path: impl AsRef<Path>, blocks: usize, inodes: usize) -> Result<Self> {
        let path = path.as_ref();
        SuperBlock::check_geometry(blocks, inodes)?;

        let device = BlockFile::create(path, blocks).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path.display().to_string()),
            _ => FsError::Io(e),
        })?;
        Self::format(Arc::new(device), blocks, inodes)
    }

    /// 打开已有的镜像文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let device = BlockFile::open(path)?;
        Self::mount(Arc::new(device))
    }

    /// 在设备的前 `blocks` 块上建立空文件系统，根目录为1号 inode
    pub fn format(device: Arc<dyn BlockDevice>, blocks: usize, inodes: usize) -> Result<Self> {
        if blocks > device.block_count() {
            return Err(FsError::InvalidGeometry(format!(
                "{blocks} blocks requested, but the device holds {}",
                device.block_count()
            )));
        }

        let store = BlockStore::new(device, blocks);
        let mut super_block = SuperBlock::initialize(&store, blocks, inodes)?;
        let inode_table = InodeTable::new(super_block.inode_blocks());

        let root_block = super_block.acquire_block(&store)?;
        Directory::create(&store, &inode_table, InodeId::ROOT, InodeId::ROOT, root_block)?;
        super_block.persist(&store)?;
        log::info!("formatted: root directory on block {root_block}");

        Ok(Self {
            store,
            super_block,
            inodes: inode_table,
            session: Session::at_root(),
        })
    }

    /// 载入并校验已有的文件系统
    pub fn mount(device: Arc<dyn BlockDevice>) -> Result<Self> {
        if device.block_count() == 0 {
            return Err(FsError::BadSuperblock("image is empty".to_owned()));
        }

        let super_block = SuperBlock::load(&BlockStore::new(device.clone(), device.block_count()))?;
        let store = BlockStore::new(device, super_block.total_blocks());
        let inode_table = InodeTable::new(super_block.inode_blocks());

        if !inode_table.get(&store, InodeId::ROOT)?.is_dir() {
            return Err(FsError::BadSuperblock(
                "root inode is not an allocated directory".to_owned(),
            ));
        }
        log::info!("mounted {} blocks", super_block.total_blocks());

        Ok(Self {
            store,
            super_block,
            inodes: inode_table,
            session: Session::at_root(),
        })
    }

    /// 把超级块写回0号块
    pub fn sync(&mut self) -> Result<()> {
        self.super_block.persist(&self.store)
    }

    pub fn close(mut self) -> Result<()> {
        self.sync()?;
        log::info!("closed");
        Ok(())
    }

    #[inline]
    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }
}

/// 目录操作
impl FileSystem {
    #[inline]
    pub fn cwd(&self) -> &str {
        self.session.path()
    }

    #[inline]
    pub fn cwd_inode(&self) -> InodeId {
        self.session.cwd()
    }

    /// 当前目录下的名字，按目录项顺序
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    pub fn entries(&self) -> Result<Vec<(String, InodeId)>> {
        Ok(self
            .current_dir()?
            .entries(&self.store)?
            .iter()
            .map(|entry| (entry.name().into_owned(), entry.inode()))
            .collect())
    }

    pub fn make_dir(&mut self, name: &str) -> Result<InodeId> {
        check_name(name)?;
        let mut parent = self.prepare_create(name)?;

        let id = self.super_block.acquire_inode(&self.store, &self.inodes)?;
        let block = match self.super_block.acquire_block(&self.store) {
            Ok(block) => block,
            Err(e) => {
                self.super_block.release_inode(id);
                return Err(e);
            }
        };

        let created = Directory::create(&self.store, &self.inodes, id, parent.id(), block)
            .and_then(|_| parent.append(&self.store, &self.inodes, &DirEntry::new(name, id)?));
        if let Err(e) = created {
            self.undo_create(id, &[block]);
            return Err(e);
        }
        log::debug!("mkdir {name:?} -> inode {id}");

        Ok(id)
    }

    pub fn change_dir(&mut self, name: &str) -> Result<()> {
        match name {
            "." => {}
            ".." => {
                let parent = self
                    .current_dir()?
                    .find(&self.store, "..")?
                    .ok_or_else(|| FsError::Corrupted(format!("{} has no parent entry", self.cwd())))?;
                self.session.leave(parent.inode());
            }
            _ => {
                let (entry, inode) = self.lookup(name)?;
                if !inode.is_dir() {
                    return Err(FsError::NotADirectory(name.to_owned()));
                }
                self.session.enter(entry.inode(), name);
            }
        }
        log::debug!("cd {name:?} -> {}", self.cwd());

        Ok(())
    }

    pub fn remove_dir(&mut self, name: &str) -> Result<()> {
        if matches!(name, "." | "..") {
            return Err(FsError::InvalidName(name.to_owned()));
        }

        let (entry, inode) = self.lookup(name)?;
        if !inode.is_dir() {
            return Err(FsError::NotADirectory(name.to_owned()));
        }
        if !Directory::open(&self.store, &self.inodes, entry.inode())?.is_empty() {
            return Err(FsError::DirectoryNotEmpty(name.to_owned()));
        }

        self.current_dir()?.remove(&self.store, &self.inodes, name)?;
        content::release(&mut self.super_block, &self.store, &self.inodes, entry.inode(), &inode)?;
        log::debug!("rmdir {name:?}");

        Ok(())
    }
}

/// 文件操作
impl FileSystem {
    /// 把宿主机上的文件复制为当前目录下的 `name`
    pub fn copy_in(&mut self, host: impl AsRef<Path>, name: &str) -> Result<InodeId> {
        let file = File::open(host)?;
        self.write_file(name, BufReader::new(file))
    }

    pub fn write_file(&mut self, name: &str, reader: impl Read) -> Result<InodeId> {
        check_name(name)?;
        let mut parent = self.prepare_create(name)?;

        let (id, inode) = content::write_from(&mut self.super_block, &self.store, &self.inodes, reader)?;
        if let Err(e) = parent.append(&self.store, &self.inodes, &DirEntry::new(name, id)?) {
            let blocks: Vec<BlockId> = inode.blocks().collect();
            self.undo_create(id, &blocks);
            return Err(e);
        }
        log::debug!("created {name:?} -> inode {id}, {} bytes", inode.size);

        Ok(id)
    }

    /// 把当前目录下的 `name` 复制到宿主机；源不存在时不会创建目标
    pub fn copy_out(&self, name: &str, host: impl AsRef<Path>) -> Result<u64> {
        let inode = self.file_inode(name)?;
        let file = File::create(host)?;
        content::read_to(&self.store, &inode, BufWriter::new(file))
    }

    pub fn read_file(&self, name: &str, writer: impl Write) -> Result<u64> {
        let inode = self.file_inode(name)?;
        content::read_to(&self.store, &inode, writer)
    }

    pub fn remove_file(&mut self, name: &str) -> Result<()> {
        let (entry, inode) = self.lookup(name)?;
        if !inode.is_file() {
            return Err(FsError::NotAFile(name.to_owned()));
        }

        self.current_dir()?.remove(&self.store, &self.inodes, name)?;
        content::release(&mut self.super_block, &self.store, &self.inodes, entry.inode(), &inode)?;
        log::debug!("rm {name:?}");

        Ok(())
    }

    pub fn stat(&self, name: &str) -> Result<Stat> {
        let (entry, inode) = self.lookup(name)?;
        let kind = inode
            .kind()
            .ok_or_else(|| FsError::Corrupted(format!("{name} refers to a free inode")))?;

        Ok(Stat {
            inode: entry.inode(),
            kind,
            size: inode.size,
            blocks: match kind {
                FileKind::File => inode.blocks().count(),
                FileKind::Directory => 1,
            },
            links: inode.links,
            uid: inode.uid,
            gid: inode.gid,
            accessed: inode.accessed,
            modified: inode.modified,
        })
    }
}

impl FileSystem {
    fn current_dir(&self) -> Result<Directory> {
        Directory::open(&self.store, &self.inodes, self.session.cwd())
    }

    /// 在当前目录中按名字找到目录项及其 inode
    fn lookup(&self, name: &str) -> Result<(DirEntry, DiskInode)> {
        let entry = self
            .current_dir()?
            .find(&self.store, name)?
            .ok_or_else(|| FsError::NotFound(name.to_owned()))?;
        let inode = self.inodes.get(&self.store, entry.inode())?;
        if !inode.is_allocated() {
            return Err(FsError::Corrupted(format!(
                "{name} refers to free inode {}",
                entry.inode()
            )));
        }
        Ok((entry, inode))
    }

    fn file_inode(&self, name: &str) -> Result<DiskInode> {
        let (_, inode) = self.lookup(name)?;
        if !inode.is_file() {
            return Err(FsError::NotAFile(name.to_owned()));
        }
        Ok(inode)
    }

    /// 创建前的检查：不能重名，目录不能已满
    fn prepare_create(&self, name: &str) -> Result<Directory> {
        let parent = self.current_dir()?;
        if parent.find(&self.store, name)?.is_some() {
            return Err(FsError::AlreadyExists(name.to_owned()));
        }
        if parent.len() >= DIR_ENTRIES_PER_BLOCK {
            return Err(FsError::DirectoryFull);
        }
        Ok(parent)
    }

    /// 撤销尚未挂进目录的新 inode
    fn undo_create(&mut self, id: InodeId, blocks: &[BlockId]) {
        for &block in blocks {
            if let Err(e) = self.super_block.release_block(&self.store, block) {
                log::warn!("undo: block {block} lost: {e}");
            }
        }
        if let Err(e) = self.inodes.put(&self.store, id, &DiskInode::default()) {
            log::warn!("undo: inode {id} not cleared: {e}");
        }
        self.super_block.release_inode(id);
    }
}

impl Drop for FileSystem {
    fn drop(&mut self) {
        if !self.super_block.is_modified() {
            return;
        }
        if let Err(e) = self.sync() {
            log::warn!("superblock not flushed on drop: {e}");
        }
    }
}

/// 新名字：非空、不超过13字节、不含 `/` 与 `\0`、不是 `.` 或 `..`
fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || matches!(name, "." | "..") || name.contains(['/', '\0']) {
        return Err(FsError::InvalidName(name.to_owned()));
    }
    if name.len() > NAME_MAX_LEN {
        return Err(FsError::NameTooLong(name.to_owned()));
    }
    Ok(())
}
