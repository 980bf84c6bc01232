//! # 目录
//!
//! 目录内容是 [`DirEntry`] 的紧凑数组，只存放在首个数据块中，
//! 因此一个目录最多64项（含 `.` 与 `..`）。

use crate::block_store::BlockStore;
use crate::config::{DIR_ENTRIES_PER_BLOCK, DIR_ENTRY_SIZE};
use crate::layout::{DirEntry, DiskInode, Record};
use crate::stat::now;
use crate::{BlockId, FileKind, FsError, InodeId, InodeTable, Result};

/// 已载入的目录 inode
#[derive(Debug, Clone)]
pub struct Directory {
    id: InodeId,
    inode: DiskInode,
}

impl Directory {
    pub fn open(store: &BlockStore, table: &InodeTable, id: InodeId) -> Result<Self> {
        let inode = table.get(store, id)?;
        if !inode.is_dir() {
            return Err(FsError::NotADirectory(format!("inode {id}")));
        }
        Ok(Self { id, inode })
    }

    /// 在已分配的 inode 与数据块上建立只含 `.` 和 `..` 的目录
    pub fn create(
        store: &BlockStore,
        table: &InodeTable,
        id: InodeId,
        parent: InodeId,
        block: BlockId,
    ) -> Result<Self> {
        let mut inode = DiskInode::new(FileKind::Directory, now());
        inode.set_block(0, block);

        let mut dir = Self { id, inode };
        for (name, target) in [(".", id), ("..", parent)] {
            let entry = DirEntry::new(name, target)?;
            store.write_record(block, dir.inode.size as usize, &entry)?;
            dir.inode.size += DIR_ENTRY_SIZE as u32;
        }
        table.put(store, id, &dir.inode)?;

        Ok(dir)
    }

    #[inline]
    pub fn id(&self) -> InodeId {
        self.id
    }

    #[inline]
    pub fn inode(&self) -> &DiskInode {
        &self.inode
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inode.size as usize / DIR_ENTRY_SIZE
    }

    /// 只剩 `.` 与 `..`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() <= 2
    }

    /// 目录内容的快照
    pub fn entries(&self, store: &BlockStore) -> Result<Vec<DirEntry>> {
        let count = self.len();
        if count > DIR_ENTRIES_PER_BLOCK {
            return Err(FsError::Corrupted(format!(
                "directory {} claims {count} entries",
                self.id
            )));
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let bytes = store.read_at(self.first_block()?, 0, count * DIR_ENTRY_SIZE)?;
        bytes
            .chunks_exact(DIR_ENTRY_SIZE)
            .map(|raw| DirEntry::decode(raw).map_err(FsError::from))
            .collect()
    }

    pub fn find(&self, store: &BlockStore, name: &str) -> Result<Option<DirEntry>> {
        Ok(self
            .entries(store)?
            .into_iter()
            .find(|entry| entry.is_named(name)))
    }

    pub fn append(&mut self, store: &BlockStore, table: &InodeTable, entry: &DirEntry) -> Result<()> {
        if self.len() >= DIR_ENTRIES_PER_BLOCK {
            return Err(FsError::DirectoryFull);
        }

        store.write_record(self.first_block()?, self.inode.size as usize, entry)?;
        self.inode.size += DIR_ENTRY_SIZE as u32;
        self.inode.modified = now();
        table.put(store, self.id, &self.inode)?;
        log::debug!("dir {}: add {:?} -> inode {}", self.id, entry.name(), entry.inode());

        Ok(())
    }

    /// 移除同名项，最后一项补到空出的位置
    pub fn remove(&mut self, store: &BlockStore, table: &InodeTable, name: &str) -> Result<DirEntry> {
        let mut entries = self.entries(store)?;
        let slot = entries
            .iter()
            .position(|entry| entry.is_named(name))
            .ok_or_else(|| FsError::NotFound(name.to_owned()))?;
        let removed = entries.swap_remove(slot);

        let mut bytes = Vec::with_capacity(entries.len() * DIR_ENTRY_SIZE);
        for entry in &entries {
            bytes.extend(entry.encode()?);
        }
        store.write_block(self.first_block()?, &bytes)?;

        self.inode.size -= DIR_ENTRY_SIZE as u32;
        self.inode.modified = now();
        table.put(store, self.id, &self.inode)?;
        log::debug!("dir {}: remove {name:?} (inode {})", self.id, removed.inode());

        Ok(removed)
    }
}

impl Directory {
    fn first_block(&self) -> Result<BlockId> {
        let block = self.inode.block(0);
        if block == BlockId::CHAIN_END {
            return Err(FsError::Corrupted(format!(
                "directory {} has no data block",
                self.id
            )));
        }
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn setup() -> (BlockStore, InodeTable, Directory) {
        let store = testing::store(16);
        let table = InodeTable::new(2);
        let dir = Directory::create(&store, &table, InodeId::new(5), InodeId::ROOT, BlockId::new(3))
            .unwrap();
        (store, table, dir)
    }

    fn names(dir: &Directory, store: &BlockStore) -> Vec<String> {
        dir.entries(store)
            .unwrap()
            .iter()
            .map(|entry| entry.name().into_owned())
            .collect()
    }

    #[test]
    fn new_directory_has_dot_entries() {
        let (store, table, dir) = setup();

        assert_eq!(names(&dir, &store), [".", ".."]);
        assert_eq!(dir.find(&store, ".").unwrap().unwrap().inode(), InodeId::new(5));
        assert_eq!(dir.find(&store, "..").unwrap().unwrap().inode(), InodeId::ROOT);
        assert!(dir.is_empty());

        let reopened = Directory::open(&store, &table, InodeId::new(5)).unwrap();
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn entry_count_follows_size() {
        let (store, table, mut dir) = setup();
        for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
            let entry = DirEntry::new(name, InodeId::new(6 + i as u16)).unwrap();
            dir.append(&store, &table, &entry).unwrap();
        }

        assert_eq!(dir.len(), 5);
        assert_eq!(dir.inode().size, 5 * 16);
        assert!(!dir.is_empty());
        assert_eq!(table.get(&store, dir.id()).unwrap().size, 5 * 16);
    }

    #[test]
    fn remove_moves_last_entry_into_the_hole() {
        let (store, table, mut dir) = setup();
        for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
            let entry = DirEntry::new(name, InodeId::new(6 + i as u16)).unwrap();
            dir.append(&store, &table, &entry).unwrap();
        }

        let removed = dir.remove(&store, &table, "a").unwrap();

        assert_eq!(removed.inode(), InodeId::new(6));
        assert_eq!(names(&dir, &store), [".", "..", "c", "b"]);
        assert!(matches!(
            dir.remove(&store, &table, "a"),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn full_directory() {
        let (store, table, mut dir) = setup();
        for i in 2..DIR_ENTRIES_PER_BLOCK {
            let entry = DirEntry::new(&format!("f{i}"), InodeId::new(7)).unwrap();
            dir.append(&store, &table, &entry).unwrap();
        }

        let one_more = DirEntry::new("extra", InodeId::new(7)).unwrap();
        assert!(matches!(
            dir.append(&store, &table, &one_more),
            Err(FsError::DirectoryFull)
        ));
        assert_eq!(dir.len(), DIR_ENTRIES_PER_BLOCK);
    }

    #[test]
    fn file_is_not_a_directory() {
        let store = testing::store(16);
        let table = InodeTable::new(2);
        table
            .put(&store, InodeId::new(9), &DiskInode::new(FileKind::File, 0))
            .unwrap();

        assert!(matches!(
            Directory::open(&store, &table, InodeId::new(9)),
            Err(FsError::NotADirectory(_))
        ));
    }
}
