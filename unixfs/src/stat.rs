use crate::InodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

/// 文件系统项的元信息快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub inode: InodeId,
    pub kind: FileKind,
    pub size: u32,
    /// 占用的数据块数
    pub blocks: usize,
    pub links: u8,
    pub uid: u8,
    pub gid: u8,
    /// 秒级 Unix 时间
    pub accessed: u32,
    pub modified: u32,
}

/// 当前的秒级 Unix 时间，超出 u32 时截断
pub(crate) fn now() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as u32)
}
