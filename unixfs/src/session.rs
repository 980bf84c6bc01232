//! 当前目录及其显示路径

use crate::InodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cwd: InodeId,
    path: String,
}

impl Session {
    pub fn at_root() -> Self {
        Self {
            cwd: InodeId::ROOT,
            path: "/".to_owned(),
        }
    }

    #[inline]
    pub fn cwd(&self) -> InodeId {
        self.cwd
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 进入子目录 `name`
    pub fn enter(&mut self, child: InodeId, name: &str) {
        if !self.path.ends_with('/') {
            self.path.push('/');
        }
        self.path.push_str(name);
        self.cwd = child;
    }

    /// 回到父目录，路径截去最后一段
    pub fn leave(&mut self, parent: InodeId) {
        let cut = self.path.rfind('/').unwrap_or(0);
        self.path.truncate(cut);
        if self.path.is_empty() {
            self.path.push('/');
        }
        self.cwd = parent;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::at_root()
    }
}
