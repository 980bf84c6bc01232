use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use send_wrapper::SendWrapper;

use crate::{BLOCK_SIZE, BlockDevice};

/// A disk image living in an ordinary host file.
#[derive(Debug)]
pub struct BlockFile {
    inner: SendWrapper<RefCell<File>>,
    blocks: usize,
}

impl BlockFile {
    /// Wraps an already opened image; the block count is derived from the file length.
    pub fn new(fd: File) -> io::Result<Self> {
        let blocks = (fd.metadata()?.len() / BLOCK_SIZE as u64) as usize;

        Ok(Self {
            inner: SendWrapper::new(RefCell::new(fd)),
            blocks,
        })
    }

    /// Resizes `fd` to exactly `blocks` blocks and wraps it.
    pub fn with_blocks(fd: File, blocks: usize) -> io::Result<Self> {
        fd.set_len((blocks * BLOCK_SIZE) as u64)?;
        Self::new(fd)
    }

    /// Creates a fresh image at `path`.
    ///
    /// Fails with [`io::ErrorKind::AlreadyExists`] when something is already there.
    pub fn create(path: impl AsRef<Path>, blocks: usize) -> io::Result<Self> {
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;
        log::debug!("created image {:?} with {blocks} blocks", path.as_ref());

        Self::with_blocks(fd, blocks)
    }

    /// Opens an existing image at `path` for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())?;

        Self::new(fd)
    }

    fn seek(file: &mut File, block_id: usize, offset: usize) -> io::Result<()> {
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE + offset) as u64))
            .map(|_| ())
    }
}

impl BlockDevice for BlockFile {
    fn block_count(&self) -> usize {
        self.blocks
    }

    fn read_at(&self, block_id: usize, offset: usize, buf: &mut [u8]) -> io::Result<()> {
        let mut file = self.inner.borrow_mut();
        Self::seek(&mut file, block_id, offset)?;
        file.read_exact(buf)
    }

    fn write_at(&self, block_id: usize, offset: usize, buf: &[u8]) -> io::Result<()> {
        let mut file = self.inner.borrow_mut();
        Self::seek(&mut file, block_id, offset)?;
        file.write_all(buf)
    }
}
