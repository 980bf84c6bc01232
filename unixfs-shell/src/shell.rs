use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use typed_bytesize::ByteSizeIec;
use unixfs::{FileKind, FileSystem, FsError};

use crate::cli::Command;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("no filesystem open, run `initfs` or `openfs` first")]
    NotMounted,

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("output: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Default)]
pub struct Shell {
    fs: Option<FileSystem>,
    image: Option<PathBuf>,
}

impl Shell {
    pub fn prompt(&self) -> String {
        match (&self.image, &self.fs) {
            (Some(image), Some(fs)) => format!("{}@{}>>> ", image.display(), fs.cwd()),
            _ => "unixfs>>> ".to_owned(),
        }
    }

    /// Closes the current image before opening `path`, which may be the same file
    pub fn open(&mut self, path: &Path) -> Result<(), ShellError> {
        self.close()?;
        let fs = FileSystem::open(path)?;
        self.install(fs, path);
        Ok(())
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow, ShellError> {
        match command {
            Command::Initfs {
                path,
                blocks,
                inodes,
            } => {
                if path.exists() {
                    writeln!(out, "{} exists, opening it", path.display())?;
                    self.open(&path)?;
                } else {
                    let fs = FileSystem::initialize(&path, blocks, inodes)?;
                    self.close()?;
                    self.install(fs, &path);
                }
            }
            Command::Openfs { path } => self.open(&path)?,
            Command::Ls => {
                for name in self.fs()?.list()? {
                    writeln!(out, "{name}")?;
                }
            }
            Command::Mkdir { name } => {
                self.fs_mut()?.make_dir(&name)?;
            }
            Command::Cd { name } => self.fs_mut()?.change_dir(&name)?,
            Command::Pwd => writeln!(out, "{}", self.fs()?.cwd())?,
            Command::Cpin { host, name } => {
                self.fs_mut()?.copy_in(&host, &name)?;
            }
            Command::Cpout { name, host } => {
                let bytes = self.fs()?.copy_out(&name, &host)?;
                log::info!("{name} -> {}: {bytes} bytes", host.display());
            }
            Command::Rm { name } => self.fs_mut()?.remove_file(&name)?,
            Command::Rmdir { name } => self.fs_mut()?.remove_dir(&name)?,
            Command::Stat { name } => {
                let stat = self.fs()?.stat(&name)?;
                let kind = match stat.kind {
                    FileKind::File => "file",
                    FileKind::Directory => "directory",
                };
                writeln!(out, "inode:    {}", stat.inode)?;
                writeln!(out, "kind:     {kind}")?;
                writeln!(
                    out,
                    "size:     {} ({} bytes)",
                    ByteSizeIec(u64::from(stat.size)),
                    stat.size
                )?;
                writeln!(out, "blocks:   {}", stat.blocks)?;
                writeln!(out, "links:    {}", stat.links)?;
                writeln!(out, "uid/gid:  {}/{}", stat.uid, stat.gid)?;
                writeln!(out, "accessed: {}", stat.accessed)?;
                writeln!(out, "modified: {}", stat.modified)?;
            }
            Command::Sync => self.fs_mut()?.sync()?,
            Command::Quit => {
                self.close()?;
                return Ok(Flow::Quit);
            }
        }

        Ok(Flow::Continue)
    }

    /// Syncs and closes the current image, if any
    pub fn close(&mut self) -> Result<(), ShellError> {
        self.image = None;
        if let Some(fs) = self.fs.take() {
            fs.close()?;
        }
        Ok(())
    }
}

impl Shell {
    fn fs(&self) -> Result<&FileSystem, ShellError> {
        self.fs.as_ref().ok_or(ShellError::NotMounted)
    }

    fn fs_mut(&mut self) -> Result<&mut FileSystem, ShellError> {
        self.fs.as_mut().ok_or(ShellError::NotMounted)
    }

    fn install(&mut self, fs: FileSystem, path: &Path) {
        log::info!("using image {}", path.display());
        self.fs = Some(fs);
        self.image = Some(path.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Line;

    fn run(shell: &mut Shell, line: &str) -> Result<(Flow, String), ShellError> {
        let command = Line::try_parse_from(line.split_whitespace()).unwrap().command;
        let mut out = Vec::new();
        let flow = shell.execute(command, &mut out)?;
        Ok((flow, String::from_utf8(out).unwrap()))
    }

    fn output(shell: &mut Shell, line: &str) -> String {
        run(shell, line).unwrap().1
    }

    #[test]
    fn aliases() {
        let parse = |line: &str| Line::try_parse_from(line.split_whitespace()).unwrap().command;
        assert_eq!(parse("remdir a"), Command::Rmdir { name: "a".to_owned() });
        assert_eq!(parse("q"), Command::Quit);
        assert_eq!(parse("exit"), Command::Quit);
        assert!(Line::try_parse_from(["bogus"]).is_err());
        assert!(Line::try_parse_from(["mkdir"]).is_err());
    }

    #[test]
    fn commands_need_an_image() {
        let mut shell = Shell::default();
        assert!(matches!(run(&mut shell, "ls"), Err(ShellError::NotMounted)));
        assert_eq!(shell.prompt(), "unixfs>>> ");
    }

    #[test]
    fn session() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("fs.img");
        let host = dir.path().join("host.txt");
        std::fs::write(&host, vec![b'x'; 2048]).unwrap();
        let mut shell = Shell::default();

        output(&mut shell, &format!("initfs {} 1024 64", image.display()));
        output(&mut shell, "mkdir a");
        output(&mut shell, "cd a");
        assert_eq!(output(&mut shell, "pwd"), "/a\n");
        assert_eq!(shell.prompt(), format!("{}@/a>>> ", image.display()));

        output(&mut shell, &format!("cpin {} t", host.display()));
        assert_eq!(output(&mut shell, "ls"), ".\n..\nt\n");
        let stat = output(&mut shell, "stat t");
        assert!(stat.contains("kind:     file"));
        assert!(stat.contains("(2048 bytes)"));
        assert!(stat.contains("blocks:   2"));

        assert!(matches!(
            run(&mut shell, "rmdir t"),
            Err(ShellError::Fs(FsError::NotADirectory(_)))
        ));
        assert_eq!(run(&mut shell, "quit").unwrap().0, Flow::Quit);

        // an existing image is opened, not reformatted
        let reopened = output(&mut shell, &format!("initfs {} 1024 64", image.display()));
        assert!(reopened.contains("opening"));
        output(&mut shell, "cd a");
        assert_eq!(output(&mut shell, "ls"), ".\n..\nt\n");
    }

    #[test]
    fn reopening_the_open_image_keeps_allocations() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("fs.img");
        let host_a = dir.path().join("a.txt");
        let host_b = dir.path().join("b.txt");
        let out = dir.path().join("out.txt");
        std::fs::write(&host_a, vec![b'A'; 1024]).unwrap();
        std::fs::write(&host_b, vec![b'B'; 1024]).unwrap();
        let mut shell = Shell::default();

        output(&mut shell, &format!("initfs {} 256 32", image.display()));
        output(&mut shell, &format!("cpin {} a", host_a.display()));
        output(&mut shell, &format!("openfs {}", image.display()));
        output(&mut shell, &format!("cpin {} b", host_b.display()));
        output(&mut shell, &format!("cpout a {}", out.display()));

        assert_eq!(std::fs::read(&out).unwrap(), vec![b'A'; 1024]);
        assert_eq!(output(&mut shell, "ls"), ".\n..\na\nb\n");

        // initfs on the same path reopens it the same way
        output(&mut shell, &format!("initfs {} 256 32", image.display()));
        output(&mut shell, &format!("cpin {} c", host_b.display()));
        output(&mut shell, &format!("cpout a {}", out.display()));
        assert_eq!(std::fs::read(&out).unwrap(), vec![b'A'; 1024]);
    }
}
