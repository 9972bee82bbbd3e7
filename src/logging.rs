use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_DIR: &str = "Logs";
pub const LOG_FILE_NAME: &str = "p2mmbot.log";
pub const MAX_LOG_BYTES: u64 = 32 * 1024 * 1024;
pub const LOG_BACKUPS: usize = 5;

/// A log file that rolls over to `<name>.1` .. `<name>.N` once it grows past `max_bytes`.
///
/// The file is truncated when opened, so every run of the bot starts with a fresh log.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    pub fn create(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(Self {
            path,
            max_bytes,
            backups,
            file,
            written: 0,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups > 0 {
            let oldest = self.backup_path(self.backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Sends every log line to stdout as well as the log file.
struct Tee {
    file: RotatingFile,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A closed console must not stop the file log
        let _ = io::stdout().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stdout().flush();
        self.file.flush()
    }
}

/// Install the global logger. `RUST_LOG` overrides the default `info` filter.
pub fn init(log_dir: impl AsRef<Path>) -> io::Result<()> {
    let file = RotatingFile::create(
        log_dir.as_ref().join(LOG_FILE_NAME),
        MAX_LOG_BYTES,
        LOG_BACKUPS,
    )?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{:<8}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(Tee { file })))
        .try_init()
        .map_err(io::Error::other)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_truncates_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        fs::write(&path, "old run\n").unwrap();

        let mut log = RotatingFile::create(&path, 1024, 2).unwrap();
        log.write_all(b"new run\n").unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new run\n");
    }

    #[test]
    fn test_creates_missing_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Logs").join(LOG_FILE_NAME);

        RotatingFile::create(&path, 1024, 2).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rotates_and_keeps_limited_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        let mut log = RotatingFile::create(&path, 10, 2).unwrap();

        for line in ["aaaaaaaa\n", "bbbbbbbb\n", "cccccccc\n", "dddddddd\n"] {
            log.write_all(line.as_bytes()).unwrap();
        }
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "dddddddd\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("p2mmbot.log.1")).unwrap(),
            "cccccccc\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("p2mmbot.log.2")).unwrap(),
            "bbbbbbbb\n"
        );
        assert!(!dir.path().join("p2mmbot.log.3").exists());
    }

    #[test]
    fn test_init_fails_when_a_logger_is_installed() {
        capture::start();
        let dir = tempfile::tempdir().unwrap();

        let error = init(dir.path()).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_oversized_line_is_written_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        let mut log = RotatingFile::create(&path, 4, 1).unwrap();

        log.write_all(b"longer than the limit\n").unwrap();
        log.flush().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "longer than the limit\n"
        );
    }
}
