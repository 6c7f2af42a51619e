//! Log writer module
//!
//! Thread-safe log output to files or the standard streams. In the stdin
//! transport stdout carries replies, so info lines are routed to stderr
//! there unless a file is configured.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
#[derive(Debug)]
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(path) => Ok(Self::File(Mutex::new(open_log_file(path)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                let mut f = file.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = writeln!(f, "{message}");
            }
        }
    }
}

/// Writer for info/access lines and error/warning lines
#[derive(Debug)]
pub struct LogWriter {
    info: LogTarget,
    error: LogTarget,
}

impl LogWriter {
    fn new(
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
        stdout_reserved: bool,
    ) -> io::Result<Self> {
        let info_fallback = if stdout_reserved {
            LogTarget::Stderr
        } else {
            LogTarget::Stdout
        };
        Ok(Self {
            info: LogTarget::open(access_log_file, info_fallback)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
        })
    }

    pub fn write_info(&self, message: &str) {
        self.info.write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer.
///
/// `stdout_reserved` keeps info lines off stdout when no access log file is set.
pub fn init(
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
    stdout_reserved: bool,
) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file, stdout_reserved)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if initialized
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_target_appends() {
        let dir = std::env::temp_dir().join(format!("text_editor_gateway_logs_{}", std::process::id()));
        let path = dir.join("access.log");
        let path_str = path.to_str().unwrap();

        let writer = LogWriter::new(Some(path_str), None, true).unwrap();
        writer.write_info("first");
        writer.write_info("second");

        let contents = fs::read_to_string(&path).unwrap();
        fs::remove_dir_all(&dir).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn test_stdout_reserved_routes_info_to_stderr() {
        let writer = LogWriter::new(None, None, true).unwrap();
        assert!(matches!(writer.info, LogTarget::Stderr));
        let writer = LogWriter::new(None, None, false).unwrap();
        assert!(matches!(writer.info, LogTarget::Stdout));
    }
}
