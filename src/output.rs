use crate::config::{Config, ConfigError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Where formatted log lines go.
#[derive(Debug)]
pub enum Output {
    Stderr,
    File(File),
    /// File plus a copy on stderr.
    Tee(File),
}

impl Output {
    /// Resolve the destination named by `config`.
    ///
    /// Never fails: if the directory cannot be created or the file cannot be
    /// opened, the result is [`Output::Stderr`] together with the error that
    /// caused the fallback, for the caller to report once.
    pub fn resolve(config: &Config) -> (Output, Option<ConfigError>) {
        let Some(path) = config.output.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
            return (Output::Stderr, None);
        };
        if path.eq_ignore_ascii_case("stderr") {
            return (Output::Stderr, None);
        }
        match open_append(Path::new(path)) {
            Ok(file) if config.verbose => (Output::Tee(file), None),
            Ok(file) => (Output::File(file), None),
            Err(e) => (Output::Stderr, Some(e)),
        }
    }

    #[cfg(test)]
    fn is_stderr(&self) -> bool {
        matches!(self, Output::Stderr)
    }
}

fn open_append(path: &Path) -> Result<File, ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ConfigError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stderr => io::stderr().write(buf),
            Output::File(file) => file.write(buf),
            Output::Tee(file) => {
                file.write_all(buf)?;
                io::stderr().write_all(buf)?;
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stderr => io::stderr().flush(),
            Output::File(file) => file.flush(),
            Output::Tee(file) => {
                file.flush()?;
                io::stderr().flush()
            }
        }
    }
}
