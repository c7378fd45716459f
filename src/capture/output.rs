use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::types::{Activity, SensorKind};

/// Resolved file paths for one session, one per recorded stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub directory: PathBuf,
    paths: [PathBuf; 3],
}

impl OutputFiles {
    /// `<root>/<activity_code>/{linear,gravity,gyro}.csv`
    pub fn resolve(root: &Path, activity: Activity) -> Self {
        let directory = root.join(activity.code().to_string());
        let paths = SensorKind::RECORDED.map(|kind| {
            // RECORDED kinds always carry a file name
            directory.join(kind.file_name().unwrap_or_default())
        });
        Self { directory, paths }
    }

    /// Creates the activity directory if it does not exist yet.
    pub fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.directory)
    }

    pub fn path_for(&self, kind: SensorKind) -> Option<&Path> {
        kind.stream_index().map(|i| self.paths[i].as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SensorKind, &Path)> {
        SensorKind::RECORDED
            .into_iter()
            .zip(self.paths.iter().map(PathBuf::as_path))
    }
}

/// Opens `path` in append mode, writes `line`, and closes it again.
pub fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

/// Outcome of trimming one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimReport {
    pub lines_removed: usize,
    pub bytes_kept: u64,
}

const TRIM_CHUNK: usize = 64 * 1024;

/// Drops the last `count` lines of `path` by truncating at the start of the first dropped line,
/// so what remains is a byte-exact prefix. Files with `count` lines or fewer end up empty.
/// Only the tail of the file is read. Returns `None` when the file does not exist.
pub fn trim_tail_lines(path: &Path, count: usize) -> io::Result<Option<TrimReport>> {
    let mut file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let len = file.metadata()?.len();
    let (bytes_kept, lines_removed) = find_tail_cut(&mut file, len, count, TRIM_CHUNK)?;
    if bytes_kept < len {
        file.set_len(bytes_kept)?;
    }

    Ok(Some(TrimReport {
        lines_removed,
        bytes_kept,
    }))
}

/// Walks backwards from `len` in `chunk_size` reads and returns the byte offset where the
/// `count`-th line from the end starts, plus the number of lines behind that offset.
/// An unterminated last line still counts as a line.
fn find_tail_cut<R: Read + Seek>(
    reader: &mut R,
    len: u64,
    count: usize,
    chunk_size: usize,
) -> io::Result<(u64, usize)> {
    if count == 0 || len == 0 {
        return Ok((len, 0));
    }

    // the final line's own terminator does not start another line
    let mut last = [0u8; 1];
    reader.seek(SeekFrom::Start(len - 1))?;
    reader.read_exact(&mut last)?;
    let mut pos = if last[0] == b'\n' { len - 1 } else { len };

    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut newlines = 0usize;
    while pos > 0 {
        let chunk = usize::try_from(pos).map_or(buf.len(), |p| p.min(buf.len()));
        let start = pos - chunk as u64;
        reader.seek(SeekFrom::Start(start))?;
        reader.read_exact(&mut buf[..chunk])?;

        for (i, byte) in buf[..chunk].iter().enumerate().rev() {
            if *byte == b'\n' {
                newlines += 1;
                if newlines == count {
                    return Ok((start + i as u64 + 1, count));
                }
            }
        }
        pos = start;
    }

    Ok((0, newlines + 1))
}
