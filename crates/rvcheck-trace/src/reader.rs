use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::record::TraceBuilder;
use crate::{Result, Trace, TraceError};

/// Open a log for buffered reading.
///
/// Files with a `.zst` extension are decompressed on the fly.
///
/// # Errors
///
/// Returns [`TraceError::MissingFile`] if `path` does not exist, or
/// [`TraceError::Io`] if it cannot be opened or decoded.
pub fn open_log(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    if path.extension().and_then(|e| e.to_str()) == Some("zst") {
        let decoder = zstd::stream::Decoder::new(file)?;
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn open_error(path: &Path, err: io::Error) -> TraceError {
    if err.kind() == io::ErrorKind::NotFound {
        TraceError::MissingFile {
            path: path.to_path_buf(),
        }
    } else {
        TraceError::Io(err)
    }
}

/// Call `f` with every line of `reader`, without the line terminator.
///
/// Lines are decoded lossily so a stray non-UTF-8 byte in a simulator log does
/// not abort the run.
///
/// # Errors
///
/// Propagates read errors from `reader` and the first error returned by `f`.
pub fn for_each_line<R, F>(mut reader: R, mut f: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(&str) -> io::Result<()>,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        f(&String::from_utf8_lossy(&buf))?;
    }
}

/// Read a whole trace from `reader`.
///
/// # Errors
///
/// Propagates read errors from `reader`.
pub fn read_trace_from<R: BufRead>(reader: R) -> io::Result<Trace> {
    let mut builder = TraceBuilder::default();
    for_each_line(reader, |line| {
        builder.push_line(line);
        Ok(())
    })?;
    Ok(builder.finish())
}

/// Read and normalize the commit log at `path`.
///
/// # Errors
///
/// Returns [`TraceError::MissingFile`] if `path` does not exist, or
/// [`TraceError::Io`] on any other read failure.
pub fn read_trace(path: &Path) -> Result<Trace> {
    let trace = read_trace_from(open_log(path)?)?;
    debug!(
        path = %path.display(),
        records = trace.len(),
        skipped = trace.skipped_lines(),
        "read trace"
    );
    Ok(trace)
}
