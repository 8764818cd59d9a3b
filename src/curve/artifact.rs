use std::fs::File;
use std::path::{Path, PathBuf};

use crate::curve::model::{AnimationCurve, AnimationFrame, TIME_CODE_COLUMN};
use crate::foundation::error::{FacecastError, FacecastResult};

/// Load a curve artifact.
///
/// Columns with an empty header are dropped. Unparseable time codes read as `0.0`; unparseable
/// or missing weight cells are kept as `None` for the driver to zero.
#[tracing::instrument]
pub fn read_curve(path: &Path) -> FacecastResult<AnimationCurve> {
    let file = File::open(path)
        .map_err(|e| FacecastError::configuration(format!("open curve '{}': {e}", path.display())))?;
    read_curve_from(file).map_err(|e| match e {
        FacecastError::MalformedFrame(msg) => {
            FacecastError::malformed(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Load a curve from any CSV reader.
pub fn read_curve_from<R: std::io::Read>(r: R) -> FacecastResult<AnimationCurve> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(r);

    let headers = reader
        .headers()
        .map_err(|e| FacecastError::malformed(format!("curve header: {e}")))?
        .clone();

    let mut time_col = None;
    let mut weight_cols = Vec::new();
    let mut channels = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        if name == TIME_CODE_COLUMN {
            time_col = Some(idx);
        } else if !name.is_empty() {
            weight_cols.push(idx);
            channels.push(name.to_string());
        }
    }
    if time_col.is_none() {
        tracing::warn!("curve has no '{TIME_CODE_COLUMN}' column, every row reads as 0s");
    }

    let mut curve = AnimationCurve::new(channels)?;
    for record in reader.records() {
        let record = record.map_err(|e| FacecastError::malformed(format!("curve row: {e}")))?;
        let time_code = time_col
            .and_then(|i| record.get(i))
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);
        let weights = weight_cols
            .iter()
            .map(|&i| record.get(i).and_then(|v| v.parse::<f64>().ok()))
            .collect();
        curve.push(AnimationFrame { time_code, weights })?;
    }
    Ok(curve)
}

/// Write a whole curve to `path` in one go.
pub fn write_curve(path: &Path, curve: &AnimationCurve) -> FacecastResult<()> {
    let mut w = CurveWriter::create(path, curve.channels())?;
    for frame in curve.frames() {
        w.append(frame)?;
    }
    w.commit()?;
    Ok(())
}

/// Incremental curve artifact writer.
///
/// Rows go to `<path>.partial` and are flushed as they arrive. [`CurveWriter::commit`] moves the
/// file into place; dropping an uncommitted writer deletes it, so a failed stream never leaves an
/// artifact behind.
#[derive(Debug)]
pub struct CurveWriter {
    final_path: PathBuf,
    partial_path: PathBuf,
    writer: Option<csv::Writer<File>>,
    width: usize,
    rows: usize,
}

impl CurveWriter {
    /// Start a new artifact with the given channel columns.
    pub fn create(path: &Path, channels: &[String]) -> FacecastResult<Self> {
        crate::encode::mux::ensure_parent_dir(path)?;
        let mut partial = path.as_os_str().to_owned();
        partial.push(".partial");
        let partial_path = PathBuf::from(partial);

        let file = File::create(&partial_path).map_err(|e| {
            FacecastError::stream(format!(
                "create curve artifact '{}': {e}",
                partial_path.display()
            ))
        })?;
        let mut writer = csv::Writer::from_writer(file);
        let header = std::iter::once(TIME_CODE_COLUMN).chain(channels.iter().map(String::as_str));
        writer
            .write_record(header)
            .map_err(|e| FacecastError::stream(format!("write curve header: {e}")))?;

        Ok(Self {
            final_path: path.to_path_buf(),
            partial_path,
            writer: Some(writer),
            width: channels.len(),
            rows: 0,
        })
    }

    /// Append and flush one row.
    pub fn append(&mut self, frame: &AnimationFrame) -> FacecastResult<()> {
        if frame.weights.len() != self.width {
            return Err(FacecastError::malformed(format!(
                "row has {} weights, artifact has {} columns",
                frame.weights.len(),
                self.width
            )));
        }
        let Some(writer) = self.writer.as_mut() else {
            return Err(FacecastError::stream("curve artifact already committed"));
        };
        let mut record = Vec::with_capacity(self.width + 1);
        record.push(frame.time_code.to_string());
        record.extend(
            frame
                .weights
                .iter()
                .map(|w| w.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer
            .write_record(&record)
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|e| FacecastError::stream(format!("write curve row: {e}")))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Finish the artifact and move it to its final path.
    ///
    /// A failed commit removes `<path>.partial` like a drop does.
    pub fn commit(mut self) -> FacecastResult<PathBuf> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| FacecastError::stream("curve artifact already committed"))?;
        if let Err(e) = persist(writer, &self.partial_path, &self.final_path) {
            self.discard();
            return Err(e);
        }
        Ok(self.final_path.clone())
    }

    fn discard(&self) {
        match std::fs::remove_file(&self.partial_path) {
            Ok(()) => {
                tracing::debug!(path = %self.partial_path.display(), rows = self.rows, "discarded partial curve");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.partial_path.display(), error = %e, "could not discard partial curve");
            }
        }
    }
}

fn persist(writer: csv::Writer<File>, partial: &Path, target: &Path) -> FacecastResult<()> {
    let file = writer
        .into_inner()
        .map_err(|e| FacecastError::stream(format!("flush curve artifact: {e}")))?;
    file.sync_all()
        .map_err(|e| FacecastError::stream(format!("sync curve artifact: {e}")))?;
    drop(file);
    std::fs::rename(partial, target).map_err(|e| {
        FacecastError::stream(format!(
            "move curve artifact into '{}': {e}",
            target.display()
        ))
    })
}

impl Drop for CurveWriter {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            self.discard();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/curve/artifact.rs"]
mod tests;
