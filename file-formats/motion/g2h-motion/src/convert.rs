//! Batch conversion of generator output into SMPL-X records

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{MotionError, Result};
use crate::generated::GeneratedMotion;
use crate::io::{RecordFormat, is_record_file, read_record};
use crate::smplx::SmplxMotion;

/// Convert one generated clip and write the SMPL-X record to `output`
pub fn convert_file(input: &Path, output: &Path, frame_rate: Option<f32>) -> Result<SmplxMotion> {
    let generated: GeneratedMotion = read_record(input)?;
    let smplx = generated.to_smplx(frame_rate)?;
    smplx.save(output)?;
    debug!(
        "Converted {} -> {} ({} frames)",
        input.display(),
        output.display(),
        smplx.frame_count()
    );
    Ok(smplx)
}

/// A clip that could not be converted
#[derive(Debug)]
pub struct ConversionFailure {
    pub input: PathBuf,
    pub error: MotionError,
}

/// Outcome of a directory conversion
#[derive(Debug, Default)]
pub struct ConversionSummary {
    /// Records written, in walk order
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<ConversionFailure>,
}

impl ConversionSummary {
    pub fn converted(&self) -> usize {
        self.outputs.len()
    }

    pub fn total(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Find every generated record below `input_dir/prompt_folder`
///
/// Paths are returned sorted so that conversion order is stable.
pub fn find_generated(input_dir: &Path, prompt_folder: &str) -> Result<Vec<PathBuf>> {
    let root = input_dir.join(prompt_folder);
    let escaped = glob::Pattern::escape(&root.to_string_lossy());

    let mut files = Vec::new();
    for format in [RecordFormat::Json, RecordFormat::Yaml] {
        for ext in format.extensions() {
            let pattern = format!("{escaped}/**/*.{ext}");
            for entry in glob::glob(&pattern)? {
                let path = entry?;
                if path.is_file() && is_record_file(&path) {
                    files.push(path);
                }
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Convert every generated clip below `input_dir/prompt_folder`
///
/// Output files mirror the input layout relative to the prompt folder.
/// A clip that fails is logged and recorded in the summary; the remaining
/// clips are still converted. `on_progress` is called after each clip with
/// the number processed so far and the total.
pub fn convert_directory(
    input_dir: &Path,
    prompt_folder: &str,
    output_dir: &Path,
    frame_rate: Option<f32>,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<ConversionSummary> {
    let root = input_dir.join(prompt_folder);
    let files = find_generated(input_dir, prompt_folder)?;
    std::fs::create_dir_all(output_dir)?;

    info!(
        "Converting {} generated clips from {}",
        files.len(),
        root.display()
    );

    let mut summary = ConversionSummary::default();
    for (done, input) in files.iter().enumerate() {
        let relative = input.strip_prefix(&root).unwrap_or(input.as_path());
        let output = output_dir.join(relative);

        match convert_file(input, &output, frame_rate) {
            Ok(_) => summary.outputs.push(output),
            Err(error) => {
                warn!("Failed to convert {}: {}", input.display(), error);
                summary.failures.push(ConversionFailure {
                    input: input.clone(),
                    error,
                });
            }
        }
        on_progress(done + 1, files.len());
    }

    info!(
        "Converted {}/{} clips into {}",
        summary.converted(),
        summary.total(),
        output_dir.display()
    );
    Ok(summary)
}
