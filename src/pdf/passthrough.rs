//! Verbatim copy of the input when it cannot be processed safely

use std::path::Path;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Error, Result};
use crate::pdf::strip::PassthroughReason;

/// Copy `input_path` to `output_path` byte for byte, reporting `reason`
///
/// The diagnostic is emitted before the copy is attempted. A failed copy is
/// wrapped in [`Error::Passthrough`].
pub fn pass_through(
    input_path: &Path,
    output_path: &Path,
    reason: PassthroughReason,
    sink: &dyn DiagnosticSink,
) -> Result<PassthroughReason> {
    sink.emit(&Diagnostic::PassedThrough { reason: reason.clone() });

    std::fs::copy(input_path, output_path).map_err(|source| Error::Passthrough {
        input: input_path.to_path_buf(),
        output: output_path.to_path_buf(),
        source,
    })?;

    Ok(reason)
}
