//! Locating and invoking the external programs the pipeline shells out to.

use crate::error::{ConversionError, Result};
use async_process::{Command, Output};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// An external program, with the package that provides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    /// Executable name looked up in PATH.
    pub name: &'static str,
    /// Alternative executable names, tried after `name`.
    pub aliases: &'static [&'static str],
    /// Package to install when the tool is missing.
    pub package: &'static str,
    /// Absolute locations checked before PATH.
    pub candidates: &'static [&'static str],
}

pub const SOFFICE: Tool = Tool {
    name: "soffice",
    aliases: &["libreoffice"],
    package: "LibreOffice",
    candidates: &[
        // macOS
        "/Applications/LibreOffice.app/Contents/MacOS/soffice",
        // Linux
        "/usr/bin/soffice",
        "/usr/lib/libreoffice/program/soffice",
        "/opt/libreoffice/program/soffice",
        // Snap (Ubuntu)
        "/snap/bin/libreoffice.soffice",
    ],
};

pub const PDFINFO: Tool = Tool {
    name: "pdfinfo",
    aliases: &[],
    package: "poppler-utils",
    candidates: &[],
};

pub const PDFTOPPM: Tool = Tool {
    name: "pdftoppm",
    aliases: &[],
    package: "poppler-utils",
    candidates: &[],
};

impl Tool {
    fn not_found(&self) -> ConversionError {
        ConversionError::ToolNotFound {
            tool: self.name,
            package: self.package,
        }
    }

    /// Resolve the binary: an explicit path must exist, otherwise try the
    /// known install locations and then PATH.
    pub fn locate(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(self.not_found());
        }

        for candidate in self.candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Ok(path);
            }
        }

        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| self.not_found())
    }

    /// Whether the tool can be found without an explicit path.
    pub fn is_available(&self) -> bool {
        self.locate(None).is_ok()
    }
}

/// Run a prepared command to completion, capturing its output. A non-zero exit
/// becomes [`ConversionError::SubprocessFailed`] carrying stderr.
pub async fn run_checked(program: &str, cmd: &mut Command) -> Result<Output> {
    debug!("Running {} {:?}", program, cmd);

    let output = cmd
        .output()
        .await
        .map_err(|source| ConversionError::ProcessStartFailed {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!("{} failed with {}: {}", program, output.status, stderr);
        return Err(ConversionError::SubprocessFailed {
            program: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(output)
}
