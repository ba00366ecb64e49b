//! Colored terminal output for pack results.
//!
//! Results go to stdout, warnings and errors to stderr.

use crate::pack::{PackedArtifact, ValidationWarning};
use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Output manager for consistent colored terminal output
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    quiet: bool,
}

impl OutputManager {
    /// Create a new output manager. Quiet mode hides everything but errors.
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        emit(Stream::Stdout, "✓", Color::Green, message, false)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        emit(Stream::Stderr, "⚠", Color::Yellow, message, true)
    }

    /// Print a format compatibility warning
    pub fn validation_warning(&self, warning: &ValidationWarning) -> std::io::Result<()> {
        self.warn(&warning.to_string())
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        if emit(Stream::Stderr, "✗", Color::Red, message, true).is_err() {
            // Stderr failed - fallback to stdout as last resort
            println!("✗ {}", message);
        }
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let bufwtr = BufferWriter::stdout(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        writeln!(&mut buffer, "    {}", message)?;
        bufwtr.print(&buffer)
    }

    /// Print the produced artifact with its size and checksum
    pub fn artifact_summary(&self, artifact: &PackedArtifact) -> std::io::Result<()> {
        self.success(&format!("Created {} package", artifact.format))?;
        let size_mb = artifact.size as f64 / 1_048_576.0;
        self.indent(&format!("📦 {} ({:.2} MB)", artifact.path.display(), size_mb))?;
        self.indent(&format!("🔐 SHA256: {}", artifact.checksum))
    }

    /// Print recovery suggestions after an error (always shown)
    pub fn suggestions(&self, suggestions: &[String]) {
        if suggestions.is_empty() {
            return;
        }
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();
        let _ = writeln!(&mut buffer, "\n💡 Recovery suggestions:");
        for suggestion in suggestions {
            let _ = writeln!(&mut buffer, "  • {}", suggestion);
        }
        let _ = bufwtr.print(&buffer);
    }
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new(false)
    }
}

fn emit(stream: Stream, symbol: &str, color: Color, message: &str, tint_message: bool) -> std::io::Result<()> {
    let bufwtr = match stream {
        Stream::Stdout => BufferWriter::stdout(ColorChoice::Auto),
        Stream::Stderr => BufferWriter::stderr(ColorChoice::Auto),
    };
    let mut buffer = bufwtr.buffer();
    buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(&mut buffer, "{}", symbol)?;
    buffer.reset()?;
    if tint_message {
        buffer.set_color(ColorSpec::new().set_fg(Some(color)))?;
    }
    writeln!(&mut buffer, " {}", message)?;
    buffer.reset()?;
    bufwtr.print(&buffer)
}
