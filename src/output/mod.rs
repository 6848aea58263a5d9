pub mod report;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Bare HTML fragment, as a results container would receive it.
    Fragment,
    /// Standalone HTML page with the stylesheet inlined.
    Document,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "fragment" | "frag" | "partial" => Some(Self::Fragment),
            "document" | "doc" | "html" | "page" => Some(Self::Document),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Document);
    }
    if lower.ends_with(".frag") || lower.ends_with(".inc") {
        return Some(OutputFormat::Fragment);
    }
    None
}

pub fn render(fragment: &str, format: OutputFormat, title: &str) -> Vec<u8> {
    match format {
        OutputFormat::Fragment => {
            let mut out = fragment.as_bytes().to_vec();
            out.push(b'\n');
            out
        }
        OutputFormat::Document => report::render_document(title, fragment),
    }
}

/// Writes rendered output to `path`, or stdout when no path is set. Each run replaces the file.
pub async fn write(path: Option<&str>, rendered: &[u8]) -> Result<(), String> {
    match path {
        Some(path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(rendered)
                .await
                .map_err(|_| "failed to write output file".to_string())?;
            tracing::info!(path, bytes = rendered.len(), "output written");
            Ok(())
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(rendered)
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to write to stdout: {e}"))
        }
    }
}
