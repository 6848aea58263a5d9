use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.header.as_deref() {
        crate::utils::parse_header(raw).map_err(|e| format!("invalid --header '{raw}': {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected fragment or document"
            ));
        }
    }
    if let Some(raw) = args.pedigree_viewer.as_deref() {
        crate::app::PedigreeViewerKind::parse(raw).ok_or_else(|| {
            format!("invalid --pedigree-viewer '{raw}', expected inline or bracket")
        })?;
    }
    if let Some(raw) = args.api_base.as_deref() {
        if !crate::utils::is_http_url(raw) {
            return Err(format!("invalid --api-base '{raw}', expected an http(s) URL"));
        }
    }
    Ok(())
}
