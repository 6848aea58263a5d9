use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use reqwest::header::{HeaderName, HeaderValue};

use crate::api::{ApiClient, HttpTransport, HttpTransportConfig, Transport};
use crate::bulk::BulkOptions;
use crate::cli::args::{CliArgs, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::controller::{ControllerOptions, Rendered, View, ViewController};
use crate::output::{self, OutputFormat};
use crate::render::BracketViewer;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

fn print_banner() {
    const BANNER: &str = r#"
                 __    __           __
    ____  ____ _/ /___/ /___  _____/ /__
   / __ \/ __ `/ / __  / __ \/ ___/ //_/
  / /_/ / /_/ / / /_/ / /_/ / /__/ ,<
 / .___/\__,_/_/\__,_/\____/\___/_/|_|
/_/
"#;
    eprint!("{}", BANNER);
    eprintln!();
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PedigreeViewerKind {
    Inline,
    Bracket,
}

impl PedigreeViewerKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "inline" | "table" => Some(Self::Inline),
            "bracket" | "tree" => Some(Self::Bracket),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub command: Command,
    pub config_path: Option<PathBuf>,
    pub api_base: String,
    pub timeout: usize,
    pub proxy: Option<String>,
    pub header: Option<(HeaderName, HeaderValue)>,
    pub delay: Duration,
    pub error_preview: usize,
    pub profile_base: String,
    pub pedigree_viewer: PedigreeViewerKind,
    pub output: Option<String>,
    pub output_format: OutputFormat,
    pub no_color: bool,
    pub quiet: bool,
    pub yes: bool,
    pub verbose: u8,
}

impl RunConfig {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            bulk: BulkOptions {
                delay: self.delay,
                error_preview: self.error_preview,
            },
            progress: !self.quiet,
            profile_base: self.profile_base.clone(),
        }
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            base_url: self.api_base.clone(),
            timeout: self.timeout,
            proxy: self.proxy.clone(),
            header: self.header.clone(),
        }
    }
}

pub fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };
    let quiet = args.quiet || cfg.quiet.unwrap_or(false);

    let api_base = args
        .api_base
        .or(cfg.api_base)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    if !crate::utils::is_http_url(&api_base) {
        return Err(format!("invalid api_base '{api_base}', expected an http(s) URL"));
    }
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(30);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }

    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let header = match args.header.or(cfg.header) {
        Some(raw) if !raw.trim().is_empty() => Some(
            crate::utils::parse_header(&raw).map_err(|e| format!("invalid header '{raw}': {e}"))?,
        ),
        _ => None,
    };

    let delay = Duration::from_millis(args.delay_ms.or(cfg.delay_ms).unwrap_or(1000));
    let error_preview = args.error_preview.or(cfg.error_preview).unwrap_or(5);
    let profile_base = args
        .profile_base
        .or(cfg.profile_base)
        .unwrap_or_else(|| crate::utils::DEFAULT_PROFILE_BASE.to_string());

    let pedigree_viewer = match args.pedigree_viewer.or(cfg.pedigree_viewer) {
        Some(raw) => PedigreeViewerKind::parse(&raw)
            .ok_or_else(|| format!("invalid pedigree viewer '{raw}', expected inline or bracket"))?,
        None => PedigreeViewerKind::Inline,
    };

    let output = args
        .output
        .or(cfg.output)
        .filter(|p| !p.trim().is_empty())
        .map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw).ok_or_else(|| {
            format!("invalid output format '{raw}', expected fragment or document")
        })?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Fragment),
    };

    Ok(RunConfig {
        command: args.command,
        config_path: args.config.map(|p| config::expand_tilde(&p)),
        api_base,
        timeout,
        proxy,
        header,
        delay,
        error_preview,
        profile_base,
        pedigree_viewer,
        output,
        output_format,
        no_color,
        quiet,
        yes: args.yes,
        verbose: args.verbose,
    })
}

pub fn page_title(command: &Command) -> String {
    match command {
        Command::Search { .. } => "Race search".to_string(),
        Command::Races => "Saved races".to_string(),
        Command::Entries { race_id } => format!("Race {race_id} entries"),
        Command::Horse { horse_id } | Command::HorseProfile { horse_id } => {
            format!("Horse {}", crate::utils::clean_horse_name(horse_id))
        }
        Command::Horses => "Horses".to_string(),
        _ => "Paddock".to_string(),
    }
}

/// Runs one API-backed command. `None` for commands that need no API call.
pub async fn dispatch<T: Transport>(
    controller: &ViewController<T>,
    command: &Command,
) -> Option<Rendered> {
    let rendered = match command {
        Command::Search { url } => {
            controller
                .search_races(url.as_deref().unwrap_or_default())
                .await
        }
        Command::Races => controller.saved_races().await,
        Command::Entries { race_id } => controller.race_entries(race_id).await,
        Command::ScrapeHorses { race_id } => controller.scrape_race_horses(race_id).await,
        Command::ScrapeAllHorses { race_ids } => {
            let ids: Vec<String> = race_ids
                .iter()
                .flat_map(|raw| crate::utils::parse_ids_csv(raw))
                .collect();
            controller.scrape_all_race_horses(&ids).await
        }
        Command::CheckScratches { race_id } => controller.check_scratches(race_id).await,
        Command::CheckAllScratches => controller.check_all_scratches().await,
        Command::Horse { horse_id } => controller.scrape_horse(horse_id).await,
        Command::HorseProfile { horse_id } => controller.scrape_horse_profile(horse_id).await,
        Command::Horses => controller.list_horses().await,
        Command::PedigreeMissing => controller.check_missing_pedigree().await,
        Command::UpdateHorses => controller.check_and_update_horses().await,
        Command::NullHorses => controller.scrape_null_horses().await,
        Command::Copy { .. } | Command::InitConfig => return None,
    };
    Some(rendered)
}

async fn emit(run: &RunConfig, rendered: &Rendered) -> Result<(), String> {
    match &rendered.view {
        View::Fragment(html) => {
            let bytes = output::render(html, run.output_format, &page_title(&run.command));
            output::write(run.output.as_deref(), &bytes).await?;
            if let Some(path) = run.output.as_deref() {
                if !run.quiet {
                    format_kv_line("Output", path);
                }
            }
            Ok(())
        }
        View::Alert(text) => {
            if rendered.ok {
                println!("{text}");
            } else {
                println!("{}", text.red());
            }
            Ok(())
        }
    }
}

fn init_config(run: &RunConfig) -> Result<bool, String> {
    let path = match run.config_path.clone() {
        Some(path) => path,
        None => config::default_config_path()
            .ok_or_else(|| "could not determine home directory".to_string())?,
    };
    if config::ensure_default_config_file(&path)? {
        println!("{} {}", "✅ Wrote config:".green(), path.display());
    } else {
        println!("{} {}", "Config already exists:".yellow(), path.display());
    }
    Ok(true)
}

pub async fn run_async(run: RunConfig) -> Result<bool, String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    match &run.command {
        Command::InitConfig => return init_config(&run),
        Command::Copy { horse_id } => {
            return match crate::clipboard::copy_horse_id(horse_id) {
                Ok(()) => Ok(true),
                Err(msg) => {
                    eprintln!("{}", msg.red());
                    Ok(false)
                }
            };
        }
        _ => {}
    }

    if !run.quiet && std::io::stderr().is_terminal() {
        print_banner();
        format_kv_line("API", &run.api_base);
        if run.command.is_bulk() {
            format_kv_line("Delay", &format!("{}ms", run.delay.as_millis()));
        }
        eprintln!();
    }

    let transport = HttpTransport::new(run.transport_config()).map_err(|e| e.to_string())?;
    let mut controller = ViewController::new(ApiClient::new(transport), run.controller_options());
    if run.pedigree_viewer == PedigreeViewerKind::Bracket {
        controller = controller.with_viewer(Box::new(BracketViewer));
    }

    tracing::info!(command = ?run.command, api = %run.api_base, "running");
    let Some(rendered) = dispatch(&controller, &run.command).await else {
        return Ok(true);
    };
    emit(&run, &rendered).await?;
    Ok(rendered.ok)
}

fn confirm(prompt: &str) -> Result<bool, String> {
    if !std::io::stdin().is_terminal() {
        return Err(format!(
            "{prompt}\nrefusing to run a bulk operation without a terminal; pass --yes to confirm"
        ));
    }
    eprint!("{} [y/N] ", prompt.yellow());
    std::io::stderr()
        .flush()
        .map_err(|e| format!("failed to write prompt: {e}"))?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("failed to read answer: {e}"))?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Parses arguments, loads config and runs the command. `Ok(false)` means the
/// command ran but rendered a failure.
pub fn run_cli() -> Result<bool, String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(true);
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    let cfg = match user_config_path.as_ref() {
        // init-config creates the file it points to
        Some(path) if args.command == Command::InitConfig => config::load_config(path, true)?,
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    crate::logging::init(run.verbose, run.no_color);

    if let Some(prompt) = run.command.confirm_prompt() {
        if !run.yes && !confirm(prompt)? {
            eprintln!("Cancelled.");
            return Ok(true);
        }
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
