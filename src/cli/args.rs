use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "paddock",
    version,
    about = "horse-racing scrape API client",
    long_about = "Paddock drives a horse-racing scrape API and renders what it returns as HTML fragments or plain-text summaries.\n\nExamples:\n  paddock search https://www.example.com/entries/today\n  paddock races -o races.html\n  paddock horse Silver_Arrow_12 --pedigree-viewer bracket\n  paddock scrape-all-horses --yes --delay 500\n\nTip: Use `paddock init-config` to write ~/.paddock/config.yml and keep invocations short."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv). RUST_LOG takes precedence."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        global = true,
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'q',
        long = "qt",
        visible_alias = "quiet",
        global = true,
        help_heading = "Output",
        help = "Hide progress bars and spinners."
    )]
    pub quiet: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        global = true,
        help_heading = "Output",
        help = "Write the rendered HTML to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        global = true,
        help_heading = "Output",
        help = "HTML output form: fragment or document (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "pv",
        visible_alias = "pedigree-viewer",
        value_name = "NAME",
        global = true,
        help_heading = "Output",
        help = "Pedigree rendering: inline (table) or bracket."
    )]
    pub pedigree_viewer: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.paddock/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'b',
        long = "api",
        visible_alias = "api-base",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "Base URL of the scrape API (default http://127.0.0.1:5000)."
    )]
    pub api_base: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'H',
        long = "hdr",
        visible_alias = "header",
        value_name = "HEADER",
        global = true,
        help_heading = "HTTP",
        help = "Add a header to all requests (format: 'Key: Value')."
    )]
    pub header: Option<String>,

    #[arg(
        long = "pb",
        visible_alias = "profile-base",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "Base of horse profile URLs sent to scrape-horse-profile."
    )]
    pub profile_base: Option<String>,

    #[arg(
        short = 'd',
        long = "dl",
        visible_alias = "delay",
        value_name = "MS",
        global = true,
        help_heading = "Bulk",
        help = "Pause between bulk requests in milliseconds."
    )]
    pub delay_ms: Option<u64>,

    #[arg(
        long = "ep",
        visible_alias = "error-preview",
        value_name = "N",
        global = true,
        help_heading = "Bulk",
        help = "Number of bulk errors listed before the rest are counted."
    )]
    pub error_preview: Option<usize>,

    #[arg(
        short = 'y',
        long = "yes",
        visible_alias = "assume-yes",
        global = true,
        help_heading = "Bulk",
        help = "Skip the confirmation prompt of bulk operations."
    )]
    pub yes: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrape a race-card URL and render the races found on it.
    #[command(visible_alias = "s")]
    Search {
        #[arg(value_name = "URL")]
        url: Option<String>,
    },
    /// List saved races with their entries.
    Races,
    /// Show the entries of one saved race.
    Entries {
        #[arg(value_name = "RACE_ID")]
        race_id: String,
    },
    /// Scrape the horses running in one race.
    ScrapeHorses {
        #[arg(value_name = "RACE_ID")]
        race_id: String,
    },
    /// Scrape the horses of several races, one race at a time (all saved races when none given).
    ScrapeAllHorses {
        #[arg(value_name = "RACE_ID", num_args = 0..)]
        race_ids: Vec<String>,
    },
    /// Re-check late scratches for one race.
    CheckScratches {
        #[arg(value_name = "RACE_ID")]
        race_id: String,
    },
    /// Re-check late scratches for every saved race.
    CheckAllScratches,
    /// Scrape one horse and render its profile and pedigree.
    Horse {
        #[arg(value_name = "HORSE_ID")]
        horse_id: String,
    },
    /// Scrape one horse through its profile URL.
    HorseProfile {
        #[arg(value_name = "HORSE_ID")]
        horse_id: String,
    },
    /// List stored horses.
    Horses,
    /// Add horses referenced by pedigrees but missing from the horses table.
    PedigreeMissing,
    /// Re-scrape horses whose data is stale.
    UpdateHorses,
    /// Scrape horses whose profile was never filled in.
    NullHorses,
    /// Copy a horse id to the clipboard.
    Copy {
        #[arg(value_name = "HORSE_ID")]
        horse_id: String,
    },
    /// Write a commented default config file.
    InitConfig,
}

impl Command {
    /// Operations that fan out over many horses or races.
    pub fn is_bulk(&self) -> bool {
        matches!(
            self,
            Command::ScrapeAllHorses { .. }
                | Command::CheckAllScratches
                | Command::UpdateHorses
                | Command::NullHorses
        )
    }

    pub fn confirm_prompt(&self) -> Option<&'static str> {
        match self {
            Command::ScrapeAllHorses { .. } => Some(
                "Scrape ALL horses of the selected races? This can take several minutes.",
            ),
            Command::CheckAllScratches => {
                Some("Check scratches for ALL races? This can take several minutes.")
            }
            Command::UpdateHorses => Some(
                "Review and update every horse that has not been refreshed recently? This can take several minutes.",
            ),
            Command::NullHorses => Some(
                "Scrape only the horses with empty profiles? This can take several minutes.",
            ),
            _ => None,
        }
    }
}
