use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    #[serde(alias = "base_url")]
    pub api_base: Option<String>,
    pub timeout: Option<usize>,
    pub proxy: Option<String>,
    pub header: Option<String>,
    #[serde(alias = "delay")]
    pub delay_ms: Option<u64>,
    pub error_preview: Option<usize>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub profile_base: Option<String>,
    pub pedigree_viewer: Option<String>,
    pub no_color: Option<bool>,
    pub quiet: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".paddock").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    // a file with only comments deserializes as null
    if contents.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    }) {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

pub fn default_config_yaml() -> String {
    r#"# Paddock config
#
# Location (default):
#   ~/.paddock/config.yml
#
# Command-line flags override every value here.

# Scrape API
api_base: http://127.0.0.1:5000
timeout: 30

# HTTP (optional)
# proxy: http://127.0.0.1:8080
# header: "Authorization: Bearer <token>"

# Bulk scraping
delay_ms: 1000
error_preview: 5

# Horse profiles are requested by URL: <profile_base>/<horse id>
profile_base: https://www.horseracingnation.com/horse

# Pedigree rendering: inline (table) or bracket
# pedigree_viewer: bracket

# Output (optional)
# output: ./races.html
# output_format: document

# Output styling
no_color: false
quiet: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
