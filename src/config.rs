use std::path::{Path, PathBuf};

use tracing::warn;

/// Default API base URL.
pub(crate) const BASE_URL: &str = "https://api.covidcast.cmu.edu/epidata/";

#[derive(Debug, Default)]
struct RcConfig {
    url: Option<String>,
    key: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

/// Resolves base URL and API key using (in order of precedence):
/// - explicit arguments
/// - environment variables `DELPHI_EPIDATA_URL` / `DELPHI_EPIDATA_KEY`
/// - an `.epidatarc` file (from `DELPHI_EPIDATA_RC`, the current directory,
///   or the home directory)
/// - the built-in default URL; the key stays unset.
pub(crate) fn load_config(base_url: Option<String>, api_key: Option<String>) -> ResolvedConfig {
    let mut url = base_url.or_else(|| std::env::var("DELPHI_EPIDATA_URL").ok());
    let mut key = api_key.or_else(|| std::env::var("DELPHI_EPIDATA_KEY").ok());

    if url.is_none() || key.is_none() {
        for rc_path in rc_candidates() {
            if rc_path.exists() {
                let cfg = read_rc(&rc_path);
                if url.is_none() {
                    url = cfg.url;
                }
                if key.is_none() {
                    key = cfg.key;
                }
                break;
            }
        }
    }

    if key.is_none() {
        warn!(
            "DELPHI_EPIDATA_KEY is not set; requests are rate-limited without an API key. \
             A free key is available at the Epidata registration form."
        );
    }

    ResolvedConfig {
        base_url: url.unwrap_or_else(|| BASE_URL.to_string()),
        api_key: key,
    }
}

fn read_rc(path: &Path) -> RcConfig {
    let mut cfg = RcConfig::default();
    let Ok(text) = std::fs::read_to_string(path) else {
        return cfg;
    };

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once(':') {
            let v = strip_quotes(v.trim());
            if v.is_empty() {
                continue;
            }
            match k.trim() {
                "url" => cfg.url = Some(v.to_string()),
                "key" => cfg.key = Some(v.to_string()),
                _ => {}
            }
        }
    }

    cfg
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates() -> Vec<PathBuf> {
    // Search order: explicit override, working directory, home directory.
    if let Ok(p) = std::env::var("DELPHI_EPIDATA_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".epidatarc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".epidatarc"));
    }
    v
}
