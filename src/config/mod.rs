use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use directories::BaseDirs;

use crate::bootstrap::{CorePolicy, PackageList};

const DEFAULT_SNIPPET: &str = "import sys\n\nprint(\"Hello from Python\", sys.version.split()[0])\n\n# The last expression becomes the return value\n1 + 1";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    /// Load defaults, overlay `config_path` if it exists, then overlay the environment.
    pub fn load_from(config_path: PathBuf) -> Self {
        let mut map = default_map();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Environment takes precedence over the rc file
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    /// Comma-separated list value; empty entries are dropped.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Explicit interpreter path, or `None` when set to `auto`.
    pub fn python_executable(&self) -> Option<String> {
        self.get("PYTHON_EXECUTABLE")
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("auto"))
    }

    pub fn packages(&self) -> PackageList {
        PackageList {
            core: self.get_list("CORE_PACKAGES"),
            best_effort: self.get_list("EXTRA_PACKAGES"),
            verify: self.get("VERIFY_PACKAGE").filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn core_policy(&self) -> CorePolicy {
        if self.get_bool("STRICT_CORE_PACKAGES") {
            CorePolicy::Strict
        } else {
            CorePolicy::BestEffort
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.get_path("LOG_PATH")
            .unwrap_or_else(|| env::temp_dir().join("pyrun").join("pyrun.log"))
    }

    pub fn default_snippet(&self) -> String {
        self.get("DEFAULT_SNIPPET")
            .map(|s| s.replace("\\n", "\n"))
            .unwrap_or_else(|| DEFAULT_SNIPPET.to_string())
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "PYTHON_EXECUTABLE",
        "CORE_PACKAGES",
        "EXTRA_PACKAGES",
        "VERIFY_PACKAGE",
        "STRICT_CORE_PACKAGES",
        "LOG_PATH",
        "DEFAULT_SNIPPET",
    ];

    KEYS.contains(&k)
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("pyrun").join(".pyrunrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    let temp = env::temp_dir().join("pyrun");

    m.insert(
        "LOG_PATH".into(),
        temp.join("pyrun.log").to_string_lossy().into_owned(),
    );
    m.insert("PYTHON_EXECUTABLE".into(), "auto".into());
    m.insert("CORE_PACKAGES".into(), String::new());
    m.insert("EXTRA_PACKAGES".into(), String::new());
    m.insert("STRICT_CORE_PACKAGES".into(), "true".into());

    m
}
