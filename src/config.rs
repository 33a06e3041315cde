/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// Logging is not up yet while this runs, so problems are collected in
/// `GameConfig::warnings` and replayed by `main` once the subscriber exists.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub rules: RulesConfig,
    pub scores: ScoresConfig,
    pub gamepad: GamepadConfig,
    /// Custom maze layout. `None` = built-in maze.
    pub maze_file: Option<PathBuf>,
    pub log_file: PathBuf,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub frame_ms: u64, // delay between scheduled frames
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RulesConfig {
    pub initial_lives: u32,
    pub pickup_reward: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            initial_lives: default_initial_lives(),
            pickup_reward: default_pickup_reward(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScoresConfig {
    pub file: PathBuf,
    pub leaderboard_size: usize,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub start: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    scores: TomlScores,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_initial_lives")]
    initial_lives: u32,
    #[serde(default = "default_pickup_reward")]
    pickup_reward: u32,
}

#[derive(Deserialize, Debug)]
struct TomlScores {
    #[serde(default = "default_scores_file")]
    file: String,
    #[serde(default = "default_leaderboard_size")]
    leaderboard_size: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_start")]
    start: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    maze_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 33 }
fn default_initial_lives() -> u32 { 5 }
fn default_pickup_reward() -> u32 { 10 }
fn default_scores_file() -> String { "highscores.toml".into() }
fn default_leaderboard_size() -> usize { 10 }

fn default_start() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_restart() -> Vec<String> { vec!["Y".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "mazechase.log".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { frame_ms: default_frame_ms() }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            initial_lives: default_initial_lives(),
            pickup_reward: default_pickup_reward(),
        }
    }
}

impl Default for TomlScores {
    fn default() -> Self {
        TomlScores {
            file: default_scores_file(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            start: default_start(),
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            maze_file: String::new(),
            log_file: default_log_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/mazechase.
    /// Missing file or missing keys gracefully fall back to defaults.
    /// Relative paths resolve against the directory config.toml was found in,
    /// or the working directory when there is none.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let (toml_cfg, found_in) = load_toml(&search_dirs, &mut warnings);
        let base = found_in
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let mut cfg = Self::from_toml(toml_cfg, &base);
        cfg.warnings = warnings;
        cfg
    }

    /// Build a config from TOML text. Relative paths resolve against `base`.
    #[cfg(test)]
    pub fn from_toml_str(text: &str, base: &Path) -> Result<Self, toml::de::Error> {
        let parsed = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(parsed, base))
    }

    fn from_toml(t: TomlConfig, base: &Path) -> Self {
        let maze_file = if t.general.maze_file.trim().is_empty() {
            None
        } else {
            Some(resolve(base, &t.general.maze_file))
        };

        GameConfig {
            speed: SpeedConfig {
                frame_ms: t.speed.frame_ms.max(1),
            },
            rules: RulesConfig {
                initial_lives: t.rules.initial_lives.max(1),
                pickup_reward: t.rules.pickup_reward,
            },
            scores: ScoresConfig {
                file: resolve(base, &t.scores.file),
                leaderboard_size: t.scores.leaderboard_size.max(1),
            },
            gamepad: GamepadConfig {
                start: t.gamepad.start,
                restart: t.gamepad.restart,
                quit: t.gamepad.quit,
            },
            maze_file,
            log_file: resolve(base, &t.general.log_file),
            warnings: vec![],
        }
    }
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    let p = PathBuf::from(path);
    if p.is_absolute() { p } else { base.join(p) }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mazechase");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> (TomlConfig, Option<PathBuf>) {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return (cfg, Some(dir.clone())),
                Err(e) => {
                    warnings.push(format!("{} parse error, using defaults: {e}", path.display()));
                    return (TomlConfig::default(), Some(dir.clone()));
                }
            },
            Err(e) => {
                warnings.push(format!("could not read {}: {e}", path.display()));
            }
        }
    }
    (TomlConfig::default(), None)
}
