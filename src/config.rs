//! Display configuration
//!
//! Parses the optional `taskfmt.toml` file into a [`DisplayConfig`], then
//! layers the host's environment variables on top.

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Color;
use serde::{Deserialize, Serialize};

/// General display settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplaySettings {
    /// Append `key=value` task arguments to the banner
    pub show_args: bool,
    /// Disable ANSI colors entirely
    pub nocolor: bool,
    /// Host verbosity level (number of `-v` flags)
    pub verbosity: u8,
    /// Environment variable whose presence switches to CI group markers
    pub ci_env_var: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_args: false,
            nocolor: false,
            verbosity: 0,
            ci_env_var: "GITHUB_ACTIONS".to_string(),
        }
    }
}

/// Color names for each kind of output, as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColorTable {
    /// Successful results
    pub ok: String,
    /// Results that changed something
    pub changed: String,
    /// Failures and stderr
    pub error: String,
    /// Skipped results
    pub skip: String,
    /// Unreachable hosts
    pub unreachable: String,
    /// Censored output
    pub verbose: String,
    /// Warnings
    pub warn: String,
    /// Deprecation warnings
    pub deprecate: String,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            ok: "green".to_string(),
            changed: "yellow".to_string(),
            error: "red".to_string(),
            skip: "cyan".to_string(),
            unreachable: "bright red".to_string(),
            verbose: "blue".to_string(),
            warn: "bright purple".to_string(),
            deprecate: "purple".to_string(),
        }
    }
}

impl ColorTable {
    fn entry_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "ok" => Some(&mut self.ok),
            "changed" => Some(&mut self.changed),
            "error" => Some(&mut self.error),
            "skip" => Some(&mut self.skip),
            "unreachable" => Some(&mut self.unreachable),
            "verbose" => Some(&mut self.verbose),
            "warn" => Some(&mut self.warn),
            "deprecate" => Some(&mut self.deprecate),
            _ => None,
        }
    }
}

/// Resolved colors. `None` means "print without color".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Successful results
    pub ok: Option<Color>,
    /// Results that changed the host
    pub changed: Option<Color>,
    /// Failures and stderr
    pub error: Option<Color>,
    /// Skipped results
    pub skip: Option<Color>,
    /// Unreachable hosts
    pub unreachable: Option<Color>,
    /// Verbose detail and censored lines
    pub verbose: Option<Color>,
    /// Warnings
    pub warn: Option<Color>,
    /// Deprecation notices
    pub deprecate: Option<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        // The default table only holds known names.
        ColorTable::default()
            .resolve()
            .unwrap_or_else(|_| Self::plain())
    }
}

impl Palette {
    /// A palette that never colors anything
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            ok: None,
            changed: None,
            error: None,
            skip: None,
            unreachable: None,
            verbose: None,
            warn: None,
            deprecate: None,
        }
    }
}

impl ColorTable {
    /// Resolve every color name into a terminal color
    pub fn resolve(&self) -> Result<Palette> {
        let get = |name: &str, key: &str| {
            parse_color(name).with_context(|| format!("in [colors] key '{key}'"))
        };
        Ok(Palette {
            ok: get(&self.ok, "ok")?,
            changed: get(&self.changed, "changed")?,
            error: get(&self.error, "error")?,
            skip: get(&self.skip, "skip")?,
            unreachable: get(&self.unreachable, "unreachable")?,
            verbose: get(&self.verbose, "verbose")?,
            warn: get(&self.warn, "warn")?,
            deprecate: get(&self.deprecate, "deprecate")?,
        })
    }
}

/// Top-level configuration parsed from `taskfmt.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// General settings
    pub display: DisplaySettings,
    /// Color names
    pub colors: ColorTable,
}

impl DisplayConfig {
    /// Parse a config file from a path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse config content from a string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse taskfmt.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the host's environment variables over the parsed values.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ANSIBLE_DISPLAY_ARGS_TO_STDOUT") {
            self.display.show_args =
                parse_bool(&v).context("in ANSIBLE_DISPLAY_ARGS_TO_STDOUT")?;
        }
        if let Some(v) = lookup("ANSIBLE_NOCOLOR") {
            self.display.nocolor = parse_bool(&v).context("in ANSIBLE_NOCOLOR")?;
        }
        if let Some(v) = lookup("ANSIBLE_VERBOSITY") {
            self.display.verbosity = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid ANSIBLE_VERBOSITY '{v}'"))?;
        }
        for key in [
            "ok",
            "changed",
            "error",
            "skip",
            "unreachable",
            "verbose",
            "warn",
            "deprecate",
        ] {
            let var = format!("ANSIBLE_COLOR_{}", key.to_ascii_uppercase());
            if let Some(v) = lookup(&var) {
                if let Some(slot) = self.colors.entry_mut(key) {
                    *slot = v;
                }
            }
        }
        self.validate()
    }

    /// Resolved palette, or a plain one when colors are disabled
    pub fn palette(&self) -> Result<Palette> {
        if self.display.nocolor {
            return Ok(Palette::plain());
        }
        self.colors.resolve()
    }

    fn validate(&self) -> Result<()> {
        if self.display.ci_env_var.trim().is_empty() {
            bail!("[display] ci_env_var cannot be empty");
        }
        self.colors.resolve().map(|_| ())
    }
}

/// Translate a host color name ("bright red", "dark gray", ...) into a color.
///
/// `normal` maps to `None`.
pub fn parse_color(name: &str) -> Result<Option<Color>> {
    let normalized = name.trim().to_ascii_lowercase().replace(['_', '-'], " ");
    let color = match normalized.as_str() {
        "normal" => return Ok(None),
        "black" | "dark gray" | "dark grey" => Color::BrightBlack,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" | "gray" | "grey" | "bright gray" | "bright grey" => Color::White,
        "bright black" => Color::BrightBlack,
        "bright red" => Color::BrightRed,
        "bright green" => Color::BrightGreen,
        "bright yellow" => Color::BrightYellow,
        "bright blue" => Color::BrightBlue,
        "bright magenta" | "bright purple" => Color::BrightMagenta,
        "bright cyan" => Color::BrightCyan,
        "bright white" => Color::BrightWhite,
        _ => bail!("Unknown color name '{name}'"),
    };
    Ok(Some(color))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "y" => Ok(true),
        "0" | "false" | "no" | "off" | "n" | "" => Ok(false),
        other => bail!("Invalid boolean '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const FULL_CONFIG: &str = r#"
[display]
show_args = true
nocolor = false
verbosity = 2
ci_env_var = "CI"

[colors]
ok = "bright green"
error = "bright red"
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn test_parse_full_config() {
        let config = DisplayConfig::parse(FULL_CONFIG).unwrap();

        assert!(config.display.show_args);
        assert_eq!(config.display.verbosity, 2);
        assert_eq!(config.display.ci_env_var, "CI");
        assert_eq!(config.colors.ok, "bright green");
        // Unspecified keys keep their defaults
        assert_eq!(config.colors.skip, "cyan");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = DisplayConfig::parse("").unwrap();
        assert_eq!(config, DisplayConfig::default());
        assert!(!config.display.show_args);
        assert_eq!(config.display.ci_env_var, "GITHUB_ACTIONS");
    }

    #[test]
    fn test_default_palette_matches_host_colors() {
        let palette = DisplayConfig::default().palette().unwrap();
        assert_eq!(palette.ok, Some(Color::Green));
        assert_eq!(palette.error, Some(Color::Red));
        assert_eq!(palette.skip, Some(Color::Cyan));
        assert_eq!(palette.unreachable, Some(Color::BrightRed));
        assert_eq!(palette.verbose, Some(Color::Blue));
    }

    #[test]
    fn test_nocolor_yields_plain_palette() {
        let config = DisplayConfig::parse("[display]\nnocolor = true\n").unwrap();
        assert_eq!(config.palette().unwrap(), Palette::plain());
    }

    #[test]
    fn test_reject_unknown_color() {
        let err = DisplayConfig::parse("[colors]\nok = \"chartreuse\"\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("chartreuse"), "got: {msg}");
        assert!(msg.contains("'ok'"), "got: {msg}");
    }

    #[test]
    fn test_reject_empty_ci_env_var() {
        let result = DisplayConfig::parse("[display]\nci_env_var = \"  \"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_reject_invalid_toml() {
        assert!(DisplayConfig::parse("[display\n").is_err());
    }

    #[test]
    fn test_parse_color_names() {
        assert_eq!(parse_color("bright purple").unwrap(), Some(Color::BrightMagenta));
        assert_eq!(parse_color("Dark_Gray").unwrap(), Some(Color::BrightBlack));
        assert_eq!(parse_color("purple").unwrap(), Some(Color::Magenta));
        assert_eq!(parse_color("normal").unwrap(), None);
        assert!(parse_color("").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DisplayConfig::default();
        config
            .apply_env(env(&[
                ("ANSIBLE_DISPLAY_ARGS_TO_STDOUT", "yes"),
                ("ANSIBLE_VERBOSITY", "3"),
                ("ANSIBLE_COLOR_OK", "bright blue"),
            ]))
            .unwrap();

        assert!(config.display.show_args);
        assert_eq!(config.display.verbosity, 3);
        assert_eq!(config.colors.ok, "bright blue");
        assert_eq!(config.colors.error, "red");
    }

    #[test]
    fn test_env_override_rejects_bad_values() {
        let mut config = DisplayConfig::default();
        assert!(config
            .apply_env(env(&[("ANSIBLE_NOCOLOR", "maybe")]))
            .is_err());

        let mut config = DisplayConfig::default();
        assert!(config
            .apply_env(env(&[("ANSIBLE_COLOR_SKIP", "plaid")]))
            .is_err());
    }

    #[test]
    fn test_no_env_leaves_config_untouched() {
        let mut config = DisplayConfig::parse(FULL_CONFIG).unwrap();
        let before = config.clone();
        config.apply_env(|_| None).unwrap();
        assert_eq!(config, before);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();

        let config = DisplayConfig::from_path(file.path()).unwrap();
        assert!(config.display.show_args);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = DisplayConfig::from_path("/nonexistent/taskfmt.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
