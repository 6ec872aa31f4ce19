//! Structured config formats and their serializers.
//!
//! The set of formats is closed: [`ConfigFormat`] enumerates every supported
//! format and [`CodecTable`] maps each one to its serializer.  An unknown
//! format string is rejected when it is parsed, never during serialization.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// Serialization format of a component's structured config file.
///
/// # Examples
///
/// ```
/// use acorn_cli::components::ConfigFormat;
///
/// let format: ConfigFormat = "yml".parse().unwrap();
/// assert_eq!(format, ConfigFormat::Yaml);
/// assert_eq!(format.extension(), "yaml");
/// assert!("ini".parse::<ConfigFormat>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// YAML document.
    Yaml,
    /// Pretty-printed JSON object.
    Json,
    /// TOML document (payload must be a table).
    Toml,
}

impl ConfigFormat {
    /// File extension used for generated files of this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// A serializer for one [`ConfigFormat`].
///
/// Output must be deterministic for a given payload.  Payload objects are
/// `serde_json::Map`s, whose keys iterate in sorted order, so every codec
/// emits keys sorted.
pub trait ConfigCodec: fmt::Debug + Send + Sync {
    /// The format this codec writes.
    fn format(&self) -> ConfigFormat;

    /// Serialize `payload` to file content.
    ///
    /// # Errors
    ///
    /// Returns the serializer's message if the payload cannot be represented
    /// in this format (e.g. a non-table TOML root).
    fn encode(&self, payload: &serde_json::Value) -> Result<String, String>;
}

/// YAML codec backed by `serde_yaml`.
#[derive(Debug, Default)]
pub struct YamlCodec;

impl ConfigCodec for YamlCodec {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Yaml
    }

    fn encode(&self, payload: &serde_json::Value) -> Result<String, String> {
        serde_yaml::to_string(payload).map_err(|e| e.to_string())
    }
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Default)]
pub struct JsonCodec;

impl ConfigCodec for JsonCodec {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Json
    }

    fn encode(&self, payload: &serde_json::Value) -> Result<String, String> {
        let mut out = serde_json::to_string_pretty(payload).map_err(|e| e.to_string())?;
        out.push('\n');
        Ok(out)
    }
}

/// TOML codec backed by `toml`.
#[derive(Debug, Default)]
pub struct TomlCodec;

impl ConfigCodec for TomlCodec {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Toml
    }

    fn encode(&self, payload: &serde_json::Value) -> Result<String, String> {
        if !payload.is_object() {
            return Err("toml document root must be a table".to_string());
        }
        toml::to_string_pretty(payload).map_err(|e| e.to_string())
    }
}

/// Table selecting the codec for each [`ConfigFormat`].
#[derive(Debug, Default)]
pub struct CodecTable {
    yaml: YamlCodec,
    json: JsonCodec,
    toml: TomlCodec,
}

impl CodecTable {
    /// Create a table with all built-in codecs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the codec for `format`.
    #[must_use]
    pub fn get(&self, format: ConfigFormat) -> &dyn ConfigCodec {
        match format {
            ConfigFormat::Yaml => &self.yaml,
            ConfigFormat::Json => &self.json,
            ConfigFormat::Toml => &self.toml,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_formats_case_insensitively() {
        assert_eq!("YAML".parse::<ConfigFormat>().unwrap(), ConfigFormat::Yaml);
        assert_eq!("json".parse::<ConfigFormat>().unwrap(), ConfigFormat::Json);
        assert_eq!("Toml".parse::<ConfigFormat>().unwrap(), ConfigFormat::Toml);
    }

    #[test]
    fn rejects_unknown_format() {
        let err = "ghostty".parse::<ConfigFormat>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFormat(ref f) if f == "ghostty"));
    }

    #[test]
    fn table_returns_matching_codec() {
        let table = CodecTable::new();
        for format in [ConfigFormat::Yaml, ConfigFormat::Json, ConfigFormat::Toml] {
            assert_eq!(table.get(format).format(), format);
        }
    }

    #[test]
    fn json_keys_are_sorted() {
        let payload = json!({"zeta": 1, "alpha": {"b": true, "a": false}});
        let out = JsonCodec.encode(&payload).unwrap();
        let alpha = out.find("\"alpha\"").unwrap();
        let zeta = out.find("\"zeta\"").unwrap();
        assert!(alpha < zeta, "keys not sorted:\n{out}");
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn yaml_keys_are_sorted() {
        let payload = json!({"skin": "dracula", "refreshRate": 2});
        let out = YamlCodec.encode(&payload).unwrap();
        assert_eq!(out, "refreshRate: 2\nskin: dracula\n");
    }

    #[test]
    fn toml_round_trips_nested_tables() {
        let payload = json!({"format": "$all", "character": {"success_symbol": ">"}});
        let out = TomlCodec.encode(&payload).unwrap();
        let parsed: toml::Value = toml::from_str(&out).unwrap();
        assert_eq!(parsed["format"].as_str(), Some("$all"));
        assert_eq!(parsed["character"]["success_symbol"].as_str(), Some(">"));
    }

    #[test]
    fn toml_rejects_non_table_root() {
        assert!(TomlCodec.encode(&json!(["a", "b"])).is_err());
    }

    #[test]
    fn encoding_is_deterministic() {
        let payload = json!({"b": [1, 2], "a": {"y": "1", "x": "2"}});
        let table = CodecTable::new();
        for format in [ConfigFormat::Yaml, ConfigFormat::Json, ConfigFormat::Toml] {
            let first = table.get(format).encode(&payload).unwrap();
            let second = table.get(format).encode(&payload).unwrap();
            assert_eq!(first, second, "{format} output differs between runs");
        }
    }
}
