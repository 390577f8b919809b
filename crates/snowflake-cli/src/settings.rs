//! Runtime settings, read from `snowflake.toml` and `SNOWFLAKE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
  /// SQLite database file.
  pub database:  PathBuf,
  /// Fact (document collection) name.
  pub fact:      String,
  /// Document id fields; empty means the surrogate id alone.
  #[serde(default)]
  pub id_fields: Vec<String>,
}

impl SnowflakeConfig {
  /// Layer environment variables over the optional TOML file at `path`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      config::Config::builder()
        .add_source(config::File::from(path).required(false)),
    )
  }

  fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> anyhow::Result<Self> {
    builder
      .add_source(
        config::Environment::with_prefix("SNOWFLAKE")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("id_fields"),
      )
      .build()
      .context("failed to read config")?
      .try_deserialize()
      .context("failed to deserialise SnowflakeConfig")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_toml() {
    let builder = config::Config::builder().add_source(config::File::from_str(
      "database = \"store.db\"\nfact = \"people\"\nid_fields = [\"key\"]\n",
      config::FileFormat::Toml,
    ));
    let cfg = SnowflakeConfig::from_builder(builder).unwrap();

    assert_eq!(cfg.database, PathBuf::from("store.db"));
    assert_eq!(cfg.fact, "people");
    assert_eq!(cfg.id_fields, vec!["key"]);
  }

  #[test]
  fn id_fields_default_to_empty() {
    let builder = config::Config::builder().add_source(config::File::from_str(
      "database = \"store.db\"\nfact = \"events\"\n",
      config::FileFormat::Toml,
    ));
    let cfg = SnowflakeConfig::from_builder(builder).unwrap();
    assert!(cfg.id_fields.is_empty());
  }
}
