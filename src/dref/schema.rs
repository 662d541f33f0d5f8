use anyhow::{Context, Result};
use include_dir::{Dir, include_dir};

use crate::template::schema::{FieldSchemaNode, load_schema};

static ASSETS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/assets");

const SCHEMA_PATH: &str = "templates/dref_application.json";
const DESCRIPTIONS_PATH: &str = "sector_descriptions.toml";

fn asset_text(path: &str) -> Result<&'static str> {
    ASSETS_DIR
        .get_file(path)
        .with_context(|| format!("Missing embedded asset {}", path))?
        .contents_utf8()
        .with_context(|| format!("Embedded asset {} is not valid UTF-8", path))
}

/// Field schema of the DREF application form
pub fn dref_schema() -> Result<FieldSchemaNode> {
    load_schema(asset_text(SCHEMA_PATH)?).context("Failed to load the DREF application schema")
}

/// Bundled help text for sector option lists
pub fn embedded_descriptions() -> Result<&'static str> {
    asset_text(DESCRIPTIONS_PATH)
}
