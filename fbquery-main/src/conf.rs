use std::{fs, path::Path};

use fbquery_core::{
    config::CompilerConfig,
    err::{Context, Result},
    qtree::QueryNode,
};
use fbquery_logging::info;

use crate::args::Args;

/// Loads the compiler configuration, the server version argument takes precedence
pub fn load_conf(args: &Args) -> Result<CompilerConfig> {
    let mut conf = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}...", path.display());
            let yaml = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;

            CompilerConfig::from_yaml(&yaml)?
        }
        None => CompilerConfig::default(),
    };

    if let Some(version) = &args.server_version {
        conf.server_version = Some(version.clone());
    }

    Ok(conf)
}

/// Loads a query tree from a json or yaml file
pub fn load_query(path: &Path) -> Result<QueryNode> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read query file {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    );

    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse query file {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse query file {}", path.display()))
    }
}
