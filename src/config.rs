use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

pub const DEFAULT_CONFIG_PATH: &str = "filmgraph.toml";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub mongo_collection: String,
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub neo4j_database: String,
    pub demo: DemoParams,
}

/// Names fed into the parameterised catalogue entries.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoParams {
    pub coactor_of: String,
    pub group_members: Vec<String>,
    pub recommend_for: String,
    pub path_from: String,
    pub path_to: String,
    pub taste_of: String,
}

impl Default for DemoParams {
    fn default() -> Self {
        Self {
            coactor_of: "Anne Hathaway".to_string(),
            group_members: vec!["Robert Downey Jr.".to_string(), "Scarlett Johansson".to_string()],
            recommend_for: "Leonardo DiCaprio".to_string(),
            path_from: "Brad Pitt".to_string(),
            path_to: "Matt Damon".to_string(),
            taste_of: "Tom Hanks".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    demo: DemoParams,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
    mongo_uri: Option<String>,
    mongo_database: Option<String>,
    mongo_collection: Option<String>,
    neo4j_uri: Option<String>,
    neo4j_user: Option<String>,
    neo4j_password: Option<String>,
    neo4j_database: Option<String>,
}

impl Config {
    /// Reads `path` when it exists, then lets environment variables (and `.env`) override it.
    pub fn load(path: &Path) -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let file = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| AppError::config(format!("{}: {e}", path.display())))?;
            parse_file(&raw).map_err(|e| AppError::config(format!("{}: {e}", path.display())))?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using environment only");
            FileConfig::default()
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let db = file.database;
        let pick = |key: &str, from_file: Option<String>| {
            env(key).filter(|v| !v.trim().is_empty()).or(from_file)
        };
        let required = |key: &str, from_file: Option<String>| {
            pick(key, from_file).ok_or_else(|| {
                AppError::config(format!(
                    "missing `{}` (set [database].{} or {key})",
                    key.to_lowercase(),
                    key.to_lowercase()
                ))
            })
        };

        Ok(Self {
            mongo_uri: required("MONGO_URI", db.mongo_uri)?,
            mongo_database: pick("MONGO_DATABASE", db.mongo_database)
                .unwrap_or_else(|| "entertainment".to_string()),
            mongo_collection: pick("MONGO_COLLECTION", db.mongo_collection)
                .unwrap_or_else(|| "films".to_string()),
            neo4j_uri: required("NEO4J_URI", db.neo4j_uri)?,
            neo4j_user: required("NEO4J_USER", db.neo4j_user)?,
            neo4j_password: required("NEO4J_PASSWORD", db.neo4j_password)?,
            neo4j_database: pick("NEO4J_DATABASE", db.neo4j_database)
                .unwrap_or_else(|| "films".to_string()),
            demo: file.demo,
        })
    }
}

fn parse_file(raw: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(raw)
}
