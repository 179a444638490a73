use serde::Serialize;

/// One result row: field name to scalar or nested value.
pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Documents,
    Graph,
    Cross,
}

impl Section {
    /// Same label the JSON output uses.
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Documents => "documents",
            Section::Graph => "graph",
            Section::Cross => "cross",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Section::Documents => "Document store queries",
            Section::Graph => "Graph store queries",
            Section::Cross => "Cross-store queries",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok { rows: Vec<Record> },
    Failed { error: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct EntryReport {
    pub entry: &'static str,
    pub section: Section,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl EntryReport {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub started_at: jiff::Timestamp,
    pub entries: Vec<EntryReport>,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.failed()).count()
    }
}

/// Builds a [`Record`] from `(field, value)` pairs.
pub fn record<I, K, V>(fields: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
