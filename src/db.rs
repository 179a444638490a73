use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{Bson, Document, doc},
};
use neo4rs::{ConfigBuilder, Graph, query};
use tracing::{debug, info};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Record, record},
    store::{DocumentRequest, DocumentStore, GraphStore, Param, Statement},
};

pub struct MongoStore {
    client: Client,
    database: String,
    films: Collection<Document>,
}

impl MongoStore {
    /// Builds the client and pings the server; an unreachable server is an error here,
    /// not on the first query.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let client = Client::with_uri_str(&config.mongo_uri).await?;
        let films = client.database(&config.mongo_database).collection(&config.mongo_collection);
        let store = Self { client, database: config.mongo_database.clone(), films };
        store.ping().await?;
        info!(
            database = %config.mongo_database,
            collection = %config.mongo_collection,
            "document store connected"
        );
        Ok(store)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.client.database(&self.database).run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn run(&self, request: &DocumentRequest) -> AppResult<Vec<Record>> {
        debug!(?request, "document request");
        match request {
            DocumentRequest::Aggregate { pipeline } => {
                let cursor = self.films.aggregate(pipeline.clone()).await?;
                let docs: Vec<Document> = cursor.try_collect().await?;
                Ok(docs.into_iter().map(document_to_record).collect())
            },
            DocumentRequest::Count { filter } => {
                let count = self.films.count_documents(filter.clone()).await?;
                Ok(vec![record([("count", count)])])
            },
            DocumentRequest::Distinct { field, filter } => {
                let values = self.films.distinct(*field, filter.clone()).await?;
                Ok(values
                    .into_iter()
                    .map(|v| record([(*field, v.into_relaxed_extjson())]))
                    .collect())
            },
            DocumentRequest::Find { filter, sort, limit } => {
                let mut find = self.films.find(filter.clone());
                if let Some(sort) = sort {
                    find = find.sort(sort.clone());
                }
                if let Some(limit) = limit {
                    find = find.limit(*limit);
                }
                let docs: Vec<Document> = find.await?.try_collect().await?;
                Ok(docs.into_iter().map(document_to_record).collect())
            },
        }
    }
}

fn document_to_record(doc: Document) -> Record {
    match Bson::Document(doc).into_relaxed_extjson() {
        serde_json::Value::Object(map) => map,
        other => record([("value", other)]),
    }
}

pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let neo_config = ConfigBuilder::default()
            .uri(config.neo4j_uri.as_str())
            .user(config.neo4j_user.as_str())
            .password(config.neo4j_password.as_str())
            .db(config.neo4j_database.as_str())
            .build()?;
        let store = Self { graph: Graph::connect(neo_config).await? };
        store.ping().await?;
        info!(uri = %config.neo4j_uri, database = %config.neo4j_database, "graph store connected");
        Ok(store)
    }

    pub async fn ping(&self) -> AppResult<String> {
        let mut stream = self.graph.execute(query("RETURN 'ok' AS message")).await?;
        let Some(row) = stream.next().await? else {
            return Ok(String::new());
        };
        row.get::<String>("message")
            .map_err(|e| AppError::Decode { column: "message".to_string(), message: e.to_string() })
    }

    pub fn close(self) {
        drop(self.graph);
        info!("graph store connection released");
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn run(&self, statement: &Statement) -> AppResult<Vec<Record>> {
        debug!(params = statement.params.len(), "cypher statement");

        let mut q = query(statement.cypher);
        for (key, value) in &statement.params {
            q = match value {
                Param::Text(s) => q.param(key, s.as_str()),
                Param::TextList(list) => q.param(key, list.clone()),
            };
        }

        let mut stream = self.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            if statement.columns.is_empty() {
                continue;
            }
            let mut rec = Record::new();
            for column in statement.columns {
                let value = row.get::<serde_json::Value>(column).map_err(|e| {
                    AppError::Decode { column: column.to_string(), message: e.to_string() }
                })?;
                rec.insert(column.to_string(), value);
            }
            out.push(rec);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::DemoParams;

    // nothing listens on port 1
    fn unreachable() -> Config {
        Config {
            mongo_uri: "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=300&connectTimeoutMS=300"
                .to_string(),
            mongo_database: "entertainment".to_string(),
            mongo_collection: "films".to_string(),
            neo4j_uri: "bolt://127.0.0.1:1".to_string(),
            neo4j_user: "neo4j".to_string(),
            neo4j_password: "secret".to_string(),
            neo4j_database: "films".to_string(),
            demo: DemoParams::default(),
        }
    }

    #[tokio::test]
    async fn unreachable_document_store_fails_to_connect() {
        let result = MongoStore::connect(&unreachable()).await;
        assert!(matches!(result, Err(AppError::Mongo(_))));
    }

    #[tokio::test]
    async fn unreachable_graph_store_fails_to_connect() {
        // the driver may retry for a while; giving up counts as a failure too
        let result =
            tokio::time::timeout(Duration::from_secs(10), Neo4jStore::connect(&unreachable())).await;
        assert!(!matches!(result, Ok(Ok(_))));
    }
}
