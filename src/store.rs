//! Backend-neutral requests and the two store traits the catalogue runs against.
//!
//! Concrete MongoDB and Neo4j adapters live in [`crate::db`]; tests use the
//! in-memory fakes at the bottom of this file.

use async_trait::async_trait;
use mongodb::bson::Document;

use crate::{error::AppResult, models::Record};

/// One request against the film collection.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentRequest {
    Aggregate { pipeline: Vec<Document> },
    /// Yields a single `{count}` record.
    Count { filter: Document },
    /// Yields one `{<field>: value}` record per distinct value.
    Distinct { field: &'static str, filter: Document },
    Find { filter: Document, sort: Option<Document>, limit: Option<i64> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Text(String),
    TextList(Vec<String>),
}

/// A Cypher statement with bound parameters and the columns to read back.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub cypher: &'static str,
    pub params: Vec<(&'static str, Param)>,
    pub columns: &'static [&'static str],
}

impl Statement {
    pub fn new(cypher: &'static str) -> Self {
        Self { cypher, params: Vec::new(), columns: &[] }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, Param::Text(value.into())));
        self
    }

    pub fn param_list(mut self, key: &'static str, values: &[String]) -> Self {
        self.params.push((key, Param::TextList(values.to_vec())));
        self
    }

    pub fn columns(mut self, columns: &'static [&'static str]) -> Self {
        self.columns = columns;
        self
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn run(&self, request: &DocumentRequest) -> AppResult<Vec<Record>>;
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Executes `statement`, returning one record per row restricted to its columns.
    async fn run(&self, statement: &Statement) -> AppResult<Vec<Record>>;
}
