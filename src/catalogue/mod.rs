//! The fixed catalogue of canned queries.
//!
//! Each [`Entry`] turns the demo parameters into a [`Plan`] for one of the two
//! stores and optionally reshapes the rows that come back. [`execute`] runs a
//! single entry; the driver walks [`CATALOGUE`] in order.

mod cross;
mod documents;
mod graph;

use tracing::warn;

use crate::{
    config::DemoParams,
    error::{AppError, AppResult},
    models::{Record, Section},
    store::{DocumentRequest, DocumentStore, GraphStore, Statement},
};

pub enum Plan {
    Document(DocumentRequest),
    /// Writes first, the final step is the read whose rows are returned.
    Graph(Vec<GraphStep>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OnError {
    Propagate,
    /// Log and carry on; a skipped final step yields no rows.
    Skip,
}

pub struct GraphStep {
    pub statement: Statement,
    pub on_error: OnError,
}

impl GraphStep {
    pub fn read(statement: Statement) -> Self {
        Self { statement, on_error: OnError::Propagate }
    }

    pub fn lenient(statement: Statement) -> Self {
        Self { statement, on_error: OnError::Skip }
    }
}

pub struct Entry {
    pub name: &'static str,
    pub section: Section,
    pub title: &'static str,
    pub build: fn(&DemoParams) -> Plan,
    pub shape: fn(Vec<Record>) -> Vec<Record>,
}

fn unshaped(rows: Vec<Record>) -> Vec<Record> {
    rows
}

macro_rules! entry {
    ($section:ident, $name:ident, $title:literal, $module:ident) => {
        Entry {
            name: stringify!($name),
            section: Section::$section,
            title: $title,
            build: $module::$name,
            shape: unshaped,
        }
    };
    ($section:ident, $name:ident, $title:literal, $module:ident, shape = $shape:path) => {
        Entry {
            name: stringify!($name),
            section: Section::$section,
            title: $title,
            build: $module::$name,
            shape: $shape,
        }
    };
}

pub static CATALOGUE: &[Entry] = &[
    entry!(Documents, most_common_year, "Year with the most releases", documents),
    entry!(Documents, count_after_1999, "Films released after 1999", documents),
    entry!(Documents, average_votes_2007, "Average votes for 2007 films", documents),
    entry!(Documents, movies_per_year, "Films per year", documents),
    entry!(Documents, available_genres, "Available genres", documents),
    entry!(Documents, highest_revenue_movie, "Highest-grossing film", documents),
    entry!(Documents, prolific_directors, "Directors with more than 5 films", documents),
    entry!(Documents, most_profitable_genre, "Genre with the best average revenue", documents),
    entry!(Documents, top_movies_per_decade, "Top 3 films by Metascore per decade", documents),
    entry!(Documents, longest_movie_by_genre, "Longest film per genre", documents),
    entry!(Documents, acclaimed_blockbusters, "Metascore above 80 and revenue above 50M", documents),
    entry!(
        Documents,
        runtime_vs_revenue,
        "Runtime vs revenue correlation",
        documents,
        shape = documents::correlate_runtime_revenue
    ),
    entry!(Documents, average_runtime_by_decade, "Average runtime per decade", documents),
    entry!(Graph, most_featured_actor, "Actor in the most films", graph),
    entry!(Graph, coactors_of, "Co-actors of the configured actor", graph),
    entry!(Graph, highest_grossing_actor, "Actor with the highest total revenue", graph),
    entry!(Graph, average_film_votes, "Average votes across films", graph),
    entry!(Graph, most_common_genre, "Most common genre", graph),
    entry!(Graph, films_with_group_members, "Films featuring group members", graph),
    entry!(Graph, director_with_most_actors, "Director with the most distinct actors", graph),
    entry!(Graph, most_connected_films, "Films sharing the most actors with others", graph),
    entry!(Graph, actors_with_most_directors, "Actors who worked with the most directors", graph),
    entry!(Graph, recommend_by_genre, "Genre-based recommendations for an actor", graph),
    entry!(Graph, director_influence, "Directors influenced through shared genres", graph),
    entry!(Graph, shortest_actor_path, "Shortest path between two actors", graph),
    entry!(Graph, actor_communities, "Actor communities from repeated co-starring", graph),
    entry!(Cross, same_genre_different_director, "Same genre, different directors", cross),
    entry!(Cross, recommend_from_actor, "Recommendations from an actor's genres", cross),
    entry!(Cross, director_competition, "Competing directors by year and genre", cross),
    entry!(Cross, frequent_collaborations, "Frequent director-actor collaborations", cross),
];

pub fn find(name: &str) -> AppResult<&'static Entry> {
    CATALOGUE
        .iter()
        .find(|e| e.name == name)
        .ok_or_else(|| AppError::UnknownEntry(name.to_string()))
}

pub async fn execute(
    entry: &Entry,
    params: &DemoParams,
    documents: &dyn DocumentStore,
    graph: &dyn GraphStore,
) -> AppResult<Vec<Record>> {
    let rows = match (entry.build)(params) {
        Plan::Document(request) => documents.run(&request).await?,
        Plan::Graph(steps) => run_steps(entry.name, steps, graph).await?,
    };
    Ok((entry.shape)(rows))
}

async fn run_steps(
    entry: &str,
    steps: Vec<GraphStep>,
    graph: &dyn GraphStore,
) -> AppResult<Vec<Record>> {
    let last = steps.len().saturating_sub(1);
    let mut rows = Vec::new();
    for (i, step) in steps.into_iter().enumerate() {
        match graph.run(&step.statement).await {
            Ok(out) => rows = out,
            Err(err) if step.on_error == OnError::Skip => {
                warn!(entry, step = i, error = %err, "graph step failed, skipping");
                if i == last {
                    rows = Vec::new();
                }
            },
            Err(err) => return Err(err),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;
    use crate::{
        models::record,
        store::fake::{Broken, FakeDocuments, FakeGraph},
    };

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = CATALOGUE.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), CATALOGUE.len());
        assert_eq!(CATALOGUE.len(), 30);
    }

    #[test]
    fn sections_are_contiguous() {
        let mut seen = Vec::new();
        for e in CATALOGUE {
            if seen.last() != Some(&e.section) {
                assert!(!seen.contains(&e.section), "{} breaks section order", e.name);
                seen.push(e.section);
            }
        }
        assert_eq!(seen, vec![Section::Documents, Section::Graph, Section::Cross]);
    }

    #[test]
    fn graph_sections_only_plan_graph_work() {
        let params = DemoParams::default();
        for e in CATALOGUE {
            let is_doc = matches!((e.build)(&params), Plan::Document(_));
            assert_eq!(is_doc, e.section == Section::Documents, "{}", e.name);
        }
    }

    #[test]
    fn every_graph_step_reads_declared_columns_on_its_final_step() {
        let params = DemoParams::default();
        for e in CATALOGUE {
            if let Plan::Graph(steps) = (e.build)(&params) {
                let last = steps.last().expect("graph plan has steps");
                assert!(!last.statement.columns.is_empty(), "{}", e.name);
            }
        }
    }

    #[test]
    fn find_unknown_entry() {
        assert!(find("count_after_1999").is_ok());
        assert!(matches!(find("nope"), Err(AppError::UnknownEntry(_))));
    }

    #[tokio::test]
    async fn empty_stores_give_empty_results() {
        let params = DemoParams::default();
        let docs = FakeDocuments::default();
        let graph = FakeGraph::default();
        for e in CATALOGUE {
            let rows = execute(e, &params, &docs, &graph).await.unwrap();
            assert!(rows.is_empty(), "{} returned {rows:?}", e.name);
        }
    }

    #[tokio::test]
    async fn count_after_1999_returns_store_count() {
        let docs = FakeDocuments::default().reply(Ok(vec![record([("count", 42)])]));
        let entry = find("count_after_1999").unwrap();
        let rows = execute(entry, &DemoParams::default(), &docs, &FakeGraph::default())
            .await
            .unwrap();
        assert_eq!(rows, vec![record([("count", 42)])]);
    }

    #[tokio::test]
    async fn propagating_step_failure_surfaces() {
        let entry = find("most_featured_actor").unwrap();
        let err = execute(entry, &DemoParams::default(), &FakeDocuments::default(), &Broken)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn lenient_entries_swallow_failures() {
        for name in ["actor_communities", "frequent_collaborations"] {
            let entry = find(name).unwrap();
            let rows = execute(entry, &DemoParams::default(), &FakeDocuments::default(), &Broken)
                .await
                .unwrap();
            assert!(rows.is_empty(), "{name}");
        }
    }

    #[tokio::test]
    async fn failed_write_still_reads() {
        let graph = FakeGraph::default()
            .reply(Err("constraint".to_string()))
            .reply(Ok(vec![record([("actor", json!("A")), ("community", json!(["B"]))])]));
        let entry = find("actor_communities").unwrap();
        let rows =
            execute(entry, &DemoParams::default(), &FakeDocuments::default(), &graph).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(graph.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn only_final_step_rows_are_returned() {
        let graph = FakeGraph::default()
            .reply(Ok(vec![record([("ignored", 1)])]))
            .reply(Ok(vec![record([("realisateur", "R")])]));
        let entry = find("frequent_collaborations").unwrap();
        let rows =
            execute(entry, &DemoParams::default(), &FakeDocuments::default(), &graph).await.unwrap();
        assert_eq!(rows, vec![record([("realisateur", "R")])]);
    }
}
