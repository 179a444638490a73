use std::{io::Write, time::Instant};

use tracing::{debug, info, warn};

use crate::{
    catalogue::{self, CATALOGUE, Entry},
    config::DemoParams,
    error::AppResult,
    models::{EntryReport, Outcome, RunReport},
    output::Printer,
    store::{DocumentStore, GraphStore},
};

/// Entries named in `only`, in catalogue order; the whole catalogue when `only` is empty.
pub fn select(only: &[String]) -> AppResult<Vec<&'static Entry>> {
    for name in only {
        catalogue::find(name)?;
    }
    Ok(CATALOGUE
        .iter()
        .filter(|e| only.is_empty() || only.iter().any(|n| n == e.name))
        .collect())
}

/// Runs `entries` one after another. A failing entry is reported and the run moves on.
pub async fn run<W: Write>(
    entries: &[&'static Entry],
    params: &DemoParams,
    documents: &dyn DocumentStore,
    graph: &dyn GraphStore,
    printer: &mut Printer<W>,
) -> AppResult<RunReport> {
    let mut report = RunReport { started_at: jiff::Timestamp::now(), entries: Vec::new() };

    for (i, entry) in entries.iter().enumerate() {
        debug!(entry = entry.name, position = i + 1, total = entries.len(), "running entry");
        let started = Instant::now();

        let outcome = match catalogue::execute(entry, params, documents, graph).await {
            Ok(rows) => {
                info!(
                    entry = entry.name,
                    rows = rows.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "entry finished"
                );
                Outcome::Ok { rows }
            },
            Err(err) => {
                warn!(entry = entry.name, error = %err, "entry failed");
                Outcome::Failed { error: err.to_string() }
            },
        };

        let entry_report = EntryReport {
            entry: entry.name,
            section: entry.section,
            elapsed_ms: started.elapsed().as_millis() as u64,
            outcome,
        };
        printer.entry(entry, &entry_report)?;
        report.entries.push(entry_report);
    }

    printer.summary(&report)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::record,
        output::OutputFormat,
        store::fake::{Broken, FakeDocuments, FakeGraph},
    };

    fn printer() -> Printer<Vec<u8>> {
        Printer::new(Vec::new(), OutputFormat::Text)
    }

    #[test]
    fn select_keeps_catalogue_order() {
        let picked =
            select(&["frequent_collaborations".to_string(), "most_common_year".to_string()])
                .unwrap();
        let names: Vec<_> = picked.iter().map(|e| e.name).collect();
        assert_eq!(names, ["most_common_year", "frequent_collaborations"]);
    }

    #[test]
    fn select_everything_by_default() {
        assert_eq!(select(&[]).unwrap().len(), CATALOGUE.len());
    }

    #[test]
    fn select_rejects_unknown() {
        let err = select(&["count_after_1999".to_string(), "typo".to_string()]).err().unwrap();
        assert!(matches!(err, AppError::UnknownEntry(name) if name == "typo"));
    }

    #[tokio::test]
    async fn empty_stores_run_to_completion() {
        let entries = select(&[]).unwrap();
        let mut out = printer();
        let report = run(
            &entries,
            &DemoParams::default(),
            &FakeDocuments::default(),
            &FakeGraph::default(),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(report.entries.len(), CATALOGUE.len());
        assert_eq!(report.failures(), 0);
        for e in &report.entries {
            assert!(matches!(&e.outcome, Outcome::Ok { rows } if rows.is_empty()), "{}", e.entry);
        }
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_run() {
        let entries = select(&[]).unwrap();
        let mut out = printer();
        let report =
            run(&entries, &DemoParams::default(), &Broken, &Broken, &mut out).await.unwrap();

        assert_eq!(report.entries.len(), CATALOGUE.len());
        // the two lenient graph entries swallow their own failures
        assert_eq!(report.failures(), CATALOGUE.len() - 2);

        let text = String::from_utf8(out.into_inner()).unwrap();
        let failed = CATALOGUE.len() - 2;
        assert!(text.contains(&format!("{} entries, {failed} failed", CATALOGUE.len())));
    }

    #[tokio::test]
    async fn results_reach_the_printer() {
        let entries = select(&["most_featured_actor".to_string()]).unwrap();
        let graph = FakeGraph::default().reply(Ok(vec![record([
            ("actor", serde_json::json!("Mark Wahlberg")),
            ("films", serde_json::json!(15)),
        ])]));
        let mut out = printer();
        let docs = FakeDocuments::default();
        let report =
            run(&entries, &DemoParams::default(), &docs, &graph, &mut out).await.unwrap();

        assert_eq!(report.failures(), 0);
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("[most_featured_actor]"));
        assert!(text.contains("Mark Wahlberg"));
    }
}
