use mongodb::bson::{Bson, Document, doc};
use serde_json::Value;

use super::Plan;
use crate::{
    config::DemoParams,
    models::{Record, record},
    stats,
    store::DocumentRequest,
};

const YEAR: &str = "$year";
const RUNTIME: &str = "Runtime (Minutes)";
const REVENUE: &str = "Revenue (Millions)";

fn aggregate(pipeline: Vec<Document>) -> Plan {
    Plan::Document(DocumentRequest::Aggregate { pipeline })
}

fn decade_of_year() -> Bson {
    Bson::Document(doc! { "$subtract": [YEAR, { "$mod": [YEAR, 10] }] })
}

pub fn most_common_year(_: &DemoParams) -> Plan {
    aggregate(vec![
        doc! { "$group": { "_id": YEAR, "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": 1 },
    ])
}

pub fn count_after_1999(_: &DemoParams) -> Plan {
    Plan::Document(DocumentRequest::Count { filter: doc! { "year": { "$gt": 1999 } } })
}

pub fn average_votes_2007(_: &DemoParams) -> Plan {
    aggregate(vec![
        doc! { "$match": { "year": 2007 } },
        doc! { "$group": { "_id": Bson::Null, "average_votes": { "$avg": "$Votes" } } },
    ])
}

pub fn movies_per_year(_: &DemoParams) -> Plan {
    aggregate(vec![
        doc! { "$group": { "_id": YEAR, "count": { "$sum": 1 } } },
        doc! { "$sort": { "_id": 1 } },
    ])
}

pub fn available_genres(_: &DemoParams) -> Plan {
    Plan::Document(DocumentRequest::Distinct { field: "genre", filter: Document::new() })
}

pub fn highest_revenue_movie(_: &DemoParams) -> Plan {
    Plan::Document(DocumentRequest::Find {
        filter: doc! { "Revenue (Millions)": { "$nin": [Bson::Null, ""] } },
        sort: Some(doc! { "Revenue (Millions)": -1 }),
        limit: Some(1),
    })
}

pub fn prolific_directors(_: &DemoParams) -> Plan {
    aggregate(vec![
        doc! { "$match": { "Director": { "$nin": [Bson::Null, ""] } } },
        doc! { "$group": { "_id": "$Director", "count": { "$sum": 1 } } },
        doc! { "$match": { "count": { "$gt": 5 } } },
        doc! { "$sort": { "count": -1 } },
    ])
}

pub fn most_profitable_genre(_: &DemoParams) -> Plan {
    aggregate(vec![
        doc! { "$unwind": "$genre" },
        doc! { "$group": { "_id": "$genre", "average_revenue": { "$avg": format!("${REVENUE}") } } },
        doc! { "$sort": { "average_revenue": -1 } },
        doc! { "$limit": 1 },
        doc! { "$project": { "_id": 0, "genre": "$_id", "average_revenue": 1 } },
    ])
}

pub fn top_movies_per_decade(_: &DemoParams) -> Plan {
    aggregate(vec![
        doc! { "$addFields": { "decade": { "$concat": [{ "$toString": decade_of_year() }, "s"] } } },
        doc! { "$sort": { "decade": 1, "Metascore": -1 } },
        doc! {
            "$group": {
                "_id": "$decade",
                "top_films": { "$push": { "title": "$title", "Metascore": "$Metascore" } },
            }
        },
        doc! { "$project": { "top_3": { "$slice": ["$top_films", 3] } } },
        doc! { "$sort": { "_id": 1 } },
    ])
}

pub fn longest_movie_by_genre(_: &DemoParams) -> Plan {
    let runtime = format!("${RUNTIME}");
    aggregate(vec![
        doc! { "$unwind": "$genre" },
        doc! { "$sort": { "Runtime (Minutes)": -1 } },
        doc! {
            "$group": {
                "_id": "$genre",
                "film": { "$first": "$title" },
                "Runtime (Minutes)": { "$first": runtime },
            }
        },
        doc! { "$project": { "_id": 0, "genre": "$_id", "film": 1, "Runtime (Minutes)": 1 } },
        doc! { "$sort": { "genre": 1 } },
    ])
}

pub fn acclaimed_blockbusters(_: &DemoParams) -> Plan {
    Plan::Document(DocumentRequest::Find {
        filter: doc! { "Metascore": { "$gt": 80 }, "Revenue (Millions)": { "$gt": 50 } },
        sort: None,
        limit: None,
    })
}

pub fn runtime_vs_revenue(_: &DemoParams) -> Plan {
    let convert = |field: &str, to: &str| {
        doc! {
            "$convert": {
                "input": format!("${field}"),
                "to": to,
                "onError": Bson::Null,
                "onNull": Bson::Null,
            }
        }
    };
    aggregate(vec![
        doc! {
            "$project": {
                "_id": 0,
                "runtime": convert(RUNTIME, "int"),
                "revenue": convert(REVENUE, "double"),
            }
        },
        doc! { "$match": { "runtime": { "$ne": Bson::Null }, "revenue": { "$ne": Bson::Null } } },
    ])
}

/// Collapses `{runtime, revenue}` rows into a single Pearson summary row.
pub fn correlate_runtime_revenue(rows: Vec<Record>) -> Vec<Record> {
    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|r| Some((number(r.get("runtime")?)?, number(r.get("revenue")?)?)))
        .collect();

    let Some(c) = stats::pearson(&pairs) else {
        tracing::info!(samples = pairs.len(), "not enough usable runtime/revenue pairs");
        return Vec::new();
    };

    vec![record([
        ("samples", Value::from(c.samples)),
        ("pearson_r", Value::from(c.r)),
        ("p_value", Value::from(c.p_value)),
    ])]
}

// Relaxed extended JSON keeps ints as plain numbers but may wrap doubles.
fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::Object(o) => o.get("$numberDouble")?.as_str()?.parse().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

pub fn average_runtime_by_decade(_: &DemoParams) -> Plan {
    aggregate(vec![
        doc! { "$addFields": { "decade": decade_of_year() } },
        doc! { "$group": { "_id": "$decade", "average_runtime": { "$avg": format!("${RUNTIME}") } } },
        doc! { "$sort": { "_id": 1 } },
    ])
}
