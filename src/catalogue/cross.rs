//! Questions that combine film metadata with the people graph.

use super::{GraphStep, Plan};
use crate::{config::DemoParams, store::Statement};

pub fn same_genre_different_director(_: &DemoParams) -> Plan {
    Plan::Graph(vec![GraphStep::read(
        Statement::new(
            "MATCH (f1:Film)-[:A_UN_GENRE]->(g:Genre)<-[:A_UN_GENRE]-(f2:Film),
                   (f1)<-[:A_REALISE]-(d1:Realisateur),
                   (f2)<-[:A_REALISE]-(d2:Realisateur)
             WHERE f1 <> f2 AND d1 <> d2
             RETURN DISTINCT f1.title AS film1, d1.name AS director1,
                             f2.title AS film2, d2.name AS director2, g.name AS genre
             LIMIT 20",
        )
        .columns(&["film1", "director1", "film2", "director2", "genre"]),
    )])
}

pub fn recommend_from_actor(p: &DemoParams) -> Plan {
    Plan::Graph(vec![GraphStep::read(
        Statement::new(
            "MATCH (a:Actor {name: $name})-[:A_JOUE]->(:Film)-[:A_UN_GENRE]->(g:Genre)
             WITH a, collect(DISTINCT g.name) AS preferred_genres
             MATCH (f:Film)-[:A_UN_GENRE]->(g2:Genre)
             WHERE g2.name IN preferred_genres AND NOT (a)-[:A_JOUE]->(f)
             RETURN f.title AS recommendation, collect(DISTINCT g2.name) AS matching_genres
             ORDER BY size(matching_genres) DESC, recommendation
             LIMIT 10",
        )
        .param("name", &p.taste_of)
        .columns(&["recommendation", "matching_genres"]),
    )])
}

pub fn director_competition(_: &DemoParams) -> Plan {
    Plan::Graph(vec![GraphStep::read(
        Statement::new(
            "MATCH (f1:Film)<-[:A_REALISE]-(d1:Realisateur),
                   (f2:Film)<-[:A_REALISE]-(d2:Realisateur),
                   (f1)-[:A_UN_GENRE]->(g:Genre)<-[:A_UN_GENRE]-(f2)
             WHERE f1 <> f2 AND f1.year = f2.year AND d1 <> d2
             WITH d1, d2, f1.year AS year, g.name AS genre
             MERGE (d1)-[:EN_CONCURRENCE_AVEC]->(d2)
             RETURN DISTINCT d1.name AS director1, d2.name AS director2, year, genre
             LIMIT 20",
        )
        .columns(&["director1", "director2", "year", "genre"]),
    )])
}

pub fn frequent_collaborations(_: &DemoParams) -> Plan {
    let upsert = Statement::new(
        "MATCH (r:Realisateur)-[:A_REALISE]->(f:Film)<-[:A_JOUE]-(a:Actor)
         WHERE (f.`Revenue (Millions)` IS NOT NULL AND f.`Revenue (Millions)` <> '')
            OR (f.Metascore IS NOT NULL AND f.Metascore <> '')
         WITH r, a,
              count(DISTINCT f) AS collaborations,
              sum(CASE WHEN f.`Revenue (Millions)` IS NOT NULL AND f.`Revenue (Millions)` <> ''
                       THEN toFloat(f.`Revenue (Millions)`) ELSE 0 END) AS total_revenue,
              sum(CASE WHEN f.Metascore IS NOT NULL AND f.Metascore <> ''
                       THEN toInteger(f.Metascore) ELSE 0 END) AS total_metascore
         MERGE (r)-[c:COLLAB_AVEC]->(a)
         SET c.count = collaborations,
             c.total_revenue = total_revenue,
             c.total_metascore = total_metascore",
    );
    let top = Statement::new(
        "MATCH (r:Realisateur)-[c:COLLAB_AVEC]->(a:Actor)
         WHERE c.count >= 2
         RETURN r.name AS director,
                a.name AS actor,
                c.count AS collaborations,
                round(toFloat(c.total_revenue) / c.count, 2) AS average_revenue,
                round(toFloat(c.total_metascore) / c.count, 1) AS average_metascore
         ORDER BY collaborations DESC, average_revenue DESC
         LIMIT 20",
    )
    .columns(&["director", "actor", "collaborations", "average_revenue", "average_metascore"]);

    Plan::Graph(vec![GraphStep::lenient(upsert), GraphStep::lenient(top)])
}
