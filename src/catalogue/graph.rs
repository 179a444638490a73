use super::{GraphStep, Plan};
use crate::{config::DemoParams, store::Statement};

fn read(statement: Statement) -> Plan {
    Plan::Graph(vec![GraphStep::read(statement)])
}

pub fn most_featured_actor(_: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (a:Actor)-[:A_JOUE]->(f:Film)
             RETURN a.name AS actor, count(f) AS films
             ORDER BY films DESC
             LIMIT 1",
        )
        .columns(&["actor", "films"]),
    )
}

pub fn coactors_of(p: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (a:Actor)-[:A_JOUE]->(:Film)<-[:A_JOUE]-(:Actor {name: $name})
             WHERE a.name <> $name
             RETURN DISTINCT a.name AS actor
             ORDER BY actor",
        )
        .param("name", &p.coactor_of)
        .columns(&["actor"]),
    )
}

pub fn highest_grossing_actor(_: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (a:Actor)-[:A_JOUE]->(f:Film)
             WHERE f.revenue IS NOT NULL
             RETURN a.name AS actor, sum(f.revenue) AS total_revenue
             ORDER BY total_revenue DESC
             LIMIT 1",
        )
        .columns(&["actor", "total_revenue"]),
    )
}

pub fn average_film_votes(_: &DemoParams) -> Plan {
    // avg() over no rows still yields one null row; filter it out so empty stays empty.
    read(
        Statement::new(
            "MATCH (f:Film)
             WHERE f.votes IS NOT NULL
             WITH avg(f.votes) AS average_votes
             WHERE average_votes IS NOT NULL
             RETURN average_votes",
        )
        .columns(&["average_votes"]),
    )
}

pub fn most_common_genre(_: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (f:Film)-[:A_UN_GENRE]->(g:Genre)
             RETURN g.name AS genre, count(f) AS count
             ORDER BY count DESC
             LIMIT 1",
        )
        .columns(&["genre", "count"]),
    )
}

pub fn films_with_group_members(p: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (m:Actor)-[:A_JOUE]->(f:Film)<-[:A_JOUE]-(:Actor)
             WHERE m.name IN $names
             RETURN DISTINCT f.title AS film
             ORDER BY film",
        )
        .param_list("names", &p.group_members)
        .columns(&["film"]),
    )
}

pub fn director_with_most_actors(_: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (r:Realisateur)-[:A_REALISE]->(:Film)<-[:A_JOUE]-(a:Actor)
             RETURN r.name AS director, count(DISTINCT a) AS unique_actors
             ORDER BY unique_actors DESC
             LIMIT 1",
        )
        .columns(&["director", "unique_actors"]),
    )
}

pub fn most_connected_films(_: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (f:Film)<-[:A_JOUE]-(:Actor)-[:A_JOUE]->(other:Film)
             WHERE f <> other
             RETURN f.title AS film, count(DISTINCT other) AS connections
             ORDER BY connections DESC
             LIMIT 5",
        )
        .columns(&["film", "connections"]),
    )
}

pub fn actors_with_most_directors(_: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (a:Actor)-[:A_JOUE]->(:Film)<-[:A_REALISE]-(r:Realisateur)
             RETURN a.name AS actor, count(DISTINCT r) AS director_count
             ORDER BY director_count DESC
             LIMIT 5",
        )
        .columns(&["actor", "director_count"]),
    )
}

pub fn recommend_by_genre(p: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (a:Actor {name: $name})-[:A_JOUE]->(:Film)-[:A_UN_GENRE]->(g:Genre)
             WITH a, collect(DISTINCT g.name) AS genres
             MATCH (f:Film)-[:A_UN_GENRE]->(g2:Genre)
             WHERE g2.name IN genres AND NOT (a)-[:A_JOUE]->(f)
             RETURN DISTINCT f.title AS recommended_film
             LIMIT 5",
        )
        .param("name", &p.recommend_for)
        .columns(&["recommended_film"]),
    )
}

pub fn director_influence(_: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (r1:Realisateur)-[:A_REALISE]->(:Film)-[:A_UN_GENRE]->(:Genre)
                   <-[:A_UN_GENRE]-(:Film)<-[:A_REALISE]-(r2:Realisateur)
             WHERE r1 <> r2
             WITH DISTINCT r1, r2
             MERGE (r1)-[:INFLUENCE_PAR]->(r2)
             RETURN r1.name AS director, r2.name AS influenced_by",
        )
        .columns(&["director", "influenced_by"]),
    )
}

pub fn shortest_actor_path(p: &DemoParams) -> Plan {
    read(
        Statement::new(
            "MATCH (a1:Actor {name: $from}), (a2:Actor {name: $to})
             MATCH route = shortestPath((a1)-[:A_JOUE*]-(a2))
             RETURN [n IN nodes(route) | coalesce(n.name, n.title)] AS path,
                    length(route) AS hops",
        )
        .param("from", &p.path_from)
        .param("to", &p.path_to)
        .columns(&["path", "hops"]),
    )
}

pub fn actor_communities(_: &DemoParams) -> Plan {
    let co_star = Statement::new(
        "MATCH (a1:Actor)-[:A_JOUE]->(f:Film)<-[:A_JOUE]-(a2:Actor)
         WHERE a1.name < a2.name
         WITH a1, a2, count(f) AS films_together
         WHERE films_together >= 2
         MERGE (a1)-[r:COJOUE]-(a2)
         SET r.score = films_together",
    );
    let communities = Statement::new(
        "MATCH (a:Actor)-[:COJOUE]-()
         WITH collect(DISTINCT a) AS linked
         UNWIND linked AS a1
         UNWIND linked AS a2
         WITH a1, a2 WHERE a1 <> a2
         MATCH route = shortestPath((a1)-[:COJOUE*]-(a2))
         WITH a1.name AS actor, collect(DISTINCT a2.name) AS community
         RETURN actor, community
         ORDER BY size(community) DESC, actor
         LIMIT 20",
    )
    .columns(&["actor", "community"]);

    Plan::Graph(vec![GraphStep::lenient(co_star), GraphStep::lenient(communities)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalogue::OnError, store::Param};

    fn steps(plan: Plan) -> Vec<GraphStep> {
        match plan {
            Plan::Graph(steps) => steps,
            Plan::Document(_) => panic!("expected graph plan"),
        }
    }

    fn hostile() -> DemoParams {
        DemoParams {
            coactor_of: r#"x"}) DETACH DELETE (n) //"#.to_string(),
            recommend_for: "O'Brien".to_string(),
            path_from: "\"".to_string(),
            ..DemoParams::default()
        }
    }

    #[test]
    fn names_are_bound_not_interpolated() {
        let p = hostile();
        for plan in [coactors_of(&p), recommend_by_genre(&p), shortest_actor_path(&p)] {
            let step = steps(plan).pop().unwrap();
            assert!(!step.statement.cypher.contains("DETACH"));
            assert!(!step.statement.cypher.contains("O'Brien"));
            assert!(!step.statement.params.is_empty());
        }
        let step = steps(coactors_of(&p)).pop().unwrap();
        assert_eq!(step.statement.params, vec![("name", Param::Text(p.coactor_of.clone()))]);
    }

    #[test]
    fn group_members_bound_as_list() {
        let p = DemoParams::default();
        let step = steps(films_with_group_members(&p)).pop().unwrap();
        assert_eq!(step.statement.params, vec![("names", Param::TextList(p.group_members))]);
    }

    #[test]
    fn most_featured_actor_takes_top_one_by_count() {
        let step = steps(most_featured_actor(&DemoParams::default())).pop().unwrap();
        assert!(step.statement.cypher.contains("ORDER BY films DESC"));
        assert!(step.statement.cypher.contains("LIMIT 1"));
        assert_eq!(step.statement.columns, ["actor", "films"]);
    }

    #[test]
    fn influence_merges_each_pair_once() {
        let step = steps(director_influence(&DemoParams::default())).pop().unwrap();
        let cypher = step.statement.cypher;
        let distinct = cypher.find("WITH DISTINCT r1, r2").unwrap();
        let merge = cypher.find("MERGE (r1)-[:INFLUENCE_PAR]->(r2)").unwrap();
        assert!(distinct < merge);
        assert!(!cypher.contains("CREATE"));
    }

    #[test]
    fn communities_write_then_read_leniently() {
        let steps = steps(actor_communities(&DemoParams::default()));
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.on_error == OnError::Skip));
        assert!(steps[0].statement.cypher.contains("MERGE (a1)-[r:COJOUE]-(a2)"));
        assert!(steps[0].statement.columns.is_empty());
    }

    #[test]
    fn communities_reach_through_shortest_paths() {
        let steps = steps(actor_communities(&DemoParams::default()));
        let cypher = steps[1].statement.cypher;
        assert!(cypher.contains("shortestPath((a1)-[:COJOUE*]-(a2))"));
        // every variable-length match is bounded by shortestPath
        assert_eq!(cypher.matches("[:COJOUE*]").count(), cypher.matches("shortestPath(").count());
        assert_eq!(steps[1].statement.columns, ["actor", "community"]);
    }
}
