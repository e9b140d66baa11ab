//! # Rewrite Scenario Tests (T0-T3)
//!
//! End-to-end checks of the public API.
//!
//! ## Tiers
//! - T0: Graph Integrity
//! - T1: Matching
//! - T2: Single Rewrite
//! - T3: Derivation

use graft_core::{
    GraftError, Generator, Graph, Label, Mapping, MappingViolation, Production, Vertex, VertexId,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn id(s: &str) -> VertexId {
    VertexId::new(s)
}

fn mapping(pairs: &[(&str, &str)]) -> Mapping {
    pairs.iter().copied().collect()
}

// =============================================================================
// TIER T0: GRAPH INTEGRITY
// =============================================================================

mod t0_graph_integrity {
    use super::*;

    /// T0.1: Adding the same edge twice yields one edge.
    #[test]
    fn edge_insertion_idempotent() {
        let mut graph = Graph::new();
        graph.add_edge(Vertex::new("u", "A"), Vertex::new("v", "B"));
        graph.add_edge(Vertex::new("u", "A"), Vertex::new("v", "B"));

        assert!(graph.has_edge(&id("u"), &id("v")));
        assert_eq!(graph.successors(&id("u")).len(), 1);
    }

    /// T0.2: Removing a vertex leaves no edge referencing it.
    #[test]
    fn cascading_delete() {
        let mut graph = Graph::new();
        graph.add_edge(Vertex::new("a", "A"), Vertex::new("x", "X"));
        graph.add_edge(Vertex::new("x", "X"), Vertex::new("b", "B"));
        graph.add_edge(Vertex::new("b", "B"), Vertex::new("a", "A"));

        graph.remove_vertex(&id("x"));

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges().all(|(f, t)| *f != id("x") && *t != id("x")));
        assert!(graph.is_consistent());
    }

    /// T0.3: Fresh identifiers never collide, even with interleaved inserts.
    #[test]
    fn fresh_identifiers_unique() {
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new("v1", "A"));

        let first = graph.fresh_identifier();
        graph.add_vertex(Vertex::new(first.clone(), "A"));
        graph.add_vertex(Vertex::new("v3", "A"));
        let second = graph.fresh_identifier();
        let third = graph.fresh_identifier();

        assert_eq!(first, id("v0"));
        assert_eq!(second, id("v2"));
        assert_eq!(third, id("v4"));
        assert!(!graph.contains_vertex(&second));
        assert!(!graph.contains_vertex(&third));
    }
}

// =============================================================================
// TIER T1: MATCHING
// =============================================================================

mod t1_matching {
    use super::*;

    /// T1.1: One vertex pattern against A -> B matches exactly once.
    #[test]
    fn single_vertex_pattern() {
        init_tracing();
        let mut graph = Graph::new();
        graph.add_edge(Vertex::new("u1", "A"), Vertex::new("u2", "B"));
        let mut lhs = Graph::new();
        lhs.add_vertex(Vertex::new("u1", "A"));
        let productions = [Production::new(lhs, Graph::new())];

        let occurrences = Generator::new()
            .find_matching_productions(&graph, &productions)
            .expect("search");

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].mapping, mapping(&[("u1", "u1")]));
    }

    /// T1.2: Every returned mapping is sound.
    #[test]
    fn returned_mappings_are_sound() {
        let mut graph = Graph::new();
        for (from, to) in [("a", "b"), ("b", "c"), ("c", "d"), ("a", "c")] {
            graph.add_edge(Vertex::new(from, "N"), Vertex::new(to, "N"));
        }
        let mut lhs = Graph::new();
        lhs.add_edge(Vertex::new("p", "N"), Vertex::new("q", "N"));
        lhs.add_edge(Vertex::new("q", "N"), Vertex::new("r", "N"));
        let productions = [Production::new(lhs, Graph::new())];

        let occurrences = Generator::new()
            .find_matching_productions(&graph, &productions)
            .expect("search");

        // a-b-c, b-c-d, a-c-d
        assert_eq!(occurrences.len(), 3);
        for occurrence in &occurrences {
            let lhs = occurrence.production.lhs();
            assert!(occurrence.mapping.is_injective());
            for vertex in lhs.vertices() {
                let host = occurrence.mapping.get(vertex.id()).expect("mapped");
                assert_eq!(graph.label(host), Some(vertex.label()));
            }
            for (from, to) in lhs.edges() {
                let (hf, ht) = occurrence.mapping.edge_image(from, to).expect("mapped");
                assert!(graph.has_edge(hf, ht));
            }
        }
    }
}

// =============================================================================
// TIER T2: SINGLE REWRITE
// =============================================================================

mod t2_single_rewrite {
    use super::*;

    /// T2.1: An identity production leaves the graph untouched.
    #[test]
    fn noop_rewrite() {
        let mut graph = Graph::new();
        graph.add_edge(Vertex::new("g0", "A"), Vertex::new("g1", "B"));
        graph.add_edge(Vertex::new("g1", "B"), Vertex::new("g2", "C"));
        let mut pattern = Graph::new();
        pattern.add_edge(Vertex::new("x", "A"), Vertex::new("y", "B"));
        let production = Production::new(pattern.clone(), pattern);
        let before: Vec<_> = graph.edges().map(|(f, t)| (f.clone(), t.clone())).collect();

        let summary = Generator::new()
            .apply_production(&mut graph, &production, &mapping(&[("x", "g0"), ("y", "g1")]))
            .expect("apply");

        let after: Vec<_> = graph.edges().map(|(f, t)| (f.clone(), t.clone())).collect();
        assert!(summary.is_noop());
        assert_eq!(before, after);
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.label(&id("g2")), Some(&Label::new("C")));
    }

    /// T2.2: Edge added between existing vertices via rhs mapping.
    #[test]
    fn add_edge_scenario() {
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new("g0", "A"));
        graph.add_vertex(Vertex::new("g1", "B"));
        let mut rhs = Graph::new();
        rhs.add_edge(Vertex::new("r0", "A"), Vertex::new("r1", "B"));
        let production = Production::new(Graph::new(), rhs);

        Generator::add_new_edges(&mut graph, &production, &mapping(&[("r0", "g0"), ("r1", "g1")]));

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(&id("g0"), &id("g1")));
    }

    /// T2.3: A -> B ==> A removes B and the edge.
    #[test]
    fn delete_role_scenario() {
        init_tracing();
        let mut graph = Graph::new();
        graph.add_edge(Vertex::new("g0", "A"), Vertex::new("g1", "B"));
        let mut lhs = Graph::new();
        lhs.add_edge(Vertex::new("l0", "A"), Vertex::new("l1", "B"));
        let mut rhs = Graph::new();
        rhs.add_vertex(Vertex::new("l0", "A"));
        let production = Production::new(lhs, rhs);

        let summary = Generator::new()
            .apply_production(&mut graph, &production, &mapping(&[("l0", "g0"), ("l1", "g1")]))
            .expect("apply");

        assert_eq!(graph.vertex_count(), 1);
        assert!(graph.contains_vertex(&id("g0")));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(summary.edges_removed, 1);
        assert_eq!(summary.vertices_removed, 1);
    }

    /// T2.4: Empty productions on an empty graph add nothing.
    #[test]
    fn empty_production_on_empty_graph() {
        let mut graph = Graph::new();
        let production = Production::new(Graph::new(), Graph::new());

        let summary = Generator::new()
            .apply_production(&mut graph, &production, &Mapping::new())
            .expect("apply");

        assert_eq!(summary.vertices_added, 0);
        assert_eq!(summary.edges_added, 0);
        assert!(graph.is_empty());
    }

    /// T2.5: An invalid mapping is rejected and nothing changes.
    #[test]
    fn rejected_mapping_leaves_graph_untouched() {
        let mut graph = Graph::new();
        graph.add_edge(Vertex::new("g0", "A"), Vertex::new("g1", "B"));
        let mut lhs = Graph::new();
        lhs.add_edge(Vertex::new("l0", "A"), Vertex::new("l1", "B"));
        let production = Production::new(lhs, Graph::new());

        let result = Generator::new().apply_production(
            &mut graph,
            &production,
            &mapping(&[("l0", "g1"), ("l1", "g0")]),
        );

        assert!(matches!(
            result,
            Err(GraftError::InvalidMapping(MappingViolation::LabelMismatch { .. }))
        ));
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }
}

// =============================================================================
// TIER T3: DERIVATION
// =============================================================================

mod t3_derivation {
    use super::*;
    use graft_core::{Grammar, StopReason, apply_productions};

    const BINARY_TREE: &str = r#"
        [derivation]
        max_steps = 3
        selection = "last"

        [[production]]
        name = "split"
        lhs.vertices = [{ id = "leaf", label = "L" }]
        rhs.vertices = [
            { id = "leaf", label = "L" },
            { id = "left", label = "L" },
            { id = "right", label = "L" },
        ]
        rhs.edges = [["leaf", "left"], ["leaf", "right"]]
    "#;

    /// T3.1: A grammar loaded from TOML derives a binary tree.
    #[test]
    fn grammar_derives_tree() {
        init_tracing();
        let grammar = Grammar::from_toml_str(BINARY_TREE).expect("grammar");
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new("root", "L"));

        let report =
            apply_productions(&mut graph, &grammar.productions, &grammar.config).expect("derive");

        // Always splitting the newest leaf: root -> v1 -> v3.
        assert_eq!(report.stop, StopReason::Halted);
        assert_eq!(report.steps.len(), 3);
        assert_eq!(graph.vertex_count(), 7);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.successors(&id("root")), &[id("v0"), id("v1")]);
        assert_eq!(graph.successors(&id("v1")), &[id("v2"), id("v3")]);
        assert_eq!(graph.successors(&id("v3")), &[id("v4"), id("v5")]);
        assert!(graph.is_consistent());
    }

    /// T3.2: A production whose lhs never matches exhausts immediately.
    #[test]
    fn unmatched_grammar_exhausts() {
        let grammar = Grammar::from_toml_str(BINARY_TREE).expect("grammar");
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new("root", "X"));

        let report =
            apply_productions(&mut graph, &grammar.productions, &grammar.config).expect("derive");

        assert_eq!(report.stop, StopReason::Exhausted);
        assert!(report.steps.is_empty());
        assert_eq!(graph.vertex_count(), 1);
    }
}

// =============================================================================
// THREAD SAFETY
// =============================================================================

#[test]
fn engine_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Graph>();
    assert_send_sync::<Production>();
    assert_send_sync::<Mapping>();
    assert_send_sync::<Generator>();
}
