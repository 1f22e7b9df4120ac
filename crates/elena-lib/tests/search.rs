mod common;

use elena_lib::{
    AStar, Dijkstra, GraphProvider, MidpointMiracle, SearchAlgorithm, SearchPlanner,
    SearchResult,
};

use common::{chokepoint, detours, five_node, lattice, twin_ridges};

#[test]
fn a_star_unconstrained_follows_distance() {
    let graph = five_node();
    let result = AStar::new(&graph).search(5, 2, f64::INFINITY);
    assert_eq!(result, SearchResult::new(vec![5, 1, 2], 10.0, 8.0));
}

#[test]
fn a_star_budget_trades_length_for_climb() {
    let graph = five_node();
    let result = AStar::new(&graph).search(5, 2, 15.0);
    assert_eq!(result, SearchResult::new(vec![5, 3, 2], 12.0, 6.0));
}

#[test]
fn dijkstra_unconstrained_finds_shortest() {
    let graph = chokepoint();
    let result = Dijkstra::new(&graph).search(1, 6, f64::INFINITY, false);
    assert_eq!(result, SearchResult::new(vec![1, 4, 5, 6], 100.0, 10.0));
}

#[test]
fn dijkstra_forward_is_starved_by_chokepoint() {
    let graph = chokepoint();
    let result = Dijkstra::new(&graph).search(1, 6, 150.0, false);
    assert_eq!(result, SearchResult::default());
}

#[test]
fn dijkstra_from_end_recovers_route() {
    let graph = chokepoint();
    let result = Dijkstra::new(&graph).search(1, 6, 150.0, true);
    assert_eq!(result, SearchResult::new(vec![1, 3, 5, 6], 115.0, 5.0));
}

#[test]
fn dijkstra_planner_tries_both_directions() {
    let graph = chokepoint();
    let planner = elena_lib::search::DijkstraPlanner;
    assert_eq!(planner.algorithm(), SearchAlgorithm::Dijkstra);
    let result = planner.search(&graph, 1, 6, 150.0);
    assert_eq!(result.path, vec![1, 3, 5, 6]);
}

#[test]
fn midpoint_without_pruning_keeps_high_ridge() {
    let graph = twin_ridges();
    let result = MidpointMiracle::new(&graph)
        .with_keep_n(2)
        .with_prune_depth(0)
        .search(1, 6, 3.0);
    assert_eq!(result, SearchResult::new(vec![1, 2, 6], 2.0, 10.0));
}

#[test]
fn midpoint_pruning_reaches_other_ridge() {
    let graph = twin_ridges();
    let result = MidpointMiracle::new(&graph)
        .with_keep_n(2)
        .with_prune_depth(1)
        .search(1, 6, 3.0);
    assert_eq!(result, SearchResult::new(vec![1, 3, 5, 6], 3.0, 13.0));
}

#[test]
fn midpoint_stays_direct_when_budget_forbids_detours() {
    let graph = detours();
    let result = MidpointMiracle::new(&graph).search(1, 4, 10.0);
    assert_eq!(result, SearchResult::new(vec![1, 4], 10.0, 0.0));
}

#[test]
fn midpoint_takes_pit_when_budget_allows() {
    let graph = detours();
    let result = MidpointMiracle::new(&graph).search(1, 4, 11.0);
    assert_eq!(result, SearchResult::new(vec![1, 2, 4], 11.0, 20.0));
}

#[test]
fn same_endpoints_are_a_single_node() {
    let graph = five_node();
    let expected = SearchResult::new(vec![3], 0.0, 0.0);
    assert_eq!(AStar::new(&graph).search(3, 3, f64::INFINITY), expected);
    assert_eq!(Dijkstra::new(&graph).search(3, 3, 20.0, true), expected);
    assert_eq!(MidpointMiracle::new(&graph).search(3, 3, 10.0), expected);
}

#[test]
fn a_star_and_dijkstra_agree_on_shortest_length() {
    let graph = lattice(8, 0.001);
    let nodes = graph.all_nodes();
    for (&start, &end) in nodes.iter().zip(nodes.iter().rev()).take(10) {
        let a_star = AStar::new(&graph).search(start, end, f64::INFINITY);
        let dijkstra = Dijkstra::new(&graph).search(start, end, f64::INFINITY, false);
        assert_eq!(a_star.path_len, dijkstra.path_len, "{start} -> {end}");
    }
}

#[test]
fn constrained_searches_respect_budget_and_shortest_bound() {
    let graph = lattice(8, 0.001);
    let (start, end) = (1, 64);
    let shortest = Dijkstra::new(&graph).search(start, end, f64::INFINITY, false);
    let budget = shortest.path_len * 1.4;

    let constrained = [
        AStar::new(&graph).search(start, end, budget),
        Dijkstra::new(&graph).search(start, end, budget, false),
        Dijkstra::new(&graph).search(start, end, budget, true),
        MidpointMiracle::new(&graph).search(start, end, budget),
    ];
    for result in constrained.iter().filter(|result| !result.is_empty()) {
        assert!(result.path_len >= shortest.path_len);
        assert!(result.path_len <= budget);
        assert_eq!(result.path.first(), Some(&start));
        assert_eq!(result.path.last(), Some(&end));
    }
}

#[test]
fn searches_are_repeatable() {
    let graph = lattice(6, 0.001);
    let budget = 1500.0;
    assert_eq!(
        MidpointMiracle::new(&graph).search(1, 36, budget),
        MidpointMiracle::new(&graph).search(1, 36, budget)
    );
    assert_eq!(
        AStar::new(&graph).search(1, 36, budget),
        AStar::new(&graph).search(1, 36, budget)
    );
}

#[test]
fn reported_gain_matches_path() {
    let graph = lattice(7, 0.001);
    let result = MidpointMiracle::new(&graph).search(1, 49, 1800.0);
    assert!(!result.is_empty());

    let recomputed: f64 = result
        .path
        .windows(2)
        .map(|pair| {
            let from = graph.elevation(pair[0]).expect("node on path");
            let to = graph.elevation(pair[1]).expect("node on path");
            (to - from).max(0.0)
        })
        .sum();
    assert!((recomputed - result.ele_gain).abs() < 1e-9);

    let length: f64 = result
        .path
        .windows(2)
        .map(|pair| graph.edge_distance(pair[0], pair[1]).expect("edge on path"))
        .sum();
    assert!((length - result.path_len).abs() < 1e-9);
}
