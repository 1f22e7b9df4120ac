#![allow(dead_code)]

use elena_lib::{Coords, NodeId, RoadGraph};

/// Build a graph from explicit adjacency lists.
///
/// `lengths` is symmetric: `(a, b, len)` serves both `a -> b` and `b -> a`.
pub fn build(
    nodes: &[(NodeId, f64, f64, f64)],
    adjacency: &[(NodeId, &[NodeId])],
    lengths: &[(NodeId, NodeId, f64)],
) -> RoadGraph {
    let mut graph = RoadGraph::new();
    for &(id, x, y, z) in nodes {
        graph.insert_node(id, Coords::new(x, y, z));
    }
    for &(tail, heads) in adjacency {
        for &head in heads {
            let length = lengths
                .iter()
                .find(|(a, b, _)| (*a == tail && *b == head) || (*a == head && *b == tail))
                .map(|(_, _, length)| *length)
                .expect("every adjacency has a length");
            graph.add_edge(tail, head, length);
        }
    }
    graph
}

/// Five nodes on a diamond with a single valley at node 5.
pub fn five_node() -> RoadGraph {
    build(
        &[
            (1, 1.0, 0.0, 8.0),
            (2, 0.0, 0.0, 5.0),
            (3, 0.0, 1.0, 6.0),
            (4, 0.0, -1.0, 3.0),
            (5, -1.0, 0.0, 0.0),
        ],
        &[
            (1, &[2, 3, 5]),
            (2, &[1, 3, 4]),
            (3, &[1, 2, 5]),
            (4, &[2, 5]),
            (5, &[1, 4, 3]),
        ],
        &[
            (1, 2, 5.0),
            (1, 3, 8.0),
            (1, 5, 5.0),
            (2, 3, 4.0),
            (2, 4, 9.0),
            (3, 5, 8.0),
            (4, 5, 10.0),
        ],
    )
}

/// Three corridors from 1 converge on 5, the only way to 6.
pub fn chokepoint() -> RoadGraph {
    build(
        &[
            (1, 0.000, 0.000, 0.0),
            (2, 0.001, 0.001, 0.0),
            (3, 0.001, 0.000, 5.0),
            (4, 0.001, -0.001, 10.0),
            (5, 0.002, 0.000, 0.0),
            (6, 0.003, 0.000, 0.0),
        ],
        &[
            (1, &[2, 3, 4]),
            (2, &[1, 5]),
            (3, &[1, 5]),
            (4, &[1, 5]),
            (5, &[2, 3, 4, 6]),
            (6, &[5]),
        ],
        &[
            (1, 2, 50.0),
            (2, 5, 100.0),
            (1, 3, 100.0),
            (3, 5, 10.0),
            (1, 4, 70.0),
            (4, 5, 25.0),
            (5, 6, 5.0),
        ],
    )
}

/// Two ridges between 1 and 6: a high one through 2 and 4, a valley-to-peak
/// one through 3 and 5. Every edge has length 1.
pub fn twin_ridges() -> RoadGraph {
    build(
        &[
            (1, 0.0, 0.0, 5.0),
            (2, 1.0, 1.0, 15.0),
            (3, 1.0, -1.0, 0.0),
            (4, 2.0, 2.0, 14.0),
            (5, 2.0, -1.0, 13.0),
            (6, 3.0, 0.0, 5.0),
        ],
        &[
            (1, &[2, 3]),
            (2, &[1, 4, 6]),
            (3, &[1, 5]),
            (4, &[2, 6]),
            (5, &[3, 6]),
            (6, &[2, 4, 5]),
        ],
        &[
            (1, 2, 1.0),
            (1, 3, 1.0),
            (2, 4, 1.0),
            (2, 6, 1.0),
            (3, 5, 1.0),
            (4, 6, 1.0),
            (5, 6, 1.0),
        ],
    )
}

/// Direct 1-4 road plus short hops through a pit (2) or a peak (3).
pub fn detours() -> RoadGraph {
    build(
        &[
            (1, 0.0000, 0.0, 20.0),
            (2, 0.0005, -0.0005, 0.0),
            (3, 0.0005, 0.0005, 39.0),
            (4, 0.0010, 0.0, 20.0),
        ],
        &[(1, &[2, 3, 4]), (2, &[1, 4]), (3, &[1, 4]), (4, &[2, 3, 1])],
        &[
            (1, 4, 10.0),
            (1, 2, 10.0),
            (1, 3, 10.0),
            (2, 4, 1.0),
            (3, 4, 1.0),
        ],
    )
}

/// Square lattice of `side * side` nodes spaced `step` degrees apart, with
/// elevation rising towards the centre.
pub fn lattice(side: i64, step: f64) -> RoadGraph {
    let mut graph = RoadGraph::new();
    let centre = (side - 1) as f64 / 2.0;
    let id = |row: i64, col: i64| row * side + col + 1;
    for row in 0..side {
        for col in 0..side {
            let dr = row as f64 - centre;
            let dc = col as f64 - centre;
            let height = 100.0 - (dr * dr + dc * dc).sqrt() * 5.0 + ((row * 7 + col * 3) % 5) as f64;
            graph.insert_node(
                id(row, col),
                Coords::new(col as f64 * step, row as f64 * step, height),
            );
        }
    }
    for row in 0..side {
        for col in 0..side {
            if col + 1 < side {
                graph.add_two_way_edge(id(row, col), id(row, col + 1), 100.0);
            }
            if row + 1 < side {
                graph.add_two_way_edge(id(row, col), id(row + 1, col), 100.0);
            }
        }
    }
    graph
}
