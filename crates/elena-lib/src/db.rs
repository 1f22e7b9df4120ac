use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::{BoundingBox, Coords, LatLon};
use crate::graph::RoadGraph;
use crate::source::{best_place_match, GeoSource, Geocoder};

const NODE_COLUMNS: &[&str] = &["id", "lon", "lat", "elevation"];
const EDGE_COLUMNS: &[&str] = &["tail", "head", "length"];
const PLACE_COLUMNS: &[&str] = &["name", "lat", "lon"];

/// Road network stored in a SQLite file.
///
/// Expected tables:
///
/// - `nodes(id INTEGER, lon REAL, lat REAL, elevation REAL NULL)`
/// - `edges(tail INTEGER, head INTEGER, length REAL)`, one row per direction
/// - `places(name TEXT, lat REAL, lon REAL)`, optional, used for geocoding
pub struct SqliteSource {
    connection: Mutex<Connection>,
    has_places: bool,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("has_places", &self.has_places)
            .finish()
    }
}

impl SqliteSource {
    /// Open a dataset, verifying its schema.
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(Error::DatasetNotFound {
                path: db_path.to_path_buf(),
            });
        }
        let connection = Connection::open(db_path)?;
        Self::from_connection(connection)
    }

    /// Wrap an already-open connection, verifying its schema.
    pub fn from_connection(connection: Connection) -> Result<Self> {
        if !table_exists(&connection, "nodes")?
            || !table_exists(&connection, "edges")?
            || !table_has_columns(&connection, "nodes", NODE_COLUMNS)?
            || !table_has_columns(&connection, "edges", EDGE_COLUMNS)?
        {
            return Err(Error::UnsupportedSchema);
        }
        let has_places = table_exists(&connection, "places")?
            && table_has_columns(&connection, "places", PLACE_COLUMNS)?;
        debug!(has_places, "opened road dataset");

        Ok(Self {
            connection: Mutex::new(connection),
            has_places,
        })
    }

    /// Write `graph` and `places` into a fresh dataset at `db_path`.
    pub fn create(db_path: &Path, graph: &RoadGraph, places: &[(&str, LatLon)]) -> Result<Self> {
        let mut connection = Connection::open(db_path)?;
        connection.execute_batch(
            "CREATE TABLE nodes (id INTEGER PRIMARY KEY, lon REAL NOT NULL, lat REAL NOT NULL, elevation REAL);
             CREATE TABLE edges (tail INTEGER NOT NULL, head INTEGER NOT NULL, length REAL NOT NULL);
             CREATE TABLE places (name TEXT NOT NULL, lat REAL NOT NULL, lon REAL NOT NULL);
             CREATE INDEX nodes_position ON nodes (lon, lat);
             CREATE INDEX edges_tail ON edges (tail);
             CREATE INDEX edges_head ON edges (head);",
        )?;

        let tx = connection.transaction()?;
        {
            let mut insert_node =
                tx.prepare("INSERT INTO nodes (id, lon, lat, elevation) VALUES (?1, ?2, ?3, ?4)")?;
            for (id, coords) in graph.nodes() {
                insert_node.execute(params![id, coords.x, coords.y, coords.z])?;
            }
            let mut insert_edge =
                tx.prepare("INSERT INTO edges (tail, head, length) VALUES (?1, ?2, ?3)")?;
            for tail in graph.node_ids() {
                for edge in graph.neighbours(tail) {
                    insert_edge.execute(params![tail, edge.target, edge.length])?;
                }
            }
            let mut insert_place =
                tx.prepare("INSERT INTO places (name, lat, lon) VALUES (?1, ?2, ?3)")?;
            for (name, position) in places {
                insert_place.execute(params![name, position.lat, position.lon])?;
            }
        }
        tx.commit()?;

        Self::from_connection(connection)
    }

    /// Total number of nodes in the dataset.
    pub fn node_count(&self) -> Result<usize> {
        let connection = self.lock();
        let count: i64 = connection.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn has_places(&self) -> bool {
        self.has_places
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn load_places(&self) -> Result<Vec<(String, LatLon)>> {
        let connection = self.lock();
        let mut stmt = connection.prepare("SELECT name, lat, lon FROM places")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get(0)?, LatLon::new(row.get(1)?, row.get(2)?)))
        })?;

        let mut places = Vec::new();
        for row in rows {
            places.push(row?);
        }
        Ok(places)
    }
}

impl GeoSource for SqliteSource {
    fn fetch(&self, bbox: &BoundingBox) -> Result<RoadGraph> {
        let connection = self.lock();
        let mut graph = RoadGraph::new();
        let mut missing_elevation = 0usize;

        let mut stmt = connection.prepare(
            "SELECT id, lon, lat, elevation FROM nodes
             WHERE lon BETWEEN ?1 AND ?3 AND lat BETWEEN ?2 AND ?4
             ORDER BY id",
        )?;
        let rows = stmt.query_map(
            params![bbox.west, bbox.south, bbox.east, bbox.north],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            },
        )?;
        for row in rows {
            let (id, lon, lat, elevation) = row?;
            if elevation.is_none() {
                missing_elevation += 1;
            }
            graph.insert_node(id, Coords::new(lon, lat, elevation.unwrap_or(0.0)));
        }

        let mut stmt = connection.prepare(
            "SELECT e.tail, e.head, e.length,
                    t.id, t.lon, t.lat, t.elevation,
                    h.id, h.lon, h.lat, h.elevation
             FROM edges e
             LEFT JOIN nodes t ON t.id = e.tail
             LEFT JOIN nodes h ON h.id = e.head
             WHERE (t.lon BETWEEN ?1 AND ?3 AND t.lat BETWEEN ?2 AND ?4)
                OR (h.lon BETWEEN ?1 AND ?3 AND h.lat BETWEEN ?2 AND ?4)
             ORDER BY e.rowid",
        )?;
        let rows = stmt.query_map(
            params![bbox.west, bbox.south, bbox.east, bbox.north],
            |row| {
                let tail_node = match row.get::<_, Option<i64>>(3)? {
                    Some(_) => Some(Coords::new(
                        row.get(4)?,
                        row.get(5)?,
                        row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
                    )),
                    None => None,
                };
                let head_node = match row.get::<_, Option<i64>>(7)? {
                    Some(_) => Some(Coords::new(
                        row.get(8)?,
                        row.get(9)?,
                        row.get::<_, Option<f64>>(10)?.unwrap_or(0.0),
                    )),
                    None => None,
                };
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                    tail_node,
                    head_node,
                ))
            },
        )?;

        let mut skipped_edges = 0usize;
        for row in rows {
            let (tail, head, length, tail_coords, head_coords) = row?;
            let (Some(tail_coords), Some(head_coords)) = (tail_coords, head_coords) else {
                skipped_edges += 1;
                continue;
            };
            if length < 0.0 || !length.is_finite() {
                skipped_edges += 1;
                continue;
            }
            graph.insert_node(tail, tail_coords);
            graph.insert_node(head, head_coords);
            graph.add_edge(tail, head, length);
        }

        if skipped_edges > 0 {
            warn!(
                skipped_edges,
                "ignored edges referencing unknown nodes or carrying invalid lengths",
            );
        }
        if missing_elevation > 0 {
            warn!(
                missing_elevation,
                "nodes without elevation were assigned 0 m"
            );
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            west = bbox.west,
            south = bbox.south,
            east = bbox.east,
            north = bbox.north,
            "fetched road fragment"
        );

        Ok(graph)
    }
}

impl Geocoder for SqliteSource {
    fn geocode(&self, place: &str) -> Option<LatLon> {
        if !self.has_places {
            debug!(place, "dataset has no places table");
            return None;
        }
        match self.load_places() {
            Ok(places) => best_place_match(
                place,
                places.iter().map(|(name, pos)| (name.as_str(), *pos)),
            ),
            Err(err) => {
                warn!(error = %err, place, "failed to read places");
                None
            }
        }
    }
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
