//! Static collision world: triangle polygons, decorative scenery quads,
//! spawn points and the sector grid that accelerates collision queries.

use crate::{consts::EPSILON, geom};
use serde::{Deserialize, Serialize};
use vek::*;

/// Width and height of the sector grid. Kept odd so a center cell exists and
/// world coordinates round symmetrically around the map centroid.
pub const SECTOR_SIDE: usize = 51;

/// Extra map units added around the polygon bounds when sizing sectors, so
/// probes just outside the outermost polygon still land in a valid cell.
pub const SECTOR_MARGIN: f32 = 50.0;

// Cells are padded by this much when polygons are binned, covering probes
// whose resolution can move them across a cell boundary within one tick.
const SECTOR_PAD: f32 = 2.0;

/// How a polygon participates in collision.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PolyType {
    Normal,
    OnlyBullets,
    OnlyPlayers,
    NoCollide,
    Deadly,
    BloodyDeadly,
    Explosive,
    Bouncy,
}

impl PolyType {
    pub fn collides_with_soldiers(self) -> bool {
        !matches!(self, PolyType::OnlyBullets | PolyType::NoCollide)
    }

    pub fn collides_with_bullets(self) -> bool {
        !matches!(self, PolyType::OnlyPlayers | PolyType::NoCollide)
    }

    /// Lethal surfaces kill on touch instead of resolving the contact.
    pub fn is_lethal(self) -> bool {
        matches!(
            self,
            PolyType::Deadly | PolyType::BloodyDeadly | PolyType::Explosive
        )
    }
}

/// A collision triangle with its outward edge perpendiculars precomputed at
/// construction. Edges are enumerated `0`: v0-v1, `1`: v1-v2, `2`: v2-v0.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: [Vec2<f32>; 3],
    pub perps: [Vec2<f32>; 3],
    pub kind: PolyType,
    /// Restitution used by [`PolyType::Bouncy`] surfaces. A value of `0.4`
    /// returns 40% of the incoming normal speed.
    pub bounciness: f32,
}

impl Polygon {
    pub fn new(vertices: [Vec2<f32>; 3], kind: PolyType) -> Self {
        let mut perps = [Vec2::zero(); 3];
        for i in 0..3 {
            let a = vertices[i];
            let b = vertices[(i + 1) % 3];
            let opposite = vertices[(i + 2) % 3];
            let edge = b - a;
            let mut perp = geom::normalized_or(Vec2::new(edge.y, -edge.x), Vec2::new(0.0, -1.0));
            // Outward means away from the opposite vertex.
            if perp.dot(opposite - (a + b) * 0.5) > 0.0 {
                perp = -perp;
            }
            perps[i] = perp;
        }
        Self { vertices, perps, kind, bounciness: 0.0 }
    }

    pub fn bouncy(vertices: [Vec2<f32>; 3], bounciness: f32) -> Self {
        let mut poly = Self::new(vertices, PolyType::Bouncy);
        poly.bounciness = bounciness;
        poly
    }

    pub fn contains(&self, p: Vec2<f32>) -> bool {
        geom::point_in_triangle(p, self.vertices[0], self.vertices[1], self.vertices[2])
    }

    /// The shortest push-out for a point inside this polygon: the outward
    /// unit perpendicular of the closest edge scaled by the distance to it,
    /// together with the edge index and that distance.
    ///
    /// Edges are compared strictly, so ties keep the lowest edge index. For
    /// a point exactly on an edge the returned vector is zero; callers that
    /// need a direction should fall back to `perps[edge]`.
    pub fn closest_perpendicular(&self, p: Vec2<f32>) -> (Vec2<f32>, usize, f32) {
        let mut edge = 0;
        let mut dist = f32::MAX;
        for i in 0..3 {
            let d = geom::point_segment_distance(p, self.vertices[i], self.vertices[(i + 1) % 3]);
            if d < dist {
                dist = d;
                edge = i;
            }
        }
        (self.perps[edge] * dist, edge, dist)
    }

    /// Whether the segment `a b` touches this polygon. Used for projectile
    /// sweeps, where a fast projectile can cross a thin polygon within one
    /// tick without either endpoint being inside.
    pub fn intersects_segment(&self, a: Vec2<f32>, b: Vec2<f32>) -> bool {
        if self.contains(a) || self.contains(b) {
            return true;
        }
        (0..3).any(|i| {
            geom::segments_intersect(a, b, self.vertices[i], self.vertices[(i + 1) % 3])
        })
    }

    fn bounds(&self) -> Aabr<f32> {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for v in &self.vertices[1..] {
            min = min.map2(*v, f32::min);
            max = max.map2(*v, f32::max);
        }
        Aabr { min, max }
    }
}

/// A decorative quad. Scenery never collides, but hit tests against it are
/// still wanted for rendering picks and effect placement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenery {
    pub pos: Vec2<f32>,
    pub dims: Vec2<f32>,
    pub rotation: f32,
    pub scale: f32,
}

impl Scenery {
    pub fn contains(&self, p: Vec2<f32>) -> bool {
        geom::point_in_quad(p, self.pos, self.dims, self.rotation, self.scale)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SpawnKind {
    General,
    Alpha,
    Bravo,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub pos: Vec2<f32>,
    pub kind: SpawnKind,
}

/// The static world a round is played on.
///
/// Polygon lookups go through the sector grid: an odd-sided square of cells
/// centered on the polygon centroid, each listing every polygon whose padded
/// bounds overlap the cell. The binning is conservative, a listed polygon
/// may not actually contain the queried point, but a containing polygon is
/// always listed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolyMap {
    pub name: String,
    polygons: Vec<Polygon>,
    pub scenery: Vec<Scenery>,
    spawn_points: Vec<SpawnPoint>,
    /// Jet fuel budget this map grants, in ticks of thrust.
    pub jet_cap: i32,
    sectors: Vec<Vec<u16>>,
    sectors_size: f32,
    sectors_center: Vec2<f32>,
}

impl PolyMap {
    pub fn new(
        name: impl Into<String>,
        polygons: Vec<Polygon>,
        scenery: Vec<Scenery>,
        spawn_points: Vec<SpawnPoint>,
        jet_cap: i32,
    ) -> Self {
        debug_assert!(polygons.len() <= u16::MAX as usize);
        let mut map = Self {
            name: name.into(),
            polygons,
            scenery,
            spawn_points,
            jet_cap,
            sectors: Vec::new(),
            sectors_size: 1.0,
            sectors_center: Vec2::zero(),
        };
        map.generate_sectors();
        map
    }

    /// A small symmetric arena: a long floor slab with a wall at each end.
    /// Used by tests and as the default world of the headless server.
    pub fn flat_arena() -> Self {
        let floor = Aabr { min: Vec2::new(-400.0, 50.0), max: Vec2::new(400.0, 80.0) };
        let mut polygons = rect_polys(floor, PolyType::Normal);
        polygons.extend(rect_polys(
            Aabr { min: Vec2::new(-430.0, -150.0), max: Vec2::new(-400.0, 50.0) },
            PolyType::Normal,
        ));
        polygons.extend(rect_polys(
            Aabr { min: Vec2::new(400.0, -150.0), max: Vec2::new(430.0, 50.0) },
            PolyType::Normal,
        ));
        let scenery = vec![Scenery {
            pos: Vec2::new(-60.0, 30.0),
            dims: Vec2::new(24.0, 20.0),
            rotation: 0.0,
            scale: 1.0,
        }];
        let spawn_points = vec![
            SpawnPoint { pos: Vec2::new(0.0, 40.0), kind: SpawnKind::General },
            SpawnPoint { pos: Vec2::new(-300.0, 40.0), kind: SpawnKind::Alpha },
            SpawnPoint { pos: Vec2::new(300.0, 40.0), kind: SpawnKind::Bravo },
        ];
        Self::new("flat_arena", polygons, scenery, spawn_points, crate::consts::DEFAULT_JET_CAP)
    }

    pub fn polygons(&self) -> &[Polygon] { &self.polygons }

    pub fn spawn_points(&self) -> &[SpawnPoint] { &self.spawn_points }

    /// First spawn point of the given kind, in authoring order.
    pub fn find_first_spawn(&self, kind: SpawnKind) -> Option<Vec2<f32>> {
        self.spawn_points.iter().find(|s| s.kind == kind).map(|s| s.pos)
    }

    /// Index of the topmost scenery quad containing `p`, if any.
    pub fn scenery_at(&self, p: Vec2<f32>) -> Option<usize> {
        self.scenery.iter().rposition(|s| s.contains(p))
    }

    /// Structural edits rebuild the sector grid before the next query.
    pub fn add_polygon(&mut self, polygon: Polygon) -> u16 {
        debug_assert!(self.polygons.len() < u16::MAX as usize);
        let id = self.polygons.len() as u16;
        self.polygons.push(polygon);
        self.generate_sectors();
        id
    }

    pub fn remove_polygon(&mut self, id: u16) {
        if (id as usize) < self.polygons.len() {
            self.polygons.remove(id as usize);
            self.generate_sectors();
        }
    }

    /// Polygon ids whose padded bounds overlap the cell containing the world
    /// point. Empty for points outside the grid.
    pub fn sector(&self, p: Vec2<f32>) -> &[u16] {
        static EMPTY: [u16; 0] = [];
        let half = (SECTOR_SIDE / 2) as i32;
        let rel = (p - self.sectors_center) / self.sectors_size;
        let ix = rel.x.round() as i32 + half;
        let iy = rel.y.round() as i32 + half;
        if ix < 0 || iy < 0 || ix >= SECTOR_SIDE as i32 || iy >= SECTOR_SIDE as i32 {
            return &EMPTY;
        }
        &self.sectors[iy as usize * SECTOR_SIDE + ix as usize]
    }

    pub fn sectors_size(&self) -> f32 { self.sectors_size }

    /// Cells per side of the square sector grid.
    pub fn sectors_count(&self) -> usize { SECTOR_SIDE }

    /// Axis-aligned bounds of all polygon vertices.
    pub fn bounds(&self) -> Aabr<f32> {
        let mut bounds: Option<Aabr<f32>> = None;
        for poly in &self.polygons {
            let b = poly.bounds();
            bounds = Some(match bounds {
                Some(acc) => Aabr {
                    min: acc.min.map2(b.min, f32::min),
                    max: acc.max.map2(b.max, f32::max),
                },
                None => b,
            });
        }
        bounds.unwrap_or(Aabr { min: Vec2::zero(), max: Vec2::zero() })
    }

    /// Rebuilds the sector grid from the current polygon set.
    pub fn generate_sectors(&mut self) {
        self.sectors = vec![Vec::new(); SECTOR_SIDE * SECTOR_SIDE];
        if self.polygons.is_empty() {
            self.sectors_size = 1.0;
            self.sectors_center = Vec2::zero();
            return;
        }

        let bounds = self.bounds();
        let size = bounds.max - bounds.min;
        let mut centroid = Vec2::zero();
        for poly in &self.polygons {
            for v in &poly.vertices {
                centroid += *v;
            }
        }
        centroid /= (self.polygons.len() * 3) as f32;

        self.sectors_center = centroid;
        self.sectors_size =
            (size.x.max(size.y) + 2.0 * SECTOR_MARGIN) / SECTOR_SIDE as f32;

        let half = (SECTOR_SIDE / 2) as i32;
        let poly_bounds: Vec<Aabr<f32>> = self.polygons.iter().map(|p| p.bounds()).collect();
        for iy in 0..SECTOR_SIDE {
            for ix in 0..SECTOR_SIDE {
                let center = self.sectors_center
                    + Vec2::new(
                        (ix as i32 - half) as f32 * self.sectors_size,
                        (iy as i32 - half) as f32 * self.sectors_size,
                    );
                let reach = self.sectors_size * 0.5 + SECTOR_PAD;
                let cell = Aabr {
                    min: center - Vec2::broadcast(reach),
                    max: center + Vec2::broadcast(reach),
                };
                let ids = &mut self.sectors[iy * SECTOR_SIDE + ix];
                for (i, b) in poly_bounds.iter().enumerate() {
                    if b.min.x <= cell.max.x
                        && b.max.x >= cell.min.x
                        && b.min.y <= cell.max.y
                        && b.max.y >= cell.min.y
                    {
                        ids.push(i as u16);
                    }
                }
            }
        }
    }
}

/// Two triangles covering an axis-aligned rectangle.
pub fn rect_polys(rect: Aabr<f32>, kind: PolyType) -> Vec<Polygon> {
    let tl = rect.min;
    let tr = Vec2::new(rect.max.x, rect.min.y);
    let br = rect.max;
    let bl = Vec2::new(rect.min.x, rect.max.y);
    vec![
        Polygon::new([tl, tr, br], kind),
        Polygon::new([tl, br, bl], kind),
    ]
}
