//! Bounded centerline window with arc-length parameterization.
//!
//! [`SlidingWindowPath`] keeps the most recent `max_points` centerline points
//! in travel order. Pushing past capacity drops the oldest point first.
//! Derived per-point data (arc-length time, tangent, lateral normal) is
//! recomputed wholesale by [`SlidingWindowPath::rebuild`]; queries that need
//! it fail with `InvalidState` until the path has been rebuilt after the last
//! modification.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, Vec3};

/// Below this, lengths count as zero.
const LENGTH_EPSILON: f32 = 1e-6;

/// How the lateral normal is derived from the tangent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalMode {
    /// Tangent rotated 90 degrees in the XZ plane, pointing to the right of
    /// travel.
    #[default]
    Horizontal,
    /// `up x tangent` for an explicit up vector.
    Up(Vec3),
}

impl NormalMode {
    /// An `Up` vector must be finite and non-zero.
    pub fn validate(&self) -> Result<()> {
        match self {
            NormalMode::Horizontal => Ok(()),
            NormalMode::Up(up) if up.is_finite() && up.length_squared() > LENGTH_EPSILON => Ok(()),
            NormalMode::Up(up) => Err(Error::Configuration(format!(
                "normal up vector {up:?} must be finite and non-zero"
            ))),
        }
    }

    fn normal_for(&self, tangent: Vec3) -> Vec3 {
        match self {
            NormalMode::Horizontal => Vec3::new(tangent.z, 0.0, -tangent.x).normalize_or_zero(),
            NormalMode::Up(up) => up.cross(tangent).normalize_or_zero(),
        }
    }
}

/// FIFO of centerline points bounded to `max_points`.
#[derive(Clone, Debug)]
pub struct SlidingWindowPath {
    points: VecDeque<Vec3>,
    max_points: usize,
    closed: bool,
    normal_mode: NormalMode,

    /// Cumulative distance to each point
    distances: Vec<f32>,
    times: Vec<f32>,
    tangents: Vec<Vec3>,
    normals: Vec<Vec3>,
    total_length: f32,
    stale: bool,
}

impl SlidingWindowPath {
    /// Create an empty open path holding at most `max_points` points.
    pub fn new(max_points: usize) -> Result<Self> {
        if max_points == 0 {
            return Err(Error::Configuration("path capacity must be at least 1".into()));
        }
        Ok(Self {
            points: VecDeque::with_capacity(max_points),
            max_points,
            closed: false,
            normal_mode: NormalMode::default(),
            distances: Vec::with_capacity(max_points),
            times: Vec::with_capacity(max_points),
            tangents: Vec::with_capacity(max_points),
            normals: Vec::with_capacity(max_points),
            total_length: 0.0,
            stale: false,
        })
    }

    /// Build and rebuild a path from a point list. Only the last
    /// `max_points` points survive.
    pub fn from_points(max_points: usize, points: impl IntoIterator<Item = Vec3>) -> Result<Self> {
        let mut path = Self::new(max_points)?;
        path.extend(points);
        path.rebuild();
        Ok(path)
    }

    pub fn with_normal_mode(mut self, mode: NormalMode) -> Self {
        self.normal_mode = mode;
        self.stale = true;
        self
    }

    pub fn set_closed(&mut self, closed: bool) {
        if self.closed != closed {
            self.closed = closed;
            self.stale = true;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn normal_mode(&self) -> NormalMode {
        self.normal_mode
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if points changed since the last [`rebuild`](Self::rebuild).
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Points in travel order, oldest first.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &Vec3> + '_ {
        self.points.iter()
    }

    /// Append a point, evicting and returning the oldest one when full.
    pub fn push(&mut self, point: Vec3) -> Option<Vec3> {
        let evicted = if self.points.len() >= self.max_points {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back(point);
        self.stale = true;
        evicted
    }

    /// Push several points. Does not rebuild.
    pub fn extend(&mut self, points: impl IntoIterator<Item = Vec3>) {
        for p in points {
            self.push(p);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.stale = true;
    }

    /// Recompute arc-length times, tangents and normals for every point.
    pub fn rebuild(&mut self) {
        let n = self.points.len();
        self.distances.clear();
        self.times.clear();
        self.tangents.clear();
        self.normals.clear();

        let mut cumulative = 0.0;
        for i in 0..n {
            if i > 0 {
                cumulative += self.points[i].distance(self.points[i - 1]);
            }
            self.distances.push(cumulative);
        }

        self.total_length = cumulative;
        if self.closed && n > 1 {
            self.total_length += self.points[0].distance(self.points[n - 1]);
        }

        let total = self.total_length;
        self.times.extend(self.distances.iter().map(|d| {
            if total > LENGTH_EPSILON { d / total } else { 0.0 }
        }));

        let mut prev_tangent = Vec3::Z;
        let mut prev_normal = Vec3::X;
        for i in 0..n {
            let tangent = self.raw_tangent(i).normalize_or_zero();
            let tangent = if tangent == Vec3::ZERO { prev_tangent } else { tangent };
            let normal = self.normal_mode.normal_for(tangent);
            // vertical tangent in horizontal mode: keep the last good normal
            let normal = if normal == Vec3::ZERO { prev_normal } else { normal };

            self.tangents.push(tangent);
            self.normals.push(normal);
            prev_tangent = tangent;
            prev_normal = normal;
        }

        self.stale = false;
        log::trace!("path rebuilt: {} points, length {:.2}", n, self.total_length);
    }

    /// Central difference, one-sided at open ends, wrapping when closed.
    fn raw_tangent(&self, i: usize) -> Vec3 {
        let n = self.points.len();
        if n < 2 {
            return Vec3::ZERO;
        }
        let p = &self.points;
        if self.closed {
            let prev = p[(i + n - 1) % n];
            let next = p[(i + 1) % n];
            return next - prev;
        }
        if i == 0 {
            p[1] - p[0]
        } else if i == n - 1 {
            p[n - 1] - p[n - 2]
        } else {
            p[i + 1] - p[i - 1]
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.points.len() {
            return Err(Error::IndexOutOfRange { index, len: self.points.len() });
        }
        Ok(())
    }

    fn check_fresh(&self) -> Result<()> {
        if self.is_stale() {
            return Err(Error::InvalidState("path modified since last rebuild()".into()));
        }
        Ok(())
    }

    fn check_not_empty(&self) -> Result<()> {
        if self.points.is_empty() {
            return Err(Error::InsufficientData { required: 1, actual: 0 });
        }
        Ok(())
    }

    pub fn point(&self, index: usize) -> Result<Vec3> {
        self.check_index(index)?;
        Ok(self.points[index])
    }

    pub fn tangent(&self, index: usize) -> Result<Vec3> {
        self.check_index(index)?;
        self.check_fresh()?;
        Ok(self.tangents[index])
    }

    pub fn normal(&self, index: usize) -> Result<Vec3> {
        self.check_index(index)?;
        self.check_fresh()?;
        Ok(self.normals[index])
    }

    /// Arc-length fraction of the point.
    pub fn time(&self, index: usize) -> Result<f32> {
        self.check_index(index)?;
        self.check_fresh()?;
        Ok(self.times[index])
    }

    /// Distance along the path from the first point.
    pub fn distance(&self, index: usize) -> Result<f32> {
        self.check_index(index)?;
        self.check_fresh()?;
        Ok(self.distances[index])
    }

    pub fn total_length(&self) -> Result<f32> {
        self.check_fresh()?;
        Ok(self.total_length)
    }

    /// Number of polyline edges, including the closing edge.
    fn edge_count(&self) -> usize {
        let n = self.points.len();
        match (n, self.closed) {
            (0 | 1, _) => 0,
            (_, true) => n,
            (_, false) => n - 1,
        }
    }

    /// Endpoints and start distance of edge `e`.
    fn edge(&self, e: usize) -> (Vec3, Vec3, f32) {
        let n = self.points.len();
        (self.points[e], self.points[(e + 1) % n], self.distances[e])
    }

    /// Edge containing distance `d`, plus the fraction along it.
    fn locate(&self, distance: f32) -> (usize, f32) {
        let edges = self.edge_count();
        let d = if self.closed && self.total_length > LENGTH_EPSILON {
            distance.rem_euclid(self.total_length)
        } else {
            distance.clamp(0.0, self.total_length)
        };
        // Last edge whose start distance is <= d
        let e = self.distances[..edges]
            .partition_point(|start| *start <= d)
            .saturating_sub(1);
        let (a, b, start) = self.edge(e);
        let len = a.distance(b);
        let frac = if len > LENGTH_EPSILON { ((d - start) / len).clamp(0.0, 1.0) } else { 0.0 };
        (e, frac)
    }

    /// Point at a distance along the path. Clamped for open paths, wrapped
    /// for closed ones.
    pub fn point_at_distance(&self, distance: f32) -> Result<Vec3> {
        self.check_not_empty()?;
        self.check_fresh()?;
        if self.edge_count() == 0 {
            return Ok(self.points[0]);
        }
        let (e, frac) = self.locate(distance);
        let (a, b, _) = self.edge(e);
        Ok(a.lerp(b, frac))
    }

    /// Point at an arc-length fraction in `[0, 1]`.
    pub fn point_at_time(&self, t: f32) -> Result<Vec3> {
        self.check_fresh()?;
        self.point_at_distance(t * self.total_length)
    }

    /// Unit travel direction at an arc-length fraction.
    pub fn direction_at_time(&self, t: f32) -> Result<Vec3> {
        self.check_not_empty()?;
        self.check_fresh()?;
        if self.edge_count() == 0 {
            return Ok(self.tangents[0]);
        }
        let (e, _) = self.locate(t * self.total_length);
        let (a, b, _) = self.edge(e);
        let dir = (b - a).normalize_or_zero();
        Ok(if dir == Vec3::ZERO { self.tangents[e] } else { dir })
    }

    /// Distance along the path of the closest point to `position`.
    pub fn closest_distance_along_path(&self, position: Vec3) -> Result<f32> {
        self.check_not_empty()?;
        self.check_fresh()?;

        let mut best_distance = 0.0;
        let mut best_sq = f32::INFINITY;
        for e in 0..self.edge_count() {
            let (a, b, start) = self.edge(e);
            let ab = b - a;
            let len_sq = ab.length_squared();
            let frac = if len_sq > LENGTH_EPSILON {
                ((position - a).dot(ab) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest = a + ab * frac;
            let dist_sq = closest.distance_squared(position);
            if dist_sq < best_sq {
                best_sq = dist_sq;
                best_distance = start + len_sq.sqrt() * frac;
            }
        }
        Ok(best_distance)
    }
}
