//! Parametric curves with arc-length reparameterization.
//!
//! `point(t)` walks the curve by its own parameter, `point_at(u)` by the
//! fraction of its length. Lengths are sampled once over
//! [`ARC_LENGTH_DIVISIONS`] steps and cached inside the curve.

use std::cell::OnceCell;

use cgmath::{InnerSpace, Vector2, Vector3, Zero};

pub const ARC_LENGTH_DIVISIONS: usize = 200;
const TANGENT_DELTA: f32 = 1e-4;

/// Cumulative arc lengths, filled on first use.
#[derive(Clone, Debug, Default)]
pub struct ArcLengths(OnceCell<Vec<f32>>);

impl ArcLengths {
    pub fn new() -> Self {
        Self::default()
    }
}

pub trait Curve {
    type Point: InnerSpace<Scalar = f32> + Copy;

    fn point(&self, t: f32) -> Self::Point;

    fn arc_length_cache(&self) -> &ArcLengths;

    /// Cumulative lengths at `ARC_LENGTH_DIVISIONS + 1` evenly spaced parameters.
    fn lengths(&self) -> &[f32] {
        self.arc_length_cache().0.get_or_init(|| {
            let mut lengths = Vec::with_capacity(ARC_LENGTH_DIVISIONS + 1);
            let mut last = self.point(0.0);
            let mut sum = 0.0;
            lengths.push(0.0);
            for p in 1..=ARC_LENGTH_DIVISIONS {
                let current = self.point(p as f32 / ARC_LENGTH_DIVISIONS as f32);
                sum += (current - last).magnitude();
                lengths.push(sum);
                last = current;
            }
            lengths
        })
    }

    fn length(&self) -> f32 {
        self.lengths().last().copied().unwrap_or(0.0)
    }

    /// Map a length fraction `u` to the curve parameter `t`.
    fn u_to_t(&self, u: f32) -> f32 {
        let lengths = self.lengths();
        let il = lengths.len();
        let target = u * lengths[il - 1];

        let mut low: isize = 0;
        let mut high: isize = il as isize - 1;
        while low <= high {
            let i = low + (high - low) / 2;
            let comparison = lengths[i as usize] - target;
            if comparison < 0.0 {
                low = i + 1;
            } else if comparison > 0.0 {
                high = i - 1;
            } else {
                high = i;
                break;
            }
        }
        let i = high.max(0) as usize;
        if lengths[i] == target || i + 1 >= il {
            return i as f32 / (il - 1) as f32;
        }
        let before = lengths[i];
        let segment = lengths[i + 1] - before;
        let fraction = (target - before) / segment;
        (i as f32 + fraction) / (il - 1) as f32
    }

    fn point_at(&self, u: f32) -> Self::Point {
        self.point(self.u_to_t(u))
    }

    /// Normalized finite difference around `t`, clamped to the curve ends.
    fn tangent(&self, t: f32) -> Self::Point {
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        let d = self.point(t2) - self.point(t1);
        if d.magnitude2() > 0.0 { d.normalize() } else { d }
    }

    fn tangent_at(&self, u: f32) -> Self::Point {
        self.tangent(self.u_to_t(u))
    }

    fn points(&self, divisions: usize) -> Vec<Self::Point> {
        (0..=divisions)
            .map(|d| self.point(d as f32 / divisions.max(1) as f32))
            .collect()
    }

    fn spaced_points(&self, divisions: usize) -> Vec<Self::Point> {
        (0..=divisions)
            .map(|d| self.point_at(d as f32 / divisions.max(1) as f32))
            .collect()
    }
}

/// Any curve through 3D space.
pub trait Curve3: Curve<Point = Vector3<f32>> {}

impl<C: Curve<Point = Vector3<f32>> + ?Sized> Curve3 for C {}

/// Centripetal Catmull-Rom spline through a list of points.
#[derive(Clone, Debug)]
pub struct CatmullRomCurve3 {
    points: Vec<Vector3<f32>>,
    closed: bool,
    cache: ArcLengths,
}

impl CatmullRomCurve3 {
    pub fn new(points: Vec<Vector3<f32>>, closed: bool) -> Self {
        Self {
            points,
            closed,
            cache: ArcLengths::new(),
        }
    }
}

/// Cubic with end tangents, for one coordinate of a segment.
struct CubicPoly {
    c0: f32,
    c1: f32,
    c2: f32,
    c3: f32,
}

impl CubicPoly {
    fn nonuniform_catmull_rom(x: [f32; 4], dt0: f32, dt1: f32, dt2: f32) -> Self {
        let [x0, x1, x2, x3] = x;
        let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
        let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;
        Self {
            c0: x1,
            c1: t1,
            c2: -3.0 * x1 + 3.0 * x2 - 2.0 * t1 - t2,
            c3: 2.0 * x1 - 2.0 * x2 + t1 + t2,
        }
    }

    fn calc(&self, t: f32) -> f32 {
        let t2 = t * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t2 * t
    }
}

impl Curve for CatmullRomCurve3 {
    type Point = Vector3<f32>;

    fn point(&self, t: f32) -> Vector3<f32> {
        let points = &self.points;
        let l = points.len();
        match l {
            0 => return Vector3::zero(),
            1 => return points[0],
            _ => {}
        }

        let p = (l - if self.closed { 0 } else { 1 }) as f32 * t;
        let mut int_point = p.floor() as isize;
        let mut weight = p - int_point as f32;
        let li = l as isize;

        if self.closed {
            if int_point <= 0 {
                int_point += (int_point.abs() / li + 1) * li;
            }
        } else if weight == 0.0 && int_point == li - 1 {
            int_point = li - 2;
            weight = 1.0;
        }

        let at = |i: isize| points[i.rem_euclid(li) as usize];
        let p0 = if self.closed || int_point > 0 {
            at(int_point - 1)
        } else {
            points[0] + (points[0] - points[1])
        };
        let p1 = at(int_point);
        let p2 = at(int_point + 1);
        let p3 = if self.closed || int_point + 2 < li {
            at(int_point + 2)
        } else {
            points[l - 1] + (points[l - 1] - points[l - 2])
        };

        // centripetal parameterization
        let pow = 0.25;
        let mut dt0 = (p1 - p0).magnitude2().powf(pow);
        let mut dt1 = (p2 - p1).magnitude2().powf(pow);
        let mut dt2 = (p3 - p2).magnitude2().powf(pow);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let axis = |a: f32, b: f32, c: f32, d: f32| {
            CubicPoly::nonuniform_catmull_rom([a, b, c, d], dt0, dt1, dt2).calc(weight)
        };
        Vector3::new(
            axis(p0.x, p1.x, p2.x, p3.x),
            axis(p0.y, p1.y, p2.y, p3.y),
            axis(p0.z, p1.z, p2.z, p3.z),
        )
    }

    fn arc_length_cache(&self) -> &ArcLengths {
        &self.cache
    }
}

/// Straight segment from `v1` to `v2`.
#[derive(Clone, Debug)]
pub struct LineCurve3 {
    pub v1: Vector3<f32>,
    pub v2: Vector3<f32>,
    cache: ArcLengths,
}

impl LineCurve3 {
    pub fn new(v1: Vector3<f32>, v2: Vector3<f32>) -> Self {
        Self {
            v1,
            v2,
            cache: ArcLengths::new(),
        }
    }
}

impl Curve for LineCurve3 {
    type Point = Vector3<f32>;

    fn point(&self, t: f32) -> Vector3<f32> {
        if t >= 1.0 {
            return self.v2;
        }
        self.v1 + (self.v2 - self.v1) * t
    }

    fn arc_length_cache(&self) -> &ArcLengths {
        &self.cache
    }

    fn length(&self) -> f32 {
        (self.v2 - self.v1).magnitude()
    }

    // Lines are already uniform in their parameter.
    fn point_at(&self, u: f32) -> Vector3<f32> {
        self.point(u)
    }

    fn tangent(&self, _t: f32) -> Vector3<f32> {
        let d = self.v2 - self.v1;
        if d.magnitude2() > 0.0 { d.normalize() } else { d }
    }

    fn tangent_at(&self, u: f32) -> Vector3<f32> {
        self.tangent(u)
    }
}

/// A chain of line segments walked by length.
#[derive(Clone, Debug, Default)]
pub struct CurvePath {
    curves: Vec<LineCurve3>,
    cache: ArcLengths,
}

impl CurvePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments between consecutive points, plus the closing one when `closed`.
    pub fn polyline(points: &[Vector3<f32>], closed: bool) -> Self {
        let mut path = Self::new();
        for pair in points.windows(2) {
            path.add(LineCurve3::new(pair[0], pair[1]));
        }
        if closed && points.len() > 2 {
            path.add(LineCurve3::new(points[points.len() - 1], points[0]));
        }
        path
    }

    pub fn add(&mut self, curve: LineCurve3) {
        self.curves.push(curve);
        self.cache = ArcLengths::new();
    }

    pub fn curves(&self) -> &[LineCurve3] {
        &self.curves
    }

    fn curve_lengths(&self) -> Vec<f32> {
        let mut sum = 0.0;
        self.curves
            .iter()
            .map(|c| {
                sum += c.length();
                sum
            })
            .collect()
    }
}

impl Curve for CurvePath {
    type Point = Vector3<f32>;

    fn point(&self, t: f32) -> Vector3<f32> {
        let lengths = self.curve_lengths();
        let Some(&total) = lengths.last() else {
            return Vector3::zero();
        };
        let d = t * total;
        for (i, &end) in lengths.iter().enumerate() {
            if end >= d {
                let curve = &self.curves[i];
                let segment = curve.length();
                let u = if segment == 0.0 {
                    0.0
                } else {
                    1.0 - (end - d) / segment
                };
                return curve.point_at(u);
            }
        }
        self.curves[self.curves.len() - 1].v2
    }

    fn arc_length_cache(&self) -> &ArcLengths {
        &self.cache
    }
}

/// Elliptic arc in the plane.
#[derive(Clone, Debug)]
pub struct EllipseCurve {
    pub center: Vector2<f32>,
    pub x_radius: f32,
    pub y_radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub clockwise: bool,
    cache: ArcLengths,
}

impl EllipseCurve {
    pub fn new(
        ax: f32,
        ay: f32,
        x_radius: f32,
        y_radius: f32,
        start_angle: f32,
        end_angle: f32,
        clockwise: bool,
    ) -> Self {
        Self {
            center: Vector2::new(ax, ay),
            x_radius,
            y_radius,
            start_angle,
            end_angle,
            clockwise,
            cache: ArcLengths::new(),
        }
    }

    /// Swept angle after wrapping into `[0, 2π]` and applying the direction.
    pub fn delta_angle(&self) -> f32 {
        const EPSILON: f32 = f32::EPSILON;
        let two_pi = std::f32::consts::TAU;
        let mut delta = self.end_angle - self.start_angle;
        let same_points = delta.abs() < EPSILON;

        while delta < 0.0 {
            delta += two_pi;
        }
        while delta > two_pi {
            delta -= two_pi;
        }
        if delta < EPSILON {
            delta = if same_points { 0.0 } else { two_pi };
        }
        if self.clockwise && !same_points {
            if delta == two_pi {
                delta = -two_pi;
            } else {
                delta -= two_pi;
            }
        }
        delta
    }
}

impl Curve for EllipseCurve {
    type Point = Vector2<f32>;

    fn point(&self, t: f32) -> Vector2<f32> {
        let angle = self.start_angle + t * self.delta_angle();
        Vector2::new(
            self.center.x + self.x_radius * angle.cos(),
            self.center.y + self.y_radius * angle.sin(),
        )
    }

    fn arc_length_cache(&self) -> &ArcLengths {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-3
    }

    fn square() -> Vec<Vector3<f32>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn catmull_rom_passes_through_its_points() {
        let curve = CatmullRomCurve3::new(square(), false);
        assert!(close(curve.point(0.0), square()[0]));
        assert!(close(curve.point(1.0 / 3.0), square()[1]));
        assert!(close(curve.point(1.0), square()[3]));
    }

    #[test]
    fn closed_catmull_rom_loops_back() {
        let curve = CatmullRomCurve3::new(square(), true);
        assert!(close(curve.point(0.0), curve.point(1.0)));
        assert!(close(curve.point(0.25), square()[1]));
        assert!(close(curve.point(0.75), square()[3]));
    }

    #[test]
    fn arc_length_of_a_line_is_exact() {
        let line = LineCurve3::new(Vector3::zero(), Vector3::new(3.0, 4.0, 0.0));
        assert!((line.length() - 5.0).abs() < 1e-5);
        assert!(close(line.point_at(0.5), Vector3::new(1.5, 2.0, 0.0)));
        assert!(close(line.tangent(0.3), Vector3::new(0.6, 0.8, 0.0)));
    }

    #[test]
    fn u_to_t_is_monotonic_and_bounded() {
        let curve = CatmullRomCurve3::new(square(), true);
        let mut last = -1.0;
        for i in 0..=20 {
            let t = curve.u_to_t(i as f32 / 20.0);
            assert!(t >= last);
            assert!((0.0..=1.0).contains(&t));
            last = t;
        }
        assert_eq!(curve.u_to_t(0.0), 0.0);
        assert!((curve.u_to_t(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn curve_path_walks_segments_by_length() {
        let path = CurvePath::polyline(
            &[
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(1.0, 3.0, 0.0),
            ],
            false,
        );
        assert!((path.length() - 4.0).abs() < 1e-3);
        assert!(close(path.point(0.25), Vector3::new(1.0, 0.0, 0.0)));
        assert!(close(path.point(0.5), Vector3::new(1.0, 1.0, 0.0)));
        assert!(close(path.tangent(0.75), Vector3::new(0.0, 1.0, 0.0)));

        let closed = CurvePath::polyline(&square(), true);
        assert_eq!(closed.curves().len(), 4);
        assert!(close(closed.point(1.0), Vector3::zero()));
    }

    #[test]
    fn clockwise_ellipse_runs_backwards() {
        let ccw = EllipseCurve::new(0.0, 0.0, 1.0, 1.0, 0.0, TAU, false);
        let cw = EllipseCurve::new(0.0, 0.0, 1.0, 1.0, 0.0, TAU, true);
        assert!((ccw.delta_angle() - TAU).abs() < 1e-6);
        assert!((cw.delta_angle() + TAU).abs() < 1e-6);
        let quarter = cw.point(0.25);
        assert!((quarter - Vector2::new(0.0, -1.0)).magnitude() < 1e-5);

        let half = EllipseCurve::new(1.0, 1.0, 1.0, 1.0, 0.0, PI, false);
        assert!((half.point(1.0) - Vector2::new(0.0, 1.0)).magnitude() < 1e-5);
        assert!((half.length() - PI).abs() < 1e-3);
    }
}
