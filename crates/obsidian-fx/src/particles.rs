#![forbid(unsafe_code)]

//! Procedural point clouds and decorative line segments.
//!
//! A [`ParticleField`] is generated once, from an injected random source,
//! and never resized or edited afterwards: the only thing that changes over
//! its life is the aggregate [`Rotation`] applied by the motion driver.
//!
//! # Distributions
//!
//! | Mode        | Point                                              | Bound          |
//! |-------------|----------------------------------------------------|----------------|
//! | `Cube`      | each axis uniform in `[-side/2, side/2]`           | `side / 2`     |
//! | `Shell`     | `r * (sinθ cosφ, sinθ sinφ, cosθ)`, θ φ independent | `radius`       |
//! | `Starfield` | uniform direction, distance in `[r, r + depth]`    | `r + depth`    |

use std::f32::consts::{PI, TAU};

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Spatial distribution of generated points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// Uniform volume of a cube centred on the origin.
    Cube {
        /// Edge length.
        side: f32,
    },
    /// Points on a sphere surface, from two independent random angles.
    Shell {
        /// Sphere radius.
        radius: f32,
    },
    /// Background stars in a spherical band.
    Starfield {
        /// Inner radius of the band.
        radius: f32,
        /// Thickness of the band.
        depth: f32,
    },
}

impl Distribution {
    /// Largest magnitude any coordinate can take.
    pub fn bound(&self) -> f32 {
        match *self {
            Self::Cube { side } => side.abs() / 2.0,
            Self::Shell { radius } => radius.abs(),
            Self::Starfield { radius, depth } => radius.abs() + depth.abs(),
        }
    }

    /// Draw one point.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match *self {
            Self::Cube { side } => {
                let side = side.abs();
                let mut axis = || (rng.gen_range(0.0f32..1.0) - 0.5) * side;
                Vec3::new(axis(), axis(), axis())
            }
            Self::Shell { radius } => {
                let theta = rng.gen_range(-PI..PI);
                let phi = rng.gen_range(-PI..PI);
                radius.abs()
                    * Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
            }
            Self::Starfield { radius, depth } => {
                let polar = (1.0 - 2.0 * rng.gen_range(0.0f32..1.0)).acos();
                let azimuth = rng.gen_range(0.0..TAU);
                let distance = radius.abs() + depth.abs() * rng.gen_range(0.0f32..=1.0);
                distance
                    * Vec3::new(
                        polar.sin() * azimuth.sin(),
                        polar.cos(),
                        polar.sin() * azimuth.cos(),
                    )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Particle field
// ---------------------------------------------------------------------------

/// Accumulated rotation of a field, in radians.
///
/// Kept in `f64` and never wrapped: a session may run for hours and the
/// accumulated angle must stay exact to the number of applied increments.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation {
    /// Rotation around the X axis.
    pub x: f64,
    /// Rotation around the Y axis.
    pub y: f64,
}

/// Fixed-size point cloud with an aggregate transform.
#[derive(Debug, Clone)]
pub struct ParticleField {
    points: Box<[Vec3]>,
    distribution: Distribution,
    base: Vec3,
    rotation: Rotation,
}

impl ParticleField {
    /// Generate `count` points drawn from `distribution`.
    ///
    /// A count of zero yields an empty field.
    pub fn generate<R: Rng + ?Sized>(
        count: usize,
        distribution: Distribution,
        rng: &mut R,
    ) -> Self {
        let points: Box<[Vec3]> = (0..count).map(|_| distribution.sample(rng)).collect();
        tracing::debug!(count, ?distribution, "particle field generated");
        Self {
            points,
            distribution,
            base: Vec3::ZERO,
            rotation: Rotation::default(),
        }
    }

    /// Set the fixed Euler rotation of the enclosing group (builder).
    #[must_use]
    pub fn with_base_rotation(mut self, euler: Vec3) -> Self {
        self.base = euler;
        self
    }

    /// Number of points; fixed at construction.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the field has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The generated points in model space.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Distribution the points were drawn from.
    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Accumulated rotation.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub(crate) fn rotate_by(&mut self, dx: f64, dy: f64) {
        self.rotation.x += dx;
        self.rotation.y += dy;
    }

    /// Model-to-world transform: group rotation, then the field's own.
    pub fn transform(&self) -> Mat4 {
        let wrap = |a: f64| a.rem_euclid(std::f64::consts::TAU) as f32;
        let group = Quat::from_euler(EulerRot::XYZ, self.base.x, self.base.y, self.base.z);
        let own = Quat::from_euler(
            EulerRot::XYZ,
            wrap(self.rotation.x),
            wrap(self.rotation.y),
            0.0,
        );
        Mat4::from_quat(group * own)
    }
}

// ---------------------------------------------------------------------------
// Line segments
// ---------------------------------------------------------------------------

/// A thin decorative bar floating in the background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Resting centre.
    pub position: Vec3,
    /// Bar length along its local Y axis.
    pub length: f32,
    /// Relative float speed, in `[0.01, 0.03)`.
    pub speed: f32,
    /// Per-segment clock offset so segments do not bob in unison.
    pub phase: f32,
}

/// Generate `count` segments spread over a cube of side `spread`.
pub fn generate_segments<R: Rng + ?Sized>(
    count: usize,
    spread: f32,
    rng: &mut R,
) -> Vec<LineSegment> {
    let volume = Distribution::Cube { side: spread };
    (0..count)
        .map(|_| LineSegment {
            position: volume.sample(rng),
            speed: rng.gen_range(0.01..0.03),
            length: rng.gen_range(2.0..6.0),
            phase: rng.gen_range(0.0..10_000.0),
        })
        .collect()
}

/// Parameters of the passive float animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatParams {
    /// Angular speed of the bobbing.
    pub speed: f32,
    /// Scale of the tilt.
    pub rotation_intensity: f32,
    /// Scale of the vertical bob.
    pub float_intensity: f32,
}

impl Default for FloatParams {
    fn default() -> Self {
        Self {
            speed: 2.0,
            rotation_intensity: 1.0,
            float_intensity: 2.0,
        }
    }
}

/// Where a floating segment is drawn at a given time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatPose {
    /// Centre including the vertical bob.
    pub position: Vec3,
    /// Euler tilt in radians.
    pub tilt: Vec3,
}

impl LineSegment {
    /// Pose at `elapsed` seconds. Pure: the segment itself never changes.
    pub fn pose(&self, params: &FloatParams, elapsed: f32) -> FloatPose {
        let t = self.phase + elapsed;
        let angle = t / 4.0 * params.speed * (1.0 + self.speed);
        let (sin, cos) = angle.sin_cos();
        let tilt = Vec3::new(cos / 8.0, sin / 8.0, sin / 20.0) * params.rotation_intensity;
        let bob = sin / 10.0 * params.float_intensity;
        FloatPose {
            position: self.position + Vec3::Y * bob,
            tilt,
        }
    }

    /// World transform of the bar at `elapsed` seconds.
    pub fn transform(&self, params: &FloatParams, elapsed: f32) -> Mat4 {
        let pose = self.pose(params, elapsed);
        let tilt = Quat::from_euler(EulerRot::XYZ, pose.tilt.x, pose.tilt.y, pose.tilt.z);
        Mat4::from_rotation_translation(tilt, pose.position)
    }

    /// Both end points of the bar at `elapsed` seconds.
    pub fn endpoints(&self, params: &FloatParams, elapsed: f32) -> [Vec3; 2] {
        let m = self.transform(params, elapsed);
        let half = self.length / 2.0;
        [
            m.transform_point3(Vec3::new(0.0, -half, 0.0)),
            m.transform_point3(Vec3::new(0.0, half, 0.0)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn zero_count_is_empty() {
        let field = ParticleField::generate(0, Distribution::Cube { side: 15.0 }, &mut rng());
        assert!(field.is_empty());
        assert_eq!(field.len(), 0);
    }

    #[test]
    fn cube_points_within_half_side() {
        let field = ParticleField::generate(3000, Distribution::Cube { side: 15.0 }, &mut rng());
        assert_eq!(field.len(), 3000);
        assert!(field.points().iter().all(|p| p.abs().max_element() <= 7.5));
    }

    #[test]
    fn shell_points_on_radius() {
        let field = ParticleField::generate(1500, Distribution::Shell { radius: 2.5 }, &mut rng());
        for p in field.points() {
            assert!((p.length() - 2.5).abs() < 1e-4, "{p:?}");
        }
    }

    #[test]
    fn starfield_points_in_band() {
        let dist = Distribution::Starfield {
            radius: 100.0,
            depth: 50.0,
        };
        let field = ParticleField::generate(500, dist, &mut rng());
        for p in field.points() {
            let d = p.length();
            assert!((99.99..=150.01).contains(&d), "{d}");
        }
    }

    #[test]
    fn same_seed_same_points() {
        let a = ParticleField::generate(64, Distribution::Shell { radius: 1.0 }, &mut rng());
        let b = ParticleField::generate(64, Distribution::Shell { radius: 1.0 }, &mut rng());
        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn successive_calls_are_independent() {
        let mut r = rng();
        let a = ParticleField::generate(16, Distribution::Cube { side: 2.0 }, &mut r);
        let b = ParticleField::generate(16, Distribution::Cube { side: 2.0 }, &mut r);
        assert_ne!(a.points(), b.points());
    }

    #[test]
    fn rotation_does_not_touch_points() {
        let mut field = ParticleField::generate(32, Distribution::Cube { side: 4.0 }, &mut rng());
        let before = field.points().to_vec();
        field.rotate_by(1.0, 2.0);
        assert_eq!(field.points(), before.as_slice());
        assert_eq!(field.rotation(), Rotation { x: 1.0, y: 2.0 });
    }

    #[test]
    fn identity_transform_without_rotation() {
        let field = ParticleField::generate(1, Distribution::Cube { side: 1.0 }, &mut rng());
        assert!(field.transform().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn degenerate_sizes_collapse_to_origin() {
        let field = ParticleField::generate(10, Distribution::Cube { side: 0.0 }, &mut rng());
        assert!(field.points().iter().all(|p| *p == Vec3::ZERO));
    }

    #[test]
    fn segments_follow_declared_ranges() {
        let segments = generate_segments(40, 20.0, &mut rng());
        assert_eq!(segments.len(), 40);
        for s in &segments {
            assert!(s.position.abs().max_element() <= 10.0);
            assert!((0.01..0.03).contains(&s.speed));
            assert!((2.0..6.0).contains(&s.length));
        }
    }

    #[test]
    fn float_pose_stays_near_rest() {
        let seg = generate_segments(1, 20.0, &mut rng())[0];
        let params = FloatParams::default();
        for i in 0..200 {
            let pose = seg.pose(&params, i as f32 * 0.1);
            assert!((pose.position - seg.position).length() <= 0.2 + 1e-5);
            assert!(pose.tilt.abs().max_element() <= 0.125 + 1e-5);
        }
    }

    #[test]
    fn endpoints_span_length() {
        let seg = generate_segments(1, 20.0, &mut rng())[0];
        let [a, b] = seg.endpoints(&FloatParams::default(), 3.0);
        assert!(((a - b).length() - seg.length).abs() < 1e-3);
    }
}
