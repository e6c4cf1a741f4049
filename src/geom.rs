//! Plain geometric value types shared by every format.
//!
//! These map one-to-one onto the packed records of the files: no identity,
//! freely copied, serialized field-for-field by the binary codec.

use serde::{Deserialize, Serialize};

/// UV coordinate pair.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub u: f32,
    pub v: f32,
}

/// 3D position or direction, world units.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn add(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(&self, s: f32) -> Vector3 {
        Vector3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn dot(&self, other: &Vector3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy, or `None` for a near-zero vector.
    pub fn normalized(&self) -> Option<Vector3> {
        let len = self.length();
        if len <= f32::EPSILON {
            return None;
        }
        Some(self.scale(1.0 / len))
    }
}

/// Row-major 4x4 transform.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub rows: [[f32; 4]; 4],
}

impl Matrix4 {
    pub const IDENTITY: Matrix4 = Matrix4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };
}

impl Default for Matrix4 {
    fn default() -> Self {
        Matrix4::IDENTITY
    }
}

/// 8-bit RGBA color as stored per vertex and per instance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Axis-aligned bounding box.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl BoundingBox {
    /// Inverted extremes; union with any point fixes it up.
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vector3::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn expand_point(&mut self, p: &Vector3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        if other.is_empty() {
            return out;
        }
        if out.is_empty() {
            return *other;
        }
        out.expand_point(&other.min);
        out.expand_point(&other.max);
        out
    }

    pub fn from_points<'a, I: IntoIterator<Item = &'a Vector3>>(points: I) -> Self {
        let mut out = Self::empty();
        for p in points {
            out.expand_point(p);
        }
        out
    }

    pub fn center(&self) -> Vector3 {
        self.min.add(&self.max).scale(0.5)
    }
}

/// Bounding sphere derived from a mesh, cached on the container.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Sphere {
    pub center: Vector3,
    pub radius: f32,
}

impl Sphere {
    /// Center of the box, radius to the farthest point.
    pub fn around<'a, I: IntoIterator<Item = &'a Vector3> + Clone>(points: I) -> Self {
        let bbox = BoundingBox::from_points(points.clone());
        if bbox.is_empty() {
            return Sphere::default();
        }
        let center = bbox.center();
        let mut radius: f32 = 0.0;
        for p in points {
            radius = radius.max(p.sub(&center).length());
        }
        Sphere { center, radius }
    }
}

/// Half-space boundary: `normal . p >= -distance` is the outside.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    pub normal: Vector3,
    pub distance: f32,
}

impl Plane {
    /// Plane through three points, normal by winding order. `None` when
    /// the points are collinear.
    pub fn from_points(a: &Vector3, b: &Vector3, c: &Vector3) -> Option<Plane> {
        let normal = b.sub(a).cross(&c.sub(a)).normalized()?;
        Some(Plane {
            normal,
            distance: -normal.dot(a),
        })
    }

    pub fn signed_distance(&self, p: &Vector3) -> f32 {
        self.normal.dot(p) + self.distance
    }

    pub fn flipped(&self) -> Plane {
        Plane {
            normal: self.normal.scale(-1.0),
            distance: -self.distance,
        }
    }
}

/// 2D footprint rectangle in the XZ plane, used by the lookup grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_z: f32,
}

impl Rect {
    pub fn empty() -> Self {
        Self {
            min_x: f32::MAX,
            min_z: f32::MAX,
            max_x: f32::MIN,
            max_z: f32::MIN,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    pub fn expand(&mut self, x: f32, z: f32) {
        self.min_x = self.min_x.min(x);
        self.min_z = self.min_z.min(z);
        self.max_x = self.max_x.max(x);
        self.max_z = self.max_z.max(z);
    }

    pub fn union(&self, other: &Rect) -> Rect {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_z: self.min_z.min(other.min_z),
            max_x: self.max_x.max(other.max_x),
            max_z: self.max_z.max(other.max_z),
        }
    }

    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub fn depth(&self) -> f32 {
        (self.max_z - self.min_z).max(0.0)
    }
}
