//! Obstacles: static shapes that agents steer around.
//!
//! [`Obstacle`] is a closed set of shapes sharing one capability surface:
//!
//! - `ray_intersection`: where an agent's path first meets the surface
//! - `normal_at_poi`: surface normal at a point of impact
//! - `nearest_point`: closest point on the surface
//! - `fly_away`: static repulsion for an agent near the surface
//! - `signed_distance`: negative inside, zero on, positive outside
//!
//! Constructors validate their parameters and return [`GeometryError`] for
//! shapes that cannot exist. Obstacles are immutable once built.

use crate::error::{require_finite, require_radius, GeometryError};
use crate::shape;
use crate::vector::{Vec3, VectorExt};

/// Agents facing within this cosine of the surface normal are already
/// leaving and get no static repulsion.
const FACING_AWAY_COSINE: f64 = 0.9;

/// Linear falloff shared by every shape's `fly_away`.
fn fly_away_from(
    normal: Vec3,
    distance: f64,
    agent_forward: Vec3,
    max_distance: f64,
) -> Vec3 {
    if distance < max_distance && normal.dot(agent_forward) < FACING_AWAY_COSINE {
        normal * (1.0 - distance / max_distance)
    } else {
        Vec3::ZERO
    }
}

// ============================================================================
// Everted sphere
// ============================================================================

/// Inside-out sphere: agents live inside and avoid the wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvertedSphere {
    radius: f64,
    center: Vec3,
}

impl EvertedSphere {
    /// Sphere of `radius` around `center`.
    ///
    /// # Errors
    ///
    /// Non-positive or non-finite radius, non-finite center.
    pub fn new(radius: f64, center: Vec3) -> Result<Self, GeometryError> {
        Ok(Self {
            radius: require_radius(radius)?,
            center: require_finite(center)?,
        })
    }

    /// Sphere radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Sphere center.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// First point where a path meets the wall.
    #[must_use]
    pub fn ray_intersection(&self, origin: Vec3, tangent: Vec3) -> Option<Vec3> {
        shape::ray_sphere_intersection(origin, tangent, self.radius, self.center)
    }

    /// Inward normal: from `poi` toward the center.
    #[must_use]
    pub fn normal_at_poi(&self, poi: Vec3) -> Vec3 {
        (self.center - poi).normalize_or_0()
    }

    /// Closest wall point. The center itself maps onto the +x pole.
    #[must_use]
    pub fn nearest_point(&self, query_point: Vec3) -> Vec3 {
        let direction = (query_point - self.center).normalize_or_0();
        let direction = if direction == Vec3::ZERO { Vec3::X } else { direction };
        self.center + direction * self.radius
    }

    /// Push toward the center when close to the wall.
    ///
    /// Past the wall (outside the sphere) the weight keeps growing above 1.
    #[must_use]
    pub fn fly_away(&self, agent_position: Vec3, agent_forward: Vec3, max_distance: f64) -> Vec3 {
        let (normal, distance_to_center) = (self.center - agent_position).unit_and_length();
        let distance_from_wall = self.radius - distance_to_center;
        fly_away_from(normal, distance_from_wall, agent_forward, max_distance)
    }

    /// `|q - center| - radius`.
    #[must_use]
    pub fn signed_distance(&self, query_point: Vec3) -> f64 {
        (query_point - self.center).length() - self.radius
    }
}

// ============================================================================
// Plane
// ============================================================================

/// Infinite plane through `center` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vec3,
    center: Vec3,
}

impl Default for Plane {
    /// Ground plane: normal +y through the origin.
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            center: Vec3::ZERO,
        }
    }
}

impl Plane {
    /// Plane through `center`; `normal` is normalized.
    ///
    /// # Errors
    ///
    /// Zero-length normal, non-finite inputs.
    pub fn new(normal: Vec3, center: Vec3) -> Result<Self, GeometryError> {
        let normal = require_finite(normal)?;
        if normal.is_zero_length() {
            return Err(GeometryError::DegenerateDirection(normal));
        }
        Ok(Self {
            normal: normal.normalize(),
            center: require_finite(center)?,
        })
    }

    /// Unit normal.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Reference point on the plane.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Where a path crosses the plane, if ahead.
    #[must_use]
    pub fn ray_intersection(&self, origin: Vec3, tangent: Vec3) -> Option<Vec3> {
        shape::ray_plane_intersection(origin, tangent, self.center, self.normal)
    }

    /// The fixed normal, or with an agent position, the unit vector from the
    /// agent's foot point on the plane toward the agent.
    #[must_use]
    pub fn normal_at_poi(&self, _poi: Vec3, agent_position: Option<Vec3>) -> Vec3 {
        match agent_position {
            Some(agent) => {
                let toward_agent = (agent - self.nearest_point(agent)).normalize_or_0();
                if toward_agent == Vec3::ZERO {
                    self.normal
                } else {
                    toward_agent
                }
            }
            None => self.normal,
        }
    }

    /// Orthogonal projection onto the plane.
    #[must_use]
    pub fn nearest_point(&self, query_point: Vec3) -> Vec3 {
        let offset = query_point - self.center;
        self.center + offset - self.normal * offset.dot(self.normal)
    }

    /// Push away from the plane, on whichever side the agent is.
    #[must_use]
    pub fn fly_away(&self, agent_position: Vec3, agent_forward: Vec3, max_distance: f64) -> Vec3 {
        let on_plane = self.nearest_point(agent_position);
        let distance = (on_plane - agent_position).length();
        let normal = self.normal_at_poi(on_plane, Some(agent_position));
        fly_away_from(normal, distance, agent_forward, max_distance)
    }

    /// Positive on the side the normal points to.
    #[must_use]
    pub fn signed_distance(&self, query_point: Vec3) -> f64 {
        (query_point - self.nearest_point(query_point)).dot(self.normal)
    }
}

// ============================================================================
// Cylinder
// ============================================================================

/// Cylinder between two endpoints.
///
/// Intersection and repulsion treat it as unbounded along its axis; the
/// length is kept for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    radius: f64,
    endpoint: Vec3,
    tangent: Vec3,
    length: f64,
}

impl Cylinder {
    /// Cylinder of `radius` whose axis runs from `endpoint0` to `endpoint1`.
    ///
    /// # Errors
    ///
    /// Invalid radius, coincident endpoints, non-finite endpoints.
    pub fn new(radius: f64, endpoint0: Vec3, endpoint1: Vec3) -> Result<Self, GeometryError> {
        let radius = require_radius(radius)?;
        let endpoint0 = require_finite(endpoint0)?;
        let axis = require_finite(endpoint1)? - endpoint0;
        let (tangent, length) = axis.unit_and_length();
        if length == 0.0 {
            return Err(GeometryError::DegenerateDirection(axis));
        }
        Ok(Self {
            radius,
            endpoint: endpoint0,
            tangent,
            length,
        })
    }

    /// Cylinder radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// First endpoint of the axis.
    #[must_use]
    pub fn endpoint(&self) -> Vec3 {
        self.endpoint
    }

    /// Unit axis direction.
    #[must_use]
    pub fn tangent(&self) -> Vec3 {
        self.tangent
    }

    /// Distance between the endpoints.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Second endpoint of the axis.
    #[must_use]
    pub fn far_endpoint(&self) -> Vec3 {
        self.endpoint + self.tangent * self.length
    }

    /// Closest point on the infinite axis line.
    #[must_use]
    pub fn nearest_point_on_axis(&self, query_point: Vec3) -> Vec3 {
        self.endpoint + self.tangent * (query_point - self.endpoint).dot(self.tangent)
    }

    /// Where a path meets the cylinder, inflated by twice the body radius.
    #[must_use]
    pub fn ray_intersection(&self, origin: Vec3, tangent: Vec3, body_radius: f64) -> Option<Vec3> {
        shape::ray_cylinder_intersection(
            origin,
            tangent,
            self.endpoint,
            self.tangent,
            self.radius + 2.0 * body_radius,
            self.length,
        )
    }

    /// Outward normal: from the axis toward `poi`.
    #[must_use]
    pub fn normal_at_poi(&self, poi: Vec3) -> Vec3 {
        (poi - self.nearest_point_on_axis(poi)).normalize_or_0()
    }

    /// Closest surface point. A point on the axis picks an arbitrary side.
    #[must_use]
    pub fn nearest_point(&self, query_point: Vec3) -> Vec3 {
        let on_axis = self.nearest_point_on_axis(query_point);
        let radial = (query_point - on_axis).normalize_or_0();
        let radial = if radial == Vec3::ZERO {
            self.tangent.find_perpendicular()
        } else {
            radial
        };
        on_axis + radial * self.radius
    }

    /// Push away from the axis when close to the surface.
    #[must_use]
    pub fn fly_away(&self, agent_position: Vec3, agent_forward: Vec3, max_distance: f64) -> Vec3 {
        // The path never gets closer to the axis than the line-to-line distance.
        let path_to_axis = shape::distance_between_lines(
            agent_position,
            agent_forward,
            self.endpoint,
            self.tangent,
        );
        if path_to_axis >= self.radius + max_distance {
            return Vec3::ZERO;
        }
        let distance = self.signed_distance(agent_position);
        let normal = self.normal_at_poi(agent_position);
        fly_away_from(normal, distance, agent_forward, max_distance)
    }

    /// Distance to the axis minus the radius.
    #[must_use]
    pub fn signed_distance(&self, query_point: Vec3) -> f64 {
        (query_point - self.nearest_point_on_axis(query_point)).length() - self.radius
    }
}

// ============================================================================
// Obstacle
// ============================================================================

/// Any shape an agent can avoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Obstacle {
    /// Containment volume seen from inside
    EvertedSphere(EvertedSphere),
    /// Infinite plane
    Plane(Plane),
    /// Cylinder, unbounded for avoidance
    Cylinder(Cylinder),
}

impl From<EvertedSphere> for Obstacle {
    fn from(sphere: EvertedSphere) -> Self {
        Self::EvertedSphere(sphere)
    }
}

impl From<Plane> for Obstacle {
    fn from(plane: Plane) -> Self {
        Self::Plane(plane)
    }
}

impl From<Cylinder> for Obstacle {
    fn from(cylinder: Cylinder) -> Self {
        Self::Cylinder(cylinder)
    }
}

impl Obstacle {
    /// Create an everted sphere obstacle.
    ///
    /// # Errors
    ///
    /// See [`EvertedSphere::new`].
    pub fn everted_sphere(radius: f64, center: Vec3) -> Result<Self, GeometryError> {
        EvertedSphere::new(radius, center).map(Self::from)
    }

    /// Create a plane obstacle.
    ///
    /// # Errors
    ///
    /// See [`Plane::new`].
    pub fn plane(normal: Vec3, center: Vec3) -> Result<Self, GeometryError> {
        Plane::new(normal, center).map(Self::from)
    }

    /// Create a cylinder obstacle.
    ///
    /// # Errors
    ///
    /// See [`Cylinder::new`].
    pub fn cylinder(radius: f64, endpoint0: Vec3, endpoint1: Vec3) -> Result<Self, GeometryError> {
        Cylinder::new(radius, endpoint0, endpoint1).map(Self::from)
    }

    /// Short variant name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Obstacle::EvertedSphere(_) => "everted_sphere",
            Obstacle::Plane(_) => "plane",
            Obstacle::Cylinder(_) => "cylinder",
        }
    }

    /// Where a path starting at `origin` along unit `tangent` first meets the
    /// obstacle. Cylinders are inflated by the agent's body radius.
    #[must_use]
    pub fn ray_intersection(&self, origin: Vec3, tangent: Vec3, body_radius: f64) -> Option<Vec3> {
        match self {
            Obstacle::EvertedSphere(s) => s.ray_intersection(origin, tangent),
            Obstacle::Plane(p) => p.ray_intersection(origin, tangent),
            Obstacle::Cylinder(c) => c.ray_intersection(origin, tangent, body_radius),
        }
    }

    /// Unit surface normal at a point of impact. Only planes use the agent
    /// position.
    #[must_use]
    pub fn normal_at_poi(&self, poi: Vec3, agent_position: Option<Vec3>) -> Vec3 {
        match self {
            Obstacle::EvertedSphere(s) => s.normal_at_poi(poi),
            Obstacle::Plane(p) => p.normal_at_poi(poi, agent_position),
            Obstacle::Cylinder(c) => c.normal_at_poi(poi),
        }
    }

    /// Closest point on the surface.
    #[must_use]
    pub fn nearest_point(&self, query_point: Vec3) -> Vec3 {
        match self {
            Obstacle::EvertedSphere(s) => s.nearest_point(query_point),
            Obstacle::Plane(p) => p.nearest_point(query_point),
            Obstacle::Cylinder(c) => c.nearest_point(query_point),
        }
    }

    /// Static repulsion: zero unless the agent is within `max_distance` of
    /// the surface and not already facing away from it. The magnitude falls
    /// linearly from 1 at the surface to 0 at `max_distance`.
    ///
    /// `_body_radius` is part of the shared surface; no current shape
    /// inflates its static repulsion by it.
    #[must_use]
    pub fn fly_away(
        &self,
        agent_position: Vec3,
        agent_forward: Vec3,
        max_distance: f64,
        _body_radius: f64,
    ) -> Vec3 {
        match self {
            Obstacle::EvertedSphere(s) => s.fly_away(agent_position, agent_forward, max_distance),
            Obstacle::Plane(p) => p.fly_away(agent_position, agent_forward, max_distance),
            Obstacle::Cylinder(c) => c.fly_away(agent_position, agent_forward, max_distance),
        }
    }

    /// Negative inside, zero on the surface, positive outside.
    ///
    /// For the everted sphere "inside" is the enclosed free space.
    #[must_use]
    pub fn signed_distance(&self, query_point: Vec3) -> f64 {
        match self {
            Obstacle::EvertedSphere(s) => s.signed_distance(query_point),
            Obstacle::Plane(p) => p.signed_distance(query_point),
            Obstacle::Cylinder(c) => c.signed_distance(query_point),
        }
    }
}
