use crate::types::{mat4_from_rows, RowMatrix};
use log::trace;
use nalgebra::{Rotation3, UnitQuaternion};
use nalgebra_glm as glm;

/// Scale components smaller than this are treated as zero when the rotation
/// is separated from the scale
const SCALE_EPSILON: f32 = 1.0e-8;

/// Transform node data. Defines a local coordinate frame for its children.
#[derive(Clone, Debug)]
pub struct TransformNode {
    pub name: String,
    pub position: glm::Vec3,
    pub scale: glm::Vec3,
    pub rotation: glm::Quat,
}

impl TransformNode {
    /// Decomposes a row-major affine matrix into position, non-uniform scale
    /// and rotation.
    #[must_use]
    pub fn from_rows(name: &str, rows: &RowMatrix) -> Self {
        Self::from_matrix(name, &mat4_from_rows(rows))
    }

    /// Decomposes an affine matrix into position, non-uniform scale and
    /// rotation. The rotation quaternion is always built from the 3x3
    /// rotation matrix left after dividing out the scale.
    #[must_use]
    pub fn from_matrix(name: &str, m: &glm::Mat4) -> Self {
        let position = glm::vec3(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
        let mut basis = glm::mat4_to_mat3(m);
        let mut scale = glm::vec3(
            basis.column(0).norm(),
            basis.column(1).norm(),
            basis.column(2).norm(),
        );
        // A mirrored basis is expressed as a negative scale
        if basis.determinant() < 0.0 {
            scale = -scale;
        }
        let mut degenerate = [false; 3];
        for (i, s) in scale.iter().enumerate() {
            if s.abs() > SCALE_EPSILON {
                basis.column_mut(i).unscale_mut(*s);
            } else {
                degenerate[i] = true;
            }
        }
        let rotation = quat_from_mat3(&orthonormalize(&basis, degenerate));
        trace!(
            "{name}: position={position:?} scale={scale:?} rotation={rotation:?}"
        );
        Self {
            name: name.to_string(),
            position,
            scale,
            rotation,
        }
    }

    /// Recomposes the local matrix as translation * rotation * scale
    #[must_use]
    pub fn local_matrix(&self) -> glm::Mat4 {
        let m = glm::translation(&self.position);
        let m = m * glm::quat_to_mat4(&self.rotation);
        glm::scale(&m, &self.scale)
    }
}

/// Turns an unscaled basis into a proper rotation. Shear is removed by
/// Gram-Schmidt starting from the first usable column. Columns flagged in
/// `degenerate` (zero scale) are rebuilt from the others with cross products.
fn orthonormalize(basis: &glm::Mat3, degenerate: [bool; 3]) -> glm::Mat3 {
    let Some(a) = degenerate.iter().position(|d| !d) else {
        return glm::Mat3::identity();
    };
    let (b, d) = ((a + 1) % 3, (a + 2) % 3);
    let mut c = [0, 1, 2].map(|i| basis.column(i).into_owned());

    let x = glm::normalize(&c[a]);
    let mut y = c[b] - x * glm::dot(&x, &c[b]);
    if degenerate[b] || y.norm() <= SCALE_EPSILON {
        // Columns are cyclic so b is d cross a
        y = glm::cross(&c[d], &x);
        if degenerate[d] || y.norm() <= SCALE_EPSILON {
            y = glm::cross(&least_aligned_axis(&x), &x);
        }
    }
    let y = glm::normalize(&y);
    c[a] = x;
    c[b] = y;
    c[d] = glm::cross(&x, &y);
    glm::Mat3::from_columns(&c)
}

/// The coordinate axis furthest from parallel to `v`
fn least_aligned_axis(v: &glm::Vec3) -> glm::Vec3 {
    let mut axis = glm::Vec3::zeros();
    axis[v.iamin()] = 1.0;
    axis
}

/// Builds a unit quaternion from a 3x3 rotation matrix. The matrix is
/// expected to be orthonormal. The result is renormalized anyway so float
/// drift never leaks a scaled quaternion.
#[must_use]
pub fn quat_from_mat3(rotation: &glm::Mat3) -> glm::Quat {
    let r = Rotation3::from_matrix_unchecked(*rotation);
    glm::quat_normalize(&UnitQuaternion::from_rotation_matrix(&r).into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IDENTITY_ROWS;

    const EPSILON: f32 = 0.0001;

    #[test]
    fn identity_rotation_is_exact() {
        let rows = [
            [2.0, 0.0, 0.0, 1.0],
            [0.0, 3.0, 0.0, 2.0],
            [0.0, 0.0, 4.0, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let t = TransformNode::from_rows("Scaled", &rows);
        assert_eq!(t.rotation, glm::Quat::identity());
        assert_eq!(t.position, glm::vec3(1.0, 2.0, 3.0));
        assert_eq!(t.scale, glm::vec3(2.0, 3.0, 4.0));
    }

    #[test]
    fn identity_matrix() {
        let t = TransformNode::from_rows("Id", &IDENTITY_ROWS);
        assert_eq!(t.rotation, glm::Quat::identity());
        assert_eq!(t.position, glm::Vec3::zeros());
        assert_eq!(t.scale, glm::vec3(1.0, 1.0, 1.0));
    }

    #[test]
    fn mirrored_basis_gives_negative_scale() {
        let m = glm::scaling(&glm::vec3(-1.0, -1.0, -1.0));
        let t = TransformNode::from_matrix("Mirror", &m);
        assert!(t.scale.x < 0.0 && t.scale.y < 0.0 && t.scale.z < 0.0);
        let c = glm::equal_columns_eps(&t.local_matrix(), &m, EPSILON);
        assert!(c.x && c.y && c.z && c.w);
    }

    #[test]
    fn zero_scale_axis_keeps_unit_rotation() {
        let rows = [
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let t = TransformNode::from_rows("Flat", &rows);
        assert!((t.rotation.norm() - 1.0).abs() < EPSILON);
        assert_eq!(t.scale, glm::vec3(0.0, 1.0, 1.0));
        let m = t.local_matrix();
        let diagonal = glm::vec3(m[(0, 0)], m[(1, 1)], m[(2, 2)]);
        assert!((diagonal - glm::vec3(0.0, 1.0, 1.0)).norm() < EPSILON);
        let position = m.column(3).xyz();
        assert!((position - glm::vec3(1.0, 0.0, 0.0)).norm() < EPSILON);
    }

    #[test]
    fn all_zero_scale_gives_identity_rotation() {
        let m = glm::translation(&glm::vec3(1.0, 2.0, 3.0))
            * glm::scaling(&glm::Vec3::zeros());
        let t = TransformNode::from_matrix("Collapsed", &m);
        assert_eq!(t.rotation, glm::Quat::identity());
        assert_eq!(t.scale, glm::Vec3::zeros());
        assert_eq!(t.position, glm::vec3(1.0, 2.0, 3.0));
    }

    #[test]
    fn sheared_basis_gives_orthonormal_rotation() {
        let q = glm::quat_angle_axis(
            std::f32::consts::FRAC_PI_6,
            &glm::vec3(0.0, 0.0, 1.0),
        );
        let shear = mat4_from_rows(&[
            [1.0, 0.5, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let m = glm::quat_to_mat4(&q) * shear;
        let t = TransformNode::from_matrix("Sheared", &m);
        assert!((t.rotation.norm() - 1.0).abs() < EPSILON);
        let r = glm::quat_to_mat3(&t.rotation);
        let c = glm::equal_columns_eps(
            &(r * r.transpose()),
            &glm::Mat3::identity(),
            EPSILON,
        );
        assert!(c.x && c.y && c.z);
        // The first axis is unsheared so it fixes the rotation
        let c = glm::quat_equal_eps(&t.rotation, &q, EPSILON);
        assert!(c.x && c.y && c.z && c.w);
    }

    #[test]
    fn quat_from_rotation_matrix() {
        let q = glm::quat_angle_axis(
            std::f32::consts::FRAC_PI_2,
            &glm::vec3(0.0, 0.0, 1.0),
        );
        let back = quat_from_mat3(&glm::quat_to_mat3(&q));
        let c = glm::quat_equal_eps(&back, &q, EPSILON);
        assert!(c.x && c.y && c.z && c.w);
    }
}
