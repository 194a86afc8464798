use nalgebra::{Point3, Vector3};

/// Length of the idealised N-H bond used when placing amide hydrogens, in Angstroms.
pub const AMIDE_BOND_LENGTH: f64 = 1.01;

/// Normalised mean of two unit vectors.
pub fn bisect(v1: &Vector3<f64>, v2: &Vector3<f64>) -> Vector3<f64> {
    ((v1 + v2) / 2.0).normalize()
}

/// Places the amide hydrogen of a residue from its own N and CA and the
/// carbonyl (C, O) of the preceding residue.
///
/// The hydrogen lies opposite the bisector of the N→CA / N→C(prev) bisector
/// and the C(prev)→O(prev) direction.
pub fn calculate_hn_position(
    n_pos: &Point3<f64>,
    ca_pos: &Point3<f64>,
    prev_c_pos: &Point3<f64>,
    prev_o_pos: &Point3<f64>,
    bond_length: f64,
) -> Point3<f64> {
    let n_ca = (ca_pos - n_pos).normalize();
    let n_c_prev = (prev_c_pos - n_pos).normalize();
    let c_o_prev = (prev_o_pos - prev_c_pos).normalize();

    let in_plane = bisect(&n_ca, &n_c_prev);
    let hn_dir = bisect(&in_plane, &c_o_prev);

    n_pos - hn_dir * bond_length
}

/// Signed dihedral angle p1-p2-p3-p4 in degrees, in (-180, 180].
///
/// Returns `None` for degenerate (collinear) input.
pub fn dihedral_angle(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    p4: &Point3<f64>,
) -> Option<f64> {
    let b1 = p2 - p1;
    let b2 = p3 - p2;
    let b3 = p4 - p3;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    if n1.norm_squared() < f64::EPSILON || n2.norm_squared() < f64::EPSILON {
        return None;
    }

    let x = n1.dot(&n2);
    let y = b2.norm() * b1.dot(&n2);
    Some(y.atan2(x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn bisect_of_orthogonal_unit_vectors_is_diagonal() {
        let b = bisect(&Vector3::x(), &Vector3::y());
        let expected = 1.0 / 2f64.sqrt();
        assert!((b.x - expected).abs() < TOLERANCE);
        assert!((b.y - expected).abs() < TOLERANCE);
        assert!(b.z.abs() < TOLERANCE);
    }

    #[test]
    fn amide_hydrogen_sits_at_bond_length_from_nitrogen() {
        let n = Point3::new(0.0, 0.0, 0.0);
        let ca = Point3::new(1.46, 0.0, 0.0);
        let prev_c = Point3::new(-0.65, 1.15, 0.0);
        let prev_o = Point3::new(-1.85, 1.10, 0.0);

        let h = calculate_hn_position(&n, &ca, &prev_c, &prev_o, AMIDE_BOND_LENGTH);

        assert!(((h - n).norm() - AMIDE_BOND_LENGTH).abs() < TOLERANCE);
        // Points away from both CA and the previous carbonyl carbon.
        assert!(h.y < 0.0);
        assert!(h.z.abs() < TOLERANCE);
    }

    #[test]
    fn amide_hydrogen_opposes_symmetric_neighbours() {
        let n = Point3::origin();
        let ca = Point3::new(1.0, 1.0, 0.0);
        let prev_c = Point3::new(-1.0, 1.0, 0.0);
        let prev_o = Point3::new(-1.0, 2.0, 0.0);

        let h = calculate_hn_position(&n, &ca, &prev_c, &prev_o, 1.0);

        assert!(h.x.abs() < TOLERANCE);
        assert!((h.y + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn dihedral_angle_has_sign() {
        let p1 = Point3::new(1.0, 0.0, 0.0);
        let p2 = Point3::new(0.0, 0.0, 0.0);
        let p3 = Point3::new(0.0, 0.0, 1.0);

        let plus = dihedral_angle(&p1, &p2, &p3, &Point3::new(0.0, 1.0, 1.0)).unwrap();
        let minus = dihedral_angle(&p1, &p2, &p3, &Point3::new(0.0, -1.0, 1.0)).unwrap();
        let trans = dihedral_angle(&p1, &p2, &p3, &Point3::new(-1.0, 0.0, 1.0)).unwrap();

        assert!((plus - 90.0).abs() < 1e-6);
        assert!((minus + 90.0).abs() < 1e-6);
        assert!((trans.abs() - 180.0).abs() < 1e-6);
    }

    #[test]
    fn dihedral_angle_of_collinear_points_is_none() {
        let p = |x: f64| Point3::new(x, 0.0, 0.0);
        assert!(dihedral_angle(&p(0.0), &p(1.0), &p(2.0), &p(3.0)).is_none());
    }
}
