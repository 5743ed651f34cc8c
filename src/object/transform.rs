//! Transform object: a 3x3 affine matrix. Grounded in the teacher's
//! `matrix::CurTransMat`, which already models PDF's six-number affine form
//! `[a b c d e f]` (the implicit third column is always `[0 0 1]`) and its
//! translate/rotate/scale combinators.

use crate::error::Error;
use crate::fixed::FixedPoint;

/// `[a b c d e f]`, the PDF content-stream matrix convention: applying the
/// matrix to `(x, y)` yields `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub a: FixedPoint,
    pub b: FixedPoint,
    pub c: FixedPoint,
    pub d: FixedPoint,
    pub e: FixedPoint,
    pub f: FixedPoint,
}

impl Transform {
    pub fn identity() -> Self {
        let zero = FixedPoint::zero();
        let one = FixedPoint::from_promotable_int(1).expect("1 is promotable");
        Transform { a: one, b: zero, c: zero, d: one, e: zero, f: zero }
    }

    pub fn translate(tx: FixedPoint, ty: FixedPoint) -> Self {
        let mut t = Self::identity();
        t.e = tx;
        t.f = ty;
        t
    }

    /// `theta` in degrees, converted to radians for the trig calls, mirroring
    /// how `miter_angle` works in degrees at the HLDSL seam.
    pub fn rotate(theta_degrees: f64) -> Self {
        let rad = theta_degrees.to_radians();
        let (sin, cos) = (rad.sin(), rad.cos());
        Transform {
            a: FixedPoint::from_f64_lossy(cos),
            b: FixedPoint::from_f64_lossy(sin),
            c: FixedPoint::from_f64_lossy(-sin),
            d: FixedPoint::from_f64_lossy(cos),
            e: FixedPoint::zero(),
            f: FixedPoint::zero(),
        }
    }

    pub fn scale(sx: FixedPoint, sy: FixedPoint) -> Self {
        let zero = FixedPoint::zero();
        Transform { a: sx, b: zero, c: zero, d: sy, e: zero, f: zero }
    }

    /// Applies the matrix to a point: `(a*x + c*y + e, b*x + d*y + f)`.
    pub fn apply(&self, point: (FixedPoint, FixedPoint)) -> (FixedPoint, FixedPoint) {
        let (x, y) = point;
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    /// Row-vector convention: applying `self` then `other` is `self * other`.
    pub fn concat(self, other: Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }
}

/// Concatenates an existing sequence of transforms in order (the
/// `tx_seq`/`concat` path, as distinct from building from components).
pub fn concat_sequence(transforms: &[Transform]) -> Result<Transform, Error> {
    if transforms.is_empty() {
        return Err(Error::state("transform sequence requires at least one transform"));
    }
    let mut iter = transforms.iter().copied();
    let mut acc = iter.next().unwrap();
    for t in iter {
        acc = acc.concat(t);
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    #[test]
    fn identity_concat_is_noop() {
        let t = Transform::translate(fp("5"), fp("7"));
        let concatenated = t.concat(Transform::identity());
        assert_eq!(concatenated, t);
    }

    #[test]
    fn concat_order_matters() {
        let translate = Transform::translate(fp("10"), fp("0"));
        let scale = Transform::scale(fp("2"), fp("2"));
        // translate then scale: scale's matrix is applied to the translated
        // frame, so the translation term is carried through scaled.
        let t = translate.concat(scale);
        assert_eq!(t.e, fp("20"));
        assert_eq!(t.f, fp("0"));
        assert_eq!(t.a, fp("2"));
        assert_eq!(t.d, fp("2"));

        // scale then translate: translation is untouched by the earlier scale.
        let u = scale.concat(translate);
        assert_eq!(u.e, fp("10"));
        assert_eq!(u.f, fp("0"));
    }

    #[test]
    fn apply_translates_a_point() {
        let t = Transform::translate(fp("5"), fp("7"));
        assert_eq!(t.apply((fp("1"), fp("1"))), (fp("6"), fp("8")));
    }

    #[test]
    fn concat_sequence_requires_nonempty() {
        assert!(concat_sequence(&[]).is_err());
        assert!(concat_sequence(&[Transform::identity()]).is_ok());
    }
}
