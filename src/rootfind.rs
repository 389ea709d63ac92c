//! Inversion of monotone functions over a bracket
//!
//! Used by the exact sampling policy to solve `F(y) = u` for a tabulated,
//! primary-interpolated CDF. The solver combines inverse quadratic
//! interpolation with a secant step and a bisection safeguard, so it needs
//! only that `f` be continuous and non-decreasing on the bracket.

const ITERATION_LIMIT: usize = 64;

#[derive(Copy, Clone, Debug)]
struct Root {
    x: f64,
    f: f64,
}

fn is_between(x: f64, min: f64, max: f64) -> bool {
    if min < max {
        (x > min) && (x < max)
    } else if max < min {
        (x > max) && (x < min)
    } else {
        true
    }
}

/// Solves `f(x) == target` for `x` in `[a, b]`, where `f` is continuous and
/// non-decreasing with `f(a) <= target <= f(b)`.
///
/// Convergence is declared when the bracket shrinks below `tol` relative to
/// the current estimate (absolute near zero). Returns the root and the number
/// of iterations used, or `None` if the target is not bracketed.
pub fn invert<F>(target: f64, a: f64, b: f64, tol: f64, f: F) -> Option<(f64, usize)>
where
    F: Fn(f64) -> f64,
{
    let fa = f(a) - target;
    let fb = f(b) - target;

    if fa > 0.0 || fb < 0.0 {
        return None;
    }
    // An endpoint may already satisfy the equation, e.g. target == 0 on a
    // CDF plateau. Take the bracket edge so the result stays in range.
    if fa == 0.0 {
        return Some((a, 0));
    }
    if fb == 0.0 {
        return Some((b, 0));
    }

    // 'root[0].x' is always the best current estimate of the root,
    // 'root[1].x' the previous best estimate, and 'root[2].x' the one
    // before that.
    let mut root = [Root { x: 0.0, f: 0.0 }; 4];

    root[0].x = a;
    root[0].f = fa;
    root[1].x = b;
    root[1].f = fb;

    if root[1].f.abs() < root[0].f.abs() {
        root.swap(0, 1);
    }

    root[2] = root[1];

    let mut prev_bisect = false;

    let mut counter = 0;
    for _i in 0..ITERATION_LIMIT {
        counter += 1;

        // First try inverse quadratic interpolation,
        // provided all roots are distinct.
        let s = if root[0].f != root[2].f && root[1].f != root[2].f {
            let r = root[0].f / root[2].f;
            let s = root[0].f / root[1].f;
            let t = root[1].f / root[2].f;
            let p = s * (t * (r - t) * (root[2].x - root[0].x) - (1.0 - r) * (root[0].x - root[1].x));
            let q = (t - 1.0) * (r - 1.0) * (s - 1.0);
            root[0].x + p / q
        } else {
            // use secant method
            root[0].x - (root[0].f * (root[0].x - root[1].x) / (root[0].f - root[1].f))
        };

        // Verify that 's' is acceptable
        let s = if !is_between(s, 0.25 * (3.0 * root[1].x + root[0].x), root[0].x)
            || (prev_bisect && (s - root[0].x).abs() >= 0.5 * (root[0].x - root[2].x).abs())
            || (!prev_bisect && (s - root[0].x).abs() >= 0.5 * (root[2].x - root[3].x).abs())
        {
            prev_bisect = true;
            0.5 * (root[0].x + root[1].x)
        } else {
            prev_bisect = false;
            s
        };

        // reorder roots
        root[3] = root[2];
        root[2] = root[0];
        root[0].x = s;
        root[0].f = f(s) - target;

        if root[1].f * root[0].f >= 0.0 {
            root[1] = root[0];
            root[0] = root[2];
        }

        if root[1].f.abs() < root[0].f.abs() {
            root.swap(0, 1);
        }

        let error = (root[1].x - root[0].x).abs() / root[0].x.abs().max(1.0);

        if error < tol || root[0].f == 0.0 {
            break;
        }
    }

    Some((root[0].x, counter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_x_sqd() {
        let y = 0.73;
        let (x, nevals) = invert(y, 0.0, 1.0, 1.0e-9, |x| x.powi(2)).unwrap();
        let err = (x - y.sqrt()).abs();

        println!("got {:e}, expected {:e}, error = {:e}, nevals = {}", x, y.sqrt(), err, nevals);
        assert!(err < 1.0e-8);
    }

    #[test]
    fn invert_tanh() {
        let y = 0.22;
        let (x, nevals) = invert(y, 0.0, 5.0, 1.0e-9, |x| x.tanh()).unwrap();
        let err = (x - y.atanh()).abs();

        println!("got {:e}, expected {:e}, error = {:e}, nevals = {}", x, y.atanh(), err, nevals);
        assert!(err < 1.0e-8);
    }

    #[test]
    fn invert_piecewise_linear_cdf() {
        // CDF of a triangular density on [0, 2]
        let cdf = |x: f64| {
            if x < 1.0 { 0.5 * x * x } else { -1.0 + 2.0 * x - 0.5 * x * x }
        };
        for &u in &[0.0, 0.125, 0.5, 0.875, 1.0] {
            let (x, _) = invert(u, 0.0, 2.0, 1.0e-10, cdf).unwrap();
            assert!((cdf(x) - u).abs() < 1.0e-9, "u = {}, x = {}", u, x);
        }
    }

    #[test]
    fn target_at_bracket_edges() {
        assert_eq!(invert(0.0, 0.0, 1.0, 1.0e-9, |x| x), Some((0.0, 0)));
        let (x, _) = invert(1.0, 0.0, 1.0, 1.0e-9, |x| x).unwrap();
        assert!((x - 1.0).abs() < 1.0e-9);
    }

    #[test]
    fn unbracketed_target_is_rejected() {
        assert!(invert(2.0, 0.0, 1.0, 1.0e-9, |x| x).is_none());
    }
}
