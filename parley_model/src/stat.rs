// ---------------------------------------------------------------------
// Chi-square goodness-of-fit on rate vectors
// ---------------------------------------------------------------------
//
// The pack this model ships with has no statistics dependency, so the
// p-value is computed inline from the regularized incomplete gamma
// function (series expansion below a+1, continued fraction above).

const EPS: f64 = 1e-12;
const MAX_ITER: usize = 200;

/// Goodness-of-fit p-value for `observed` against `expected`.
///
/// Degenerate comparisons are statistically undefined and are defined here
/// as p = 1.0 ("no significant difference") instead of a numeric error:
/// mismatched or too-short vectors, an all-zero expected vector, and two
/// vectors that are equal within float tolerance.
pub fn chi_square_pvalue(observed: &[f64], expected: &[f64]) -> f64 {
    if observed.len() != expected.len() || observed.len() < 2 {
        return 1.0;
    }
    if expected.iter().any(|e| !e.is_finite()) || observed.iter().any(|o| !o.is_finite()) {
        return 1.0;
    }
    if expected.iter().sum::<f64>() <= EPS {
        return 1.0;
    }
    if observed
        .iter()
        .zip(expected.iter())
        .all(|(o, e)| (o - e).abs() <= EPS)
    {
        return 1.0;
    }

    let mut statistic = 0.0_f64;
    let mut terms = 0_usize;
    for (&o, &e) in observed.iter().zip(expected.iter()) {
        if e <= EPS {
            continue;
        }
        let d = o - e;
        statistic += d * d / e;
        terms += 1;
    }
    if terms < 2 || statistic <= 0.0 {
        return 1.0;
    }

    let df = (terms - 1) as f64;
    gamma_q(df / 2.0, statistic / 2.0).clamp(0.0, 1.0)
}

/// Upper regularized incomplete gamma Q(a, x) = 1 - P(a, x).
fn gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 || a <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_p_series(a, x)
    } else {
        gamma_q_contfrac(a, x)
    }
}

/// P(a, x) by series expansion; converges fast for x < a + 1.
fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut sum = 1.0 / a;
    let mut del = sum;
    for _ in 0..MAX_ITER {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * EPS {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Q(a, x) by Lentz's continued fraction; converges fast for x >= a + 1.
fn gamma_q_contfrac(a: f64, x: f64) -> f64 {
    let tiny = 1e-300_f64;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / tiny;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITER {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < tiny {
            d = tiny;
        }
        c = b + an / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

/// Lanczos approximation of ln Γ(x), x > 0.
fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015_f64;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_are_not_significant() {
        let v = [0.25, 0.25, 0.25, 0.25];
        assert_eq!(chi_square_pvalue(&v, &v), 1.0);
    }

    #[test]
    fn all_zero_expected_is_not_significant() {
        let o = [0.5, 0.5];
        let e = [0.0, 0.0];
        assert_eq!(chi_square_pvalue(&o, &e), 1.0);
    }

    #[test]
    fn strong_shift_is_significant() {
        // Window rates for a value flip over a 6-bid window: all mass moved.
        let o = [0.05, 1.05];
        let e = [1.05, 0.05];
        let p = chi_square_pvalue(&o, &e);
        assert!(p < 0.05, "p = {p}");
    }

    #[test]
    fn mild_shift_is_not_significant() {
        let o = [0.27, 0.24, 0.25, 0.24];
        let e = [0.25, 0.25, 0.25, 0.25];
        let p = chi_square_pvalue(&o, &e);
        assert!(p > 0.5, "p = {p}");
    }

    #[test]
    fn gamma_q_matches_known_chi_square_points() {
        // df = 1, x = 3.841: the classic 5% critical value.
        let p = gamma_q(0.5, 3.841 / 2.0);
        assert!((p - 0.05).abs() < 5e-3, "p = {p}");
        // df = 2, x = 5.991.
        let p = gamma_q(1.0, 5.991 / 2.0);
        assert!((p - 0.05).abs() < 5e-3, "p = {p}");
    }
}
