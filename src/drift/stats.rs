//! Statistical primitives behind the drift tests.
//!
//! Distribution functions follow the usual series and continued-fraction
//! expansions, accurate to roughly 1e-7 which is plenty for thresholding.
use crate::constants::KS_EXACT_MAX_PRODUCT;
use crate::utils::sorted;

const ITMAX: usize = 200;
const EPS: f64 = 3.0e-12;
const FPMIN: f64 = 1.0e-300;

/// Natural log of the gamma function for `x > 0` (Lanczos approximation).
pub fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000000000190015;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.5066282746310005 * ser / x).ln()
}

fn gamma_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut del = 1.0 / a;
    let mut sum = del;
    for _ in 0..ITMAX {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * EPS {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

fn gamma_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..ITMAX {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b + an / c;
        if c.abs() < FPMIN {
            c = FPMIN;
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

/// Regularized upper incomplete gamma function Q(a, x).
pub fn gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x.is_infinite() {
        return 0.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_series(a, x)
    } else {
        gamma_continued_fraction(a, x)
    }
}

/// Survival function of the chi-squared distribution.
pub fn chi2_sf(x: f64, df: f64) -> f64 {
    if df <= 0.0 {
        return 1.0;
    }
    gamma_q(df / 2.0, x / 2.0).clamp(0.0, 1.0)
}

/// Complementary error function.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let tail = -0.18628806
        + t * (0.27886807 + t * (-1.13520398 + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))));
    let poly = -1.26551223 + t * (1.00002368 + t * (0.37409196 + t * (0.09678418 + t * tail)));
    let ans = t * (-z * z + poly).exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Two-sided p-value of a standard normal statistic.
pub fn normal_two_sided_p(z: f64) -> f64 {
    erfc(z.abs() / std::f64::consts::SQRT_2).clamp(0.0, 1.0)
}

/// Kolmogorov distribution survival function Q_KS(lambda).
pub fn kolmogorov_q(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut term_before = 0.0;
    for j in 1..=100 {
        let j = j as f64;
        let term = fac * (a2 * j * j).exp();
        sum += term;
        if term.abs() <= 0.001 * term_before || term.abs() <= 1.0e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        term_before = term.abs();
    }
    // Only small lambdas fail to converge.
    1.0
}

/// Two-sample Kolmogorov-Smirnov statistic on sorted inputs.
fn ks_statistic_sorted(a: &[f64], b: &[f64]) -> f64 {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (mut j1, mut j2) = (0, 0);
    let (mut fn1, mut fn2) = (0.0, 0.0);
    let mut d: f64 = 0.0;
    while j1 < a.len() && j2 < b.len() {
        let (d1, d2) = (a[j1], b[j2]);
        if d1 <= d2 {
            while j1 < a.len() && a[j1] == d1 {
                j1 += 1;
            }
            fn1 = j1 as f64 / n1;
        }
        if d2 <= d1 {
            while j2 < b.len() && b[j2] == d2 {
                j2 += 1;
            }
            fn2 = j2 as f64 / n2;
        }
        d = d.max((fn2 - fn1).abs());
    }
    d
}

/// Binomial coefficient as `f64`.
fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (1..=k).fold(1.0, |acc, i| acc * (n - k + i) as f64 / i as f64)
}

/// Exact two-sided probability that the KS statistic of samples of sizes
/// `n1` and `n2` reaches `h / (n1 * n2)`, by counting monotone lattice paths
/// from (0, 0) to (n1, n2) that first leave the band `|i * n2 - j * n1| < h`.
fn ks_exact_p(n1: usize, n2: usize, h: u64) -> f64 {
    if h == 0 {
        return 1.0;
    }
    let (m, n, h) = (n1 as i64, n2 as i64, h as i64);
    let total = binomial(n1 + n2, n1);
    let mut outside = 0.0;
    let mut prev = vec![0.0; n2 + 1];
    let mut cur = vec![0.0; n2 + 1];
    for i in 0..=n1 {
        for j in 0..=n2 {
            if i == 0 && j == 0 {
                cur[0] = 1.0;
                continue;
            }
            let up = if i > 0 { prev[j] } else { 0.0 };
            let left = if j > 0 { cur[j - 1] } else { 0.0 };
            let reach = up + left;
            if (i as i64 * n - j as i64 * m).abs() >= h {
                outside += reach * binomial(n1 - i + n2 - j, n1 - i);
                cur[j] = 0.0;
            } else {
                cur[j] = reach;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    (outside / total).clamp(0.0, 1.0)
}

/// Two-sample Kolmogorov-Smirnov test, returning the statistic and its
/// two-sided p-value. The p-value is exact while `n1 * n2` stays within
/// [`KS_EXACT_MAX_PRODUCT`] and asymptotic beyond.
pub fn ks_2samp(reference: &[f64], current: &[f64]) -> (f64, f64) {
    if reference.is_empty() || current.is_empty() {
        return (0.0, 1.0);
    }
    let a = sorted(reference);
    let b = sorted(current);
    let d = ks_statistic_sorted(&a, &b);
    let (n1, n2) = (a.len(), b.len());
    if n1 * n2 <= KS_EXACT_MAX_PRODUCT {
        // d * n1 * n2 is an integer up to rounding.
        let h = (d * (n1 * n2) as f64).round() as u64;
        return (d, ks_exact_p(n1, n2, h));
    }
    let (n1, n2) = (n1 as f64, n2 as f64);
    let en = (n1 * n2 / (n1 + n2)).sqrt();
    let p = kolmogorov_q((en + 0.12 + 0.11 / en) * d);
    (d, p)
}

/// First Wasserstein distance between two empirical distributions.
pub fn wasserstein_distance(u: &[f64], v: &[f64]) -> f64 {
    if u.is_empty() || v.is_empty() {
        return 0.0;
    }
    let us = sorted(u);
    let vs = sorted(v);
    let mut all: Vec<f64> = us.iter().chain(vs.iter()).copied().collect();
    all.sort_by(|a, b| a.total_cmp(b));
    let (nu, nv) = (us.len() as f64, vs.len() as f64);
    all.windows(2)
        .map(|w| {
            let u_cdf = us.partition_point(|&x| x <= w[0]) as f64 / nu;
            let v_cdf = vs.partition_point(|&x| x <= w[0]) as f64 / nv;
            (u_cdf - v_cdf).abs() * (w[1] - w[0])
        })
        .sum()
}

/// Jensen-Shannon distance (natural log) between two probability vectors.
pub fn jensen_shannon_distance(p: &[f64], q: &[f64]) -> f64 {
    let p_sum: f64 = p.iter().sum();
    let q_sum: f64 = q.iter().sum();
    if p_sum <= 0.0 || q_sum <= 0.0 {
        return 0.0;
    }
    let kl = |x: f64, m: f64| if x > 0.0 { x * (x / m).ln() } else { 0.0 };
    let divergence: f64 = p
        .iter()
        .zip(q)
        .map(|(&pi, &qi)| {
            let (pi, qi) = (pi / p_sum, qi / q_sum);
            let m = (pi + qi) / 2.0;
            kl(pi, m) + kl(qi, m)
        })
        .sum::<f64>()
        / 2.0;
    divergence.max(0.0).sqrt()
}

/// Pearson chi-squared goodness of fit, returning the statistic and p-value.
/// Categories with zero expected and zero observed counts are skipped.
pub fn chi_square_gof(observed: &[f64], expected: &[f64]) -> (f64, f64) {
    let mut stat = 0.0;
    let mut k: usize = 0;
    for (&o, &e) in observed.iter().zip(expected) {
        if e == 0.0 {
            if o > 0.0 {
                return (f64::INFINITY, 0.0);
            }
            continue;
        }
        stat += (o - e).powi(2) / e;
        k += 1;
    }
    let df = k.saturating_sub(1) as f64;
    (stat, chi2_sf(stat, df))
}

/// Two-proportion Z-test with pooled variance, returning the statistic and
/// two-sided p-value.
pub fn proportions_z_test(hits1: f64, n1: f64, hits2: f64, n2: f64) -> (f64, f64) {
    if n1 == 0.0 || n2 == 0.0 {
        return (0.0, 1.0);
    }
    let (p1, p2) = (hits1 / n1, hits2 / n2);
    let pooled = (hits1 + hits2) / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se == 0.0 {
        return (0.0, 1.0);
    }
    let z = (p1 - p2) / se;
    (z, normal_two_sided_p(z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln_gamma() {
        // Gamma(5) = 24
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-9);
        // Gamma(0.5) = sqrt(pi)
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-9);
    }

    #[test]
    fn test_chi2_sf() {
        // Two degrees of freedom has survival exp(-x / 2).
        assert!((chi2_sf(4.0, 2.0) - (-2.0f64).exp()).abs() < 1e-9);
        assert!((chi2_sf(3.841458820694124, 1.0) - 0.05).abs() < 1e-6);
        assert_eq!(chi2_sf(0.0, 3.0), 1.0);
        assert_eq!(chi2_sf(f64::INFINITY, 3.0), 0.0);
    }

    #[test]
    fn test_normal_p() {
        assert!((normal_two_sided_p(0.0) - 1.0).abs() < 1e-6);
        assert!((normal_two_sided_p(1.959963984540054) - 0.05).abs() < 1e-6);
        assert!((normal_two_sided_p(-1.959963984540054) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_ks_identical_and_disjoint() {
        let a = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        let (d, p) = ks_2samp(&a, &a);
        assert_eq!(d, 0.0);
        assert_eq!(p, 1.0);

        let b: Vec<f64> = (0..40).map(|i| 0.7 + i as f64 * 0.005).collect();
        let c: Vec<f64> = (0..80).map(|i| 0.1 + i as f64 * 0.0025).collect();
        let (d, p) = ks_2samp(&c, &b);
        assert_eq!(d, 1.0);
        assert!(p < 1e-10);
    }

    #[test]
    fn test_ks_exact_small_samples() {
        let a: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let b: Vec<f64> = (6..16).map(|i| i as f64).collect();
        let (d, p) = ks_2samp(&a, &b);
        assert!((d - 0.6).abs() < 1e-12);
        // 0.05244755..., just above the default threshold.
        assert!((p - 0.052447552447552).abs() < 1e-9);

        let a: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let b: Vec<f64> = (5..13).map(|i| i as f64).collect();
        let (d, p) = ks_2samp(&a, &b);
        assert!((d - 0.625).abs() < 1e-12);
        assert!((p - 0.087024087024087).abs() < 1e-9);
    }

    #[test]
    fn test_ks_large_samples_use_asymptotic() {
        let a: Vec<f64> = (0..200).map(|i| i as f64 / 200.0).collect();
        let b: Vec<f64> = (0..200).map(|i| 0.05 + i as f64 / 200.0).collect();
        let (d, p) = ks_2samp(&a, &b);
        let en = (200.0f64 * 200.0 / 400.0).sqrt();
        assert_eq!(p, kolmogorov_q((en + 0.12 + 0.11 / en) * d));
    }

    #[test]
    fn test_chi_square_gof_degrees_of_freedom() {
        // Two categories give one degree of freedom.
        let (stat, p) = chi_square_gof(&[30.0, 10.0], &[20.0, 20.0]);
        assert_eq!(stat, 10.0);
        assert!((p - chi2_sf(10.0, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_ks_ties() {
        let a = vec![1.0, 1.0, 2.0, 2.0];
        let b = vec![1.0, 2.0, 2.0, 2.0];
        let (d, _) = ks_2samp(&a, &b);
        assert!((d - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_wasserstein() {
        assert!((wasserstein_distance(&[0.0, 1.0, 3.0], &[5.0, 6.0, 8.0]) - 5.0).abs() < 1e-12);
        assert!((wasserstein_distance(&[0.0, 1.0], &[0.0, 1.0])).abs() < 1e-12);
        assert!((wasserstein_distance(&[0.0, 1.0], &[0.5]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_jensen_shannon() {
        assert!(jensen_shannon_distance(&[0.5, 0.5], &[0.5, 0.5]).abs() < 1e-12);
        let d = jensen_shannon_distance(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((d - std::f64::consts::LN_2.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_chi_square_gof() {
        let (stat, p) = chi_square_gof(&[10.0, 10.0], &[10.0, 10.0]);
        assert_eq!(stat, 0.0);
        assert_eq!(p, 1.0);
        let (stat, p) = chi_square_gof(&[5.0, 1.0], &[3.0, 0.0]);
        assert!(stat.is_infinite());
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_proportions_z_test() {
        let (z, p) = proportions_z_test(50.0, 100.0, 50.0, 100.0);
        assert_eq!(z, 0.0);
        assert!((p - 1.0).abs() < 1e-6);
        let (_, p) = proportions_z_test(90.0, 100.0, 10.0, 100.0);
        assert!(p < 1e-6);
        assert_eq!(proportions_z_test(0.0, 10.0, 0.0, 10.0), (0.0, 1.0));
    }
}
