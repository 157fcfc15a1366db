//! Forward evaluation of the single diode equation: current at a given voltage, open circuit
//! voltage, sampled IV curves and the max power point of a parameter set.
//!
//! Both implicit equations are monotone in the unknown, so a Newton iteration safeguarded by a
//! bisection bracket always converges.
use super::iv_types::{IVCurve, SDEParameters};
use super::ivtools_errors::ExtractionError;

const MAX_ITER: usize = 200;
const REL_TOL: f64 = 1e-15;
const GOLDEN: f64 = 0.618_033_988_749_894_8;

fn check_params(p: &SDEParameters) -> Result<(), ExtractionError> {
    let (il, i0, rsh, rs, a) = p.to_tuple();
    if !p.is_finite() || il <= 0.0 || i0 <= 0.0 || rsh <= 0.0 || rs < 0.0 || a <= 0.0 {
        return Err(ExtractionError::InvalidInput(format!(
            "single diode parameters must be positive and finite: {:?}",
            p
        )));
    }
    Ok(())
}

/// Newton iteration for a decreasing function `f` with root inside `[lo, hi]`
fn newton_bracketed<F>(f: F, mut lo: f64, mut hi: f64) -> f64
where
    F: Fn(f64) -> (f64, f64),
{
    let mut x = 0.5 * (lo + hi);
    for _ in 0..MAX_ITER {
        let (g, dg) = f(x);
        if g == 0.0 {
            return x;
        }
        if g > 0.0 {
            lo = x;
        } else {
            hi = x;
        }
        let mut next = x - g / dg;
        if !(next > lo && next < hi) {
            next = 0.5 * (lo + hi);
        }
        if (next - x).abs() <= REL_TOL * x.abs().max(1.0) {
            return next;
        }
        x = next;
    }
    x
}

/// Terminal current at voltage `v`
pub fn i_from_v(p: &SDEParameters, v: f64) -> Result<f64, ExtractionError> {
    check_params(p)?;
    if !v.is_finite() {
        return Err(ExtractionError::InvalidInput(format!("voltage {} is not finite", v)));
    }
    let (il, i0, rsh, rs, a) = p.to_tuple();
    let g = |i: f64| {
        let e = ((v + i * rs) / a).exp();
        (
            il - i0 * (e - 1.0) - (v + i * rs) / rsh - i,
            -i0 * rs / a * e - rs / rsh - 1.0,
        )
    };
    // g decreases in i: grow the bracket until it holds the root
    let mut hi = il.max(1.0);
    let mut n = 0;
    while g(hi).0 > 0.0 {
        hi *= 2.0;
        n += 1;
        if n > 1100 {
            return Err(ExtractionError::InvalidInput(format!(
                "cannot bracket the current at V = {}",
                v
            )));
        }
    }
    let mut lo = -1.0;
    n = 0;
    while g(lo).0 < 0.0 {
        lo *= 2.0;
        n += 1;
        if n > 1100 {
            return Err(ExtractionError::InvalidInput(format!(
                "cannot bracket the current at V = {}",
                v
            )));
        }
    }
    Ok(newton_bracketed(g, lo, hi))
}

/// Open circuit voltage, the root of `IL - I0 (exp(V/a) - 1) - V/Rsh`
pub fn v_oc(p: &SDEParameters) -> Result<f64, ExtractionError> {
    check_params(p)?;
    let (il, i0, rsh, _rs, a) = p.to_tuple();
    let h = |v: f64| {
        let e = (v / a).exp();
        (il - i0 * (e - 1.0) - v / rsh, -i0 / a * e - 1.0 / rsh)
    };
    let hi = a * (il / i0).ln_1p();
    Ok(newton_bracketed(h, 0.0, hi))
}

/// IV curve sampled at `n_points` equally spaced voltages from 0 to the open circuit voltage
pub fn iv_curve(p: &SDEParameters, n_points: usize) -> Result<IVCurve, ExtractionError> {
    if n_points < 2 {
        return Err(ExtractionError::InvalidInput(format!(
            "an IV curve needs at least two points, got {}",
            n_points
        )));
    }
    let voc = v_oc(p)?;
    let step = voc / (n_points - 1) as f64;
    let mut voltage = Vec::with_capacity(n_points);
    let mut current = Vec::with_capacity(n_points);
    for k in 0..n_points {
        let v = if k == n_points - 1 { voc } else { k as f64 * step };
        let i = if k == n_points - 1 { 0.0 } else { i_from_v(p, v)? };
        voltage.push(v);
        current.push(i);
    }
    IVCurve::new(voltage, current)
}

/// `(v_mp, i_mp, p_mp)` by golden section search of the power on `[0, v_oc]`
pub fn max_power_point(p: &SDEParameters) -> Result<(f64, f64, f64), ExtractionError> {
    let voc = v_oc(p)?;
    let power = |v: f64| -> Result<f64, ExtractionError> { Ok(v * i_from_v(p, v)?) };
    let (mut a, mut b) = (0.0, voc);
    let mut c = b - GOLDEN * (b - a);
    let mut d = a + GOLDEN * (b - a);
    let (mut pc, mut pd) = (power(c)?, power(d)?);
    while (b - a).abs() > 1e-10 * voc.max(1.0) {
        if pc > pd {
            b = d;
            d = c;
            pd = pc;
            c = b - GOLDEN * (b - a);
            pc = power(c)?;
        } else {
            a = c;
            c = d;
            pc = pd;
            d = a + GOLDEN * (b - a);
            pd = power(d)?;
        }
    }
    let v_mp = 0.5 * (a + b);
    let i_mp = i_from_v(p, v_mp)?;
    Ok((v_mp, i_mp, v_mp * i_mp))
}
