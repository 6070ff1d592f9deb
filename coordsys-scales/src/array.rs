//! Numeric array helpers shared by the scales: tick generation, bisection and
//! sample quantiles. The tick algorithm follows d3-array so that axes drawn
//! from these scales line up with what d3 would produce.

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Generate approximately `count` nicely rounded ticks between `start` and `stop`.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    let count = count as f64;
    if count <= 0.0 || !start.is_finite() || !stop.is_finite() {
        return vec![];
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_spec(stop, start, count)
    } else {
        tick_spec(start, stop, count)
    };
    if i2 < i1 {
        return vec![];
    }

    let n = (i2 - i1 + 1.0) as usize;
    let value_at = |i: f64| if inc < 0.0 { i / -inc } else { i * inc };

    if reverse {
        (0..n).map(|i| value_at(i2 - i as f64)).collect()
    } else {
        (0..n).map(|i| value_at(i1 + i as f64)).collect()
    }
}

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    // divided before subtracting so spans wider than f64::MAX stay finite
    let step = stop / count.max(0.0) - start / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let positive_inc = 10f64.powf(-power) / factor;
        i1 = (start * positive_inc).round();
        i2 = (stop * positive_inc).round();
        if i1 / positive_inc < start {
            i1 += 1.0;
        }
        if i2 / positive_inc > stop {
            i2 -= 1.0;
        }
        inc = -positive_inc;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Tick increment as used by `nice`. Negative values encode the reciprocal of
/// a fractional step so the rounding stays exact.
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    tick_spec(start, stop, count as f64).2
}

/// Absolute distance between adjacent ticks
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let reverse = stop < start;
    let inc = if reverse {
        tick_increment(stop, start, count)
    } else {
        tick_increment(start, stop, count)
    };
    let step = if inc < 0.0 { 1.0 / -inc } else { inc };
    if reverse {
        -step
    } else {
        step
    }
}

/// Extend `(start, stop)` outward so both ends land on tick boundaries.
pub fn nice(start: f64, stop: f64, count: usize) -> (f64, f64) {
    if start == stop || !start.is_finite() || !stop.is_finite() {
        return (start, stop);
    }

    let reverse = stop < start;
    let (mut lo, mut hi) = if reverse { (stop, start) } else { (start, stop) };
    let mut prestep = 0.0;

    for _ in 0..10 {
        let step = tick_increment(lo, hi, count);
        if step == prestep {
            break;
        } else if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else if step < 0.0 {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        } else {
            break;
        }
        prestep = step;
    }

    if reverse {
        (hi, lo)
    } else {
        (lo, hi)
    }
}

/// Index of the first element strictly greater than `x` in an ascending slice
pub fn bisect_right(values: &[f64], x: f64) -> usize {
    values.partition_point(|v| *v <= x)
}

/// R-7 sample quantile of an ascending slice. Returns `None` for an empty slice.
pub fn quantile_sorted(values: &[f64], p: f64) -> Option<f64> {
    let n = values.len();
    if n == 0 || p.is_nan() {
        return None;
    }
    if p <= 0.0 || n < 2 {
        return values.first().copied();
    }
    if p >= 1.0 {
        return values.last().copied();
    }
    let i = (n - 1) as f64 * p;
    let i0 = i.floor() as usize;
    let v0 = values[i0];
    let v1 = values[i0 + 1];
    Some(v0 + (v1 - v0) * (i - i0 as f64))
}
