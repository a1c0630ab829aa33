//! Synthetic chart series. Jitter comes from the caller's RNG so tests can
//! seed it; production callers pass `rand::thread_rng()`.

use rand::Rng;

pub const DEFAULT_CURVE_POINTS: usize = 32;
pub const DEFAULT_SPARKLINE_POINTS: usize = 32;

/// Diminishing-returns response curve: each step adds `max(0.2, 1 - i/18)`
/// to a running total, plus up to 0.8 of noise per point.
pub fn response_curve<R: Rng + ?Sized>(rng: &mut R, points: usize) -> Vec<f64> {
    let mut x = 1.0;
    (0..points)
        .map(|i| {
            x += curve_step(i);
            x + rng.gen_range(0.0..0.8)
        })
        .collect()
}

/// Conversations-over-time sparkline: a sine wave around 7 with up to 2 of
/// noise, rounded and floored at 1.
pub fn conversations_sparkline<R: Rng + ?Sized>(rng: &mut R, points: usize) -> Vec<u32> {
    (0..points)
        .map(|i| {
            let value = 7.0 + (i as f64 / 2.6).sin() * 3.0 + rng.gen_range(0.0..2.0);
            value.round().max(1.0) as u32
        })
        .collect()
}

fn curve_step(i: usize) -> f64 {
    (1.0 - i as f64 / 18.0).max(0.2)
}
