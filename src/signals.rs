//! Small signal-generation helpers used by the demos and by the recurrent
//! end-to-end tests. This is a deliberately narrow slice of the original
//! signal-generation toolkit, not a full reimplementation of it: no
//! alternate filter types, no general APRBS dimensionality.

use crate::errors::{NetError, NetResult};
use ndarray::Array1;
use num_traits::Float;

/// `len` evenly spaced samples over `[start, end]`, inclusive.
pub fn linspace<T: Float>(start: T, end: T, len: usize) -> Array1<T> {
    if len == 0 {
        return Array1::from_vec(Vec::new());
    }
    if len == 1 {
        return Array1::from_vec(vec![start]);
    }
    let step = (end - start) / T::from(len - 1).unwrap();
    Array1::from_iter((0..len).map(|i| start + step * T::from(i).unwrap()))
}

/// Two-term taps for a maximal-length LFSR, keyed by register grade (bit
/// width). Grade 33 appears twice in the source table this is ported from,
/// both entries carrying the same value; the duplicate is harmless but is
/// kept rather than silently collapsed.
const LFSR_TAPS: &[(usize, usize)] = &[
    (2, 1),
    (3, 2),
    (4, 3),
    (5, 3),
    (6, 5),
    (7, 6),
    (9, 5),
    (10, 7),
    (11, 9),
    (15, 14),
    (17, 14),
    (18, 11),
    (20, 17),
    (21, 19),
    (22, 21),
    (23, 18),
    (25, 22),
    (28, 25),
    (29, 27),
    (31, 28),
    (33, 20),
    (33, 20),
];

/// Grade (register width) used by the internal LFSR; fixed rather than
/// exposed as a parameter, since the `t`/`max_hold_time` pair is what
/// callers actually need to tune.
const LFSR_GRADE: usize = 25;

fn lfsr_tap(grade: usize) -> NetResult<usize> {
    LFSR_TAPS
        .iter()
        .find(|(g, _)| *g == grade)
        .map(|(_, tap)| *tap)
        .ok_or_else(|| NetError::OutOfRange(format!("no two-term LFSR tap entry for grade {grade}")))
}

/// Amplitude-modulated pseudo-random binary sequence, one sample per entry
/// of the time vector `t`. The underlying LFSR bit is held constant for a
/// random number of samples in `[1, max_hold_time]` before the next bit is
/// drawn, so the sequence's bandwidth is controlled by `max_hold_time`
/// rather than by the sample rate of `t`. Values alternate between `min`
/// and `max`.
pub fn amp_pseudo_random_binary_sequence<T: Float>(
    t: &Array1<T>,
    max_hold_time: usize,
    min: T,
    max: T,
) -> NetResult<Array1<T>> {
    let tap = lfsr_tap(LFSR_GRADE)?;
    let max_hold_time = max_hold_time.max(1);
    let mut state: u64 = (1u64 << LFSR_GRADE) - 1; // all-ones seed, never zero
    let mut lfsr_bit = |state: &mut u64| -> u8 {
        let bit = ((*state >> (LFSR_GRADE - 1)) ^ (*state >> (tap - 1))) & 1;
        *state = ((*state << 1) | bit) & ((1u64 << LFSR_GRADE) - 1);
        bit as u8
    };

    let mut out = Vec::with_capacity(t.len());
    let mut remaining_hold = 0usize;
    let mut current = min;
    for _ in 0..t.len() {
        if remaining_hold == 0 {
            let bit = lfsr_bit(&mut state);
            current = if bit == 1 { max } else { min };
            remaining_hold = 1 + (state as usize % max_hold_time);
        }
        remaining_hold -= 1;
        out.push(current);
    }
    Ok(Array1::from_vec(out))
}

/// First-order low-pass filter applied over a (possibly non-uniformly
/// sampled) time vector: `y[n] = y[n-1] + (dt / (time_constant + dt)) *
/// (gain * x[n] - y[n-1])`, the discretized form of `tau * y' + y = gain *
/// x`.
pub fn low_pass_filter<T: Float>(time: &Array1<T>, input: &Array1<T>, gain: T, time_constant: T) -> Array1<T> {
    let mut y = T::zero();
    let mut out = Vec::with_capacity(input.len());
    for i in 0..input.len() {
        let dt = if i == 0 { T::zero() } else { time[i] - time[i - 1] };
        let alpha = if time_constant + dt > T::zero() {
            dt / (time_constant + dt)
        } else {
            T::one()
        };
        y = y + alpha * (gain * input[i] - y);
        out.push(y);
    }
    Array1::from_vec(out)
}
