use crate::errors::{NetError, NetResult};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A single tap on a delay line: "use the source's output from `delay_index`
/// steps ago, multiplied by `weight`".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tap<T> {
    pub delay_index: usize,
    pub weight: T,
}

impl<T> Tap<T> {
    pub fn new(delay_index: usize, weight: T) -> Self {
        Self { delay_index, weight }
    }
}

/// Edge payload from a source neuron to a destination neuron: an ordered
/// list of taps, kept in ascending `delay_index` order. `delay_index == 0`
/// may appear at most once, as the instantaneous tap.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DelayLine<T> {
    connected: bool,
    taps: Vec<Tap<T>>,
}

impl<T: Float> DelayLine<T> {
    /// An absent edge.
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            taps: Vec::new(),
        }
    }

    /// A single-tap edge, default weight 1.
    pub fn single(delay_index: usize, weight: T) -> Self {
        Self::from_taps(vec![Tap::new(delay_index, weight)])
    }

    /// A multi-tap edge. Taps are sorted by `delay_index`; this does not
    /// validate uniqueness of the instantaneous tap (callers control that
    /// by construction, since `general_net`-style usage always builds one
    /// delay line at a time from a known tap list).
    pub fn from_taps(mut taps: Vec<Tap<T>>) -> Self {
        taps.sort_by_key(|t| t.delay_index);
        Self {
            connected: true,
            taps,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_instantaneous(&self) -> bool {
        self.connected && self.taps.first().map(|t| t.delay_index == 0).unwrap_or(false)
    }

    pub fn has_delays(&self) -> bool {
        self.connected && self.taps.last().map(|t| t.delay_index > 0).unwrap_or(false)
    }

    pub fn max_delay(&self) -> usize {
        self.taps.last().map(|t| t.delay_index).unwrap_or(0)
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    pub fn taps(&self) -> &[Tap<T>] {
        &self.taps
    }

    pub fn weight(&self, tap_index: usize) -> NetResult<T> {
        self.taps
            .get(tap_index)
            .map(|t| t.weight)
            .ok_or_else(|| NetError::OutOfRange(format!("tap index {tap_index} out of range")))
    }

    pub fn set_weight(&mut self, tap_index: usize, weight: T) -> NetResult<()> {
        let tap = self
            .taps
            .get_mut(tap_index)
            .ok_or_else(|| NetError::OutOfRange(format!("tap index {tap_index} out of range")))?;
        tap.weight = weight;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_line_reports_absent() {
        let line: DelayLine<f64> = DelayLine::disconnected();
        assert!(!line.is_connected());
        assert!(!line.is_instantaneous());
        assert!(!line.has_delays());
        assert_eq!(line.tap_count(), 0);
    }

    #[test]
    fn single_instantaneous_tap() {
        let line = DelayLine::single(0, 2.0f64);
        assert!(line.is_connected());
        assert!(line.is_instantaneous());
        assert!(!line.has_delays());
        assert_eq!(line.max_delay(), 0);
    }

    #[test]
    fn mixed_tap_line_is_both() {
        let line = DelayLine::from_taps(vec![Tap::new(0, 1.0f64), Tap::new(2, 0.5)]);
        assert!(line.is_instantaneous());
        assert!(line.has_delays());
        assert_eq!(line.max_delay(), 2);
        assert_eq!(line.tap_count(), 2);
    }

    #[test]
    fn out_of_range_access_fails() {
        let mut line = DelayLine::single(1, 1.0f64);
        assert!(matches!(line.weight(5), Err(NetError::OutOfRange(_))));
        assert!(matches!(line.set_weight(5, 0.0), Err(NetError::OutOfRange(_))));
    }

    #[test]
    fn set_weight_round_trips() {
        let mut line = DelayLine::single(0, 1.0f64);
        line.set_weight(0, 3.5).unwrap();
        assert_eq!(line.weight(0).unwrap(), 3.5);
    }
}
