use crate::foundation::core::FrameIndex;

/// One keyframe of a control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlKey {
    pub frame: FrameIndex,
    pub value: f64,
}

/// Keyframes of one control, sorted by frame, at most one per frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlTrack {
    keys: Vec<ControlKey>,
}

impl ControlTrack {
    /// Insert a key, replacing any key already at `frame`.
    pub fn insert(&mut self, frame: FrameIndex, value: f64) {
        match self.keys.binary_search_by_key(&frame, |k| k.frame) {
            Ok(i) => self.keys[i].value = value,
            Err(i) => self.keys.insert(i, ControlKey { frame, value }),
        }
    }

    pub fn keys(&self) -> &[ControlKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value at `frame`: linear between neighbouring keys, held before the first and after the
    /// last. `None` without keys.
    pub fn sample(&self, frame: FrameIndex) -> Option<f64> {
        let first = self.keys.first()?;
        let f = frame.0;
        let idx = self.keys.partition_point(|k| k.frame.0 <= f);

        if idx == 0 {
            return Some(first.value);
        }
        if idx >= self.keys.len() {
            return self.keys.last().map(|k| k.value);
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let denom = b.frame.0 - a.frame.0;
        let t = ((f - a.frame.0) as f64) / (denom as f64);
        Some(a.value + (b.value - a.value) * t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/track.rs"]
mod tests;
