//! Track-level alpha mattes with independent time windows.
//!
//! A mask belongs to a track, not a clip, and carries its own
//! `start_time`/`duration`. Its matte is either a single raster or a list of
//! time-keyed mattes crossfaded with an easing mode. White = opaque.

use framecut_core::{Matte, TimeRange};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Easing applied to the crossfade between two matte keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskEasing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl MaskEasing {
    /// Map a linear ratio in `[0, 1]` through the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A timestamped matte on the mask's local timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskKeyframe {
    pub id: Uuid,
    /// Mask-local time in seconds.
    pub time: f64,
    pub matte: Matte,
    /// Easing toward the next keyframe.
    #[serde(default)]
    pub easing: MaskEasing,
}

impl MaskKeyframe {
    pub fn new(time: f64, matte: Matte) -> Self {
        Self {
            id: Uuid::new_v4(),
            time,
            matte,
            easing: MaskEasing::Linear,
        }
    }
}

/// The matte payload of a mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaskData {
    /// One raster matte for the whole window.
    Static(Matte),
    /// Time-keyed mattes, crossfaded pairwise. Kept sorted by time.
    Keyframes(Vec<MaskKeyframe>),
}

/// A resolved matte sample at some time.
#[derive(Debug)]
pub enum MatteRef<'a> {
    Single(&'a Matte),
    /// Crossfade: `t` is the eased blend factor toward `to`.
    Blend {
        from: &'a Matte,
        to: &'a Matte,
        t: f32,
    },
}

/// A track-level alpha matte with its own time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    pub id: Uuid,
    pub track_id: Uuid,
    /// Timeline placement in seconds.
    pub start_time: f64,
    pub duration: f64,
    /// Always equals the project canvas size.
    pub size: (u32, u32),
    pub data: MaskData,
}

impl Mask {
    /// Create a static mask covering the given window, fully opaque.
    pub fn new(track_id: Uuid, start_time: f64, duration: f64, size: (u32, u32)) -> Self {
        Self {
            id: Uuid::new_v4(),
            track_id,
            start_time,
            duration,
            size,
            data: MaskData::Static(Matte::opaque(size.0, size.1)),
        }
    }

    /// Timeline interval this mask covers.
    #[inline]
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.duration)
    }

    /// The committed matte to apply at a mask-local time, if any.
    pub fn matte_at(&self, local_time: f64) -> Option<MatteRef<'_>> {
        match &self.data {
            MaskData::Static(matte) => Some(MatteRef::Single(matte)),
            MaskData::Keyframes(keyframes) => {
                if keyframes.is_empty() {
                    return None;
                }
                let first = &keyframes[0];
                if local_time <= first.time {
                    return Some(MatteRef::Single(&first.matte));
                }
                let last = &keyframes[keyframes.len() - 1];
                if local_time >= last.time {
                    return Some(MatteRef::Single(&last.matte));
                }
                let idx = keyframes
                    .partition_point(|kf| kf.time <= local_time)
                    .saturating_sub(1);
                let a = &keyframes[idx];
                let b = &keyframes[idx + 1];
                let span = b.time - a.time;
                if span <= 0.0 {
                    return Some(MatteRef::Single(&a.matte));
                }
                let t = a.easing.apply(((local_time - a.time) / span) as f32);
                Some(MatteRef::Blend {
                    from: &a.matte,
                    to: &b.matte,
                    t,
                })
            }
        }
    }

    /// Replace the committed matte with a single raster (edit commit).
    pub fn commit_static(&mut self, matte: Matte) {
        self.data = MaskData::Static(matte);
    }

    /// Sort keyframes by time. Call after any keyframe edit.
    pub fn normalize(&mut self) {
        if let MaskData::Keyframes(keyframes) = &mut self.data {
            keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        }
    }
}

/// A mask lookup result for rendering.
#[derive(Debug)]
pub enum MaskHit<'a> {
    /// Use the mask's committed matte.
    Committed(&'a Mask),
    /// This mask is being edited — use the live drawing surface.
    Live(&'a Mask),
}

impl<'a> MaskHit<'a> {
    pub fn mask(&self) -> &'a Mask {
        match self {
            Self::Committed(mask) | Self::Live(mask) => mask,
        }
    }
}

/// Mask active on a track at a timeline time, using the same
/// binary-search-by-start strategy as clips. Returns the live sentinel when
/// the hit is the mask currently under edit.
pub fn find_mask_at_time<'a>(
    masks: &'a [Mask],
    track_id: Uuid,
    time: f64,
    editing: Option<Uuid>,
) -> Option<MaskHit<'a>> {
    let mut on_track: Vec<&Mask> = masks.iter().filter(|m| m.track_id == track_id).collect();
    on_track.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let idx = on_track.partition_point(|m| m.start_time <= time);
    let hit = on_track[..idx]
        .iter()
        .rev()
        .find(|m| m.time_range().contains(time))
        .copied()?;

    if editing == Some(hit.id) {
        Some(MaskHit::Live(hit))
    } else {
        Some(MaskHit::Committed(hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            MaskEasing::Linear,
            MaskEasing::EaseIn,
            MaskEasing::EaseOut,
            MaskEasing::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        assert!(MaskEasing::EaseIn.apply(0.5) < 0.5);
        assert!(MaskEasing::EaseOut.apply(0.5) > 0.5);
    }

    #[test]
    fn test_matte_at_keyframes() {
        let track = Uuid::new_v4();
        let mut mask = Mask::new(track, 0.0, 10.0, (4, 4));
        let black = Matte::transparent(4, 4);
        let white = Matte::opaque(4, 4);
        mask.data = MaskData::Keyframes(vec![
            MaskKeyframe::new(2.0, black),
            MaskKeyframe::new(6.0, white),
        ]);

        // Before first / after last clamp to the edge mattes.
        assert!(matches!(mask.matte_at(0.0), Some(MatteRef::Single(_))));
        assert!(matches!(mask.matte_at(9.0), Some(MatteRef::Single(_))));

        // In between: a blend at the linear midpoint.
        match mask.matte_at(4.0) {
            Some(MatteRef::Blend { t, .. }) => assert!((t - 0.5).abs() < 1e-6),
            other => panic!("expected blend, got {other:?}"),
        }
    }

    #[test]
    fn test_find_mask_at_time_and_live_sentinel() {
        let track = Uuid::new_v4();
        let early = Mask::new(track, 0.0, 5.0, (4, 4));
        let late = Mask::new(track, 8.0, 5.0, (4, 4));
        let masks = vec![early.clone(), late.clone()];

        assert!(find_mask_at_time(&masks, track, 6.0, None).is_none());
        let hit = find_mask_at_time(&masks, track, 9.0, None).unwrap();
        assert_eq!(hit.mask().id, late.id);
        assert!(matches!(hit, MaskHit::Committed(_)));

        let hit = find_mask_at_time(&masks, track, 9.0, Some(late.id)).unwrap();
        assert!(matches!(hit, MaskHit::Live(_)));

        // Editing a different mask does not turn this hit live.
        let hit = find_mask_at_time(&masks, track, 2.0, Some(late.id)).unwrap();
        assert!(matches!(hit, MaskHit::Committed(_)));
    }

    #[test]
    fn test_find_mask_other_track() {
        let track = Uuid::new_v4();
        let masks = vec![Mask::new(track, 0.0, 5.0, (4, 4))];
        assert!(find_mask_at_time(&masks, Uuid::new_v4(), 2.0, None).is_none());
    }
}
