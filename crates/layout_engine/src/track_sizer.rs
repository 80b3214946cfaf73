//! Track Sizing Algorithm
//!
//! Distributes the space of one axis of a grid among its tracks (columns or
//! rows):
//! - Fixed tracks get the natural size of their largest occupant
//! - Scaling tracks share whatever is left, in whole-unit chunks, with the
//!   last scaling track absorbing the remainder so nothing is lost to rounding
//! - With no explicitly scaling track, the last track scales implicitly
//! - When even the fixed tracks do not fit, every track keeps its minimum and
//!   the axis overflows; clipping is left to the native widget
//!
//! The sizer is a pure function of its input and knows nothing about nodes.

/// Sizing input for a single track
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackSpec {
    /// Natural size of the largest visible occupant, 0 when empty
    pub min: f32,
    /// Explicitly marked scaling
    pub scaling: bool,
    /// Pre-assigned size; such a track never scales
    pub explicit: Option<f32>,
}

impl TrackSpec {
    pub fn fixed(min: f32) -> Self {
        Self {
            min,
            scaling: false,
            explicit: None,
        }
    }

    pub fn scaling(min: f32) -> Self {
        Self {
            min,
            scaling: true,
            explicit: None,
        }
    }

    pub fn explicit(size: f32) -> Self {
        Self {
            min: size,
            scaling: false,
            explicit: Some(size),
        }
    }

    fn fixed_size(&self) -> f32 {
        self.explicit.unwrap_or(self.min)
    }
}

/// Tracks of one axis plus the space offered to them
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInput {
    pub tracks: Vec<TrackSpec>,
    /// Track that scales because no track is explicitly marked
    pub implicit_index: Option<usize>,
    /// Content-box size: total minus padding minus inter-track spacing
    pub available: f32,
}

impl TrackInput {
    pub fn new(tracks: Vec<TrackSpec>, implicit_index: Option<usize>, available: f32) -> Self {
        Self {
            tracks,
            implicit_index,
            available,
        }
    }

    /// Build input whose implicit track follows the default rule: the last
    /// track, unless any track is explicitly scaling.
    pub fn with_default_implicit(tracks: Vec<TrackSpec>, available: f32) -> Self {
        let implicit_index = if tracks.iter().any(|t| t.scaling) {
            None
        } else {
            tracks.len().checked_sub(1)
        };
        Self::new(tracks, implicit_index, available)
    }

    /// Whether track `index` receives a share of leftover space
    pub fn is_effective_scaling(&self, index: usize) -> bool {
        let track = &self.tracks[index];
        track.explicit.is_none() && (track.scaling || self.implicit_index == Some(index))
    }

    /// Sum of the sizes of all non-scaling tracks
    pub fn fixed_total(&self) -> f32 {
        (0..self.tracks.len())
            .filter(|&i| !self.is_effective_scaling(i))
            .map(|i| self.tracks[i].fixed_size())
            .sum()
    }
}

/// Compute concrete per-track sizes.
///
/// When `available >= fixed_total` and every scaling track's natural size fits
/// in its share, the returned sizes sum to `available` exactly.
pub fn size_tracks(input: &TrackInput) -> Vec<f32> {
    let scaling: Vec<usize> = (0..input.tracks.len())
        .filter(|&i| input.is_effective_scaling(i))
        .collect();
    let fixed_total = input.fixed_total();

    let mut sizes: Vec<f32> = input
        .tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            if scaling.contains(&i) {
                track.min
            } else {
                track.fixed_size()
            }
        })
        .collect();

    // Not enough room for the fixed tracks, or nothing to share against:
    // keep every minimum and let the axis overflow.
    if !input.available.is_finite() || input.available < fixed_total || scaling.is_empty() {
        return sizes;
    }

    let remaining = (input.available - fixed_total).max(0.0);
    let count = scaling.len();
    let chunk = (remaining / count as f32).floor();
    let last_share = remaining - chunk * (count - 1) as f32;

    for (n, &index) in scaling.iter().enumerate() {
        let share = if n + 1 == count { last_share } else { chunk };
        sizes[index] = input.tracks[index].min.max(share);
    }

    sizes
}

/// Leading offset of every track: `start + sum(previous sizes + spacing)`
pub fn track_offsets(sizes: &[f32], start: f32, spacing: f32) -> Vec<f32> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut cursor = start;
    for size in sizes {
        offsets.push(cursor);
        cursor += size + spacing;
    }
    offsets
}
