// src/spectrum/resample.rs
//! Mapping an arbitrary-length magnitude sequence onto N buckets.

/// Resamples `input` onto exactly `buckets` values by averaging
/// proportional index ranges.
///
/// Each output bucket averages the input range `[i*len/n, (i+1)*len/n)`;
/// when upsampling the range collapses to the single nearest sample. An
/// input of the same length comes back unchanged.
pub fn resample_avg(input: &[f32], buckets: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(buckets);
    resample_avg_into(input, buckets, &mut out);
    out
}

/// [`resample_avg`] writing into a reused buffer to avoid per-frame
/// allocation.
pub fn resample_avg_into(input: &[f32], buckets: usize, out: &mut Vec<f32>) {
    out.clear();
    if buckets == 0 {
        return;
    }
    if input.is_empty() {
        out.resize(buckets, 0.0);
        return;
    }
    if input.len() == buckets {
        out.extend_from_slice(input);
        return;
    }

    let len = input.len();
    out.extend((0..buckets).map(|i| {
        let start = i * len / buckets;
        let end = (((i + 1) * len).div_ceil(buckets)).min(len);
        let end = end.max(start + 1).min(len);
        let slice = &input[start..end];
        slice.iter().sum::<f32>() / slice.len() as f32
    }));
}

/// Resamples `input` onto exactly `buckets` values, keeping peaks.
///
/// When downsampling each bucket takes the block maximum of its
/// proportional range; when upsampling values are linearly interpolated
/// between the two nearest samples. `floor` substitutes for buckets that
/// map to no input at all (empty input).
pub fn resample_max(input: &[f32], buckets: usize, floor: Option<f32>) -> Vec<f32> {
    let mut out = Vec::with_capacity(buckets);
    resample_max_into(input, buckets, floor, &mut out);
    out
}

/// [`resample_max`] writing into a reused buffer to avoid per-frame
/// allocation.
pub fn resample_max_into(input: &[f32], buckets: usize, floor: Option<f32>, out: &mut Vec<f32>) {
    out.clear();
    if buckets == 0 {
        return;
    }
    if input.is_empty() {
        out.resize(buckets, floor.unwrap_or(0.0));
        return;
    }

    let len = input.len();
    if len >= buckets {
        // Block max over proportional ranges.
        out.extend((0..buckets).map(|i| {
            let start = i * len / buckets;
            let end = (((i + 1) * len).div_ceil(buckets)).min(len);
            let end = end.max(start + 1).min(len);
            input[start..end].iter().copied().fold(f32::MIN, f32::max)
        }));
    } else {
        // Upsample by interpolating between the nearest two samples.
        out.extend((0..buckets).map(|i| {
            if buckets == 1 {
                return input[0];
            }
            let pos = i as f32 / (buckets - 1) as f32 * (len - 1) as f32;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(len - 1);
            let t = pos - lo as f32;
            input[lo] * (1.0 - t) + input[hi] * t
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-6, "{x} != {y}");
        }
    }

    #[test]
    fn same_length_is_identity() {
        let input = vec![0.1, 0.5, 0.9, 0.3, 0.0, 0.7];
        assert_close(&resample_avg(&input, 6), &input);
        assert_close(&resample_max(&input, 6, None), &input);
    }

    #[test]
    fn avg_downsample_averages_ranges() {
        let input = vec![0.0, 1.0, 0.2, 0.4];
        let out = resample_avg(&input, 2);
        assert_close(&out, &[0.5, 0.3]);
    }

    #[test]
    fn max_downsample_keeps_peaks() {
        let input = vec![0.0, 1.0, 0.2, 0.4, 0.05, 0.9];
        let out = resample_max(&input, 2, None);
        assert_close(&out, &[1.0, 0.9]);
    }

    #[test]
    fn max_upsample_interpolates() {
        let input = vec![0.0, 1.0];
        let out = resample_max(&input, 5, None);
        assert_close(&out, &[0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn empty_input_uses_floor() {
        let out = resample_max(&[], 3, Some(0.05));
        assert_close(&out, &[0.05, 0.05, 0.05]);
        let out = resample_avg(&[], 3);
        assert_close(&out, &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_buckets_yields_empty() {
        assert!(resample_avg(&[0.5], 0).is_empty());
        assert!(resample_max(&[0.5], 0, None).is_empty());
    }

    #[test]
    fn avg_upsample_repeats_nearest() {
        let input = vec![0.2, 0.8];
        let out = resample_avg(&input, 4);
        assert_close(&out, &[0.2, 0.2, 0.8, 0.8]);
    }
}
