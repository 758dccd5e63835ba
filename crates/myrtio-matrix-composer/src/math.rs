/// Scale an 8-bit value onto `0..=max` with rounding
///
/// Uses integer math for efficiency on the refresh path.
#[inline]
pub fn scale_to(value: u8, max: u32) -> u32 {
    (u32::from(value) * max + 127) / 255
}

/// Scale a duration in nanoseconds by a brightness percentage (0-100)
#[inline]
pub fn scale_percent(nanoseconds: u64, percent: u8) -> u64 {
    nanoseconds * u64::from(percent) / 100
}

/// Reverse the lowest `bits` bits of `value`
///
/// Used as an ordered dithering threshold: walking `k` through `0..2^bits`
/// visits every threshold exactly once while spreading neighbours apart.
#[inline]
pub fn bit_reverse(value: u32, bits: u8) -> u32 {
    if bits == 0 {
        return 0;
    }
    value.reverse_bits() >> (32 - u32::from(bits))
}

/// CIE 1931 luminance for a lightness of `value / 255`
///
/// # Returns
/// * relative luminance in `0.0..=1.0`
#[allow(clippy::cast_precision_loss)]
pub fn cie1931(value: u8) -> f32 {
    let lightness = f32::from(value) * 100.0 / 255.0;
    if lightness <= 8.0 {
        lightness / 902.3
    } else {
        let t = (lightness + 16.0) / 116.0;
        t * t * t
    }
}
