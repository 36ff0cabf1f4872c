pub(crate) type StraightRgba8 = [u8; 4];

/// Source-over blend of straight-alpha pixels.
///
/// `opacity` scales the source alpha and is clamped to `[0, 1]`. Color channels are the
/// alpha-weighted mix of source and destination, so a transparent destination takes the source
/// color unchanged.
pub(crate) fn over_straight(dst: StraightRgba8, src: StraightRgba8, opacity: f32) -> StraightRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let da = f32::from(dst[3]);
    let sa = f32::from(src[3]);

    let src_w = opacity * sa / 255.0;
    let dst_w = (1.0 - src_w) * da / 255.0;
    let sum = src_w + dst_w;
    if sum <= 0.0 {
        return dst;
    }
    let (src_w, dst_w) = (src_w / sum, dst_w / sum);

    let mut out = [0u8; 4];
    for i in 0..3 {
        out[i] = to_u8(f32::from(dst[i]) * dst_w + f32::from(src[i]) * src_w);
    }
    out[3] = to_u8((da + sa * opacity * (255.0 - da) / 255.0).min(255.0));
    out
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Clip a `len`-sized span placed at `offset` against `[0, bound)`.
///
/// Returns `(first_src_index, first_dst_index, count)`, or `None` when nothing overlaps.
pub(crate) fn clip_span(offset: i64, len: u32, bound: u32) -> Option<(u32, u32, u32)> {
    let start = offset.max(0);
    let end = (offset + i64::from(len)).min(i64::from(bound));
    if end <= start {
        return None;
    }
    Some((
        (start - offset) as u32,
        start as u32,
        (end - start) as u32,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
