use crate::models::PixelMatrix;

/// Output extent of [`scale`]: `round(width * factor) x round(height * factor)`,
/// never smaller than 1x1.
///
/// `None` when `factor` is not a positive finite number or when a buffer of
/// that extent with `stride` bytes per pixel cannot be addressed.
pub fn scaled_extent(width: usize, height: usize, factor: f64, stride: usize) -> Option<(usize, usize)> {
    if !factor.is_finite() || factor <= 0.0 {
        return None;
    }
    let side = |len: usize| {
        let v = (len as f64 * factor).round().max(1.0);
        (v < usize::MAX as f64).then_some(v as usize)
    };
    let (w, h) = (side(width)?, side(height)?);
    w.checked_mul(h)?.checked_mul(stride)?;
    Some((w, h))
}

/// Nearest-neighbour resize by `factor`.
///
/// The output has the extent given by [`scaled_extent`] and the input's
/// channel layout. Each destination pixel copies source
/// `floor(dest / factor)`; destinations whose source falls outside the
/// input stay 0. Returns `None` exactly when [`scaled_extent`] does.
pub fn scale(src: &PixelMatrix, factor: f64) -> Option<PixelMatrix> {
    let stride = src.channels().stride();
    let (new_width, new_height) = scaled_extent(src.width(), src.height(), factor, stride)?;
    let mut scaled = PixelMatrix::new(new_width, new_height, src.channels())?;

    let src_bytes = src.as_bytes();
    let src_width = src.width();

    // Column lookup is shared by every row
    let columns: Vec<Option<usize>> = (0..new_width)
        .map(|x| {
            let sx = (x as f64 / factor) as usize;
            (sx < src_width).then_some(sx)
        })
        .collect();

    let dst = scaled.as_bytes_mut();
    for y in 0..new_height {
        let sy = (y as f64 / factor) as usize;
        if sy >= src.height() {
            continue;
        }
        let src_row = sy * src_width;
        let dst_row = y * new_width;
        for (x, column) in columns.iter().enumerate() {
            let Some(sx) = column else { continue };
            let s = (src_row + sx) * stride;
            let d = (dst_row + x) * stride;
            dst[d..d + stride].copy_from_slice(&src_bytes[s..s + stride]);
        }
    }

    Some(scaled)
}
