/// Sample layout of a [`PixelMatrix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channels {
    /// One luminance byte per pixel
    Luma,
    /// Interleaved R, G, B bytes per pixel
    Rgb,
}

impl Channels {
    /// Bytes per pixel for this layout
    pub fn stride(self) -> usize {
        match self {
            Channels::Luma => 1,
            Channels::Rgb => 3,
        }
    }
}

/// Owned 8-bit image buffer with a non-zero extent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMatrix {
    width: usize,
    height: usize,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelMatrix {
    /// Create a zero-filled matrix. Returns `None` for a zero-area extent.
    pub fn new(width: usize, height: usize, channels: Channels) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let len = width.checked_mul(height)?.checked_mul(channels.stride())?;
        Some(Self {
            width,
            height,
            channels,
            data: vec![0; len],
        })
    }

    /// Wrap an existing buffer. Returns `None` if the extent is empty or the
    /// buffer length does not match `width * height * stride`.
    pub fn from_raw(width: usize, height: usize, channels: Channels, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let expected = width.checked_mul(height)?.checked_mul(channels.stride())?;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Luma matrix with this matrix's extent. `data` must hold exactly one
    /// byte per pixel.
    pub(crate) fn luma_with(&self, data: Vec<u8>) -> PixelMatrix {
        debug_assert_eq!(data.len(), self.pixel_count());
        PixelMatrix {
            width: self.width,
            height: self.height,
            channels: Channels::Luma,
            data,
        }
    }

    /// Build a luminance matrix from a per-pixel function
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Option<Self>
    where
        F: FnMut(usize, usize) -> u8,
    {
        let mut matrix = Self::new(width, height, Channels::Luma)?;
        for y in 0..height {
            for x in 0..width {
                matrix.data[y * width + x] = f(x, y);
            }
        }
        Some(matrix)
    }

    /// Get matrix width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get matrix height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the sample layout
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of pixels (not bytes)
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Luminance at (x, y); RGB pixels use the same weights as grayscale
    /// conversion. Out-of-range coordinates read as 0.
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let idx = (y * self.width + x) * self.channels.stride();
        match self.channels {
            Channels::Luma => self.data[idx],
            Channels::Rgb => crate::utils::grayscale::luminance(
                self.data[idx],
                self.data[idx + 1],
                self.data[idx + 2],
            ),
        }
    }

    /// Raw bytes of pixel (x, y), `stride()` long. Empty when out of range.
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        if x >= self.width || y >= self.height {
            return &[];
        }
        let stride = self.channels.stride();
        let idx = (y * self.width + x) * stride;
        &self.data[idx..idx + stride]
    }

    /// Overwrite pixel (x, y). Ignored when out of range or when `value`
    /// has the wrong length.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: &[u8]) {
        let stride = self.channels.stride();
        if x >= self.width || y >= self.height || value.len() != stride {
            return;
        }
        let idx = (y * self.width + x) * stride;
        self.data[idx..idx + stride].copy_from_slice(value);
    }

    /// Row-major sample bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable row-major sample bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the matrix and return its buffer
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}
