use crate::{VertexError, VertexResult};

/// A batch of images as the pipeline passes them between nodes: a row-major
/// `[batch, height, width, channels]` array of `f32` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    batch: usize,
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f32>,
}

impl ImageTensor {
    /// Supported channel counts: grayscale, RGB, RGBA.
    pub const SUPPORTED_CHANNELS: [usize; 3] = [1, 3, 4];

    pub fn new(shape: [usize; 4], data: Vec<f32>) -> VertexResult<Self> {
        let [batch, height, width, channels] = shape;
        if batch == 0 || height == 0 || width == 0 {
            return Err(VertexError::InvalidInput(format!(
                "Image tensor dimensions must be non-zero, got {shape:?}"
            )));
        }
        if !Self::SUPPORTED_CHANNELS.contains(&channels) {
            return Err(VertexError::InvalidInput(format!(
                "Unsupported channel count {channels}, expected 1, 3 or 4"
            )));
        }
        let expected = batch * height * width * channels;
        if data.len() != expected {
            return Err(VertexError::InvalidInput(format!(
                "Image tensor of shape {shape:?} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self {
            batch,
            height,
            width,
            channels,
            data,
        })
    }

    pub fn zeros(shape: [usize; 4]) -> VertexResult<Self> {
        let len = shape.iter().product();
        Self::new(shape, vec![0.0; len])
    }

    /// A single black RGB frame.
    #[must_use]
    pub fn black(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            batch: 1,
            height,
            width,
            channels: 3,
            data: vec![0.0; height * width * 3],
        }
    }

    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        [self.batch, self.height, self.width, self.channels]
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    fn frame_len(&self) -> usize {
        self.height * self.width * self.channels
    }

    /// Values of frame `index`, `height * width * channels` long.
    #[must_use]
    pub fn frame_data(&self, index: usize) -> Option<&[f32]> {
        let len = self.frame_len();
        self.data.get(index * len..(index + 1) * len)
    }

    /// Frame `index` as its own batch of one.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<Self> {
        self.frame_data(index).map(|data| Self {
            batch: 1,
            height: self.height,
            width: self.width,
            channels: self.channels,
            data: data.to_vec(),
        })
    }

    /// Every frame of the batch, in order, each as a batch of one.
    pub fn frames(&self) -> impl Iterator<Item = Self> + '_ {
        (0..self.batch).filter_map(|index| self.frame(index))
    }

    /// Concatenate images along the batch dimension. All images must share
    /// height, width and channel count.
    pub fn stack(images: Vec<Self>) -> VertexResult<Self> {
        let mut images = images.into_iter();
        let mut stacked = images
            .next()
            .ok_or_else(|| VertexError::InvalidInput("Cannot stack zero images".to_string()))?;
        for image in images {
            if (image.height, image.width, image.channels)
                != (stacked.height, stacked.width, stacked.channels)
            {
                return Err(VertexError::InvalidInput(format!(
                    "Cannot stack image of shape {:?} onto batch of shape {:?}",
                    image.shape(),
                    stacked.shape()
                )));
            }
            stacked.batch += image.batch;
            stacked.data.extend(image.data);
        }
        Ok(stacked)
    }
}
