//! Adapts spectrograms to the `(batch, channel, frequency, time)` layout the
//! network consumes.

use ndarray::{Array4, ArrayD, Axis, Ix4};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("unsupported spectrogram rank {rank} (shape {shape:?}); expected 2, 3 or 4")]
    UnsupportedRank { rank: usize, shape: Vec<usize> },
    #[error("expected batch 1 and channel 1, got shape {0:?}")]
    UnexpectedLayout(Vec<usize>),
}

/// Lift a 2-D `(F, T)`, 3-D `(C, F, T)` or 4-D array to `(1, 1, F, T)`.
pub fn to_model_input(array: ArrayD<f32>) -> Result<Array4<f32>, ShapeError> {
    let shape = array.shape().to_vec();
    let lifted = match array.ndim() {
        2 => array.insert_axis(Axis(0)).insert_axis(Axis(0)),
        3 => array.insert_axis(Axis(0)),
        4 => array,
        rank => return Err(ShapeError::UnsupportedRank { rank, shape }),
    };
    let lifted = lifted
        .into_dimensionality::<Ix4>()
        .map_err(|_| ShapeError::UnexpectedLayout(shape.clone()))?;
    let (batch, channels, _, _) = lifted.dim();
    if batch != 1 || channels != 1 {
        return Err(ShapeError::UnexpectedLayout(lifted.shape().to_vec()));
    }
    Ok(lifted)
}
