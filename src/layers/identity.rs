//! Pass-through activation.

use crate::error::Result;
use crate::layers::Layer;
use crate::matrix::Matrix;

/// Returns its input unchanged and passes gradients straight through.
///
/// Used as the activation of a [`FullyConnectedLayer`] that should stay
/// purely affine, typically the one feeding a [`SoftMaxLayer`].
///
/// [`FullyConnectedLayer`]: crate::layers::FullyConnectedLayer
/// [`SoftMaxLayer`]: crate::layers::SoftMaxLayer
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityLayer;

impl Layer for IdentityLayer {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        Ok(input.clone())
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        Ok(grad_output.clone())
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}
