use burn::{
    config::Config,
    module::Module,
    nn::{
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
        Relu,
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
    },
    tensor::{Tensor, activation::sigmoid, backend::Backend},
};

use crate::emotion::EMOTION_COUNT;

/// Architecture hyperparameters for [`EmotionNet`].
#[derive(Config, Debug)]
pub struct EmotionNetConfig {
    /// Output channels of each conv block.
    #[config(default = "[16, 32, 64, 128]")]
    pub channels: [usize; 4],
    #[config(default = 64)]
    pub hidden: usize,
    #[config(default = 8)]
    pub outputs: usize,
    #[config(default = 0.3)]
    pub dropout: f64,
}

impl EmotionNetConfig {
    pub fn emotion() -> Self {
        Self::new().with_outputs(EMOTION_COUNT)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> EmotionNet<B> {
        let mut blocks = Vec::with_capacity(self.channels.len());
        let mut in_channels = 1;
        for &out_channels in &self.channels {
            blocks.push(ConvBlock::new(in_channels, out_channels, device));
            in_channels = out_channels;
        }
        EmotionNet {
            blocks,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            fc1: LinearConfig::new(in_channels, self.hidden).init(device),
            activation: Relu::new(),
            dropout: DropoutConfig::new(self.dropout).init(),
            fc2: LinearConfig::new(self.hidden, self.outputs).init(device),
        }
    }
}

/// 3x3 conv, batch norm, ReLU, then a 2x2 max pool.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv: Conv2d<B>,
    norm: BatchNorm<B>,
    activation: Relu,
    pool: MaxPool2d,
}

impl<B: Backend> ConvBlock<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        Self {
            conv: Conv2dConfig::new([in_channels, out_channels], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            norm: BatchNormConfig::new(out_channels).init(device),
            activation: Relu::new(),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.norm.forward(x);
        let x = self.activation.forward(x);
        self.pool.forward(x)
    }
}

/// CNN regressor from a `(batch, 1, freq, time)` spectrogram to per-emotion
/// scores in `[0, 1]`.
#[derive(Module, Debug)]
pub struct EmotionNet<B: Backend> {
    blocks: Vec<ConvBlock<B>>,
    pool: AdaptiveAvgPool2d,
    fc1: Linear<B>,
    activation: Relu,
    dropout: Dropout,
    fc2: Linear<B>,
}

impl<B: Backend> EmotionNet<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = input;
        for block in &self.blocks {
            x = block.forward(x);
        }
        let x = self.pool.forward(x);
        let [batch, channels, _, _] = x.dims();
        let x = x.reshape([batch, channels]);
        let x = self.fc1.forward(x);
        let x = self.activation.forward(x);
        let x = self.dropout.forward(x);
        sigmoid(self.fc2.forward(x))
    }
}
