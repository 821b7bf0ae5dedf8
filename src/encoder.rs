// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Snapshot of the active encoder configuration as seen by the adaptation constraints.

pub mod bitrate_limits;

use std::str::FromStr;

use thiserror::Error;

pub use crate::encoder::bitrate_limits::EncoderInfo;
pub use crate::encoder::bitrate_limits::ResolutionBitrateLimits;
use crate::Resolution;
use crate::VideoCodecType;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncoderConfigError {
    #[error("encoder configuration has no layers")]
    NoLayers,
    #[error("layer {index} has an empty resolution")]
    InvalidLayerResolution { index: usize },
}

pub type EncoderConfigResult<T> = Result<T, EncoderConfigError>;

/// One simulcast or spatial layer of the [`VideoEncoderConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStream {
    pub resolution: Resolution,
    /// Whether the layer is currently being produced
    pub active: bool,
}

impl VideoStream {
    pub fn new(resolution: Resolution, active: bool) -> Self {
        Self { resolution, active }
    }
}

/// Encoder configuration requested by the application. Layers are ordered from the lowest to the
/// highest resolution and there is always at least one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEncoderConfig {
    codec_type: VideoCodecType,
    simulcast_layers: Vec<VideoStream>,
}

impl VideoEncoderConfig {
    pub fn new(
        codec_type: VideoCodecType,
        simulcast_layers: Vec<VideoStream>,
    ) -> EncoderConfigResult<Self> {
        if simulcast_layers.is_empty() {
            return Err(EncoderConfigError::NoLayers);
        }

        if let Some(index) = simulcast_layers
            .iter()
            .position(|layer| layer.resolution.get_area() == 0)
        {
            return Err(EncoderConfigError::InvalidLayerResolution { index });
        }

        Ok(Self {
            codec_type,
            simulcast_layers,
        })
    }

    /// Creates a configuration with a single active layer.
    pub fn singlecast(
        codec_type: VideoCodecType,
        resolution: Resolution,
    ) -> EncoderConfigResult<Self> {
        Self::new(codec_type, vec![VideoStream::new(resolution, true)])
    }

    pub fn codec_type(&self) -> VideoCodecType {
        self.codec_type
    }

    pub fn simulcast_layers(&self) -> &[VideoStream] {
        &self.simulcast_layers
    }

    pub fn num_active_layers(&self) -> usize {
        self.simulcast_layers.iter().filter(|layer| layer.active).count()
    }
}

/// Layer as configured on the codec itself, either a simulcast stream or a spatial layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecLayer {
    pub resolution: Resolution,
    pub active: bool,
}

impl CodecLayer {
    pub fn new(resolution: Resolution, active: bool) -> Self {
        Self { resolution, active }
    }
}

impl From<&VideoStream> for CodecLayer {
    fn from(stream: &VideoStream) -> Self {
        Self::new(stream.resolution, stream.active)
    }
}

/// Scalability structure of an SVC stream, as `L<spatial layers>T<temporal layers>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalabilityMode {
    L1T1,
    L1T2,
    L1T3,
    L2T1,
    L2T2,
    L2T3,
    L3T1,
    L3T2,
    L3T3,
}

impl ScalabilityMode {
    pub fn num_spatial_layers(&self) -> usize {
        match self {
            ScalabilityMode::L1T1 | ScalabilityMode::L1T2 | ScalabilityMode::L1T3 => 1,
            ScalabilityMode::L2T1 | ScalabilityMode::L2T2 | ScalabilityMode::L2T3 => 2,
            ScalabilityMode::L3T1 | ScalabilityMode::L3T2 | ScalabilityMode::L3T3 => 3,
        }
    }
}

impl FromStr for ScalabilityMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L1T1" => Ok(ScalabilityMode::L1T1),
            "L1T2" => Ok(ScalabilityMode::L1T2),
            "L1T3" => Ok(ScalabilityMode::L1T3),
            "L2T1" => Ok(ScalabilityMode::L2T1),
            "L2T2" => Ok(ScalabilityMode::L2T2),
            "L2T3" => Ok(ScalabilityMode::L2T3),
            "L3T1" => Ok(ScalabilityMode::L3T1),
            "L3T2" => Ok(ScalabilityMode::L3T2),
            "L3T3" => Ok(ScalabilityMode::L3T3),
            _ => Err("unrecognized scalability mode. Valid values: L1T1 to L3T3"),
        }
    }
}

/// Codec description the encoder was actually initialized with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoCodec {
    pub codec_type: VideoCodecType,
    pub resolution: Resolution,
    /// Simulcast streams, lowest resolution first
    pub simulcast_streams: Vec<CodecLayer>,
    /// Spatial layers of VP9 or AV1 SVC, lowest resolution first
    pub spatial_layers: Vec<CodecLayer>,
    /// Only meaningful for AV1
    pub scalability_mode: Option<ScalabilityMode>,
}

impl VideoCodec {
    /// Derives the codec description from the requested configuration. The configured layers
    /// become spatial layers for VP9 and simulcast streams for every other codec. The top layer
    /// gives the codec resolution.
    pub fn from_encoder_config(config: &VideoEncoderConfig) -> Self {
        let layers: Vec<CodecLayer> =
            config.simulcast_layers().iter().map(CodecLayer::from).collect();
        let resolution = layers
            .last()
            .map(|layer| layer.resolution)
            .unwrap_or_default();

        let (simulcast_streams, spatial_layers) = match config.codec_type() {
            VideoCodecType::VP9 => (Vec::new(), layers),
            _ => (layers, Vec::new()),
        };

        Self {
            codec_type: config.codec_type(),
            resolution,
            simulcast_streams,
            spatial_layers,
            scalability_mode: None,
        }
    }

    /// Same as [`VideoCodec::from_encoder_config`] but also maps the layers to spatial layers of
    /// an SVC stream. A `scalability_mode` with a single spatial layer keeps describing the
    /// stream through its simulcast streams.
    pub fn svc_from_encoder_config(
        config: &VideoEncoderConfig,
        scalability_mode: Option<ScalabilityMode>,
    ) -> Self {
        let mut codec = Self::from_encoder_config(config);
        codec.spatial_layers = config.simulcast_layers().iter().map(CodecLayer::from).collect();
        if scalability_mode.map_or(false, |mode| mode.num_spatial_layers() > 1) {
            codec.simulcast_streams.clear();
        }
        codec.scalability_mode = scalability_mode;
        codec
    }
}

/// Everything the adaptation constraints need to know about the encoder. Replaced as a whole
/// whenever the encoder is reconfigured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    encoder_info: EncoderInfo,
    encoder_config: VideoEncoderConfig,
    video_codec: VideoCodec,
}

impl EncoderSettings {
    pub fn new(
        encoder_info: EncoderInfo,
        encoder_config: VideoEncoderConfig,
        video_codec: VideoCodec,
    ) -> Self {
        Self {
            encoder_info,
            encoder_config,
            video_codec,
        }
    }

    /// Encoder capabilities, including the resolution bitrate limits
    pub fn encoder_info(&self) -> &EncoderInfo {
        &self.encoder_info
    }

    pub fn encoder_config(&self) -> &VideoEncoderConfig {
        &self.encoder_config
    }

    pub fn video_codec(&self) -> &VideoCodec {
        &self.video_codec
    }
}
