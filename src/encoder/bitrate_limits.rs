// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use thiserror::Error;

use crate::VideoCodecType;

/// Smallest frame the encoder is expected to be scaled down to, 320x180.
pub const DEFAULT_MIN_PIXELS_PER_FRAME: u32 = 320 * 180;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BitrateLimitsError {
    #[error("limits for {frame_size_pixels} pixels have a bitrate range that is empty")]
    InvalidRange { frame_size_pixels: u32 },
    #[error("limits for {frame_size_pixels} pixels are listed more than once")]
    DuplicateResolution { frame_size_pixels: u32 },
    #[error("limits for {frame_size_pixels} pixels are lower than for a smaller resolution")]
    DecreasingLimits { frame_size_pixels: u32 },
}

pub type BitrateLimitsResult<T> = Result<T, BitrateLimitsError>;

/// Bitrates the encoder needs to produce frames of up to `frame_size_pixels` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionBitrateLimits {
    /// Size of the resolution tier in pixels
    pub frame_size_pixels: u32,
    /// Bitrate required before switching to this resolution
    pub min_start_bitrate_bps: u32,
    pub min_bitrate_bps: u32,
    pub max_bitrate_bps: u32,
}

impl ResolutionBitrateLimits {
    pub fn new(
        frame_size_pixels: u32,
        min_start_bitrate_bps: u32,
        min_bitrate_bps: u32,
        max_bitrate_bps: u32,
    ) -> Self {
        Self {
            frame_size_pixels,
            min_start_bitrate_bps,
            min_bitrate_bps,
            max_bitrate_bps,
        }
    }

    fn validate(&self) -> BitrateLimitsResult<()> {
        if self.min_bitrate_bps > self.max_bitrate_bps
            || self.min_start_bitrate_bps > self.max_bitrate_bps
        {
            return Err(BitrateLimitsError::InvalidRange {
                frame_size_pixels: self.frame_size_pixels,
            });
        }

        Ok(())
    }

    fn exceeds(&self, other: &Self) -> bool {
        self.min_start_bitrate_bps > other.min_start_bitrate_bps
            || self.min_bitrate_bps > other.min_bitrate_bps
            || self.max_bitrate_bps > other.max_bitrate_bps
    }
}

/// Resolution bitrate limits used for singlecast when the encoder does not publish its own.
pub fn default_singlecast_bitrate_limits(
    codec_type: VideoCodecType,
) -> Vec<ResolutionBitrateLimits> {
    match codec_type {
        VideoCodecType::VP9 => vec![
            ResolutionBitrateLimits::new(320 * 180, 0, 30_000, 150_000),
            ResolutionBitrateLimits::new(480 * 270, 120_000, 30_000, 300_000),
            ResolutionBitrateLimits::new(640 * 360, 190_000, 30_000, 420_000),
            ResolutionBitrateLimits::new(960 * 540, 350_000, 30_000, 1_000_000),
            ResolutionBitrateLimits::new(1280 * 720, 480_000, 30_000, 1_500_000),
        ],
        _ => vec![
            ResolutionBitrateLimits::new(320 * 180, 0, 30_000, 300_000),
            ResolutionBitrateLimits::new(480 * 270, 200_000, 30_000, 500_000),
            ResolutionBitrateLimits::new(640 * 360, 300_000, 30_000, 800_000),
            ResolutionBitrateLimits::new(960 * 540, 500_000, 30_000, 1_500_000),
            ResolutionBitrateLimits::new(1280 * 720, 900_000, 30_000, 2_500_000),
        ],
    }
}

/// Static capabilities of the encoder implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderInfo {
    pub implementation_name: String,
    /// Frames are not scaled below this many pixels
    pub min_pixels_per_frame: u32,
    /// Sorted by ascending `frame_size_pixels`
    resolution_bitrate_limits: Vec<ResolutionBitrateLimits>,
}

impl Default for EncoderInfo {
    fn default() -> Self {
        Self {
            implementation_name: String::from("unknown"),
            min_pixels_per_frame: DEFAULT_MIN_PIXELS_PER_FRAME,
            resolution_bitrate_limits: Vec::new(),
        }
    }
}

impl EncoderInfo {
    /// Creates the encoder info with the given limits table. The table may be given in any order,
    /// but the limits must not decrease as the resolution grows.
    pub fn new(
        implementation_name: impl Into<String>,
        mut resolution_bitrate_limits: Vec<ResolutionBitrateLimits>,
    ) -> BitrateLimitsResult<Self> {
        resolution_bitrate_limits.sort_by_key(|limits| limits.frame_size_pixels);

        for limits in &resolution_bitrate_limits {
            limits.validate()?;
        }

        for pair in resolution_bitrate_limits.windows(2) {
            if let [lower, higher] = pair {
                if lower.frame_size_pixels == higher.frame_size_pixels {
                    return Err(BitrateLimitsError::DuplicateResolution {
                        frame_size_pixels: higher.frame_size_pixels,
                    });
                }

                if lower.exceeds(higher) {
                    return Err(BitrateLimitsError::DecreasingLimits {
                        frame_size_pixels: higher.frame_size_pixels,
                    });
                }
            }
        }

        Ok(Self {
            implementation_name: implementation_name.into(),
            resolution_bitrate_limits,
            ..Default::default()
        })
    }

    /// Creates the encoder info using [`default_singlecast_bitrate_limits`] for `codec_type`.
    pub fn with_default_limits(
        implementation_name: impl Into<String>,
        codec_type: VideoCodecType,
    ) -> Self {
        Self {
            implementation_name: implementation_name.into(),
            resolution_bitrate_limits: default_singlecast_bitrate_limits(codec_type),
            ..Default::default()
        }
    }

    pub fn resolution_bitrate_limits(&self) -> &[ResolutionBitrateLimits] {
        &self.resolution_bitrate_limits
    }

    /// Returns the limits of the smallest tier able to hold frames of `frame_size_pixels` pixels.
    pub fn encoder_bitrate_limits_for_resolution(
        &self,
        frame_size_pixels: u32,
    ) -> Option<ResolutionBitrateLimits> {
        self.resolution_bitrate_limits
            .iter()
            .find(|limits| limits.frame_size_pixels >= frame_size_pixels)
            .copied()
    }

    /// Returns the limits of the smallest tier strictly larger than `frame_size_pixels`, i.e. the
    /// tier a stream of that size moves into when its resolution goes up.
    pub fn bitrate_limits_above_resolution(
        &self,
        frame_size_pixels: u32,
    ) -> Option<ResolutionBitrateLimits> {
        self.resolution_bitrate_limits
            .iter()
            .find(|limits| limits.frame_size_pixels > frame_size_pixels)
            .copied()
    }
}
