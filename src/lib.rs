// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Constraints checked before a real-time video encoder is allowed to raise its output quality.
//!
//! The adaptation engine proposes changes to the [`adaptation::VideoSourceRestrictions`] applied
//! to a video source. Before a change that raises the resolution is applied it is run through the
//! [`adaptation::AdaptationConstraint`]s registered with the engine. This crate provides the
//! [`adaptation::bitrate_constraint::BitrateConstraint`], which refuses a resolution increase when
//! the encoder's target bitrate is below the minimum start bitrate published by the encoder for
//! the next resolution tier.

pub mod adaptation;
pub mod encoder;
pub mod utils;

use std::str::FromStr;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Returns the number of pixels of a frame of this resolution.
    pub fn get_area(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }
}

impl From<(u32, u32)> for Resolution {
    fn from(value: (u32, u32)) -> Self {
        Self {
            width: value.0,
            height: value.1,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VideoCodecType {
    Generic,
    #[default]
    VP8,
    VP9,
    AV1,
    H264,
    H265,
}

impl FromStr for VideoCodecType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" | "Generic" => Ok(VideoCodecType::Generic),
            "vp8" | "VP8" => Ok(VideoCodecType::VP8),
            "vp9" | "VP9" => Ok(VideoCodecType::VP9),
            "av1" | "AV1" => Ok(VideoCodecType::AV1),
            "h264" | "H264" => Ok(VideoCodecType::H264),
            "h265" | "H265" => Ok(VideoCodecType::H265),
            _ => Err("unrecognized codec. Valid values: generic, vp8, vp9, av1, h264, h265"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_area() {
        assert_eq!(Resolution::from((640, 360)).get_area(), 230_400);
        assert_eq!(Resolution::from((1280, 720)).get_area(), 921_600);
        assert_eq!(Resolution::default().get_area(), 0);
        assert_eq!(Resolution::from((u32::MAX, 2)).get_area(), u32::MAX);
    }

    #[test]
    fn codec_type_from_str() {
        assert_eq!("vp8".parse(), Ok(VideoCodecType::VP8));
        assert_eq!("VP9".parse(), Ok(VideoCodecType::VP9));
        assert_eq!("av1".parse(), Ok(VideoCodecType::AV1));
        assert_eq!("H264".parse(), Ok(VideoCodecType::H264));
        assert_eq!("h265".parse(), Ok(VideoCodecType::H265));
        assert_eq!("generic".parse(), Ok(VideoCodecType::Generic));
        assert!("mpeg2".parse::<VideoCodecType>().is_err());
    }
}
