// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Restrictions applied to a video source and the constraints a change of restrictions has to
//! pass before it is applied.

pub mod bitrate_constraint;
pub mod resource_manager;

use std::fmt;

use crate::adaptation::resource_manager::single_active_layer_pixels;
use crate::encoder::EncoderSettings;
use crate::VideoCodecType;

/// Limits on the frames a video source may produce. `None` means unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VideoSourceRestrictions {
    /// Frames must not have more pixels than this
    pub max_pixels_per_frame: Option<u32>,
    /// Preferred number of pixels per frame, if the source can pick its output size
    pub target_pixels_per_frame: Option<u32>,
    pub max_frame_rate: Option<f64>,
}

impl VideoSourceRestrictions {
    pub fn new(
        max_pixels_per_frame: Option<u32>,
        target_pixels_per_frame: Option<u32>,
        max_frame_rate: Option<f64>,
    ) -> Self {
        Self {
            max_pixels_per_frame,
            target_pixels_per_frame,
            max_frame_rate,
        }
    }

    /// Restrictions capping only the frame size.
    pub fn with_max_pixels(max_pixels_per_frame: u32) -> Self {
        Self {
            max_pixels_per_frame: Some(max_pixels_per_frame),
            ..Default::default()
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.max_pixels_per_frame.is_none()
            && self.target_pixels_per_frame.is_none()
            && self.max_frame_rate.is_none()
    }
}

impl fmt::Display for VideoSourceRestrictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_opt<T: fmt::Display>(f: &mut fmt::Formatter<'_>, v: &Option<T>) -> fmt::Result {
            match v {
                Some(v) => write!(f, "{v}"),
                None => write!(f, "unlimited"),
            }
        }

        write!(f, "{{max_pixels_per_frame: ")?;
        write_opt(f, &self.max_pixels_per_frame)?;
        write!(f, ", target_pixels_per_frame: ")?;
        write_opt(f, &self.target_pixels_per_frame)?;
        write!(f, ", max_frame_rate: ")?;
        write_opt(f, &self.max_frame_rate)?;
        write!(f, "}}")
    }
}

/// Whether `after` allows larger frames than `before`.
pub fn did_increase_resolution(
    before: &VideoSourceRestrictions,
    after: &VideoSourceRestrictions,
) -> bool {
    match (before.max_pixels_per_frame, after.max_pixels_per_frame) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(before), Some(after)) => after > before,
    }
}

pub fn did_decrease_resolution(
    before: &VideoSourceRestrictions,
    after: &VideoSourceRestrictions,
) -> bool {
    did_increase_resolution(after, before)
}

/// Whether `after` allows a higher frame rate than `before`.
pub fn did_increase_frame_rate(
    before: &VideoSourceRestrictions,
    after: &VideoSourceRestrictions,
) -> bool {
    match (before.max_frame_rate, after.max_frame_rate) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(before), Some(after)) => after > before,
    }
}

pub fn did_decrease_frame_rate(
    before: &VideoSourceRestrictions,
    after: &VideoSourceRestrictions,
) -> bool {
    did_increase_frame_rate(after, before)
}

/// Whether `after` is more restrictive than `before`: one of resolution and frame rate went down
/// while the other went down too or stayed the same.
pub fn did_restrictions_increase(
    before: &VideoSourceRestrictions,
    after: &VideoSourceRestrictions,
) -> bool {
    let decreased_resolution = did_decrease_resolution(before, after);
    let decreased_frame_rate = did_decrease_frame_rate(before, after);
    let same_resolution = before.max_pixels_per_frame == after.max_pixels_per_frame;
    let same_frame_rate = before.max_frame_rate == after.max_frame_rate;

    (decreased_resolution && (decreased_frame_rate || same_frame_rate))
        || (same_resolution && decreased_frame_rate)
}

/// Whether `after` is less restrictive than `before`.
pub fn did_restrictions_decrease(
    before: &VideoSourceRestrictions,
    after: &VideoSourceRestrictions,
) -> bool {
    let increased_resolution = did_increase_resolution(before, after);
    let increased_frame_rate = did_increase_frame_rate(before, after);
    let same_resolution = before.max_pixels_per_frame == after.max_pixels_per_frame;
    let same_frame_rate = before.max_frame_rate == after.max_frame_rate;

    (increased_resolution && (increased_frame_rate || same_frame_rate))
        || (same_resolution && increased_frame_rate)
}

/// What is known about the stream currently fed to the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStreamInputState {
    pub has_input: bool,
    pub frame_size_pixels: Option<u32>,
    pub frames_per_second: u32,
    pub video_codec_type: VideoCodecType,
    pub min_pixels_per_frame: u32,
    /// Pixels of the only active layer, `None` unless exactly one layer is active
    pub single_active_stream_pixels: Option<u32>,
}

impl Default for VideoStreamInputState {
    fn default() -> Self {
        Self {
            has_input: false,
            frame_size_pixels: None,
            frames_per_second: 0,
            video_codec_type: VideoCodecType::Generic,
            min_pixels_per_frame: crate::encoder::bitrate_limits::DEFAULT_MIN_PIXELS_PER_FRAME,
            single_active_stream_pixels: None,
        }
    }
}

impl VideoStreamInputState {
    /// Fills in the encoder dependent part of the input state from `settings`.
    pub fn from_encoder_settings(settings: &EncoderSettings) -> Self {
        Self {
            video_codec_type: settings.video_codec().codec_type,
            min_pixels_per_frame: settings.encoder_info().min_pixels_per_frame,
            single_active_stream_pixels: single_active_layer_pixels(settings.video_codec()),
            ..Default::default()
        }
    }

    /// Records a frame of `frame_size_pixels` pixels arriving at `frames_per_second`.
    pub fn on_input_frame(&mut self, frame_size_pixels: u32, frames_per_second: u32) {
        self.has_input = true;
        self.frame_size_pixels = Some(frame_size_pixels);
        self.frames_per_second = frames_per_second;
    }

    pub fn has_input_frame_size_and_frames_per_second(&self) -> bool {
        self.has_input && self.frame_size_pixels.is_some()
    }
}

/// A check run on every proposed relaxation of the [`VideoSourceRestrictions`].
pub trait AdaptationConstraint {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Returns false if going from `restrictions_before` to `restrictions_after` must not happen
    /// given the current `input_state`.
    fn is_adaptation_up_allowed(
        &self,
        input_state: &VideoStreamInputState,
        restrictions_before: &VideoSourceRestrictions,
        restrictions_after: &VideoSourceRestrictions,
    ) -> bool;
}
