// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use crate::adaptation::did_increase_resolution;
use crate::adaptation::resource_manager::single_active_layer_pixels;
use crate::adaptation::AdaptationConstraint;
use crate::adaptation::VideoSourceRestrictions;
use crate::adaptation::VideoStreamInputState;
use crate::encoder::EncoderSettings;
use crate::encoder::VideoEncoderConfig;
use crate::utils::SequenceChecker;

/// Returns true if `encoder_config` has several layers and more than one of them is active.
///
/// A configuration where only the lowest layer is active cannot be told apart from singlecast, so
/// it is treated as simulcast as well.
fn is_simulcast(encoder_config: &VideoEncoderConfig) -> bool {
    let layers = encoder_config.simulcast_layers();
    let is_lowest_layer_active = layers.first().map_or(false, |layer| layer.active);

    layers.len() > 1 && (encoder_config.num_active_layers() > 1 || is_lowest_layer_active)
}

/// Blocks resolution increases when the encoder's target bitrate is below the minimum start
/// bitrate the encoder publishes for the next resolution tier.
///
/// Every case where the decision cannot be made (no encoder settings, unknown target bitrate,
/// simulcast, no single active layer, no limits for a larger resolution) allows the increase.
///
/// The constraint must be used from a single thread, which is bound on first use.
#[derive(Debug, Default)]
pub struct BitrateConstraint {
    encoder_settings: Option<EncoderSettings>,
    encoder_target_bitrate_bps: Option<u32>,
    sequence_checker: SequenceChecker,
}

impl BitrateConstraint {
    pub fn new() -> Self {
        Self {
            encoder_settings: None,
            encoder_target_bitrate_bps: None,
            sequence_checker: SequenceChecker::new(),
        }
    }

    /// Replaces the encoder settings. `None` means no encoder is configured.
    pub fn on_encoder_settings_updated(&mut self, encoder_settings: Option<EncoderSettings>) {
        self.sequence_checker.check_run_on();
        self.encoder_settings = encoder_settings;
    }

    /// Replaces the target bitrate. Both `None` and zero mean the bitrate is unknown.
    pub fn on_encoder_target_bitrate_updated(&mut self, encoder_target_bitrate_bps: Option<u32>) {
        self.sequence_checker.check_run_on();
        self.encoder_target_bitrate_bps = encoder_target_bitrate_bps;
    }

    pub fn encoder_settings(&self) -> Option<&EncoderSettings> {
        self.encoder_settings.as_ref()
    }

    /// The target bitrate as it was last pushed, zero included.
    pub fn encoder_target_bitrate_bps(&self) -> Option<u32> {
        self.encoder_target_bitrate_bps
    }

    /// The target bitrate, or `None` if it is unknown.
    fn usable_target_bitrate_bps(&self) -> Option<u32> {
        self.encoder_target_bitrate_bps.filter(|&bitrate_bps| bitrate_bps != 0)
    }
}

impl AdaptationConstraint for BitrateConstraint {
    fn name(&self) -> &str {
        "BitrateConstraint"
    }

    fn is_adaptation_up_allowed(
        &self,
        _input_state: &VideoStreamInputState,
        restrictions_before: &VideoSourceRestrictions,
        restrictions_after: &VideoSourceRestrictions,
    ) -> bool {
        self.sequence_checker.check_run_on();

        if !did_increase_resolution(restrictions_before, restrictions_after) {
            log::trace!("Resolution not increased, allowing {restrictions_after}");
            return true;
        }

        let Some(encoder_settings) = &self.encoder_settings else {
            log::trace!("No encoder settings, allowing resolution increase");
            return true;
        };

        let Some(bitrate_bps) = self.usable_target_bitrate_bps() else {
            log::trace!("Target bitrate unknown, allowing resolution increase");
            return true;
        };

        if is_simulcast(encoder_settings.encoder_config()) {
            // Resolution bitrate limits only apply to singlecast.
            log::trace!("Simulcast configuration, allowing resolution increase");
            return true;
        }

        let Some(current_frame_size_px) = single_active_layer_pixels(encoder_settings.video_codec())
        else {
            log::trace!("No single active layer, allowing resolution increase");
            return true;
        };

        let Some(bitrate_limits) = encoder_settings
            .encoder_info()
            .bitrate_limits_above_resolution(current_frame_size_px)
        else {
            log::trace!(
                "No bitrate limits above {current_frame_size_px} pixels, allowing resolution increase"
            );
            return true;
        };

        debug_assert!(bitrate_limits.frame_size_pixels > current_frame_size_px);

        let allowed = bitrate_bps >= bitrate_limits.min_start_bitrate_bps;
        if allowed {
            log::trace!(
                "Target bitrate {bitrate_bps} bps reaches {} bps required for {} pixels",
                bitrate_limits.min_start_bitrate_bps,
                bitrate_limits.frame_size_pixels
            );
        } else {
            log::debug!(
                "Blocking resolution increase from {current_frame_size_px} pixels: target bitrate {bitrate_bps} bps is below {} bps required for {} pixels",
                bitrate_limits.min_start_bitrate_bps,
                bitrate_limits.frame_size_pixels
            );
        }

        allowed
    }
}
