// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use crate::encoder::CodecLayer;
use crate::encoder::VideoCodec;
use crate::VideoCodecType;

/// Returns the layers of `codec` that carry distinct resolutions: spatial layers for VP9 and for
/// AV1 with a scalability mode of several spatial layers, simulcast streams otherwise.
fn resolution_layers(codec: &VideoCodec) -> &[CodecLayer] {
    match (codec.codec_type, codec.scalability_mode) {
        (VideoCodecType::AV1, Some(mode)) if mode.num_spatial_layers() > 1 => {
            let count = mode.num_spatial_layers().min(codec.spatial_layers.len());
            &codec.spatial_layers[..count]
        }
        (VideoCodecType::VP9, _) => &codec.spatial_layers,
        _ => &codec.simulcast_streams,
    }
}

/// Returns the pixel count of the only active layer of `codec`, or `None` if no layer or more than
/// one layer is active.
pub fn single_active_layer_pixels(codec: &VideoCodec) -> Option<u32> {
    let mut active = resolution_layers(codec).iter().filter(|layer| layer.active);

    match (active.next(), active.next()) {
        (Some(layer), None) => Some(layer.resolution.get_area()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ScalabilityMode;
    use crate::Resolution;

    fn layers(active: &[bool]) -> Vec<CodecLayer> {
        [(320, 180), (640, 360), (1280, 720)]
            .into_iter()
            .zip(active)
            .map(|(res, &active)| CodecLayer::new(Resolution::from(res), active))
            .collect()
    }

    fn simulcast(codec_type: VideoCodecType, active: &[bool]) -> VideoCodec {
        VideoCodec {
            codec_type,
            simulcast_streams: layers(active),
            ..Default::default()
        }
    }

    fn svc(codec_type: VideoCodecType, mode: Option<ScalabilityMode>, active: &[bool]) -> VideoCodec {
        VideoCodec {
            codec_type,
            spatial_layers: layers(active),
            scalability_mode: mode,
            ..Default::default()
        }
    }

    #[test]
    fn simulcast_single_active() {
        let codec = simulcast(VideoCodecType::VP8, &[false, true, false]);
        assert_eq!(single_active_layer_pixels(&codec), Some(640 * 360));

        let codec = simulcast(VideoCodecType::H264, &[true]);
        assert_eq!(single_active_layer_pixels(&codec), Some(320 * 180));
    }

    #[test]
    fn simulcast_multiple_or_no_active() {
        let codec = simulcast(VideoCodecType::VP8, &[true, true, false]);
        assert_eq!(single_active_layer_pixels(&codec), None);

        let codec = simulcast(VideoCodecType::VP8, &[false, false, false]);
        assert_eq!(single_active_layer_pixels(&codec), None);

        assert_eq!(single_active_layer_pixels(&VideoCodec::default()), None);
    }

    #[test]
    fn vp9_uses_spatial_layers() {
        let codec = svc(VideoCodecType::VP9, None, &[false, false, true]);
        assert_eq!(single_active_layer_pixels(&codec), Some(1280 * 720));

        let codec = svc(VideoCodecType::VP9, None, &[true, false, true]);
        assert_eq!(single_active_layer_pixels(&codec), None);

        // Simulcast streams are ignored for VP9.
        let codec = simulcast(VideoCodecType::VP9, &[true]);
        assert_eq!(single_active_layer_pixels(&codec), None);
    }

    #[test]
    fn av1_uses_spatial_layers_of_scalability_mode() {
        let codec = svc(VideoCodecType::AV1, Some(ScalabilityMode::L2T1), &[true, false, true]);
        assert_eq!(single_active_layer_pixels(&codec), Some(320 * 180));

        let codec = svc(VideoCodecType::AV1, Some(ScalabilityMode::L3T3), &[true, false, true]);
        assert_eq!(single_active_layer_pixels(&codec), None);
    }

    #[test]
    fn av1_with_one_spatial_layer_uses_simulcast() {
        let codec = svc(VideoCodecType::AV1, Some(ScalabilityMode::L1T3), &[true]);
        assert_eq!(single_active_layer_pixels(&codec), None);

        let mut codec = svc(VideoCodecType::AV1, Some(ScalabilityMode::L1T1), &[true]);
        codec.simulcast_streams = layers(&[false, true]);
        assert_eq!(single_active_layer_pixels(&codec), Some(640 * 360));
    }

    #[test]
    fn av1_without_scalability_mode_uses_simulcast() {
        let mut codec = svc(VideoCodecType::AV1, None, &[true, true, true]);
        codec.simulcast_streams = layers(&[false, true]);

        assert_eq!(single_active_layer_pixels(&codec), Some(640 * 360));
    }
}
