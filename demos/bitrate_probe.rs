// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! bitrate_probe, asks the bitrate constraint whether a stream may move from its current
//! resolution to a larger one at a given target bitrate.

use anyhow::Context;
use argh::FromArgs;

use video_adaptation::adaptation::bitrate_constraint::BitrateConstraint;
use video_adaptation::adaptation::AdaptationConstraint;
use video_adaptation::adaptation::VideoSourceRestrictions;
use video_adaptation::adaptation::VideoStreamInputState;
use video_adaptation::encoder::EncoderInfo;
use video_adaptation::encoder::EncoderSettings;
use video_adaptation::encoder::VideoCodec;
use video_adaptation::encoder::VideoEncoderConfig;
use video_adaptation::encoder::VideoStream;
use video_adaptation::Resolution;
use video_adaptation::VideoCodecType;

/// Checks a resolution increase against the bitrate constraint
#[derive(Debug, FromArgs)]
struct Args {
    /// codec
    #[argh(option, default = "VideoCodecType::VP8")]
    codec: VideoCodecType,

    /// current frames width
    #[argh(option, default = "640")]
    width: u32,

    /// current frames height
    #[argh(option, default = "360")]
    height: u32,

    /// requested frames width, unrestricted if not given
    #[argh(option)]
    target_width: Option<u32>,

    /// requested frames height, unrestricted if not given
    #[argh(option)]
    target_height: Option<u32>,

    /// encoder target bitrate in bits per second, unknown if not given
    #[argh(option)]
    bitrate: Option<u32>,

    /// number of simulcast layers, the top one being the current resolution
    #[argh(option, default = "1")]
    layers: u32,

    /// index of the only active layer, all layers are active if not given
    #[argh(option)]
    active_layer: Option<u32>,
}

/// Builds `count` layers halving the resolution at each step down from `top`.
fn simulcast_layers(
    top: Resolution,
    count: u32,
    active_layer: Option<u32>,
) -> anyhow::Result<Vec<VideoStream>> {
    (0..count)
        .map(|index| {
            let shift = count - 1 - index;
            let (Some(width), Some(height)) =
                (top.width.checked_shr(shift), top.height.checked_shr(shift))
            else {
                anyhow::bail!("too many layers: {count}");
            };
            let active = active_layer.map_or(true, |active| active == index);
            Ok(VideoStream::new(Resolution::from((width, height)), active))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Args = argh::from_env();

    let current = Resolution::from((args.width, args.height));
    let config = VideoEncoderConfig::new(
        args.codec,
        simulcast_layers(current, args.layers.max(1), args.active_layer)?,
    )
    .context("invalid encoder configuration")?;
    let codec = VideoCodec::from_encoder_config(&config);
    let info = EncoderInfo::with_default_limits("default", args.codec);

    for limits in info.resolution_bitrate_limits() {
        log::debug!(
            "{} pixels: start at {} bps",
            limits.frame_size_pixels,
            limits.min_start_bitrate_bps
        );
    }

    let settings = EncoderSettings::new(info, config, codec);
    let input_state = VideoStreamInputState::from_encoder_settings(&settings);

    let mut constraint = BitrateConstraint::new();
    constraint.on_encoder_settings_updated(Some(settings));
    constraint.on_encoder_target_bitrate_updated(args.bitrate);

    let before = VideoSourceRestrictions::with_max_pixels(current.get_area());
    let after = match (args.target_width, args.target_height) {
        (Some(width), Some(height)) => {
            VideoSourceRestrictions::with_max_pixels(Resolution::from((width, height)).get_area())
        }
        (None, None) => VideoSourceRestrictions::default(),
        _ => anyhow::bail!("--target-width and --target-height must be given together"),
    };

    let allowed = constraint.is_adaptation_up_allowed(&input_state, &before, &after);
    println!(
        "{}: {before} -> {after}: {}",
        constraint.name(),
        if allowed { "allowed" } else { "blocked" }
    );

    Ok(())
}
