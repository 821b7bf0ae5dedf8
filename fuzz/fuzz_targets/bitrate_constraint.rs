#![no_main]

use libfuzzer_sys::fuzz_target;
use video_adaptation::adaptation::bitrate_constraint::BitrateConstraint;
use video_adaptation::adaptation::did_increase_resolution;
use video_adaptation::adaptation::AdaptationConstraint;
use video_adaptation::adaptation::VideoSourceRestrictions;
use video_adaptation::adaptation::VideoStreamInputState;
use video_adaptation::encoder::EncoderInfo;
use video_adaptation::encoder::EncoderSettings;
use video_adaptation::encoder::ResolutionBitrateLimits;
use video_adaptation::encoder::VideoCodec;
use video_adaptation::encoder::VideoEncoderConfig;
use video_adaptation::encoder::VideoStream;
use video_adaptation::Resolution;
use video_adaptation::VideoCodecType;

/// Hands out little endian integers from the fuzzer input, zero once it is exhausted.
struct Input<'a>(&'a [u8]);

impl Input<'_> {
    fn u8(&mut self) -> u8 {
        match self.0.split_first() {
            Some((&byte, rest)) => {
                self.0 = rest;
                byte
            }
            None => 0,
        }
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes([self.u8(), self.u8()])
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes([self.u8(), self.u8(), self.u8(), self.u8()])
    }

    fn opt_u32(&mut self) -> Option<u32> {
        match self.u8() & 1 {
            0 => None,
            _ => Some(self.u32()),
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut input = Input(data);

    let codec_type = match input.u8() % 4 {
        0 => VideoCodecType::VP8,
        1 => VideoCodecType::VP9,
        2 => VideoCodecType::AV1,
        _ => VideoCodecType::H264,
    };

    let layers = (0..input.u8() % 4)
        .map(|_| {
            let resolution = Resolution::from((u32::from(input.u16()), u32::from(input.u16())));
            VideoStream::new(resolution, input.u8() & 1 == 1)
        })
        .collect();
    let Ok(config) = VideoEncoderConfig::new(codec_type, layers) else {
        return;
    };

    let limits = (0..input.u8() % 6)
        .map(|_| ResolutionBitrateLimits::new(input.u32(), input.u32(), input.u32(), input.u32()))
        .collect();
    let info = EncoderInfo::new("fuzz", limits).unwrap_or_default();

    let codec = VideoCodec::from_encoder_config(&config);
    let settings = EncoderSettings::new(info, config, codec);

    let mut constraint = BitrateConstraint::new();
    constraint.on_encoder_settings_updated(Some(settings));
    constraint.on_encoder_target_bitrate_updated(input.opt_u32());

    let before = VideoSourceRestrictions::new(input.opt_u32(), None, None);
    let after = VideoSourceRestrictions::new(input.opt_u32(), None, None);

    let allowed =
        constraint.is_adaptation_up_allowed(&VideoStreamInputState::default(), &before, &after);
    if !did_increase_resolution(&before, &after) {
        assert!(allowed);
    }
});
