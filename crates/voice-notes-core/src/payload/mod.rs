mod decode;
mod duration;

pub use {
    decode::{DecodedAudio, decode_wav},
    duration::{
        BYTES_PER_SECOND_ESTIMATE, METADATA_TIMEOUT, estimate_duration, measure_duration,
        read_duration,
    },
};
