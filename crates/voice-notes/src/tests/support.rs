//! Note and payload builders plus scripted audio devices shared by the tests.

use crate::{category::Category, library::VoiceNote};

use std::{cell::RefCell, io::Cursor, rc::Rc};

use chrono::{DateTime, TimeZone, Utc};
use hound::{SampleFormat, WavSpec, WavWriter};
use uuid::Uuid;
use voice_notes_core::{
    CaptureConstraints, CoreResult, DeviceProvider, InputDevice, OutputDevice, OutputProvider,
    SharedTrack,
};

pub(crate) fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub(crate) fn note(title: &str, category: Category, duration: f64, created_at: DateTime<Utc>) -> VoiceNote {
    let id = Uuid::new_v4();
    VoiceNote {
        id,
        title: title.to_string(),
        category,
        duration,
        created_at,
        waveform_data: vec![0.5; 100],
        tags: Vec::new(),
        is_favorite: false,
        audio_file: format!("{}.wav", id),
    }
}

/// 16kHz mono 16-bit WAV: a quiet first half and a loud second half.
#[allow(clippy::panic)]
pub(crate) fn wav(seconds: f64) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let total = (seconds * 16_000.0) as usize;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = match WavWriter::new(&mut cursor, spec) {
            Ok(writer) => writer,
            Err(e) => panic!("writer: {e}"),
        };
        for i in 0..total {
            let sample = if i < total / 2 { 1_000i16 } else { 20_000i16 };
            if let Err(e) = writer.write_sample(sample) {
                panic!("write: {e}");
            }
        }
        if let Err(e) = writer.finalize() {
            panic!("finalize: {e}");
        }
    }
    cursor.into_inner()
}

/// Acquire/release counts of a scripted device.
#[derive(Debug, Default)]
pub(crate) struct DeviceUse {
    pub(crate) acquisitions: usize,
    pub(crate) releases: usize,
    pub(crate) open: bool,
}

impl DeviceUse {
    fn acquire(&mut self) {
        self.acquisitions += 1;
        self.open = true;
    }

    fn release(&mut self) {
        self.releases += 1;
        self.open = false;
    }
}

/// Microphone delivering a 100ms block of a quiet tone on every drain.
pub(crate) struct ScriptedMic {
    pub(crate) usage: Rc<RefCell<DeviceUse>>,
}

impl ScriptedMic {
    pub(crate) fn new() -> Self {
        Self {
            usage: Rc::new(RefCell::new(DeviceUse::default())),
        }
    }
}

impl DeviceProvider for ScriptedMic {
    type Input = ScriptedInput;

    fn acquire(&self, _constraints: &CaptureConstraints) -> CoreResult<ScriptedInput> {
        self.usage.borrow_mut().acquire();
        Ok(ScriptedInput {
            usage: Rc::clone(&self.usage),
            paused: false,
            released: false,
        })
    }
}

pub(crate) struct ScriptedInput {
    usage: Rc<RefCell<DeviceUse>>,
    paused: bool,
    released: bool,
}

impl InputDevice for ScriptedInput {
    fn sample_rate(&self) -> u32 {
        16_000
    }

    fn pause(&mut self) -> CoreResult<()> {
        self.paused = true;
        Ok(())
    }

    fn resume(&mut self) -> CoreResult<()> {
        self.paused = false;
        Ok(())
    }

    fn drain(&mut self) -> CoreResult<Vec<f32>> {
        if self.paused || self.released {
            return Ok(Vec::new());
        }
        Ok((0..1_600).map(|i| 0.2 * (i as f32 * 0.05).sin()).collect())
    }

    fn recent(&self, _window: &mut [f32]) -> usize {
        0
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.usage.borrow_mut().release();
        }
    }
}

impl Drop for ScriptedInput {
    fn drop(&mut self) {
        self.release();
    }
}

/// Speaker at 16kHz that never pulls samples on its own.
pub(crate) struct ScriptedSpeaker {
    pub(crate) usage: Rc<RefCell<DeviceUse>>,
}

impl ScriptedSpeaker {
    pub(crate) fn new() -> Self {
        Self {
            usage: Rc::new(RefCell::new(DeviceUse::default())),
        }
    }
}

impl OutputProvider for ScriptedSpeaker {
    type Output = ScriptedOutput;

    fn acquire(&self, _track: SharedTrack) -> CoreResult<ScriptedOutput> {
        self.usage.borrow_mut().acquire();
        Ok(ScriptedOutput {
            usage: Rc::clone(&self.usage),
            released: false,
        })
    }
}

pub(crate) struct ScriptedOutput {
    usage: Rc<RefCell<DeviceUse>>,
    released: bool,
}

impl OutputDevice for ScriptedOutput {
    fn sample_rate(&self) -> u32 {
        16_000
    }

    fn pause(&mut self) -> CoreResult<()> {
        Ok(())
    }

    fn resume(&mut self) -> CoreResult<()> {
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.usage.borrow_mut().release();
        }
    }
}
