//! Microphone capture.
//!
//! One `Recorder` wraps one live cpal input stream. The stream runs for the
//! whole session so the scope always has samples; the `armed` flag decides
//! whether samples also accumulate into the clip buffer. Stopping a take
//! flushes the buffer into a single WAV blob. A dropped recorder ends the
//! stream; re-acquisition builds a fresh one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

pub const WAV_MIME: &str = "audio/wav";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("no microphone found")]
    DeviceNotFound,
    #[error("audio capture not supported on this host")]
    Unsupported,
    #[error("audio capture failed: {0}")]
    Other(String),
}

fn classify_backend(err: cpal::BackendSpecificError) -> CaptureError {
    let description = err.description;
    let lower = description.to_lowercase();
    if lower.contains("denied") || lower.contains("permission") {
        CaptureError::PermissionDenied
    } else {
        CaptureError::Other(description)
    }
}

/// One finished take: raw container bytes plus the MIME type detected from
/// the first captured chunk.
#[derive(Debug, Clone)]
pub struct ClipBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

pub struct Recorder {
    _stream: Stream,
    armed: Arc<AtomicBool>,
    buffer: Arc<Mutex<Vec<f32>>>,
    detected_mime: Arc<Mutex<Option<String>>>,
    sample_rate: u32,
}

impl Recorder {
    /// Open the default input device and start streaming. Mono-converted
    /// sample chunks flow to `pcm_tx` continuously (for the scope) whether
    /// or not a take is armed.
    pub fn open(pcm_tx: mpsc::Sender<Vec<f32>>) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::DeviceNotFound)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device.default_input_config().map_err(|e| match e {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::DeviceNotFound,
            cpal::DefaultStreamConfigError::StreamTypeNotSupported => CaptureError::Unsupported,
            cpal::DefaultStreamConfigError::BackendSpecific { err } => classify_backend(err),
        })?;
        let config: StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;
        info!(
            "Capturing from {:?}: {} Hz, {} channel(s)",
            device_name, sample_rate, channels
        );

        let armed = Arc::new(AtomicBool::new(false));
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let detected_mime = Arc::new(Mutex::new(None));

        let armed_cb = Arc::clone(&armed);
        let buffer_cb = Arc::clone(&buffer);
        let mime_cb = Arc::clone(&detected_mime);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<f32> = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if armed_cb.load(Ordering::SeqCst) {
                        if let Ok(mut buf) = buffer_cb.lock() {
                            buf.extend_from_slice(&samples);
                        }
                        // The first chunk of a take decides the container
                        // type for the whole clip; later chunks are assumed
                        // to match.
                        if let Ok(mut mime) = mime_cb.lock() {
                            if mime.is_none() {
                                *mime = Some(WAV_MIME.to_string());
                            }
                        }
                    }

                    // Scope feed. Dropped chunks only cost a frame of wave.
                    let _ = pcm_tx.try_send(samples);
                },
                |err| error!("Input stream error: {}", err),
                None,
            )
            .map_err(|e| match e {
                cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceNotFound,
                cpal::BuildStreamError::StreamConfigNotSupported => CaptureError::Unsupported,
                cpal::BuildStreamError::BackendSpecific { err } => classify_backend(err),
                other => CaptureError::Other(other.to_string()),
            })?;

        stream.play().map_err(|e| match e {
            cpal::PlayStreamError::DeviceNotAvailable => CaptureError::DeviceNotFound,
            cpal::PlayStreamError::BackendSpecific { err } => classify_backend(err),
        })?;

        Ok(Self {
            _stream: stream,
            armed,
            buffer,
            detected_mime,
            sample_rate,
        })
    }

    /// Start accumulating the next take.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Stop accumulating and flush everything buffered into one blob.
    pub fn flush(&self) -> anyhow::Result<ClipBlob> {
        self.armed.store(false, Ordering::SeqCst);
        let samples: Vec<f32> = {
            let mut buf = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
            std::mem::take(&mut *buf)
        };
        let mime = {
            let mut mime = self.detected_mime.lock().unwrap_or_else(|p| p.into_inner());
            mime.take().unwrap_or_else(|| WAV_MIME.to_string())
        };
        let bytes = encode_wav(&samples, self.sample_rate)?;
        info!(
            "Flushed take: {} samples -> {} bytes",
            samples.len(),
            bytes.len()
        );
        Ok(ClipBlob { bytes, mime })
    }

    /// Discard the current take without producing a blob.
    pub fn abort(&self) {
        self.armed.store(false, Ordering::SeqCst);
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
        if let Ok(mut mime) = self.detected_mime.lock() {
            *mime = None;
        }
    }
}

/// Encode mono f32 samples as 16-bit PCM WAV.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer.write_sample(value)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_header_and_length() {
        let samples = vec![0.0_f32; 480];
        let bytes = encode_wav(&samples, 48_000).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte canonical header + 2 bytes per sample
        assert_eq!(bytes.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn test_encode_wav_clamps_out_of_range() {
        let bytes = encode_wav(&[2.0, -2.0], 44_100).unwrap();
        let mut reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![i16::MAX, -i16::MAX]);
    }
}
