//! Raw video stream input.
//!
//! Reads headerless 8-bit frames of a fixed geometry, such as the output of
//! `ffmpeg -i input.mp4 -f rawvideo -pix_fmt gray -`. Frames are consumed
//! strictly in stream order.

use super::{Camera, CameraError, CaptureConfig, Frame};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

/// Where raw frames are read from.
#[derive(Debug, Clone)]
pub enum RawSource {
    /// A file on disk.
    Path(PathBuf),
    /// Standard input.
    Stdin,
}

impl RawSource {
    /// Interprets `-` as stdin, anything else as a path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }
}

/// Frame source backed by a raw video byte stream.
pub struct RawVideoCamera {
    source: RawSource,
    reader: Option<BufReader<Box<dyn Read + Send>>>,
    config: Option<CaptureConfig>,
    sequence: u64,
}

impl RawVideoCamera {
    pub fn new(source: RawSource) -> Self {
        Self {
            source,
            reader: None,
            config: None,
            sequence: 0,
        }
    }

    /// Creates a source over an arbitrary reader (already "open").
    pub fn from_reader(reader: impl Read + Send + 'static, config: &CaptureConfig) -> Self {
        Self {
            source: RawSource::Stdin,
            reader: Some(BufReader::new(Box::new(reader))),
            config: Some(config.clone()),
            sequence: 0,
        }
    }

    /// Fills `buf`, returning how many bytes were read before end of stream.
    fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl Camera for RawVideoCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;

        let inner: Box<dyn Read + Send> = match &self.source {
            RawSource::Path(path) => {
                let file = File::open(path).map_err(|e| match e.kind() {
                    io::ErrorKind::NotFound => {
                        CameraError::DeviceNotFound(path.display().to_string())
                    }
                    _ => CameraError::OpenFailed(e.to_string()),
                })?;
                Box::new(file)
            }
            RawSource::Stdin => Box::new(io::stdin()),
        };

        self.reader = Some(BufReader::new(inner));
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!(source = ?self.source, "Raw video source opened");
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
        let reader = self.reader.as_mut().ok_or(CameraError::NotInitialized)?;

        let mut pixels = vec![0u8; config.frame_bytes()];
        let filled = Self::fill(reader, &mut pixels)
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        if filled < pixels.len() {
            if filled > 0 {
                tracing::warn!(
                    bytes = filled,
                    expected = pixels.len(),
                    "Discarding truncated trailing frame"
                );
            }
            return Err(CameraError::EndOfStream);
        }

        self.sequence += 1;
        Ok(Frame::with_channels(
            pixels,
            config.width,
            config.height,
            config.channels,
            self.sequence,
        ))
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn close(&mut self) {
        self.reader = None;
        self.config = None;
        tracing::info!("Raw video source closed");
    }
}
