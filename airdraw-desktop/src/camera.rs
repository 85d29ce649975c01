//! Synthetic camera for headless runs.

use airdraw_app::VideoSource;
use airdraw_core::{CameraError, CameraManager, CameraProvider};
use airdraw_renderer::VideoFrame;
use async_trait::async_trait;

/// Fill color of synthetic frames: a dim room.
const ROOM: [u8; 4] = [24, 24, 32, 255];

/// An open synthetic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticStream {
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

/// Camera provider that produces flat frames of a fixed size.
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    opens: usize,
}

impl SyntheticCamera {
    /// A camera producing `width` x `height` frames.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            opens: 0,
        }
    }

    /// How often the stream has been acquired.
    #[must_use]
    pub const fn opens(&self) -> usize {
        self.opens
    }
}

impl CameraProvider for SyntheticCamera {
    type Stream = SyntheticStream;

    fn open(&mut self) -> Result<SyntheticStream, CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::NoHardware);
        }
        self.opens += 1;
        Ok(SyntheticStream {
            width: self.width,
            height: self.height,
        })
    }

    fn close(&mut self, stream: SyntheticStream) {
        let SyntheticStream { width, height } = stream;
        tracing::debug!("Synthetic camera closed ({}x{})", width, height);
    }
}

/// Video source that draws a fixed number of frames from a managed camera.
pub struct CameraSource {
    manager: CameraManager<SyntheticCamera>,
    stream: Option<SyntheticStream>,
    remaining: usize,
}

impl CameraSource {
    /// Produce `frames` frames, then report exhaustion.
    #[must_use]
    pub fn new(camera: SyntheticCamera, frames: usize) -> Self {
        Self {
            manager: CameraManager::new(camera),
            stream: None,
            remaining: frames,
        }
    }

    /// Whether the camera is currently held.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.manager.is_streaming()
    }

    fn acquire(&mut self) -> Result<SyntheticStream, CameraError> {
        if let Some(stream) = self.stream {
            return Ok(stream);
        }
        let stream = *self.manager.request_stream()?;
        self.stream = Some(stream);
        Ok(stream)
    }

    fn release(&mut self) {
        if self.stream.take().is_some() {
            self.manager.release_stream();
        }
    }
}

#[async_trait]
impl VideoSource for CameraSource {
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        if self.remaining == 0 {
            self.release();
            return Ok(None);
        }
        self.remaining -= 1;
        let stream = self.acquire()?;
        Ok(Some(VideoFrame::solid(stream.width, stream.height, ROOM)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_source_acquires_once_and_releases_at_end() {
        let mut source = CameraSource::new(SyntheticCamera::new(8, 6), 2);
        for _ in 0..2 {
            let frame = source.next_frame().await.expect("frame").expect("some");
            assert_eq!((frame.width(), frame.height()), (8, 6));
        }
        assert!(source.is_streaming());
        assert!(source.next_frame().await.expect("end").is_none());
        assert!(!source.is_streaming());
        assert_eq!(source.manager.provider_mut().opens(), 1);
    }

    #[tokio::test]
    async fn test_missing_camera_still_runs_dry() {
        let mut source = CameraSource::new(SyntheticCamera::new(0, 0), 2);
        assert_eq!(source.next_frame().await, Err(CameraError::NoHardware));
        assert_eq!(source.next_frame().await, Err(CameraError::NoHardware));
        assert_eq!(source.next_frame().await, Ok(None));
    }
}
