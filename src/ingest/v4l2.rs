#![cfg(feature = "ingest-v4l2")]

//! V4L2 camera frame source.
//!
//! Opens the device fresh on every acquisition. With minutes between
//! samples, a held stream would hand back a stale driver buffer from the
//! previous cycle; reopening guarantees the frame reflects the lot now.

use anyhow::{anyhow, Context, Result};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::MmapStream;
use v4l::video::Capture;

use super::ImageSource;
use crate::frame::Frame;

/// Frames drained after stream start so auto-exposure can settle.
const WARMUP_FRAMES: usize = 3;
const BUFFER_COUNT: u32 = 4;

/// Frame source backed by a local V4L2 capture device.
pub struct CameraSource {
    index: u32,
    width: u32,
    height: u32,
}

impl CameraSource {
    pub fn new(index: u32, width: u32, height: u32) -> Self {
        Self {
            index,
            width,
            height,
        }
    }
}

impl ImageSource for CameraSource {
    fn describe(&self) -> String {
        format!("camera:{}", self.index)
    }

    fn acquire(&mut self) -> Result<Frame> {
        let device = v4l::Device::new(self.index as usize)
            .with_context(|| format!("open v4l2 device {}", self.index))?;

        let mut format = device.format().context("read v4l2 format")?;
        format.width = self.width;
        format.height = self.height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = device
            .set_format(&format)
            .with_context(|| format!("set v4l2 format on device {}", self.index))?;
        if format.fourcc != v4l::FourCC::new(b"RGB3") {
            return Err(anyhow!(
                "device {} does not offer RGB3 output (negotiated {})",
                self.index,
                format.fourcc
            ));
        }

        let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
            .context("create v4l2 buffer stream")?;

        for _ in 0..WARMUP_FRAMES {
            stream.next().context("capture v4l2 warm-up frame")?;
        }

        let (buf, _meta) = stream.next().context("capture v4l2 frame")?;
        log::debug!(
            "CameraSource: captured {}x{} frame from device {}",
            format.width,
            format.height,
            self.index
        );
        Ok(Frame::new(buf.to_vec(), format.width, format.height))
    }
}
