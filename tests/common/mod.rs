//! 集成测试共用的宿主替身。

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use quote_viewer::image_handler::{
    ExternalOpener, HostBundle, ImageError, ImageFetcher, MemoryBlobStore, SaveHost, SaveRequest,
    SharePayload, ShareHost,
};
use tokio::sync::oneshot;

pub type Outcome = Result<Bytes, ImageError>;

pub fn jpeg(width: u32, height: u32) -> Bytes {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8])
    });
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageFormat::Jpeg)
        .expect("failed to encode test image");
    Bytes::from(cursor.into_inner())
}

/// 每次 fetch 取出一个闸门并等待测试放行。
#[derive(Default)]
pub struct GateFetcher {
    gates: Mutex<VecDeque<oneshot::Receiver<Outcome>>>,
    calls: AtomicUsize,
}

impl GateFetcher {
    /// 预先登记一个闸门，返回放行用的 sender。
    pub fn arm(&self) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().expect("gates lock").push_back(rx);
        tx
    }

    /// 预先登记一个立即放行的结果。
    pub fn push_ready(&self, outcome: Outcome) {
        let tx = self.arm();
        let _ = tx.send(outcome);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for GateFetcher {
    async fn fetch(&self, _token: i64) -> Result<Bytes, ImageError> {
        let gate = self.gates.lock().expect("gates lock").pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ImageError::Fetch("gate dropped".into()))),
            None => Err(ImageError::Fetch("no gate armed".into())),
        }
    }
}

#[derive(Default)]
pub struct CountingSaver {
    pub names: Mutex<Vec<String>>,
}

impl SaveHost for CountingSaver {
    fn save_as(&self, request: SaveRequest) -> Result<(), ImageError> {
        self.names.lock().expect("names lock").push(request.file_name);
        Ok(())
    }
}

pub struct NoNativeShare;

#[async_trait]
impl ShareHost for NoNativeShare {
    fn supports_file_share(&self) -> bool {
        false
    }

    fn can_share(&self, _payload: &SharePayload) -> bool {
        false
    }

    async fn share(&self, _payload: SharePayload) -> Result<(), ImageError> {
        Err(ImageError::ShareTier("unsupported".into()))
    }
}

#[derive(Default)]
pub struct CountingOpener {
    pub uris: Mutex<Vec<String>>,
}

impl ExternalOpener for CountingOpener {
    fn open_in_new_context(&self, uri: &str) -> Result<(), ImageError> {
        self.uris.lock().expect("uris lock").push(uri.to_string());
        Ok(())
    }
}

pub struct Fixture {
    pub blobs: Arc<MemoryBlobStore>,
    pub saver: Arc<CountingSaver>,
    pub opener: Arc<CountingOpener>,
    pub hosts: HostBundle,
}

pub fn fixture(fetcher: Arc<dyn ImageFetcher>) -> Fixture {
    let blobs = Arc::new(MemoryBlobStore::new());
    let saver = Arc::new(CountingSaver::default());
    let opener = Arc::new(CountingOpener::default());
    let hosts = HostBundle {
        fetcher,
        blobs: blobs.clone(),
        saver: saver.clone(),
        sharer: Arc::new(NoNativeShare),
        opener: opener.clone(),
    };
    Fixture {
        blobs,
        saver,
        opener,
        hosts,
    }
}
