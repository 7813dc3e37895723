//! 单元测试用的宿主替身。

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::oneshot;

use super::ImageError;
use super::host::{ExternalOpener, ImageFetcher, SaveHost, SharePayload, ShareHost};
use super::source::SaveRequest;

/// 按脚本依次返回结果，并记录收到的令牌。
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<Bytes, ImageError>>>,
    tokens: Mutex<Vec<i64>>,
}

impl ScriptedFetcher {
    pub(crate) fn new(responses: Vec<Result<Bytes, ImageError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn tokens(&self) -> Vec<i64> {
        self.tokens.lock().expect("tokens lock").clone()
    }
}

#[async_trait]
impl ImageFetcher for ScriptedFetcher {
    async fn fetch(&self, token: i64) -> Result<Bytes, ImageError> {
        self.tokens.lock().expect("tokens lock").push(token);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(ImageError::Fetch("no scripted response".into())))
    }
}

/// 每次调用挂起，直到测试通过对应的 sender 放行。
pub(crate) struct GatedFetcher {
    gates: Mutex<VecDeque<oneshot::Receiver<Result<Bytes, ImageError>>>>,
    calls: AtomicUsize,
}

impl GatedFetcher {
    pub(crate) fn new(count: usize) -> (Self, Vec<oneshot::Sender<Result<Bytes, ImageError>>>) {
        let mut senders = Vec::with_capacity(count);
        let mut receivers = VecDeque::with_capacity(count);
        for _ in 0..count {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        (
            Self {
                gates: Mutex::new(receivers),
                calls: AtomicUsize::new(0),
            },
            senders,
        )
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for GatedFetcher {
    async fn fetch(&self, _token: i64) -> Result<Bytes, ImageError> {
        let gate = self.gates.lock().expect("gates lock").pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ImageError::Fetch("gate dropped".into()))),
            None => Err(ImageError::Fetch("no gate left".into())),
        }
    }
}

/// 等待替身收到指定次数的调用。
pub(crate) async fn wait_for_calls(fetcher: &GatedFetcher, expected: usize) {
    while fetcher.calls() < expected {
        tokio::task::yield_now().await;
    }
}

#[derive(Default)]
pub(crate) struct RecordingSaver {
    pub(crate) requests: Mutex<Vec<SaveRequest>>,
    pub(crate) fail: bool,
}

impl SaveHost for RecordingSaver {
    fn save_as(&self, request: SaveRequest) -> Result<(), ImageError> {
        self.requests.lock().expect("requests lock").push(request);
        if self.fail {
            return Err(ImageError::Save("disk full".into()));
        }
        Ok(())
    }
}

pub(crate) struct RecordingSharer {
    pub(crate) supported: bool,
    pub(crate) shareable: bool,
    pub(crate) reject: bool,
    pub(crate) probed: AtomicBool,
    pub(crate) shared: Mutex<Vec<SharePayload>>,
}

impl RecordingSharer {
    pub(crate) fn new(supported: bool, shareable: bool, reject: bool) -> Self {
        Self {
            supported,
            shareable,
            reject,
            probed: AtomicBool::new(false),
            shared: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn share_calls(&self) -> usize {
        self.shared.lock().expect("shared lock").len()
    }
}

#[async_trait]
impl ShareHost for RecordingSharer {
    fn supports_file_share(&self) -> bool {
        self.supported
    }

    fn can_share(&self, _payload: &SharePayload) -> bool {
        self.probed.store(true, Ordering::SeqCst);
        self.shareable
    }

    async fn share(&self, payload: SharePayload) -> Result<(), ImageError> {
        self.shared.lock().expect("shared lock").push(payload);
        if self.reject {
            return Err(ImageError::ShareTier("AbortError: share canceled".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingOpener {
    pub(crate) opened: Mutex<Vec<String>>,
    pub(crate) fail: bool,
}

impl RecordingOpener {
    pub(crate) fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("opened lock").clone()
    }
}

impl ExternalOpener for RecordingOpener {
    fn open_in_new_context(&self, uri: &str) -> Result<(), ImageError> {
        self.opened.lock().expect("opened lock").push(uri.to_string());
        if self.fail {
            return Err(ImageError::ShareTier("no handler for scheme".into()));
        }
        Ok(())
    }
}
