//! # 内存句柄存储
//!
//! 进程内的本地句柄实现：句柄形如 `blob:quote-viewer/<序号>`，负载以 `Bytes` 保存，
//! 读取只增加引用计数，不复制数据。句柄释放后不可再读。
//!
//! 同时记录分配与释放次数，便于校验“无泄漏、无重复释放”。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;

use super::ImageError;
use super::host::BlobHost;

const HANDLE_PREFIX: &str = "blob:quote-viewer/";

/// 内存句柄存储。
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, Bytes>>,
    next_id: AtomicU64,
    created: AtomicU64,
    revoked: AtomicU64,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Bytes>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            log::warn!("⚠️ 句柄存储锁已中毒，继续使用内部数据");
            poisoned.into_inner()
        })
    }

    /// 当前存活句柄数。
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    /// 当前存活句柄列表（无序）。
    #[cfg(test)]
    pub(crate) fn live_handles(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    /// 累计分配次数。
    pub fn created_count(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// 累计成功释放次数。
    pub fn revoked_count(&self) -> u64 {
        self.revoked.load(Ordering::SeqCst)
    }

}

impl BlobHost for MemoryBlobStore {
    fn create(&self, payload: Bytes, mime_type: &'static str) -> Result<String, ImageError> {
        if payload.is_empty() {
            return Err(ImageError::Blob("负载为空，无法分配句柄".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = format!("{}{}", HANDLE_PREFIX, id);
        log::debug!("📦 分配句柄 {}（{}，{} 字节）", handle, mime_type, payload.len());
        self.entries().insert(handle.clone(), payload);
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(handle)
    }

    fn read(&self, handle: &str) -> Result<Bytes, ImageError> {
        self.entries()
            .get(handle)
            .cloned()
            .ok_or_else(|| ImageError::Blob(format!("句柄不存在或已释放：{}", handle)))
    }

    fn revoke(&self, handle: &str) -> bool {
        let removed = self.entries().remove(handle).is_some();
        if removed {
            self.revoked.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_read_revoke() {
        let store = MemoryBlobStore::new();
        let handle = store
            .create(Bytes::from_static(b"\xFF\xD8\xFFdata"), "image/jpeg")
            .expect("create should succeed");

        assert!(handle.starts_with(HANDLE_PREFIX));
        assert_eq!(store.read(&handle).expect("read should succeed").as_ref(), b"\xFF\xD8\xFFdata");

        assert!(store.revoke(&handle));
        assert!(!store.revoke(&handle));
        assert!(matches!(store.read(&handle), Err(ImageError::Blob(_))));
        assert_eq!(store.created_count(), 1);
        assert_eq!(store.revoked_count(), 1);
    }

    #[test]
    fn handles_are_unique() {
        let store = MemoryBlobStore::new();
        let a = store.create(Bytes::from_static(b"a"), "image/jpeg").expect("create a");
        let b = store.create(Bytes::from_static(b"b"), "image/jpeg").expect("create b");
        assert_ne!(a, b);
        assert_eq!(store.live_count(), 2);
    }

    #[test]
    fn rejects_empty_payload() {
        let store = MemoryBlobStore::new();
        assert!(matches!(store.create(Bytes::new(), "image/jpeg"), Err(ImageError::Blob(_))));
        assert_eq!(store.created_count(), 0);
    }
}
