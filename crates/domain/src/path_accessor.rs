//! # PathAccessor（ファイルアクセス）
//!
//! 添付ファイルの存在確認と読み込みを抽象化する。
//! メッセージ組み立てを実ファイルなしでテストできるよう、呼び出し側から注入する。

use std::{io, path::Path};
#[cfg(any(test, feature = "test-support"))]
use std::{collections::HashMap, path::PathBuf};

/// 添付ファイルへのアクセスを提供するトレイト
pub trait PathAccessor: Send + Sync {
    /// パスが既存の通常ファイルを指すか
    fn is_file(&self, path: &Path) -> bool;

    /// ファイルの内容を全て読み込む
    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// ローカルファイルシステムを使う実装
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPathAccessor;

impl PathAccessor for LocalPathAccessor {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// メモリ上のファイルを返すテスト用実装
///
/// `with_file` で登録したパスだけが通常ファイルとして扱われる。
/// `with_unreadable_file` で登録したパスは存在するが読み込みに失敗する。
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct InMemoryPathAccessor {
    files:      HashMap<PathBuf, Vec<u8>>,
    unreadable: Vec<PathBuf>,
}

#[cfg(any(test, feature = "test-support"))]
impl InMemoryPathAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn with_unreadable_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.push(path.into());
        self
    }
}

#[cfg(any(test, feature = "test-support"))]
impl PathAccessor for InMemoryPathAccessor {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.unreadable.iter().any(|p| p == path)
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("読み込みできません: {}", path.display()),
            )
        })
    }
}
