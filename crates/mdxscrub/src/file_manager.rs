use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

// Warn about large files (>10MB)
const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Reads document trees from disk or stdin and writes the results back.
#[derive(Debug, Default)]
pub struct FileManager {
    pub input_path: Option<PathBuf>,
}

impl FileManager {
    pub fn new() -> Self {
        Self { input_path: None }
    }

    pub fn input_name(&self) -> String {
        self.input_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<stdin>".to_string())
    }

    pub async fn read_input(&mut self, path: Option<&Path>) -> Result<String> {
        match path {
            Some(path) => self.open_file(path.to_path_buf()).await,
            None => {
                let mut content = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut content)
                    .await
                    .map_err(|e| anyhow::anyhow!("標準入力の読み込みに失敗しました: {}", e))?;
                self.input_path = None;
                Ok(content)
            }
        }
    }

    pub async fn open_file(&mut self, path: PathBuf) -> Result<String> {
        // Validate file path
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "ファイルが見つかりません: {}",
                path.display()
            ));
        }

        if !path.is_file() {
            return Err(anyhow::anyhow!(
                "指定されたパスはファイルではありません: {}",
                path.display()
            ));
        }

        match fs::metadata(&path).await {
            Ok(metadata) => {
                if metadata.len() > LARGE_FILE_THRESHOLD {
                    log::warn!(
                        "Large file detected ({} bytes): {}",
                        metadata.len(),
                        path.display()
                    );
                }
            }
            Err(e) => {
                log::warn!("Failed to get file metadata: {}", e);
            }
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            anyhow::anyhow!(
                "ファイルの読み込みに失敗しました: {} - {}",
                path.display(),
                e
            )
        })?;

        if content.contains('\0') {
            return Err(anyhow::anyhow!(
                "ファイルがバイナリ形式の可能性があります: {}",
                path.display()
            ));
        }

        log::info!("Read {} bytes from {}", content.len(), path.display());
        self.input_path = Some(path);
        Ok(content)
    }

    /// Writes `content` to `path`, or to stdout when no path is given.
    pub async fn write_output(&self, path: Option<&Path>, content: &str) -> Result<()> {
        match path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(path, content).await.map_err(|e| {
                    anyhow::anyhow!(
                        "ファイルの書き込みに失敗しました: {} - {}",
                        path.display(),
                        e
                    )
                })?;
                log::info!("Wrote {} bytes to {}", content.len(), path.display());
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(content.as_bytes()).await?;
                if !content.ends_with('\n') {
                    stdout.write_all(b"\n").await?;
                }
                stdout.flush().await?;
            }
        }
        Ok(())
    }
}
