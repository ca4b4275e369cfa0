//! Loading text to speak from files.
//!
//! Plain text is read directly, images go through an [`OcrEngine`], and
//! office documents are reported as unsupported rather than attempted.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::VoiceError;

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];

/// How a file will be turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    PlainText,
    Image,
}

/// Decide how to read `path` from its extension.
pub fn classify(path: &Path) -> Result<InputKind, VoiceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Ok(InputKind::PlainText)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(InputKind::Image)
    } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
        Err(VoiceError::UnsupportedFileType(format!(
            "{} documents are not supported yet; save as .txt instead",
            ext.to_ascii_uppercase()
        )))
    } else if ext.is_empty() {
        Err(VoiceError::UnsupportedFileType(format!(
            "{} has no file extension",
            path.display()
        )))
    } else {
        Err(VoiceError::UnsupportedFileType(format!(".{ext}")))
    }
}

/// Extracts text from an image.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &Path) -> Result<String, VoiceError>;
}

/// OCR through the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    program: PathBuf,
    language: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
            language: "eng".to_string(),
        }
    }
}

impl TesseractOcr {
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Tesseract language code, e.g. `eng` or `eng+fra`.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &Path) -> Result<String, VoiceError> {
        let output = Command::new(&self.program)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| VoiceError::Ocr(format!("cannot run {}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Ocr(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Turns a user-chosen file into text to speak.
#[derive(Clone, Default)]
pub struct TextLoader {
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl TextLoader {
    pub fn new(ocr: Option<Arc<dyn OcrEngine>>) -> Self {
        Self { ocr }
    }

    pub async fn load(&self, path: &Path) -> Result<String, VoiceError> {
        match classify(path)? {
            InputKind::PlainText => {
                let text = tokio::fs::read_to_string(path).await?;
                tracing::debug!(path = %path.display(), chars = text.len(), "Loaded text file");
                Ok(text)
            }
            InputKind::Image => {
                let ocr = self
                    .ocr
                    .as_ref()
                    .ok_or_else(|| VoiceError::Ocr("no OCR engine configured".into()))?;
                let text = ocr.recognize(path).await?;
                if text.trim().is_empty() {
                    return Err(VoiceError::Ocr(format!(
                        "no text found in {}",
                        path.display()
                    )));
                }
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_extension() {
        assert_eq!(classify(Path::new("notes.TXT")).unwrap(), InputKind::PlainText);
        assert_eq!(classify(Path::new("readme.md")).unwrap(), InputKind::PlainText);
        assert_eq!(classify(Path::new("scan.jpeg")).unwrap(), InputKind::Image);
        assert!(matches!(
            classify(Path::new("report.pdf")),
            Err(VoiceError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            classify(Path::new("letter.docx")),
            Err(VoiceError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            classify(Path::new("Makefile")),
            Err(VoiceError::UnsupportedFileType(_))
        ));
    }

    #[tokio::test]
    async fn reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "Once upon a time").unwrap();

        let text = TextLoader::default().load(&path).await.unwrap();
        assert_eq!(text, "Once upon a time");
    }

    #[tokio::test]
    async fn images_go_through_ocr() {
        let mut ocr = MockOcrEngine::new();
        ocr.expect_recognize()
            .withf(|p| p.ends_with("page.png"))
            .times(1)
            .returning(|_| Ok("Scanned words".to_string()));

        let loader = TextLoader::new(Some(Arc::new(ocr)));
        let text = loader.load(Path::new("/tmp/page.png")).await.unwrap();
        assert_eq!(text, "Scanned words");
    }

    #[tokio::test]
    async fn image_without_ocr_is_ocr_error() {
        let err = TextLoader::default()
            .load(Path::new("/tmp/page.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::Ocr(_)));
    }

    #[tokio::test]
    async fn blank_ocr_result_is_ocr_error() {
        let mut ocr = MockOcrEngine::new();
        ocr.expect_recognize().returning(|_| Ok("  \n".to_string()));

        let loader = TextLoader::new(Some(Arc::new(ocr)));
        assert!(matches!(
            loader.load(Path::new("blank.png")).await,
            Err(VoiceError::Ocr(_))
        ));
    }

    #[tokio::test]
    async fn pdf_is_reported_not_attempted() {
        let mut ocr = MockOcrEngine::new();
        ocr.expect_recognize().never();

        let loader = TextLoader::new(Some(Arc::new(ocr)));
        assert!(matches!(
            loader.load(Path::new("slides.pdf")).await,
            Err(VoiceError::UnsupportedFileType(_))
        ));
    }
}
