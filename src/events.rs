use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

/// Where the bytes of a selected file come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A file picked in the upload control, before it has been read.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub source: FileSource,
}

impl SelectedFile {
    /// Builds a selection from a path, guessing the media type from its extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            media_type: media_type_for(&path).to_string(),
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            source: FileSource::Memory(bytes.into()),
        }
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

fn media_type_for(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// An upload that has been read into its encoded form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub name: String,
    pub data: Arc<[u8]>,
}

/// A drawable image produced by the loader.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub name: String,
    pub pixels: Arc<RgbaImage>,
}

impl DecodedImage {
    pub fn new(name: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            name: name.into(),
            pixels: Arc::new(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Decoded images, index-aligned with the uploads they came from.
///
/// A failed decode leaves `None` in its slot so later slots keep their index.
#[derive(Debug, Clone, Default)]
pub struct DecodedImageSet {
    slots: Vec<Option<DecodedImage>>,
}

impl DecodedImageSet {
    pub fn from_slots(slots: Vec<Option<DecodedImage>>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DecodedImage> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn slots(&self) -> &[Option<DecodedImage>] {
        &self.slots
    }

    pub fn decoded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Everything the control page can ask the coordinator to do.
#[derive(Debug, Clone)]
pub enum UiEvent {
    SelectTemplate(String),
    Upload(Vec<SelectedFile>),
    ToggleFilter { name: String, checked: bool },
    SetBlur(i32),
    SetPosterize(i32),
    SetThreshold(f32),
    ApplyFilters,
    ResetFilters,
    Export,
}

/// A line typed into interactive mode.
#[derive(Debug, Clone)]
pub enum Command {
    Ui(UiEvent),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} expects an argument")]
    MissingArgument(&'static str),
    #[error("invalid value {value:?} for {command}")]
    InvalidValue {
        command: &'static str,
        value: String,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(CommandError::Empty)?;
        let event = match head {
            "quit" | "exit" => return Ok(Command::Quit),
            "template" => UiEvent::SelectTemplate(
                words
                    .next()
                    .ok_or(CommandError::MissingArgument("template"))?
                    .to_string(),
            ),
            "upload" => {
                let files: Vec<SelectedFile> = words.map(SelectedFile::from_path).collect();
                if files.is_empty() {
                    return Err(CommandError::MissingArgument("upload"));
                }
                UiEvent::Upload(files)
            }
            "check" | "uncheck" => UiEvent::ToggleFilter {
                name: words
                    .next()
                    .ok_or(CommandError::MissingArgument("check"))?
                    .to_string(),
                checked: head == "check",
            },
            "blur" => UiEvent::SetBlur(parse_arg("blur", words.next())?),
            "posterize" => UiEvent::SetPosterize(parse_arg("posterize", words.next())?),
            "threshold" => UiEvent::SetThreshold(parse_arg("threshold", words.next())?),
            "apply" => UiEvent::ApplyFilters,
            "reset" => UiEvent::ResetFilters,
            "export" => UiEvent::Export,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Command::Ui(event))
    }
}

fn parse_arg<T: FromStr>(command: &'static str, raw: Option<&str>) -> Result<T, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument(command))?;
    raw.parse().map_err(|_| CommandError::InvalidValue {
        command,
        value: raw.to_string(),
    })
}
