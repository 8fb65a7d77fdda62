// ABOUTME: Media file inspection: size, MIME type and playback duration.
// ABOUTME: Duration comes from a prioritized chain of external tools whose text output is scanned.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::duration_parse::Duration;
use crate::models::FromText;
use crate::observe::Observer;

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Duration\s*:\s*(\d+:\d{2}:\d{2})").unwrap());

/// Why a single probe tool produced no duration. Never fatal.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{tool} is not available: {source}")]
    Unavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} reported no duration")]
    NoDuration { tool: String },
}

/// Which output stream of a tool carries its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One strategy in the duration chain.
pub trait ProbeTool {
    fn name(&self) -> &str;

    /// Inspects `path` and returns free-form text that may contain `Duration: H:MM:SS`.
    fn run(&self, path: &Path) -> Result<String, ProbeError>;
}

/// An external executable invoked as `<program> <args...> <path>`.
#[derive(Debug, Clone)]
pub struct CommandTool {
    program: String,
    args: Vec<String>,
    stream: OutputStream,
}

impl CommandTool {
    pub fn new(program: impl Into<String>, args: &[&str], stream: OutputStream) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            stream,
        }
    }

    pub fn ffprobe() -> Self {
        Self::new("ffprobe", &["-hide_banner"], OutputStream::Stderr)
    }

    /// ffmpeg exits non-zero without an output file but still prints the input report.
    pub fn ffmpeg() -> Self {
        Self::new("ffmpeg", &["-hide_banner", "-i"], OutputStream::Stderr)
    }

    pub fn exiftool() -> Self {
        Self::new("exiftool", &["-Duration"], OutputStream::Stdout)
    }
}

impl ProbeTool for CommandTool {
    fn name(&self) -> &str {
        &self.program
    }

    fn run(&self, path: &Path) -> Result<String, ProbeError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|source| ProbeError::Unavailable {
                tool: self.program.clone(),
                source,
            })?;

        let bytes = match self.stream {
            OutputStream::Stdout => output.stdout,
            OutputStream::Stderr => output.stderr,
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// What could be learned about a media file. Unknown fields are None.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaInfo {
    pub size: Option<u64>,
    pub mime_type: Option<String>,
    pub duration: Option<Duration>,
}

/// Inspects media files, running the duration tools in order until one succeeds.
pub struct MediaProber {
    tools: Vec<Box<dyn ProbeTool>>,
}

impl MediaProber {
    pub fn new(tools: Vec<Box<dyn ProbeTool>>) -> Self {
        Self { tools }
    }

    /// A prober that inspects size and MIME type only.
    pub fn without_tools() -> Self {
        Self { tools: Vec::new() }
    }

    /// Appends a strategy at the lowest priority.
    pub fn with_tool(mut self, tool: impl ProbeTool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Inspects `path`. Duration tools only run when `want_duration` is set.
    pub fn probe(&self, path: &Path, want_duration: bool, observer: &dyn Observer) -> MediaInfo {
        let mut info = MediaInfo::default();

        match fs::metadata(path) {
            Ok(meta) => info.size = Some(meta.len()),
            Err(_) => {
                observer.warn(&format!("media file {} does not exist", path.display()));
                return info;
            }
        }

        match detect_mime(path) {
            Ok(Some(mime)) => info.mime_type = Some(mime.to_string()),
            Ok(None) => observer.warn(&format!("unknown media type for {}", path.display())),
            Err(err) => observer.warn(&format!(
                "could not read {} to detect media type: {}",
                path.display(),
                err
            )),
        }

        if want_duration {
            info.duration = self.probe_duration(path, observer);
        }

        info
    }

    /// Runs the tool chain and returns the first duration found.
    pub fn probe_duration(&self, path: &Path, observer: &dyn Observer) -> Option<Duration> {
        for tool in &self.tools {
            observer.debug(&format!("probing {} with {}", path.display(), tool.name()));
            let found = tool.run(path).and_then(|text| {
                extract_duration(&text).ok_or_else(|| ProbeError::NoDuration {
                    tool: tool.name().to_string(),
                })
            });
            match found {
                Ok(duration) => return Some(duration),
                Err(err) => observer.warn(&err.to_string()),
            }
        }
        None
    }
}

impl Default for MediaProber {
    /// ffprobe, then ffmpeg, then exiftool.
    fn default() -> Self {
        Self::without_tools()
            .with_tool(CommandTool::ffprobe())
            .with_tool(CommandTool::ffmpeg())
            .with_tool(CommandTool::exiftool())
    }
}

impl fmt::Debug for MediaProber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaProber")
            .field("tools", &self.tool_names())
            .finish()
    }
}

/// Finds the first `Duration: H:MM:SS` in tool output. Zero durations count as not found.
pub fn extract_duration(text: &str) -> Option<Duration> {
    let caps = DURATION_RE.captures(text)?;
    let duration = Duration::from_text(caps.get(1)?.as_str()).ok()?;
    (!duration.is_empty()).then_some(duration)
}

/// Detects the MIME type from the leading bytes, falling back to the file extension.
pub fn detect_mime(path: &Path) -> io::Result<Option<&'static str>> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; 16];
    let read = file.read(&mut buffer)?;

    Ok(mime_from_magic(&buffer[..read]).or_else(|| mime_from_extension(path)))
}

fn mime_from_magic(head: &[u8]) -> Option<&'static str> {
    if head.len() < 4 {
        return None;
    }
    let mpeg_sync = matches!(&head[0..2], [0xFF, 0xFB] | [0xFF, 0xFA] | [0xFF, 0xF3]);
    if head.starts_with(b"ID3") || mpeg_sync {
        return Some("audio/mpeg");
    }
    if head.starts_with(b"fLaC") {
        return Some("audio/flac");
    }
    if head.starts_with(b"OggS") {
        return Some("audio/ogg");
    }
    if head.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WAVE" {
        return Some("audio/wav");
    }
    if head.len() >= 12 && &head[4..8] == b"ftyp" {
        // MPEG-4 brands: M4A/M4B are audio, everything else is treated as video.
        return match &head[8..11] {
            b"M4A" | b"M4B" => Some("audio/mp4"),
            b"qt " => Some("video/quicktime"),
            _ => Some("video/mp4"),
        };
    }
    None
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "mp3" => Some("audio/mpeg"),
        "m4a" | "m4b" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        "ogg" | "oga" => Some("audio/ogg"),
        "opus" => Some("audio/opus"),
        "flac" => Some("audio/flac"),
        "wav" => Some("audio/wav"),
        "mp4" | "m4v" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}
