use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::env;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;

/// Forces a backend instead of auto-detection (`macos`, `wayland`, `x11`, `osc52`)
const ENV_CLIPBOARD_BACKEND: &str = "SENTILENS_CLIPBOARD_BACKEND";

/// Common terminal limit on the base64 payload of one OSC 52 write
pub const MAX_OSC52_PAYLOAD: usize = 74_994;

/// Destination for "copy improved text"; failures are never surfaced to the user
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}

// ============ System Clipboard ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardBackend {
    MacOS,   // pbcopy
    Wayland, // wl-copy
    X11,     // xclip, then xsel
    Osc52,   // terminal escape sequence on stdout
}

impl ClipboardBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipboardBackend::MacOS => "macos",
            ClipboardBackend::Wayland => "wayland",
            ClipboardBackend::X11 => "x11",
            ClipboardBackend::Osc52 => "osc52",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "macos" => Some(ClipboardBackend::MacOS),
            "wayland" => Some(ClipboardBackend::Wayland),
            "x11" => Some(ClipboardBackend::X11),
            "osc52" => Some(ClipboardBackend::Osc52),
            _ => None,
        }
    }
}

/// Writes to the host clipboard through the platform's copy tool,
/// or through the terminal when no tool is installed
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    backend: ClipboardBackend,
}

impl SystemClipboard {
    pub fn with_backend(backend: ClipboardBackend) -> Self {
        Self { backend }
    }

    /// Pick a backend: the env override, then an installed copy tool, then OSC 52
    pub fn detect() -> Self {
        let forced = env::var(ENV_CLIPBOARD_BACKEND)
            .ok()
            .and_then(|name| ClipboardBackend::from_str(&name));

        let backend = forced
            .or_else(detect_external_backend)
            .unwrap_or(ClipboardBackend::Osc52);

        Self::with_backend(backend)
    }

    pub fn backend(&self) -> ClipboardBackend {
        self.backend
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        match self.backend {
            ClipboardBackend::MacOS => run_command_with_input("pbcopy", &[], text),
            ClipboardBackend::Wayland => run_command_with_input("wl-copy", &[], text),
            ClipboardBackend::X11 => run_command_with_input("xclip", &["-selection", "clipboard"], text)
                .or_else(|_| run_command_with_input("xsel", &["--clipboard", "--input"], text)),
            ClipboardBackend::Osc52 => write_osc52(&mut std::io::stdout().lock(), text),
        }
    }
}

/// OSC 52 "set clipboard" sequence for `text`
pub fn osc52_sequence(text: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let encoded = STANDARD.encode(text.as_bytes());
    if encoded.len() > MAX_OSC52_PAYLOAD {
        return Err(format!(
            "OSC 52 payload too large ({} > {})",
            encoded.len(),
            MAX_OSC52_PAYLOAD
        )
        .into());
    }
    Ok(format!("\x1b]52;c;{}\x07", encoded))
}

fn write_osc52(writer: &mut impl Write, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let seq = osc52_sequence(text)?;
    writer.write_all(seq.as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn detect_external_backend() -> Option<ClipboardBackend> {
    if cfg!(target_os = "macos") && command_exists("pbcopy") {
        return Some(ClipboardBackend::MacOS);
    }
    if env::var_os("WAYLAND_DISPLAY").is_some() && command_exists("wl-copy") {
        return Some(ClipboardBackend::Wayland);
    }
    if env::var_os("DISPLAY").is_some() && (command_exists("xclip") || command_exists("xsel")) {
        return Some(ClipboardBackend::X11);
    }
    None
}

fn command_exists(command: &str) -> bool {
    let Some(path_var) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&path_var).any(|dir| Path::new(&dir).join(command).is_file())
}

fn run_command_with_input(cmd: &str, args: &[&str], content: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(content.as_bytes())?;
    }

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("clipboard command failed: {}", cmd).into())
    }
}

// ============ Memory Clipboard ============

/// Keeps the last copied text in memory (headless hosts, tests)
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut contents = self.contents.lock().map_err(|_| "clipboard lock poisoned")?;
        *contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_keeps_last_copy() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.contents(), None);
        clipboard.copy("first").unwrap();
        clipboard.copy("second").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("second"));
    }

    #[test]
    fn test_osc52_sequence_encodes_text() {
        assert_eq!(osc52_sequence("hello").unwrap(), "\x1b]52;c;aGVsbG8=\x07");
    }

    #[test]
    fn test_osc52_write_goes_to_writer() {
        let mut out = Vec::new();
        write_osc52(&mut out, "Thanks for waiting").unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.starts_with("\x1b]52;c;"));
        assert!(written.ends_with('\x07'));
        assert!(written.contains(&STANDARD.encode("Thanks for waiting")));
    }

    #[test]
    fn test_osc52_rejects_oversized_payload() {
        let text = "x".repeat(MAX_OSC52_PAYLOAD);
        let mut out = Vec::new();
        assert!(write_osc52(&mut out, &text).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(ClipboardBackend::from_str(" Wayland "), Some(ClipboardBackend::Wayland));
        assert_eq!(ClipboardBackend::from_str("osc52").map(|b| b.as_str()), Some("osc52"));
        assert_eq!(ClipboardBackend::from_str("clipboard.exe"), None);
        assert_eq!(
            SystemClipboard::with_backend(ClipboardBackend::X11).backend(),
            ClipboardBackend::X11
        );
    }
}
