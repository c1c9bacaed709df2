use std::borrow::Cow;
use std::path::Path;

use clap::ValueEnum;
use console::Style;
use hibp_range::{BatchEntry, Exposure};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Color {
    Auto,
    Always,
    Never,
}

impl Color {
    pub fn is_enabled(self) -> bool {
        match self {
            Color::Auto => console::colors_enabled(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonStatus<'a> {
    Checked(&'a Exposure),
    Unknown { status: &'static str, reason: String },
}

#[derive(Serialize)]
struct JsonLine<'a> {
    password: Cow<'a, str>,
    #[serde(flatten)]
    status: JsonStatus<'a>,
}

/// How results are presented. Built once from the command line and passed to
/// every render call.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub color: bool,
    pub format: Format,
}

impl RenderConfig {
    pub fn new(color: Color, format: Format) -> Self {
        Self { color: color.is_enabled(), format }
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.color)
    }

    /// Short status used in batch output: `Leaked N times`, `Not Leaked` or
    /// `Unknown (reason)`.
    pub fn status_text(outcome: &Result<Exposure, hibp_range::Error>) -> String {
        match outcome {
            Ok(Exposure::Found(count)) => format!("Leaked {count} times"),
            Ok(Exposure::NotFound) => "Not Leaked".to_string(),
            Err(e) => format!("Unknown ({e})"),
        }
    }

    /// Message for a single `--password` check.
    pub fn single(&self, password: &[u8], exposure: &Exposure) -> Result<String, Error> {
        if self.format == Format::Json {
            return json_line(password, JsonStatus::Checked(exposure));
        }

        Ok(match exposure {
            Exposure::Found(count) => self
                .style(Style::new().red().bold())
                .apply_to(format!(
                    "This password has been leaked {count} times. It's recommended not to use it."
                ))
                .to_string(),
            Exposure::NotFound => self
                .style(Style::new().green())
                .apply_to("The password was not found in the leaks. Good choice!")
                .to_string(),
        })
    }

    /// One line of batch output for the console.
    pub fn batch_line(&self, entry: &BatchEntry) -> Result<String, Error> {
        if self.format == Format::Json {
            let status = match &entry.outcome {
                Ok(exposure) => JsonStatus::Checked(exposure),
                Err(e) => JsonStatus::Unknown { status: "unknown", reason: e.to_string() },
            };
            return json_line(&entry.credential, status);
        }

        let style = match &entry.outcome {
            Ok(Exposure::Found(_)) => Style::new().red(),
            Ok(Exposure::NotFound) => Style::new().green(),
            Err(_) => Style::new().yellow().bold(),
        };

        Ok(format!(
            "Password: {}  Status: {}",
            String::from_utf8_lossy(&entry.credential),
            self.style(style).apply_to(Self::status_text(&entry.outcome))
        ))
    }

    /// One line of batch output for the save file. Never colored.
    pub fn save_line(&self, entry: &BatchEntry) -> Result<String, Error> {
        match self.format {
            Format::Json => Self { color: false, ..*self }.batch_line(entry),
            Format::Text => Ok(format!(
                "{}: {}",
                String::from_utf8_lossy(&entry.credential),
                Self::status_text(&entry.outcome)
            )),
        }
    }

    pub fn failure(&self, message: &str) -> String {
        self.style(Style::new().red().bold()).apply_to(message).to_string()
    }
}

fn json_line(password: &[u8], status: JsonStatus<'_>) -> Result<String, Error> {
    let line = JsonLine { password: String::from_utf8_lossy(password), status };
    Ok(serde_json::to_string(&line)?)
}

/// Append results to `path`, creating it if needed. Existing content is kept.
pub async fn append_results(
    path: &Path,
    entries: &[BatchEntry],
    render: &RenderConfig,
) -> Result<(), Error> {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&render.save_line(entry)?);
        out.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(Error::io(path))?;
    file.write_all(out.as_bytes()).await.map_err(Error::io(path))?;
    file.flush().await.map_err(Error::io(path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> RenderConfig {
        RenderConfig { color: false, format: Format::Text }
    }

    fn entry(credential: &str, outcome: Result<Exposure, hibp_range::Error>) -> BatchEntry {
        BatchEntry { credential: credential.as_bytes().to_vec(), outcome }
    }

    fn unavailable() -> hibp_range::Error {
        hibp_range::Error::LookupFailed { prefix: "5BAA6".to_string(), status: 503 }
    }

    #[test]
    fn test_single_messages() {
        let render = plain();

        assert_eq!(
            render.single(b"password", &Exposure::Found(3)).unwrap(),
            "This password has been leaked 3 times. It's recommended not to use it."
        );
        assert_eq!(
            render.single(b"x", &Exposure::NotFound).unwrap(),
            "The password was not found in the leaks. Good choice!"
        );
    }

    #[test]
    fn test_batch_lines() {
        let render = plain();

        assert_eq!(
            render.batch_line(&entry("password", Ok(Exposure::Found(9545824)))).unwrap(),
            "Password: password  Status: Leaked 9545824 times"
        );
        assert_eq!(
            render.batch_line(&entry("xK9#mP$2qL", Ok(Exposure::NotFound))).unwrap(),
            "Password: xK9#mP$2qL  Status: Not Leaked"
        );
        assert_eq!(
            render.batch_line(&entry("abc", Err(unavailable()))).unwrap(),
            "Password: abc  Status: Unknown (range lookup for prefix 5BAA6 failed with HTTP 503)"
        );
    }

    #[test]
    fn test_colored_output_has_escapes() {
        let render = RenderConfig { color: true, format: Format::Text };
        let found = entry("password", Ok(Exposure::Found(1)));

        let line = render.batch_line(&found).unwrap();
        assert!(line.contains("\u{1b}["), "{line:?}");

        let saved = render.save_line(&found).unwrap();
        assert!(!saved.contains('\u{1b}'), "{saved:?}");
    }

    #[test]
    fn test_json_lines() {
        let render = RenderConfig { color: true, format: Format::Json };

        let found: serde_json::Value =
            serde_json::from_str(&render.batch_line(&entry("pw", Ok(Exposure::Found(5)))).unwrap())
                .unwrap();
        assert_eq!(found, serde_json::json!({"password": "pw", "status": "found", "count": 5}));

        let missing: serde_json::Value =
            serde_json::from_str(&render.single(b"pw", &Exposure::NotFound).unwrap()).unwrap();
        assert_eq!(missing, serde_json::json!({"password": "pw", "status": "not_found"}));

        let unknown: serde_json::Value =
            serde_json::from_str(&render.batch_line(&entry("pw", Err(unavailable()))).unwrap())
                .unwrap();
        assert_eq!(unknown["status"], "unknown");
        assert!(unknown["reason"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_append_results_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        std::fs::write(&path, "earlier: Not Leaked\n").unwrap();

        let entries = vec![
            entry("password", Ok(Exposure::Found(2))),
            entry("other", Err(unavailable())),
        ];
        append_results(&path, &entries, &plain()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "earlier: Not Leaked\n\
             password: Leaked 2 times\n\
             other: Unknown (range lookup for prefix 5BAA6 failed with HTTP 503)\n"
        );
    }
}
