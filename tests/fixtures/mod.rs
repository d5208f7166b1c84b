//! Shared test fixtures for integration and CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use emoji_canon::config::{Config, PathConfig, SetConfig};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const GRINNING: &str = "\u{1F600}";
pub const WAVE: &str = "\u{1F44B}";
pub const HEART: &str = "\u{2764}\u{FE0F}";
pub const THUMBSUP: &str = "\u{1F44D}";

/// Subdirectory of the twemoji fixture archive holding the PNGs.
pub const TWEMOJI_SUBDIR: &str = "twemoji-main/assets/72x72";

/// A scratch directory with lookup tables, charts and archives.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("out")
    }

    pub fn set_dir(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    /// Writes identity, tonable and alias tables and returns paths to them.
    pub fn write_tables(&self) -> PathConfig {
        let tables = self.path().join("tables");
        fs::create_dir_all(&tables).unwrap();

        let identities = BTreeMap::from([
            (GRINNING, "grinning"),
            (WAVE, "wave"),
            (HEART, "heart"),
            (THUMBSUP, "thumbsup"),
        ]);
        let tonable = ["wave", "thumbsup"];
        let aliases = BTreeMap::from([("thumbsup", vec!["+1"]), ("grinning", vec!["grinning_face"])]);

        write_json(&tables.join("emoji_to_name.json"), &identities);
        write_json(&tables.join("tonable_emojis.json"), &tonable);
        write_json(&tables.join("emoji_aliases.json"), &aliases);

        PathConfig {
            output_dir: self.output_dir(),
            emoji_to_name: tables.join("emoji_to_name.json"),
            tonable_emojis: Some(tables.join("tonable_emojis.json")),
            aliases: Some(tables.join("emoji_aliases.json")),
            fitzpatrick_scale: None,
            vendor_dir: self.path().join("vendor"),
        }
    }

    /// Writes the two Unicode chart documents into the vendor directory.
    ///
    /// Images are the bytes `unicode:<token>`.
    pub fn write_charts(&self) -> (PathBuf, PathBuf) {
        let vendor = self.path().join("vendor");
        fs::create_dir_all(&vendor).unwrap();

        let list = [
            ("1f600", GRINNING),
            ("1f44b", WAVE),
            ("2764_fe0f", HEART),
            ("1f44d", THUMBSUP),
        ]
        .iter()
        .map(|(token, character)| chart_row(token, character))
        .collect::<String>();

        let mut modifiers = ["1f3fb", "1f3fc", "1f3fd", "1f3fe", "1f3ff"]
            .iter()
            .map(|tone| chart_row(&format!("1f44b_{tone}"), ""))
            .collect::<String>();
        modifiers.push_str(&chart_row("1f44d_1f3fd", ""));

        let list_path = vendor.join("emoji-list.html");
        let modifiers_path = vendor.join("emoji-modifier-sequences.html");
        fs::write(&list_path, chart_document(&list)).unwrap();
        fs::write(&modifiers_path, chart_document(&modifiers)).unwrap();
        (list_path, modifiers_path)
    }

    /// Builds a zip archive from `(path, bytes)` entries.
    pub fn write_zip(&self, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = self.path().join(name);
        write_zip(&path, entries);
        path
    }

    /// Twemoji-style archive: grinning, wave, wave level 1, heart without
    /// selector and one unknown codepoint. Images are `twemoji:<file>`.
    pub fn write_twemoji_zip(&self) -> PathBuf {
        let files = ["1f600.png", "1f44b.png", "1f44b-1f3fb.png", "2764.png", "e50a.png"];
        let entries: Vec<(String, Vec<u8>)> = files
            .iter()
            .map(|file| {
                (
                    format!("{TWEMOJI_SUBDIR}/{file}"),
                    format!("twemoji:{file}").into_bytes(),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(path, bytes)| (path.as_str(), bytes.as_slice()))
            .collect();
        self.write_zip("twemoji.zip", &borrowed)
    }

    /// Config with the Unicode reference set and a local twemoji archive.
    pub fn config(&self) -> Config {
        let paths = self.write_tables();
        let (list, modifiers) = self.write_charts();
        let twemoji = self.write_twemoji_zip();

        let mut config = Config::new();
        config.paths = paths;
        config.raster.max_jobs = 2;
        config.sets = vec![
            SetConfig::unicode_html("unicode", list, modifiers),
            SetConfig::codepoints("twemoji", twemoji.to_string_lossy(), TWEMOJI_SUBDIR),
        ];
        config
    }

    /// Saves `config` to the workspace and returns its path.
    pub fn write_config(&self, config: &Config) -> PathBuf {
        let path = self.path().join("emoji-canon.toml");
        config.save(&path).unwrap();
        path
    }

    /// Relative paths of every file under `dir`, sorted.
    pub fn files_in(&self, dir: &Path) -> Vec<String> {
        list_files(dir)
    }
}

/// Writes `value` as JSON.
pub fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) {
    fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
}

/// One chart row in the Unicode consortium table layout.
pub fn chart_row(token: &str, character: &str) -> String {
    let image = STANDARD.encode(format!("unicode:{token}"));
    format!(
        "<tr><td class='rchars'>1</td>\
         <td class='code'><a href='#{token}' name='{token}'>U+{token}</a></td>\
         <td class='chars'>{character}</td>\
         <td class='andr'><img alt='{character}' class='imga' src='data:image/png;base64,{image}'></td>\
         <td class='name'>name</td></tr>\n"
    )
}

fn chart_document(rows: &str) -> String {
    format!(
        "<html><body><table>\n\
         <tr><th>№</th><th>Code</th><th>Browser</th><th>Sample</th><th>Name</th></tr>\n\
         {rows}</table></body></html>\n"
    )
}

/// Writes a zip archive with deflated entries.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Relative paths of every file under `dir`, sorted, with `/` separators.
pub fn list_files(dir: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).unwrap();
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(parts.join("/"));
            }
        }
    }

    let mut files = Vec::new();
    walk(dir, dir, &mut files);
    files.sort();
    files
}

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: &'static str,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: "200 OK",
            headers: Vec::new(),
            body,
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: "302 Found",
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }

    pub fn status(status: &'static str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// Minimal HTTP/1.1 server answering requests by path.
///
/// Serves connections until `max_requests` have been handled. Unknown
/// paths get a 404.
pub struct TestServer {
    pub base_url: String,
    handle: Option<JoinHandle<Vec<String>>>,
}

impl TestServer {
    pub fn start(routes: Vec<(&'static str, Response)>, max_requests: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let mut requested = Vec::new();
            for stream in listener.incoming().take(max_requests) {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let path = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();

                // Drain headers
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                }

                let response = routes
                    .iter()
                    .find(|(route, _)| *route == path)
                    .map(|(_, response)| response.clone())
                    .unwrap_or_else(|| Response::status("404 Not Found"));

                let mut head = format!("HTTP/1.1 {}\r\n", response.status);
                for (name, value) in &response.headers {
                    head.push_str(&format!("{name}: {value}\r\n"));
                }
                head.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    response.body.len()
                ));
                stream.write_all(head.as_bytes()).unwrap();
                stream.write_all(&response.body).unwrap();
                stream.flush().unwrap();
                requested.push(path);
            }
            requested
        });

        Self {
            base_url,
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Waits for the server to finish and returns the requested paths.
    pub fn requests(mut self) -> Vec<String> {
        self.handle.take().unwrap().join().unwrap()
    }
}
