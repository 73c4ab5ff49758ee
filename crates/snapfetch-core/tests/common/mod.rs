//! Shared fixtures: an in-memory HTTP server and a pause that never sleeps.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use snapfetch_fetch::{HttpClient, Pause, Response};
use snapfetch_verify::{ChecksumAlgorithm, Hasher};

#[derive(Debug)]
pub struct TestError(pub String);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

impl std::error::Error for TestError {}

#[derive(Debug, Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Status(u16),
    Refused,
}

/// Serves scripted replies per URL. The last reply of a script repeats.
#[derive(Default)]
pub struct MockServer {
    routes:   Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<String>>,
}

impl MockServer {
    pub fn new() -> Self { Self::default() }

    pub fn route(self, url: &str, replies: Vec<Reply>) -> Self {
        self.routes.lock().unwrap().insert(url.to_string(), replies.into());
        self
    }

    pub fn requests(&self) -> Vec<String> { self.requests.lock().unwrap().clone() }

    pub fn hits(&self, url: &str) -> usize { self.requests.lock().unwrap().iter().filter(|u| *u == url).count() }

    fn next_reply(&self, url: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Status(404)),
            None => Reply::Status(404),
        }
    }
}

impl HttpClient for &MockServer {
    type Error = TestError;

    async fn get(&self, url: &str) -> Result<Response<Self::Error>, Self::Error> {
        self.requests.lock().unwrap().push(url.to_string());
        let (status, body) = match self.next_reply(url) {
            Reply::Body(data) => (200, data),
            Reply::Status(status) => (status, b"error".to_vec()),
            Reply::Refused => return Err(TestError(format!("connection refused: {url}"))),
        };
        let chunks: Vec<Result<Bytes, TestError>> = body.chunks(1024).map(|c| Ok(Bytes::copy_from_slice(c))).collect();
        Ok(Response {
            status,
            body: Box::pin(futures_util::stream::iter(chunks)),
        })
    }
}

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub struct RecordingPause {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingPause {
    pub fn waits(&self) -> Vec<Duration> { self.waits.lock().unwrap().clone() }
}

impl Pause for &RecordingPause {
    async fn pause(&self, duration: Duration) { self.waits.lock().unwrap().push(duration); }
}

pub fn write_manifest(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = ChecksumAlgorithm::Md5.hasher();
    hasher.update(data);
    hasher.finalize_hex()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200]))
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Parsed lines of a JSON Lines log; empty when the file does not exist.
pub fn log_lines(path: &Path) -> Vec<serde_json::Value> {
    match std::fs::read_to_string(path) {
        Ok(text) => text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect(),
        Err(_) => Vec::new(),
    }
}
