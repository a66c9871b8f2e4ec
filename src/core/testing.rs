//! In-memory doubles for the network and the clock, plus archive builders.

use crate::core::fetch::{FetchError, RemoteResponse, Sleeper, Transport};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::time::Duration;
use url::Url;
use zip::write::SimpleFileOptions;

pub fn ok_response(body: &[u8], etag: Option<&str>) -> RemoteResponse {
    RemoteResponse {
        status: 200,
        content_length: Some(body.len() as u64),
        etag: etag.map(str::to_string),
        body: Box::new(Cursor::new(body.to_vec())),
    }
}

/// Replays a fixed list of responses, one per request.
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<RemoteResponse, FetchError>>>,
    calls: Cell<usize>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<RemoteResponse, FetchError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &Url) -> Result<RemoteResponse, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::Transport {
                    url: url.to_string(),
                    message: "no scripted response left".to_string(),
                })
            })
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    delays: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.delays.borrow_mut().push(duration);
    }
}

pub fn tar_gz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *contents).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A tarball whose first entry is the directory `dir` with `mode`, followed
/// by `files`.
pub fn tar_gz_with_dir(dir: &str, mode: u32, files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Directory);
    header.set_size(0);
    header.set_mode(mode);
    header.set_cksum();
    builder
        .append_data(&mut header, dir, std::io::empty())
        .unwrap();

    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, *contents).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (path, contents) in entries {
        writer
            .start_file(*path, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
