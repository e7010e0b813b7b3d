use std::io::{ErrorKind, Read};

use thiserror::Error;
use tracing::info;

use crate::{headers::Headers, multi_map::MultiMap, stream_reader::StreamReader};

#[derive(Debug)]
struct RequestLine<'a> {
    line: &'a str,
}

impl<'a> RequestLine<'a> {
    fn new(line: &'a str) -> Self {
        Self { line }
    }

    fn http_method(&self) -> &'a str {
        self.line.split(' ').nth(0).unwrap()
    }

    fn request_target(&self) -> &'a str {
        self.line.split(' ').nth(1).unwrap()
    }

    #[allow(unused)]
    fn http_version(&self) -> &'a str {
        self.line.split(' ').nth(2).unwrap()
    }
}

/// One inbound request. Routing state lives in three fields: `path_info`
/// is the not-yet-matched suffix of the target, `context_path` the
/// already-consumed prefix, `params` the capture bindings. The router
/// touches them only through `trim_path_info`, `extend_context_path`
/// and `bind_param`.
#[derive(Debug)]
pub struct Request {
    request_line: String,
    path_info: String,
    context_path: String,
    params: MultiMap<String, String>,
    headers: Headers,
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(request_line: String, headers: Headers, body: Option<Vec<u8>>) -> Self {
        let target = RequestLine::new(&request_line).request_target();
        let path_info = target.strip_prefix('/').unwrap_or(target).to_owned();
        Self {
            request_line,
            path_info,
            context_path: String::new(),
            params: MultiMap::new_empty(),
            headers,
            body,
        }
    }

    pub fn get_http_method(&self) -> &str {
        RequestLine::new(&self.request_line).http_method()
    }

    pub fn get_request_target(&self) -> &str {
        RequestLine::new(&self.request_line).request_target()
    }

    #[allow(unused)]
    pub fn get_http_version(&self) -> &str {
        RequestLine::new(&self.request_line).http_version()
    }

    pub fn get_path_info(&self) -> &str {
        &self.path_info
    }

    pub fn get_context_path(&self) -> &str {
        &self.context_path
    }

    /// First (deepest) binding of the name, if any.
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.get_param_iter(name).and_then(|mut it| it.next())
    }

    /// All bindings of the name, deepest first.
    pub fn get_param_iter(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        self.params
            .get_value_iter(name)
            .map(|it| it.map(|v| v.as_str()))
    }

    /// Drops the consumed `n` bytes from the front of the unmatched path.
    pub fn trim_path_info(&mut self, n: usize) {
        self.path_info.drain(..n);
    }

    /// Appends consumed text; the context path only ever grows.
    pub fn extend_context_path(&mut self, consumed: &str) {
        self.context_path.push_str(consumed);
    }

    /// Binds a capture. The newest binding of a name goes in front.
    pub fn bind_param(&mut self, name: String, value: String) {
        self.params.insert_front_scalar(name, value);
    }

    pub fn get_headers(&self) -> &Headers {
        &self.headers
    }

    pub fn get_body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

#[derive(Error, Debug)]
#[error("end of file")]
pub struct EndOfFile;

#[derive(Error, Debug)]
#[error("invalid request")]
pub struct InvalidRequest;

pub struct RequestReader<R> {
    stream_reader: StreamReader<R>,
}

impl<R: Read> RequestReader<R> {
    pub fn new(r: R) -> Self {
        Self {
            stream_reader: StreamReader::new(r),
        }
    }

    pub fn read(&mut self) -> anyhow::Result<Request> {
        let mut request_line = String::new();
        self.stream_reader.set_limit(1024);
        if self.stream_reader.read_line(&mut request_line)? == 0 {
            Err(EndOfFile)?
        }
        let request_line = request_line
            .strip_suffix("\r\n")
            .ok_or(InvalidRequest)?
            .to_owned();

        if request_line.split(' ').count() != 3 {
            Err(InvalidRequest)?
        }

        info!(?request_line);

        let mut header_map = MultiMap::new_empty();
        self.stream_reader.set_limit(8 * 1024);
        loop {
            let mut line = String::new();
            // A stream ending mid-headers is a malformed request, not a
            // clean close.
            if self.stream_reader.read_line(&mut line)? == 0 {
                Err(InvalidRequest)?
            }
            let line = line.strip_suffix("\r\n").ok_or(InvalidRequest)?;

            if line.is_empty() {
                break;
            }
            let (k, v) = line.split_once(':').ok_or(InvalidRequest)?;
            header_map.insert_scalar(k.to_lowercase(), v.trim().to_owned());
        }
        let headers = Headers::new(header_map);

        let mut body = None;
        if let Some(content_length) = headers.get_content_length().map_err(|_| InvalidRequest)? {
            self.stream_reader.set_limit(8 * 1024);
            let mut buf = vec![0; content_length];
            if let Err(err) = self.stream_reader.read_exact(&mut buf) {
                if err.kind() == ErrorKind::UnexpectedEof {
                    Err(InvalidRequest)?
                } else {
                    Err(err)?
                }
            }
            body = Some(buf);
        };

        Ok(Request::new(request_line, headers, body))
    }
}
