use crate::{server::HttpMethod, status::Status};

#[derive(Debug)]
pub struct ResponseWriter {
    status: Option<Status>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new_empty() -> Self {
        Self {
            status: None,
            headers: vec![],
            body: vec![],
        }
    }

    #[allow(unused)]
    pub fn get_status(&self) -> Option<Status> {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    fn add_header(&mut self, k: String, v: String) {
        if let Some(entry) = self.headers.iter_mut().find(|entry| entry.0 == k) {
            entry.1 = v;
        } else {
            self.headers.push((k, v));
        }
    }

    pub fn add_allow_header(&mut self, http_methods: Vec<HttpMethod>) {
        let http_methods = http_methods
            .iter()
            .map(|m| m.to_string().to_uppercase())
            .collect::<Vec<_>>()
            .join(", ");
        self.add_header("Allow".to_owned(), http_methods);
    }

    pub fn get_content_type_header(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|entry| entry.0.to_lowercase() == "content-type")
            .map(|(_, v)| v.as_str())
    }

    pub fn add_content_encoding_header(&mut self, content_encoding: &str) {
        self.add_header("Content-Encoding".to_owned(), content_encoding.to_owned());
    }

    fn add_content_type_header(&mut self, content_type: &str) {
        self.add_header("Content-Type".to_owned(), content_type.to_owned());
    }

    fn add_content_length_header(&mut self) {
        self.add_header("Content-Length".to_owned(), self.body.len().to_string());
    }

    pub fn get_body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: Vec<u8>, content_type: &str) {
        self.body = body;
        self.add_content_type_header(content_type);
        self.add_content_length_header();
    }

    pub fn set_body_str(&mut self, body: &str) {
        self.set_body(body.bytes().collect(), "text/plain");
    }

    pub fn write(mut self) -> Vec<u8> {
        // A handler that never set a status produced an empty success.
        let status = self.status.unwrap_or(Status::OK);
        // Keep-alive peers need a length even on empty bodies.
        self.add_content_length_header();

        let status_line = format!("HTTP/1.1 {} {}\r\n", status.code(), status.reason());

        let mut headers = self
            .headers
            .into_iter()
            .map(|(k, v)| format!("{}: {}\r\n", k, v))
            .collect::<Vec<_>>()
            .join("");
        headers.push_str("\r\n");

        let mut resp = vec![];
        resp.extend(status_line.bytes());
        resp.extend(headers.bytes());
        resp.extend(self.body);
        resp
    }
}
