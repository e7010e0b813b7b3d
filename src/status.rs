use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// The status codes this server emits. Discriminants are the wire codes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, EnumIter)]
#[repr(u16)]
pub enum Status {
    OK = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    RequestTimeout = 408,
    ContentTooLarge = 413,
    InternalServerError = 500,
    NotImplemented = 501,
    ServiceUnavailable = 503,
}

impl Status {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::OK => "OK",
            Self::Created => "Created",
            Self::NoContent => "No Content",
            Self::BadRequest => "Bad Request",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::RequestTimeout => "Request Timeout",
            Self::ContentTooLarge => "Content Too Large",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
            Self::ServiceUnavailable => "Service Unavailable",
        }
    }

    #[allow(unused)]
    pub fn from_code(code: u16) -> Option<Status> {
        BY_CODE.get(&code).copied()
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

lazy_static! {
    static ref BY_CODE: HashMap<u16, Status> =
        Status::iter().map(|status| (status as u16, status)).collect();
}
