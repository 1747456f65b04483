use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::fmt;
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid `base_url` or HTTP client that could not be built.
    ConfigError(String),
    /// Network level failure (DNS, refused connection, timeout...).
    TransportError(String),
    /// `(url, status)` of a non-200 response.
    HttpStatus(String, String),
    /// `(url, media type)` of a response that is not `application/json`.
    UnexpectedContentType(String, String),
    DecodeError(String),
    NoData,
    FormatError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigError(s) => write!(f, "configuration error: {}", s),
            Error::TransportError(s) => write!(f, "{}", s),
            Error::HttpStatus(url, status) => write!(f, "{} returned HTTP status {}", url, status),
            Error::UnexpectedContentType(url, media_type) => {
                write!(f, "{} returned unexpected content type {}", url, media_type)
            }
            Error::DecodeError(s) => write!(f, "error while decoding JSON response: {}", s),
            Error::NoData => write!(f, "no data gathered"),
            Error::FormatError => write!(f, "unable to render metrics"),
        }
    }
}

impl std::error::Error for Error {}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = match self {
            Error::ConfigError(_) | Error::FormatError => Status::InternalServerError,
            _ => Status::BadGateway,
        };
        let error = format!(
            "<html><body><h3>{}</h3>Error while collecting envoy metrics: <code>{}</code></body></html>",
            status, self
        );
        Response::build()
            .status(status)
            .sized_body(error.len(), Cursor::new(error))
            .header(ContentType::new("text", "html"))
            .ok()
    }
}
