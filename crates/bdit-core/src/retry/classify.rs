//! Classify curl, IO and HTTP errors into retry failure kinds.

use std::io;

use super::policy::{Failure, FailureKind};
use crate::http::RequestError;

/// Errors the retry loop can inspect.
pub trait Classify {
    fn failure(&self) -> Failure;
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_operation_timedout() {
        return FailureKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return FailureKind::Connection;
    }
    FailureKind::Other
}

pub fn classify_io_error(e: &io::Error) -> FailureKind {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => FailureKind::Timeout,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => FailureKind::Connection,
        _ => FailureKind::Other,
    }
}

impl Classify for curl::Error {
    fn failure(&self) -> Failure {
        Failure::of_kind(classify_curl_error(self))
    }
}

impl Classify for io::Error {
    fn failure(&self) -> Failure {
        Failure::of_kind(classify_io_error(self))
    }
}

/// Looks through context layers for a known error type.
impl Classify for anyhow::Error {
    fn failure(&self) -> Failure {
        if let Some(e) = self.downcast_ref::<RequestError>() {
            return e.failure();
        }
        if let Some(e) = self.downcast_ref::<curl::Error>() {
            return e.failure();
        }
        if let Some(e) = self.downcast_ref::<io::Error>() {
            return e.failure();
        }
        Failure::other()
    }
}
