//! Unit protocol on top of `lsp_server` framing: method names, error codes and the
//! params/results of each `unit/*` message.

use crate::kernel::unit::{UnitValue, ValueKind};
use lsp_server::{ErrorCode, Message, Notification, Request, RequestId, Response};
use serde::{Deserialize, Serialize};
use std::io;

pub const PROTOCOL_VERSION: u32 = 1;

pub const METHOD_INSTANTIATE: &str = "unit/instantiate";
pub const METHOD_CALL: &str = "unit/call";
pub const METHOD_EXIT: &str = "unit/exit";
pub const METHOD_PRINT: &str = "unit/print";
pub const METHOD_PRINT_ERR: &str = "unit/printErr";
pub const METHOD_LOCATE: &str = "unit/locate";

pub const ERROR_METHOD_NOT_FOUND: i32 = ErrorCode::MethodNotFound as i32;
pub const ERROR_CALL_FAILED: i32 = -32000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantiateParams {
    pub protocol_version: u32,
    #[serde(default)]
    pub asset_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantiateResult {
    pub exports: Vec<String>,
    #[serde(default)]
    pub main: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallParams {
    pub name: String,
    pub returns: ValueKind,
    #[serde(default)]
    pub arg_types: Vec<ValueKind>,
    #[serde(default)]
    pub args: Vec<UnitValue>,
    #[serde(rename = "async", default)]
    pub is_async: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResult {
    #[serde(default)]
    pub value: Option<UnitValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextParams {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateParams {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocateResult {
    pub path: String,
}

pub fn request(id: impl Into<RequestId>, method: &str, params: impl Serialize) -> Request {
    Request::new(id.into(), method.to_string(), params)
}

pub fn notification(method: &str, params: impl Serialize) -> Message {
    Message::Notification(Notification::new(method.to_string(), params))
}

pub fn call_failed(id: RequestId, message: impl Into<String>) -> Message {
    Message::Response(Response::new_err(id, ERROR_CALL_FAILED, message.into()))
}

pub fn method_not_found(id: RequestId, method: &str) -> Message {
    Message::Response(Response::new_err(
        id,
        ERROR_METHOD_NOT_FOUND,
        format!("method not found: {method}"),
    ))
}

/// `Message::read` reports bad headers and bodies that are not JSON-RPC as
/// `InvalidData`; anything else means the stream went away.
pub fn is_protocol_violation(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::InvalidData
}

#[cfg(test)]
#[path = "../../../tests/unit/runtime/wire.rs"]
mod tests;
