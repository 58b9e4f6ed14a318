use serde_json::{json, Value};

use crate::dispatcher::Request;
use crate::error::DispatchError;
use crate::handler::Handler;
use crate::router::PathArgs;

/// Example handler: echoes the request back to the caller.
pub struct EchoHandler;

impl Handler for EchoHandler {
    fn dispatch(&self, request: &Request, args: &PathArgs) -> Result<Value, DispatchError> {
        Ok(json!({
            "url": request.url(),
            "method": request.method().map(ToString::to_string),
            "args": request.args(),
            "path_args": args.to_vec(),
        }))
    }
}
