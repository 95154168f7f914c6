//! Optional capability hooks

use super::types::Object;
use crate::context::OperationContext;
use crate::error::Result;
use crate::http::ApiResponse;
use reqwest::Request;
use serde_json::Value;
use url::Url;

/// Rewrites the composed request URL, for resources whose address is not
/// simply base + path + identifier.
pub trait RequestUrlHook: Send + Sync {
    fn request_url(&self, ctx: &OperationContext, url: Url) -> Result<Url>;
}

/// Supplies the body sent on Create and Update instead of the object itself
pub trait RequestBodyHook: Send + Sync {
    fn request_body(&self, ctx: &OperationContext) -> Result<Value>;
}

/// Adjusts the fully built request right before it is sent
pub trait RequestFilterHook: Send + Sync {
    fn filter_request(&self, ctx: &OperationContext, request: Request) -> Result<Request>;
}

/// Adjusts or replaces the response before its status is classified
pub trait ResponseFilterHook: Send + Sync {
    fn filter_response(&self, ctx: &OperationContext, response: ApiResponse)
        -> Result<ApiResponse>;
}

/// Takes over decoding a response body into the object
pub trait ResponseDecodeHook: Send + Sync {
    fn decode_response(&mut self, ctx: &OperationContext, body: &[u8]) -> Result<()>;
}

/// Declares whether the addressed collection pages its List responses
pub trait PaginationSupportHook: Send + Sync {
    fn has_pagination(&self, ctx: &OperationContext) -> Result<bool>;
}

/// Decode `body` into `dest` through its decode hook, or as plain JSON.
///
/// Plain JSON is decoded into the current value: keys the response leaves
/// out keep their values and nested objects are merged key by key.
pub fn decode_object<O: Object>(ctx: &OperationContext, dest: &mut O, body: &[u8]) -> Result<()> {
    if let Some(hook) = dest.as_response_decode_hook() {
        return hook.decode_response(ctx, body);
    }

    let incoming: Value = serde_json::from_slice(body)?;
    let mut current = serde_json::to_value(&*dest)?;
    merge_into(&mut current, incoming);
    *dest = serde_json::from_value(current)?;
    Ok(())
}

fn merge_into(current: &mut Value, incoming: Value) {
    match (current, incoming) {
        (Value::Object(current), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match current.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (current, incoming) => *current = incoming,
    }
}
