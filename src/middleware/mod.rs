pub mod request_id;

pub use request_id::{make_span_with_request_id, with_request_id, RequestId, REQUEST_ID_HEADER};
