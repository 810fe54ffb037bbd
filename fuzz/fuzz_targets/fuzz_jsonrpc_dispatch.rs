#![no_main]

use libfuzzer_sys::fuzz_target;

use slack_mcp::server::mcp::{parse_request, INVALID_REQUEST, PARSE_ERROR};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bodies must never panic, and every rejection must carry one
    // of the two request-level error codes.
    match parse_request(data) {
        Ok(request) => {
            let _ = request.expects_response();
        }
        Err(failure) => {
            assert!(failure.code == PARSE_ERROR || failure.code == INVALID_REQUEST);
            let response = failure.to_response();
            assert_eq!(response["jsonrpc"], "2.0");
        }
    }
});
