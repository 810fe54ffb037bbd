#![no_main]

use libfuzzer_sys::fuzz_target;

use slack_mcp::slack::SearchFilter;

fuzz_target!(|data: &str| {
    // Split the input into filter fields; the rendered query must never
    // carry leading or trailing whitespace.
    let mut parts = data.split('\u{1f}').map(|s| Some(s.to_string()));
    let filter = SearchFilter {
        text: parts.next().flatten(),
        channel_name: parts.next().flatten(),
        from_user: parts.next().flatten(),
        before: parts.next().flatten(),
        after: parts.next().flatten(),
        on: parts.next().flatten(),
        during: parts.next().flatten(),
    };

    let query = filter.to_query();
    assert_eq!(query, query.trim());
});
