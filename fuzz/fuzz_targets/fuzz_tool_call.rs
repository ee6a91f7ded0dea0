//! Fuzz target for tool dispatch.
//!
//! Arbitrary JSON arguments must produce either content or an error, never a
//! panic, and any successful estimate must be finite.

#![no_main]

use arbitrary::Arbitrary;
use cdx_core::tools::{call_tool, TOOL_BRIDGING, TOOL_NORMALIZE, TOOL_PPV};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct ToolCall {
    tool: u8,
    args: String,
}

fuzz_target!(|call: ToolCall| {
    let name = match call.tool % 4 {
        0 => TOOL_PPV,
        1 => TOOL_BRIDGING,
        2 => TOOL_NORMALIZE,
        _ => "get_bridging",
    };
    let Ok(params) = serde_json::from_str::<serde_json::Value>(&call.args) else {
        return;
    };

    if let Ok(content) = call_tool(name, &params) {
        let value: serde_json::Value =
            serde_json::from_str(&content[0].text).expect("tool output is JSON");
        for key in ["ppv_estimate", "efficacy_estimate", "ci_lower", "ci_upper"] {
            if let Some(v) = value.get(key) {
                assert!(v.as_f64().is_some_and(f64::is_finite), "{key} = {v}");
            }
        }
    }
});
