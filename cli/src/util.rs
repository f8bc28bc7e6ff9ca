use serde_json::json;

/// Print a structured error to stderr and exit with `code`.
pub fn exit_error(message: &str, docs_hint: Option<&str>, code: i32) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", to_pretty(&err));
    std::process::exit(code);
}

pub fn to_pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
