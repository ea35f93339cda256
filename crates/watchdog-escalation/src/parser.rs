//! Incoming reply parsing.
//!
//! Matching is case-insensitive, whitespace-tolerant (all whitespace is
//! stripped before matching), and prefix-based on the response codes
//! described in the lifecycle documentation.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Approve(String),
    Deny(String),
    DenyAdd(String),
    ApproveAll,
    DenyAll,
    BulkConfirm,
    Status,
    Unrecognized,
}

pub fn parse_message(text: &str) -> ParsedMessage {
    let normalized: String = text.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_uppercase();

    match normalized.as_str() {
        "APPROVE-ALL" => return ParsedMessage::ApproveAll,
        "DENY-ALL" => return ParsedMessage::DenyAll,
        "STATUS" => return ParsedMessage::Status,
        "YES" | "Y" | "CONFIRM" => return ParsedMessage::BulkConfirm,
        _ => {}
    }

    if let Some(rest) = normalized.strip_prefix("DENY-ADD-") {
        if !rest.is_empty() {
            return ParsedMessage::DenyAdd(to_short_id(rest));
        }
    }
    if let Some(rest) = normalized.strip_prefix("APPROVE-") {
        if !rest.is_empty() {
            return ParsedMessage::Approve(to_short_id(rest));
        }
    }
    if let Some(rest) = normalized.strip_prefix("DENY-") {
        if !rest.is_empty() {
            return ParsedMessage::Deny(to_short_id(rest));
        }
    }

    ParsedMessage::Unrecognized
}

fn to_short_id(rest: &str) -> String {
    rest.to_lowercase()
}
