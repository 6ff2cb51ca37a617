use uuid::Uuid;

/// Prefix every entry identifier carries.
pub const ENTRY_ID_PREFIX: &str = "urn:uuid:";

const ENTRY_ID_HEX_LEN: usize = 32;

/// Generates a new entry identifier.
///
/// Format: `urn:uuid:` followed by the 32 uppercase hex digits of a random
/// (v4) UUID, without hyphens. Example: `urn:uuid:3113101A18414AF9E0635220010A8E86`.
pub fn generate_entry_id() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{ENTRY_ID_PREFIX}{hex}")
}

/// Returns true if `id` matches `^urn:uuid:[A-F0-9]{32}$`.
pub fn is_valid_entry_id(id: &str) -> bool {
    match id.strip_prefix(ENTRY_ID_PREFIX) {
        Some(hex) => {
            hex.len() == ENTRY_ID_HEX_LEN
                && hex
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
        }
        None => false,
    }
}
