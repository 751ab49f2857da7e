/// Placeholder root labels the LLM sometimes emits instead of a real
/// document title. These are never rendered as visible node text.
pub const GENERIC_ROOT_TITLES: [&str; 4] = [
    "my document mind map",
    "document mind map",
    "mind map",
    "root",
];

pub fn is_generic_root_title(title: &str) -> bool {
    let title = title.trim().to_lowercase();
    GENERIC_ROOT_TITLES.iter().any(|generic| *generic == title)
}

/// Canonical form used as annotation-map key: HTML entities decoded,
/// surrounding whitespace trimmed.
pub fn normalize_text(text: &str) -> String {
    decode_entities(text).trim().to_string()
}

/// Decode the entity subset the renderer escapes in node labels. Named
/// entities outside this set and malformed references are left as-is.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail[1..]
            .find(';')
            .filter(|semi| *semi <= 8)
            .and_then(|semi| decode_entity(&tail[1..1 + semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 2..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    }
}
