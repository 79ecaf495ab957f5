use heck::ToLowerCamelCase;

/// Derive an operationId from HTTP method and path.
///
/// Every `{name}` becomes `By<Name>`, the path is split on anything that is
/// not an ASCII letter or digit, each piece is capitalised and the pieces are
/// joined behind the lower-cased method:
///
/// - `GET /users/{id}/orders` → `getUsersByIdOrders`
/// - `DELETE /pets/{petId}` → `deletePetsByPetId`
/// - `GET /` → `get`
pub fn synthesize_operation_id(method: &str, path: &str) -> String {
    let mut id = method.to_lowercase();
    for piece in expand_placeholders(path).split(|c: char| !c.is_ascii_alphanumeric()) {
        id.push_str(&capitalize(piece));
    }
    id
}

/// Replace every `{name}` with `By<Name>`. An unterminated `{` is kept verbatim.
fn expand_placeholders(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 8);
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str("By");
        out.push_str(&capitalize(&rest[open + 1..open + close]));
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Alternate catalog key for a name written in snake, kebab or title case:
/// `get_users_by_id` and `get-users-by-id` both map to `getusersbyid`.
pub fn relaxed_key(name: &str) -> String {
    name.to_lower_camel_case().to_lowercase()
}
