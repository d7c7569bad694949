/// Normalizes user input into a handle: lowercase ASCII letters and digits,
/// with separators dropped (`"John Doe"` becomes `johndoe`).
pub fn slugify_handle(raw: &str) -> String {
    ::slug::slugify(raw).replace('-', "")
}

/// Slugged forms of the fixed top-level routes; a user owning one of these
/// could never be looked up at `/:handle`.
const RESERVED_HANDLES: &[&str] = &["health", "login", "me", "register", "searchhandle"];

pub fn is_reserved_handle(handle: &str) -> bool {
    RESERVED_HANDLES.contains(&handle)
}
