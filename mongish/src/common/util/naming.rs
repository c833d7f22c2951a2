/// Upper-cases the first character of `name`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derives the plural identifier a collection is also registered under.
///
/// Names ending in `y` (but not `ey`) swap the `y` for `ies`, every other name
/// gets an `s`. The result is capitalized: `category` becomes `Categories`,
/// `user` becomes `Users` and `key` becomes `Keys`.
pub fn plural_name(name: &str) -> String {
    if name.ends_with('y') && !name.ends_with("ey") {
        format!("{}ies", capitalize(&name[..name.len() - 1]))
    } else {
        format!("{}s", capitalize(name))
    }
}
