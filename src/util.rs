use std::fmt::Display;

pub(crate) fn urljoin(base: &str, page: &str) -> String {
    if page.starts_with("http://") || page.starts_with("https://") {
        return page.to_string();
    }
    let base = base.trim_end_matches('/');
    let page = page.trim_start_matches('/');
    format!("{}/{}", base, page)
}

/// Booleans go over the wire capitalised (`True`/`False`); the service has always been fed that form.
pub(crate) fn wire_bool(b: bool) -> &'static str {
    if b { "True" } else { "False" }
}

pub(crate) fn join_ids<T: Display>(ids: &[T]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
