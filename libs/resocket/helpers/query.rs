/// Append `key=value` to the query string of `url`
///
/// Uses `?` when the URL has no query yet and `&` otherwise. Nothing is
/// percent-encoded: pass components that are already safe for a URL.
pub fn add_query_param(url: &str, key: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };

    let mut out = String::with_capacity(url.len() + key.len() + value.len() + 2);
    out.push_str(url);
    out.push(separator);
    out.push_str(key);
    out.push('=');
    out.push_str(value);
    out
}
