/// The placeholder every starter template carries. Matching is an exact
/// literal substring search; when the marker is absent the merge appends
/// instead, which is a normal path rather than a failure.
pub const INSERTION_MARKER: &str = "Your code starts here";

/// Splices `text` into `buffer` immediately after the first occurrence of
/// `marker`, preceded by a newline. Without a marker the text goes to the
/// end of the buffer, again preceded by a newline.
pub fn merge(buffer: &str, text: &str, marker: &str) -> String {
    match buffer.find(marker) {
        Some(start) => {
            let insert_at = start + marker.len();
            let mut merged = String::with_capacity(buffer.len() + text.len() + 1);
            merged.push_str(&buffer[..insert_at]);
            merged.push('\n');
            merged.push_str(text);
            merged.push_str(&buffer[insert_at..]);
            merged
        }
        None => format!("{}\n{}", buffer, text),
    }
}
