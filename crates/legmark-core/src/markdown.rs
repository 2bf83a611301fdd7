/// Marker line opening page `n` (1-based).
pub fn page_start_marker(page_number: usize) -> String {
    format!("START OF PAGE {page_number}")
}

/// Marker line closing page `n` (1-based).
pub fn page_end_marker(page_number: usize) -> String {
    format!("END OF PAGE {page_number}")
}

/// Wrap a page body in its start/end markers, each on its own line.
///
/// An empty body leaves an empty line between the markers.
pub fn page_block(page_number: usize, body: &str) -> String {
    let start = page_start_marker(page_number);
    let end = page_end_marker(page_number);
    let mut block = String::with_capacity(start.len() + body.len() + end.len() + 2);
    block.push_str(&start);
    block.push('\n');
    block.push_str(body);
    block.push('\n');
    block.push_str(&end);
    block
}

/// Join page bodies, in order, into the document markdown.
pub fn assemble_document<S: AsRef<str>>(bodies: &[S]) -> String {
    bodies
        .iter()
        .enumerate()
        .map(|(i, body)| page_block(i + 1, body.as_ref()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// As [`assemble_document`], with explicit page numbers.
pub fn assemble_numbered<S: AsRef<str>>(pages: &[(usize, S)]) -> String {
    pages
        .iter()
        .map(|(n, body)| page_block(*n, body.as_ref()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
