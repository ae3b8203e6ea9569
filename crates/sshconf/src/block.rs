/// Mark which lines of `content` belong to the `Host` block named `name`.
///
/// The returned vector has one entry per line of `content`. The `Host` line
/// itself and the indented directives below it are marked; blank lines inside
/// the block are not marked but do not end it. The block ends at the next
/// `Host` line or the next unindented directive.
pub fn host_block_lines(content: &str, name: &str) -> Vec<bool> {
    let mut marks = Vec::new();
    let mut in_block = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if let Some(host_name) = host_line_name(trimmed) {
            in_block = host_name == name;
            marks.push(in_block);
            continue;
        }

        if trimmed.is_empty() {
            marks.push(false);
            continue;
        }

        let indented = line.starts_with(char::is_whitespace);
        if in_block && !indented {
            in_block = false;
        }
        marks.push(in_block);
    }

    marks
}

fn host_line_name(trimmed: &str) -> Option<String> {
    let mut tokens = trimmed.split_whitespace();
    let directive = tokens.next()?;
    if !directive.eq_ignore_ascii_case("host") {
        return None;
    }
    let name = tokens.collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}
