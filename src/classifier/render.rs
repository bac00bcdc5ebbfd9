use std::collections::BTreeSet;

/// Sorted, deduplicated, space-joined form of a name set.
pub fn render<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    sorted(names).join(" ")
}

/// Same as [`render`], broken at spaces into lines of at most `width`
/// characters. A name longer than `width` gets a line of its own.
pub fn render_wrapped<I, S>(names: I, width: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for name in sorted(names) {
        if !current.is_empty() && current.chars().count() + 1 + name.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&name);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

fn sorted<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
