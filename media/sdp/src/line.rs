//! Splits a session description into `<type>=<value>` lines

/// A single accepted line of a session description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'i> {
    /// The single character before the `=`
    pub(crate) kind: char,

    /// Everything after the `=`, without the trailing CR
    pub(crate) value: &'i str,
}

impl<'i> Line<'i> {
    fn parse(line: &'i str) -> Option<Self> {
        // length is checked before the CR is removed, so `s=\r` is accepted with an empty value
        if line.len() <= 2 || line.as_bytes()[1] != b'=' {
            return None;
        }

        let line = line.strip_suffix('\r').unwrap_or(line);

        Some(Self {
            kind: char::from(line.as_bytes()[0]),
            value: &line[2..],
        })
    }
}

/// Iterate over all well formed lines, silently skipping everything else
pub(crate) fn lines(src: &str) -> impl Iterator<Item = Line<'_>> {
    src.split('\n').filter_map(Line::parse)
}
