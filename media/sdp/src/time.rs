use internal::{atoi, tokens};

/// Time field (`t=<start-time> <stop-time>`)
///
/// Timing is not supported, the values are only reported. Missing values are read as 0.
///
/// [RFC4566](https://www.rfc-editor.org/rfc/rfc4566.html#section-5.9)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Time {
    pub(crate) start: u64,
    pub(crate) stop: u64,
}

impl Time {
    pub(crate) fn parse(i: &str) -> Self {
        let mut tokens = tokens(i, ' ');

        let mut next = || tokens.next().and_then(atoi).unwrap_or_default();

        let start = next();
        let stop = next();

        Self { start, stop }
    }
}
