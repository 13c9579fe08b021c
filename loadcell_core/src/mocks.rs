//! Test and helper mocks for loadcell_core

use loadcell_traits::Transport;
use std::collections::VecDeque;
use std::time::Duration;

/// What a `ScriptedTransport` does after its script runs out.
pub enum ScriptEnd {
    /// Keep reporting quiet polls.
    Quiet,
    /// Fail with an io error carrying this message.
    Error(String),
}

/// Transport that replays a fixed script: `Some(line)` yields the line,
/// `None` is a quiet poll. After the script, behaves per `ScriptEnd`.
pub struct ScriptedTransport {
    script: VecDeque<Option<String>>,
    end: ScriptEnd,
}

impl ScriptedTransport {
    pub fn new<I, S>(script: I, end: ScriptEnd) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(|s| s.map(Into::into)).collect(),
            end,
        }
    }

    /// Script that yields each line once, then stays quiet.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(Some), ScriptEnd::Quiet)
    }
}

impl Transport for ScriptedTransport {
    fn read_line(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        match self.script.pop_front() {
            Some(item) => Ok(item),
            None => match &self.end {
                ScriptEnd::Quiet => Ok(None),
                ScriptEnd::Error(msg) => Err(Box::new(std::io::Error::other(msg.clone()))),
            },
        }
    }
}

/// A transport that always errors on read; useful for exercising the
/// error-surfacing path without a script.
pub struct FailingTransport;

impl Transport for FailingTransport {
    fn read_line(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("failing transport")))
    }
}
