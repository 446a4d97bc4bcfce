use crate::error::SessionError;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Next,
    Stop,
}

/// User-facing controls of a running [`ConnectionSession`](crate::ConnectionSession).
///
/// Dropping every handle ends the session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: mpsc::UnboundedSender<SessionCommand>) -> Self {
        Self { command_tx }
    }

    /// Join the waiting queue and keep rejoining after calls end.
    pub fn start(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Start)
    }

    /// Drop the current partner and look for another.
    pub fn next(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Next)
    }

    /// Hang up, leave the queue and stay idle.
    pub fn stop(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Stop)
    }

    fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.command_tx
            .send(cmd)
            .map_err(|_| SessionError::SessionEnded)
    }
}
