//! How a console relay ends.

use std::fmt;

/// One of the two byte flows of a console session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Console connection → output endpoint.
    Inbound,
    /// Input endpoint → console connection.
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

/// A clean end of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The input endpoint reached end-of-stream.
    InputEnded,
    /// The peer closed the connection with a close handshake.
    ClosedByPeer,
}

impl Termination {
    /// The relay direction that observed this termination.
    pub fn direction(&self) -> Direction {
        match self {
            Termination::InputEnded => Direction::Outbound,
            Termination::ClosedByPeer => Direction::Inbound,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::InputEnded => f.write_str("input reached end of stream"),
            Termination::ClosedByPeer => f.write_str("connection closed by peer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Inbound.to_string(), "inbound");
        assert_eq!(Direction::Outbound.to_string(), "outbound");
    }

    #[test]
    fn test_termination_direction() {
        assert_eq!(Termination::InputEnded.direction(), Direction::Outbound);
        assert_eq!(Termination::ClosedByPeer.direction(), Direction::Inbound);
    }
}
