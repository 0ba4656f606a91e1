/// Why a requested action did not happen. Every variant leaves state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// `start_throw` without an item in hand.
    NoItem,
    /// `start_throw` while the previous throw is still animating.
    AlreadyThrowing,
    /// `jump` while airborne or already flagged as jumping.
    NotGrounded,
    /// Lane shift past the outermost lane.
    NoLaneThatWay,
    /// Lane shift while another lane change is in flight.
    LaneChangeInProgress,
    /// The enemy never jumps.
    JumpDisabled,
    /// The round is over.
    RoundComplete,
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::NoItem => "no item to throw",
            Self::AlreadyThrowing => "a throw is already in progress",
            Self::NotGrounded => "cannot jump while airborne",
            Self::NoLaneThatWay => "no lane in that direction",
            Self::LaneChangeInProgress => "a lane change is already in progress",
            Self::JumpDisabled => "enemy jumping is disabled",
            Self::RoundComplete => "the round is complete",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for ActionError {}

/// A lane index outside 0..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLane(pub u8);

impl std::fmt::Display for InvalidLane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lane index {} is out of range", self.0)
    }
}

impl std::error::Error for InvalidLane {}
