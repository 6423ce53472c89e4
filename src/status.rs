use std::fmt;

/// CI status ranked by severity.
///
/// Declaration order is the rank: the lower the rank, the more a status needs
/// attention. Merging statuses always keeps the lowest rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Undefined = 0,
    Failed = 1,
    Pending = 2,
    Started = 3,
    Running = 4,
    Build = 5,
    Created = 6,
    Canceled = 7,
    Skipped = 8,
    Success = 9,
}

impl Status {
    /// All statuses, most severe first.
    pub const ALL: [Status; 10] = [
        Status::Undefined,
        Status::Failed,
        Status::Pending,
        Status::Started,
        Status::Running,
        Status::Build,
        Status::Created,
        Status::Canceled,
        Status::Skipped,
        Status::Success,
    ];

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Status::Undefined => "undefined",
            Status::Failed => "failed",
            Status::Pending => "pending",
            Status::Started => "started",
            Status::Running => "running",
            Status::Build => "build",
            Status::Created => "created",
            Status::Canceled => "canceled",
            Status::Skipped => "skipped",
            Status::Success => "success",
        }
    }

    /// Unknown names fall back to `Undefined` instead of being rejected.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|status| status.name() == name)
            .unwrap_or(Status::Undefined)
    }

    pub fn from_rank(rank: u8) -> Self {
        Self::ALL
            .into_iter()
            .find(|status| status.rank() == rank)
            .unwrap_or(Status::Undefined)
    }

    /// Keeps the more severe of the two.
    #[must_use]
    pub fn merge(self, other: Status) -> Status {
        self.min(other)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rank of a status name, `0` for anything unrecognised.
pub fn rank_of(name: &str) -> u8 {
    Status::from_name(name).rank()
}

/// Name of the status with exactly this rank, `"undefined"` otherwise.
pub fn name_of(rank: u8) -> &'static str {
    Status::from_rank(rank).name()
}
