//! Cluster mail notification events.

/// Job events that trigger a mail notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailType {
    None,
    #[default]
    Begin,
    End,
    Fail,
    Requeue,
    All,
}

impl std::str::FromStr for MailType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(MailType::None),
            "BEGIN" => Ok(MailType::Begin),
            "END" => Ok(MailType::End),
            "FAIL" => Ok(MailType::Fail),
            "REQUEUE" => Ok(MailType::Requeue),
            "ALL" => Ok(MailType::All),
            _ => Err(format!(
                "Unknown mail type: {s}. Valid types: NONE, BEGIN, END, FAIL, REQUEUE, ALL"
            )),
        }
    }
}

impl std::fmt::Display for MailType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailType::None => write!(f, "NONE"),
            MailType::Begin => write!(f, "BEGIN"),
            MailType::End => write!(f, "END"),
            MailType::Fail => write!(f, "FAIL"),
            MailType::Requeue => write!(f, "REQUEUE"),
            MailType::All => write!(f, "ALL"),
        }
    }
}
