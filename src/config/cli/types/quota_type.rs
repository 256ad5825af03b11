//! Cluster quota type.

/// Quota class requested from the cluster scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaType {
    Reserved,
    Auto,
    Spot,
}

impl std::str::FromStr for QuotaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reserved" => Ok(QuotaType::Reserved),
            "auto" => Ok(QuotaType::Auto),
            "spot" => Ok(QuotaType::Spot),
            _ => Err(format!("Unknown quota type: {s}. Valid types: reserved, auto, spot")),
        }
    }
}

impl std::fmt::Display for QuotaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaType::Reserved => write!(f, "reserved"),
            QuotaType::Auto => write!(f, "auto"),
            QuotaType::Spot => write!(f, "spot"),
        }
    }
}
